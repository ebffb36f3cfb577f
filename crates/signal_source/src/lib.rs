//! # Signal Source
//!
//! Deterministic test signals for the detector: PN pulses, matched
//! templates and receive streams with an injected pulse and optional seeded
//! Gaussian noise.
//!
//! ## Example
//!
//! ```
//! use fixed_point::FixedFormat;
//! use signal_source::{matched_template, pn_pulse, Scenario, DEFAULT_PN_LEVEL, DEFAULT_PN_SEED};
//!
//! let fmt = FixedFormat::signed(18, 2).unwrap();
//! let pulse = pn_pulse(&fmt, 64, DEFAULT_PN_LEVEL, DEFAULT_PN_SEED);
//! let template = matched_template(&fmt, &pulse);
//! let samples = Scenario::new(5000, 1000).build(&fmt, &pulse).unwrap();
//!
//! assert_eq!(template.len(), 64);
//! assert_eq!(samples.len(), 5000);
//! ```

mod pn;
mod scenario;

pub use pn::{pn_pulse, PnSequence, DEFAULT_PN_LEVEL, DEFAULT_PN_SEED};
pub use scenario::{matched_template, pulse_energy, Scenario};
