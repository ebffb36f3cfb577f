//! # Correlator
//!
//! Streaming matched-filter correlation over fixed-point complex samples.
//!
//! Responsibilities:
//! - Hold the `filter_length` most recent samples (newest first)
//! - Correlate them against the template with the configured strategy
//! - Return the magnitude-squared energy for every incoming sample
//!
//! ## Example
//!
//! ```
//! use contracts::DetectorConfig;
//! use correlator::Correlator;
//!
//! let mut config = DetectorConfig::default();
//! config.detector.filter_length = 2;
//!
//! let fmt = config.format().unwrap();
//! let template = [fmt.complex_from_f64(0.5, 0.0), fmt.complex_from_f64(0.5, 0.0)];
//! let mut correlator = Correlator::new(&config, &template).unwrap();
//!
//! let energy = correlator.process(fmt.complex_from_f64(1.0, 0.0));
//! assert_eq!(fmt.to_f64(energy), 0.25);
//! ```

mod correlator;
mod engine;
mod kernel;
mod template;
mod window;

pub use correlator::Correlator;
pub use engine::{split_sample, RealConvolver};
pub use kernel::{kernel_for, CorrelationKernel, DirectKernel, SplitKernel, ThreeMultKernel};
pub use template::{combine, Template, ThreeMultTaps};
pub use window::SlidingWindow;
