//! # Contracts
//!
//! Shared interface types for the pulse detector crates: configuration,
//! strategy selection, the peak record and the unified error type.
//! Every other crate depends on this one; it depends only on `fixed_point`.
//!
//! ## Index model
//! - Samples are numbered by 0-based arrival index
//! - A reported peak location is the index of the newest sample of the
//!   best-aligned window

mod config;
mod error;
mod peak;
mod strategy;

pub use config::*;
pub use error::*;
pub use peak::PeakRecord;
pub use strategy::*;
