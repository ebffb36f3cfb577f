//! # Pipeline
//!
//! Runs the detector over one acquisition window.
//!
//! Two modes produce the same result:
//! - **Concurrent**: tokio tasks connected by bounded `mpsc` channels
//!   (source → correlator → peak tracker; the split engine fans out to three
//!   real convolvers and joins them again in a combiner)
//! - **Sequential**: one loop, useful as a baseline and for small inputs
//!
//! ## Example
//!
//! ```ignore
//! use pipeline::PulseDetector;
//!
//! let detector = PulseDetector::new(config, &template)?;
//! let detection = detector.detect(&samples).await?;
//! println!("peak at {}", detection.record.location);
//! ```

mod detector;
mod stages;

pub use detector::{Detection, PulseDetector};
pub use stages::stages_for;
