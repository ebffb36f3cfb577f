//! # Fixed Point
//!
//! Fixed-point numeric model shared by every stage of the detector.
//!
//! A value is stored as a raw two's-complement integer ([`Fixed`]); its meaning
//! comes from a [`FixedFormat`] (total width, integer bits, quantization and
//! overflow rules). All values flowing through one pipeline share one format,
//! so the format travels as a small `Copy` context instead of being carried by
//! every value.
//!
//! ## Example
//!
//! ```
//! use fixed_point::{FixedFormat, Overflow, Quantization};
//!
//! let fmt = FixedFormat::new(18, 2, Quantization::Truncate, Overflow::Saturate).unwrap();
//! let a = fmt.from_f64(0.5);
//! let b = fmt.from_f64(-0.25);
//! assert_eq!(fmt.to_f64(fmt.mul(a, b)), -0.125);
//!
//! let z = fmt.complex_from_f64(0.5, 0.25);
//! let w = fmt.complex_from_f64(0.5, -0.25);
//! let p = fmt.cmul(z, w);
//! assert_eq!(fmt.to_f64(p.re), 0.3125);
//! assert_eq!(fmt.to_f64(p.im), 0.0);
//! ```

mod complex;
mod error;
mod format;

pub use complex::CFixed;
pub use error::FormatError;
pub use format::{Fixed, FixedFormat, Overflow, Quantization};

pub use num_complex::{Complex, Complex64};
