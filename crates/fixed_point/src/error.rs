//! Format construction errors

use thiserror::Error;

/// Invalid fixed-point format parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Total width outside the supported range
    #[error("total_bits must be in [{min}, {max}], got {total_bits}")]
    TotalBits { total_bits: u32, min: u32, max: u32 },

    /// Integer bits larger than the word or zero
    #[error("int_bits must be in [1, {total_bits}], got {int_bits}")]
    IntBits { int_bits: u32, total_bits: u32 },
}
