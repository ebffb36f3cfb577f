//! Fixed-point format and real arithmetic.

use serde::{Deserialize, Serialize};

use crate::FormatError;

/// Raw fixed-point value.
///
/// Interpreted through a [`FixedFormat`]: `value = raw / 2^frac_bits`.
/// Ordering compares raw integers, which matches value ordering as long as
/// both operands share a format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Fixed(i64);

impl Fixed {
    /// Zero in every format
    pub const ZERO: Fixed = Fixed(0);

    /// Wrap a raw integer (caller guarantees it is in range for its format)
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw two's-complement integer
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Rule applied when a result has more fractional bits than the format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantization {
    /// Drop extra bits (floor toward negative infinity)
    #[default]
    Truncate,
    /// Round to nearest, ties toward positive infinity
    RoundHalfUp,
}

/// Rule applied when a result exceeds the representable range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overflow {
    /// Clamp to the nearest representable value
    #[default]
    Saturate,
    /// Keep the low `total_bits` bits (two's complement wrap-around)
    Wrap,
}

/// Fixed-point format: word width, integer bits and rounding rules.
///
/// Intermediate results (products, fused multiply-accumulate) are computed at
/// full precision in `i128` and quantized once on the way back into the
/// format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedFormat {
    total_bits: u32,
    int_bits: u32,
    #[serde(default)]
    quantization: Quantization,
    #[serde(default)]
    overflow: Overflow,
}

impl FixedFormat {
    /// Smallest supported word width
    pub const MIN_TOTAL_BITS: u32 = 2;
    /// Largest supported word width (products must fit comfortably in `i128`)
    pub const MAX_TOTAL_BITS: u32 = 32;

    /// Create a validated format
    ///
    /// # Errors
    /// - `total_bits` outside `[MIN_TOTAL_BITS, MAX_TOTAL_BITS]`
    /// - `int_bits` zero or wider than the word
    pub fn new(
        total_bits: u32,
        int_bits: u32,
        quantization: Quantization,
        overflow: Overflow,
    ) -> Result<Self, FormatError> {
        if !(Self::MIN_TOTAL_BITS..=Self::MAX_TOTAL_BITS).contains(&total_bits) {
            return Err(FormatError::TotalBits {
                total_bits,
                min: Self::MIN_TOTAL_BITS,
                max: Self::MAX_TOTAL_BITS,
            });
        }
        if int_bits == 0 || int_bits > total_bits {
            return Err(FormatError::IntBits {
                int_bits,
                total_bits,
            });
        }

        Ok(Self {
            total_bits,
            int_bits,
            quantization,
            overflow,
        })
    }

    /// Truncating, saturating format
    pub fn signed(total_bits: u32, int_bits: u32) -> Result<Self, FormatError> {
        Self::new(
            total_bits,
            int_bits,
            Quantization::Truncate,
            Overflow::Saturate,
        )
    }

    #[inline]
    pub fn total_bits(&self) -> u32 {
        self.total_bits
    }

    #[inline]
    pub fn int_bits(&self) -> u32 {
        self.int_bits
    }

    #[inline]
    pub fn frac_bits(&self) -> u32 {
        self.total_bits - self.int_bits
    }

    #[inline]
    pub fn quantization(&self) -> Quantization {
        self.quantization
    }

    #[inline]
    pub fn overflow(&self) -> Overflow {
        self.overflow
    }

    /// Weight of one least-significant bit
    pub fn lsb(&self) -> f64 {
        (-(self.frac_bits() as f64)).exp2()
    }

    /// Smallest raw value
    #[inline]
    pub fn min_raw(&self) -> i64 {
        -(1i64 << (self.total_bits - 1))
    }

    /// Largest raw value
    #[inline]
    pub fn max_raw(&self) -> i64 {
        (1i64 << (self.total_bits - 1)) - 1
    }

    /// Most negative representable value
    pub fn min_value(&self) -> f64 {
        self.min_raw() as f64 * self.lsb()
    }

    /// Most positive representable value
    pub fn max_value(&self) -> f64 {
        self.max_raw() as f64 * self.lsb()
    }

    /// Largest representable value as `Fixed`
    pub fn max_fixed(&self) -> Fixed {
        Fixed(self.max_raw())
    }

    /// Quantize a real number into this format
    ///
    /// NaN maps to zero; infinities follow the overflow rule.
    pub fn from_f64(&self, value: f64) -> Fixed {
        if value.is_nan() {
            return Fixed::ZERO;
        }
        let scaled = value * self.scale();
        let rounded = match self.quantization {
            Quantization::Truncate => scaled.floor(),
            Quantization::RoundHalfUp => (scaled + 0.5).floor(),
        };
        // `as` saturates at the i128 bounds
        self.fit(rounded as i128)
    }

    /// Real value of `x`
    #[inline]
    pub fn to_f64(&self, x: Fixed) -> f64 {
        x.0 as f64 * self.lsb()
    }

    /// `a + b`
    #[inline]
    pub fn add(&self, a: Fixed, b: Fixed) -> Fixed {
        self.fit(a.0 as i128 + b.0 as i128)
    }

    /// `a - b`
    #[inline]
    pub fn sub(&self, a: Fixed, b: Fixed) -> Fixed {
        self.fit(a.0 as i128 - b.0 as i128)
    }

    /// `a * b`, quantized once
    #[inline]
    pub fn mul(&self, a: Fixed, b: Fixed) -> Fixed {
        self.narrow(a.0 as i128 * b.0 as i128)
    }

    /// Fused multiply-accumulate: `acc + a * b` with a single quantization.
    ///
    /// The accumulator is aligned to the product's `2 * frac_bits` scale so
    /// the sum is exact before it is narrowed back into the format.
    #[inline]
    pub fn mac(&self, acc: Fixed, a: Fixed, b: Fixed) -> Fixed {
        self.narrow(self.widen(acc) + a.0 as i128 * b.0 as i128)
    }

    /// Lift a value to the double-precision product scale
    #[inline]
    pub(crate) fn widen(&self, x: Fixed) -> i128 {
        (x.0 as i128) << self.frac_bits()
    }

    /// Quantize a product-scale value and apply the overflow rule
    #[inline]
    pub(crate) fn narrow(&self, wide: i128) -> Fixed {
        self.fit(self.quantize(wide, self.frac_bits()))
    }

    /// Quantize a product-scale value, always saturating
    #[inline]
    pub(crate) fn narrow_saturating(&self, wide: i128) -> Fixed {
        self.saturate(self.quantize(wide, self.frac_bits()))
    }

    fn scale(&self) -> f64 {
        (self.frac_bits() as f64).exp2()
    }

    fn quantize(&self, wide: i128, shift: u32) -> i128 {
        if shift == 0 {
            return wide;
        }
        match self.quantization {
            Quantization::Truncate => wide >> shift,
            Quantization::RoundHalfUp => (wide + (1i128 << (shift - 1))) >> shift,
        }
    }

    fn fit(&self, raw: i128) -> Fixed {
        match self.overflow {
            Overflow::Saturate => self.saturate(raw),
            Overflow::Wrap => self.wrap(raw),
        }
    }

    fn saturate(&self, raw: i128) -> Fixed {
        Fixed(raw.clamp(self.min_raw() as i128, self.max_raw() as i128) as i64)
    }

    fn wrap(&self, raw: i128) -> Fixed {
        let modulus = 1i128 << self.total_bits;
        let mut low = raw.rem_euclid(modulus);
        if low > self.max_raw() as i128 {
            low -= modulus;
        }
        Fixed(low as i64)
    }
}
