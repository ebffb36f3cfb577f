//! Complex fixed-point algebra.

use num_complex::{Complex, Complex64};

use crate::{Fixed, FixedFormat};

/// Complex sample or coefficient with fixed-point parts
pub type CFixed = Complex<Fixed>;

impl FixedFormat {
    /// Complex zero
    #[inline]
    pub fn complex_zero(&self) -> CFixed {
        Complex::new(Fixed::ZERO, Fixed::ZERO)
    }

    /// Quantize a complex number given as real/imaginary parts
    pub fn complex_from_f64(&self, re: f64, im: f64) -> CFixed {
        Complex::new(self.from_f64(re), self.from_f64(im))
    }

    /// Quantize a floating-point complex number
    pub fn complex_from_c64(&self, z: Complex64) -> CFixed {
        self.complex_from_f64(z.re, z.im)
    }

    /// Real value of a complex fixed-point number
    pub fn complex_to_c64(&self, z: CFixed) -> Complex64 {
        Complex64::new(self.to_f64(z.re), self.to_f64(z.im))
    }

    #[inline]
    pub fn cadd(&self, a: CFixed, b: CFixed) -> CFixed {
        Complex::new(self.add(a.re, b.re), self.add(a.im, b.im))
    }

    #[inline]
    pub fn csub(&self, a: CFixed, b: CFixed) -> CFixed {
        Complex::new(self.sub(a.re, b.re), self.sub(a.im, b.im))
    }

    /// `(a + bi)(c + di) = (ac - bd) + (ad + bc)i`, no conjugation.
    ///
    /// Each component is formed at full precision and quantized once.
    #[inline]
    pub fn cmul(&self, z: CFixed, w: CFixed) -> CFixed {
        let (a, b) = (z.re.raw() as i128, z.im.raw() as i128);
        let (c, d) = (w.re.raw() as i128, w.im.raw() as i128);
        Complex::new(self.narrow(a * c - b * d), self.narrow(a * d + b * c))
    }

    /// `re^2 + im^2`.
    ///
    /// Always saturates regardless of the format's overflow rule, so the
    /// result is never negative.
    #[inline]
    pub fn norm_sqr(&self, z: CFixed) -> Fixed {
        let (re, im) = (z.re.raw() as i128, z.im.raw() as i128);
        self.narrow_saturating(re * re + im * im)
    }
}
