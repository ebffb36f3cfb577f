//! Pseudo-noise pulse generation.

use fixed_point::{CFixed, FixedFormat};

/// Galois LFSR, polynomial x^31 + x^28 + 1
#[derive(Debug, Clone)]
pub struct PnSequence {
    seed: u32,
    state: u32,
}

impl PnSequence {
    const TAPS: u32 = 0x9000_0000;

    /// Zero would lock the register, so it is replaced with 1
    pub fn new(seed: u32) -> Self {
        let seed = if seed == 0 { 1 } else { seed };
        Self { seed, state: seed }
    }

    /// Next output bit
    pub fn next_bit(&mut self) -> bool {
        let bit = self.state & 1;
        self.state >>= 1;
        if bit == 1 {
            self.state ^= Self::TAPS;
        }
        bit == 1
    }

    pub fn reset(&mut self) {
        self.state = self.seed;
    }
}

impl Iterator for PnSequence {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        Some(self.next_bit())
    }
}

/// Default generator seed for pulses
pub const DEFAULT_PN_SEED: u32 = 0x1ACE_B00C;

/// Default component level: 1/16 is exact in any format with 4+ fraction bits
pub const DEFAULT_PN_LEVEL: f64 = 1.0 / 16.0;

/// QPSK pulse of `len` samples with components `±level`.
///
/// Two consecutive PN bits pick the signs of the real and imaginary parts.
pub fn pn_pulse(fmt: &FixedFormat, len: usize, level: f64, seed: u32) -> Vec<CFixed> {
    let mut pn = PnSequence::new(seed);
    let mut sign = || if pn.next_bit() { level } else { -level };
    (0..len)
        .map(|_| {
            let re = sign();
            let im = sign();
            fmt.complex_from_f64(re, im)
        })
        .collect()
}
