//! Real-valued convolution engine used by the split strategy.

use std::sync::Arc;

use fixed_point::{CFixed, Fixed, FixedFormat};

use crate::window::SlidingWindow;

/// Split a complex sample into the three real streams `dr`, `di`, `dr + di`
#[inline]
pub fn split_sample(fmt: &FixedFormat, sample: CFixed) -> [Fixed; 3] {
    [sample.re, sample.im, fmt.add(sample.re, sample.im)]
}

/// Real FIR with its own delay line and one tap set
#[derive(Debug)]
pub struct RealConvolver {
    fmt: FixedFormat,
    taps: Arc<[Fixed]>,
    window: SlidingWindow<Fixed>,
}

impl RealConvolver {
    pub fn new(fmt: FixedFormat, taps: Arc<[Fixed]>) -> Self {
        let window = SlidingWindow::new(taps.len());
        Self { fmt, taps, window }
    }

    /// Shift `value` in and return `Σ window[j]·taps[j]`
    pub fn push(&mut self, value: Fixed) -> Fixed {
        self.window.push(value);
        let fmt = &self.fmt;
        self.window
            .iter()
            .zip(self.taps.iter())
            .fold(Fixed::ZERO, |acc, (&x, &c)| fmt.mac(acc, x, c))
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}
