//! Synthetic receive scenarios: a known pulse buried in a sample stream.

use contracts::ContractError;
use fixed_point::{CFixed, Complex64, Fixed, FixedFormat};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Template that makes the (non-conjugating) correlator a matched filter
/// for `pulse`: time-reversed and conjugated.
///
/// With the window newest-first, tap `j` meets the sample `j` positions
/// back, so the aligned sum is `Σ |p|²`.
pub fn matched_template(fmt: &FixedFormat, pulse: &[CFixed]) -> Vec<CFixed> {
    pulse
        .iter()
        .rev()
        .map(|p| CFixed::new(p.re, fmt.sub(Fixed::ZERO, p.im)))
        .collect()
}

/// Pulse energy `Σ |p|²` in real units
pub fn pulse_energy(fmt: &FixedFormat, pulse: &[CFixed]) -> f64 {
    pulse
        .iter()
        .map(|&p| fmt.complex_to_c64(p).norm_sqr())
        .sum()
}

/// Where and how strongly a pulse is injected into a stream of zeros
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Stream length
    pub signal_length: usize,
    /// Arrival index of the pulse's last sample
    pub align_at: usize,
    /// Linear gain applied to the pulse
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    /// Standard deviation of complex Gaussian noise per component
    #[serde(default)]
    pub noise_std: f64,
    #[serde(default)]
    pub seed: u64,
}

fn default_amplitude() -> f64 {
    1.0
}

impl Scenario {
    pub fn new(signal_length: usize, align_at: usize) -> Self {
        Self {
            signal_length,
            align_at,
            amplitude: default_amplitude(),
            noise_std: 0.0,
            seed: 0,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_noise(mut self, noise_std: f64, seed: u64) -> Self {
        self.noise_std = noise_std;
        self.seed = seed;
        self
    }

    /// Ideal peak energy `(amplitude · Σ|p|²)²` for a matched template
    pub fn expected_peak(&self, fmt: &FixedFormat, pulse: &[CFixed]) -> f64 {
        let gain = self.amplitude * pulse_energy(fmt, pulse);
        gain * gain
    }

    /// Render the stream.
    ///
    /// The pulse occupies `align_at - (len - 1) ..= align_at`; everything is
    /// summed in `f64` and quantized once per sample.
    ///
    /// # Errors
    /// `InvalidConfiguration` when the noise deviation is negative or not
    /// finite, or when the pulse does not fit in the stream at `align_at`.
    pub fn build(&self, fmt: &FixedFormat, pulse: &[CFixed]) -> Result<Vec<CFixed>, ContractError> {
        if !(self.noise_std.is_finite() && self.noise_std >= 0.0) {
            return Err(ContractError::invalid_configuration(format!(
                "noise_std must be finite and >= 0, got {}",
                self.noise_std
            )));
        }
        if pulse.is_empty() {
            return Err(ContractError::invalid_configuration("pulse is empty"));
        }
        if self.align_at >= self.signal_length {
            return Err(ContractError::invalid_configuration(format!(
                "align_at {} outside signal of length {}",
                self.align_at, self.signal_length
            )));
        }
        let start = (self.align_at + 1).checked_sub(pulse.len()).ok_or_else(|| {
            ContractError::invalid_configuration(format!(
                "pulse of {} samples cannot end at index {}",
                pulse.len(),
                self.align_at
            ))
        })?;

        let mut stream = vec![Complex64::new(0.0, 0.0); self.signal_length];
        for (slot, &p) in stream[start..=self.align_at].iter_mut().zip(pulse) {
            *slot = fmt.complex_to_c64(p) * self.amplitude;
        }

        if self.noise_std > 0.0 {
            let normal = Normal::new(0.0, self.noise_std).map_err(|e| {
                ContractError::invalid_configuration(format!("noise_std {}: {e}", self.noise_std))
            })?;
            let mut rng = StdRng::seed_from_u64(self.seed);
            for slot in stream.iter_mut() {
                slot.re += normal.sample(&mut rng);
                slot.im += normal.sample(&mut rng);
            }
        }

        debug!(
            signal_length = self.signal_length,
            start,
            align_at = self.align_at,
            amplitude = self.amplitude,
            noise_std = self.noise_std,
            "scenario rendered"
        );

        Ok(stream.into_iter().map(|z| fmt.complex_from_c64(z)).collect())
    }
}
