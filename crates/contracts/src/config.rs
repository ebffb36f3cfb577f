//! DetectorConfig - Config Loader output
//!
//! Numeric format, detector geometry, strategy selection and pipeline
//! channel sizing. Every section defaults to the reference configuration
//! (18-bit samples with 2 integer bits, 64 taps, 5000 samples).

use fixed_point::{FixedFormat, Overflow, Quantization};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{ContractError, CorrelationStrategy, PipelineMode};

/// Complete detector configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct DetectorConfig {
    #[serde(default)]
    #[validate(nested)]
    pub numeric: NumericConfig,

    #[serde(default)]
    #[validate(nested)]
    pub detector: DetectorSettings,

    #[serde(default)]
    #[validate(nested)]
    pub pipeline: PipelineConfig,
}

impl DetectorConfig {
    /// Fixed-point format shared by samples, coefficients and energies
    pub fn format(&self) -> Result<FixedFormat, ContractError> {
        self.numeric.format()
    }

    pub fn filter_length(&self) -> usize {
        self.detector.filter_length
    }

    pub fn signal_length(&self) -> usize {
        self.detector.signal_length
    }

    pub fn strategy(&self) -> CorrelationStrategy {
        self.detector.strategy
    }

    pub fn mode(&self) -> PipelineMode {
        self.pipeline.mode
    }
}

/// Fixed-point format parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NumericConfig {
    /// Word width in bits
    #[serde(default = "default_total_bits")]
    #[validate(range(min = 2, max = 32, message = "total_bits must be in [2, 32]"))]
    pub total_bits: u32,

    /// Integer bits including the sign bit
    #[serde(default = "default_int_bits")]
    #[validate(range(min = 1, message = "int_bits must be >= 1"))]
    pub int_bits: u32,

    #[serde(default)]
    pub quantization: Quantization,

    #[serde(default)]
    pub overflow: Overflow,
}

fn default_total_bits() -> u32 {
    18
}

fn default_int_bits() -> u32 {
    2
}

impl Default for NumericConfig {
    fn default() -> Self {
        Self {
            total_bits: default_total_bits(),
            int_bits: default_int_bits(),
            quantization: Quantization::default(),
            overflow: Overflow::default(),
        }
    }
}

impl NumericConfig {
    pub fn format(&self) -> Result<FixedFormat, ContractError> {
        Ok(FixedFormat::new(
            self.total_bits,
            self.int_bits,
            self.quantization,
            self.overflow,
        )?)
    }
}

/// Detector geometry and algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DetectorSettings {
    /// Template taps (sliding window length)
    #[serde(default = "default_filter_length")]
    #[validate(range(min = 1, message = "filter_length must be >= 1"))]
    pub filter_length: usize,

    /// Samples processed per run
    #[serde(default = "default_signal_length")]
    #[validate(range(min = 1, message = "signal_length must be >= 1"))]
    pub signal_length: usize,

    #[serde(default)]
    pub strategy: CorrelationStrategy,
}

fn default_filter_length() -> usize {
    64
}

fn default_signal_length() -> usize {
    5000
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            filter_length: default_filter_length(),
            signal_length: default_signal_length(),
            strategy: CorrelationStrategy::default(),
        }
    }
}

/// Pipeline execution settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    #[serde(default)]
    pub mode: PipelineMode,

    #[serde(default)]
    #[validate(nested)]
    pub channels: ChannelConfig,
}

/// Bounded channel capacities between stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ChannelConfig {
    /// Source -> correlator (or splitter)
    #[serde(default = "default_sample_capacity")]
    #[validate(range(min = 1, message = "sample_capacity must be >= 1"))]
    pub sample_capacity: usize,

    /// Correlator (or combiner) -> peak tracker
    #[serde(default = "default_energy_capacity")]
    #[validate(range(min = 1, message = "energy_capacity must be >= 1"))]
    pub energy_capacity: usize,

    /// Links between split-engine stages
    #[serde(default = "default_engine_capacity")]
    #[validate(range(min = 1, message = "engine_capacity must be >= 1"))]
    pub engine_capacity: usize,
}

fn default_sample_capacity() -> usize {
    4
}

fn default_energy_capacity() -> usize {
    4
}

fn default_engine_capacity() -> usize {
    2
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            sample_capacity: default_sample_capacity(),
            energy_capacity: default_energy_capacity(),
            engine_capacity: default_engine_capacity(),
        }
    }
}
