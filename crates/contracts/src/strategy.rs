//! Strategy and mode selectors

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the complex correlation sum is evaluated.
///
/// All variants compute the same quantity; they differ in multiplier count
/// and in how the work is split across stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrategy {
    /// Four real multiplies per tap
    #[default]
    Direct,
    /// Three real multiplies per tap with precomputed coefficient sums
    ThreeMult,
    /// Three independent real convolvers recombined after the fact
    SplitEngine,
}

impl CorrelationStrategy {
    pub const ALL: [CorrelationStrategy; 3] = [Self::Direct, Self::ThreeMult, Self::SplitEngine];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::ThreeMult => "three_mult",
            Self::SplitEngine => "split_engine",
        }
    }
}

impl fmt::Display for CorrelationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrelationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "direct" => Ok(Self::Direct),
            "three_mult" => Ok(Self::ThreeMult),
            "split_engine" => Ok(Self::SplitEngine),
            other => Err(format!(
                "unknown strategy '{other}' (expected direct, three_mult or split_engine)"
            )),
        }
    }
}

/// Pipeline execution mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    /// Stages run as tasks connected by bounded channels
    #[default]
    Concurrent,
    /// Stages run one after another in a single loop
    Sequential,
}

impl PipelineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concurrent => "concurrent",
            Self::Sequential => "sequential",
        }
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "concurrent" => Ok(Self::Concurrent),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!(
                "unknown pipeline mode '{other}' (expected concurrent or sequential)"
            )),
        }
    }
}
