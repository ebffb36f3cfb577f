//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::{CorrelationStrategy, PipelineMode};
use std::path::PathBuf;

/// Pulse Detector - fixed-point matched-filter pulse detection
#[derive(Parser, Debug)]
#[command(
    name = "pulse-detector",
    author,
    version,
    about = "Fixed-point matched-filter pulse detector",
    long_about = "Correlates a complex sample stream against a matched template in \n\
                  fixed-point arithmetic and reports the strongest correlation peak.\n\n\
                  The `run` command builds a synthetic acquisition (PN pulse, optional \n\
                  noise) and runs the detector over it."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "PULSE_DETECTOR_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "PULSE_DETECTOR_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the detector over a synthetic acquisition
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display numeric ranges and detector geometry
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "detector.toml",
        env = "PULSE_DETECTOR_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the correlation strategy (direct, three_mult, split_engine)
    #[arg(long, env = "PULSE_DETECTOR_STRATEGY")]
    pub strategy: Option<CorrelationStrategy>,

    /// Override the pipeline mode (concurrent, sequential)
    #[arg(long, env = "PULSE_DETECTOR_MODE")]
    pub mode: Option<PipelineMode>,

    /// Arrival index of the pulse's last sample (default: signal_length / 5)
    #[arg(long)]
    pub align_at: Option<usize>,

    /// Linear gain applied to the injected pulse
    #[arg(long, default_value = "1.0")]
    pub amplitude: f64,

    /// Standard deviation of complex Gaussian noise per component
    #[arg(long, default_value = "0.0")]
    pub noise: f64,

    /// Noise generator seed
    #[arg(long, default_value = "42", env = "PULSE_DETECTOR_SEED")]
    pub seed: u64,

    /// Run every strategy over the same acquisition and compare
    #[arg(long)]
    pub compare_strategies: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "detector.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "detector.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
