//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration failed validation
    #[error("Configuration validation failed: {path}")]
    ConfigInvalid { path: String },

    /// Strategies disagreed on the same acquisition
    #[error("Strategies disagree on the peak: {details}")]
    StrategyMismatch { details: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_invalid(path: impl Into<String>) -> Self {
        Self::ConfigInvalid { path: path.into() }
    }

    pub fn strategy_mismatch(details: impl Into<String>) -> Self {
        Self::StrategyMismatch {
            details: details.into(),
        }
    }
}
