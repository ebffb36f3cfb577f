//! Layered error definitions
//!
//! Categorized by source: config / numeric / pipeline

use fixed_point::FormatError;
use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Inputs inconsistent with the configuration (e.g. template length)
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    // ===== Numeric Errors =====
    /// Fixed-point format rejected
    #[error("invalid fixed-point format: {0}")]
    Format(#[from] FormatError),

    // ===== Pipeline Errors =====
    /// A stage lost its downstream (or upstream) channel before finishing
    #[error("channel closed early in stage '{stage}'")]
    ChannelClosed { stage: String },

    /// A stage task panicked or was aborted
    #[error("stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create channel closed error
    pub fn channel_closed(stage: impl Into<String>) -> Self {
        Self::ChannelClosed {
            stage: stage.into(),
        }
    }

    /// Create stage failure error
    pub fn stage_failed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageFailed {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
