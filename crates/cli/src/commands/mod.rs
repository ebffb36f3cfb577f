//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_detector;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::DetectorConfig;
use std::path::Path;

use crate::error::CliError;

/// Load a config file, failing early when it is missing
fn load_config(path: &Path) -> Result<DetectorConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }

    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
