//! Config validation
//!
//! Rules:
//! - field ranges declared on the config types (`validator` derive)
//! - `int_bits <= total_bits`
//! - `filter_length <= signal_length`

use contracts::{ContractError, DetectorConfig};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validate a DetectorConfig
///
/// Returns the first error found, or Ok(()).
pub fn validate(config: &DetectorConfig) -> Result<(), ContractError> {
    validate_ranges(config)?;
    validate_numeric(config)?;
    validate_geometry(config)?;
    Ok(())
}

/// Declarative range rules
fn validate_ranges(config: &DetectorConfig) -> Result<(), ContractError> {
    match config.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let (field, message) = first_error("", &errors)
                .unwrap_or_else(|| ("config".to_string(), errors.to_string()));
            Err(ContractError::config_validation(field, message))
        }
    }
}

/// Depth-first walk for the first failing field, keys in sorted order so the
/// report is stable
fn first_error(prefix: &str, errors: &ValidationErrors) -> Option<(String, String)> {
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by_key(|(key, _)| key.to_string());

    for (key, kind) in entries {
        let path = format!("{prefix}{key}");
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(error) = list.first() {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    return Some((path, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                if let Some(found) = first_error(&format!("{path}."), nested) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    if let Some(found) = first_error(&format!("{path}[{index}]."), nested) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}

fn validate_numeric(config: &DetectorConfig) -> Result<(), ContractError> {
    let numeric = &config.numeric;
    if numeric.int_bits > numeric.total_bits {
        return Err(ContractError::config_validation(
            "numeric.int_bits",
            format!(
                "int_bits ({}) must not exceed total_bits ({})",
                numeric.int_bits, numeric.total_bits
            ),
        ));
    }
    Ok(())
}

fn validate_geometry(config: &DetectorConfig) -> Result<(), ContractError> {
    if config.filter_length() > config.signal_length() {
        return Err(ContractError::config_validation(
            "detector.filter_length",
            format!(
                "filter_length ({}) must not exceed signal_length ({})",
                config.filter_length(),
                config.signal_length()
            ),
        ));
    }
    Ok(())
}
