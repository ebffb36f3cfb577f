//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{CorrelationStrategy, DetectorConfig, PipelineMode};
use fixed_point::Overflow;
use serde::Serialize;
use signal_source::{pn_pulse, Scenario, DEFAULT_PN_LEVEL, DEFAULT_PN_SEED};
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    format: String,
    filter_length: usize,
    signal_length: usize,
    strategy: CorrelationStrategy,
    mode: PipelineMode,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        Err(CliError::config_invalid(result.config_path).into())
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    format: format!(
                        "Q{}.{} signed",
                        config.numeric.int_bits,
                        config.numeric.total_bits - config.numeric.int_bits
                    ),
                    filter_length: config.filter_length(),
                    signal_length: config.signal_length(),
                    strategy: config.strategy(),
                    mode: config.mode(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &DetectorConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.numeric.overflow == Overflow::Wrap {
        warnings.push(
            "overflow = wrap: correlation sums beyond the range wrap around and can hide a peak"
                .to_string(),
        );
    }

    // The built-in PN pulse must still produce a visible peak
    if let Ok(fmt) = config.format() {
        let pulse = pn_pulse(&fmt, config.filter_length(), DEFAULT_PN_LEVEL, DEFAULT_PN_SEED);
        let expected = Scenario::new(config.signal_length(), config.signal_length() - 1)
            .expected_peak(&fmt, &pulse);
        if expected < fmt.lsb() {
            warnings.push(format!(
                "reference PN peak energy {expected:.3e} is below one LSB ({:.3e})",
                fmt.lsb()
            ));
        } else if expected > fmt.max_value() {
            warnings.push(format!(
                "reference PN peak energy {expected:.3} saturates the format (max {:.3})",
                fmt.max_value()
            ));
        }
    }

    if config.mode() == PipelineMode::Concurrent && config.signal_length() < 64 {
        warnings.push(format!(
            "signal_length {} is small; sequential mode avoids task overhead",
            config.signal_length()
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Format: {}", summary.format);
            println!("  Filter length: {}", summary.filter_length);
            println!("  Signal length: {}", summary.signal_length);
            println!("  Strategy: {}", summary.strategy);
            println!("  Mode: {}", summary.mode);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_warnings() {
        assert!(collect_warnings(&DetectorConfig::default()).is_empty());
    }

    #[test]
    fn test_wrap_overflow_warns() {
        let mut config = DetectorConfig::default();
        config.numeric.overflow = Overflow::Wrap;
        let warnings = collect_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("wrap")));
    }

    #[test]
    fn test_coarse_format_warns_about_peak() {
        let mut config = DetectorConfig::default();
        config.numeric.total_bits = 8;
        config.numeric.int_bits = 2;
        config.detector.filter_length = 4;
        config.detector.signal_length = 100;
        let warnings = collect_warnings(&config);
        assert!(warnings.iter().any(|w| w.contains("below one LSB")));
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let args = ValidateArgs {
            config: "/nonexistent/detector.toml".into(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }
}
