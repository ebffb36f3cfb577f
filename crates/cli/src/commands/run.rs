//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{CorrelationStrategy, DetectorConfig};
use fixed_point::{CFixed, FixedFormat};
use observability::{EnergyStats, EnergySummary};
use pipeline::{Detection, PulseDetector};
use serde::Serialize;
use signal_source::{matched_template, pn_pulse, Scenario, DEFAULT_PN_LEVEL, DEFAULT_PN_SEED};
use tracing::{info, warn};

use super::load_config;
use crate::cli::RunArgs;
use crate::error::CliError;

/// One detector run, as reported
#[derive(Debug, Serialize)]
struct RunReport {
    strategy: CorrelationStrategy,
    mode: String,
    location: usize,
    reference_location: usize,
    peak_energy: f64,
    expected_peak: f64,
    peak_updates: u64,
    samples_supplied: usize,
    elapsed_ms: f64,
    energy: EnergyReport,
}

#[derive(Debug, Serialize)]
struct EnergyReport {
    count: u64,
    nonzero: u64,
    mean: f64,
    std_dev: f64,
    max: f64,
    peak_to_mean_db: f64,
}

impl From<&EnergySummary> for EnergyReport {
    fn from(summary: &EnergySummary) -> Self {
        Self {
            count: summary.energy.count,
            nonzero: summary.nonzero,
            mean: summary.energy.mean,
            std_dev: summary.energy.std_dev,
            max: summary.energy.max,
            peak_to_mean_db: summary.peak_to_mean_db,
        }
    }
}

#[derive(Debug, Serialize)]
struct ScenarioReport {
    filter_length: usize,
    signal_length: usize,
    align_at: usize,
    amplitude: f64,
    noise_std: f64,
    seed: u64,
}

#[derive(Debug, Serialize)]
struct RunOutput {
    scenario: ScenarioReport,
    runs: Vec<RunReport>,
    strategies_agree: bool,
}

/// Execute the `run` command
pub async fn run_detector(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut config = load_config(&args.config)?;
    apply_overrides(&mut config, args);
    config_loader::ConfigLoader::validate(&config).context("Invalid configuration overrides")?;

    let fmt = config.format()?;
    let filter_length = config.filter_length();
    let signal_length = config.signal_length();
    let align_at = args
        .align_at
        .unwrap_or_else(|| (signal_length / 5).max(filter_length - 1));

    info!(
        strategy = %config.strategy(),
        mode = %config.mode(),
        filter_length,
        signal_length,
        align_at,
        "Configuration loaded"
    );

    let scenario = Scenario::new(signal_length, align_at)
        .with_amplitude(args.amplitude)
        .with_noise(args.noise, args.seed);
    let pulse = pn_pulse(&fmt, filter_length, DEFAULT_PN_LEVEL, DEFAULT_PN_SEED);
    let template = matched_template(&fmt, &pulse);
    let samples = scenario
        .build(&fmt, &pulse)
        .context("Failed to build acquisition")?;
    let expected_peak = scenario.expected_peak(&fmt, &pulse);

    let strategies: Vec<CorrelationStrategy> = if args.compare_strategies {
        CorrelationStrategy::ALL.to_vec()
    } else {
        vec![config.strategy()]
    };

    let mut runs = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        let mut run_config = config.clone();
        run_config.detector.strategy = strategy;
        let report = detect_once(run_config, &fmt, &template, &samples, expected_peak)
            .await
            .with_context(|| format!("Detection failed for strategy {strategy}"))?;
        runs.push(report);
    }

    let strategies_agree = strategies_agree(&runs, &fmt, filter_length);

    let output = RunOutput {
        scenario: ScenarioReport {
            filter_length,
            signal_length,
            align_at,
            amplitude: args.amplitude,
            noise_std: args.noise,
            seed: args.seed,
        },
        runs,
        strategies_agree,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize results")?;
        println!("{}", json);
    } else {
        print_run_output(&output);
    }

    if !output.strategies_agree {
        let details = output
            .runs
            .iter()
            .map(|r| format!("{}@{}={:.6}", r.strategy, r.location, r.peak_energy))
            .collect::<Vec<_>>()
            .join(", ");
        warn!(%details, "Strategies disagree");
        return Err(CliError::strategy_mismatch(details).into());
    }

    info!("Pulse Detector finished");
    Ok(())
}

/// Largest peak energy difference between Direct and the three-multiply
/// strategies.
///
/// Each correlation component may differ by `3·L` LSB; through `re² + im²`
/// that becomes `2·√2·e·|s| + 2·e²`, plus one LSB per energy quantization.
fn energy_tolerance(fmt: &FixedFormat, filter_length: usize, peak: f64) -> f64 {
    let lsb = fmt.lsb();
    let e = 3.0 * filter_length as f64 * lsb;
    2.0 * std::f64::consts::SQRT_2 * e * peak.max(0.0).sqrt() + 2.0 * e * e + 2.0 * lsb
}

/// Same location everywhere; three_mult and split_engine bit-identical;
/// direct within rounding tolerance
fn strategies_agree(runs: &[RunReport], fmt: &FixedFormat, filter_length: usize) -> bool {
    let Some(first) = runs.first() else {
        return true;
    };
    if runs.iter().any(|r| r.location != first.location) {
        return false;
    }

    let peak_of = |strategy: CorrelationStrategy| {
        runs.iter()
            .find(|r| r.strategy == strategy)
            .map(|r| r.peak_energy)
    };
    if let (Some(three), Some(split)) = (
        peak_of(CorrelationStrategy::ThreeMult),
        peak_of(CorrelationStrategy::SplitEngine),
    ) {
        if three != split {
            return false;
        }
    }

    let largest = runs.iter().map(|r| r.peak_energy).fold(0.0, f64::max);
    let tolerance = energy_tolerance(fmt, filter_length, largest);
    runs.iter()
        .all(|r| (r.peak_energy - first.peak_energy).abs() <= tolerance)
}

fn apply_overrides(config: &mut DetectorConfig, args: &RunArgs) {
    if let Some(strategy) = args.strategy {
        info!(%strategy, "Overriding strategy from CLI");
        config.detector.strategy = strategy;
    }
    if let Some(mode) = args.mode {
        info!(%mode, "Overriding pipeline mode from CLI");
        config.pipeline.mode = mode;
    }
}

async fn detect_once(
    config: DetectorConfig,
    fmt: &FixedFormat,
    template: &[CFixed],
    samples: &[CFixed],
    expected_peak: f64,
) -> Result<RunReport> {
    let detector = PulseDetector::new(config, template)?;
    let (detection, energies) = detector.detect_with_energies(samples).await?;

    let mut stats = EnergyStats::new();
    stats.extend(energies.iter().map(|&e| fmt.to_f64(e)));
    let summary = stats.summary();

    Ok(report(&detection, expected_peak, &summary))
}

fn report(detection: &Detection, expected_peak: f64, summary: &EnergySummary) -> RunReport {
    RunReport {
        strategy: detection.strategy,
        mode: detection.mode.to_string(),
        location: detection.record.location,
        reference_location: detection.reference_location(),
        peak_energy: detection.peak_energy,
        expected_peak,
        peak_updates: detection.peak_updates,
        samples_supplied: detection.samples_supplied,
        elapsed_ms: detection.elapsed.as_secs_f64() * 1000.0,
        energy: EnergyReport::from(summary),
    }
}

fn print_run_output(output: &RunOutput) {
    let scenario = &output.scenario;
    println!("\n=== Pulse Detection ===\n");
    println!(
        "Acquisition: {} samples, {}-tap PN pulse ending at {}",
        scenario.signal_length, scenario.filter_length, scenario.align_at
    );
    println!(
        "  Amplitude: {}  Noise σ: {}  Seed: {}",
        scenario.amplitude, scenario.noise_std, scenario.seed
    );

    for run in &output.runs {
        println!("\n[{} / {}]", run.strategy, run.mode);
        println!(
            "  Peak: {:.6} (expected {:.6})",
            run.peak_energy, run.expected_peak
        );
        println!(
            "  Location: {} (reference {})",
            run.location, run.reference_location
        );
        println!("  Peak updates: {}", run.peak_updates);
        println!("  Elapsed: {:.3} ms", run.elapsed_ms);
        println!(
            "  Energy: mean={:.6}, std={:.6}, non-zero={}/{}, peak-to-mean={:.2} dB",
            run.energy.mean,
            run.energy.std_dev,
            run.energy.nonzero,
            run.energy.count,
            run.energy.peak_to_mean_db
        );
    }

    if output.runs.len() > 1 {
        let verdict = if output.strategies_agree {
            "agree"
        } else {
            "DIFFERENT"
        };
        println!("\nStrategies: {verdict}");
    }
    println!();
}
