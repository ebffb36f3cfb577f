//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{CorrelationStrategy, DetectorConfig};
use fixed_point::{FixedFormat, Overflow, Quantization};
use serde::Serialize;
use signal_source::{pn_pulse, pulse_energy, DEFAULT_PN_LEVEL, DEFAULT_PN_SEED};
use tracing::info;

use super::load_config;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    numeric: NumericInfo,
    detector: DetectorInfo,
    pipeline: PipelineInfo,
}

#[derive(Serialize)]
struct NumericInfo {
    total_bits: u32,
    int_bits: u32,
    frac_bits: u32,
    lsb: f64,
    min_value: f64,
    max_value: f64,
    quantization: Quantization,
    overflow: Overflow,
}

#[derive(Serialize)]
struct DetectorInfo {
    filter_length: usize,
    signal_length: usize,
    strategy: CorrelationStrategy,
    /// Complex coefficients in the template
    template_taps: usize,
    /// Real coefficients the strategy keeps
    coefficient_count: usize,
    /// Real multiplies per input sample
    multiplies_per_sample: usize,
    /// Ideal peak energy of the built-in PN pulse
    reference_peak: f64,
}

#[derive(Serialize)]
struct PipelineInfo {
    mode: String,
    stages: Vec<&'static str>,
    sample_capacity: usize,
    energy_capacity: usize,
    engine_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = load_config(&args.config)?;
    let fmt = config.format()?;
    let info = build_config_info(&config, &fmt);

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

/// Real coefficients and real multiplies per sample for a strategy
fn strategy_cost(strategy: CorrelationStrategy, filter_length: usize) -> (usize, usize) {
    match strategy {
        CorrelationStrategy::Direct => (2 * filter_length, 4 * filter_length),
        CorrelationStrategy::ThreeMult | CorrelationStrategy::SplitEngine => {
            (3 * filter_length, 3 * filter_length)
        }
    }
}

fn build_config_info(config: &DetectorConfig, fmt: &FixedFormat) -> ConfigInfo {
    let filter_length = config.filter_length();
    let (coefficient_count, multiplies_per_sample) =
        strategy_cost(config.strategy(), filter_length);
    let pulse = pn_pulse(fmt, filter_length, DEFAULT_PN_LEVEL, DEFAULT_PN_SEED);
    let energy = pulse_energy(fmt, &pulse);
    let channels = &config.pipeline.channels;

    ConfigInfo {
        numeric: NumericInfo {
            total_bits: fmt.total_bits(),
            int_bits: fmt.int_bits(),
            frac_bits: fmt.frac_bits(),
            lsb: fmt.lsb(),
            min_value: fmt.min_value(),
            max_value: fmt.max_value(),
            quantization: fmt.quantization(),
            overflow: fmt.overflow(),
        },
        detector: DetectorInfo {
            filter_length,
            signal_length: config.signal_length(),
            strategy: config.strategy(),
            template_taps: filter_length,
            coefficient_count,
            multiplies_per_sample,
            reference_peak: energy * energy,
        },
        pipeline: PipelineInfo {
            mode: config.mode().to_string(),
            stages: pipeline::stages_for(config.strategy()),
            sample_capacity: channels.sample_capacity,
            energy_capacity: channels.energy_capacity,
            engine_capacity: channels.engine_capacity,
        },
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Pulse Detector Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let n = &info.numeric;
    println!("🔢 Numeric");
    println!(
        "   ├─ Format: {} bits ({} integer, {} fraction)",
        n.total_bits, n.int_bits, n.frac_bits
    );
    println!("   ├─ Range: [{}, {}]", n.min_value, n.max_value);
    println!("   ├─ LSB: {:e}", n.lsb);
    println!("   └─ Rules: {:?} / {:?}", n.quantization, n.overflow);

    let d = &info.detector;
    println!("\n📡 Detector");
    println!("   ├─ Strategy: {}", d.strategy);
    println!("   ├─ Template taps: {}", d.template_taps);
    println!(
        "   ├─ Real coefficients: {}  Multiplies/sample: {}",
        d.coefficient_count, d.multiplies_per_sample
    );
    println!("   ├─ Signal length: {}", d.signal_length);
    println!("   └─ Reference PN peak: {:.6}", d.reference_peak);

    let p = &info.pipeline;
    println!("\n⚙️  Pipeline");
    println!("   ├─ Mode: {}", p.mode);
    println!("   ├─ Stages: {}", p.stages.join(" → "));
    println!(
        "   └─ Channels: sample={} energy={} engine={}",
        p.sample_capacity, p.energy_capacity, p.engine_capacity
    );

    println!();
}
