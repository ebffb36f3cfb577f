//! # Integration Tests
//!
//! End-to-end detector runs over synthetic acquisitions.
//!
//! Covers:
//! - Reference acquisition (64-tap PN pulse in 5000 samples)
//! - Strategy and mode equivalence on noisy and random input
//! - Config file to detection

#[cfg(test)]
mod contract_tests {
    use contracts::{DetectorConfig, PeakRecord};

    #[test]
    fn test_reference_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.filter_length(), 64);
        assert_eq!(config.signal_length(), 5000);
        assert_eq!(PeakRecord::default().reference_location(), 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use contracts::{ContractError, CorrelationStrategy, DetectorConfig, PeakRecord, PipelineMode};
    use fixed_point::{CFixed, FixedFormat};
    use pipeline::PulseDetector;
    use signal_source::{matched_template, pn_pulse, Scenario, DEFAULT_PN_LEVEL, DEFAULT_PN_SEED};

    const FILTER_LENGTH: usize = 64;
    const SIGNAL_LENGTH: usize = 5000;
    const ALIGN_AT: usize = 1000;

    fn config(strategy: CorrelationStrategy, mode: PipelineMode) -> DetectorConfig {
        let mut config = DetectorConfig::default();
        config.detector.strategy = strategy;
        config.pipeline.mode = mode;
        config
    }

    fn every_config() -> Vec<DetectorConfig> {
        CorrelationStrategy::ALL
            .iter()
            .flat_map(|&s| {
                [PipelineMode::Concurrent, PipelineMode::Sequential].map(|m| config(s, m))
            })
            .collect()
    }

    fn reference_signals(fmt: &FixedFormat) -> (Vec<CFixed>, Vec<CFixed>) {
        let pulse = pn_pulse(fmt, FILTER_LENGTH, DEFAULT_PN_LEVEL, DEFAULT_PN_SEED);
        (matched_template(fmt, &pulse), pulse)
    }

    /// End-to-end: 64-tap PN pulse ending at 1000 in 5000 samples
    ///
    /// Every strategy in both modes must find the aligned window at the same
    /// index, with the ideal energy (Σ|p|²)² = 0.5² = 0.25.
    #[tokio::test]
    async fn test_e2e_reference_acquisition() {
        let fmt = DetectorConfig::default().format().unwrap();
        let (template, pulse) = reference_signals(&fmt);
        let scenario = Scenario::new(SIGNAL_LENGTH, ALIGN_AT);
        let samples = scenario.build(&fmt, &pulse).unwrap();
        assert_eq!(scenario.expected_peak(&fmt, &pulse), 0.25);

        let mut records = Vec::new();
        for config in every_config() {
            let label = format!("{}/{}", config.strategy(), config.mode());
            let detector = PulseDetector::new(config, &template).unwrap();
            let detection = detector.detect(&samples).await.unwrap();

            assert_eq!(detection.record.location, ALIGN_AT, "{label}");
            assert_eq!(detection.reference_location(), ALIGN_AT + 1, "{label}");
            assert_eq!(detection.peak_energy, 0.25, "{label}");
            assert_eq!(detection.samples_supplied, SIGNAL_LENGTH);
            records.push(detection.record);
        }
        assert!(records.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[tokio::test]
    async fn test_e2e_noisy_acquisition() {
        let fmt = DetectorConfig::default().format().unwrap();
        let (template, pulse) = reference_signals(&fmt);
        let samples = Scenario::new(SIGNAL_LENGTH, ALIGN_AT)
            .with_noise(0.02, 7)
            .build(&fmt, &pulse)
            .unwrap();

        let mut traces = Vec::new();
        for config in every_config() {
            let (strategy, mode) = (config.strategy(), config.mode());
            let detector = PulseDetector::new(config, &template).unwrap();
            let (detection, trace) = detector.detect_with_energies(&samples).await.unwrap();

            assert_eq!(detection.record.location, ALIGN_AT, "{strategy}/{mode}");
            assert!((detection.peak_energy - 0.25).abs() < 0.08, "{strategy}/{mode}");
            traces.push((strategy, mode, detection, trace));
        }

        // Modes never change a strategy's output
        for pair in traces.chunks(2) {
            assert_eq!(pair[0].3, pair[1].3, "{}", pair[0].0);
            assert_eq!(pair[0].2.record, pair[1].2.record);
        }

        let find = |strategy: CorrelationStrategy| {
            traces
                .iter()
                .find(|t| t.0 == strategy)
                .map(|t| &t.2)
                .unwrap()
        };
        let direct = find(CorrelationStrategy::Direct);
        let three = find(CorrelationStrategy::ThreeMult);
        let split = find(CorrelationStrategy::SplitEngine);

        assert_eq!(three.record, split.record);
        assert_eq!(direct.record.location, three.record.location);
        assert!((direct.peak_energy - three.peak_energy).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_e2e_amplitude_scales_peak() {
        let fmt = DetectorConfig::default().format().unwrap();
        let (template, pulse) = reference_signals(&fmt);
        let scenario = Scenario::new(SIGNAL_LENGTH, 3000).with_amplitude(0.5);
        let samples = scenario.build(&fmt, &pulse).unwrap();

        let detector = PulseDetector::new(
            config(CorrelationStrategy::ThreeMult, PipelineMode::Concurrent),
            &template,
        )
        .unwrap();
        let detection = detector.detect(&samples).await.unwrap();

        assert_eq!(detection.record.location, 3000);
        assert_eq!(detection.peak_energy, scenario.expected_peak(&fmt, &pulse));
        assert_eq!(detection.peak_energy, 0.0625);
    }

    #[tokio::test]
    async fn test_e2e_all_zero_input() {
        let fmt = DetectorConfig::default().format().unwrap();
        let (template, _) = reference_signals(&fmt);
        let samples = vec![fmt.complex_zero(); SIGNAL_LENGTH];

        for config in every_config() {
            let detector = PulseDetector::new(config, &template).unwrap();
            let detection = detector.detect(&samples).await.unwrap();
            assert_eq!(detection.record, PeakRecord::default());
            assert_eq!(detection.reference_location(), 1);
        }
    }

    #[tokio::test]
    async fn test_e2e_short_input_padded() {
        let fmt = DetectorConfig::default().format().unwrap();
        let (template, pulse) = reference_signals(&fmt);
        let samples = Scenario::new(SIGNAL_LENGTH, ALIGN_AT)
            .build(&fmt, &pulse)
            .unwrap();

        let detector = PulseDetector::new(
            config(CorrelationStrategy::SplitEngine, PipelineMode::Concurrent),
            &template,
        )
        .unwrap();
        let (detection, trace) = detector
            .detect_with_energies(&samples[..ALIGN_AT + 1])
            .await
            .unwrap();

        assert_eq!(detection.samples_supplied, ALIGN_AT + 1);
        assert_eq!(trace.len(), SIGNAL_LENGTH);
        assert_eq!(detection.record.location, ALIGN_AT);
    }

    #[tokio::test]
    async fn test_e2e_template_shorter_than_filter() {
        let fmt = DetectorConfig::default().format().unwrap();
        let (template, _) = reference_signals(&fmt);

        for config in every_config() {
            let err = PulseDetector::new(config, &template[..FILTER_LENGTH - 1]).unwrap_err();
            assert!(matches!(err, ContractError::InvalidConfiguration { .. }));
        }
    }
}

#[cfg(test)]
mod property_tests {
    use contracts::{CorrelationStrategy, DetectorConfig, PipelineMode};
    use fixed_point::{CFixed, FixedFormat};
    use pipeline::PulseDetector;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_complex(rng: &mut StdRng, fmt: &FixedFormat, len: usize, scale: f64) -> Vec<CFixed> {
        (0..len)
            .map(|_| {
                fmt.complex_from_f64(
                    rng.random_range(-scale..scale),
                    rng.random_range(-scale..scale),
                )
            })
            .collect()
    }

    /// Seeded random templates and streams: the three strategies agree, and
    /// the record is always the first maximum of the trace
    #[tokio::test]
    async fn test_random_strategies_agree() {
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let filter_length = 16;
        let signal_length = 256;

        for round in 0..10 {
            let mut base = DetectorConfig::default();
            base.detector.filter_length = filter_length;
            base.detector.signal_length = signal_length;
            if round % 2 == 1 {
                base.pipeline.mode = PipelineMode::Sequential;
            }
            let fmt = base.format().unwrap();
            // Small values keep every sum far from saturation
            let template = random_complex(&mut rng, &fmt, filter_length, 0.1);
            let samples = random_complex(&mut rng, &fmt, signal_length, 0.1);

            let mut traces = Vec::new();
            for strategy in CorrelationStrategy::ALL {
                let mut config = base.clone();
                config.detector.strategy = strategy;
                let detector = PulseDetector::new(config, &template).unwrap();
                let (detection, trace) = detector.detect_with_energies(&samples).await.unwrap();

                let max = trace.iter().copied().max().unwrap();
                if !max.is_zero() {
                    assert_eq!(detection.record.peak, max, "round {round} {strategy}");
                    assert_eq!(
                        detection.record.location,
                        trace.iter().position(|&e| e == max).unwrap()
                    );
                }
                traces.push(trace);
            }

            // Three-mult and split engine are bit-identical
            assert_eq!(traces[1], traces[2], "round {round}");
            // Direct differs by truncation only
            for (d, t) in traces[0].iter().zip(&traces[1]) {
                assert!((fmt.to_f64(*d) - fmt.to_f64(*t)).abs() < 1e-3, "round {round}");
            }
        }
    }
}

#[cfg(test)]
mod config_tests {
    use std::io::Write;

    use config_loader::ConfigLoader;
    use contracts::{CorrelationStrategy, PipelineMode};
    use pipeline::PulseDetector;
    use signal_source::{matched_template, pn_pulse, Scenario, DEFAULT_PN_LEVEL};

    const CONFIG: &str = r#"
[numeric]
total_bits = 16
int_bits = 2
quantization = "round_half_up"

[detector]
filter_length = 32
signal_length = 600
strategy = "split_engine"

[pipeline]
mode = "concurrent"
[pipeline.channels]
sample_capacity = 1
energy_capacity = 1
engine_capacity = 1
"#;

    #[tokio::test]
    async fn test_config_file_to_detection() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.strategy(), CorrelationStrategy::SplitEngine);
        assert_eq!(config.mode(), PipelineMode::Concurrent);

        let fmt = config.format().unwrap();
        let pulse = pn_pulse(&fmt, 32, DEFAULT_PN_LEVEL, 0xBEEF);
        let template = matched_template(&fmt, &pulse);
        let samples = Scenario::new(600, 450).build(&fmt, &pulse).unwrap();

        let detector = PulseDetector::new(config, &template).unwrap();
        let detection = detector.detect(&samples).await.unwrap();

        // 32 taps of |p|² = 1/128 -> Σ = 0.25 -> energy 1/16
        assert_eq!(detection.record.location, 450);
        assert_eq!(detection.peak_energy, 0.0625);
    }

    #[test]
    fn test_json_round_trip_of_loaded_file() {
        let config =
            ConfigLoader::load_from_str(CONFIG, config_loader::ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let again =
            ConfigLoader::load_from_str(&json, config_loader::ConfigFormat::Json).unwrap();
        assert_eq!(config, again);
    }
}
