//! PulseDetector - stage wiring and run modes.

use std::time::{Duration, Instant};

use contracts::{ContractError, CorrelationStrategy, DetectorConfig, PeakRecord, PipelineMode};
use correlator::{Correlator, RealConvolver, Template, ThreeMultTaps};
use fixed_point::{CFixed, Fixed, FixedFormat};
use peak_tracker::PeakTracker;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::stages::{self, PeakOutcome};

/// Outcome of one detection run
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub record: PeakRecord,
    /// Samples the caller handed in (before padding or truncation)
    pub samples_supplied: usize,
    pub strategy: CorrelationStrategy,
    pub mode: PipelineMode,
    pub elapsed: Duration,
    /// Peak energy in real units
    pub peak_energy: f64,
    /// Times the running peak moved
    pub peak_updates: u64,
}

impl Detection {
    /// Location in the reference model's numbering
    pub fn reference_location(&self) -> usize {
        self.record.reference_location()
    }
}

/// Matched-filter pulse detector.
///
/// Owns a validated configuration and template; every [`detect`](Self::detect)
/// call builds a fresh window and peak record, processes exactly
/// `signal_length` samples and reports the strongest correlation.
#[derive(Debug, Clone)]
pub struct PulseDetector {
    config: DetectorConfig,
    fmt: FixedFormat,
    template: Template,
}

impl PulseDetector {
    /// # Errors
    /// - Invalid fixed-point format
    /// - Zero `filter_length`, `signal_length` or channel capacity
    /// - Template length different from `filter_length`
    #[instrument(
        name = "pulse_detector_new",
        skip(config, template),
        fields(
            strategy = %config.strategy(),
            mode = %config.mode(),
            filter_length = config.filter_length(),
            signal_length = config.signal_length()
        )
    )]
    pub fn new(config: DetectorConfig, template: &[CFixed]) -> Result<Self, ContractError> {
        let fmt = config.format()?;
        if config.signal_length() == 0 {
            return Err(ContractError::invalid_configuration(
                "signal_length must be >= 1",
            ));
        }
        let channels = &config.pipeline.channels;
        for (name, capacity) in [
            ("sample_capacity", channels.sample_capacity),
            ("energy_capacity", channels.energy_capacity),
            ("engine_capacity", channels.engine_capacity),
        ] {
            if capacity == 0 {
                return Err(ContractError::invalid_configuration(format!(
                    "{name} must be >= 1"
                )));
            }
        }
        let template = Template::new(template, config.filter_length())?;

        debug!("pulse detector ready");
        Ok(Self {
            config,
            fmt,
            template,
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn format(&self) -> FixedFormat {
        self.fmt
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Run one detection over `samples`.
    ///
    /// Fewer than `signal_length` samples are zero-padded; extra samples are
    /// ignored.
    pub async fn detect(&self, samples: &[CFixed]) -> Result<Detection, ContractError> {
        let (detection, _) = self.run(samples, false).await?;
        Ok(detection)
    }

    /// Like [`detect`](Self::detect), also returning every energy in
    /// arrival order
    pub async fn detect_with_energies(
        &self,
        samples: &[CFixed],
    ) -> Result<(Detection, Vec<Fixed>), ContractError> {
        let (detection, trace) = self.run(samples, true).await?;
        Ok((detection, trace.unwrap_or_default()))
    }

    #[instrument(
        name = "pulse_detector_run",
        skip(self, samples),
        fields(
            strategy = %self.config.strategy(),
            mode = %self.config.mode(),
            supplied = samples.len()
        )
    )]
    async fn run(
        &self,
        samples: &[CFixed],
        keep_trace: bool,
    ) -> Result<(Detection, Option<Vec<Fixed>>), ContractError> {
        let start = Instant::now();
        let input = self.frame_input(samples);

        let outcome = match self.config.mode() {
            PipelineMode::Concurrent => self.run_concurrent(input, keep_trace).await?,
            PipelineMode::Sequential => self.run_sequential(input, keep_trace),
        };

        let detection = Detection {
            record: outcome.record,
            samples_supplied: samples.len(),
            strategy: self.config.strategy(),
            mode: self.config.mode(),
            elapsed: start.elapsed(),
            peak_energy: self.fmt.to_f64(outcome.record.peak),
            peak_updates: outcome.updates,
        };

        observability::record_detection(
            detection.strategy.as_str(),
            detection.mode.as_str(),
            detection.peak_energy,
            detection.record.location,
            detection.elapsed,
        );
        info!(
            peak = detection.peak_energy,
            location = detection.record.location,
            reference_location = detection.reference_location(),
            updates = detection.peak_updates,
            observed = outcome.observed,
            elapsed_ms = format!("{:.3}", detection.elapsed.as_secs_f64() * 1000.0),
            "Detection complete"
        );

        Ok((detection, outcome.trace))
    }

    /// Exactly `signal_length` samples: pad with zeros or drop the excess
    fn frame_input(&self, samples: &[CFixed]) -> Vec<CFixed> {
        let signal_length = self.config.signal_length();
        let mut input: Vec<CFixed> = samples.iter().take(signal_length).copied().collect();

        if samples.len() > signal_length {
            warn!(
                supplied = samples.len(),
                signal_length,
                ignored = samples.len() - signal_length,
                "more samples than signal_length, extra samples ignored"
            );
        } else if samples.len() < signal_length {
            warn!(
                supplied = samples.len(),
                signal_length,
                padded = signal_length - samples.len(),
                "fewer samples than signal_length, padding with zeros"
            );
            input.resize(signal_length, self.fmt.complex_zero());
        }
        input
    }

    fn run_sequential(&self, input: Vec<CFixed>, keep_trace: bool) -> PeakOutcome {
        let mut correlator =
            Correlator::with_template(self.fmt, self.template.clone(), self.config.strategy());
        let mut tracker = PeakTracker::new(self.config.signal_length());
        let mut trace = keep_trace.then(|| Vec::with_capacity(input.len()));

        for sample in input {
            let energy = correlator.process(sample);
            tracker.observe(energy);
            if let Some(trace) = trace.as_mut() {
                trace.push(energy);
            }
        }

        observability::record_samples_processed(
            self.config.strategy().as_str(),
            tracker.observed() as u64,
        );
        observability::record_peak_updates(tracker.updates());

        PeakOutcome {
            observed: tracker.observed(),
            updates: tracker.updates(),
            record: tracker.finish(),
            trace,
        }
    }

    async fn run_concurrent(
        &self,
        input: Vec<CFixed>,
        keep_trace: bool,
    ) -> Result<PeakOutcome, ContractError> {
        let channels = &self.config.pipeline.channels;
        let fmt = self.fmt;
        let (sample_tx, sample_rx) = mpsc::channel(channels.sample_capacity);
        let (energy_tx, energy_rx) = mpsc::channel(channels.energy_capacity);

        let mut tasks: Vec<(&'static str, JoinHandle<Result<(), ContractError>>)> = Vec::new();
        tasks.push((
            stages::SOURCE,
            tokio::spawn(stages::source_stage(input, sample_tx)),
        ));

        match self.config.strategy() {
            CorrelationStrategy::SplitEngine => {
                let taps = ThreeMultTaps::from_template(&self.template, &fmt);
                let (split_txs, split_rxs) = links(channels.engine_capacity);
                let (out_txs, out_rxs) = links(channels.engine_capacity);

                tasks.push((
                    stages::SPLITTER,
                    tokio::spawn(stages::splitter_stage(fmt, sample_rx, split_txs)),
                ));
                for (((name, set), rx), tx) in stages::ENGINES
                    .into_iter()
                    .zip(taps.streams())
                    .zip(split_rxs)
                    .zip(out_txs)
                {
                    let engine = RealConvolver::new(fmt, set);
                    tasks.push((
                        name,
                        tokio::spawn(stages::convolver_stage(name, engine, rx, tx)),
                    ));
                }
                tasks.push((
                    stages::COMBINER,
                    tokio::spawn(stages::combiner_stage(fmt, out_rxs, energy_tx)),
                ));
            }
            strategy => {
                let correlator = Correlator::with_template(fmt, self.template.clone(), strategy);
                tasks.push((
                    stages::CORRELATOR,
                    tokio::spawn(stages::correlator_stage(correlator, sample_rx, energy_tx)),
                ));
            }
        }

        let tracker = PeakTracker::new(self.config.signal_length());
        let peak = tokio::spawn(stages::peak_stage(tracker, energy_rx, keep_trace));
        debug!(stages = tasks.len() + 1, "pipeline stages spawned");

        // Panics outrank the channel closures they cause downstream
        let mut failed = None;
        let mut closed = None;
        for (name, handle) in tasks {
            match stages::join_stage(name, handle).await {
                Ok(()) => {}
                Err(e @ ContractError::StageFailed { .. }) => {
                    failed.get_or_insert(e);
                }
                Err(e) => {
                    closed.get_or_insert(e);
                }
            }
        }
        let outcome = stages::join_stage(stages::PEAK_TRACKER, peak).await;

        if let Some(e) = failed {
            return Err(e);
        }
        let outcome = outcome?;
        if let Some(e) = closed {
            return Err(e);
        }
        Ok(outcome)
    }
}

/// Three bounded links for the split engine
fn links(capacity: usize) -> ([Sender<Fixed>; 3], [Receiver<Fixed>; 3]) {
    let (tx0, rx0) = mpsc::channel(capacity);
    let (tx1, rx1) = mpsc::channel(capacity);
    let (tx2, rx2) = mpsc::channel(capacity);
    ([tx0, tx1, tx2], [rx0, rx1, rx2])
}
