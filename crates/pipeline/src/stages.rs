//! Stage loops for the concurrent pipeline.
//!
//! Every stage reads one item, computes, writes one item, and stops when its
//! input closes. A failed send means the downstream stage is gone; the stage
//! stops and reports `ChannelClosed` with its own name.

use std::any::Any;

use contracts::{ContractError, CorrelationStrategy, PeakRecord};
use correlator::{combine, split_sample, Correlator, RealConvolver};
use fixed_point::{CFixed, Fixed, FixedFormat};
use peak_tracker::PeakTracker;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

pub(crate) const SOURCE: &str = "source";
pub(crate) const CORRELATOR: &str = "correlator";
pub(crate) const SPLITTER: &str = "splitter";
pub(crate) const ENGINES: [&str; 3] = ["engine_re", "engine_im", "engine_sum"];
pub(crate) const COMBINER: &str = "combiner";
pub(crate) const PEAK_TRACKER: &str = "peak_tracker";

/// Concurrent stage names for a strategy, upstream first
pub fn stages_for(strategy: CorrelationStrategy) -> Vec<&'static str> {
    match strategy {
        CorrelationStrategy::SplitEngine => {
            let mut stages = vec![SOURCE, SPLITTER];
            stages.extend(ENGINES);
            stages.extend([COMBINER, PEAK_TRACKER]);
            stages
        }
        CorrelationStrategy::Direct | CorrelationStrategy::ThreeMult => {
            vec![SOURCE, CORRELATOR, PEAK_TRACKER]
        }
    }
}

/// Result of the peak tracking stage
#[derive(Debug, Clone, Default)]
pub(crate) struct PeakOutcome {
    pub record: PeakRecord,
    pub observed: usize,
    pub updates: u64,
    pub trace: Option<Vec<Fixed>>,
}

fn closed(stage: &str) -> ContractError {
    warn!(stage, "downstream channel closed, stopping stage");
    observability::record_channel_closed(stage);
    ContractError::channel_closed(stage)
}

/// Feed the prepared input, in order
#[instrument(name = "source_stage", skip_all, fields(samples = samples.len()))]
pub(crate) async fn source_stage(
    samples: Vec<CFixed>,
    tx: Sender<CFixed>,
) -> Result<(), ContractError> {
    for sample in samples {
        tx.send(sample).await.map_err(|_| closed(SOURCE))?;
    }
    debug!("source exhausted");
    Ok(())
}

/// Sample in, energy out
#[instrument(name = "correlator_stage", skip_all, fields(strategy = %correlator.strategy()))]
pub(crate) async fn correlator_stage(
    mut correlator: Correlator,
    mut rx: Receiver<CFixed>,
    tx: Sender<Fixed>,
) -> Result<(), ContractError> {
    let mut processed = 0u64;
    while let Some(sample) = rx.recv().await {
        let energy = correlator.process(sample);
        tx.send(energy).await.map_err(|_| closed(CORRELATOR))?;
        processed += 1;
    }
    observability::record_samples_processed(correlator.strategy().as_str(), processed);
    debug!(processed, "correlator drained");
    Ok(())
}

/// Complex sample in, three real streams out (`dr`, `di`, `dr + di`)
#[instrument(name = "splitter_stage", skip_all)]
pub(crate) async fn splitter_stage(
    fmt: FixedFormat,
    mut rx: Receiver<CFixed>,
    txs: [Sender<Fixed>; 3],
) -> Result<(), ContractError> {
    let mut processed = 0u64;
    while let Some(sample) = rx.recv().await {
        for (tx, value) in txs.iter().zip(split_sample(&fmt, sample)) {
            tx.send(value).await.map_err(|_| closed(SPLITTER))?;
        }
        processed += 1;
    }
    observability::record_samples_processed("split_engine", processed);
    debug!(processed, "splitter drained");
    Ok(())
}

/// One real FIR of the split engine
#[instrument(name = "convolver_stage", skip(engine, rx, tx))]
pub(crate) async fn convolver_stage(
    name: &'static str,
    mut engine: RealConvolver,
    mut rx: Receiver<Fixed>,
    tx: Sender<Fixed>,
) -> Result<(), ContractError> {
    while let Some(value) = rx.recv().await {
        let out = engine.push(value);
        tx.send(out).await.map_err(|_| closed(name))?;
    }
    Ok(())
}

/// Recombine the three real sums and emit the energy
#[instrument(name = "combiner_stage", skip_all)]
pub(crate) async fn combiner_stage(
    fmt: FixedFormat,
    rxs: [Receiver<Fixed>; 3],
    tx: Sender<Fixed>,
) -> Result<(), ContractError> {
    let [mut rx0, mut rx1, mut rx2] = rxs;
    loop {
        let a = rx0.recv().await;
        let b = rx1.recv().await;
        let c = rx2.recv().await;
        match (a, b, c) {
            (Some(a), Some(b), Some(c)) => {
                let energy = fmt.norm_sqr(combine(&fmt, a, b, c));
                tx.send(energy).await.map_err(|_| closed(COMBINER))?;
            }
            (None, None, None) => break,
            _ => {
                warn!("engine streams ended out of step");
                return Err(ContractError::channel_closed(COMBINER));
            }
        }
    }
    Ok(())
}

/// Track the running peak; optionally keep every energy
#[instrument(name = "peak_stage", skip(tracker, rx))]
pub(crate) async fn peak_stage(
    mut tracker: PeakTracker,
    mut rx: Receiver<Fixed>,
    keep_trace: bool,
) -> Result<PeakOutcome, ContractError> {
    let mut trace = keep_trace.then(Vec::new);
    while let Some(energy) = rx.recv().await {
        tracker.observe(energy);
        if let Some(trace) = trace.as_mut() {
            trace.push(energy);
        }
    }

    let observed = tracker.observed();
    let updates = tracker.updates();
    observability::record_peak_updates(updates);
    Ok(PeakOutcome {
        record: tracker.finish(),
        observed,
        updates,
        trace,
    })
}

/// Await a stage task, turning panics and aborts into `StageFailed`
pub(crate) async fn join_stage<T>(
    stage: &str,
    handle: JoinHandle<Result<T, ContractError>>,
) -> Result<T, ContractError> {
    match handle.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(ContractError::stage_failed(
            stage,
            format!("panicked: {}", panic_message(e.into_panic())),
        )),
        Err(e) => Err(ContractError::stage_failed(stage, e.to_string())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::DetectorConfig;
    use correlator::Template;
    use tokio::sync::mpsc;

    fn fmt() -> FixedFormat {
        FixedFormat::signed(18, 2).unwrap()
    }

    #[test]
    fn test_stages_for_strategy() {
        assert_eq!(
            stages_for(CorrelationStrategy::Direct),
            vec!["source", "correlator", "peak_tracker"]
        );
        assert_eq!(
            stages_for(CorrelationStrategy::ThreeMult),
            stages_for(CorrelationStrategy::Direct)
        );
        assert_eq!(
            stages_for(CorrelationStrategy::SplitEngine),
            vec![
                "source",
                "splitter",
                "engine_re",
                "engine_im",
                "engine_sum",
                "combiner",
                "peak_tracker"
            ]
        );
    }

    #[tokio::test]
    async fn test_source_reports_closed_downstream() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let err = source_stage(vec![fmt().complex_zero(); 3], tx)
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::ChannelClosed { ref stage } if stage == SOURCE));
    }

    #[tokio::test]
    async fn test_correlator_stage_reports_closed_downstream() {
        let fmt = fmt();
        let template = Template::new(&[fmt.complex_from_f64(0.5, 0.0)], 1).unwrap();
        let correlator = Correlator::with_template(fmt, template, CorrelationStrategy::Direct);

        let (sample_tx, sample_rx) = mpsc::channel(4);
        let (energy_tx, energy_rx) = mpsc::channel(4);
        drop(energy_rx);
        sample_tx.send(fmt.complex_from_f64(0.5, 0.0)).await.unwrap();
        drop(sample_tx);

        let err = correlator_stage(correlator, sample_rx, energy_tx)
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::ChannelClosed { ref stage } if stage == CORRELATOR));
    }

    #[tokio::test]
    async fn test_correlator_stage_preserves_order() {
        let fmt = fmt();
        let config = {
            let mut c = DetectorConfig::default();
            c.detector.filter_length = 1;
            c
        };
        let correlator = Correlator::new(&config, &[fmt.complex_from_f64(1.0, 0.0)]).unwrap();

        let (sample_tx, sample_rx) = mpsc::channel(2);
        let (energy_tx, mut energy_rx) = mpsc::channel(2);
        let stage = tokio::spawn(correlator_stage(correlator, sample_rx, energy_tx));

        let inputs = [0.125, 0.25, 0.5, 0.75];
        let feeder = tokio::spawn(async move {
            for v in inputs {
                sample_tx.send(fmt.complex_from_f64(v, 0.0)).await.unwrap();
            }
        });

        let mut energies = Vec::new();
        while let Some(e) = energy_rx.recv().await {
            energies.push(fmt.to_f64(e));
        }
        feeder.await.unwrap();
        stage.await.unwrap().unwrap();
        assert_eq!(energies, vec![0.015625, 0.0625, 0.25, 0.5625]);
    }

    #[tokio::test]
    async fn test_combiner_detects_uneven_streams() {
        let (tx0, rx0) = mpsc::channel(2);
        let (tx1, rx1) = mpsc::channel(2);
        let (tx2, rx2) = mpsc::channel(2);
        let (out_tx, _out_rx) = mpsc::channel(2);

        tx0.send(Fixed::ZERO).await.unwrap();
        drop((tx0, tx1, tx2));

        let err = combiner_stage(fmt(), [rx0, rx1, rx2], out_tx)
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::ChannelClosed { .. }));
    }

    #[tokio::test]
    async fn test_peak_stage_keeps_trace() {
        let (tx, rx) = mpsc::channel(8);
        for raw in [3, 1, 4, 1, 5] {
            tx.send(Fixed::from_raw(raw)).await.unwrap();
        }
        drop(tx);

        let outcome = peak_stage(PeakTracker::new(5), rx, true).await.unwrap();
        assert_eq!(outcome.record.location, 4);
        assert_eq!(outcome.observed, 5);
        assert_eq!(outcome.updates, 3);
        assert_eq!(outcome.trace.map(|t| t.len()), Some(5));
    }

    #[tokio::test]
    async fn test_join_stage_maps_panic() {
        let handle: JoinHandle<Result<(), ContractError>> =
            tokio::spawn(async { panic!("window exploded") });
        let err = join_stage(CORRELATOR, handle).await.unwrap_err();
        match err {
            ContractError::StageFailed { stage, message } => {
                assert_eq!(stage, CORRELATOR);
                assert!(message.contains("window exploded"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
