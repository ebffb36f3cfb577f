//! Detector metrics
//!
//! Counters and gauges go through the `metrics` facade; energy traces are
//! summarized in memory for reports.

use std::fmt;
use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Record samples pushed through a correlator
pub fn record_samples_processed(strategy: &str, count: u64) {
    counter!(
        "pulse_detector_samples_total",
        "strategy" => strategy.to_string()
    )
    .increment(count);
}

/// Record how many times the running peak moved
pub fn record_peak_updates(count: u64) {
    counter!("pulse_detector_peak_updates_total").increment(count);
}

/// Record a finished detection
pub fn record_detection(
    strategy: &str,
    mode: &str,
    peak_energy: f64,
    location: usize,
    elapsed: Duration,
) {
    counter!(
        "pulse_detector_detections_total",
        "strategy" => strategy.to_string(),
        "mode" => mode.to_string()
    )
    .increment(1);

    gauge!("pulse_detector_peak_energy").set(peak_energy);
    gauge!("pulse_detector_peak_location").set(location as f64);

    histogram!(
        "pulse_detector_run_duration_ms",
        "strategy" => strategy.to_string()
    )
    .record(elapsed.as_secs_f64() * 1000.0);
}

/// Record a stage that stopped because a neighbour went away
pub fn record_channel_closed(stage: &str) {
    counter!(
        "pulse_detector_channel_closed_total",
        "stage" => stage.to_string()
    )
    .increment(1);
}

/// Energy trace statistics
///
/// Feed every energy of a run; the summary reports the spread and how far
/// the peak stands above the mean. Mean and variance are updated online
/// (Welford), so a trace never has to be held.
#[derive(Debug, Clone, Default)]
pub struct EnergyStats {
    count: u64,
    nonzero: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl EnergyStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, energy: f64) {
        self.count += 1;
        if energy != 0.0 {
            self.nonzero += 1;
        }

        if self.count == 1 {
            self.min = energy;
            self.max = energy;
            self.mean = energy;
            return;
        }
        self.min = self.min.min(energy);
        self.max = self.max.max(energy);

        let delta = energy - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (energy - self.mean);
    }

    /// Sample variance of the energies seen so far
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn summary(&self) -> EnergySummary {
        EnergySummary {
            energy: StatsSummary {
                count: self.count,
                min: self.min,
                max: self.max,
                mean: self.mean,
                std_dev: self.variance().sqrt(),
            },
            nonzero: self.nonzero,
            peak_to_mean_db: if self.count > 0 && self.mean > 0.0 {
                10.0 * (self.max / self.mean).log10()
            } else {
                0.0
            },
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Extend<f64> for EnergyStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for energy in iter {
            self.push(energy);
        }
    }
}

/// Energy trace summary
#[derive(Debug, Clone, Default)]
pub struct EnergySummary {
    pub energy: StatsSummary,
    /// Energies that were not exactly zero
    pub nonzero: u64,
    /// `10·log10(max / mean)`, 0 when undefined
    pub peak_to_mean_db: f64,
}

impl fmt::Display for EnergySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Energy Trace Summary ===")?;
        writeln!(f, "Energy: {}", self.energy)?;
        writeln!(f, "Non-zero values: {}", self.nonzero)?;
        writeln!(f, "Peak-to-mean: {:.2} dB", self.peak_to_mean_db)
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.6}, max={:.6}, mean={:.6}, std={:.6} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_stats_spread() {
        let mut stats = EnergyStats::new();
        stats.extend([0.25, 0.0, 0.0625, 0.0, 0.125]);
        let summary = stats.summary();

        assert_eq!(summary.energy.count, 5);
        assert_eq!(summary.nonzero, 3);
        assert_eq!(summary.energy.min, 0.0);
        assert_eq!(summary.energy.max, 0.25);
        assert!((summary.energy.mean - 0.0875).abs() < 1e-12);
        // Σ(x - 0.0875)² = 0.04375 over n - 1 = 4
        assert!((stats.variance() - 0.0109375).abs() < 1e-12);
        assert!((summary.energy.std_dev - 0.0109375_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_single_energy_has_no_spread() {
        let mut stats = EnergyStats::new();
        stats.push(0.25);
        let summary = stats.summary();

        assert_eq!(summary.energy.mean, 0.25);
        assert_eq!(summary.energy.std_dev, 0.0);
        assert_eq!(summary.peak_to_mean_db, 0.0);
    }

    #[test]
    fn test_energy_stats_peak_to_mean() {
        let mut stats = EnergyStats::new();
        stats.extend([0.0, 0.0, 0.0, 0.4]);
        let summary = stats.summary();

        assert_eq!(summary.energy.count, 4);
        assert_eq!(summary.nonzero, 1);
        // max / mean = 0.4 / 0.1 = 4 -> 6.02 dB
        assert!((summary.peak_to_mean_db - 6.0206).abs() < 1e-3);
    }

    #[test]
    fn test_all_zero_trace() {
        let mut stats = EnergyStats::new();
        stats.extend(std::iter::repeat(0.0).take(10));
        let summary = stats.summary();
        assert_eq!(summary.nonzero, 0);
        assert_eq!(summary.peak_to_mean_db, 0.0);

        stats.reset();
        assert_eq!(stats.summary().energy.count, 0);
    }

    #[test]
    fn test_summary_display() {
        let summary = EnergySummary {
            energy: StatsSummary {
                count: 5000,
                min: 0.0,
                max: 0.25,
                mean: 0.001,
                std_dev: 0.004,
            },
            nonzero: 127,
            peak_to_mean_db: 23.98,
        };

        let output = summary.to_string();
        assert!(output.contains("n=5000"));
        assert!(output.contains("Non-zero values: 127"));
        assert!(output.contains("23.98 dB"));
        assert_eq!(StatsSummary::default().to_string(), "N/A");
    }

    #[test]
    fn test_recorders_without_installed_recorder() {
        // The facade is a no-op until a recorder is installed
        record_samples_processed("direct", 10);
        record_peak_updates(3);
        record_detection("direct", "sequential", 0.25, 1000, Duration::from_millis(5));
        record_channel_closed("source");
    }
}
