//! # Peak Tracker
//!
//! Running maximum of the correlation energy stream.
//!
//! The tracker expects exactly `signal_length` energies. The first value is
//! index 0. A value replaces the current peak only when it is strictly
//! greater, so ties keep the earliest index. The record starts at
//! `peak = 0, location = 0`, which is also the answer for an all-zero
//! stream.

use contracts::PeakRecord;
use fixed_point::Fixed;
use tracing::{debug, warn};

/// Strict-greater running maximum with arrival index
#[derive(Debug, Clone)]
pub struct PeakTracker {
    signal_length: usize,
    record: PeakRecord,
    observed: usize,
    ignored: usize,
    updates: u64,
}

impl PeakTracker {
    pub fn new(signal_length: usize) -> Self {
        Self {
            signal_length,
            record: PeakRecord::default(),
            observed: 0,
            ignored: 0,
            updates: 0,
        }
    }

    /// Feed the energy for the next arrival index.
    ///
    /// Returns `true` when the value became the new peak. Values beyond
    /// `signal_length` are ignored.
    pub fn observe(&mut self, value: Fixed) -> bool {
        if self.observed >= self.signal_length {
            if self.ignored == 0 {
                warn!(
                    signal_length = self.signal_length,
                    "energy values beyond signal_length are ignored"
                );
            }
            self.ignored += 1;
            return false;
        }

        let index = self.observed;
        self.observed += 1;

        if value > self.record.peak {
            self.record = PeakRecord {
                peak: value,
                location: index,
            };
            self.updates += 1;
            true
        } else {
            false
        }
    }

    /// Peak so far
    pub fn current(&self) -> PeakRecord {
        self.record
    }

    /// Values accepted so far
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Values still expected
    pub fn remaining(&self) -> usize {
        self.signal_length - self.observed
    }

    pub fn is_complete(&self) -> bool {
        self.observed == self.signal_length
    }

    /// Number of times the peak moved
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Values dropped for arriving after `signal_length`
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// Final record.
    ///
    /// Finishing early treats the missing values as zero energy, which can
    /// never beat the current peak, so the record is already final.
    pub fn finish(self) -> PeakRecord {
        if !self.is_complete() {
            debug!(
                observed = self.observed,
                padded = self.remaining(),
                "finishing with zero-padded energies"
            );
        }
        if self.ignored > 0 {
            warn!(ignored = self.ignored, "extra energy values were dropped");
        }
        self.record
    }

    /// Run a whole energy sequence through a fresh tracker
    pub fn track<I>(signal_length: usize, energies: I) -> PeakRecord
    where
        I: IntoIterator<Item = Fixed>,
    {
        let mut tracker = Self::new(signal_length);
        for value in energies {
            tracker.observe(value);
        }
        tracker.finish()
    }
}
