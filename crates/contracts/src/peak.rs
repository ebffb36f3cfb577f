//! PeakRecord - PeakTracker output

use fixed_point::Fixed;
use serde::{Deserialize, Serialize};

/// Strongest correlation energy seen so far and where it occurred.
///
/// `location` is the 0-based arrival index of the newest sample in the
/// window that produced `peak`. Ties keep the earliest index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakRecord {
    pub peak: Fixed,
    pub location: usize,
}

impl PeakRecord {
    /// Location as counted by the non-pipelined reference model, which
    /// reports the aligned window one index later.
    pub fn reference_location(&self) -> usize {
        self.location + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_location_offset() {
        let record = PeakRecord {
            peak: Fixed::from_raw(42),
            location: 1000,
        };
        assert_eq!(record.reference_location(), 1001);
        assert_eq!(PeakRecord::default().location, 0);
        assert!(PeakRecord::default().peak.is_zero());
    }
}
