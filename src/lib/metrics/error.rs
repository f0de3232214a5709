//! Per-cycle error rate against the PhiX control.

use crate::constants::MetricGroup;
use crate::metrics::MetricRecord;

/// Number of mismatch-count slots (reads with 0 to 4 errors).
pub const MISMATCH_SLOTS: usize = 5;

/// Error rate of one tile at one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMetric {
    lane: u32,
    tile: u32,
    cycle: u32,
    error_rate: f32,
    mismatch_counts: Vec<u32>,
}

impl ErrorMetric {
    #[must_use]
    pub fn new(lane: u32, tile: u32, cycle: u32, error_rate: f32) -> Self {
        Self { lane, tile, cycle, error_rate, mismatch_counts: vec![0; MISMATCH_SLOTS] }
    }

    /// Sets the number of reads with 0 to 4 mismatches.
    #[must_use]
    pub fn with_mismatch_counts(mut self, mismatch_counts: Vec<u32>) -> Self {
        self.mismatch_counts = mismatch_counts;
        self
    }

    /// Percentage of aligned bases that mismatch the reference.
    #[must_use]
    pub fn error_rate(&self) -> f32 {
        self.error_rate
    }

    #[must_use]
    pub fn mismatch_counts(&self) -> &[u32] {
        &self.mismatch_counts
    }
}

impl MetricRecord for ErrorMetric {
    type Header = ();
    const GROUP: MetricGroup = MetricGroup::Error;

    fn lane(&self) -> u32 {
        self.lane
    }

    fn tile(&self) -> u32 {
        self.tile
    }

    fn cycle(&self) -> u32 {
        self.cycle
    }
}
