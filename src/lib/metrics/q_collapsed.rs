//! Per-cycle Q20/Q30 summaries collapsed from full Q-score histograms.

use crate::constants::MetricGroup;
use crate::metrics::MetricRecord;

/// Q20/Q30 call counts, total calls and median Q-score of one tile at one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QCollapsedMetric {
    lane: u32,
    tile: u32,
    cycle: u32,
    q20: u32,
    q30: u32,
    total: u32,
    median_qscore: u32,
}

impl QCollapsedMetric {
    #[must_use]
    pub fn new(lane: u32, tile: u32, cycle: u32, q20: u32, q30: u32, total: u32, median_qscore: u32) -> Self {
        Self { lane, tile, cycle, q20, q30, total, median_qscore }
    }

    /// Calls at or above Q20.
    #[must_use]
    pub fn q20(&self) -> u32 {
        self.q20
    }

    /// Calls at or above Q30.
    #[must_use]
    pub fn q30(&self) -> u32 {
        self.q30
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn median_qscore(&self) -> u32 {
        self.median_qscore
    }

    #[must_use]
    pub fn percent_over_q20(&self) -> f32 {
        percent(self.q20, self.total)
    }

    #[must_use]
    pub fn percent_over_q30(&self) -> f32 {
        percent(self.q30, self.total)
    }
}

fn percent(part: u32, total: u32) -> f32 {
    if total == 0 { f32::NAN } else { (f64::from(part) / f64::from(total) * 100.0) as f32 }
}

impl MetricRecord for QCollapsedMetric {
    type Header = ();
    const GROUP: MetricGroup = MetricGroup::QCollapsed;

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
