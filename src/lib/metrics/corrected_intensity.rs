//! Per-cycle corrected intensity metrics and base-call counts.

use crate::constants::{DnaBase, MetricGroup};
use crate::metrics::MetricRecord;

/// Number of base-call count slots: no-call followed by A, C, G, T.
pub const CALL_COUNT_SLOTS: usize = 5;

/// Corrected intensities and base calls of one tile at one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedIntensityMetric {
    lane: u32,
    tile: u32,
    cycle: u32,
    average_cycle_intensity: u16,
    corrected_int_all: Vec<u16>,
    corrected_int_called: Vec<f32>,
    called_counts: Vec<u32>,
    signal_to_noise: f32,
}

impl CorrectedIntensityMetric {
    /// Creates a record from called intensities (A, C, G, T) and call counts
    /// (no-call, A, C, G, T).
    #[must_use]
    pub fn new(
        lane: u32,
        tile: u32,
        cycle: u32,
        corrected_int_called: Vec<f32>,
        called_counts: Vec<u32>,
    ) -> Self {
        Self {
            lane,
            tile,
            cycle,
            average_cycle_intensity: 0,
            corrected_int_all: vec![0; DnaBase::ALL.len()],
            corrected_int_called,
            called_counts,
            signal_to_noise: f32::NAN,
        }
    }

    /// Sets the average intensity and the per-base intensity over all clusters.
    #[must_use]
    pub fn with_intensities(mut self, average: u16, corrected_int_all: Vec<u16>) -> Self {
        self.average_cycle_intensity = average;
        self.corrected_int_all = corrected_int_all;
        self
    }

    #[must_use]
    pub fn with_signal_to_noise(mut self, signal_to_noise: f32) -> Self {
        self.signal_to_noise = signal_to_noise;
        self
    }

    #[must_use]
    pub fn average_cycle_intensity(&self) -> u16 {
        self.average_cycle_intensity
    }

    #[must_use]
    pub fn corrected_int_all(&self) -> &[u16] {
        &self.corrected_int_all
    }

    #[must_use]
    pub fn corrected_int_called(&self) -> &[f32] {
        &self.corrected_int_called
    }

    /// Called intensity of `base`, `NaN` when absent.
    #[must_use]
    pub fn called_intensity(&self, base: DnaBase) -> f32 {
        self.corrected_int_called.get(base.index()).copied().unwrap_or(f32::NAN)
    }

    /// Corrected intensity of `base` over all clusters, `NaN` when absent.
    #[must_use]
    pub fn corrected_intensity(&self, base: DnaBase) -> f32 {
        self.corrected_int_all.get(base.index()).map_or(f32::NAN, |&v| f32::from(v))
    }

    /// Call counts: no-call followed by A, C, G, T.
    #[must_use]
    pub fn called_counts(&self) -> &[u32] {
        &self.called_counts
    }

    #[must_use]
    pub fn signal_to_noise(&self) -> f32 {
        self.signal_to_noise
    }

    /// Clusters called as `base`.
    #[must_use]
    pub fn called_count(&self, base: DnaBase) -> u32 {
        self.called_counts.get(base.index() + 1).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn no_call_count(&self) -> u32 {
        self.called_counts.first().copied().unwrap_or(0)
    }

    /// Total calls, optionally including no-calls.
    #[must_use]
    pub fn total_calls(&self, include_no_calls: bool) -> u64 {
        let skip = usize::from(!include_no_calls);
        self.called_counts.iter().skip(skip).map(|&c| u64::from(c)).sum()
    }

    /// Percentage of called clusters called as `base`, `NaN` without calls.
    #[must_use]
    pub fn percent_base(&self, base: DnaBase) -> f32 {
        percent(u64::from(self.called_count(base)), self.total_calls(false))
    }

    /// Percentage of all clusters that were not called, `NaN` without clusters.
    #[must_use]
    pub fn percent_no_call(&self) -> f32 {
        percent(u64::from(self.no_call_count()), self.total_calls(true))
    }
}

fn percent(part: u64, total: u64) -> f32 {
    if total == 0 {
        return f32::NAN;
    }
    (part as f64 / total as f64 * 100.0) as f32
}

impl MetricRecord for CorrectedIntensityMetric {
    type Header = ();
    const GROUP: MetricGroup = MetricGroup::CorrectedInt;

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
