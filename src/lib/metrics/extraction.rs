//! Per-cycle image extraction metrics: focus (FWHM) and maximum intensity per channel.

use crate::constants::MetricGroup;
use crate::errors::{Result, checked_at};
use crate::metrics::MetricRecord;

/// Header of an extraction metric set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionHeader {
    /// Number of image channels; 0 when not yet known.
    pub channel_count: u8,
}

/// Focus and maximum intensity of one tile at one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMetric {
    lane: u32,
    tile: u32,
    cycle: u32,
    max_intensity: Vec<u16>,
    focus: Vec<f32>,
    date_time: u64,
}

impl ExtractionMetric {
    /// Creates a record; `max_intensity` and `focus` hold one value per channel.
    #[must_use]
    pub fn new(lane: u32, tile: u32, cycle: u32, max_intensity: Vec<u16>, focus: Vec<f32>) -> Self {
        Self { lane, tile, cycle, max_intensity, focus, date_time: 0 }
    }

    /// Sets the acquisition time stamp (raw .NET ticks with kind bits).
    #[must_use]
    pub fn with_date_time(mut self, date_time: u64) -> Self {
        self.date_time = date_time;
        self
    }

    #[must_use]
    pub fn max_intensities(&self) -> &[u16] {
        &self.max_intensity
    }

    #[must_use]
    pub fn focus_scores(&self) -> &[f32] {
        &self.focus
    }

    /// Maximum intensity for `channel`.
    ///
    /// # Errors
    /// Returns [`crate::errors::InteropError::IndexOutOfBounds`] for an unknown channel.
    pub fn max_intensity(&self, channel: usize) -> Result<u16> {
        checked_at(&self.max_intensity, channel, "ExtractionMetric::max_intensity").copied()
    }

    /// Focus score (FWHM) for `channel`.
    ///
    /// # Errors
    /// Returns [`crate::errors::InteropError::IndexOutOfBounds`] for an unknown channel.
    pub fn focus_score(&self, channel: usize) -> Result<f32> {
        checked_at(&self.focus, channel, "ExtractionMetric::focus").copied()
    }

    #[must_use]
    pub fn date_time(&self) -> u64 {
        self.date_time
    }

    /// Number of channels this record carries values for.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.max_intensity.len().max(self.focus.len())
    }
}

impl MetricRecord for ExtractionMetric {
    type Header = ExtractionHeader;
    const GROUP: MetricGroup = MetricGroup::Extraction;

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
