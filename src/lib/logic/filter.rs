//! Selection of the records a plot or table draws from.

use serde::{Deserialize, Serialize};

use crate::constants::{DnaBase, MetricType, TileNamingMethod};
use crate::errors::{InteropError, Result};
use crate::run::{FlowcellLayout, RunInfo};

/// Which lanes, surfaces, channel, base, read and cycle to use.
///
/// `None` selects every value of an identifier. The channel defaults to the
/// first channel and the base to `A`, since channel and base metrics are
/// plotted one channel or base at a time.
///
/// Options must pass [`FilterOptions::validate`] before a plot consumes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    naming_method: TileNamingMethod,
    lane: Option<u32>,
    surface: Option<u32>,
    channel: Option<usize>,
    base: Option<DnaBase>,
    read: Option<u32>,
    cycle: Option<u32>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self::new(TileNamingMethod::Unknown)
    }
}

impl FilterOptions {
    #[must_use]
    pub fn new(naming_method: TileNamingMethod) -> Self {
        Self {
            naming_method,
            lane: None,
            surface: None,
            channel: Some(0),
            base: Some(DnaBase::A),
            read: None,
            cycle: None,
        }
    }

    /// Options using the naming method of `run_info`.
    #[must_use]
    pub fn for_run(run_info: &RunInfo) -> Self {
        Self::new(run_info.flowcell().naming_method())
    }

    #[must_use]
    pub fn with_lane(mut self, lane: Option<u32>) -> Self {
        self.lane = lane;
        self
    }

    #[must_use]
    pub fn with_surface(mut self, surface: Option<u32>) -> Self {
        self.surface = surface;
        self
    }

    /// Selects a zero-based channel index.
    #[must_use]
    pub fn with_channel(mut self, channel: Option<usize>) -> Self {
        self.channel = channel;
        self
    }

    #[must_use]
    pub fn with_base(mut self, base: Option<DnaBase>) -> Self {
        self.base = base;
        self
    }

    #[must_use]
    pub fn with_read(mut self, read: Option<u32>) -> Self {
        self.read = read;
        self
    }

    #[must_use]
    pub fn with_cycle(mut self, cycle: Option<u32>) -> Self {
        self.cycle = cycle;
        self
    }

    #[must_use]
    pub fn naming_method(&self) -> TileNamingMethod {
        self.naming_method
    }

    #[must_use]
    pub fn lane(&self) -> Option<u32> {
        self.lane
    }

    #[must_use]
    pub fn surface(&self) -> Option<u32> {
        self.surface
    }

    #[must_use]
    pub fn channel(&self) -> Option<usize> {
        self.channel
    }

    #[must_use]
    pub fn base(&self) -> Option<DnaBase> {
        self.base
    }

    #[must_use]
    pub fn read(&self) -> Option<u32> {
        self.read
    }

    #[must_use]
    pub fn cycle(&self) -> Option<u32> {
        self.cycle
    }

    /// Checks the options against a run before plotting `metric_type`.
    ///
    /// Lane and surface are always checked. Channel, read and cycle are only
    /// checked when `metric_type` varies by them, so for example a channel
    /// index is irrelevant to cluster density.
    ///
    /// # Errors
    /// Returns [`InteropError::InvalidFilterOption`] naming the first option
    /// outside the run.
    pub fn validate(&self, metric_type: MetricType, run_info: &RunInfo) -> Result<()> {
        if self.naming_method == TileNamingMethod::Unknown {
            return Err(invalid("tile_naming_method", "the tile naming method is unknown".to_string()));
        }
        let layout = run_info.flowcell();
        if let Some(lane) = self.lane {
            if lane == 0 || lane > layout.lane_count() {
                return Err(invalid(
                    "lane",
                    format!("lane {lane} is outside 1..={}", layout.lane_count()),
                ));
            }
        }
        if let Some(surface) = self.surface {
            if surface == 0 || surface > layout.surface_count() {
                return Err(invalid(
                    "surface",
                    format!("surface {surface} is outside 1..={}", layout.surface_count()),
                ));
            }
        }
        if metric_type.is_channel_metric() {
            if let Some(channel) = self.channel {
                let count = run_info.channels().len();
                if channel >= count {
                    return Err(invalid(
                        "channel",
                        format!("channel {channel} is outside the {count} channels of the run"),
                    ));
                }
            }
        }
        if metric_type.is_read_metric() {
            if let Some(read) = self.read {
                run_info.read(read).map_err(|e| invalid("read", e.to_string()))?;
            }
        }
        if metric_type.is_cycle_metric() {
            if let Some(cycle) = self.cycle {
                let total = run_info.total_cycles();
                if cycle == 0 || cycle > total {
                    return Err(invalid("cycle", format!("cycle {cycle} is outside 1..={total}")));
                }
            }
        }
        Ok(())
    }

    /// Whether the lane and surface selection admit a tile.
    #[must_use]
    pub fn accepts_tile(&self, lane: u32, tile: u32, layout: &FlowcellLayout) -> bool {
        self.lane.is_none_or(|l| l == lane) && self.surface.is_none_or(|s| s == layout.surface_of(tile))
    }

    /// Whether the cycle selection admits `cycle`.
    #[must_use]
    pub fn accepts_cycle(&self, cycle: u32) -> bool {
        self.cycle.is_none_or(|c| c == cycle)
    }

    /// Whether the read selection admits `cycle`.
    #[must_use]
    pub fn accepts_cycle_in_read(&self, cycle: u32, run_info: &RunInfo) -> bool {
        match self.read {
            None => true,
            Some(read) => run_info.read(read).is_ok_and(|r| r.cycle_range().contains(cycle)),
        }
    }
}

fn invalid(option: &'static str, reason: String) -> InteropError {
    InteropError::InvalidFilterOption { option, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::ReadInfo;
    use rstest::rstest;

    fn run_info() -> RunInfo {
        RunInfo::new(FlowcellLayout::new(8, 2, 2, 36).with_naming_method(TileNamingMethod::FourDigit))
            .with_reads(vec![ReadInfo::new(1, 1, 26, false), ReadInfo::new(2, 27, 8, true)])
            .with_channels(vec!["Red".to_string(), "Green".to_string()])
    }

    #[test]
    fn test_defaults() {
        let options = FilterOptions::for_run(&run_info());
        assert_eq!(options.naming_method(), TileNamingMethod::FourDigit);
        assert_eq!(options.channel(), Some(0));
        assert_eq!(options.base(), Some(DnaBase::A));
        assert_eq!(options.lane(), None);
        options.validate(MetricType::Intensity, &run_info()).unwrap();
    }

    #[rstest]
    #[case(FilterOptions::default(), MetricType::Clusters, "tile_naming_method")]
    #[case(FilterOptions::new(TileNamingMethod::FourDigit).with_lane(Some(9)), MetricType::Clusters, "lane")]
    #[case(FilterOptions::new(TileNamingMethod::FourDigit).with_surface(Some(3)), MetricType::ErrorRate, "surface")]
    #[case(FilterOptions::new(TileNamingMethod::FourDigit).with_channel(Some(2)), MetricType::FWHM, "channel")]
    #[case(FilterOptions::new(TileNamingMethod::FourDigit).with_read(Some(3)), MetricType::PercentAligned, "read")]
    #[case(FilterOptions::new(TileNamingMethod::FourDigit).with_cycle(Some(35)), MetricType::QScore, "cycle")]
    fn test_validate_rejects(#[case] options: FilterOptions, #[case] metric_type: MetricType, #[case] option: &str) {
        let err = options.validate(metric_type, &run_info()).unwrap_err();
        assert!(matches!(err, InteropError::InvalidFilterOption { option: o, .. } if o == option));
    }

    #[rstest]
    #[case(MetricType::Clusters)]
    #[case(MetricType::ErrorRate)]
    #[case(MetricType::BasePercent)]
    fn test_channel_ignored_for_non_channel_metrics(#[case] metric_type: MetricType) {
        let options = FilterOptions::new(TileNamingMethod::FourDigit).with_channel(Some(7)).with_read(Some(9));
        options.validate(metric_type, &run_info()).unwrap();
    }

    #[test]
    fn test_channel_checked_against_empty_run() {
        let options = FilterOptions::new(TileNamingMethod::FourDigit);
        let err = options.validate(MetricType::Intensity, &RunInfo::default()).unwrap_err();
        assert!(matches!(err, InteropError::InvalidFilterOption { option: "channel", .. }));
    }

    #[test]
    fn test_accepts_tile_by_surface() {
        let info = run_info();
        let options = FilterOptions::for_run(&info).with_lane(Some(2)).with_surface(Some(2));
        assert!(options.accepts_tile(2, 2105, info.flowcell()));
        assert!(!options.accepts_tile(2, 1105, info.flowcell()));
        assert!(!options.accepts_tile(1, 2105, info.flowcell()));
    }

    #[test]
    fn test_accepts_cycle_in_read() {
        let info = run_info();
        let options = FilterOptions::for_run(&info).with_read(Some(2));
        assert!(options.accepts_cycle_in_read(30, &info));
        assert!(!options.accepts_cycle_in_read(3, &info));
        assert!(FilterOptions::for_run(&info).accepts_cycle_in_read(3, &info));
    }
}
