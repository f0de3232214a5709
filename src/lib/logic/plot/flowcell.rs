//! Lane-by-tile image of one metric over the flowcell.

use crate::constants::MetricType;
use crate::errors::{InteropError, Result};
use crate::logic::filter::FilterOptions;
use crate::logic::plot::data::FlowcellData;
use crate::logic::plot::samples::{Selection, metric_samples};
use crate::run_metrics::RunMetrics;

/// Draws the metric named `metric_name` at every tile of the flowcell.
///
/// Per-cycle metrics are drawn at the cycle selected in `options`, or at the
/// last cycle with data when none is selected. Tiles that cannot be placed
/// with the run's naming method are left out.
///
/// # Errors
/// - [`InteropError::InvalidMetricType`](crate::errors::InteropError::InvalidMetricType)
///   when `metric_name` names no metric type
/// - [`InteropError::InvalidFilterOption`](crate::errors::InteropError::InvalidFilterOption)
///   when `options` do not fit the run
/// - [`InteropError::InvalidArgument`] when the layout has more tiles per lane
///   than a `u32` counts
pub fn plot_flowcell_map(run: &RunMetrics, metric_name: &str, options: &FilterOptions) -> Result<FlowcellData> {
    let metric_type = MetricType::parse(metric_name)?;
    options.validate(metric_type, run.run_info())?;
    let layout = run.run_info().flowcell();
    let tiles_per_lane = layout.checked_tiles_per_lane().ok_or_else(|| InteropError::InvalidArgument {
        reason: format!("flowcell layout has more than {} tiles per lane", u32::MAX),
    })?;

    let mut samples = metric_samples(run, metric_type, Selection::from_options(options), options);
    let mut subtitle = String::new();
    if metric_type.is_cycle_metric() {
        let cycle = options.cycle().unwrap_or_else(|| samples.iter().map(|s| s.cycle).max().unwrap_or(0));
        samples.retain(|s| s.cycle == cycle);
        subtitle = format!("Cycle {cycle}");
    }

    let mut data = FlowcellData::new(
        layout.lane_count() as usize,
        tiles_per_lane as usize,
        layout.total_swaths(),
        layout.tile_count(),
    )
    .with_labels(metric_type.description(), subtitle);
    let mut skipped = 0_usize;
    for sample in samples {
        let placed = sample.lane.checked_sub(1).zip(layout.tile_column(sample.tile));
        match placed {
            Some((lane_index, column)) if data.set(lane_index as usize, column, sample.tile, sample.value).is_ok() => {}
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        log::debug!("{skipped} {metric_type} values fall outside the flowcell layout");
    }
    Ok(data)
}
