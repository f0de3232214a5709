//! Plot-ready data derived from loaded run metrics.
//!
//! Every plot validates its [`FilterOptions`](crate::logic::FilterOptions)
//! against the run before touching any record, so a bad lane or channel is
//! reported rather than producing an empty plot.

mod by_cycle;
mod data;
mod flowcell;
mod qscore;
pub(crate) mod samples;

pub use by_cycle::{plot_by_cycle, plot_by_lane};
pub use data::{Axis, BarPoint, CandleStickPoint, FlowcellData, HeatmapData, PlotData, PlotPoint, Series};
pub use flowcell::plot_flowcell_map;
pub use qscore::{plot_qscore_heatmap, plot_qscore_histogram};

use crate::constants::MetricType;
use crate::run_metrics::RunMetrics;

/// Metric types `run` holds data for, in registry order.
#[must_use]
pub fn list_available_plot_metrics(run: &RunMetrics) -> Vec<MetricType> {
    MetricType::ALL.into_iter().filter(|&t| samples::has_data(run, t)).collect()
}
