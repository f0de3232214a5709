//! Derived views over loaded run metrics.
//!
//! - [`q_metric`] - Q-score collapse and accumulation
//! - [`filter`] - [`FilterOptions`](filter::FilterOptions) selecting lanes, surfaces, reads, cycles
//! - [`plot`] - plot-ready series, heatmaps and flowcell maps
//! - [`summary`] - run, read, lane and index summaries
//! - [`table`] - the imaging table

pub mod filter;
pub mod plot;
pub mod q_metric;
pub mod summary;
pub mod table;

pub use filter::FilterOptions;
pub use plot::{
    Axis, BarPoint, CandleStickPoint, FlowcellData, HeatmapData, PlotData, PlotPoint, Series, list_available_plot_metrics,
    plot_by_cycle, plot_by_lane, plot_flowcell_map, plot_qscore_heatmap, plot_qscore_histogram,
};
pub use q_metric::{AccumulatedQ, collapse_q_metrics};
pub use summary::{
    IndexCountSummary, IndexFlowcellSummary, IndexLaneSummary, LaneSummary, MetricStats, ReadSummary, RunSummary,
    SummaryTotals, SurfaceSummary, summarize_index_metrics, summarize_run_metrics,
};
pub use table::{ImagingColumn, ImagingColumnId, ImagingTable, create_imaging_table_columns, populate_imaging_table};
