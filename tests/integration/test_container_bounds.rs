//! Positional accessors of every container report out-of-range indices as errors.

use interop_lib::errors::InteropError;
use interop_lib::logic::{
    BarPoint, CandleStickPoint, FlowcellData, HeatmapData, ImagingColumnId, ImagingTable, IndexFlowcellSummary,
    IndexLaneSummary, LaneSummary, PlotData, RunSummary, Series, populate_imaging_table, summarize_run_metrics,
};
use interop_lib::metrics::{ErrorMetric, IndexMetric, MetricSet, QMetric, TileMetric};
use interop_lib::run::{FlowcellLayout, ReadInfo, RunInfo};
use interop_lib::run_metrics::RunMetrics;

use crate::helpers::sample_run;

fn assert_out_of_bounds<T: std::fmt::Debug>(result: Result<T, InteropError>, container: &str) {
    match result {
        Err(InteropError::IndexOutOfBounds { container: actual, .. }) => assert_eq!(actual, container),
        other => panic!("expected IndexOutOfBounds from {container}, got {other:?}"),
    }
}

#[test]
fn test_empty_metric_sets() {
    assert!(matches!(MetricSet::<ErrorMetric>::new().at(0), Err(InteropError::IndexOutOfBounds { .. })));
    assert!(matches!(MetricSet::<TileMetric>::new().at(0), Err(InteropError::IndexOutOfBounds { .. })));
    assert!(matches!(MetricSet::<QMetric>::new().at(0), Err(InteropError::IndexOutOfBounds { .. })));
    assert!(matches!(MetricSet::<IndexMetric>::new().at(0), Err(InteropError::IndexOutOfBounds { .. })));
}

#[test]
fn test_empty_summaries() {
    assert_out_of_bounds(RunSummary::default().at(0), "RunSummary");
    assert_out_of_bounds(LaneSummary::default().at(0), "LaneSummary");
    assert_out_of_bounds(IndexFlowcellSummary::default().at(0), "IndexFlowcellSummary");
    assert_out_of_bounds(IndexLaneSummary::default().at(0), "IndexLaneSummary");

    // A read with no tile data has no lanes.
    let info = RunInfo::new(FlowcellLayout::new(1, 1, 1, 1)).with_reads(vec![ReadInfo::new(1, 1, 5, false)]);
    let summary = summarize_run_metrics(&RunMetrics::new(info)).unwrap();
    assert_eq!(summary.size(), 1);
    assert_out_of_bounds(summary.at(0).unwrap().at(0), "ReadSummary");
}

#[test]
fn test_empty_plot_containers() {
    assert!(PlotData::<CandleStickPoint>::default().at(0).is_err());
    assert!(Series::<BarPoint>::default().at(0).is_err());
    assert!(HeatmapData::default().at(0, 0).is_err());
    assert!(FlowcellData::default().at(0, 0).is_err());
    assert!(FlowcellData::default().tile_id(0, 0).is_err());
}

#[test]
fn test_empty_imaging_table() {
    let table = ImagingTable::default();
    assert!(table.is_empty());
    assert!(table.row(0).is_err());
    assert!(table.column_at(0).is_err());
    assert!(table.at(0, ImagingColumnId::Lane).is_err());
}

#[test]
fn test_populated_containers_stop_at_size() {
    let run = sample_run();
    let summary = summarize_run_metrics(&run).unwrap();
    assert!(summary.at(summary.size()).is_err());
    let read = summary.at(0).unwrap();
    assert!(read.at(read.size()).is_err());

    let table = populate_imaging_table(&run).unwrap();
    assert!(table.row(table.row_count() - 1).is_ok());
    assert!(matches!(table.row(table.row_count()), Err(InteropError::IndexOutOfBounds { .. })));
    assert!(table.column_at(table.column_count()).is_err());
    // Corrected intensity columns are absent from this run.
    assert!(matches!(table.at(0, ImagingColumnId::SignalToNoise), Err(InteropError::IndexOutOfBounds { .. })));

    let set = run.error();
    assert!(set.at(set.size() - 1).is_ok());
    assert!(set.at(set.size()).is_err());
}
