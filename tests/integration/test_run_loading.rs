//! Loading run folders from disk and deriving views from them.

use interop_lib::constants::{MetricGroup, MetricType, TileNamingMethod};
use interop_lib::logic::{
    FilterOptions, ImagingColumnId, list_available_plot_metrics, plot_by_cycle, plot_by_lane, plot_flowcell_map,
    plot_qscore_heatmap, plot_qscore_histogram, populate_imaging_table, summarize_index_metrics,
    summarize_run_metrics,
};
use interop_lib::metrics::MetricKey;
use interop_lib::run_metrics::RunMetrics;
use rstest::rstest;

use crate::helpers::{RUN_INFO_XML, TILES, TOTAL_CYCLES, load_all, sample_run_folder, write_run_info};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn load(last_cycle: u32, threads: usize) -> RunMetrics {
    let dir = sample_run_folder();
    let mut run = RunMetrics::default();
    run.read_metrics(dir.path(), last_cycle, &load_all(), threads).unwrap();
    run
}

// ==================== Loading ====================

#[test]
fn test_load_skips_missing_files() {
    let run = load(u32::MAX, 2);
    assert_eq!(run.group_size(MetricGroup::Tile), 2);
    assert_eq!(run.group_size(MetricGroup::Error), 3);
    assert_eq!(run.group_size(MetricGroup::Extraction), 10);
    assert_eq!(run.group_size(MetricGroup::Q), 10);
    assert_eq!(run.group_size(MetricGroup::Index), 1);
    assert_eq!(run.group_size(MetricGroup::CorrectedInt), 0);
    // Collapsed Q-scores are derived from the full histograms.
    assert_eq!(run.group_size(MetricGroup::QCollapsed), 10);
}

#[test]
fn test_load_reads_run_description() {
    let run = load(u32::MAX, 1);
    let info = run.run_info();
    assert_eq!(info.name(), "200101_M00001_0001_000000000-TEST1");
    assert_eq!(info.total_cycles(), TOTAL_CYCLES);
    assert_eq!(info.channels(), ["Red".to_string(), "Green".to_string()]);
    assert_eq!(info.flowcell().naming_method(), TileNamingMethod::FourDigit);
    info.validate().unwrap();
}

#[test]
fn test_load_decodes_values() {
    let run = load(u32::MAX, 1);
    let tile = run.tile().get(&MetricKey::tile(1, TILES[1])).unwrap();
    assert!(approx(tile.cluster_density(), 300_000.0));
    assert!(approx(tile.percent_pf(), 80.0));
    assert!(approx(tile.percent_prephasing(2), 0.4));

    let index = run.index().at(0).unwrap();
    assert_eq!(index.indices().len(), 2);
    assert_eq!(index.indices()[0].sample_id, "s1");

    let collapsed = run.q_collapsed().get(&MetricKey::cycle(1, TILES[0], 2)).unwrap();
    assert_eq!((collapsed.q20(), collapsed.q30(), collapsed.total()), (1000, 800, 1000));
}

#[rstest]
#[case(3, 6)]
#[case(1, 2)]
#[case(u32::MAX, 10)]
fn test_last_cycle_drops_later_records(#[case] last_cycle: u32, #[case] expected: usize) {
    let run = load(last_cycle, 2);
    assert_eq!(run.group_size(MetricGroup::Extraction), expected);
    assert_eq!(run.group_size(MetricGroup::QCollapsed), expected);
    assert!(run.extraction().max_cycle() <= last_cycle);
}

#[test]
fn test_thread_count_does_not_change_results() {
    let serial = load(u32::MAX, 1);
    let parallel = load(u32::MAX, 8);
    assert_eq!(serial.tile(), parallel.tile());
    assert_eq!(serial.error(), parallel.error());
    assert_eq!(serial.extraction(), parallel.extraction());
    assert_eq!(serial.q(), parallel.q());
    assert_eq!(serial.q_collapsed(), parallel.q_collapsed());
    assert_eq!(serial.index(), parallel.index());
}

#[test]
fn test_load_mask_selects_groups() {
    let dir = sample_run_folder();
    let mut mask = [0; MetricGroup::COUNT];
    mask[MetricGroup::Error.index()] = 1;
    mask[MetricGroup::Extraction.index()] = 1;
    let mut run = RunMetrics::default();
    run.read_metrics(dir.path(), u32::MAX, &mask, 1).unwrap();
    assert_eq!(run.group_size(MetricGroup::Error), 3);
    assert_eq!(run.group_size(MetricGroup::Tile), 0);
    assert_eq!(run.group_size(MetricGroup::Q), 0);
}

#[test]
fn test_reload_written_run() -> anyhow::Result<()> {
    let run = load(u32::MAX, 2);
    let copy = tempfile::TempDir::new()?;
    write_run_info(copy.path(), RUN_INFO_XML);
    run.write_metrics(copy.path())?;

    let mut reloaded = RunMetrics::default();
    reloaded.read_metrics(copy.path(), u32::MAX, &load_all(), 2)?;
    assert_eq!(reloaded.error(), run.error());
    assert_eq!(reloaded.extraction(), run.extraction());
    assert_eq!(reloaded.index(), run.index());
    assert_eq!(reloaded.q_collapsed(), run.q_collapsed());
    Ok(())
}

// ==================== Summaries ====================

#[test]
fn test_run_summary_from_disk() {
    let run = load(u32::MAX, 2);
    let summary = summarize_run_metrics(&run).unwrap();
    assert_eq!(summary.size(), 2);
    assert!(approx(summary.totals.percent_gt_q30, 80.0));
    assert!(approx(summary.nonindex_totals.percent_gt_q30, 80.0));

    let read1 = summary.at(0).unwrap();
    assert_eq!(read1.size(), 1);
    let lane1 = read1.at(0).unwrap();
    assert_eq!(lane1.lane, 1);
    assert_eq!(lane1.stats.tile_count, 2);
    assert!(approx(lane1.stats.density.mean, 200_000.0));
    assert!(approx(lane1.stats.percent_pf.mean, 80.0));
    assert!(approx(lane1.stats.percent_aligned.mean, 90.0));
    // Cycle 3 is the last cycle of read 1 and is not usable.
    assert!(approx(lane1.stats.error_rate.mean, 1.0));
    assert!(approx(lane1.stats.first_cycle_intensity.mean, 100.0));
    assert_eq!(lane1.size(), 2);

    let read2 = summary.at(1).unwrap();
    assert!(read2.read.is_index());
    assert!(approx(read2.at(0).unwrap().stats.first_cycle_intensity.mean, 400.0));
}

#[test]
fn test_index_summary_from_disk() {
    let run = load(u32::MAX, 2);
    let summary = summarize_index_metrics(&run).unwrap();
    assert_eq!(summary.size(), 2);
    let lane = summary.at(0).unwrap();
    assert_eq!(lane.total_reads, 2000);
    assert_eq!(lane.total_pf_reads, 1600);
    assert!(approx(lane.total_fraction_mapped_reads, 25.0));
    let first = lane.at(0).unwrap();
    assert_eq!((first.index1.as_str(), first.index2.as_str()), ("ACGT", "TTGG"));
    assert_eq!(first.cluster_count, 300);
    assert!(approx(first.fraction_mapped, 18.75));
    assert_eq!(summary.at(1).unwrap().size(), 0);
}

// ==================== Plots and Tables ====================

#[test]
fn test_intensity_by_cycle_per_channel() {
    let run = load(u32::MAX, 2);
    let plot = plot_by_cycle(&run, MetricType::Intensity, &FilterOptions::for_run(run.run_info())).unwrap();
    assert_eq!(plot.size(), 2);
    assert_eq!(plot.at(0).unwrap().title(), "Red");
    assert_eq!(plot.at(1).unwrap().title(), "Green");
    let red = plot.at(0).unwrap();
    assert_eq!(red.size(), TOTAL_CYCLES as usize);
    let third = red.at(2).unwrap();
    assert!(approx(third.x, 3.0));
    assert!(approx(third.p50, 300.0));
    assert_eq!(third.count, 2);
}

#[test]
fn test_q30_by_cycle_and_density_by_lane() {
    let run = load(u32::MAX, 2);
    let options = FilterOptions::for_run(run.run_info());
    let q30 = plot_by_cycle(&run, MetricType::Q30Percent, &options).unwrap();
    assert_eq!(q30.size(), 1);
    assert!(q30.at(0).unwrap().points().iter().all(|p| approx(p.p50, 80.0)));

    let density = plot_by_lane(&run, MetricType::Clusters, &options).unwrap();
    let lane1 = density.at(0).unwrap().at(0).unwrap();
    assert!(approx(lane1.x, 1.0));
    assert_eq!(lane1.count, 2);
}

#[test]
fn test_flowcell_map_defaults_to_last_cycle() {
    let run = load(u32::MAX, 2);
    let map = plot_flowcell_map(&run, "ErrorRate", &FilterOptions::for_run(run.run_info())).unwrap();
    assert_eq!(map.lane_count(), 2);
    assert_eq!(map.column_count(), 4);
    assert!(approx(map.at(0, 0).unwrap(), 9.0));
    assert!(map.at(1, 0).unwrap().is_nan());
}

#[test]
fn test_qscore_plots() {
    let run = load(u32::MAX, 2);
    let options = FilterOptions::for_run(run.run_info());
    let histogram = plot_qscore_histogram(&run, &options).unwrap();
    let bars = histogram.at(0).unwrap();
    let q20 = bars.points().iter().find(|b| approx(b.x, 20.0)).unwrap();
    let q35 = bars.points().iter().find(|b| approx(b.x, 35.0)).unwrap();
    assert!(approx(q20.y, 2000.0 / 1e6));
    assert!(approx(q35.y, 8000.0 / 1e6));

    let heatmap = plot_qscore_heatmap(&run, &options).unwrap();
    assert_eq!(heatmap.row_count(), TOTAL_CYCLES as usize);
    assert!(approx(heatmap.at(0, 34).unwrap(), 100.0));
    assert!(approx(heatmap.at(0, 19).unwrap(), 25.0));
}

#[test]
fn test_imaging_table_from_disk() {
    let run = load(u32::MAX, 2);
    let table = populate_imaging_table(&run).unwrap();
    assert_eq!(table.row_count(), 2 * TOTAL_CYCLES as usize);
    // Corrected intensity metrics were not written, so their columns are dropped.
    assert!(table.column(ImagingColumnId::Called).is_none());
    assert!(table.column(ImagingColumnId::P90).is_some());
    assert!(approx(table.at(0, ImagingColumnId::ErrorRate).unwrap()[0], 0.5));
    assert_eq!(table.at(0, ImagingColumnId::P90).unwrap(), &[100.0, 150.0]);
}

#[test]
fn test_available_plot_metrics_follow_loaded_groups() {
    let run = load(u32::MAX, 2);
    let available = list_available_plot_metrics(&run);
    assert!(available.contains(&MetricType::ErrorRate));
    assert!(available.contains(&MetricType::Intensity));
    assert!(!available.contains(&MetricType::CalledIntensity));
}
