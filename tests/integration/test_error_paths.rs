//! Error path integration tests.
//!
//! These tests verify that malformed run descriptions, damaged metric files
//! and invalid parameters surface as the matching error variant.

use std::fs;

use interop_lib::constants::{MetricGroup, MetricType};
use interop_lib::errors::InteropError;
use interop_lib::io::{self, metric_file_path};
use interop_lib::logic::{
    FilterOptions, create_imaging_table_columns, plot_by_cycle, plot_by_lane, plot_flowcell_map,
    summarize_index_metrics, summarize_run_metrics,
};
use interop_lib::metrics::{CorrectedIntensityMetric, ErrorMetric, MetricSet, TileMetric};
use interop_lib::run::{FlowcellLayout, InstrumentType, RUN_PARAMETERS_FILE_NAME, ReadInfo, RunInfo};
use interop_lib::run_metrics::{RunMetrics, list_metrics_to_load, to_feature};
use rstest::rstest;
use tempfile::TempDir;

use crate::helpers::{RUN_INFO_XML, load_all, sample_run, sample_run_folder, write_run_info};

fn load_folder(dir: &TempDir) -> Result<RunMetrics, InteropError> {
    let mut run = RunMetrics::default();
    run.read_metrics(dir.path(), u32::MAX, &load_all(), 2)?;
    Ok(run)
}

// ==================== RunInfo Error Paths ====================

#[test]
fn test_empty_run_info_is_empty_format() {
    assert!(matches!(RunInfo::parse(""), Err(InteropError::EmptyFormat)));
}

#[test]
fn test_unterminated_run_info_is_xml_parse() {
    assert!(matches!(RunInfo::parse("<RunInfo></RunInfo"), Err(InteropError::XmlParse { .. })));
}

#[test]
fn test_run_info_without_run_is_bad_format() {
    assert!(matches!(RunInfo::parse("<RunInfo></RunInfo>"), Err(InteropError::BadXmlFormat { .. })));
}

#[test]
fn test_tile_outside_layout_is_invalid_tile_list() -> anyhow::Result<()> {
    let xml = RUN_INFO_XML
        .replace("SwathCount=\"1\" TileCount=\"2\"", "SwathCount=\"4\" TileCount=\"88\"")
        .replace("<Tile>1_1101</Tile>", "<Tile>3_2101</Tile>");
    let info = RunInfo::parse(&xml)?;
    assert_eq!(info.flowcell().tile_count(), 88);
    assert!(matches!(info.validate_tiles(), Err(InteropError::InvalidTileList { .. })));
    Ok(())
}

#[rstest]
#[case("FlowcellLayout", "Layout")]
#[case("TileNamingConvention", "Naming")]
#[case("LaneCount", "Lanes")]
fn test_missing_layout_data_is_missing_element(#[case] from: &str, #[case] to: &str) {
    let xml = RUN_INFO_XML.replace(from, to);
    assert!(matches!(RunInfo::parse(&xml), Err(InteropError::MissingElement { .. })));
}

#[test]
fn test_oversized_layout_is_bad_format() {
    let xml = RUN_INFO_XML.replace("SwathCount=\"1\" TileCount=\"2\"", "SwathCount=\"65536\" TileCount=\"65536\"");
    match RunInfo::parse(&xml) {
        Err(InteropError::BadXmlFormat { reason }) => assert!(reason.contains("tiles per lane")),
        other => panic!("expected BadXmlFormat, got {other:?}"),
    }
}

#[test]
fn test_non_numeric_cycle_count_is_bad_format() {
    let xml = RUN_INFO_XML.replace("NumCycles=\"3\"", "NumCycles=\"three\"");
    assert!(matches!(RunInfo::parse(&xml), Err(InteropError::BadXmlFormat { .. })));
}

// ==================== Loading Error Paths ====================

#[test]
fn test_missing_run_folder_is_file_not_found() {
    let dir = TempDir::new().unwrap();
    let mut run = RunMetrics::default();
    let err = run.read_metrics(dir.path().join("absent"), u32::MAX, &load_all(), 1).unwrap_err();
    assert!(matches!(err, InteropError::FileNotFound { .. }));
}

#[test]
fn test_missing_run_info_is_file_not_found() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(load_folder(&dir), Err(InteropError::FileNotFound { .. })));
}

#[rstest]
#[case(3, vec![0], 1, "valid_to_load")]
#[case(0, vec![1; MetricGroup::COUNT], 1, "last_cycle")]
#[case(3, vec![1; MetricGroup::COUNT], 0, "thread_count")]
fn test_bad_parameters_fail_before_io(
    #[case] last_cycle: u32,
    #[case] mask: Vec<u8>,
    #[case] threads: usize,
    #[case] expected: &str,
) {
    // The folder does not exist, so any file access would report FileNotFound.
    let mut run = RunMetrics::default();
    match run.read_metrics("", last_cycle, &mask, threads) {
        Err(InteropError::InvalidParameter { parameter, .. }) => assert_eq!(parameter, expected),
        other => panic!("expected InvalidParameter for {expected}, got {other:?}"),
    }
}

#[test]
fn test_truncated_file_keeps_complete_records() -> anyhow::Result<()> {
    let dir = sample_run_folder();
    let path = metric_file_path(dir.path(), MetricGroup::Error);
    let bytes = fs::read(&path)?;
    fs::write(&path, &bytes[..bytes.len() - 5])?;

    let mut decoded = MetricSet::<ErrorMetric>::new();
    let err = io::read_from_file(&path, &mut decoded).unwrap_err();
    assert!(matches!(err, InteropError::IncompleteFile { .. }));
    assert_eq!(decoded.size(), 2);

    // A run load warns and keeps going with the complete records.
    let run = load_folder(&dir)?;
    assert_eq!(run.group_size(MetricGroup::Error), 2);
    assert_eq!(run.error().max_cycle(), 2);
    assert_eq!(run.group_size(MetricGroup::Extraction), 10);
    Ok(())
}

#[test]
fn test_unknown_version_is_bad_record_format() {
    let dir = sample_run_folder();
    let path = metric_file_path(dir.path(), MetricGroup::Extraction);
    let mut bytes = fs::read(&path).unwrap();
    bytes[0] = 42;
    fs::write(&path, &bytes).unwrap();
    assert!(matches!(load_folder(&dir), Err(InteropError::BadRecordFormat { .. })));
}

#[test]
fn test_empty_metric_file_is_skipped() -> anyhow::Result<()> {
    let dir = sample_run_folder();
    let path = metric_file_path(dir.path(), MetricGroup::Tile);
    fs::write(&path, [])?;
    let mut tiles = MetricSet::<TileMetric>::new();
    assert!(matches!(io::read_from_file(&path, &mut tiles), Err(InteropError::IncompleteFile { .. })));

    let run = load_folder(&dir)?;
    assert_eq!(run.group_size(MetricGroup::Tile), 0);
    assert_eq!(run.group_size(MetricGroup::Error), 3);
    Ok(())
}

#[test]
fn test_reload_discards_previous_run() -> anyhow::Result<()> {
    let first = sample_run_folder();
    let second = TempDir::new()?;
    write_run_info(second.path(), RUN_INFO_XML);
    let mut index_only = RunMetrics::new(RunInfo::parse(RUN_INFO_XML)?);
    *index_only.index_mut() = sample_run().index().clone();
    index_only.write_metrics(second.path())?;

    let mut run = RunMetrics::default();
    run.read_metrics(first.path(), u32::MAX, &load_all(), 2)?;
    assert_eq!(run.group_size(MetricGroup::Error), 3);

    run.read_metrics(second.path(), u32::MAX, &load_all(), 2)?;
    assert_eq!(run.group_size(MetricGroup::Index), 1);
    for group in [MetricGroup::Error, MetricGroup::Tile, MetricGroup::Extraction, MetricGroup::Q, MetricGroup::QCollapsed] {
        assert_eq!(run.group_size(group), 0, "{group} records survived the reload");
    }
    Ok(())
}

// ==================== Channel Configuration ====================

/// The run description of [`RUN_INFO_XML`] without its channel list.
fn legacy_run_info() -> String {
    RUN_INFO_XML.replace("    <ImageChannels>\n      <Name>Red</Name>\n      <Name>Green</Name>\n    </ImageChannels>\n", "")
}

/// A run folder holding only index and tile metrics under a legacy run description.
fn index_only_folder() -> anyhow::Result<TempDir> {
    let dir = TempDir::new()?;
    write_run_info(dir.path(), &legacy_run_info());
    let sample = sample_run();
    let mut run = RunMetrics::new(RunInfo::parse(RUN_INFO_XML)?);
    *run.index_mut() = sample.index().clone();
    *run.tile_mut() = sample.tile().clone();
    run.write_metrics(dir.path())?;
    Ok(dir)
}

#[test]
fn test_legacy_run_names_channels_from_run_parameters() -> anyhow::Result<()> {
    assert!(RunInfo::parse(&legacy_run_info())?.channels().is_empty());
    let dir = index_only_folder()?;
    fs::write(
        dir.path().join(RUN_PARAMETERS_FILE_NAME),
        "<RunParameters><Setup><ApplicationName>HiSeq Control Software</ApplicationName></Setup></RunParameters>",
    )?;

    let run = load_folder(&dir)?;
    assert_eq!(run.run_parameters().instrument_type(), InstrumentType::HiSeq);
    assert_eq!(run.run_info().channels(), ["A", "C", "G", "T"]);
    let summary = summarize_index_metrics(&run)?;
    assert_eq!(summary.at(0)?.total_pf_reads, 1600);
    Ok(())
}

#[test]
fn test_legacy_run_without_parameters_is_invalid_channel() -> anyhow::Result<()> {
    let dir = index_only_folder()?;
    assert!(matches!(load_folder(&dir), Err(InteropError::InvalidChannel { .. })));
    Ok(())
}

#[test]
fn test_lane_outside_run_is_invalid_run_info() {
    let dir = TempDir::new().unwrap();
    write_run_info(dir.path(), RUN_INFO_XML);
    let mut run = sample_run();
    run.error_mut().insert(ErrorMetric::new(3, 1101, 1, 0.1));
    run.write_metrics(dir.path()).unwrap();
    match load_folder(&dir) {
        Err(InteropError::InvalidRunInfo { name, value, bound, .. }) => {
            assert_eq!((name, value, bound), ("lane", 3, 2));
        }
        other => panic!("expected InvalidRunInfo, got {other:?}"),
    }
}

#[test]
fn test_cycle_beyond_run_is_invalid_run_info_cycle() {
    let dir = TempDir::new().unwrap();
    write_run_info(dir.path(), RUN_INFO_XML);
    let mut run = sample_run();
    run.error_mut().insert(ErrorMetric::new(1, 1101, 9, 0.1));
    run.write_metrics(dir.path()).unwrap();
    assert!(matches!(load_folder(&dir), Err(InteropError::InvalidRunInfoCycle { cycle: 9, .. })));

    // Dropping later cycles while loading keeps the run valid.
    let mut run = RunMetrics::default();
    run.read_metrics(dir.path(), 5, &load_all(), 1).unwrap();
    assert_eq!(run.group_size(MetricGroup::Error), 3);
}

#[test]
fn test_finalize_empty_run_is_invalid_channel() {
    let mut run = RunMetrics::default();
    assert!(matches!(run.finalize_after_load(), Err(InteropError::InvalidChannel { .. })));
}

// ==================== Buffer Error Paths ====================

fn corrected_intensity_run() -> RunMetrics {
    let mut run = RunMetrics::default();
    let set = run.corrected_intensity_mut();
    set.set_version(3);
    for (cycle, called, counts) in [
        (1, [245.0, 252.0, 61.0, 235.0], [52, 1_049_523, 654_071, 500_476, 982_989]),
        (2, [232.0, 257.0, 68.0, 228.0], [0, 1_063_708, 582_243, 588_028, 953_132]),
        (3, [227.0, 268.0, 68.0, 229.0], [0, 1_022_928, 617_523, 594_836, 951_825]),
    ] {
        set.insert(CorrectedIntensityMetric::new(7, 1114, cycle, called.to_vec(), counts.to_vec()));
    }
    run
}

#[test]
fn test_corrected_intensity_buffer_size() {
    let run = corrected_intensity_run();
    let size = run.calculate_buffer_size(MetricGroup::CorrectedInt).unwrap();
    assert_eq!(size, 2 + 3 * 42);

    let mut exact = vec![0_u8; size];
    assert_eq!(run.write_metrics_to_buffer(MetricGroup::CorrectedInt, &mut exact).unwrap(), size);

    let mut decoded = RunMetrics::default();
    decoded.read_metrics_from_buffer(MetricGroup::CorrectedInt, &exact).unwrap();
    assert_eq!(decoded.corrected_intensity().size(), 3);
    assert_eq!(decoded.corrected_intensity().at(0).unwrap().called_counts()[1], 1_049_523);
}

#[test]
fn test_small_buffer_is_invalid_argument() {
    let run = corrected_intensity_run();
    let size = run.calculate_buffer_size(MetricGroup::CorrectedInt).unwrap();
    let mut small = vec![0_u8; size - 1];
    let err = run.write_metrics_to_buffer(MetricGroup::CorrectedInt, &mut small).unwrap_err();
    assert!(matches!(err, InteropError::InvalidArgument { .. }));
}

#[test]
fn test_value_too_wide_for_field_is_invalid_argument() {
    let mut set = MetricSet::with_version(3);
    set.insert(ErrorMetric::new(1, 70_000, 1, 0.1));
    assert!(matches!(io::write_to_vec(&set), Err(InteropError::InvalidArgument { .. })));
}

// ==================== Logic Error Paths ====================

#[test]
fn test_unknown_metric_name() {
    assert!(matches!(list_metrics_to_load("Unknown"), Err(InteropError::InvalidMetricType { .. })));
    let run = sample_run();
    let options = FilterOptions::for_run(run.run_info());
    let err = plot_flowcell_map(&run, "NoMetric", &options).unwrap_err();
    assert!(matches!(err, InteropError::InvalidMetricType { ref name } if name == "NoMetric"));
}

#[test]
fn test_metric_names_select_groups() {
    assert_eq!(list_metrics_to_load("Intensity").unwrap()[MetricGroup::Extraction.index()], 1);
    assert_eq!(list_metrics_to_load("Q").unwrap()[MetricGroup::Q.index()], 1);
    assert_eq!(to_feature(MetricType::Intensity), 18);
}

#[test]
fn test_plot_kind_mismatch_is_invalid_parameter() {
    let run = sample_run();
    let options = FilterOptions::for_run(run.run_info());
    assert!(matches!(
        plot_by_cycle(&run, MetricType::Clusters, &options),
        Err(InteropError::InvalidParameter { .. })
    ));
    assert!(matches!(
        plot_by_lane(&run, MetricType::ErrorRate, &options),
        Err(InteropError::InvalidParameter { .. })
    ));
}

#[rstest]
#[case(FilterOptions::for_run(sample_run().run_info()).with_lane(Some(3)), "lane")]
#[case(FilterOptions::for_run(sample_run().run_info()).with_surface(Some(3)), "surface")]
#[case(FilterOptions::for_run(sample_run().run_info()).with_channel(Some(2)), "channel")]
#[case(FilterOptions::for_run(sample_run().run_info()).with_cycle(Some(6)), "cycle")]
fn test_filter_outside_run_is_invalid_filter_option(#[case] options: FilterOptions, #[case] expected: &str) {
    let run = sample_run();
    match plot_by_cycle(&run, MetricType::Intensity, &options) {
        Err(InteropError::InvalidFilterOption { option, .. }) => assert_eq!(option, expected),
        other => panic!("expected InvalidFilterOption for {expected}, got {other:?}"),
    }
}

#[test]
fn test_misnumbered_reads_are_invalid_read() {
    let info = RunInfo::new(FlowcellLayout::new(1, 1, 1, 1))
        .with_reads(vec![ReadInfo::new(1, 1, 10, false), ReadInfo::new(3, 11, 10, false)]);
    let run = RunMetrics::new(info);
    assert!(matches!(summarize_run_metrics(&run), Err(InteropError::InvalidRead { read: 3, .. })));
    assert!(matches!(summarize_index_metrics(&run), Err(InteropError::InvalidRead { .. })));
}

#[test]
fn test_empty_columns_are_invalid_column_type() {
    let err = create_imaging_table_columns(&[], &[]).unwrap_err();
    assert!(matches!(err, InteropError::InvalidColumnType { .. }));
}
