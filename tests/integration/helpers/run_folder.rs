//! Builds small run folders on disk: a `RunInfo.xml` plus `InterOp` files.

use std::fs;
use std::path::Path;

use interop_lib::constants::MetricGroup;
use interop_lib::metrics::q::MAX_Q_BINS;
use interop_lib::metrics::{ErrorMetric, ExtractionMetric, IndexInfo, IndexMetric, QMetric, ReadMetric, TileMetric};
use interop_lib::run::{RUN_INFO_FILE_NAME, RunInfo};
use interop_lib::run_metrics::RunMetrics;
use tempfile::TempDir;

/// Two lanes, two surfaces, one swath of two tiles; a 3-cycle read and a
/// 2-cycle index read; two image channels.
pub const RUN_INFO_XML: &str = r#"<?xml version="1.0"?>
<RunInfo Version="3">
  <Run Id="200101_M00001_0001_000000000-TEST1" Number="1">
    <Flowcell>000000000-TEST1</Flowcell>
    <Instrument>M00001</Instrument>
    <Date>200101</Date>
    <Reads>
      <Read Number="1" NumCycles="3" IsIndexedRead="N" />
      <Read Number="2" NumCycles="2" IsIndexedRead="Y" />
    </Reads>
    <FlowcellLayout LaneCount="2" SurfaceCount="2" SwathCount="1" TileCount="2">
      <TileSet TileNamingConvention="FourDigit">
        <Tiles>
          <Tile>1_1101</Tile>
          <Tile>1_1102</Tile>
          <Tile>1_2101</Tile>
          <Tile>1_2102</Tile>
        </Tiles>
      </TileSet>
    </FlowcellLayout>
    <ImageChannels>
      <Name>Red</Name>
      <Name>Green</Name>
    </ImageChannels>
  </Run>
</RunInfo>"#;

/// Total cycles declared by [`RUN_INFO_XML`].
pub const TOTAL_CYCLES: u32 = 5;

/// Tiles of lane 1 that carry data, one per surface.
pub const TILES: [u32; 2] = [1101, 2101];

/// A Q-score histogram with 200 calls at Q20 and 800 calls at Q35.
pub fn q_histogram() -> Vec<u32> {
    let mut histogram = vec![0; MAX_Q_BINS];
    histogram[19] = 200;
    histogram[34] = 800;
    histogram
}

/// A run with tile, error, extraction, Q-score and index metrics for lane 1.
///
/// Corrected intensity metrics are deliberately absent.
pub fn sample_run() -> RunMetrics {
    let info = RunInfo::parse(RUN_INFO_XML).expect("run description parses");
    let mut run = RunMetrics::new(info);

    run.tile_mut().set_version(2);
    for (tile, density) in TILES.iter().zip([100_000.0, 300_000.0]) {
        let reads = vec![ReadMetric::new(1, 90.0, 0.1, 0.2), ReadMetric::new(2, 80.0, 0.3, 0.4)];
        run.tile_mut().insert(TileMetric::new(1, *tile, density, density / 2.0, 1000.0, 800.0, reads));
    }

    run.error_mut().set_version(4);
    for (cycle, rate) in [(1, 0.5), (2, 1.5), (3, 9.0)] {
        run.error_mut().insert(ErrorMetric::new(1, TILES[0], cycle, rate));
    }

    run.extraction_mut().set_version(3);
    run.q_mut().set_version(7);
    for &tile in &TILES {
        for cycle in 1..=TOTAL_CYCLES {
            let intensity = u16::try_from(100 * cycle).expect("small cycle");
            run.extraction_mut().insert(ExtractionMetric::new(
                1,
                tile,
                cycle,
                vec![intensity, intensity + 50],
                vec![2.5, 2.75],
            ));
            run.q_mut().insert(QMetric::new(1, tile, cycle, q_histogram()));
        }
    }

    run.index_mut().set_version(2);
    run.index_mut().insert(IndexMetric::new(
        1,
        TILES[0],
        1,
        vec![IndexInfo::new("ACGT-TTGG", "s1", "proj", 300), IndexInfo::new("GGCC-AATT", "s2", "proj", 100)],
    ));
    run
}

/// Writes `RunInfo.xml` into `folder`.
pub fn write_run_info(folder: &Path, xml: &str) {
    fs::write(folder.join(RUN_INFO_FILE_NAME), xml).expect("write RunInfo.xml");
}

/// Creates a run folder holding [`RUN_INFO_XML`] and the metrics of [`sample_run`].
pub fn sample_run_folder() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_run_info(dir.path(), RUN_INFO_XML);
    sample_run().write_metrics(dir.path()).expect("write metrics");
    dir
}

/// A load mask selecting every metric group.
pub fn load_all() -> [u8; MetricGroup::COUNT] {
    [1; MetricGroup::COUNT]
}
