//! Per read, lane and surface statistics over tiles.

use std::collections::BTreeMap;

use interop_stats::Stat;
use serde::{Deserialize, Serialize};

use crate::constants::TileNamingMethod;
use crate::errors::{Result, checked_at};
use crate::logic::plot::samples::collapsed_q;
use crate::metrics::{MetricRecord, MetricSet, QCollapsedMetric};
use crate::run::{FlowcellLayout, ReadInfo, RunInfo};
use crate::run_metrics::RunMetrics;

/// Values of one tile over one read.
#[derive(Debug, Clone, Copy)]
struct TileRead {
    surface: u32,
    density: f32,
    density_pf: f32,
    cluster_count: f32,
    cluster_count_pf: f32,
    phasing: f32,
    prephasing: f32,
    aligned: f32,
    error_rate: f32,
    intensity: f32,
    q30: u64,
    total: u64,
}

impl TileRead {
    fn new(surface: u32) -> Self {
        Self {
            surface,
            density: f32::NAN,
            density_pf: f32::NAN,
            cluster_count: f32::NAN,
            cluster_count_pf: f32::NAN,
            phasing: f32::NAN,
            prephasing: f32::NAN,
            aligned: f32::NAN,
            error_rate: f32::NAN,
            intensity: f32::NAN,
            q30: 0,
            total: 0,
        }
    }
}

fn percent(part: u64, total: u64) -> f32 {
    if total == 0 {
        return f32::NAN;
    }
    (part as f64 / total as f64 * 100.0) as f32
}

fn finite_mean<I: IntoIterator<Item = f32>>(values: I) -> f32 {
    interop_stats::mean(&interop_stats::finite(values))
}

fn finite_sum<I: IntoIterator<Item = f32>>(values: I) -> f64 {
    values.into_iter().filter(|v| v.is_finite()).map(f64::from).sum()
}

/// Statistics over the tiles of a lane or surface for one read.
///
/// Per-tile values are reduced to a [`Stat`]; Q-scores and yield are pooled
/// over every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub tile_count: usize,
    /// Clusters per mm²
    pub density: Stat,
    pub density_pf: Stat,
    pub percent_pf: Stat,
    pub phasing: Stat,
    pub prephasing: Stat,
    pub percent_aligned: Stat,
    /// Mean error rate of each tile over the usable cycles of the read
    pub error_rate: Stat,
    /// Channel 0 intensity at the first cycle of the read
    pub first_cycle_intensity: Stat,
    pub percent_gt_q30: f32,
    /// Gigabases called
    pub yield_g: f32,
    pub cluster_count: f64,
    pub cluster_count_pf: f64,
}

impl MetricStats {
    fn from_tiles(tiles: &[TileRead]) -> Self {
        let stat = |value: fn(&TileRead) -> f32| Stat::from_values(tiles.iter().map(value));
        let q30: u64 = tiles.iter().map(|t| t.q30).sum();
        let total: u64 = tiles.iter().map(|t| t.total).sum();
        Self {
            tile_count: tiles.len(),
            density: stat(|t| t.density),
            density_pf: stat(|t| t.density_pf),
            percent_pf: stat(|t| t.cluster_count_pf / t.cluster_count * 100.0),
            phasing: stat(|t| t.phasing),
            prephasing: stat(|t| t.prephasing),
            percent_aligned: stat(|t| t.aligned),
            error_rate: stat(|t| t.error_rate),
            first_cycle_intensity: stat(|t| t.intensity),
            percent_gt_q30: percent(q30, total),
            yield_g: (total as f64 / 1e9) as f32,
            cluster_count: finite_sum(tiles.iter().map(|t| t.cluster_count)),
            cluster_count_pf: finite_sum(tiles.iter().map(|t| t.cluster_count_pf)),
        }
    }
}

/// Headline values pooled over every tile of one or more reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub yield_g: f32,
    pub percent_gt_q30: f32,
    pub error_rate: f32,
    pub percent_aligned: f32,
    pub first_cycle_intensity: f32,
}

impl Default for SummaryTotals {
    fn default() -> Self {
        Self::from_tiles(&[])
    }
}

impl SummaryTotals {
    fn from_tiles(tiles: &[TileRead]) -> Self {
        let q30: u64 = tiles.iter().map(|t| t.q30).sum();
        let total: u64 = tiles.iter().map(|t| t.total).sum();
        Self {
            yield_g: (total as f64 / 1e9) as f32,
            percent_gt_q30: percent(q30, total),
            error_rate: finite_mean(tiles.iter().map(|t| t.error_rate)),
            percent_aligned: finite_mean(tiles.iter().map(|t| t.aligned)),
            first_cycle_intensity: finite_mean(tiles.iter().map(|t| t.intensity)),
        }
    }
}

/// Statistics over the tiles of one surface of a lane.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSummary {
    pub surface: u32,
    pub stats: MetricStats,
}

/// Statistics over the tiles of one lane, with a breakdown by surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneSummary {
    pub lane: u32,
    pub stats: MetricStats,
    surfaces: Vec<SurfaceSummary>,
}

impl LaneSummary {
    #[must_use]
    pub fn surfaces(&self) -> &[SurfaceSummary] {
        &self.surfaces
    }

    /// Number of surfaces.
    #[must_use]
    pub fn size(&self) -> usize {
        self.surfaces.len()
    }

    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`](crate::errors::InteropError::IndexOutOfBounds)
    /// when `index >= size()`.
    pub fn at(&self, index: usize) -> Result<&SurfaceSummary> {
        checked_at(&self.surfaces, index, "LaneSummary")
    }
}

/// Lane summaries of one read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadSummary {
    pub read: ReadInfo,
    pub totals: SummaryTotals,
    lanes: Vec<LaneSummary>,
}

impl ReadSummary {
    #[must_use]
    pub fn lanes(&self) -> &[LaneSummary] {
        &self.lanes
    }

    /// Number of lanes with data.
    #[must_use]
    pub fn size(&self) -> usize {
        self.lanes.len()
    }

    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`](crate::errors::InteropError::IndexOutOfBounds)
    /// when `index >= size()`.
    pub fn at(&self, index: usize) -> Result<&LaneSummary> {
        checked_at(&self.lanes, index, "ReadSummary")
    }
}

/// Read summaries plus totals over all reads and over non-index reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub totals: SummaryTotals,
    pub nonindex_totals: SummaryTotals,
    reads: Vec<ReadSummary>,
}

impl RunSummary {
    #[must_use]
    pub fn reads(&self) -> &[ReadSummary] {
        &self.reads
    }

    /// Number of reads.
    #[must_use]
    pub fn size(&self) -> usize {
        self.reads.len()
    }

    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`](crate::errors::InteropError::IndexOutOfBounds)
    /// when `index >= size()`.
    pub fn at(&self, index: usize) -> Result<&ReadSummary> {
        checked_at(&self.reads, index, "RunSummary")
    }
}

fn tile_entry<'a>(
    tiles: &'a mut BTreeMap<(u32, u32), TileRead>,
    layout: &FlowcellLayout,
    lane: u32,
    tile: u32,
) -> &'a mut TileRead {
    tiles.entry((lane, tile)).or_insert_with(|| TileRead::new(layout.surface_of(tile)))
}

/// Per-tile values of every tile with data, for one read.
fn tile_reads(
    run: &RunMetrics,
    read: &ReadInfo,
    collapsed: &MetricSet<QCollapsedMetric>,
) -> BTreeMap<(u32, u32), TileRead> {
    let layout = run.run_info().flowcell();
    let mut tiles = BTreeMap::new();
    for metric in run.tile() {
        let values = tile_entry(&mut tiles, layout, metric.lane(), metric.tile());
        values.density = metric.cluster_density();
        values.density_pf = metric.cluster_density_pf();
        values.cluster_count = metric.cluster_count();
        values.cluster_count_pf = metric.cluster_count_pf();
        values.phasing = metric.percent_phasing(read.number());
        values.prephasing = metric.percent_prephasing(read.number());
        values.aligned = metric.percent_aligned(read.number());
    }

    let first = read.first_cycle();
    let last_usable = first + read.useable_cycles();
    let mut errors: BTreeMap<(u32, u32), Vec<f32>> = BTreeMap::new();
    for metric in run.error() {
        if (first..last_usable).contains(&metric.cycle()) && metric.error_rate().is_finite() {
            errors.entry((metric.lane(), metric.tile())).or_default().push(metric.error_rate());
        }
    }
    for ((lane, tile), rates) in errors {
        tile_entry(&mut tiles, layout, lane, tile).error_rate = interop_stats::mean(&rates);
    }

    for metric in run.extraction().iter().filter(|m| m.cycle() == first) {
        if let Some(&intensity) = metric.max_intensities().first() {
            tile_entry(&mut tiles, layout, metric.lane(), metric.tile()).intensity = f32::from(intensity);
        }
    }

    for metric in collapsed.iter().filter(|m| read.cycle_range().contains(m.cycle())) {
        let values = tile_entry(&mut tiles, layout, metric.lane(), metric.tile());
        values.q30 += u64::from(metric.q30());
        values.total += u64::from(metric.total());
    }
    tiles
}

fn lane_summaries(tiles: &BTreeMap<(u32, u32), TileRead>, info: &RunInfo) -> Vec<LaneSummary> {
    let mut by_lane: BTreeMap<u32, Vec<TileRead>> = BTreeMap::new();
    for (&(lane, _), values) in tiles {
        by_lane.entry(lane).or_default().push(*values);
    }
    let layout = info.flowcell();
    by_lane
        .into_iter()
        .map(|(lane, lane_tiles)| {
            let surfaces = if layout.naming_method() == TileNamingMethod::Unknown {
                Vec::new()
            } else {
                (1..=layout.surface_count())
                    .filter_map(|surface| {
                        let on_surface: Vec<TileRead> =
                            lane_tiles.iter().filter(|t| t.surface == surface).copied().collect();
                        (!on_surface.is_empty())
                            .then(|| SurfaceSummary { surface, stats: MetricStats::from_tiles(&on_surface) })
                    })
                    .collect()
            };
            LaneSummary { lane, stats: MetricStats::from_tiles(&lane_tiles), surfaces }
        })
        .collect()
}

/// Summarizes every read of the run by lane and surface.
///
/// Error rates are averaged over the usable cycles of each read (all but the
/// last), and intensities are taken at the first cycle of each read.
///
/// # Errors
/// Returns [`InteropError::InvalidRead`](crate::errors::InteropError::InvalidRead)
/// when the run's reads are not numbered `1..=n`.
pub fn summarize_run_metrics(run: &RunMetrics) -> Result<RunSummary> {
    let info = run.run_info();
    info.validate_reads()?;
    let collapsed = collapsed_q(run);

    let mut all = Vec::new();
    let mut nonindex = Vec::new();
    let mut reads = Vec::with_capacity(info.reads().len());
    for read in info.reads() {
        let tiles = tile_reads(run, read, &collapsed);
        let values: Vec<TileRead> = tiles.values().copied().collect();
        all.extend_from_slice(&values);
        if !read.is_index() {
            nonindex.extend_from_slice(&values);
        }
        reads.push(ReadSummary {
            read: read.clone(),
            totals: SummaryTotals::from_tiles(&values),
            lanes: lane_summaries(&tiles, info),
        });
    }
    Ok(RunSummary {
        totals: SummaryTotals::from_tiles(&all),
        nonindex_totals: SummaryTotals::from_tiles(&nonindex),
        reads,
    })
}
