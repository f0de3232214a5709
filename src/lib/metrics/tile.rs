//! Per-tile cluster metrics and per-read phasing/alignment.

use crate::constants::MetricGroup;
use crate::metrics::MetricRecord;

/// Header of a tile metric set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileHeader {
    /// Imaged tile area in mm², used to derive densities from counts.
    pub area: f32,
}

impl Default for TileHeader {
    fn default() -> Self {
        Self { area: f32::NAN }
    }
}

/// Alignment and phasing of one read on one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadMetric {
    pub read: u32,
    pub percent_aligned: f32,
    pub percent_phasing: f32,
    pub percent_prephasing: f32,
}

impl ReadMetric {
    #[must_use]
    pub fn new(read: u32, percent_aligned: f32, percent_phasing: f32, percent_prephasing: f32) -> Self {
        Self { read, percent_aligned, percent_phasing, percent_prephasing }
    }

    /// A read with every value missing.
    #[must_use]
    pub fn empty(read: u32) -> Self {
        Self::new(read, f32::NAN, f32::NAN, f32::NAN)
    }

    fn merge(&mut self, later: &ReadMetric) {
        merge_value(&mut self.percent_aligned, later.percent_aligned);
        merge_value(&mut self.percent_phasing, later.percent_phasing);
        merge_value(&mut self.percent_prephasing, later.percent_prephasing);
    }
}

/// Keeps `current` unless `later` carries a value.
fn merge_value(current: &mut f32, later: f32) {
    if !later.is_nan() {
        *current = later;
    }
}

/// Cluster density and counts of one tile, with per-read values.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMetric {
    lane: u32,
    tile: u32,
    cluster_density: f32,
    cluster_density_pf: f32,
    cluster_count: f32,
    cluster_count_pf: f32,
    read_metrics: Vec<ReadMetric>,
}

impl TileMetric {
    #[must_use]
    pub fn new(
        lane: u32,
        tile: u32,
        cluster_density: f32,
        cluster_density_pf: f32,
        cluster_count: f32,
        cluster_count_pf: f32,
        read_metrics: Vec<ReadMetric>,
    ) -> Self {
        Self {
            lane,
            tile,
            cluster_density,
            cluster_density_pf,
            cluster_count,
            cluster_count_pf,
            read_metrics,
        }
    }

    /// A tile with every value missing.
    #[must_use]
    pub fn empty(lane: u32, tile: u32) -> Self {
        Self::new(lane, tile, f32::NAN, f32::NAN, f32::NAN, f32::NAN, Vec::new())
    }

    /// Clusters per mm².
    #[must_use]
    pub fn cluster_density(&self) -> f32 {
        self.cluster_density
    }

    /// Passing-filter clusters per mm².
    #[must_use]
    pub fn cluster_density_pf(&self) -> f32 {
        self.cluster_density_pf
    }

    #[must_use]
    pub fn cluster_count(&self) -> f32 {
        self.cluster_count
    }

    #[must_use]
    pub fn cluster_count_pf(&self) -> f32 {
        self.cluster_count_pf
    }

    pub(crate) fn set_cluster_density(&mut self, density: f32) {
        self.cluster_density = density;
    }

    pub(crate) fn set_cluster_density_pf(&mut self, density: f32) {
        self.cluster_density_pf = density;
    }

    pub(crate) fn set_cluster_count(&mut self, count: f32) {
        self.cluster_count = count;
    }

    pub(crate) fn set_cluster_count_pf(&mut self, count: f32) {
        self.cluster_count_pf = count;
    }

    /// Percentage of clusters passing filter, `NaN` without a count.
    #[must_use]
    pub fn percent_pf(&self) -> f32 {
        if self.cluster_count > 0.0 {
            self.cluster_count_pf / self.cluster_count * 100.0
        } else {
            f32::NAN
        }
    }

    #[must_use]
    pub fn read_metrics(&self) -> &[ReadMetric] {
        &self.read_metrics
    }

    /// Values for `read`, if recorded.
    #[must_use]
    pub fn read_metric(&self, read: u32) -> Option<&ReadMetric> {
        self.read_metrics.iter().find(|r| r.read == read)
    }

    /// Values for `read`, creating an empty entry (kept in read order) when absent.
    pub fn read_metric_mut(&mut self, read: u32) -> &mut ReadMetric {
        let position = match self.read_metrics.binary_search_by_key(&read, |r| r.read) {
            Ok(position) => position,
            Err(position) => {
                self.read_metrics.insert(position, ReadMetric::empty(read));
                position
            }
        };
        &mut self.read_metrics[position]
    }

    #[must_use]
    pub fn percent_aligned(&self, read: u32) -> f32 {
        self.read_metric(read).map_or(f32::NAN, |r| r.percent_aligned)
    }

    #[must_use]
    pub fn percent_phasing(&self, read: u32) -> f32 {
        self.read_metric(read).map_or(f32::NAN, |r| r.percent_phasing)
    }

    #[must_use]
    pub fn percent_prephasing(&self, read: u32) -> f32 {
        self.read_metric(read).map_or(f32::NAN, |r| r.percent_prephasing)
    }
}

impl MetricRecord for TileMetric {
    type Header = TileHeader;
    const GROUP: MetricGroup = MetricGroup::Tile;

    fn lane(&self) -> u32 {
        self.lane
    }

    fn tile(&self) -> u32 {
        self.tile
    }

    /// Tile streams spread one tile over many code/value records; a later
    /// record only fills in the values it carries.
    fn merge(&mut self, later: Self) {
        merge_value(&mut self.cluster_density, later.cluster_density);
        merge_value(&mut self.cluster_density_pf, later.cluster_density_pf);
        merge_value(&mut self.cluster_count, later.cluster_count);
        merge_value(&mut self.cluster_count_pf, later.cluster_count_pf);
        for read in &later.read_metrics {
            self.read_metric_mut(read.read).merge(read);
        }
    }
}
