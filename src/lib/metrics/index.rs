//! Per-tile demultiplexing counts.

use crate::constants::MetricGroup;
use crate::metrics::MetricRecord;

/// Clusters assigned to one index sequence on a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub index_seq: String,
    pub sample_id: String,
    pub sample_proj: String,
    pub cluster_count: u64,
}

impl IndexInfo {
    #[must_use]
    pub fn new(
        index_seq: impl Into<String>,
        sample_id: impl Into<String>,
        sample_proj: impl Into<String>,
        cluster_count: u64,
    ) -> Self {
        Self {
            index_seq: index_seq.into(),
            sample_id: sample_id.into(),
            sample_proj: sample_proj.into(),
            cluster_count,
        }
    }

    /// First index (i7) of a possibly dual index sequence.
    #[must_use]
    pub fn index1(&self) -> &str {
        self.split_index().0
    }

    /// Second index (i5), empty for single-index sequences.
    #[must_use]
    pub fn index2(&self) -> &str {
        self.split_index().1
    }

    fn split_index(&self) -> (&str, &str) {
        self.index_seq
            .split_once(['-', '+'])
            .unwrap_or((self.index_seq.as_str(), ""))
    }

    fn same_assignment(&self, other: &IndexInfo) -> bool {
        self.index_seq == other.index_seq
            && self.sample_id == other.sample_id
            && self.sample_proj == other.sample_proj
    }
}

/// Index assignments of one tile for one read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMetric {
    lane: u32,
    tile: u32,
    read: u32,
    indices: Vec<IndexInfo>,
}

impl IndexMetric {
    #[must_use]
    pub fn new(lane: u32, tile: u32, read: u32, indices: Vec<IndexInfo>) -> Self {
        Self { lane, tile, read, indices }
    }

    #[must_use]
    pub fn indices(&self) -> &[IndexInfo] {
        &self.indices
    }

    /// Clusters assigned to any index on this tile.
    #[must_use]
    pub fn total_clusters(&self) -> u64 {
        self.indices.iter().map(|i| i.cluster_count).sum()
    }
}

impl MetricRecord for IndexMetric {
    type Header = ();
    const GROUP: MetricGroup = MetricGroup::Index;

    fn lane(&self) -> u32 {
        self.lane
    }

    fn tile(&self) -> u32 {
        self.tile
    }

    fn read(&self) -> u32 {
        self.read
    }

    /// Index streams hold one record per assignment; counts for the same
    /// assignment accumulate.
    fn merge(&mut self, later: Self) {
        for info in later.indices {
            match self.indices.iter_mut().find(|i| i.same_assignment(&info)) {
                Some(existing) => existing.cluster_count += info.cluster_count,
                None => self.indices.push(info),
            }
        }
    }
}
