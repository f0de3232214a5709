//! Metric records and the keyed, insertion-ordered [`MetricSet`] that holds them.
//!
//! Each record type corresponds to one [`MetricGroup`] and is identified by a
//! [`MetricKey`] built from the subset of lane/tile/cycle/read that applies to it.
//!
//! - [`extraction`] - per-cycle focus and maximum intensity
//! - [`corrected_intensity`] - per-cycle corrected intensities and base-call counts
//! - [`error`] - per-cycle error rate from PhiX alignment
//! - [`tile`] - per-tile cluster density/count and per-read phasing/alignment
//! - [`q`] - per-cycle Q-score histograms
//! - [`q_collapsed`] - per-cycle Q20/Q30/total/median summaries
//! - [`index`] - per-tile demultiplexed cluster counts

pub mod corrected_intensity;
pub mod error;
pub mod extraction;
pub mod index;
pub mod q;
pub mod q_collapsed;
pub mod tile;

use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::constants::MetricGroup;
use crate::errors::{InteropError, Result, checked_at};

pub use corrected_intensity::CorrectedIntensityMetric;
pub use error::ErrorMetric;
pub use extraction::{ExtractionHeader, ExtractionMetric};
pub use index::{IndexInfo, IndexMetric};
pub use q::{QHeader, QMetric, QScoreBin};
pub use q_collapsed::QCollapsedMetric;
pub use tile::{ReadMetric, TileHeader, TileMetric};

/// Identity of a record within one metric set.
///
/// Fields that do not apply to a record type are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricKey {
    pub lane: u32,
    pub tile: u32,
    pub cycle: u32,
    pub read: u32,
}

impl MetricKey {
    /// Key of a per-tile record.
    #[must_use]
    pub fn tile(lane: u32, tile: u32) -> Self {
        Self { lane, tile, cycle: 0, read: 0 }
    }

    /// Key of a per-cycle record.
    #[must_use]
    pub fn cycle(lane: u32, tile: u32, cycle: u32) -> Self {
        Self { lane, tile, cycle, read: 0 }
    }

    /// Key of a per-read record.
    #[must_use]
    pub fn read(lane: u32, tile: u32, read: u32) -> Self {
        Self { lane, tile, cycle: 0, read }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lane {} tile {}", self.lane, self.tile)?;
        if self.cycle > 0 {
            write!(f, " cycle {}", self.cycle)?;
        }
        if self.read > 0 {
            write!(f, " read {}", self.read)?;
        }
        Ok(())
    }
}

/// Common interface of every metric record.
pub trait MetricRecord: Clone + fmt::Debug {
    /// Per-set header data stored alongside the records.
    type Header: Clone + Default + fmt::Debug + PartialEq;

    /// Group the record belongs to.
    const GROUP: MetricGroup;

    fn lane(&self) -> u32;

    fn tile(&self) -> u32;

    /// Cycle of a per-cycle record, 0 otherwise.
    fn cycle(&self) -> u32 {
        0
    }

    /// Read of a per-read record, 0 otherwise.
    fn read(&self) -> u32 {
        0
    }

    fn key(&self) -> MetricKey {
        MetricKey { lane: self.lane(), tile: self.tile(), cycle: self.cycle(), read: self.read() }
    }

    /// Combines a record decoded later in a stream with one already stored under
    /// the same key. Most formats store one complete record per key, so the later
    /// record replaces the earlier one.
    fn merge(&mut self, later: Self) {
        *self = later;
    }
}

/// Insertion-ordered collection of records of one type, indexed by key.
#[derive(Debug, Clone)]
pub struct MetricSet<T: MetricRecord> {
    version: u8,
    header: T::Header,
    records: Vec<T>,
    index: AHashMap<MetricKey, usize>,
}

impl<T: MetricRecord> Default for MetricSet<T> {
    fn default() -> Self {
        Self { version: 0, header: T::Header::default(), records: Vec::new(), index: AHashMap::new() }
    }
}

impl<T: MetricRecord> PartialEq for MetricSet<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.header == other.header && self.records == other.records
    }
}

impl<T: MetricRecord> MetricSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set tagged with `version`.
    #[must_use]
    pub fn with_version(version: u8) -> Self {
        Self { version, ..Self::default() }
    }

    /// Creates an empty set with a header.
    #[must_use]
    pub fn with_header(version: u8, header: T::Header) -> Self {
        Self { version, header, ..Self::default() }
    }

    /// Schema version; 0 until the set is read or explicitly tagged.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn set_version(&mut self, version: u8) {
        self.version = version;
    }

    #[must_use]
    pub fn header(&self) -> &T::Header {
        &self.header
    }

    pub fn set_header(&mut self, header: T::Header) {
        self.header = header;
    }

    /// Inserts `record`; a record with the same key is overwritten in place, so
    /// its position is kept and the last write wins.
    pub fn insert(&mut self, record: T) {
        let key = record.key();
        if let Some(&position) = self.index.get(&key) {
            self.records[position] = record;
        } else {
            self.index.insert(key, self.records.len());
            self.records.push(record);
        }
    }

    /// Inserts `record`, combining it with a stored record of the same key via
    /// [`MetricRecord::merge`].
    pub fn insert_merged(&mut self, record: T) {
        let key = record.key();
        if let Some(&position) = self.index.get(&key) {
            self.records[position].merge(record);
        } else {
            self.index.insert(key, self.records.len());
            self.records.push(record);
        }
    }

    /// Record at `position` in insertion order.
    ///
    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`] when `position >= size()`.
    pub fn at(&self, position: usize) -> Result<&T> {
        checked_at(&self.records, position, "MetricSet")
    }

    /// Record stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &MetricKey) -> Option<&T> {
        self.index.get(key).map(|&position| &self.records[position])
    }

    pub fn get_mut(&mut self, key: &MetricKey) -> Option<&mut T> {
        self.index.get(key).map(|&position| &mut self.records[position])
    }

    /// Record stored under `key`.
    ///
    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`] when no record has that key.
    pub fn get_required(&self, key: &MetricKey) -> Result<&T> {
        self.get(key).ok_or_else(|| InteropError::IndexOutOfBounds {
            container: "MetricSet",
            index: key.to_string(),
            size: self.records.len(),
        })
    }

    #[must_use]
    pub fn contains(&self, key: &MetricKey) -> bool {
        self.index.contains_key(key)
    }

    /// Number of records.
    #[must_use]
    pub fn size(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Removes all records, keeping the version and header.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    /// Keeps only the records for which `keep` returns true, preserving order.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.records.retain(keep);
        self.index = self.records.iter().enumerate().map(|(i, r)| (r.key(), i)).collect();
    }

    /// Largest cycle referenced, 0 for an empty or per-tile set.
    #[must_use]
    pub fn max_cycle(&self) -> u32 {
        self.records.iter().map(MetricRecord::cycle).max().unwrap_or(0)
    }

    /// Distinct lanes in ascending order.
    #[must_use]
    pub fn lanes(&self) -> Vec<u32> {
        let mut lanes: Vec<u32> = self.records.iter().map(MetricRecord::lane).collect();
        lanes.sort_unstable();
        lanes.dedup();
        lanes
    }

    /// Distinct tile numbers in `lane`, ascending.
    #[must_use]
    pub fn tiles_for_lane(&self, lane: u32) -> Vec<u32> {
        let mut tiles: Vec<u32> =
            self.records.iter().filter(|r| r.lane() == lane).map(MetricRecord::tile).collect();
        tiles.sort_unstable();
        tiles.dedup();
        tiles
    }
}

impl<'a, T: MetricRecord> IntoIterator for &'a MetricSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<T: MetricRecord> FromIterator<T> for MetricSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(lane: u32, tile: u32, cycle: u32, rate: f32) -> ErrorMetric {
        ErrorMetric::new(lane, tile, cycle, rate)
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut set = MetricSet::new();
        set.insert(metric(1, 1101, 1, 0.5));
        set.insert(metric(1, 1101, 2, 0.6));
        assert_eq!(set.size(), 2);
        assert_eq!(set.at(1).unwrap().cycle(), 2);
        assert!(set.get(&MetricKey::cycle(1, 1101, 2)).is_some());
        assert!(set.get(&MetricKey::cycle(1, 1101, 3)).is_none());
        assert_eq!(set.max_cycle(), 2);
    }

    #[test]
    fn test_duplicate_key_last_write_wins() {
        let mut set = MetricSet::new();
        set.insert(metric(1, 1101, 1, 0.5));
        set.insert(metric(2, 1101, 1, 0.7));
        set.insert(metric(1, 1101, 1, 0.9));
        assert_eq!(set.size(), 2);
        let first = set.at(0).unwrap();
        assert_eq!(first.lane(), 1);
        assert!((first.error_rate() - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_at_out_of_bounds() {
        let set: MetricSet<ErrorMetric> = MetricSet::new();
        assert!(matches!(set.at(0), Err(InteropError::IndexOutOfBounds { size: 0, .. })));
    }

    #[test]
    fn test_get_required_absent_key() {
        let set: MetricSet<ErrorMetric> = std::iter::once(metric(1, 1101, 1, 0.5)).collect();
        let err = set.get_required(&MetricKey::cycle(1, 1101, 9)).unwrap_err();
        assert!(err.to_string().contains("cycle 9"));
    }

    #[test]
    fn test_retain_rebuilds_index() {
        let mut set: MetricSet<ErrorMetric> =
            (1..=4).map(|cycle| metric(1, 1101, cycle, 0.1)).collect();
        set.retain(|m| m.cycle() % 2 == 0);
        assert_eq!(set.size(), 2);
        assert!(set.get(&MetricKey::cycle(1, 1101, 4)).is_some());
        assert!(set.get(&MetricKey::cycle(1, 1101, 1)).is_none());
        assert_eq!(set.at(1).unwrap().cycle(), 4);
    }

    #[test]
    fn test_lanes_and_tiles() {
        let set: MetricSet<ErrorMetric> = [
            metric(2, 1102, 1, 0.1),
            metric(1, 1101, 1, 0.1),
            metric(2, 1101, 1, 0.1),
            metric(2, 1101, 2, 0.1),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.lanes(), vec![1, 2]);
        assert_eq!(set.tiles_for_lane(2), vec![1101, 1102]);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(MetricKey::read(1, 1101, 2).to_string(), "lane 1 tile 1101 read 2");
        assert_eq!(MetricKey::tile(3, 2101).to_string(), "lane 3 tile 2101");
    }
}
