//! Per lane demultiplexing summary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, checked_at};
use crate::metrics::{IndexInfo, MetricRecord, TileMetric};
use crate::run_metrics::RunMetrics;

/// Clusters assigned to one index/sample pair in a lane.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexCountSummary {
    /// 1-based order in which the pair was first seen
    pub id: usize,
    pub index1: String,
    pub index2: String,
    /// Percentage of the lane's PF clusters
    pub fraction_mapped: f32,
    pub cluster_count: u64,
    pub sample_id: String,
    pub project_name: String,
}

/// Demultiplexing totals of one lane.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexLaneSummary {
    pub total_reads: u64,
    pub total_pf_reads: u64,
    /// Percentage of PF clusters assigned to any sample
    pub total_fraction_mapped_reads: f32,
    /// Coefficient of variation of the per-sample fractions
    pub mapped_reads_cv: f32,
    pub min_mapped_reads: f32,
    pub max_mapped_reads: f32,
    counts: Vec<IndexCountSummary>,
}

impl IndexLaneSummary {
    #[must_use]
    pub fn counts(&self) -> &[IndexCountSummary] {
        &self.counts
    }

    /// Number of index/sample pairs.
    #[must_use]
    pub fn size(&self) -> usize {
        self.counts.len()
    }

    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`](crate::errors::InteropError::IndexOutOfBounds)
    /// when `index >= size()`.
    pub fn at(&self, index: usize) -> Result<&IndexCountSummary> {
        checked_at(&self.counts, index, "IndexLaneSummary")
    }

    /// Orders the pairs by id.
    pub fn sort(&mut self) {
        self.counts.sort_by_key(|c| c.id);
    }
}

/// Lane summaries for lanes `1..=lane_count` of the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexFlowcellSummary {
    lanes: Vec<IndexLaneSummary>,
}

impl IndexFlowcellSummary {
    #[must_use]
    pub fn lanes(&self) -> &[IndexLaneSummary] {
        &self.lanes
    }

    /// Number of lanes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.lanes.len()
    }

    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`](crate::errors::InteropError::IndexOutOfBounds)
    /// when `index >= size()`.
    pub fn at(&self, index: usize) -> Result<&IndexLaneSummary> {
        checked_at(&self.lanes, index, "IndexFlowcellSummary")
    }

    /// Orders the pairs of every lane by id.
    pub fn sort(&mut self) {
        for lane in &mut self.lanes {
            lane.sort();
        }
    }
}

fn percent(part: u64, total: u64) -> f32 {
    if total == 0 {
        return f32::NAN;
    }
    (part as f64 / total as f64 * 100.0) as f32
}

fn summarize_lane(run: &RunMetrics, lane: u32) -> IndexLaneSummary {
    let finite_total = |value: fn(&TileMetric) -> f32| -> u64 {
        run.tile()
            .iter()
            .filter(|m| m.lane() == lane)
            .map(value)
            .filter(|v| v.is_finite())
            .map(f64::from)
            .sum::<f64>()
            .round() as u64
    };
    let total_reads = finite_total(|m| m.cluster_count());
    let total_pf_reads = finite_total(|m| m.cluster_count_pf());

    // (index, sample, project) -> (first seen, clusters, first record)
    let mut pairs: BTreeMap<(&str, &str, &str), (usize, u64, &IndexInfo)> = BTreeMap::new();
    for metric in run.index().iter().filter(|m| m.lane() == lane) {
        for info in metric.indices() {
            let next_id = pairs.len() + 1;
            let entry = pairs
                .entry((info.index_seq.as_str(), info.sample_id.as_str(), info.sample_proj.as_str()))
                .or_insert((next_id, 0, info));
            entry.1 += info.cluster_count;
        }
    }

    let counts: Vec<IndexCountSummary> = pairs
        .into_values()
        .map(|(id, cluster_count, info)| IndexCountSummary {
            id,
            index1: info.index1().to_string(),
            index2: info.index2().to_string(),
            fraction_mapped: percent(cluster_count, total_pf_reads),
            cluster_count,
            sample_id: info.sample_id.clone(),
            project_name: info.sample_proj.clone(),
        })
        .collect();

    let fractions = interop_stats::finite(counts.iter().map(|c| c.fraction_mapped));
    let mapped: u64 = counts.iter().map(|c| c.cluster_count).sum();
    IndexLaneSummary {
        total_reads,
        total_pf_reads,
        total_fraction_mapped_reads: percent(mapped, total_pf_reads),
        mapped_reads_cv: interop_stats::coefficient_of_variation(&fractions),
        min_mapped_reads: fractions.iter().copied().reduce(f32::min).unwrap_or(f32::NAN),
        max_mapped_reads: fractions.iter().copied().reduce(f32::max).unwrap_or(f32::NAN),
        counts,
    }
}

/// Summarizes index assignments for every lane of the run.
///
/// Pairs are listed in index-sequence order; [`IndexFlowcellSummary::sort`]
/// restores the order in which they were first seen. Fractions are relative
/// to the lane's PF cluster count from the tile metrics, so they are `NaN`
/// when no tile metrics were loaded.
///
/// # Errors
/// Returns [`InteropError::InvalidRead`](crate::errors::InteropError::InvalidRead)
/// when the run's reads are not numbered `1..=n`.
pub fn summarize_index_metrics(run: &RunMetrics) -> Result<IndexFlowcellSummary> {
    run.run_info().validate_reads()?;
    let lane_count = run.run_info().flowcell().lane_count();
    let lanes = (1..=lane_count).map(|lane| summarize_lane(run, lane)).collect();
    Ok(IndexFlowcellSummary { lanes })
}
