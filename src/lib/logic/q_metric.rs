//! Q-score reductions shared by run finalization, plots and summaries.

use ahash::AHashMap;

use crate::io::MetricFormat;
use crate::metrics::{MetricKey, MetricRecord, MetricSet, QCollapsedMetric, QHeader, QMetric};

fn saturate(count: u64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Collapses one histogram into Q20/Q30/total/median counts.
#[must_use]
pub fn collapse_q_metric(metric: &QMetric, header: &QHeader) -> QCollapsedMetric {
    QCollapsedMetric::new(
        metric.lane(),
        metric.tile(),
        metric.cycle(),
        saturate(metric.total_over(20, header)),
        saturate(metric.total_over(30, header)),
        saturate(metric.total()),
        metric.median(header),
    )
}

/// Collapses every histogram of `q`, honouring its Q-score bins.
///
/// Records keep the order of `q`.
#[must_use]
pub fn collapse_q_metrics(q: &MetricSet<QMetric>) -> MetricSet<QCollapsedMetric> {
    let mut collapsed: MetricSet<QCollapsedMetric> =
        q.iter().map(|metric| collapse_q_metric(metric, q.header())).collect();
    collapsed.set_version(QCollapsedMetric::LATEST_VERSION);
    collapsed
}

/// Calls at or above Q20 and Q30 summed over a range of cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccumulatedQ {
    pub q20: u64,
    pub q30: u64,
    pub total: u64,
}

impl AccumulatedQ {
    fn add(&mut self, metric: &QCollapsedMetric) {
        self.q20 += u64::from(metric.q20());
        self.q30 += u64::from(metric.q30());
        self.total += u64::from(metric.total());
    }

    #[must_use]
    pub fn percent_over_q20(&self) -> f32 {
        percent(self.q20, self.total)
    }

    #[must_use]
    pub fn percent_over_q30(&self) -> f32 {
        percent(self.q30, self.total)
    }
}

fn percent(part: u64, total: u64) -> f32 {
    if total == 0 { f32::NAN } else { (part as f64 / total as f64 * 100.0) as f32 }
}

/// Running Q20/Q30 totals of each tile up to and including each cycle.
///
/// The result is keyed like the input records, so the accumulated value for
/// lane 1 tile 1101 cycle 5 covers cycles 1 to 5 of that tile.
#[must_use]
pub fn accumulate_by_cycle(collapsed: &MetricSet<QCollapsedMetric>) -> AHashMap<MetricKey, AccumulatedQ> {
    let mut ordered: Vec<&QCollapsedMetric> = collapsed.iter().collect();
    ordered.sort_by_key(|m| m.key());

    let mut accumulated = AHashMap::with_capacity(ordered.len());
    let mut running = AccumulatedQ::default();
    let mut current_tile = None;
    for metric in ordered {
        let tile = (metric.lane(), metric.tile());
        if current_tile != Some(tile) {
            current_tile = Some(tile);
            running = AccumulatedQ::default();
        }
        running.add(metric);
        accumulated.insert(metric.key(), running);
    }
    accumulated
}

/// Sums the collapsed records of cycles in `first..=last`.
#[must_use]
pub fn sum_cycles<'a, I>(records: I, first: u32, last: u32) -> AccumulatedQ
where
    I: IntoIterator<Item = &'a QCollapsedMetric>,
{
    let mut sum = AccumulatedQ::default();
    for metric in records.into_iter().filter(|m| (first..=last).contains(&m.cycle())) {
        sum.add(metric);
    }
    sum
}
