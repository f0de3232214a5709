//! Per-record values of a metric type, after lane/surface/read filtering.

use std::borrow::Cow;

use crate::constants::{DnaBase, MetricGroup, MetricType};
use crate::logic::filter::FilterOptions;
use crate::logic::q_metric::{accumulate_by_cycle, collapse_q_metrics};
use crate::metrics::{MetricRecord, MetricSet, QCollapsedMetric};
use crate::run_metrics::RunMetrics;

/// One value of a metric type at a lane/tile and, for per-cycle types, a cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Sample {
    pub lane: u32,
    pub tile: u32,
    pub cycle: u32,
    pub value: f32,
}

/// The single channel, base and read a value is taken for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Selection {
    pub channel: usize,
    pub base: DnaBase,
    pub read: u32,
}

impl Selection {
    pub fn from_options(options: &FilterOptions) -> Self {
        Self {
            channel: options.channel().unwrap_or(0),
            base: options.base().unwrap_or(DnaBase::A),
            read: options.read().unwrap_or(1),
        }
    }
}

/// Whether `run` holds the records `metric_type` is computed from.
pub(crate) fn has_data(run: &RunMetrics, metric_type: MetricType) -> bool {
    match metric_type.group() {
        MetricGroup::Q | MetricGroup::QCollapsed => !run.q().is_empty() || !run.q_collapsed().is_empty(),
        group => run.group_size(group) > 0,
    }
}

/// Collapsed Q-scores, computed on the fly when only histograms are loaded.
pub(crate) fn collapsed_q(run: &RunMetrics) -> Cow<'_, MetricSet<QCollapsedMetric>> {
    if run.q_collapsed().is_empty() && !run.q().is_empty() {
        Cow::Owned(collapse_q_metrics(run.q()))
    } else {
        Cow::Borrowed(run.q_collapsed())
    }
}

struct Collector<'a> {
    run: &'a RunMetrics,
    options: &'a FilterOptions,
    samples: Vec<Sample>,
}

impl Collector<'_> {
    fn collect<T: MetricRecord>(&mut self, set: &MetricSet<T>, value: impl Fn(&T) -> Option<f32>) {
        let info = self.run.run_info();
        for record in set {
            let (lane, tile, cycle) = (record.lane(), record.tile(), record.cycle());
            if !self.options.accepts_tile(lane, tile, info.flowcell()) {
                continue;
            }
            if cycle > 0 && !self.options.accepts_cycle_in_read(cycle, info) {
                continue;
            }
            if let Some(value) = value(record).filter(|v| !v.is_nan()) {
                self.samples.push(Sample { lane, tile, cycle, value });
            }
        }
    }
}

/// Values of `metric_type` for every record admitted by `options`.
///
/// Missing (`NaN`) values are left out. Cycle selection is left to the caller.
pub(crate) fn metric_samples(
    run: &RunMetrics,
    metric_type: MetricType,
    selection: Selection,
    options: &FilterOptions,
) -> Vec<Sample> {
    let mut collector = Collector { run, options, samples: Vec::new() };
    let Selection { channel, base, read } = selection;
    match metric_type {
        MetricType::Intensity => collector
            .collect(run.extraction(), |m| m.max_intensities().get(channel).map(|&v| f32::from(v))),
        MetricType::FWHM => collector.collect(run.extraction(), |m| m.focus_scores().get(channel).copied()),
        MetricType::BasePercent => collector.collect(run.corrected_intensity(), |m| Some(m.percent_base(base))),
        MetricType::PercentNoCall => collector.collect(run.corrected_intensity(), |m| Some(m.percent_no_call())),
        MetricType::CorrectedIntensity => {
            collector.collect(run.corrected_intensity(), |m| Some(m.corrected_intensity(base)));
        }
        MetricType::CalledIntensity => {
            collector.collect(run.corrected_intensity(), |m| Some(m.called_intensity(base)));
        }
        MetricType::SignalToNoise => collector.collect(run.corrected_intensity(), |m| Some(m.signal_to_noise())),
        MetricType::Q20Percent => collector.collect(&*collapsed_q(run), |m| Some(m.percent_over_q20())),
        MetricType::Q30Percent => collector.collect(&*collapsed_q(run), |m| Some(m.percent_over_q30())),
        MetricType::QScore => collector.collect(&*collapsed_q(run), |m| Some(m.median_qscore() as f32)),
        MetricType::AccumPercentQ20 | MetricType::AccumPercentQ30 => {
            let collapsed = collapsed_q(run);
            let accumulated = accumulate_by_cycle(&collapsed);
            let q30 = metric_type == MetricType::AccumPercentQ30;
            collector.collect(&*collapsed, |m| {
                accumulated.get(&m.key()).map(|a| if q30 { a.percent_over_q30() } else { a.percent_over_q20() })
            });
        }
        MetricType::ErrorRate => collector.collect(run.error(), |m| Some(m.error_rate())),
        MetricType::Clusters => collector.collect(run.tile(), |m| Some(m.cluster_density())),
        MetricType::ClustersPF => collector.collect(run.tile(), |m| Some(m.cluster_density_pf())),
        MetricType::ClusterCount => collector.collect(run.tile(), |m| Some(m.cluster_count())),
        MetricType::ClusterCountPF => collector.collect(run.tile(), |m| Some(m.cluster_count_pf())),
        MetricType::PercentPhasing => collector.collect(run.tile(), |m| Some(m.percent_phasing(read))),
        MetricType::PercentPrephasing => collector.collect(run.tile(), |m| Some(m.percent_prephasing(read))),
        MetricType::PercentAligned => collector.collect(run.tile(), |m| Some(m.percent_aligned(read))),
    }
    collector.samples
}
