//! Candlestick plots of per-cycle metrics, and of per-tile metrics by lane.

use std::collections::BTreeMap;

use crate::constants::{DnaBase, MetricType};
use crate::errors::{InteropError, Result};
use crate::logic::filter::FilterOptions;
use crate::logic::plot::data::{CandleStickPoint, PlotData, Series};
use crate::logic::plot::samples::{Sample, Selection, metric_samples};
use crate::run_metrics::RunMetrics;

/// One series per channel or base when none is selected, else a single series.
fn series_selections(run: &RunMetrics, metric_type: MetricType, options: &FilterOptions) -> Vec<(String, Selection)> {
    let selection = Selection::from_options(options);
    if metric_type.is_channel_metric() && options.channel().is_none() {
        return run
            .run_info()
            .channels()
            .iter()
            .enumerate()
            .map(|(channel, name)| (name.clone(), Selection { channel, ..selection }))
            .collect();
    }
    if metric_type.is_base_metric() && options.base().is_none() {
        return DnaBase::ALL.iter().map(|&base| (base.to_string(), Selection { base, ..selection })).collect();
    }
    let title = if metric_type.is_channel_metric() {
        run.run_info().channels().get(selection.channel).cloned().unwrap_or_default()
    } else if metric_type.is_base_metric() {
        selection.base.to_string()
    } else {
        metric_type.description().to_string()
    };
    vec![(title, selection)]
}

fn candlesticks<F: Fn(&Sample) -> u32>(samples: Vec<Sample>, group_by: F) -> Vec<CandleStickPoint> {
    let mut groups: BTreeMap<u32, Vec<f32>> = BTreeMap::new();
    for sample in &samples {
        groups.entry(group_by(sample)).or_default().push(sample.value);
    }
    groups.into_iter().filter_map(|(x, values)| CandleStickPoint::from_values(x as f32, values)).collect()
}

/// Distribution over tiles of a per-cycle metric at each cycle.
///
/// Channel metrics with no channel selected get one series per channel, and
/// base metrics with no base selected one series per base.
///
/// # Errors
/// - [`InteropError::InvalidParameter`] when `metric_type` does not vary by cycle
/// - [`InteropError::InvalidFilterOption`] when `options` do not fit the run
pub fn plot_by_cycle(
    run: &RunMetrics,
    metric_type: MetricType,
    options: &FilterOptions,
) -> Result<PlotData<CandleStickPoint>> {
    if !metric_type.is_cycle_metric() {
        return Err(InteropError::InvalidParameter {
            parameter: "metric_type".to_string(),
            reason: format!("{metric_type} does not vary by cycle"),
        });
    }
    options.validate(metric_type, run.run_info())?;
    let mut plot = PlotData::new(metric_type.description(), "Cycle", metric_type.description());
    for (title, selection) in series_selections(run, metric_type, options) {
        let samples = metric_samples(run, metric_type, selection, options);
        plot.push_series(Series::new(title, candlesticks(samples, |s| s.cycle)));
    }
    plot.fit_axes();
    Ok(plot)
}

/// Distribution over tiles of a per-tile or per-read metric in each lane.
///
/// # Errors
/// - [`InteropError::InvalidParameter`] when `metric_type` varies by cycle
/// - [`InteropError::InvalidFilterOption`] when `options` do not fit the run
pub fn plot_by_lane(
    run: &RunMetrics,
    metric_type: MetricType,
    options: &FilterOptions,
) -> Result<PlotData<CandleStickPoint>> {
    if metric_type.is_cycle_metric() {
        return Err(InteropError::InvalidParameter {
            parameter: "metric_type".to_string(),
            reason: format!("{metric_type} varies by cycle; plot it by cycle"),
        });
    }
    options.validate(metric_type, run.run_info())?;
    let mut plot = PlotData::new(metric_type.description(), "Lane", metric_type.description());
    let samples = metric_samples(run, metric_type, Selection::from_options(options), options);
    plot.push_series(Series::new(metric_type.description(), candlesticks(samples, |s| s.lane)));
    plot.fit_axes();
    Ok(plot)
}
