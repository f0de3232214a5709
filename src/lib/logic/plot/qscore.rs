//! Q-score histogram and per-cycle Q-score heatmap.

use crate::constants::MetricType;
use crate::errors::Result;
use crate::logic::filter::FilterOptions;
use crate::logic::plot::data::{BarPoint, HeatmapData, PlotData, Series};
use crate::metrics::{MetricRecord, QHeader, QMetric};
use crate::run_metrics::RunMetrics;

/// Q metrics on an accepted tile and cycle.
fn accepted_q<'a>(run: &'a RunMetrics, options: &'a FilterOptions) -> impl Iterator<Item = &'a QMetric> + 'a {
    let info = run.run_info();
    run.q().iter().filter(move |m| {
        options.accepts_tile(m.lane(), m.tile(), info.flowcell())
            && options.accepts_cycle(m.cycle())
            && options.accepts_cycle_in_read(m.cycle(), info)
    })
}

fn bin_width(header: &QHeader, index: usize) -> f32 {
    header.bins.get(index).map_or(1.0, |bin| f32::from(bin.upper.saturating_sub(bin.lower)) + 1.0)
}

/// Number of calls at each Q-score, in millions, summed over accepted tiles
/// and cycles.
///
/// An empty plot is returned when no Q histograms were loaded.
///
/// # Errors
/// Returns [`InteropError::InvalidFilterOption`](crate::errors::InteropError::InvalidFilterOption)
/// when `options` do not fit the run.
pub fn plot_qscore_histogram(run: &RunMetrics, options: &FilterOptions) -> Result<PlotData<BarPoint>> {
    options.validate(MetricType::QScore, run.run_info())?;
    let mut plot = PlotData::new("Q Score Distribution", "Q Score", "Total (million)");
    if run.q().is_empty() {
        return Ok(plot);
    }
    let header = run.q().header();
    let mut totals = vec![0_u64; header.bin_count()];
    for metric in accepted_q(run, options) {
        for (total, &count) in totals.iter_mut().zip(metric.histogram()) {
            *total += u64::from(count);
        }
    }
    let points = totals
        .iter()
        .enumerate()
        .map(|(i, &total)| BarPoint::new(header.qscore(i) as f32, (total as f64 / 1e6) as f32, bin_width(header, i)))
        .collect();
    plot.push_series(Series::new("Q Score", points));
    plot.fit_axes();
    Ok(plot)
}

/// Calls per cycle (rows) and Q-score (columns), as a percentage of the
/// largest cell.
///
/// Columns span Q1 up to the highest Q-score the histograms can report, so a
/// binned histogram leaves the columns between bin values empty. A default
/// heatmap is returned when no Q histograms were loaded.
///
/// # Errors
/// Returns [`InteropError::InvalidFilterOption`](crate::errors::InteropError::InvalidFilterOption)
/// when `options` do not fit the run.
pub fn plot_qscore_heatmap(run: &RunMetrics, options: &FilterOptions) -> Result<HeatmapData> {
    options.validate(MetricType::QScore, run.run_info())?;
    if run.q().is_empty() {
        return Ok(HeatmapData::default());
    }
    let header = run.q().header();
    let max_q = (0..header.bin_count()).map(|i| header.qscore(i)).max().unwrap_or(0) as usize;
    let cycles = run.q().max_cycle() as usize;

    let mut counts = vec![0_u64; cycles * max_q];
    for metric in accepted_q(run, options) {
        let Some(row) = (metric.cycle() as usize).checked_sub(1) else { continue };
        for (i, &count) in metric.histogram().iter().enumerate() {
            let q = header.qscore(i) as usize;
            if q > 0 && q <= max_q {
                counts[row * max_q + q - 1] += u64::from(count);
            }
        }
    }

    let mut heatmap = HeatmapData::new(cycles, max_q).with_labels("Q Score Heatmap", "Q Score", "Cycle");
    for (offset, &count) in counts.iter().enumerate() {
        if count > 0 {
            heatmap.set(offset / max_q, offset % max_q, count as f32)?;
        }
    }
    let max = heatmap.max_value();
    if max > 0.0 {
        heatmap.scale(100.0 / max);
    }
    Ok(heatmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TileNamingMethod;
    use crate::errors::InteropError;
    use crate::metrics::{MetricSet, QScoreBin};
    use crate::run::{FlowcellLayout, ReadInfo, RunInfo};

    fn binned_run() -> RunMetrics {
        let info = RunInfo::new(FlowcellLayout::new(1, 2, 1, 2).with_naming_method(TileNamingMethod::FourDigit))
            .with_reads(vec![ReadInfo::new(1, 1, 2, false)])
            .with_channels(vec!["Red".to_string(), "Green".to_string()]);
        let mut run = RunMetrics::new(info);
        let header = QHeader {
            bins: vec![QScoreBin::new(1, 19, 14), QScoreBin::new(20, 29, 25), QScoreBin::new(30, 40, 37)],
        };
        let mut q = MetricSet::with_header(6, header);
        q.insert(QMetric::new(1, 1101, 1, vec![1_000_000, 2_000_000, 0]));
        q.insert(QMetric::new(1, 2101, 1, vec![0, 0, 4_000_000]));
        q.insert(QMetric::new(1, 1101, 2, vec![0, 1_000_000, 1_000_000]));
        *run.q_mut() = q;
        run
    }

    #[test]
    fn test_histogram_sums_bins() {
        let run = binned_run();
        let plot = plot_qscore_histogram(&run, &FilterOptions::for_run(run.run_info())).unwrap();
        let bars = plot.at(0).unwrap().points();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0], BarPoint::new(14.0, 1.0, 19.0));
        assert_eq!(bars[1], BarPoint::new(25.0, 3.0, 10.0));
        assert_eq!(bars[2], BarPoint::new(37.0, 5.0, 11.0));
        assert!((plot.y_axis().max - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_histogram_filters() {
        let run = binned_run();
        let options = FilterOptions::for_run(run.run_info()).with_surface(Some(1)).with_cycle(Some(2));
        let plot = plot_qscore_histogram(&run, &options).unwrap();
        let totals: Vec<f32> = plot.at(0).unwrap().points().iter().map(|b| b.y).collect();
        assert_eq!(totals, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_heatmap_scaled_to_largest_cell() {
        let run = binned_run();
        let heatmap = plot_qscore_heatmap(&run, &FilterOptions::for_run(run.run_info())).unwrap();
        assert_eq!(heatmap.row_count(), 2);
        assert_eq!(heatmap.column_count(), 37);
        assert!((heatmap.at(0, 36).unwrap() - 100.0).abs() < 1e-4);
        assert!((heatmap.at(0, 13).unwrap() - 25.0).abs() < 1e-4);
        assert!((heatmap.at(1, 24).unwrap() - 25.0).abs() < 1e-4);
        assert!(heatmap.at(0, 0).unwrap().is_nan());
        assert!(heatmap.at(2, 0).is_err());
    }

    #[test]
    fn test_without_histograms() {
        let info = RunInfo::new(FlowcellLayout::new(1, 1, 1, 1).with_naming_method(TileNamingMethod::FourDigit));
        let run = RunMetrics::new(info);
        let options = FilterOptions::for_run(run.run_info());
        assert_eq!(plot_qscore_histogram(&run, &options).unwrap().size(), 0);
        let heatmap = plot_qscore_heatmap(&run, &options).unwrap();
        assert!(heatmap.is_empty());
        assert!(matches!(heatmap.at(0, 0), Err(InteropError::IndexOutOfBounds { .. })));
    }
}
