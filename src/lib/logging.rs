//! Formatting helpers and human-readable digests of run summaries.
//!
//! The library never installs a logger; everything here writes through the
//! `log` facade so callers choose the backend.

use std::time::Duration;

use crate::logic::summary::{IndexFlowcellSummary, RunSummary};

/// Formats a count with comma thousands separators.
///
/// # Examples
///
/// ```
/// use interop_lib::logging::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a percentage with specified decimal places.
///
/// # Arguments
///
/// * `value` - The percentage (0.0-100.0) to format
/// * `decimals` - Number of decimal places to include
///
/// # Returns
///
/// A string formatted as "XX.XX%", or "NA" for a missing (`NaN`) value
///
/// # Examples
///
/// ```
/// use interop_lib::logging::format_percent;
///
/// assert_eq!(format_percent(95.43, 2), "95.43%");
/// assert_eq!(format_percent(f64::NAN, 2), "NA");
/// ```
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "NA".to_string();
    }
    format!("{value:.decimals$}%")
}

/// Formats a duration in human-readable form.
///
/// # Arguments
///
/// * `duration` - The duration to format
///
/// # Returns
///
/// A human-readable string (e.g., "2m 15s", "1h 30m", "45s")
///
/// # Examples
///
/// ```
/// use interop_lib::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_secs(45)), "45s");
/// assert_eq!(format_duration(Duration::from_secs(135)), "2m 15s");
/// assert_eq!(format_duration(Duration::from_secs(5400)), "1h 30m");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        if remaining_secs == 0 { format!("{mins}m") } else { format!("{mins}m {remaining_secs}s") }
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

fn format_value(value: f32, decimals: usize) -> String {
    if value.is_nan() { "NA".to_string() } else { format!("{value:.decimals$}") }
}

/// Logs a per-read, per-lane digest of a run summary.
///
/// # Examples
///
/// ```no_run
/// use interop_lib::logging::log_run_summary;
/// use interop_lib::logic::summarize_run_metrics;
/// use interop_lib::run_metrics::RunMetrics;
///
/// let run = RunMetrics::default();
/// log_run_summary(&summarize_run_metrics(&run).unwrap());
/// ```
pub fn log_run_summary(summary: &RunSummary) {
    log::info!("Run Summary:");
    log::info!("  Yield: {} Gbp", format_value(summary.totals.yield_g, 2));
    log::info!("  % >=Q30: {}", format_percent(f64::from(summary.totals.percent_gt_q30), 2));
    log::info!("  Error rate: {}", format_value(summary.totals.error_rate, 3));
    log::info!("  % >=Q30 (non-index reads): {}", format_percent(f64::from(summary.nonindex_totals.percent_gt_q30), 2));

    for read in summary.reads() {
        let kind = if read.read.is_index() { " (I)" } else { "" };
        log::info!("  Read {}{kind}:", read.read.number());
        for lane in read.lanes() {
            let stats = &lane.stats;
            log::info!(
                "    Lane {}: {} tiles, density {} k/mm2, {} PF, {} >=Q30, error {}, yield {} Gbp",
                lane.lane,
                format_count(stats.tile_count as u64),
                format_value(stats.density.mean / 1000.0, 1),
                format_percent(f64::from(stats.percent_pf.mean), 2),
                format_percent(f64::from(stats.percent_gt_q30), 2),
                format_value(stats.error_rate.mean, 3),
                format_value(stats.yield_g, 2),
            );
        }
    }
}

/// Logs the demultiplexing digest of every lane.
pub fn log_index_summary(summary: &IndexFlowcellSummary) {
    log::info!("Index Summary:");
    for (lane_index, lane) in summary.lanes().iter().enumerate() {
        log::info!(
            "  Lane {}: {} reads, {} PF, {} identified (CV {}, min {}, max {})",
            lane_index + 1,
            format_count(lane.total_reads),
            format_count(lane.total_pf_reads),
            format_percent(f64::from(lane.total_fraction_mapped_reads), 2),
            format_value(lane.mapped_reads_cv, 4),
            format_percent(f64::from(lane.min_mapped_reads), 2),
            format_percent(f64::from(lane.max_mapped_reads), 2),
        );
        for count in lane.counts() {
            log::info!(
                "    {} {} {}+{}: {} ({})",
                count.id,
                count.sample_id,
                count.index1,
                count.index2,
                format_count(count.cluster_count),
                format_percent(f64::from(count.fraction_mapped), 4),
            );
        }
    }
}
