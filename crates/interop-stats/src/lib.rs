#![deny(unsafe_code)]

//! Numeric reductions over per-tile metric values.
//!
//! This crate provides the small set of statistics the summary and plot logic
//! needs:
//! - [`mean`], [`variance`] and [`standard_deviation`] over `f32` samples
//! - [`median`] and [`percentile`] using nearest-rank selection
//! - [`finite`] to drop `NaN`/infinite placeholders before reducing
//! - [`Stat`] bundling mean, standard deviation and median of one sample
//!
//! Accumulation is done in `f64` and results are narrowed back to `f32`, the
//! width every metric value is stored at.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Keeps only the finite values of `values`.
///
/// Missing metric values are represented as `NaN`, so every reduction in the
/// summary code is fed through this first.
///
/// # Example
/// ```
/// use interop_stats::finite;
/// assert_eq!(finite([1.0, f32::NAN, 3.0]), vec![1.0, 3.0]);
/// ```
#[must_use]
pub fn finite<I: IntoIterator<Item = f32>>(values: I) -> Vec<f32> {
    values.into_iter().filter(|v| v.is_finite()).collect()
}

/// Arithmetic mean, or `NaN` when `values` is empty.
///
/// # Example
/// ```
/// use interop_stats::mean;
/// assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < f32::EPSILON);
/// assert!(mean(&[]).is_nan());
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "sample sizes are tile counts")]
#[allow(clippy::cast_possible_truncation, reason = "metric values are stored as f32")]
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return f32::NAN;
    }
    let total: f64 = values.iter().map(|&v| f64::from(v)).sum();
    (total / values.len() as f64) as f32
}

/// Sample variance (n - 1 denominator).
///
/// Returns `NaN` for an empty sample and `0.0` for a single value.
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "sample sizes are tile counts")]
#[allow(clippy::cast_possible_truncation, reason = "metric values are stored as f32")]
pub fn variance(values: &[f32]) -> f32 {
    match values.len() {
        0 => f32::NAN,
        1 => 0.0,
        n => {
            let avg = f64::from(mean(values));
            let squares: f64 = values.iter().map(|&v| (f64::from(v) - avg).powi(2)).sum();
            (squares / (n - 1) as f64) as f32
        }
    }
}

/// Sample standard deviation, see [`variance`].
#[must_use]
pub fn standard_deviation(values: &[f32]) -> f32 {
    variance(values).sqrt()
}

/// Median of `values`, reordering the slice in place.
///
/// For an even number of values the upper of the two middle values is
/// returned; no averaging takes place, so the result is always an observed
/// value.
///
/// # Example
/// ```
/// use interop_stats::median;
/// let mut values = [4.0, 1.0, 3.0, 2.0];
/// assert!((median(&mut values) - 3.0).abs() < f32::EPSILON);
/// ```
#[must_use]
pub fn median(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return f32::NAN;
    }
    let mid = values.len() / 2;
    let (_, value, _) = values.select_nth_unstable_by(mid, f32::total_cmp);
    *value
}

/// Nearest-rank percentile of an ascending `sorted` slice.
///
/// `percent` is clamped to `[0, 100]`; the 0th percentile is the minimum.
///
/// # Example
/// ```
/// use interop_stats::percentile;
/// let sorted = [1.0, 2.0, 3.0, 4.0];
/// assert!((percentile(&sorted, 25.0) - 1.0).abs() < f32::EPSILON);
/// assert!((percentile(&sorted, 75.0) - 3.0).abs() < f32::EPSILON);
/// assert!((percentile(&sorted, 100.0) - 4.0).abs() < f32::EPSILON);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "sample sizes are tile counts")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "rank is within len")]
pub fn percentile(sorted: &[f32], percent: f32) -> f32 {
    if sorted.is_empty() {
        return f32::NAN;
    }
    let percent = f64::from(percent.clamp(0.0, 100.0));
    let rank = (percent * sorted.len() as f64 / 100.0).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

/// Sorts `values` ascending with `NaN` ordered last.
pub fn sort_values(values: &mut [f32]) {
    values.sort_unstable_by(|a, b| match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(b),
    });
}

/// Coefficient of variation (standard deviation over mean), or `NaN` when the
/// mean is zero or the sample is empty.
#[must_use]
pub fn coefficient_of_variation(values: &[f32]) -> f32 {
    let avg = mean(values);
    if avg == 0.0 || avg.is_nan() {
        return f32::NAN;
    }
    standard_deviation(values) / avg
}

/// Mean, standard deviation and median of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    /// Arithmetic mean
    pub mean: f32,
    /// Sample standard deviation
    pub stddev: f32,
    /// Upper median
    pub median: f32,
}

impl Default for Stat {
    fn default() -> Self {
        Self { mean: f32::NAN, stddev: f32::NAN, median: f32::NAN }
    }
}

impl Stat {
    /// Reduces the finite values of `values`; non-finite values are ignored.
    #[must_use]
    pub fn from_values<I: IntoIterator<Item = f32>>(values: I) -> Self {
        let mut kept = finite(values);
        if kept.is_empty() {
            return Self::default();
        }
        let mean = mean(&kept);
        let stddev = standard_deviation(&kept);
        let median = median(&mut kept);
        Self { mean, stddev, median }
    }
}
