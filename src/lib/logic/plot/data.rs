//! Plot-ready containers.
//!
//! Every container exposes positional access returning
//! [`InteropError::IndexOutOfBounds`] past its end.

use serde::{Deserialize, Serialize};

use crate::errors::{InteropError, Result, checked_at};

/// Label and value range of one plot axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub label: String,
    pub min: f32,
    pub max: f32,
}

impl Axis {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), min: 0.0, max: 0.0 }
    }
}

/// Any point that can report its x position and vertical extent.
pub trait PlotPoint {
    fn x(&self) -> f32;

    /// Lowest and highest y value drawn for this point.
    fn y_range(&self) -> (f32, f32);
}

/// One bar of a histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BarPoint {
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

impl BarPoint {
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32) -> Self {
        Self { x, y, width }
    }
}

impl PlotPoint for BarPoint {
    fn x(&self) -> f32 {
        self.x
    }

    fn y_range(&self) -> (f32, f32) {
        (0.0_f32.min(self.y), self.y)
    }
}

/// Box-and-whisker summary of the values at one x position.
///
/// Whiskers follow Tukey: they reach the most extreme values within 1.5
/// interquartile ranges of the box, and values beyond are outliers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleStickPoint {
    pub x: f32,
    pub p25: f32,
    pub p50: f32,
    pub p75: f32,
    pub lower: f32,
    pub upper: f32,
    pub outliers: Vec<f32>,
    /// Number of finite values summarized.
    pub count: usize,
}

impl CandleStickPoint {
    /// Summarizes the finite values; `None` when there are none.
    #[must_use]
    pub fn from_values<I: IntoIterator<Item = f32>>(x: f32, values: I) -> Option<Self> {
        let mut values = interop_stats::finite(values);
        if values.is_empty() {
            return None;
        }
        interop_stats::sort_values(&mut values);
        let p25 = interop_stats::percentile(&values, 25.0);
        let p50 = interop_stats::percentile(&values, 50.0);
        let p75 = interop_stats::percentile(&values, 75.0);
        let fence = 1.5 * (p75 - p25);
        let (low_fence, high_fence) = (p25 - fence, p75 + fence);
        let inside = values.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
        let lower = inside.clone().fold(f32::INFINITY, f32::min);
        let upper = inside.fold(f32::NEG_INFINITY, f32::max);
        let outliers = values.iter().copied().filter(|v| !(low_fence..=high_fence).contains(v)).collect();
        Some(Self { x, p25, p50, p75, lower, upper, outliers, count: values.len() })
    }
}

impl PlotPoint for CandleStickPoint {
    fn x(&self) -> f32 {
        self.x
    }

    fn y_range(&self) -> (f32, f32) {
        let low = self.outliers.iter().copied().fold(self.lower, f32::min);
        let high = self.outliers.iter().copied().fold(self.upper, f32::max);
        (low, high)
    }
}

/// Named sequence of points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series<P> {
    title: String,
    points: Vec<P>,
}

impl<P> Series<P> {
    #[must_use]
    pub fn new(title: impl Into<String>, points: Vec<P>) -> Self {
        Self { title: title.into(), points }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn points(&self) -> &[P] {
        &self.points
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`] when `index >= size()`.
    pub fn at(&self, index: usize) -> Result<&P> {
        checked_at(&self.points, index, "Series")
    }
}

/// A titled plot: axes and one or more series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotData<P> {
    title: String,
    x_axis: Axis,
    y_axis: Axis,
    series: Vec<Series<P>>,
}

impl<P: PlotPoint> PlotData<P> {
    #[must_use]
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self { title: title.into(), x_axis: Axis::new(x_label), y_axis: Axis::new(y_label), series: Vec::new() }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn x_axis(&self) -> &Axis {
        &self.x_axis
    }

    #[must_use]
    pub fn y_axis(&self) -> &Axis {
        &self.y_axis
    }

    #[must_use]
    pub fn series(&self) -> &[Series<P>] {
        &self.series
    }

    /// Number of series.
    #[must_use]
    pub fn size(&self) -> usize {
        self.series.len()
    }

    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`] when `index >= size()`.
    pub fn at(&self, index: usize) -> Result<&Series<P>> {
        checked_at(&self.series, index, "PlotData")
    }

    pub(crate) fn push_series(&mut self, series: Series<P>) {
        self.series.push(series);
    }

    /// Sets both axis ranges to span every point, leaving them at zero when
    /// there are no points.
    pub(crate) fn fit_axes(&mut self) {
        let points = self.series.iter().flat_map(|s| s.points.iter());
        let mut bounds: Option<(f32, f32, f32, f32)> = None;
        for point in points {
            let (low, high) = point.y_range();
            let x = point.x();
            bounds = Some(match bounds {
                None => (x, x, low, high),
                Some((x0, x1, y0, y1)) => (x0.min(x), x1.max(x), y0.min(low), y1.max(high)),
            });
        }
        if let Some((x_min, x_max, y_min, y_max)) = bounds {
            self.x_axis.min = x_min;
            self.x_axis.max = x_max;
            self.y_axis.min = y_min;
            self.y_axis.max = y_max;
        }
    }
}

/// Row-major grid of values, `NaN` where nothing was recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapData {
    title: String,
    x_axis: Axis,
    y_axis: Axis,
    row_count: usize,
    column_count: usize,
    values: Vec<f32>,
}

impl HeatmapData {
    /// Grid of `row_count` by `column_count` missing values.
    #[must_use]
    pub fn new(row_count: usize, column_count: usize) -> Self {
        Self { row_count, column_count, values: vec![f32::NAN; row_count * column_count], ..Self::default() }
    }

    #[must_use]
    pub fn with_labels(
        mut self,
        title: impl Into<String>,
        x_axis: impl Into<String>,
        y_axis: impl Into<String>,
    ) -> Self {
        self.title = title.into();
        self.x_axis = Axis::new(x_axis);
        self.y_axis = Axis::new(y_axis);
        self
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn x_axis(&self) -> &Axis {
        &self.x_axis
    }

    #[must_use]
    pub fn y_axis(&self) -> &Axis {
        &self.y_axis
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    fn offset(&self, row: usize, column: usize) -> Result<usize> {
        if row >= self.row_count || column >= self.column_count {
            return Err(InteropError::IndexOutOfBounds {
                container: "HeatmapData",
                index: format!("({row}, {column})"),
                size: self.values.len(),
            });
        }
        Ok(row * self.column_count + column)
    }

    /// Value at `row`, `column`.
    ///
    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`] outside the grid.
    pub fn at(&self, row: usize, column: usize) -> Result<f32> {
        Ok(self.values[self.offset(row, column)?])
    }

    pub(crate) fn set(&mut self, row: usize, column: usize, value: f32) -> Result<()> {
        let offset = self.offset(row, column)?;
        self.values[offset] = value;
        Ok(())
    }

    /// Largest finite value, `NaN` when there is none.
    #[must_use]
    pub fn max_value(&self) -> f32 {
        self.values.iter().copied().filter(|v| v.is_finite()).reduce(f32::max).unwrap_or(f32::NAN)
    }

    pub(crate) fn scale(&mut self, factor: f32) {
        for value in &mut self.values {
            *value *= factor;
        }
    }
}

/// Lane-by-tile image of one metric over the flowcell.
///
/// Rows are lanes and columns follow
/// [`FlowcellLayout::tile_column`](crate::run::FlowcellLayout::tile_column).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowcellData {
    heatmap: HeatmapData,
    tile_ids: Vec<u32>,
    swath_count: u32,
    tile_count: u32,
}

impl FlowcellData {
    #[must_use]
    pub fn new(lane_count: usize, column_count: usize, swath_count: u32, tile_count: u32) -> Self {
        Self {
            heatmap: HeatmapData::new(lane_count, column_count),
            tile_ids: vec![0; lane_count * column_count],
            swath_count,
            tile_count,
        }
    }

    pub(crate) fn with_labels(mut self, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        self.heatmap = self.heatmap.with_labels(title, subtitle, "Lane");
        self
    }

    #[must_use]
    pub fn heatmap(&self) -> &HeatmapData {
        &self.heatmap
    }

    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.heatmap.row_count()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.heatmap.column_count()
    }

    #[must_use]
    pub fn swath_count(&self) -> u32 {
        self.swath_count
    }

    #[must_use]
    pub fn tile_count(&self) -> u32 {
        self.tile_count
    }

    /// Value at a zero-based lane row and tile column.
    ///
    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`] outside the grid.
    pub fn at(&self, lane_index: usize, column: usize) -> Result<f32> {
        self.heatmap.at(lane_index, column)
    }

    /// Tile number drawn at a cell, 0 when empty.
    ///
    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`] outside the grid.
    pub fn tile_id(&self, lane_index: usize, column: usize) -> Result<u32> {
        let offset = self.heatmap.offset(lane_index, column)?;
        Ok(self.tile_ids[offset])
    }

    pub(crate) fn set(&mut self, lane_index: usize, column: usize, tile: u32, value: f32) -> Result<()> {
        let offset = self.heatmap.offset(lane_index, column)?;
        self.heatmap.values[offset] = value;
        self.tile_ids[offset] = tile;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candlestick_quartiles_and_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 100.0];
        let point = CandleStickPoint::from_values(3.0, values).unwrap();
        assert!((point.p25 - 2.0).abs() < f32::EPSILON);
        assert!((point.p50 - 4.0).abs() < f32::EPSILON);
        assert!((point.p75 - 6.0).abs() < f32::EPSILON);
        assert!((point.lower - 1.0).abs() < f32::EPSILON);
        assert!((point.upper - 7.0).abs() < f32::EPSILON);
        assert_eq!(point.outliers, vec![100.0]);
        assert_eq!(point.count, 8);
        assert_eq!(point.y_range(), (1.0, 100.0));
    }

    #[test]
    fn test_candlestick_ignores_missing_values() {
        assert!(CandleStickPoint::from_values(1.0, [f32::NAN]).is_none());
        let point = CandleStickPoint::from_values(1.0, [f32::NAN, 2.0]).unwrap();
        assert_eq!(point.count, 1);
        assert!(point.outliers.is_empty());
    }

    #[test]
    fn test_empty_containers_are_out_of_bounds() {
        assert!(matches!(HeatmapData::default().at(0, 0), Err(InteropError::IndexOutOfBounds { .. })));
        assert!(matches!(FlowcellData::default().tile_id(0, 0), Err(InteropError::IndexOutOfBounds { .. })));
        assert!(PlotData::<BarPoint>::default().at(0).is_err());
        assert!(Series::<BarPoint>::default().at(0).is_err());
    }

    #[test]
    fn test_heatmap_set_and_get() {
        let mut heatmap = HeatmapData::new(2, 3);
        heatmap.set(1, 2, 5.0).unwrap();
        assert!((heatmap.at(1, 2).unwrap() - 5.0).abs() < f32::EPSILON);
        assert!(heatmap.at(0, 0).unwrap().is_nan());
        assert!(heatmap.at(2, 0).is_err());
        assert!(heatmap.at(0, 3).is_err());
        assert!((heatmap.max_value() - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_fit_axes() {
        let mut plot = PlotData::new("t", "x", "y");
        plot.push_series(Series::new("a", vec![BarPoint::new(1.0, 4.0, 1.0), BarPoint::new(7.0, 2.0, 1.0)]));
        plot.fit_axes();
        assert_eq!((plot.x_axis().min, plot.x_axis().max), (1.0, 7.0));
        assert_eq!((plot.y_axis().min, plot.y_axis().max), (0.0, 4.0));
        assert_eq!(plot.at(0).unwrap().size(), 2);
    }

    #[test]
    fn test_serializes_to_json() {
        let series = Series::new("Lane 1", vec![BarPoint::new(30.0, 12.5, 1.0)]);
        let json = serde_json::to_string(&series).unwrap();
        assert!(json.contains("\"title\":\"Lane 1\""));
        let decoded: Series<BarPoint> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, series);
    }
}
