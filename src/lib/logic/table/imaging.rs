//! The imaging table: one row per lane, tile and cycle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::DnaBase;
use crate::errors::{InteropError, Result, checked_at};
use crate::logic::plot::samples::collapsed_q;
use crate::logic::table::columns::{ImagingColumn, ImagingColumnId, create_imaging_table_columns};
use crate::metrics::{
    CorrectedIntensityMetric, ErrorMetric, ExtractionMetric, MetricKey, MetricRecord, QCollapsedMetric, TileMetric,
};
use crate::run_metrics::RunMetrics;

/// Rows of metric values laid out by a set of [`ImagingColumn`]s.
///
/// Values are stored row-major; missing values are `NaN`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagingTable {
    columns: Vec<ImagingColumn>,
    row_count: usize,
    row_width: usize,
    data: Vec<f32>,
}

impl ImagingTable {
    #[must_use]
    pub fn columns(&self) -> &[ImagingColumn] {
        &self.columns
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of values in a row, counting every channel and base.
    #[must_use]
    pub fn row_width(&self) -> usize {
        self.row_width
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// The column holding `id`, if it was filled.
    #[must_use]
    pub fn column(&self, id: ImagingColumnId) -> Option<&ImagingColumn> {
        self.columns.iter().find(|c| c.id() == id)
    }

    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`] when `index >= column_count()`.
    pub fn column_at(&self, index: usize) -> Result<&ImagingColumn> {
        checked_at(&self.columns, index, "ImagingTable")
    }

    /// All values of one row.
    ///
    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`] when `row >= row_count()`.
    pub fn row(&self, row: usize) -> Result<&[f32]> {
        if row >= self.row_count {
            return Err(InteropError::out_of_bounds("ImagingTable", row, self.row_count));
        }
        let start = row * self.row_width;
        Ok(&self.data[start..start + self.row_width])
    }

    /// Values of column `id` in `row`: one value, or one per channel or base.
    ///
    /// # Errors
    /// Returns [`InteropError::IndexOutOfBounds`] when `row >= row_count()` or
    /// when the table has no `id` column.
    pub fn at(&self, row: usize, id: ImagingColumnId) -> Result<&[f32]> {
        let values = self.row(row)?;
        let column = self.column(id).ok_or_else(|| InteropError::IndexOutOfBounds {
            container: "ImagingTable",
            index: id.name().to_string(),
            size: self.columns.len(),
        })?;
        Ok(&values[column.offset()..column.offset() + column.size()])
    }
}

/// Records sharing one lane, tile and cycle.
#[derive(Default)]
struct RowSources<'a> {
    extraction: Option<&'a ExtractionMetric>,
    corrected: Option<&'a CorrectedIntensityMetric>,
    error: Option<&'a ErrorMetric>,
    q: Option<&'a QCollapsedMetric>,
}

fn nan_or<T>(value: Option<T>, f: impl FnOnce(T) -> f32) -> f32 {
    value.map_or(f32::NAN, f)
}

/// Writes the values of one row into `row`, laid out by `columns`.
fn fill_row(
    row: &mut [f32],
    columns: &[ImagingColumn],
    run: &RunMetrics,
    key: &MetricKey,
    sources: &RowSources<'_>,
    tile: Option<&TileMetric>,
) {
    let info = run.run_info();
    let read = info.read_for_cycle(key.cycle);
    let read_number = read.map_or(0, |r| r.number());
    let position = info.flowcell().tile_position(key.tile);
    for column in columns {
        let values = &mut row[column.offset()..column.offset() + column.size()];
        match column.id() {
            ImagingColumnId::Lane => values[0] = key.lane as f32,
            ImagingColumnId::Tile => values[0] = key.tile as f32,
            ImagingColumnId::Cycle => values[0] = key.cycle as f32,
            ImagingColumnId::Read => values[0] = nan_or(read, |r| r.number() as f32),
            ImagingColumnId::CycleWithinRead => {
                values[0] = nan_or(read, |r| (key.cycle - r.first_cycle() + 1) as f32);
            }
            ImagingColumnId::DensityKPermm2 => values[0] = nan_or(tile, |t| t.cluster_density() / 1000.0),
            ImagingColumnId::DensityPfKPermm2 => values[0] = nan_or(tile, |t| t.cluster_density_pf() / 1000.0),
            ImagingColumnId::ClusterCountK => values[0] = nan_or(tile, |t| t.cluster_count() / 1000.0),
            ImagingColumnId::ClusterCountPfK => values[0] = nan_or(tile, |t| t.cluster_count_pf() / 1000.0),
            ImagingColumnId::PercentPassFilter => values[0] = nan_or(tile, TileMetric::percent_pf),
            ImagingColumnId::PercentAligned => values[0] = nan_or(tile, |t| t.percent_aligned(read_number)),
            ImagingColumnId::PercentPhasing => values[0] = nan_or(tile, |t| t.percent_phasing(read_number)),
            ImagingColumnId::PercentPrephasing => values[0] = nan_or(tile, |t| t.percent_prephasing(read_number)),
            ImagingColumnId::ErrorRate => values[0] = nan_or(sources.error, ErrorMetric::error_rate),
            ImagingColumnId::PercentGreaterThanQ20 => {
                values[0] = nan_or(sources.q, QCollapsedMetric::percent_over_q20);
            }
            ImagingColumnId::PercentGreaterThanQ30 => {
                values[0] = nan_or(sources.q, QCollapsedMetric::percent_over_q30);
            }
            ImagingColumnId::P90 => {
                for (channel, value) in values.iter_mut().enumerate() {
                    *value = nan_or(sources.extraction.and_then(|m| m.max_intensities().get(channel)), |&v| {
                        f32::from(v)
                    });
                }
            }
            ImagingColumnId::Fwhm => {
                for (channel, value) in values.iter_mut().enumerate() {
                    *value = nan_or(sources.extraction.and_then(|m| m.focus_scores().get(channel)), |&v| v);
                }
            }
            ImagingColumnId::PercentNoCalls => {
                values[0] = nan_or(sources.corrected, CorrectedIntensityMetric::percent_no_call);
            }
            ImagingColumnId::PercentBase => {
                for (base, value) in DnaBase::ALL.into_iter().zip(values.iter_mut()) {
                    *value = nan_or(sources.corrected, |m| m.percent_base(base));
                }
            }
            ImagingColumnId::Corrected => {
                for (base, value) in DnaBase::ALL.into_iter().zip(values.iter_mut()) {
                    *value = nan_or(sources.corrected, |m| m.corrected_intensity(base));
                }
            }
            ImagingColumnId::Called => {
                for (base, value) in DnaBase::ALL.into_iter().zip(values.iter_mut()) {
                    *value = nan_or(sources.corrected, |m| m.called_intensity(base));
                }
            }
            ImagingColumnId::SignalToNoise => {
                values[0] = nan_or(sources.corrected, CorrectedIntensityMetric::signal_to_noise);
            }
            ImagingColumnId::Surface => values[0] = nan_or(position, |p| p.surface as f32),
            ImagingColumnId::Swath => values[0] = nan_or(position, |p| p.swath as f32),
            ImagingColumnId::TileNumber => values[0] = nan_or(position, |p| p.number as f32),
        }
    }
}

/// Builds the imaging table of a run.
///
/// There is one row per lane, tile and cycle with any per-cycle record, in
/// ascending order. Only columns holding at least one value are kept. A run
/// without per-cycle records gives an empty table.
///
/// # Errors
/// Returns [`InteropError::InvalidColumnType`] when the run has per-cycle
/// records but no image channel names.
pub fn populate_imaging_table(run: &RunMetrics) -> Result<ImagingTable> {
    let collapsed = collapsed_q(run);
    let mut rows: BTreeMap<MetricKey, RowSources<'_>> = BTreeMap::new();
    for m in run.extraction() {
        rows.entry(m.key()).or_default().extraction = Some(m);
    }
    for m in run.corrected_intensity() {
        rows.entry(m.key()).or_default().corrected = Some(m);
    }
    for m in run.error() {
        rows.entry(m.key()).or_default().error = Some(m);
    }
    for m in collapsed.iter() {
        rows.entry(m.key()).or_default().q = Some(m);
    }
    if rows.is_empty() {
        return Ok(ImagingTable::default());
    }

    let channels = run.run_info().channels();
    let all_columns = create_imaging_table_columns(channels, &[true; ImagingColumnId::COUNT])?;
    let full_width: usize = all_columns.iter().map(ImagingColumn::size).sum();
    let mut full = vec![f32::NAN; rows.len() * full_width];
    for ((key, sources), row) in rows.iter().zip(full.chunks_exact_mut(full_width)) {
        let tile = run.tile().get(&MetricKey::tile(key.lane, key.tile));
        fill_row(row, &all_columns, run, key, sources, tile);
    }

    let has_value = |c: &ImagingColumn| {
        full.chunks_exact(full_width).any(|row| row[c.offset()..c.offset() + c.size()].iter().any(|v| !v.is_nan()))
    };
    let filled: Vec<bool> = all_columns.iter().map(has_value).collect();
    let columns = create_imaging_table_columns(channels, &filled)?;
    let row_width: usize = columns.iter().map(ImagingColumn::size).sum();
    let mut data = Vec::with_capacity(rows.len() * row_width);
    for row in full.chunks_exact(full_width) {
        for column in &columns {
            let source = &all_columns[column.id().index()];
            data.extend_from_slice(&row[source.offset()..source.offset() + source.size()]);
        }
    }
    log::debug!("Imaging table: {} rows, {} of {} columns filled", rows.len(), columns.len(), all_columns.len());
    Ok(ImagingTable { columns, row_count: rows.len(), row_width, data })
}
