//! Imaging table column schema.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::DnaBase;
use crate::errors::{InteropError, Result};

/// What a column holds and how many values it spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    /// Identifier of the row
    Id,
    /// One value
    Value,
    /// One value per image channel
    Channel,
    /// One value per base
    Base,
}

/// Every column the imaging table can hold, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImagingColumnId {
    Lane,
    Tile,
    Cycle,
    Read,
    CycleWithinRead,
    DensityKPermm2,
    DensityPfKPermm2,
    ClusterCountK,
    ClusterCountPfK,
    PercentPassFilter,
    PercentAligned,
    PercentPhasing,
    PercentPrephasing,
    ErrorRate,
    PercentGreaterThanQ20,
    PercentGreaterThanQ30,
    P90,
    PercentNoCalls,
    PercentBase,
    Fwhm,
    Corrected,
    Called,
    SignalToNoise,
    Surface,
    Swath,
    TileNumber,
}

impl ImagingColumnId {
    pub const ALL: [ImagingColumnId; 26] = [
        Self::Lane,
        Self::Tile,
        Self::Cycle,
        Self::Read,
        Self::CycleWithinRead,
        Self::DensityKPermm2,
        Self::DensityPfKPermm2,
        Self::ClusterCountK,
        Self::ClusterCountPfK,
        Self::PercentPassFilter,
        Self::PercentAligned,
        Self::PercentPhasing,
        Self::PercentPrephasing,
        Self::ErrorRate,
        Self::PercentGreaterThanQ20,
        Self::PercentGreaterThanQ30,
        Self::P90,
        Self::PercentNoCalls,
        Self::PercentBase,
        Self::Fwhm,
        Self::Corrected,
        Self::Called,
        Self::SignalToNoise,
        Self::Surface,
        Self::Swath,
        Self::TileNumber,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position of the column in [`ImagingColumnId::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header text.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Lane => "Lane",
            Self::Tile => "Tile",
            Self::Cycle => "Cycle",
            Self::Read => "Read",
            Self::CycleWithinRead => "Cycle Within Read",
            Self::DensityKPermm2 => "Density(k/mm2)",
            Self::DensityPfKPermm2 => "Density Pf(k/mm2)",
            Self::ClusterCountK => "Cluster Count (k)",
            Self::ClusterCountPfK => "Cluster Count Pf (k)",
            Self::PercentPassFilter => "% Pass Filter",
            Self::PercentAligned => "% Aligned",
            Self::PercentPhasing => "Legacy Phasing Rate",
            Self::PercentPrephasing => "Legacy Prephasing Rate",
            Self::ErrorRate => "Error Rate",
            Self::PercentGreaterThanQ20 => "%>= Q20",
            Self::PercentGreaterThanQ30 => "%>= Q30",
            Self::P90 => "P90",
            Self::PercentNoCalls => "% No Calls",
            Self::PercentBase => "% Base",
            Self::Fwhm => "Fwhm",
            Self::Corrected => "Corrected",
            Self::Called => "Called",
            Self::SignalToNoise => "Signal To Noise",
            Self::Surface => "Surface",
            Self::Swath => "Swath",
            Self::TileNumber => "Tile Number",
        }
    }

    fn kind(self) -> ColumnKind {
        match self {
            Self::Lane | Self::Tile | Self::Cycle | Self::Read | Self::CycleWithinRead => ColumnKind::Id,
            Self::P90 | Self::Fwhm => ColumnKind::Channel,
            Self::PercentBase | Self::Corrected | Self::Called => ColumnKind::Base,
            _ => ColumnKind::Value,
        }
    }

    /// Whether the column spans one value per image channel.
    #[must_use]
    pub fn is_channel_column(self) -> bool {
        self.kind() == ColumnKind::Channel
    }

    /// Whether the column spans one value per base.
    #[must_use]
    pub fn is_base_column(self) -> bool {
        self.kind() == ColumnKind::Base
    }

    /// Whether the column identifies the row rather than holding a metric.
    #[must_use]
    pub fn is_id_column(self) -> bool {
        self.kind() == ColumnKind::Id
    }
}

impl fmt::Display for ImagingColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One column of an imaging table and where its values sit in a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagingColumn {
    id: ImagingColumnId,
    subcolumns: Vec<String>,
    offset: usize,
}

impl ImagingColumn {
    #[must_use]
    pub fn id(&self) -> ImagingColumnId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    /// Channel or base names, empty for single-value columns.
    #[must_use]
    pub fn subcolumns(&self) -> &[String] {
        &self.subcolumns
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.subcolumns.is_empty()
    }

    /// Offset of the first value in a row.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of values the column spans.
    #[must_use]
    pub fn size(&self) -> usize {
        self.subcolumns.len().max(1)
    }

    /// Header text of each value, e.g. `"P90_Red"`.
    #[must_use]
    pub fn full_names(&self) -> Vec<String> {
        if self.subcolumns.is_empty() {
            return vec![self.name().to_string()];
        }
        self.subcolumns.iter().map(|sub| format!("{}_{sub}", self.name())).collect()
    }
}

/// Lays out the filled columns of an imaging table.
///
/// `filled` has one flag per [`ImagingColumnId`], in table order. Channel
/// columns expand to one value per entry of `channels` and base columns to
/// one value per base.
///
/// # Errors
/// Returns [`InteropError::InvalidColumnType`] when `filled` does not have
/// one flag per column, when no column is filled, or when a channel column is
/// filled but `channels` is empty.
pub fn create_imaging_table_columns(channels: &[String], filled: &[bool]) -> Result<Vec<ImagingColumn>> {
    if filled.len() != ImagingColumnId::COUNT {
        return Err(InteropError::InvalidColumnType {
            reason: format!("expected {} filled flags, got {}", ImagingColumnId::COUNT, filled.len()),
        });
    }
    let mut columns = Vec::new();
    let mut offset = 0;
    for (id, _) in ImagingColumnId::ALL.into_iter().zip(filled).filter(|(_, f)| **f) {
        let subcolumns = match id.kind() {
            ColumnKind::Channel if channels.is_empty() => {
                return Err(InteropError::InvalidColumnType {
                    reason: format!("column {id} needs channel names"),
                });
            }
            ColumnKind::Channel => channels.to_vec(),
            ColumnKind::Base => DnaBase::ALL.iter().map(ToString::to_string).collect(),
            ColumnKind::Id | ColumnKind::Value => Vec::new(),
        };
        let column = ImagingColumn { id, subcolumns, offset };
        offset += column.size();
        columns.push(column);
    }
    if columns.is_empty() {
        return Err(InteropError::InvalidColumnType { reason: "no column is filled".to_string() });
    }
    Ok(columns)
}
