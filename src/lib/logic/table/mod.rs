//! Per lane, tile and cycle table of imaging metrics.

mod columns;
mod imaging;

pub use columns::{ImagingColumn, ImagingColumnId, create_imaging_table_columns};
pub use imaging::{ImagingTable, populate_imaging_table};
