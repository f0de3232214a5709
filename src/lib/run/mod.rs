//! Run configuration model.
//!
//! - [`info`] - the parsed `RunInfo.xml` and its validation rules
//! - [`parameters`] - the optional `RunParameters.xml` of older platforms
//! - [`flowcell`] - lane/surface/swath/tile geometry and tile-number decomposition
//! - [`read_info`] - reads and cycle ranges

pub mod flowcell;
pub mod info;
pub mod parameters;
pub mod read_info;
mod xml;

pub use flowcell::{FlowcellLayout, TilePosition, parse_tile_name};
pub use info::{RUN_INFO_FILE_NAME, RunInfo};
pub use parameters::{InstrumentType, RUN_PARAMETERS_FILE_NAME, RunParameters};
pub use read_info::{CycleRange, ReadInfo};
