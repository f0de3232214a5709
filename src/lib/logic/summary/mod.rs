//! Run and index summaries.
//!
//! - [`run`] - per read, lane and surface statistics over tiles
//! - [`index`] - per lane and per sample demultiplexing fractions
//!
//! Summaries are read-only aggregates. Like every other container in the crate
//! they expose positional `at()` access returning
//! [`InteropError::IndexOutOfBounds`](crate::errors::InteropError::IndexOutOfBounds)
//! past the end.

pub mod index;
pub mod run;

pub use index::{IndexCountSummary, IndexFlowcellSummary, IndexLaneSummary, summarize_index_metrics};
pub use run::{
    LaneSummary, MetricStats, ReadSummary, RunSummary, SummaryTotals, SurfaceSummary, summarize_run_metrics,
};
