//! Integration tests for the interop library.
//!
//! These tests write run folders to disk, load them back, and check that
//! loading, summaries, plots and tables agree with each other.

mod helpers;
mod test_codec_roundtrip;
mod test_container_bounds;
mod test_error_paths;
mod test_run_loading;
