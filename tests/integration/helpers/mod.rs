//! Helper utilities for integration tests.

pub mod run_folder;

pub use run_folder::*;
