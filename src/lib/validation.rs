//! Parameter validation utilities
//!
//! Run loading checks its parameters with these helpers before touching the
//! file system, so a bad call fails with [`InteropError::InvalidParameter`]
//! (or [`InteropError::FileNotFound`] for a missing folder) and does no work.

use std::fmt::Display;
use std::path::Path;

use crate::constants::MetricGroup;
use crate::errors::{InteropError, Result};

/// Validate that a directory exists
///
/// # Arguments
/// * `path` - Directory to validate
///
/// # Errors
/// Returns [`InteropError::FileNotFound`] if `path` is not an existing directory
///
/// # Example
/// ```
/// use interop_lib::validation::validate_dir_exists;
///
/// assert!(validate_dir_exists("/nonexistent/run/folder").is_err());
/// ```
pub fn validate_dir_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Err(InteropError::FileNotFound { path: path.to_path_buf() });
    }
    Ok(())
}

/// Validate that a value is positive (> 0)
///
/// # Arguments
/// * `value` - Value to validate
/// * `name` - Name of the parameter for error messages
///
/// # Errors
/// Returns [`InteropError::InvalidParameter`] if the value is not positive
///
/// # Example
/// ```
/// use interop_lib::validation::validate_positive;
///
/// validate_positive(4, "thread_count").unwrap();
///
/// let result = validate_positive(0, "thread_count");
/// assert!(result.is_err());
/// ```
#[allow(clippy::needless_pass_by_value)]
pub fn validate_positive<T: Ord + Display + Default>(value: T, name: &str) -> Result<()> {
    if value <= T::default() {
        return Err(InteropError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("Must be positive (> 0), got: {value}"),
        });
    }
    Ok(())
}

/// Validate a per-group load mask
///
/// A mask has one entry per [`MetricGroup`], in [`MetricGroup::ALL`] order;
/// a non-zero entry selects the group.
///
/// # Errors
/// Returns [`InteropError::InvalidParameter`] if the mask has the wrong length
///
/// # Example
/// ```
/// use interop_lib::validation::validate_load_mask;
///
/// validate_load_mask(&[1, 0, 0, 0, 0, 1, 0], "valid_to_load").unwrap();
/// assert!(validate_load_mask(&[1, 1], "valid_to_load").is_err());
/// ```
pub fn validate_load_mask(mask: &[u8], name: &str) -> Result<()> {
    if mask.len() != MetricGroup::COUNT {
        return Err(InteropError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("expected {} entries, got {}", MetricGroup::COUNT, mask.len()),
        });
    }
    Ok(())
}
