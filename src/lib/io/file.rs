//! Metric files on disk: `<run folder>/InterOp/<Prefix>Out.bin`.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::constants::MetricGroup;
use crate::errors::{InteropError, Result};
use crate::io::{MetricFormat, read_from_buffer, write_to_vec};
use crate::metrics::MetricSet;

/// Name of the metric directory inside a run folder.
pub const INTEROP_DIR_NAME: &str = "InterOp";

/// `<run folder>/InterOp`.
#[must_use]
pub fn interop_dir<P: AsRef<Path>>(run_folder: P) -> PathBuf {
    run_folder.as_ref().join(INTEROP_DIR_NAME)
}

/// Path of the file holding `group` inside a run folder.
#[must_use]
pub fn metric_file_path<P: AsRef<Path>>(run_folder: P, group: MetricGroup) -> PathBuf {
    interop_dir(run_folder).join(group.file_name())
}

/// Reads the whole file at `path`.
///
/// # Errors
/// [`InteropError::FileNotFound`] when absent, [`InteropError::Io`] otherwise.
pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| InteropError::from_io(path, e))
}

/// Decodes the metric file at `path` into `set`.
///
/// # Errors
/// The errors of [`read_bytes`] and [`read_from_buffer`].
pub fn read_from_file<T: MetricFormat, P: AsRef<Path>>(path: P, set: &mut MetricSet<T>) -> Result<()> {
    let path = path.as_ref();
    let bytes = read_bytes(path)?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    read_from_buffer(&bytes, set)
}

/// Decodes the metric file for `T` from a run folder.
///
/// # Errors
/// See [`read_from_file`].
pub fn read_from_run_folder<T: MetricFormat, P: AsRef<Path>>(
    run_folder: P,
    set: &mut MetricSet<T>,
) -> Result<()> {
    read_from_file(metric_file_path(run_folder, T::GROUP), set)
}

/// Encodes `set` to `path`, creating parent directories as needed.
///
/// # Errors
/// The errors of [`write_to_vec`], or [`InteropError::Io`] when writing fails.
pub fn write_to_file<T: MetricFormat, P: AsRef<Path>>(path: P, set: &MetricSet<T>) -> Result<()> {
    let path = path.as_ref();
    let bytes = write_to_vec(set)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| InteropError::from_io(parent, e))?;
    }
    fs::write(path, &bytes).map_err(|e| InteropError::from_io(path, e))?;
    debug!("Wrote {} {} records to {}", set.size(), T::GROUP, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ErrorMetric;
    use tempfile::TempDir;

    #[test]
    fn test_metric_file_path() {
        let path = metric_file_path("/runs/160101_M1", MetricGroup::QCollapsed);
        assert_eq!(path, PathBuf::from("/runs/160101_M1/InterOp/QMetrics2030Out.bin"));
    }

    #[test]
    fn test_write_then_read_run_folder() {
        let dir = TempDir::new().unwrap();
        let mut set = MetricSet::with_version(3);
        set.insert(ErrorMetric::new(1, 1101, 1, 0.3));
        write_to_file(metric_file_path(dir.path(), MetricGroup::Error), &set).unwrap();

        let mut decoded = MetricSet::<ErrorMetric>::new();
        read_from_run_folder(dir.path(), &mut decoded).unwrap();
        assert_eq!(decoded.size(), 1);
        assert_eq!(decoded.version(), 3);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut set = MetricSet::<ErrorMetric>::new();
        let err = read_from_run_folder(dir.path(), &mut set).unwrap_err();
        assert!(matches!(err, InteropError::FileNotFound { .. }));
    }
}
