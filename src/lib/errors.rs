//! Custom error types for interop operations.
//!
//! Every failure the library can report is one variant of [`InteropError`], so
//! callers branch on the variant rather than on message text. Variants carry
//! the offending value and the bound or format it violated.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for interop operations
pub type Result<T> = std::result::Result<T, InteropError>;

/// Error type for interop operations
#[derive(Error, Debug)]
pub enum InteropError {
    /// A required file (RunInfo.xml, a metric file given explicitly) does not exist
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// The XML text is not well formed
    #[error("XML parse error: {reason}")]
    XmlParse {
        /// Parser diagnostic
        reason: String,
    },

    /// The XML text is empty
    #[error("XML text is empty")]
    EmptyFormat,

    /// A mandatory element or attribute is absent
    #[error("Missing XML element '{element}' in '{parent}'")]
    MissingElement {
        /// Name of the missing element or attribute
        element: String,
        /// Element that should contain it
        parent: String,
    },

    /// Well formed XML whose structure or values are not a valid run description
    #[error("Bad XML format: {reason}")]
    BadXmlFormat {
        /// Explanation of the problem
        reason: String,
    },

    /// The explicit tile list disagrees with the flowcell layout
    #[error("Invalid tile list: tile '{tile}' {reason}")]
    InvalidTileList {
        /// Tile name as listed in the run description
        tile: String,
        /// Explanation of the inconsistency
        reason: String,
    },

    /// A read number that the run does not declare
    #[error("Invalid read number {read}: run declares {read_count} reads")]
    InvalidRead {
        /// Requested read number
        read: u32,
        /// Number of reads in the run
        read_count: usize,
    },

    /// The tile naming method is unknown or cannot be applied
    #[error("Invalid tile naming method: {reason}")]
    InvalidTileNamingMethod {
        /// Explanation of the problem
        reason: String,
    },

    /// A record or request references an identifier outside the run layout
    #[error("Invalid run info in {context}: {name} {value} exceeds {bound}")]
    InvalidRunInfo {
        /// Where the identifier came from (metric name, caller label)
        context: String,
        /// Which identifier (lane, tile, surface, swath, read)
        name: &'static str,
        /// The offending value
        value: u32,
        /// The largest valid value
        bound: u32,
    },

    /// A record references a cycle beyond the run's total cycles
    #[error("Invalid cycle in {context}: cycle {cycle} exceeds total cycles {total_cycles} (lane {lane}, tile {tile})")]
    InvalidRunInfoCycle {
        /// Where the cycle came from
        context: String,
        /// Lane of the record
        lane: u32,
        /// Tile of the record
        tile: u32,
        /// The offending cycle
        cycle: u32,
        /// Total cycles declared by the run
        total_cycles: u32,
    },

    /// A binary metric stream whose version or layout cannot be decoded
    #[error("Bad {metric} format: {reason}")]
    BadRecordFormat {
        /// Metric group name
        metric: String,
        /// Explanation of the problem
        reason: String,
    },

    /// A binary metric stream that ends before its declared content
    #[error("Incomplete {metric} data: {reason}")]
    IncompleteFile {
        /// Metric group name
        metric: String,
        /// Explanation of the problem
        reason: String,
    },

    /// A buffer or value that does not fit the requested operation
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// Explanation of the problem
        reason: String,
    },

    /// Filter options that reference identifiers outside the run
    #[error("Invalid filter option '{option}': {reason}")]
    InvalidFilterOption {
        /// The option name
        option: &'static str,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// No column schema can be derived from the supplied inputs
    #[error("Invalid column type: {reason}")]
    InvalidColumnType {
        /// Explanation of the problem
        reason: String,
    },

    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// A metric type or group name that is not in the registry
    #[error("Invalid metric type: '{name}'")]
    InvalidMetricType {
        /// The unrecognized name
        name: String,
    },

    /// Channel names could not be determined for the run
    #[error("Invalid channel configuration: {reason}")]
    InvalidChannel {
        /// Explanation of the problem
        reason: String,
    },

    /// Positional or keyed access outside a container's contents
    #[error("Index out of bounds in {container}: {index} (size {size})")]
    IndexOutOfBounds {
        /// Container type being accessed
        container: &'static str,
        /// The requested index or key
        index: String,
        /// Number of elements in the container
        size: usize,
    },

    /// I/O error other than a missing file
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl InteropError {
    /// Creates an [`InteropError::IndexOutOfBounds`] for a positional access.
    #[must_use]
    pub fn out_of_bounds(container: &'static str, index: usize, size: usize) -> Self {
        Self::IndexOutOfBounds { container, index: index.to_string(), size }
    }

    /// Maps an I/O error on `path`, turning `NotFound` into [`InteropError::FileNotFound`].
    #[must_use]
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}

/// Returns a reference to `items[index]` or an [`InteropError::IndexOutOfBounds`].
///
/// Every positional accessor in the crate goes through this so the bounds
/// contract is identical across metric sets, summaries, plot series and tables.
pub fn checked_at<'a, T>(items: &'a [T], index: usize, container: &'static str) -> Result<&'a T> {
    items.get(index).ok_or_else(|| InteropError::out_of_bounds(container, index, items.len()))
}
