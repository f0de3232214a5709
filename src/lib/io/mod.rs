//! Binary metric codec.
//!
//! Every metric stream starts with a one-byte version. Fixed-width formats
//! follow it with a one-byte record size, then any per-format header fields,
//! then records of exactly that size:
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       1     version (u8)
//! 1       1     record size (u8), fixed-width formats only
//! 2+      var   format header (channel count, tile area, Q-score bins)
//! ...     n*s   records
//! ```
//!
//! All integers are little-endian and all reals are 4-byte IEEE-754 floats.
//! A record size larger than the known layout is allowed; the trailing bytes
//! of each record are skipped.
//!
//! Each record type implements [`MetricFormat`]; the functions in this module
//! drive the common framing and checks:
//! - [`read_from_buffer`] / [`read_from_file`] decode into a [`MetricSet`]
//! - [`write_to_buffer`] / [`write_to_vec`] / [`write_to_file`] encode one
//! - [`calculate_buffer_size`] gives the exact encoded size

pub mod corrected_intensity;
pub mod cursor;
pub mod error;
pub mod extraction;
pub mod file;
pub mod index;
pub mod q;
pub mod q_collapsed;
pub mod tile;

use log::debug;

use crate::errors::{InteropError, Result};
use crate::metrics::{MetricRecord, MetricSet};

pub use cursor::{ByteReader, ByteWriter};
pub use file::{interop_dir, metric_file_path, read_from_file, read_from_run_folder, write_to_file};

/// Version-specific binary layout of one record type.
pub trait MetricFormat: MetricRecord {
    /// Versions that can be read and written, oldest first.
    const VERSIONS: &'static [u8];

    /// Version used when a set has none.
    const LATEST_VERSION: u8;

    /// Whether the stream declares a record size after the version byte.
    const FIXED_SIZE: bool = true;

    /// Width in bytes of one record's known layout, `None` when records vary in size.
    fn record_size(version: u8, header: &Self::Header) -> Option<usize>;

    /// Reads the format header that follows the version and record-size bytes.
    fn read_header(_version: u8, _reader: &mut ByteReader<'_>) -> Result<Self::Header> {
        Ok(Self::Header::default())
    }

    /// Writes the format header read by [`MetricFormat::read_header`].
    fn write_header(_version: u8, _header: &Self::Header, _writer: &mut ByteWriter) -> Result<()> {
        Ok(())
    }

    /// Size in bytes of the format header.
    fn header_size(_version: u8, _header: &Self::Header) -> usize {
        0
    }

    /// Header to write for `set`, filling in values derivable from its records.
    fn header_for_write(_version: u8, set: &MetricSet<Self>) -> Result<Self::Header> {
        Ok(set.header().clone())
    }

    /// Decodes one record; `None` for records that carry nothing this crate keeps.
    fn read_record(version: u8, header: &Self::Header, reader: &mut ByteReader<'_>) -> Result<Option<Self>>;

    /// Encodes one record (some formats spread one record over several entries).
    fn write_record(version: u8, header: &Self::Header, record: &Self, writer: &mut ByteWriter) -> Result<()>;

    /// Encoded size of one record.
    fn record_bytes(version: u8, header: &Self::Header, _record: &Self) -> usize {
        Self::record_size(version, header).unwrap_or(0)
    }
}

fn bad_format<T: MetricFormat>(reason: String) -> InteropError {
    InteropError::BadRecordFormat { metric: T::GROUP.name().to_string(), reason }
}

fn incomplete<T: MetricFormat>(reason: String) -> InteropError {
    InteropError::IncompleteFile { metric: T::GROUP.name().to_string(), reason }
}

/// Decodes `bytes` into `set`, replacing its records, version and header.
///
/// A stream that ends part-way through a record still leaves every complete
/// record before the cut in `set`; the error only reports the damaged tail.
///
/// # Errors
/// - [`InteropError::IncompleteFile`] when the stream is empty, its header is
///   truncated, or it ends part-way through a record
/// - [`InteropError::BadRecordFormat`] for an unsupported version, a declared
///   record size smaller than the version's layout, or a malformed record
pub fn read_from_buffer<T: MetricFormat>(bytes: &[u8], set: &mut MetricSet<T>) -> Result<()> {
    let metric = T::GROUP.name();
    let Some((&version, body)) = bytes.split_first() else {
        return Err(incomplete::<T>("stream is empty".to_string()));
    };
    if !T::VERSIONS.contains(&version) {
        return Err(bad_format::<T>(format!(
            "unsupported version {version}, expected one of {:?}",
            T::VERSIONS
        )));
    }

    let mut reader = ByteReader::new(body, metric);
    let declared = if T::FIXED_SIZE { Some(usize::from(reader.u8()?)) } else { None };
    let header = T::read_header(version, &mut reader)?;

    set.clear();
    set.set_version(version);
    set.set_header(header.clone());

    match (declared, T::record_size(version, &header)) {
        (Some(declared), Some(layout)) => {
            if declared == 0 {
                return Err(bad_format::<T>("record size is zero".to_string()));
            }
            if declared < layout {
                return Err(bad_format::<T>(format!(
                    "record size {declared} is smaller than the {layout} bytes version {version} requires"
                )));
            }
            let records = reader.rest().chunks_exact(declared);
            let tail = records.remainder().len();
            for chunk in records {
                let mut record = ByteReader::new(&chunk[..layout], metric);
                if let Some(decoded) = T::read_record(version, &header, &mut record)? {
                    set.insert_merged(decoded);
                }
            }
            if tail != 0 {
                return Err(incomplete::<T>(format!(
                    "stream ends {tail} bytes into a {declared}-byte record after {} complete records",
                    set.size()
                )));
            }
        }
        _ => {
            while !reader.is_empty() {
                if let Some(decoded) = T::read_record(version, &header, &mut reader)? {
                    set.insert_merged(decoded);
                }
            }
        }
    }

    debug!("Decoded {} {metric} records (version {version})", set.size());
    Ok(())
}

/// Version a set is written with: its own, or the latest when unset.
fn write_version<T: MetricFormat>(set: &MetricSet<T>) -> Result<u8> {
    match set.version() {
        0 => Ok(T::LATEST_VERSION),
        v if T::VERSIONS.contains(&v) => Ok(v),
        v => Err(bad_format::<T>(format!("cannot write version {v}, expected one of {:?}", T::VERSIONS))),
    }
}

/// Exact number of bytes [`write_to_buffer`] needs for `set`.
///
/// # Errors
/// Returns [`InteropError::BadRecordFormat`] when the set's version cannot be written.
pub fn calculate_buffer_size<T: MetricFormat>(set: &MetricSet<T>) -> Result<usize> {
    let version = write_version(set)?;
    let header = T::header_for_write(version, set)?;
    let records: usize = set.iter().map(|r| T::record_bytes(version, &header, r)).sum();
    Ok(1 + usize::from(T::FIXED_SIZE) + T::header_size(version, &header) + records)
}

/// Encodes `set` into a new vector.
///
/// # Errors
/// - [`InteropError::BadRecordFormat`] when the set's version cannot be written
/// - [`InteropError::InvalidArgument`] when a value does not fit its field or a
///   record's channel count disagrees with the header
pub fn write_to_vec<T: MetricFormat>(set: &MetricSet<T>) -> Result<Vec<u8>> {
    let version = write_version(set)?;
    let header = T::header_for_write(version, set)?;
    let mut writer = ByteWriter::with_capacity(calculate_buffer_size(set)?);
    writer.put_u8(version);
    if T::FIXED_SIZE {
        let size = T::record_size(version, &header).unwrap_or(0);
        let size = u8::try_from(size).map_err(|_| InteropError::InvalidArgument {
            reason: format!("record size {size} does not fit the one-byte size field"),
        })?;
        writer.put_u8(size);
    }
    T::write_header(version, &header, &mut writer)?;
    for record in set {
        T::write_record(version, &header, record, &mut writer)?;
    }
    Ok(writer.into_inner())
}

/// Encodes `set` into `out`, returning the number of bytes written.
///
/// Nothing is written to `out` unless the whole set encodes successfully.
///
/// # Errors
/// - [`InteropError::InvalidArgument`] when `out` is smaller than
///   [`calculate_buffer_size`], or for the errors of [`write_to_vec`]
pub fn write_to_buffer<T: MetricFormat>(set: &MetricSet<T>, out: &mut [u8]) -> Result<usize> {
    let required = calculate_buffer_size(set)?;
    if out.len() < required {
        return Err(InteropError::InvalidArgument {
            reason: format!(
                "buffer of {} bytes is too small for {} {} records ({required} bytes)",
                out.len(),
                set.size(),
                T::GROUP
            ),
        });
    }
    let bytes = write_to_vec(set)?;
    out[..bytes.len()].copy_from_slice(&bytes);
    Ok(bytes.len())
}
