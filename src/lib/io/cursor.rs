//! Little-endian byte cursors used by the metric codecs.
//!
//! Reads past the end of the input surface as [`InteropError::IncompleteFile`];
//! writes of values that do not fit the on-disk field width surface as
//! [`InteropError::InvalidArgument`].

use crate::errors::{InteropError, Result};

/// Forward-only reader over a byte slice.
#[derive(Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
    metric: &'static str,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader; `metric` names the group in error messages.
    #[must_use]
    pub fn new(bytes: &'a [u8], metric: &'static str) -> Self {
        Self { bytes, position: 0, metric }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread bytes.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.bytes[self.position..]
    }

    /// Consumes `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(InteropError::IncompleteFile {
                metric: self.metric.to_string(),
                reason: format!(
                    "needed {len} bytes at offset {} but only {} remain",
                    self.position,
                    self.remaining()
                ),
            });
        }
        let slice = &self.bytes[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0_u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.array().map(u16::from_le_bytes)
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.array().map(u32::from_le_bytes)
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.array().map(u64::from_le_bytes)
    }

    pub fn f32(&mut self) -> Result<f32> {
        self.array().map(f32::from_le_bytes)
    }

    /// A `u16` widened to `u32`.
    pub fn u16_as_u32(&mut self) -> Result<u32> {
        self.u16().map(u32::from)
    }

    /// A UTF-8 string prefixed by its `u16` byte length.
    ///
    /// Invalid UTF-8 is [`InteropError::BadRecordFormat`] rather than being
    /// replaced, so decoded strings always write back byte for byte.
    pub fn string16(&mut self) -> Result<String> {
        let len = usize::from(self.u16()?);
        let offset = self.position;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| InteropError::BadRecordFormat {
            metric: self.metric.to_string(),
            reason: format!("string at offset {offset} is not valid UTF-8: {e}"),
        })
    }

    pub fn u16_vec(&mut self, count: usize) -> Result<Vec<u16>> {
        (0..count).map(|_| self.u16()).collect()
    }

    pub fn u32_vec(&mut self, count: usize) -> Result<Vec<u32>> {
        (0..count).map(|_| self.u32()).collect()
    }

    pub fn f32_vec(&mut self, count: usize) -> Result<Vec<f32>> {
        (0..count).map(|_| self.f32()).collect()
    }
}

/// Growable little-endian writer.
#[derive(Debug, Default)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { bytes: Vec::with_capacity(capacity) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }

    pub fn put_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn put_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_u64(&mut self, value: u64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn put_f32(&mut self, value: f32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes `value` into a `u16` field.
    ///
    /// # Errors
    /// Returns [`InteropError::InvalidArgument`] when `value` exceeds `u16::MAX`.
    pub fn put_u16_checked(&mut self, value: u32, field: &str) -> Result<()> {
        let narrow = u16::try_from(value).map_err(|_| InteropError::InvalidArgument {
            reason: format!("{field} {value} does not fit in a 16-bit field"),
        })?;
        self.put_u16(narrow);
        Ok(())
    }

    /// Writes `value` into a `u32` field.
    ///
    /// # Errors
    /// Returns [`InteropError::InvalidArgument`] when `value` exceeds `u32::MAX`.
    pub fn put_u32_checked(&mut self, value: u64, field: &str) -> Result<()> {
        let narrow = u32::try_from(value).map_err(|_| InteropError::InvalidArgument {
            reason: format!("{field} {value} does not fit in a 32-bit field"),
        })?;
        self.put_u32(narrow);
        Ok(())
    }

    /// Writes a string prefixed by its `u16` byte length.
    ///
    /// # Errors
    /// Returns [`InteropError::InvalidArgument`] for strings longer than `u16::MAX` bytes.
    pub fn put_string16(&mut self, value: &str, field: &str) -> Result<()> {
        let len = u32::try_from(value.len()).unwrap_or(u32::MAX);
        self.put_u16_checked(len, field)?;
        self.bytes.extend_from_slice(value.as_bytes());
        Ok(())
    }
}

/// Serialized size of a `u16`-length-prefixed string.
#[must_use]
pub fn string16_size(value: &str) -> usize {
    2 + value.len()
}

/// Checks that a per-channel (or per-base) field holds exactly `expected` values.
///
/// # Errors
/// Returns [`InteropError::InvalidArgument`] on a length mismatch.
pub fn expect_len<T>(values: &[T], expected: usize, field: &str) -> Result<()> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(InteropError::InvalidArgument {
            reason: format!("{field} has {} values, format requires {expected}", values.len()),
        })
    }
}
