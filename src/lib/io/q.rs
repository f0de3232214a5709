//! Q-score histogram layouts.
//!
//! ```text
//! Version 4 (record size 206)
//! Offset  Size  Field
//! 0       2     lane (u16)
//! 2       2     tile (u16)
//! 4       2     cycle (u16)
//! 6       200   histogram, Q1..Q50 (u32 x 50)
//!
//! Version 6 header, after the record size:
//! 0       1     has bins (u8, 0 or 1)
//! 1       1     bin count B (u8), only when binned
//! 2       3*B   lower bounds, upper bounds, values (u8 x B each)
//!
//! Version 6 record (B entries, 50 when unbinned)
//! 0       2     lane (u16)
//! 2       2     tile (u16)
//! 4       2     cycle (u16)
//! 6       4*B   histogram (u32 x B)
//!
//! Version 7: as version 6 with a u32 tile.
//! ```

use crate::errors::{InteropError, Result};
use crate::io::MetricFormat;
use crate::io::cursor::{ByteReader, ByteWriter, expect_len};
use crate::metrics::q::MAX_Q_BINS;
use crate::metrics::{MetricRecord, MetricSet, QHeader, QMetric, QScoreBin};

impl MetricFormat for QMetric {
    const VERSIONS: &'static [u8] = &[4, 6, 7];
    const LATEST_VERSION: u8 = 7;

    fn record_size(version: u8, header: &QHeader) -> Option<usize> {
        let ids = if version == 7 { 8 } else { 6 };
        let bins = if version == 4 { MAX_Q_BINS } else { header.bin_count() };
        Some(ids + 4 * bins)
    }

    fn read_header(version: u8, reader: &mut ByteReader<'_>) -> Result<QHeader> {
        if version == 4 || reader.u8()? == 0 {
            return Ok(QHeader::default());
        }
        let count = usize::from(reader.u8()?);
        let lower = reader.take(count)?;
        let upper = reader.take(count)?;
        let value = reader.take(count)?;
        let bins = (0..count).map(|i| QScoreBin::new(lower[i], upper[i], value[i])).collect();
        Ok(QHeader { bins })
    }

    fn write_header(version: u8, header: &QHeader, writer: &mut ByteWriter) -> Result<()> {
        if version == 4 {
            return Ok(());
        }
        if header.bins.is_empty() {
            writer.put_u8(0);
            return Ok(());
        }
        let count = u8::try_from(header.bins.len()).map_err(|_| InteropError::InvalidArgument {
            reason: format!("{} Q-score bins do not fit the bin count field", header.bins.len()),
        })?;
        writer.put_u8(1);
        writer.put_u8(count);
        for bin in &header.bins {
            writer.put_u8(bin.lower);
        }
        for bin in &header.bins {
            writer.put_u8(bin.upper);
        }
        for bin in &header.bins {
            writer.put_u8(bin.value);
        }
        Ok(())
    }

    fn header_size(version: u8, header: &QHeader) -> usize {
        match (version, header.bins.len()) {
            (4, _) => 0,
            (_, 0) => 1,
            (_, bins) => 2 + 3 * bins,
        }
    }

    fn header_for_write(version: u8, set: &MetricSet<Self>) -> Result<QHeader> {
        if version == 4 && !set.header().bins.is_empty() {
            return Err(InteropError::InvalidArgument {
                reason: "version 4 Q metrics cannot hold binned histograms".to_string(),
            });
        }
        Ok(set.header().clone())
    }

    fn read_record(version: u8, header: &QHeader, reader: &mut ByteReader<'_>) -> Result<Option<Self>> {
        let lane = reader.u16_as_u32()?;
        let tile = if version == 7 { reader.u32()? } else { reader.u16_as_u32()? };
        let cycle = reader.u16_as_u32()?;
        let bins = if version == 4 { MAX_Q_BINS } else { header.bin_count() };
        let histogram = reader.u32_vec(bins)?;
        Ok(Some(QMetric::new(lane, tile, cycle, histogram)))
    }

    fn write_record(version: u8, header: &QHeader, record: &Self, writer: &mut ByteWriter) -> Result<()> {
        let bins = if version == 4 { MAX_Q_BINS } else { header.bin_count() };
        expect_len(record.histogram(), bins, "Q-score histogram")?;
        writer.put_u16_checked(record.lane(), "lane")?;
        if version == 7 {
            writer.put_u32(record.tile());
        } else {
            writer.put_u16_checked(record.tile(), "tile")?;
        }
        writer.put_u16_checked(record.cycle(), "cycle")?;
        for &count in record.histogram() {
            writer.put_u32(count);
        }
        Ok(())
    }
}
