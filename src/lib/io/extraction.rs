//! Extraction metric layouts.
//!
//! ```text
//! Version 2 (record size 38, four channels)
//! Offset  Size  Field
//! 0       2     lane (u16)
//! 2       2     tile (u16)
//! 4       2     cycle (u16)
//! 6       16    focus (f32 x 4)
//! 22      8     max intensity (u16 x 4)
//! 30      8     date/time (u64)
//!
//! Version 3 (header adds channel count C as u8)
//! 0       2     lane (u16)
//! 2       4     tile (u32)
//! 6       2     cycle (u16)
//! 8       4*C   focus (f32 x C)
//! 8+4C    2*C   max intensity (u16 x C)
//! ```

use crate::errors::{InteropError, Result};
use crate::io::MetricFormat;
use crate::io::cursor::{ByteReader, ByteWriter, expect_len};
use crate::metrics::{ExtractionHeader, ExtractionMetric, MetricRecord, MetricSet};

const V2_CHANNELS: u8 = 4;

impl MetricFormat for ExtractionMetric {
    const VERSIONS: &'static [u8] = &[2, 3];
    const LATEST_VERSION: u8 = 3;

    fn record_size(version: u8, header: &ExtractionHeader) -> Option<usize> {
        Some(match version {
            2 => 38,
            _ => 8 + 6 * usize::from(header.channel_count),
        })
    }

    fn read_header(version: u8, reader: &mut ByteReader<'_>) -> Result<ExtractionHeader> {
        let channel_count = if version == 2 { V2_CHANNELS } else { reader.u8()? };
        Ok(ExtractionHeader { channel_count })
    }

    fn write_header(version: u8, header: &ExtractionHeader, writer: &mut ByteWriter) -> Result<()> {
        if version >= 3 {
            writer.put_u8(header.channel_count);
        }
        Ok(())
    }

    fn header_size(version: u8, _header: &ExtractionHeader) -> usize {
        usize::from(version >= 3)
    }

    fn header_for_write(version: u8, set: &MetricSet<Self>) -> Result<ExtractionHeader> {
        if version == 2 {
            return Ok(ExtractionHeader { channel_count: V2_CHANNELS });
        }
        if set.header().channel_count > 0 {
            return Ok(*set.header());
        }
        let channels = set.iter().map(ExtractionMetric::channel_count).max().unwrap_or(0);
        let channel_count = u8::try_from(channels).map_err(|_| InteropError::InvalidArgument {
            reason: format!("{channels} channels do not fit the channel count field"),
        })?;
        Ok(ExtractionHeader { channel_count })
    }

    fn read_record(
        version: u8,
        header: &ExtractionHeader,
        reader: &mut ByteReader<'_>,
    ) -> Result<Option<Self>> {
        let channels = usize::from(header.channel_count);
        let lane = reader.u16_as_u32()?;
        let tile = if version == 2 { reader.u16_as_u32()? } else { reader.u32()? };
        let cycle = reader.u16_as_u32()?;
        let focus = reader.f32_vec(channels)?;
        let max_intensity = reader.u16_vec(channels)?;
        let date_time = if version == 2 { reader.u64()? } else { 0 };
        Ok(Some(ExtractionMetric::new(lane, tile, cycle, max_intensity, focus).with_date_time(date_time)))
    }

    fn write_record(
        version: u8,
        header: &ExtractionHeader,
        record: &Self,
        writer: &mut ByteWriter,
    ) -> Result<()> {
        let channels = usize::from(header.channel_count);
        expect_len(record.focus_scores(), channels, "extraction focus")?;
        expect_len(record.max_intensities(), channels, "extraction max intensity")?;
        writer.put_u16_checked(record.lane(), "lane")?;
        if version == 2 {
            writer.put_u16_checked(record.tile(), "tile")?;
        } else {
            writer.put_u32(record.tile());
        }
        writer.put_u16_checked(record.cycle(), "cycle")?;
        for &focus in record.focus_scores() {
            writer.put_f32(focus);
        }
        for &max in record.max_intensities() {
            writer.put_u16(max);
        }
        if version == 2 {
            writer.put_u64(record.date_time());
        }
        Ok(())
    }
}
