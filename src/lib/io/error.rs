//! Error metric layouts.
//!
//! ```text
//! Version 3 (record size 30)
//! Offset  Size  Field
//! 0       2     lane (u16)
//! 2       2     tile (u16)
//! 4       2     cycle (u16)
//! 6       4     error rate (f32)
//! 10      20    reads with 0..4 mismatches (u32 x 5)
//!
//! Version 4 (record size 12)
//! 0       2     lane (u16)
//! 2       4     tile (u32)
//! 6       2     cycle (u16)
//! 8       4     error rate (f32)
//! ```

use crate::errors::Result;
use crate::io::MetricFormat;
use crate::io::cursor::{ByteReader, ByteWriter, expect_len};
use crate::metrics::error::MISMATCH_SLOTS;
use crate::metrics::{ErrorMetric, MetricRecord};

impl MetricFormat for ErrorMetric {
    const VERSIONS: &'static [u8] = &[3, 4];
    const LATEST_VERSION: u8 = 4;

    fn record_size(version: u8, _header: &()) -> Option<usize> {
        Some(if version == 3 { 30 } else { 12 })
    }

    fn read_record(version: u8, _header: &(), reader: &mut ByteReader<'_>) -> Result<Option<Self>> {
        let lane = reader.u16_as_u32()?;
        let tile = if version == 3 { reader.u16_as_u32()? } else { reader.u32()? };
        let cycle = reader.u16_as_u32()?;
        let rate = reader.f32()?;
        let mut metric = ErrorMetric::new(lane, tile, cycle, rate);
        if version == 3 {
            metric = metric.with_mismatch_counts(reader.u32_vec(MISMATCH_SLOTS)?);
        }
        Ok(Some(metric))
    }

    fn write_record(version: u8, _header: &(), record: &Self, writer: &mut ByteWriter) -> Result<()> {
        writer.put_u16_checked(record.lane(), "lane")?;
        if version == 3 {
            writer.put_u16_checked(record.tile(), "tile")?;
        } else {
            writer.put_u32(record.tile());
        }
        writer.put_u16_checked(record.cycle(), "cycle")?;
        writer.put_f32(record.error_rate());
        if version == 3 {
            expect_len(record.mismatch_counts(), MISMATCH_SLOTS, "mismatch counts")?;
            for &count in record.mismatch_counts() {
                writer.put_u32(count);
            }
        }
        Ok(())
    }
}
