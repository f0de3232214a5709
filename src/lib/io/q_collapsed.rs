//! Collapsed Q-score layouts.
//!
//! ```text
//! Version 2 (record size 22)
//! Offset  Size  Field
//! 0       2     lane (u16)
//! 2       2     tile (u16)
//! 4       2     cycle (u16)
//! 6       4     calls >= Q20 (u32)
//! 10      4     calls >= Q30 (u32)
//! 14      4     total calls (u32)
//! 18      4     median Q-score (u32)
//!
//! Version 6 (record size 24): as version 2 with a u32 tile.
//! ```

use crate::errors::Result;
use crate::io::MetricFormat;
use crate::io::cursor::{ByteReader, ByteWriter};
use crate::metrics::{MetricRecord, QCollapsedMetric};

impl MetricFormat for QCollapsedMetric {
    const VERSIONS: &'static [u8] = &[2, 6];
    const LATEST_VERSION: u8 = 6;

    fn record_size(version: u8, _header: &()) -> Option<usize> {
        Some(if version == 2 { 22 } else { 24 })
    }

    fn read_record(version: u8, _header: &(), reader: &mut ByteReader<'_>) -> Result<Option<Self>> {
        let lane = reader.u16_as_u32()?;
        let tile = if version == 2 { reader.u16_as_u32()? } else { reader.u32()? };
        let cycle = reader.u16_as_u32()?;
        let q20 = reader.u32()?;
        let q30 = reader.u32()?;
        let total = reader.u32()?;
        let median = reader.u32()?;
        Ok(Some(QCollapsedMetric::new(lane, tile, cycle, q20, q30, total, median)))
    }

    fn write_record(version: u8, _header: &(), record: &Self, writer: &mut ByteWriter) -> Result<()> {
        writer.put_u16_checked(record.lane(), "lane")?;
        if version == 2 {
            writer.put_u16_checked(record.tile(), "tile")?;
        } else {
            writer.put_u32(record.tile());
        }
        writer.put_u16_checked(record.cycle(), "cycle")?;
        writer.put_u32(record.q20());
        writer.put_u32(record.q30());
        writer.put_u32(record.total());
        writer.put_u32(record.median_qscore());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{read_from_buffer, write_to_vec};
    use crate::metrics::MetricSet;
    use rstest::rstest;

    #[rstest]
    #[case(2, 22)]
    #[case(6, 24)]
    fn test_versions(#[case] version: u8, #[case] width: usize) {
        let mut set = MetricSet::with_version(version);
        set.insert(QCollapsedMetric::new(1, 1104, 1, 93_990, 80_200, 100_000, 35));
        set.insert(QCollapsedMetric::new(1, 1104, 2, 91_000, 78_000, 100_000, 34));
        let bytes = write_to_vec(&set).unwrap();
        assert_eq!(bytes.len(), 2 + 2 * width);

        let mut decoded = MetricSet::<QCollapsedMetric>::new();
        read_from_buffer(&bytes, &mut decoded).unwrap();
        assert_eq!(decoded, set);
        assert_eq!(decoded.max_cycle(), 2);
    }
}
