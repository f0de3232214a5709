//! Index metric layouts.
//!
//! Index streams have no record-size byte; each entry is variable length and
//! strings are prefixed by their `u16` byte length.
//!
//! ```text
//! Version 1
//! Field            Type
//! lane             u16
//! tile             u16
//! read             u16
//! index sequence   u16 length + bytes
//! cluster count    u32
//! sample id        u16 length + bytes
//! sample project   u16 length + bytes
//!
//! Version 2: tile is u32 and cluster count is u64.
//! ```

use crate::errors::Result;
use crate::io::MetricFormat;
use crate::io::cursor::{ByteReader, ByteWriter, string16_size};
use crate::metrics::{IndexInfo, IndexMetric, MetricRecord};

fn entry_size(version: u8, info: &IndexInfo) -> usize {
    let fixed = if version == 1 { 6 + 4 } else { 8 + 8 };
    fixed + string16_size(&info.index_seq) + string16_size(&info.sample_id) + string16_size(&info.sample_proj)
}

impl MetricFormat for IndexMetric {
    const VERSIONS: &'static [u8] = &[1, 2];
    const LATEST_VERSION: u8 = 2;
    const FIXED_SIZE: bool = false;

    fn record_size(_version: u8, _header: &()) -> Option<usize> {
        None
    }

    fn read_record(version: u8, _header: &(), reader: &mut ByteReader<'_>) -> Result<Option<Self>> {
        let lane = reader.u16_as_u32()?;
        let tile = if version == 1 { reader.u16_as_u32()? } else { reader.u32()? };
        let read = reader.u16_as_u32()?;
        let index_seq = reader.string16()?;
        let cluster_count = if version == 1 { u64::from(reader.u32()?) } else { reader.u64()? };
        let sample_id = reader.string16()?;
        let sample_proj = reader.string16()?;
        let info = IndexInfo::new(index_seq, sample_id, sample_proj, cluster_count);
        Ok(Some(IndexMetric::new(lane, tile, read, vec![info])))
    }

    fn write_record(version: u8, _header: &(), record: &Self, writer: &mut ByteWriter) -> Result<()> {
        for info in record.indices() {
            writer.put_u16_checked(record.lane(), "lane")?;
            if version == 1 {
                writer.put_u16_checked(record.tile(), "tile")?;
            } else {
                writer.put_u32(record.tile());
            }
            writer.put_u16_checked(record.read(), "read")?;
            writer.put_string16(&info.index_seq, "index sequence")?;
            if version == 1 {
                writer.put_u32_checked(info.cluster_count, "cluster count")?;
            } else {
                writer.put_u64(info.cluster_count);
            }
            writer.put_string16(&info.sample_id, "sample id")?;
            writer.put_string16(&info.sample_proj, "sample project")?;
        }
        Ok(())
    }

    fn record_bytes(version: u8, _header: &(), record: &Self) -> usize {
        record.indices().iter().map(|info| entry_size(version, info)).sum()
    }
}
