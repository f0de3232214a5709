//! Tile metric layouts.
//!
//! Both versions spread one tile over several entries; entries for the same
//! tile are merged on read.
//!
//! ```text
//! Version 2 (record size 10)
//! Offset  Size  Field
//! 0       2     lane (u16)
//! 2       2     tile (u16)
//! 4       2     code (u16)
//! 6       4     value (f32)
//!
//! Codes: 100 density, 101 density PF, 102 cluster count, 103 cluster count PF,
//! 200 + 2(r-1) phasing of read r, 201 + 2(r-1) prephasing of read r,
//! 300 + (r-1) percent aligned of read r. Other codes are skipped.
//!
//! Version 3 (record size 15, header adds tile area as f32)
//! 0       2     lane (u16)
//! 2       4     tile (u32)
//! 6       1     code (u8): 't' cluster counts, 'r' read alignment
//! 7       8     't': cluster count (f32), cluster count PF (f32)
//!               'r': read number (u32), percent aligned (f32)
//! ```

use crate::errors::{InteropError, Result};
use crate::io::MetricFormat;
use crate::io::cursor::{ByteReader, ByteWriter};
use crate::metrics::{MetricRecord, TileHeader, TileMetric};

const DENSITY: u16 = 100;
const DENSITY_PF: u16 = 101;
const COUNT: u16 = 102;
const COUNT_PF: u16 = 103;
const PHASING_BASE: u16 = 200;
const ALIGNED_BASE: u16 = 300;
const CONTROL_BASE: u16 = 400;

const TILE_CODE: u8 = b't';
const READ_CODE: u8 = b'r';

fn read_code(read: u32, base: u16, stride: u32, offset: u32) -> Result<u16> {
    let code = u32::from(base) + (read.saturating_sub(1)) * stride + offset;
    u16::try_from(code).map_err(|_| InteropError::InvalidArgument {
        reason: format!("read {read} cannot be encoded as a tile code"),
    })
}

/// Code/value entries of one tile in version 2 order.
fn v2_entries(record: &TileMetric) -> Result<Vec<(u16, f32)>> {
    let mut entries = vec![
        (DENSITY, record.cluster_density()),
        (DENSITY_PF, record.cluster_density_pf()),
        (COUNT, record.cluster_count()),
        (COUNT_PF, record.cluster_count_pf()),
    ];
    for read in record.read_metrics() {
        entries.push((read_code(read.read, PHASING_BASE, 2, 0)?, read.percent_phasing));
        entries.push((read_code(read.read, PHASING_BASE, 2, 1)?, read.percent_prephasing));
    }
    for read in record.read_metrics() {
        entries.push((read_code(read.read, ALIGNED_BASE, 1, 0)?, read.percent_aligned));
    }
    entries.retain(|(_, value)| !value.is_nan());
    Ok(entries)
}

fn v3_entry_count(record: &TileMetric) -> usize {
    let tile = usize::from(!record.cluster_count().is_nan() || !record.cluster_count_pf().is_nan());
    tile + record.read_metrics().iter().filter(|r| !r.percent_aligned.is_nan()).count()
}

fn per_area(count: f32, area: f32) -> f32 {
    if area > 0.0 { count / area } else { f32::NAN }
}

fn read_v2(lane: u32, tile: u32, code: u16, value: f32) -> Option<TileMetric> {
    let mut metric = TileMetric::empty(lane, tile);
    match code {
        DENSITY => metric.set_cluster_density(value),
        DENSITY_PF => metric.set_cluster_density_pf(value),
        COUNT => metric.set_cluster_count(value),
        COUNT_PF => metric.set_cluster_count_pf(value),
        PHASING_BASE..ALIGNED_BASE => {
            let offset = code - PHASING_BASE;
            let read = metric.read_metric_mut(u32::from(offset / 2) + 1);
            if offset % 2 == 0 {
                read.percent_phasing = value;
            } else {
                read.percent_prephasing = value;
            }
        }
        ALIGNED_BASE..CONTROL_BASE => {
            metric.read_metric_mut(u32::from(code - ALIGNED_BASE) + 1).percent_aligned = value;
        }
        _ => return None,
    }
    Some(metric)
}

impl MetricFormat for TileMetric {
    const VERSIONS: &'static [u8] = &[2, 3];
    const LATEST_VERSION: u8 = 3;

    fn record_size(version: u8, _header: &TileHeader) -> Option<usize> {
        Some(if version == 2 { 10 } else { 15 })
    }

    fn read_header(version: u8, reader: &mut ByteReader<'_>) -> Result<TileHeader> {
        let area = if version == 3 { reader.f32()? } else { f32::NAN };
        Ok(TileHeader { area })
    }

    fn write_header(version: u8, header: &TileHeader, writer: &mut ByteWriter) -> Result<()> {
        if version == 3 {
            writer.put_f32(header.area);
        }
        Ok(())
    }

    fn header_size(version: u8, _header: &TileHeader) -> usize {
        if version == 3 { 4 } else { 0 }
    }

    fn read_record(version: u8, header: &TileHeader, reader: &mut ByteReader<'_>) -> Result<Option<Self>> {
        let lane = reader.u16_as_u32()?;
        if version == 2 {
            let tile = reader.u16_as_u32()?;
            let code = reader.u16()?;
            let value = reader.f32()?;
            return Ok(read_v2(lane, tile, code, value));
        }
        let tile = reader.u32()?;
        let mut metric = TileMetric::empty(lane, tile);
        match reader.u8()? {
            TILE_CODE => {
                let count = reader.f32()?;
                let count_pf = reader.f32()?;
                metric.set_cluster_count(count);
                metric.set_cluster_count_pf(count_pf);
                metric.set_cluster_density(per_area(count, header.area));
                metric.set_cluster_density_pf(per_area(count_pf, header.area));
            }
            READ_CODE => {
                let read = reader.u32()?;
                metric.read_metric_mut(read).percent_aligned = reader.f32()?;
            }
            _ => return Ok(None),
        }
        Ok(Some(metric))
    }

    fn write_record(version: u8, _header: &TileHeader, record: &Self, writer: &mut ByteWriter) -> Result<()> {
        if version == 2 {
            for (code, value) in v2_entries(record)? {
                writer.put_u16_checked(record.lane(), "lane")?;
                writer.put_u16_checked(record.tile(), "tile")?;
                writer.put_u16(code);
                writer.put_f32(value);
            }
            return Ok(());
        }
        if !record.cluster_count().is_nan() || !record.cluster_count_pf().is_nan() {
            writer.put_u16_checked(record.lane(), "lane")?;
            writer.put_u32(record.tile());
            writer.put_u8(TILE_CODE);
            writer.put_f32(record.cluster_count());
            writer.put_f32(record.cluster_count_pf());
        }
        for read in record.read_metrics().iter().filter(|r| !r.percent_aligned.is_nan()) {
            writer.put_u16_checked(record.lane(), "lane")?;
            writer.put_u32(record.tile());
            writer.put_u8(READ_CODE);
            writer.put_u32(read.read);
            writer.put_f32(read.percent_aligned);
        }
        Ok(())
    }

    fn record_bytes(version: u8, header: &TileHeader, record: &Self) -> usize {
        let entries = if version == 2 {
            v2_entries(record).map_or(0, |e| e.len())
        } else {
            v3_entry_count(record)
        };
        entries * Self::record_size(version, header).unwrap_or(0)
    }
}
