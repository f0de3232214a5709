//! Corrected intensity metric layouts.
//!
//! ```text
//! Version 2 (record size 48)
//! Offset  Size  Field
//! 0       2     lane (u16)
//! 2       2     tile (u16)
//! 4       2     cycle (u16)
//! 6       2     average cycle intensity (u16)
//! 8       8     corrected intensity, all clusters (u16 x 4, A C G T)
//! 16      8     corrected intensity, called clusters (u16 x 4)
//! 24      20    call counts (u32 x 5, no-call A C G T)
//! 44      4     signal to noise (f32)
//!
//! Version 3 (record size 42)
//! 0       2     lane (u16)
//! 2       2     tile (u16)
//! 4       2     cycle (u16)
//! 6       16    corrected intensity, called clusters (f32 x 4)
//! 22      20    call counts (u32 x 5)
//! ```

use crate::errors::{InteropError, Result};
use crate::io::MetricFormat;
use crate::io::cursor::{ByteReader, ByteWriter, expect_len};
use crate::metrics::corrected_intensity::CALL_COUNT_SLOTS;
use crate::metrics::{CorrectedIntensityMetric, MetricRecord};

const BASES: usize = 4;

fn called_as_u16(value: f32) -> Result<u16> {
    let rounded = value.round();
    if !(0.0..=f32::from(u16::MAX)).contains(&rounded) {
        return Err(InteropError::InvalidArgument {
            reason: format!("called intensity {value} does not fit in a 16-bit field"),
        });
    }
    Ok(rounded as u16)
}

impl MetricFormat for CorrectedIntensityMetric {
    const VERSIONS: &'static [u8] = &[2, 3];
    const LATEST_VERSION: u8 = 3;

    fn record_size(version: u8, _header: &()) -> Option<usize> {
        Some(if version == 2 { 48 } else { 42 })
    }

    fn read_record(version: u8, _header: &(), reader: &mut ByteReader<'_>) -> Result<Option<Self>> {
        let lane = reader.u16_as_u32()?;
        let tile = reader.u16_as_u32()?;
        let cycle = reader.u16_as_u32()?;
        let metric = if version == 2 {
            let average = reader.u16()?;
            let all = reader.u16_vec(BASES)?;
            let called = reader.u16_vec(BASES)?.into_iter().map(f32::from).collect();
            let counts = reader.u32_vec(CALL_COUNT_SLOTS)?;
            let snr = reader.f32()?;
            CorrectedIntensityMetric::new(lane, tile, cycle, called, counts)
                .with_intensities(average, all)
                .with_signal_to_noise(snr)
        } else {
            let called = reader.f32_vec(BASES)?;
            let counts = reader.u32_vec(CALL_COUNT_SLOTS)?;
            CorrectedIntensityMetric::new(lane, tile, cycle, called, counts)
        };
        Ok(Some(metric))
    }

    fn write_record(version: u8, _header: &(), record: &Self, writer: &mut ByteWriter) -> Result<()> {
        expect_len(record.corrected_int_called(), BASES, "called intensity")?;
        expect_len(record.called_counts(), CALL_COUNT_SLOTS, "call counts")?;
        writer.put_u16_checked(record.lane(), "lane")?;
        writer.put_u16_checked(record.tile(), "tile")?;
        writer.put_u16_checked(record.cycle(), "cycle")?;
        if version == 2 {
            expect_len(record.corrected_int_all(), BASES, "corrected intensity")?;
            writer.put_u16(record.average_cycle_intensity());
            for &value in record.corrected_int_all() {
                writer.put_u16(value);
            }
            for &value in record.corrected_int_called() {
                writer.put_u16(called_as_u16(value)?);
            }
        } else {
            for &value in record.corrected_int_called() {
                writer.put_f32(value);
            }
        }
        for &count in record.called_counts() {
            writer.put_u32(count);
        }
        if version == 2 {
            writer.put_f32(record.signal_to_noise());
        }
        Ok(())
    }
}
