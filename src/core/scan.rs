//! Scan ranges, scan options and the per-channel scan-add bitmap.

use super::fields::Field;
use super::freq::{decode_freq, encode_freq};
use super::image::MemoryImage;
use super::layout::{CHANNEL_COUNT, SCAN_ADD, SCAN_RANGES, SCAN_RANGE_COUNT};
use crate::error::{CodeplugError, Result};

/// Scan options, relative to [`SCAN_DATA`](super::layout::SCAN_DATA).
pub const SCAN_FIELDS: &[Field] = &[
    Field::range("mode", 0, 0, 2),
    Field::byte("back_scan_time", 1),
    Field::byte("rx_resume_time", 2),
    Field::byte("tx_resume_time", 3),
    Field::byte("return_channel", 4),
    Field::range("priority_scan", 5, 0, 1),
    Field::word("priority_channel", 6, CHANNEL_COUNT as u16),
    Field::range("range", 8, 0, 1),
];

/// One scan range entry, relative to [`range_offset`].
pub const RANGE_FIELDS: &[Field] = &[Field::freq("upper", 0), Field::freq("lower", 4)];

pub const fn range_offset(index: usize) -> usize {
    SCAN_RANGES + index * 8
}

/// Frequency bounds of a scan range, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanRange {
    pub upper: u64,
    pub lower: u64,
}

impl ScanRange {
    pub fn read(image: &MemoryImage, index: usize) -> Option<Self> {
        if index >= SCAN_RANGE_COUNT {
            return None;
        }
        let base = range_offset(index);
        Some(Self {
            upper: decode_freq(image.u32_be(base)),
            lower: decode_freq(image.u32_be(base + 4)),
        })
    }

    pub fn write(&self, image: &mut MemoryImage, index: usize) -> Result<()> {
        if index >= SCAN_RANGE_COUNT {
            return Err(CodeplugError::OutOfRange {
                what: "scan range",
                value: index as i64,
            });
        }
        let upper = encode_freq(self.upper)?;
        let lower = encode_freq(self.lower)?;
        let base = range_offset(index);
        image.set_u32_be(base, upper);
        image.set_u32_be(base + 4, lower);
        Ok(())
    }
}

fn scan_add_bit(n: u16) -> Option<(usize, u8)> {
    if n == 0 || usize::from(n) > CHANNEL_COUNT {
        return None;
    }
    let id = usize::from(n - 1);
    Some((SCAN_ADD + id / 8, 0x80 >> (id % 8)))
}

/// Whether channel `n` is included in scanning.
pub fn scan_add(image: &MemoryImage, n: u16) -> bool {
    scan_add_bit(n).is_some_and(|(offset, mask)| image.u8(offset) & mask != 0)
}

/// Returns `false` for an out-of-range channel.
pub fn set_scan_add(image: &mut MemoryImage, n: u16, on: bool) -> bool {
    let Some((offset, mask)) = scan_add_bit(n) else {
        return false;
    };
    let byte = image.u8(offset);
    image.set_u8(offset, if on { byte | mask } else { byte & !mask });
    true
}
