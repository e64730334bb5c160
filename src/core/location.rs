//! APRS beacon settings and the GPS contact book.

use super::fields::Field;
use super::image::MemoryImage;
use super::layout::{GPS_BOOK, GPS_BOOK_COUNT, GPS_ENTRY_LEN, GPS_VALID, GPS_VALID_LEN};
use super::text::{decode_text, encode_text};
use crate::error::{CodeplugError, Result};

/// APRS block, relative to [`APRS`](super::layout::APRS).
///
/// Longitude and latitude are degrees scaled by 100000.
pub const APRS_FIELDS: &[Field] = &[
    Field::ascii("destination", 0, 6),
    Field::range("destination_ssid", 6, 0, 15),
    Field::byte("packet_flags", 7),
    Field::ascii("source", 8, 6),
    Field::range("source_ssid", 14, 0, 15),
    Field::byte("status_flags", 15),
    Field::byte("pre_time", 16),
    Field::byte("code_delay", 17),
    Field::tone("tone", 18),
    Field::ascii("symbol_table", 20, 1),
    Field::ascii("symbol", 21, 1),
    Field::byte("send_interval", 88),
    Field::range("regular_send", 89, 0, 1),
    Field::byte("display_time", 90),
    Field::byte("config_flags", 92),
    Field::signed("longitude", 96),
    Field::signed("latitude", 100),
    Field::signed("height", 104),
    Field::counted_text("text", 108, 60, 95),
];

/// GPS book entry, relative to [`gps_entry_offset`].
pub const GPS_FIELDS: &[Field] = &[Field::byte("id", 0), Field::text("name", 2, 14)];

pub const fn gps_entry_offset(index: usize) -> usize {
    GPS_BOOK + index * GPS_ENTRY_LEN
}

/// The flag block only spans 80 entries; later entries are never valid.
fn valid_bit(index: usize) -> Option<(usize, u8)> {
    (index < GPS_VALID_LEN * 8).then(|| (GPS_VALID + index / 8, 0x80 >> (index % 8)))
}

/// One GPS contact.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GpsContact {
    pub id: u8,
    pub name: String,
}

impl GpsContact {
    /// Entry `index` when its valid flag is set.
    pub fn read(image: &MemoryImage, index: usize) -> Option<Self> {
        if !gps_entry_valid(image, index) {
            return None;
        }
        let base = gps_entry_offset(index);
        Some(Self {
            id: image.u8(base),
            name: decode_text(image.slice(base + 2, 14)),
        })
    }

    /// Store the entry and set its valid flag.
    pub fn write(&self, image: &mut MemoryImage, index: usize) -> Result<()> {
        if index >= GPS_BOOK_COUNT {
            return Err(CodeplugError::OutOfRange {
                what: "GPS book index",
                value: index as i64,
            });
        }
        let base = gps_entry_offset(index);
        image.set_u8(base, self.id);
        image
            .slice_mut(base + 2, 14)
            .copy_from_slice(&encode_text(&self.name, 14));
        set_gps_entry_valid(image, index, true);
        Ok(())
    }
}

pub fn gps_entry_valid(image: &MemoryImage, index: usize) -> bool {
    valid_bit(index).is_some_and(|(offset, mask)| image.u8(offset) & mask != 0)
}

pub fn set_gps_entry_valid(image: &mut MemoryImage, index: usize, valid: bool) -> bool {
    let Some((offset, mask)) = valid_bit(index) else {
        return false;
    };
    let byte = image.u8(offset);
    image.set_u8(offset, if valid { byte | mask } else { byte & !mask });
    true
}
