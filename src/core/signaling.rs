//! DTMF and two-tone signalling tables.

use super::fields::{decode_ascii, Field, DTMF_CHARS};
use super::image::MemoryImage;
use super::layout::{
    DTMF_CODE_COUNT, DTMF_CODE_LEN, DTMF_ENC_TABLE, DTMF_USE_FLAGS, TWO_TONE_COUNT,
    TWO_TONE_ENC, TWO_TONE_ENTRY_LEN,
};
use super::text::{decode_text, encode_text};
use crate::error::{CodeplugError, Result};

/// DTMF system block, relative to [`DTMF_SYS`](super::layout::DTMF_SYS).
pub const DTMF_FIELDS: &[Field] = &[
    Field::range("enable", 0, 0, 1),
    Field::range("code_speed", 1, 0, 9),
    Field::byte("first_code_time", 2),
    Field::byte("pre_time", 3),
    Field::byte("code_delay", 4),
    Field::byte("ptt_id_pause", 5),
    Field::range("side_tone", 6, 0, 1),
    Field::byte("reset_time", 7),
    Field::byte("separator", 8),
    Field::byte("group_code", 9),
    Field::byte("decode_response", 10),
    Field::dialled("id", 16, 3, DTMF_CHARS),
    Field::dialled("bot", 24, 16, DTMF_CHARS),
    Field::dialled("eot", 40, 16, DTMF_CHARS),
    Field::dialled("stun", 56, 16, DTMF_CHARS),
    Field::dialled("kill", 72, 16, DTMF_CHARS),
];

/// Encode-table entry `index`, relative to its slot.
pub const DTMF_CODE_FIELD: Field = Field::dialled("code", 0, DTMF_CODE_LEN, DTMF_CHARS);

pub const fn dtmf_code_offset(index: usize) -> usize {
    DTMF_ENC_TABLE + index * DTMF_CODE_LEN
}

/// Two-tone list entry, relative to [`two_tone_offset`]. Tones are in tenths of a hertz.
pub const TWO_TONE_FIELDS: &[Field] = &[
    Field::word("freq1", 0, u16::MAX),
    Field::word("freq2", 2, u16::MAX),
    Field::text("name", 4, 12),
];

pub const fn two_tone_offset(index: usize) -> usize {
    TWO_TONE_ENC + index * TWO_TONE_ENTRY_LEN
}

fn check_index(what: &'static str, index: usize, count: usize) -> Result<()> {
    if index >= count {
        return Err(CodeplugError::OutOfRange {
            what,
            value: index as i64,
        });
    }
    Ok(())
}

/// Encode-table entry `index` when it is in use.
pub fn dtmf_code(image: &MemoryImage, index: usize) -> Option<String> {
    if index >= DTMF_CODE_COUNT {
        return None;
    }
    // bit i clear = entry used
    if image.u16_be(DTMF_USE_FLAGS) & (1 << index) != 0 {
        return None;
    }
    Some(decode_ascii(image.slice(dtmf_code_offset(index), DTMF_CODE_LEN)))
}

/// Store a code and mark the entry used, or clear it with `None`.
pub fn set_dtmf_code(image: &mut MemoryImage, index: usize, code: Option<&str>) -> Result<()> {
    check_index("DTMF code index", index, DTMF_CODE_COUNT)?;
    let flags = image.u16_be(DTMF_USE_FLAGS);
    match code {
        Some(code) if !code.trim().is_empty() => {
            DTMF_CODE_FIELD.write(image, dtmf_code_offset(index), &code.into())?;
            image.set_u16_be(DTMF_USE_FLAGS, flags & !(1 << index));
        }
        _ => {
            image.fill(dtmf_code_offset(index), DTMF_CODE_LEN, 0xFF);
            image.set_u16_be(DTMF_USE_FLAGS, flags | (1 << index));
        }
    }
    Ok(())
}

/// One two-tone encode entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TwoTone {
    /// Tenths of a hertz.
    pub freq1: u16,
    pub freq2: u16,
    pub name: String,
}

impl TwoTone {
    pub fn read(image: &MemoryImage, index: usize) -> Option<Self> {
        if index >= TWO_TONE_COUNT {
            return None;
        }
        let base = two_tone_offset(index);
        Some(Self {
            freq1: image.u16_be(base),
            freq2: image.u16_be(base + 2),
            name: decode_text(image.slice(base + 4, 12)),
        })
    }

    pub fn write(&self, image: &mut MemoryImage, index: usize) -> Result<()> {
        check_index("two-tone index", index, TWO_TONE_COUNT)?;
        let base = two_tone_offset(index);
        image.set_u16_be(base, self.freq1);
        image.set_u16_be(base + 2, self.freq2);
        image
            .slice_mut(base + 4, 12)
            .copy_from_slice(&encode_text(&self.name, 12));
        Ok(())
    }
}
