//! Named field descriptors for the fixed-layout blocks.
//!
//! Each block (settings, scan, DTMF, APRS, ...) is described by a static table
//! of [`Field`]s with offsets relative to the block start. Reads produce a
//! [`SettingValue`]; writes validate the value completely before touching the
//! image.

use super::bitfield::BitField;
use super::freq::{decode_freq, encode_freq, format_mhz, parse_mhz};
use super::image::MemoryImage;
use super::text::{decode_text, encode_text};
use super::tone::{decode_tone, encode_tone, Tone};
use crate::error::{constants, CodeplugError, Result};
use std::fmt;

/// Characters allowed in passwords.
pub const DIGITS: &str = "0123456789";
/// Characters a DTMF code may contain.
pub const DTMF_CHARS: &str = "0123456789ABCD*#";

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Tone(Tone),
    /// Channel numbers, e.g. a zone's members.
    List(Vec<u16>),
}

impl SettingValue {
    /// `Bool`, or `Int` 0/1.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            SettingValue::Bool(b) => Ok(*b),
            SettingValue::Int(0) => Ok(false),
            SettingValue::Int(1) => Ok(true),
            _ => Err(CodeplugError::InvalidValue(
                constants::ERR_EXPECTED_BOOL.into(),
            )),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            SettingValue::Int(v) => Ok(*v),
            SettingValue::Bool(b) => Ok(i64::from(*b)),
            _ => Err(CodeplugError::InvalidValue(constants::ERR_EXPECTED_INT.into())),
        }
    }

    pub fn as_text(&self) -> Result<&str> {
        match self {
            SettingValue::Text(s) => Ok(s),
            _ => Err(CodeplugError::InvalidValue(
                constants::ERR_EXPECTED_TEXT.into(),
            )),
        }
    }

    /// `Tone`, or its text form.
    pub fn as_tone(&self) -> Result<Tone> {
        match self {
            SettingValue::Tone(t) => Ok(*t),
            SettingValue::Text(s) => s.parse(),
            _ => Err(CodeplugError::InvalidValue(
                constants::ERR_EXPECTED_TONE.into(),
            )),
        }
    }

    /// Hz as `Int`, or MHz text such as `446.00625`.
    pub fn as_freq(&self) -> Result<u64> {
        match self {
            SettingValue::Int(v) => u64::try_from(*v).map_err(|_| CodeplugError::OutOfRange {
                what: "frequency",
                value: *v,
            }),
            SettingValue::Text(s) => parse_mhz(s),
            _ => Err(CodeplugError::InvalidValue(constants::ERR_EXPECTED_INT.into())),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{b}"),
            SettingValue::Int(v) => write!(f, "{v}"),
            SettingValue::Text(s) => write!(f, "{s}"),
            SettingValue::Tone(t) => write!(f, "{t}"),
            SettingValue::List(items) => {
                let parts: Vec<String> = items.iter().map(u16::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        SettingValue::Bool(v)
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        SettingValue::Int(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::Text(v.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        SettingValue::Text(v)
    }
}

impl From<Tone> for SettingValue {
    fn from(v: Tone) -> Self {
        SettingValue::Tone(v)
    }
}

/// Storage format of a field. Offsets are relative to the block start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole byte limited to `min..=max`.
    Byte { offset: usize, min: u8, max: u8 },
    /// Sub-byte integer limited to `max` (never above the field width).
    Bits { field: BitField, max: u8 },
    Flag(BitField),
    /// Big-endian `u16` limited to `max`.
    Word { offset: usize, max: u16 },
    /// Big-endian `i32`.
    Signed { offset: usize },
    /// BCD frequency word.
    Freq { offset: usize },
    /// Tone pair, high byte first.
    Tone { offset: usize },
    /// GB2312 text, NUL padded.
    Text { offset: usize, len: usize },
    /// Printable ASCII, NUL padded.
    Ascii { offset: usize, len: usize },
    /// Characters from `charset`, `0xFF` padded.
    Dialled {
        offset: usize,
        len: usize,
        charset: &'static str,
    },
    /// ASCII text whose length is also stored at `count`.
    CountedText {
        offset: usize,
        len: usize,
        count: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn byte(name: &'static str, offset: usize) -> Self {
        Self::range(name, offset, 0, u8::MAX)
    }

    pub const fn range(name: &'static str, offset: usize, min: u8, max: u8) -> Self {
        Self {
            name,
            kind: FieldKind::Byte { offset, min, max },
        }
    }

    pub const fn bits(name: &'static str, field: BitField) -> Self {
        Self {
            name,
            kind: FieldKind::Bits {
                field,
                max: field.max(),
            },
        }
    }

    pub const fn bits_max(name: &'static str, field: BitField, max: u8) -> Self {
        Self {
            name,
            kind: FieldKind::Bits { field, max },
        }
    }

    pub const fn flag(name: &'static str, offset: usize, bit: u8) -> Self {
        Self {
            name,
            kind: FieldKind::Flag(BitField::flag(offset, bit)),
        }
    }

    pub const fn word(name: &'static str, offset: usize, max: u16) -> Self {
        Self {
            name,
            kind: FieldKind::Word { offset, max },
        }
    }

    pub const fn signed(name: &'static str, offset: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Signed { offset },
        }
    }

    pub const fn freq(name: &'static str, offset: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Freq { offset },
        }
    }

    pub const fn tone(name: &'static str, offset: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Tone { offset },
        }
    }

    pub const fn text(name: &'static str, offset: usize, len: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Text { offset, len },
        }
    }

    pub const fn ascii(name: &'static str, offset: usize, len: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Ascii { offset, len },
        }
    }

    pub const fn dialled(
        name: &'static str,
        offset: usize,
        len: usize,
        charset: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Dialled {
                offset,
                len,
                charset,
            },
        }
    }

    pub const fn counted_text(name: &'static str, offset: usize, len: usize, count: usize) -> Self {
        Self {
            name,
            kind: FieldKind::CountedText { offset, len, count },
        }
    }

    /// Decode this field from the block at `base`.
    pub fn read(&self, image: &MemoryImage, base: usize) -> SettingValue {
        match self.kind {
            FieldKind::Byte { offset, .. } => SettingValue::Int(i64::from(image.u8(base + offset))),
            FieldKind::Bits { field, .. } => SettingValue::Int(i64::from(image.bits(field.at(base)))),
            FieldKind::Flag(field) => SettingValue::Bool(image.flag(field.at(base))),
            FieldKind::Word { offset, .. } => {
                SettingValue::Int(i64::from(image.u16_be(base + offset)))
            }
            FieldKind::Signed { offset } => SettingValue::Int(i64::from(image.i32_be(base + offset))),
            FieldKind::Freq { offset } => {
                SettingValue::Int(decode_freq(image.u32_be(base + offset)) as i64)
            }
            FieldKind::Tone { offset } => SettingValue::Tone(decode_tone(
                image.u8(base + offset),
                image.u8(base + offset + 1),
            )),
            FieldKind::Text { offset, len } => {
                SettingValue::Text(decode_text(image.slice(base + offset, len)))
            }
            FieldKind::Ascii { offset, len }
            | FieldKind::Dialled { offset, len, .. }
            | FieldKind::CountedText { offset, len, .. } => {
                SettingValue::Text(decode_ascii(image.slice(base + offset, len)))
            }
        }
    }

    /// Encode `value` into the block at `base`. The image is unchanged on error.
    pub fn write(&self, image: &mut MemoryImage, base: usize, value: &SettingValue) -> Result<()> {
        match self.kind {
            FieldKind::Byte { offset, min, max } => {
                let v = self.check(value.as_int()?, i64::from(min), i64::from(max))?;
                image.set_u8(base + offset, v as u8);
            }
            FieldKind::Bits { field, max } => {
                let v = self.check(value.as_int()?, 0, i64::from(max))?;
                image.set_bits(field.at(base), v as u8);
            }
            FieldKind::Flag(field) => image.set_flag(field.at(base), value.as_bool()?),
            FieldKind::Word { offset, max } => {
                let v = self.check(value.as_int()?, 0, i64::from(max))?;
                image.set_u16_be(base + offset, v as u16);
            }
            FieldKind::Signed { offset } => {
                let v = self.check(value.as_int()?, i64::from(i32::MIN), i64::from(i32::MAX))?;
                image.set_i32_be(base + offset, v as i32);
            }
            FieldKind::Freq { offset } => {
                image.set_u32_be(base + offset, encode_freq(value.as_freq()?)?);
            }
            FieldKind::Tone { offset } => {
                let (h, l) = encode_tone(value.as_tone()?)?;
                image.set_u8(base + offset, h);
                image.set_u8(base + offset + 1, l);
            }
            FieldKind::Text { offset, len } => {
                let field = encode_text(value.as_text()?, len);
                image.slice_mut(base + offset, len).copy_from_slice(&field);
            }
            FieldKind::Ascii { offset, len } => {
                let field = encode_ascii(self.name, value.as_text()?, len, 0x00)?;
                image.slice_mut(base + offset, len).copy_from_slice(&field);
            }
            FieldKind::Dialled {
                offset,
                len,
                charset,
            } => {
                let text = value.as_text()?.trim().to_ascii_uppercase();
                if let Some(bad) = text.chars().find(|c| !charset.contains(*c)) {
                    return Err(CodeplugError::InvalidValue(format!(
                        "{}: '{bad}' is not allowed",
                        self.name
                    )));
                }
                let field = encode_ascii(self.name, &text, len, 0xFF)?;
                image.slice_mut(base + offset, len).copy_from_slice(&field);
            }
            FieldKind::CountedText { offset, len, count } => {
                let text = value.as_text()?;
                let field = encode_ascii(self.name, text, len, 0x00)?;
                image.slice_mut(base + offset, len).copy_from_slice(&field);
                image.set_u8(base + count, text.len() as u8);
            }
        }
        Ok(())
    }

    fn check(&self, value: i64, min: i64, max: i64) -> Result<i64> {
        if value < min || value > max {
            return Err(CodeplugError::OutOfRange {
                what: self.name,
                value,
            });
        }
        Ok(value)
    }

    /// Human-readable rendering, frequencies as MHz.
    pub fn display(&self, image: &MemoryImage, base: usize) -> String {
        match (self.kind, self.read(image, base)) {
            (FieldKind::Freq { .. }, SettingValue::Int(hz)) => format_mhz(hz as u64),
            (_, value) => value.to_string(),
        }
    }
}

/// Look `name` up in a field table.
pub fn find<'a>(table: &'a [Field], name: &str) -> Option<&'a Field> {
    table.iter().find(|f| f.name == name)
}

/// Bytes up to the first NUL or `0xFF`, non-printable bytes dropped.
pub fn decode_ascii(field: &[u8]) -> String {
    field
        .iter()
        .take_while(|&&b| b != 0x00 && b != 0xFF)
        .filter(|b| b.is_ascii_graphic() || **b == b' ')
        .map(|&b| char::from(b))
        .collect()
}

fn encode_ascii(name: &str, text: &str, len: usize, pad: u8) -> Result<Vec<u8>> {
    if !text.is_ascii() {
        return Err(CodeplugError::InvalidValue(format!(
            "{name}: only ASCII is allowed"
        )));
    }
    if text.len() > len {
        return Err(CodeplugError::InvalidValue(format!(
            "{name}: at most {len} characters"
        )));
    }
    let mut out = text.as_bytes().to_vec();
    out.resize(len, pad);
    Ok(out)
}
