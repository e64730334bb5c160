//! CTCSS / DCS tone codec.
//!
//! A tone is stored as a byte pair `(h, l)`:
//!
//! ```text
//! (0, 0)             no tone
//! h bit 7 clear      CTCSS: h = hundreds|tens, l = ones|tenths (BCD nibbles)
//! h bit 7 set        DCS:   h bit 6 = inverted, h bits 0-2 = hundreds,
//!                           l = tens|ones (BCD nibbles)
//! ```

use crate::error::{CodeplugError, Result};
use crate::utils::metrics::global_metrics;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Standard CTCSS tones in tenths of a hertz.
pub const CTCSS_TONES: [u16; 50] = [
    670, 693, 719, 744, 770, 797, 825, 854, 885, 915, 948, 974, 1000, 1035, 1072, 1109, 1148,
    1188, 1230, 1273, 1318, 1365, 1413, 1462, 1514, 1567, 1598, 1622, 1655, 1679, 1713, 1738,
    1773, 1799, 1835, 1862, 1899, 1928, 1966, 1995, 2035, 2065, 2107, 2181, 2257, 2291, 2336,
    2418, 2503, 2541,
];

/// Canonical DCS codes, ascending.
pub const DCS_CODES: [u16; 104] = [
    23, 25, 26, 31, 32, 36, 43, 47, 51, 53, 54, 65, 71, 72, 73, 74, 114, 115, 116, 122, 125, 131,
    132, 134, 143, 145, 152, 155, 156, 162, 165, 172, 174, 205, 212, 223, 225, 226, 243, 244, 245,
    246, 251, 252, 255, 261, 263, 265, 266, 271, 274, 306, 311, 315, 325, 331, 332, 343, 346, 351,
    356, 364, 365, 371, 411, 412, 413, 423, 431, 432, 445, 446, 452, 454, 455, 462, 464, 465, 466,
    503, 506, 516, 523, 526, 532, 546, 565, 606, 612, 624, 627, 631, 632, 654, 662, 664, 703, 712,
    723, 731, 732, 734, 743, 754,
];

/// Highest CTCSS value the BCD layout can carry with bit 7 of `h` clear.
pub const MAX_CTCSS_DECIHZ: u16 = 7999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    #[default]
    None,
    /// CTCSS frequency in tenths of a hertz (885 = 88.5 Hz).
    Ctcss(u16),
    /// DCS code written in octal-looking decimal digits (23 = D023).
    Dcs { code: u16, inverted: bool },
}

impl Tone {
    pub fn is_none(&self) -> bool {
        matches!(self, Tone::None)
    }
}

/// Decode a stored pair. Unknown DCS codes snap to the nearest canonical code.
pub fn decode_tone(h: u8, l: u8) -> Tone {
    if h == 0 && l == 0 {
        return Tone::None;
    }
    if h & 0x80 != 0 {
        let raw = u16::from(h & 0x07) * 100 + u16::from(l >> 4) * 10 + u16::from(l & 0x0F);
        let code = if DCS_CODES.contains(&raw) {
            raw
        } else {
            let nearest = nearest_dcs(raw);
            warn!(code = raw, replacement = nearest, "Invalid DCS code replaced with closest valid code");
            global_metrics().decode_warning();
            nearest
        };
        return Tone::Dcs {
            code,
            inverted: h & 0x40 != 0,
        };
    }
    let digits = [h >> 4, h & 0x0F, l >> 4, l & 0x0F];
    if digits.iter().any(|d| *d > 9) {
        warn!(h, l, "CTCSS tone has non-decimal BCD digits");
        global_metrics().decode_warning();
    }
    let value = digits
        .iter()
        .fold(0u16, |acc, d| acc * 10 + u16::from(*d));
    Tone::Ctcss(value)
}

/// Encode a tone. DCS codes must be canonical and CTCSS must fit the BCD layout.
pub fn encode_tone(tone: Tone) -> Result<(u8, u8)> {
    match tone {
        Tone::None => Ok((0, 0)),
        Tone::Ctcss(value) => {
            if value == 0 || value > MAX_CTCSS_DECIHZ {
                return Err(CodeplugError::OutOfRange {
                    what: "CTCSS tone",
                    value: i64::from(value),
                });
            }
            let hundreds = (value / 1000) as u8;
            let tens = (value / 100 % 10) as u8;
            let ones = (value / 10 % 10) as u8;
            let tenths = (value % 10) as u8;
            Ok(((hundreds << 4) | tens, (ones << 4) | tenths))
        }
        Tone::Dcs { code, inverted } => {
            if !DCS_CODES.contains(&code) {
                return Err(CodeplugError::InvalidValue(format!(
                    "DCS code D{code:03} is not a standard code"
                )));
            }
            let mut h = 0x80 | (code / 100) as u8 & 0x07;
            if inverted {
                h |= 0x40;
            }
            let l = (((code / 10 % 10) as u8) << 4) | (code % 10) as u8;
            Ok((h, l))
        }
    }
}

/// Closest canonical DCS code; ties go to the lower code.
pub fn nearest_dcs(code: u16) -> u16 {
    let mut best = DCS_CODES[0];
    for &candidate in DCS_CODES.iter() {
        if candidate.abs_diff(code) < best.abs_diff(code) {
            best = candidate;
        }
    }
    best
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Tone::None => write!(f, "None"),
            Tone::Ctcss(v) => write!(f, "{}.{}Hz", v / 10, v % 10),
            Tone::Dcs { code, inverted } => {
                write!(f, "D{:03}{}", code, if inverted { 'I' } else { 'N' })
            }
        }
    }
}

impl FromStr for Tone {
    type Err = CodeplugError;

    /// Accepts `None`, `88.5Hz`, `88.5`, `D023N`, `D023I` and `D023`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let bad = || CodeplugError::InvalidValue(format!("Invalid tone: {s}"));
        if s.is_empty() || s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("off") {
            return Ok(Tone::None);
        }
        if let Some(rest) = s.strip_prefix('D').or_else(|| s.strip_prefix('d')) {
            let (digits, inverted) = match rest.chars().last() {
                Some('I') | Some('i') | Some('R') | Some('r') => (&rest[..rest.len() - 1], true),
                Some('N') | Some('n') => (&rest[..rest.len() - 1], false),
                _ => (rest, false),
            };
            let code: u16 = digits.parse().map_err(|_| bad())?;
            return Ok(Tone::Dcs { code, inverted });
        }
        let number = s
            .strip_suffix("Hz")
            .or_else(|| s.strip_suffix("hz"))
            .unwrap_or(s)
            .trim();
        let (whole, frac) = number.split_once('.').unwrap_or((number, "0"));
        if frac.len() != 1 {
            return Err(bad());
        }
        let whole: u16 = whole.parse().map_err(|_| bad())?;
        let frac: u16 = frac.parse().map_err(|_| bad())?;
        whole
            .checked_mul(10)
            .and_then(|w| w.checked_add(frac))
            .map(Tone::Ctcss)
            .ok_or_else(bad)
    }
}
