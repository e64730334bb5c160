//! Frequency codec.
//!
//! A frequency is eight BCD digits `DDD.DDDDD` MHz packed into a 32-bit word.
//! The stored big-endian word has its bytes reversed relative to digit order,
//! so it is byte-swapped before the digits are read. `0xFFFFFFFF` means no
//! frequency. Resolution is 10 Hz.

use crate::error::{CodeplugError, Result};
use crate::utils::metrics::global_metrics;
use tracing::warn;

/// Stored value for "no frequency".
pub const NO_FREQ: u32 = 0xFFFF_FFFF;

/// Largest encodable frequency, 999.99999 MHz.
pub const MAX_FREQ_HZ: u64 = 999_999_990;

/// Hz per least significant digit.
pub const FREQ_STEP_HZ: u64 = 10;

/// Decode a stored word to Hz. Nibbles above 9 are logged and read as-is.
pub fn decode_freq(raw: u32) -> u64 {
    if raw == NO_FREQ {
        return 0;
    }
    let natural = raw.swap_bytes();
    if !is_valid_bcd(natural) {
        warn!(raw, "Frequency has non-decimal BCD digits");
        global_metrics().decode_warning();
    }
    let mut digits: u64 = 0;
    for i in (0..8).rev() {
        digits = digits * 10 + u64::from((natural >> (i * 4)) & 0x0F);
    }
    digits * FREQ_STEP_HZ
}

/// Encode Hz to a stored word, rounding to the nearest 10 Hz. 0 Hz encodes as [`NO_FREQ`].
pub fn encode_freq(hz: u64) -> Result<u32> {
    if hz == 0 {
        return Ok(NO_FREQ);
    }
    // anything past this rounds above MAX_FREQ_HZ
    if hz >= MAX_FREQ_HZ + FREQ_STEP_HZ / 2 {
        return Err(CodeplugError::OutOfRange {
            what: "frequency",
            value: i64::try_from(hz).unwrap_or(i64::MAX),
        });
    }
    let mut value = (hz + FREQ_STEP_HZ / 2) / FREQ_STEP_HZ;
    let mut natural: u32 = 0;
    for i in 0..8 {
        natural |= ((value % 10) as u32) << (i * 4);
        value /= 10;
    }
    Ok(natural.swap_bytes())
}

/// Every nibble is a decimal digit.
pub fn is_valid_bcd(word: u32) -> bool {
    (0..8).all(|i| (word >> (i * 4)) & 0x0F <= 9)
}

/// Format Hz as `MHz` with five decimals, e.g. `446.00625`.
pub fn format_mhz(hz: u64) -> String {
    format!("{}.{:05}", hz / 1_000_000, (hz % 1_000_000) / 10)
}

/// Parse `446.00625` (MHz) or a bare Hz integer.
pub fn parse_mhz(text: &str) -> Result<u64> {
    let text = text.trim();
    let bad = || CodeplugError::InvalidValue(format!("Invalid frequency: {text}"));
    match text.split_once('.') {
        None => text.parse::<u64>().map_err(|_| bad()),
        Some((mhz, frac)) => {
            if frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad());
            }
            let mhz: u64 = mhz.parse().map_err(|_| bad())?;
            let mut hz_frac: u64 = if frac.is_empty() {
                0
            } else {
                frac.parse().map_err(|_| bad())?
            };
            for _ in frac.len()..6 {
                hz_frac *= 10;
            }
            mhz.checked_mul(1_000_000)
                .and_then(|hz| hz.checked_add(hz_frac))
                .ok_or_else(bad)
        }
    }
}
