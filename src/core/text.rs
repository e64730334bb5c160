//! Fixed-width GB2312 text fields.
//!
//! The radio stores names in GB2312. Decoding goes through the GBK superset,
//! which accepts every GB2312 sequence.

use crate::utils::metrics::global_metrics;
use encoding_rs::GBK;
use tracing::warn;

/// Decode a fixed-width field.
///
/// Stops at the first NUL or `0xFF` (erased flash), decodes lossily and trims
/// trailing whitespace.
pub fn decode_text(field: &[u8]) -> String {
    let end = field
        .iter()
        .position(|&b| b == 0x00 || b == 0xFF)
        .unwrap_or(field.len());
    let (text, had_errors) = GBK.decode_without_bom_handling(&field[..end]);
    if had_errors {
        warn!(bytes = ?&field[..end], "Undecodable text replaced");
        global_metrics().decode_warning();
    }
    text.trim_end().to_string()
}

/// Encode `text` into a field of `width` bytes, NUL padded.
///
/// Falls back to ASCII with `?` for unmappable characters. Never splits a
/// multi-byte character.
pub fn encode_text(text: &str, width: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(width);
    let (encoded, _, unmappable) = GBK.encode(text);
    if unmappable {
        warn!(text, "Text not representable in GB2312, using ASCII replacement");
        for ch in text.chars() {
            if out.len() >= width {
                break;
            }
            out.push(if ch.is_ascii() { ch as u8 } else { b'?' });
        }
    } else {
        // GBK lead bytes are >= 0x81 and always followed by one trail byte.
        let bytes = encoded.as_ref();
        let mut i = 0;
        while i < bytes.len() {
            let len = if bytes[i] >= 0x81 { 2 } else { 1 };
            if out.len() + len > width {
                break;
            }
            out.extend_from_slice(&bytes[i..i + len]);
            i += len;
        }
    }
    out.resize(width, 0x00);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_terminators() {
        assert_eq!(decode_text(b"CH1\0garbage\0\0\0\0\0"), "CH1");
        assert_eq!(decode_text(&[b'A', b'B', 0xFF, 0xFF]), "AB");
        assert_eq!(decode_text(b"Zone 1   \0\0\0\0\0\0\0"), "Zone 1");
        assert_eq!(decode_text(&[0xFF; 16]), "");
    }

    #[test]
    fn chinese_round_trip() {
        let field = encode_text("中文", 16);
        assert_eq!(field.len(), 16);
        assert_eq!(&field[..4], &[0xD6, 0xD0, 0xCE, 0xC4]);
        assert_eq!(decode_text(&field), "中文");
    }

    #[test]
    fn truncates_on_character_boundary() {
        // three 2-byte characters do not fit in 5 bytes
        let field = encode_text("中文字", 5);
        assert_eq!(&field[..4], &[0xD6, 0xD0, 0xCE, 0xC4]);
        assert_eq!(field[4], 0);
        assert_eq!(encode_text("ABCDEFGHIJKLMNOPQR", 16), b"ABCDEFGHIJKLMNOP".to_vec());
    }

    #[test]
    fn ascii_fallback() {
        let field = encode_text("\u{1F600}-1", 8);
        assert_eq!(&field[..3], b"?-1");
    }

    #[test]
    fn lossy_decode() {
        // lone lead byte
        assert_eq!(decode_text(&[b'A', 0x81]), "A\u{FFFD}");
    }
}
