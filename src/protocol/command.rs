//! Clone-mode command bytes and frame builders.
//!
//! ```text
//! wake       00 x12  FF FF FF FF              plain
//! program    "PROGRAM" seed                   plain
//! password   8 bytes (FF = none)              ^ seed
//! info       "INFORMATION"                    ^ seed, reply 16 bytes ^ seed
//! mode       'R' | 'W'                        ^ seed, reply 'A' ^ seed
//! page       cmd addr_hi addr_lo 00 [data]    cmd ^ seed, data ^ seed
//! end        "END\0"                          ^ seed
//! ```

use crate::core::layout::PAGE_SIZE;
use crate::utils::cipher::SeedCipher;
use bytes::{BufMut, BytesMut};

/// Wake-up packet sent at the start of the greeting.
pub const WAKE_PACKET: [u8; 16] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
];

/// Acknowledgment byte (obfuscated after the greeting).
pub const ACK: u8 = b'A';

pub const PROGRAM: &[u8; 7] = b"PROGRAM";
pub const INFORMATION: &[u8; 11] = b"INFORMATION";
pub const END: &[u8; 4] = b"END\0";

pub const READ: u8 = b'R';
pub const WRITE: u8 = b'W';

/// Echoed header in front of every read page.
pub const PAGE_HEADER_LEN: usize = 4;
/// Bytes returned for one read request.
pub const READ_RESPONSE_LEN: usize = PAGE_HEADER_LEN + PAGE_SIZE;

/// Length of the INFORMATION reply.
pub const INFO_LEN: usize = 16;
/// Offset of the frequency-band byte in the INFORMATION reply.
pub const INFO_FREQ_BAND: usize = 8;

pub const PASSWORD_LEN: usize = 8;
/// Password frame meaning "no password".
pub const NO_PASSWORD: [u8; PASSWORD_LEN] = [0xFF; PASSWORD_LEN];

/// `"PROGRAM"` followed by the seed byte in clear.
pub fn program_frame(seed: u8) -> [u8; 8] {
    let mut frame = [0u8; 8];
    frame[..7].copy_from_slice(PROGRAM);
    frame[7] = seed;
    frame
}

/// `[cmd ^ seed, addr_hi, addr_lo, 0]`.
pub fn page_header(cipher: &SeedCipher, cmd: u8, address: u16) -> [u8; PAGE_HEADER_LEN] {
    let [hi, lo] = address.to_be_bytes();
    [cipher.obfuscate(cmd), hi, lo, 0x00]
}

/// Request for the page at `address`.
pub fn read_request(cipher: &SeedCipher, address: u16) -> [u8; PAGE_HEADER_LEN] {
    page_header(cipher, READ, address)
}

/// Header and obfuscated payload as a single frame.
pub fn write_frame(cipher: &SeedCipher, address: u16, payload: &[u8]) -> BytesMut {
    let mut frame = BytesMut::with_capacity(PAGE_HEADER_LEN + payload.len());
    frame.put_slice(&page_header(cipher, WRITE, address));
    frame.extend(payload.iter().map(|&b| cipher.obfuscate(b)));
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_frame_carries_seed_in_clear() {
        assert_eq!(&program_frame(0x37), b"PROGRAM\x37");
    }

    #[test]
    fn read_request_layout() {
        let cipher = SeedCipher::new(0x37);
        assert_eq!(read_request(&cipher, 0xB000), [b'R' ^ 0x37, 0xB0, 0x00, 0x00]);
    }

    #[test]
    fn write_frame_layout() {
        let cipher = SeedCipher::new(0x0F);
        let frame = write_frame(&cipher, 0x1000, &[0x00, 0xF0]);
        assert_eq!(&frame[..], &[b'W' ^ 0x0F, 0x10, 0x00, 0x00, 0x0F, 0xFF]);
    }

    #[test]
    fn sizes() {
        assert_eq!(READ_RESPONSE_LEN, 4100);
        assert_eq!(WAKE_PACKET.iter().filter(|&&b| b == 0xFF).count(), 4);
    }
}
