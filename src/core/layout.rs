//! Absolute offsets and sizes of every block in the memory image.
//!
//! Multi-byte words are big-endian except the channel-validity bitmap, which
//! stores ten little-endian 64-bit words.

/// Total image length in bytes.
pub const IMAGE_SIZE: usize = 0xC000;

/// Transfer page size.
pub const PAGE_SIZE: usize = 0x1000;

/// Pages in one image.
pub const PAGE_COUNT: usize = IMAGE_SIZE / PAGE_SIZE;

pub const DEVICE_INFO: usize = 0x0000;
pub const DEVICE_INFO_LEN: usize = 0x80;

pub const CHANNELS: usize = 0x0080;
pub const CHANNEL_LEN: usize = 48;
pub const CHANNEL_COUNT: usize = 640;

pub const VFOS: usize = 0x7900;
pub const VFO_COUNT: usize = 2;

pub const SETTINGS: usize = 0x7980;
pub const SETTINGS_LEN: usize = 0x80;

pub const CHANNEL_VALID: usize = 0x7A20;
pub const CHANNEL_VALID_WORDS: usize = 10;

pub const ZONE_TOTAL: usize = 0x7A80;
pub const ZONES: usize = 0x7A90;
pub const ZONE_LEN: usize = 152;
pub const ZONE_COUNT: usize = 10;
pub const ZONE_SLOTS: usize = 64;
/// Zone record: `chn_num` at 0, 64 big-endian ids at 2, name at 136.
pub const ZONE_CHN_NUM: usize = 0;
pub const ZONE_IDS: usize = 2;
pub const ZONE_NAME: usize = 136;
pub const ZONE_NAME_LEN: usize = 16;
/// Empty zone slot.
pub const ZONE_SENTINEL: u16 = 0xFFFF;

pub const SCAN_RANGES: usize = 0x8100;
pub const SCAN_RANGE_COUNT: usize = 10;
pub const SCAN_DATA: usize = 0x8180;
pub const SCAN_ADD: usize = 0x81A0;
pub const SCAN_ADD_LEN: usize = 80;
/// Highest scan-list number a channel may reference.
pub const MAX_SCAN_LIST: u8 = 16;

pub const DTMF_SYS: usize = 0x8200;
pub const DTMF_USE_FLAGS: usize = 0x8258;
pub const DTMF_ENC_TABLE: usize = 0x8260;
pub const DTMF_CODE_COUNT: usize = 16;
pub const DTMF_CODE_LEN: usize = 16;

pub const TWO_TONE_INFO: usize = 0x8400;
pub const TWO_TONE_ENC: usize = 0x8410;
pub const TWO_TONE_COUNT: usize = 16;
pub const TWO_TONE_ENTRY_LEN: usize = 16;
pub const TWO_TONE_DEC: usize = 0x8510;

pub const FIVE_TONE_ENC: usize = 0x8680;
pub const FIVE_TONE_COUNT: usize = 104;

pub const MDC_COUNT: usize = 100;

pub const EMERGENCY: usize = 0x9D08;
pub const EMERGENCY_COUNT: u8 = 8;
/// Highest emergency-system number a channel may reference.
pub const MAX_EMERGENCY_LIST: u8 = 10;

pub const APRS: usize = 0x9E00;

pub const GPS_VALID: usize = 0xA000;
pub const GPS_VALID_LEN: usize = 10;
pub const GPS_BOOK: usize = 0xA010;
pub const GPS_BOOK_COUNT: usize = 100;
pub const GPS_ENTRY_LEN: usize = 16;

/// Offset of the 48-byte record for 1-based channel `n`.
pub const fn channel_offset(n: u16) -> usize {
    CHANNELS + CHANNEL_LEN * (n as usize - 1)
}

pub const fn vfo_offset(index: usize) -> usize {
    VFOS + CHANNEL_LEN * index
}

pub const fn zone_offset(zone: usize) -> usize {
    ZONES + ZONE_LEN * zone
}
