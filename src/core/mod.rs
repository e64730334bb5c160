//! # Memory Image Codec
//!
//! Typed access to the 49,152-byte clone image and the zone consistency engine.
//!
//! All accessors are pure functions of `(offset, width)` over one owned
//! [`MemoryImage`](image::MemoryImage). Nothing here talks to a radio.
//!
//! ## Components
//! - **Image**: the owned byte arena and its word/bitfield accessors
//! - **Layout**: absolute offsets of every block
//! - **Codecs**: BCD frequencies, CTCSS/DCS tones, GB2312 text
//! - **Records**: channels and VFOs, settings, scan, DTMF/two-tone, APRS/GPS, device header
//! - **Fields**: named field tables backing the dotted-path settings interface
//! - **Zones**: validity bitmap, zone tables and `normalize`
//!
//! ## Layout
//! ```text
//! 0x0000  device header        0x8100  scan ranges / options / scan-add
//! 0x0080  640 channels x 48    0x8200  DTMF system and encode table
//! 0x7900  2 VFOs x 48          0x8400  two-tone
//! 0x7980  settings             0x9E00  APRS
//! 0x7A20  validity bitmap      0xA000  GPS book
//! 0x7A80  zone table
//! ```

pub mod bitfield;
pub mod channel;
pub mod device;
pub mod fields;
pub mod freq;
pub mod image;
pub mod layout;
pub mod location;
pub mod scan;
pub mod settings;
pub mod signaling;
pub mod text;
pub mod tone;
pub mod zones;
