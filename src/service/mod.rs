//! # Service Layer
//!
//! What a programming application works with.
//!
//! ## Components
//! - **Codeplug**: a memory image plus its model variant, with channel, VFO
//!   and zone editing and raw image file I/O
//! - **Settings**: `get`/`set` by dotted path (`channel.12.rx_freq`,
//!   `settings.squelch_level`, `gps.3.name`, ...)
//! - **Radio**: download and upload over a transport

pub mod codeplug;
pub mod radio;
pub mod settings;

pub use codeplug::Codeplug;
pub use radio::Radio;
