//! # Radio Codeplug
//!
//! Clone-mode programming for Baofeng 5RH-Pro class handheld radios.
//!
//! The crate talks to the radio over any blocking byte transport, downloads
//! and uploads its 49,152-byte memory image, and gives typed access to the
//! channels, zones and settings stored inside it.
//!
//! ## Layers
//! - [`transport`]: the blocking serial channel the session drives
//! - [`protocol`]: wake, authentication, paged read/write, finalize
//! - [`core`]: the memory image codec and the zone consistency engine
//! - [`service`]: [`Codeplug`] editing and the [`Radio`] download/upload facade
//! - [`config`], [`error`], [`utils`]: configuration, errors, logging, metrics
//!
//! ## Example
//! ```rust,no_run
//! use radio_codeplug::core::channel::Channel;
//! use radio_codeplug::core::fields::SettingValue;
//! use radio_codeplug::protocol::NoProgress;
//! use radio_codeplug::transport::ScriptedTransport;
//! use radio_codeplug::{Radio, SessionConfig};
//!
//! # fn main() -> radio_codeplug::Result<()> {
//! let port = ScriptedTransport::new(38_400);
//! let mut radio = Radio::new(port, SessionConfig::default());
//!
//! let mut codeplug = radio.download(&mut NoProgress)?;
//! codeplug.set_channel(1, &Channel::simplex("Calling", 446_000_000))?;
//! codeplug.set("settings.squelch_level", SettingValue::Int(3))?;
//! radio.upload(&mut codeplug, &mut NoProgress)?;
//! # Ok(())
//! # }
//! ```
//!
//! The wire obfuscation is a single-byte XOR. It keeps the radio talking; it
//! protects nothing.

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use config::{CodeplugConfig, SessionConfig};
pub use error::{CodeplugError, Result};
pub use service::{Codeplug, Radio};
