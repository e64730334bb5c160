//! # Error Types
//!
//! Error handling for the clone-mode session and the codeplug codec.
//!
//! This module defines every error variant that can occur while talking to a
//! radio or editing its memory image, from low-level transport failures to
//! protocol rejections and out-of-range field values.
//!
//! ## Error Categories
//! - **Transport Errors**: serial I/O failures, short reads, timeouts
//! - **Protocol Errors**: no response to the wake packet, rejected authentication,
//!   failed page transfers, missing finalize acknowledgment
//! - **Codec Errors**: wrong image size, values outside a field's range, unknown
//!   setting paths
//! - **Configuration Errors**: invalid or unreadable configuration
//!
//! Decode anomalies (a DCS code missing from the canonical table, undecodable
//! text) are not errors. They are logged with `warn!` and replaced locally.
//!
//! ## Example Usage
//! ```rust
//! use radio_codeplug::error::{CodeplugError, Result};
//! use radio_codeplug::core::image::MemoryImage;
//!
//! fn load(bytes: Vec<u8>) -> Result<MemoryImage> {
//!     MemoryImage::from_bytes(bytes)
//! }
//!
//! match load(vec![0u8; 16]) {
//!     Err(CodeplugError::InvalidImageSize(len)) => assert_eq!(len, 16),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Handshake errors
    pub const ERR_PROGRAM_ACK: &str = "Radio rejected the PROGRAM command";
    pub const ERR_PASSWORD_ACK: &str = "Radio rejected the programming password";
    pub const ERR_INVALID_PASSWORD: &str = "Password must be at most 8 ASCII digits";

    /// Transfer errors
    pub const ERR_READ_ACK: &str = "Radio did not acknowledge read mode";
    pub const ERR_WRITE_ACK: &str = "Radio did not acknowledge write mode";
    pub const ERR_PAGE_ACK: &str = "Radio did not acknowledge page";

    /// Codec errors
    pub const ERR_READ_ONLY: &str = "Setting is read-only";
    pub const ERR_EXPECTED_BOOL: &str = "Expected a boolean value";
    pub const ERR_EXPECTED_INT: &str = "Expected an integer value";
    pub const ERR_EXPECTED_TEXT: &str = "Expected a text value";
    pub const ERR_EXPECTED_TONE: &str = "Expected a tone value";
}

// CodeplugError is the primary error type for all session and codec operations
#[derive(Error, Debug)]
pub enum CodeplugError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("Timeout occurred")]
    Timeout,

    #[error("Radio did not answer the wake packet")]
    NoResponse,

    #[error("Authentication rejected")]
    AuthRejected,

    #[error("Wrong programming password")]
    WrongPassword,

    #[error("Information query failed: expected 16 bytes, got {actual}")]
    InfoQueryFailed { actual: usize },

    #[error("Transfer failed at address {address:#06x}: {reason}")]
    TransferFailed { address: usize, reason: String },

    #[error("Transfer not finalized by the radio")]
    IncompleteTransfer,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Session not authenticated")]
    NotAuthenticated,

    #[error("Invalid image size: {0} bytes (expected 49152)")]
    InvalidImageSize(usize),

    #[error("{what} out of range: {value}")]
    OutOfRange { what: &'static str, value: i64 },

    #[error("Frequency {0} Hz is outside the radio's bands")]
    OutOfBand(u64),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CodeplugError {
    /// Whether a page read may be retried after this error.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CodeplugError::ShortRead { .. }
                | CodeplugError::Timeout
                | CodeplugError::Io(_)
                | CodeplugError::TransportError(_)
        )
    }
}

/// Type alias for Results using CodeplugError
pub type Result<T> = std::result::Result<T, CodeplugError>;
