//! Timing constants for the clone-mode session.

use std::time::Duration;

/// Per-poll read timeout while waiting for the wake acknowledgment.
pub const HANDSHAKE_POLL_TIMEOUT: Duration = Duration::from_millis(500);

/// Pause between wake polls.
pub const HANDSHAKE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Wake polls before escalating the baud rate.
pub const HANDSHAKE_POLLS: u32 = 10;

/// Read timeout for one 4,100-byte page response.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(4);

/// Sleep after a failed page read.
pub const PAGE_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Retries after the first page read attempt.
pub const PAGE_RETRIES: u32 = 3;

/// Baud rate the port is opened at.
pub const INITIAL_BAUD_RATE: u32 = 38_400;

/// Baud rate tried once when the radio stays silent.
pub const ESCALATION_BAUD_RATE: u32 = 115_200;
