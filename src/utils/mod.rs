//! # Utility Modules
//!
//! Supporting utilities for obfuscation, retries, logging, and timing.
//!
//! ## Components
//! - **Cipher**: single-byte XOR seed cipher and seed policy
//! - **Retry**: bounded `attempt` combinator used for polling and page reads
//! - **Logging**: `tracing-subscriber` setup from [`LoggingConfig`](crate::config::LoggingConfig)
//! - **Timeout**: default timing constants for the clone-mode session
//! - **Metrics**: atomic session counters

pub mod cipher;
pub mod logging;
pub mod metrics;
pub mod retry;
pub mod timeout;

pub use cipher::{SeedCipher, SeedPolicy};
pub use retry::{attempt, Attempt, RetryPolicy};
