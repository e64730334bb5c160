//! # Transport Layer
//!
//! Byte-level serial channel abstraction.
//!
//! Opening and closing the port is the host's business. The session only needs
//! blocking reads with a timeout, writes, and the ability to change the
//! timeout and baud rate between phases.
//!
//! ## Components
//! - **Transport**: the trait the session drives
//! - **ScriptedTransport**: in-memory double that replays queued replies and
//!   records every write

use crate::error::{CodeplugError, Result};
use std::time::Duration;

pub mod scripted;

pub use scripted::{Reply, ScriptedTransport};

/// Blocking duplex byte stream with a settable timeout and baud rate.
pub trait Transport {
    /// Read up to `n` bytes, blocking until `n` arrive or the timeout elapses.
    /// An empty vector means nothing arrived.
    fn read(&mut self, n: usize) -> Result<Vec<u8>>;

    /// Write all of `data`.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    fn timeout(&self) -> Duration;

    fn set_timeout(&mut self, timeout: Duration) -> Result<()>;

    fn baud_rate(&self) -> u32;

    fn set_baud_rate(&mut self, baud: u32) -> Result<()>;

    /// Read exactly `n` bytes; anything shorter is [`CodeplugError::ShortRead`].
    fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let data = self.read(n)?;
        if data.len() != n {
            return Err(CodeplugError::ShortRead {
                expected: n,
                actual: data.len(),
            });
        }
        Ok(data)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        (**self).read(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn timeout(&self) -> Duration {
        (**self).timeout()
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        (**self).set_timeout(timeout)
    }

    fn baud_rate(&self) -> u32 {
        (**self).baud_rate()
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        (**self).set_baud_rate(baud)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        (**self).read(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn timeout(&self) -> Duration {
        (**self).timeout()
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        (**self).set_timeout(timeout)
    }

    fn baud_rate(&self) -> u32 {
        (**self).baud_rate()
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        (**self).set_baud_rate(baud)
    }
}
