//! Scripted in-memory transport.
//!
//! Each `read` consumes the next queued [`Reply`]. A data reply longer than the
//! requested length is split and the remainder stays at the front of the
//! queue. An exhausted queue behaves like a silent radio.

use super::Transport;
use crate::error::{CodeplugError, Result};
use std::collections::VecDeque;
use std::time::Duration;

/// One scripted response to a `read` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Data(Vec<u8>),
    /// The read times out with nothing received.
    Silence,
    /// The read fails with a transport error.
    Fail(String),
}

#[derive(Debug)]
pub struct ScriptedTransport {
    replies: VecDeque<Reply>,
    writes: Vec<Vec<u8>>,
    reads: usize,
    timeout: Duration,
    baud_rate: u32,
    baud_history: Vec<u32>,
}

impl ScriptedTransport {
    pub fn new(baud_rate: u32) -> Self {
        Self {
            replies: VecDeque::new(),
            writes: Vec::new(),
            reads: 0,
            timeout: Duration::from_secs(1),
            baud_rate,
            baud_history: vec![baud_rate],
        }
    }

    /// Queue a data reply.
    pub fn reply(&mut self, data: impl Into<Vec<u8>>) -> &mut Self {
        self.replies.push_back(Reply::Data(data.into()));
        self
    }

    /// Queue a silent read.
    pub fn silence(&mut self) -> &mut Self {
        self.replies.push_back(Reply::Silence);
        self
    }

    pub fn fail(&mut self, msg: impl Into<String>) -> &mut Self {
        self.replies.push_back(Reply::Fail(msg.into()));
        self
    }

    pub fn push(&mut self, reply: Reply) -> &mut Self {
        self.replies.push_back(reply);
        self
    }

    /// Every frame written so far, in order.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// Number of `read` calls made.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Baud rates applied, starting with the initial one.
    pub fn baud_history(&self) -> &[u32] {
        &self.baud_history
    }

    pub fn pending(&self) -> usize {
        self.replies.len()
    }
}

impl Transport for ScriptedTransport {
    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        self.reads += 1;
        match self.replies.pop_front() {
            None | Some(Reply::Silence) => Ok(Vec::new()),
            Some(Reply::Fail(msg)) => Err(CodeplugError::TransportError(msg)),
            Some(Reply::Data(mut data)) => {
                if data.len() > n {
                    let rest = data.split_off(n);
                    self.replies.push_front(Reply::Data(rest));
                }
                Ok(data)
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writes.push(data.to_vec());
        Ok(())
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.timeout = timeout;
        Ok(())
    }

    fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn set_baud_rate(&mut self, baud: u32) -> Result<()> {
        self.baud_rate = baud;
        self.baud_history.push(baud);
        Ok(())
    }
}
