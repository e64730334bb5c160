//! # Session Protocol
//!
//! Clone-mode exchange with the radio over a blocking [`Transport`](crate::transport::Transport).
//!
//! Everything after the wake packet is XOR-obfuscated with the session seed.
//! The session is synchronous: one transport, one phase at a time, and the
//! image is handed to the caller only after the transfer completes.
//!
//! ## Components
//! - **Command**: opcodes, constants and frame builders
//! - **Handshake**: greeting, program and password authentication, info query
//! - **Session**: state machine, paged read/write, finalize, progress reporting

pub mod command;
pub mod handshake;
pub mod session;

pub use handshake::DeviceInfo;
pub use session::{Direction, NoProgress, Progress, ProgressObserver, Session, SessionState};
