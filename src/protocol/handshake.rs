//! Clone-mode handshake.
//!
//! The four steps every session runs before touching memory:
//!
//! 1. **Greeting**: wake packet, raw `'A'` acknowledgment, one baud escalation
//! 2. **ProgramAuth**: `"PROGRAM"` plus the seed in clear
//! 3. **PasswordAuth**: eight obfuscated password bytes
//! 4. **InfoQuery**: model name and frequency band
//!
//! Each step is a free function over a [`Transport`] so the session can
//! sequence them and tests can drive them one at a time.

use crate::config::SessionConfig;
use crate::core::device::{ModelVariant, K6_MODEL};
use crate::error::{constants, CodeplugError, Result};
use crate::protocol::command::{
    program_frame, ACK, INFORMATION, INFO_FREQ_BAND, INFO_LEN, PASSWORD_LEN, WAKE_PACKET,
};
use crate::transport::Transport;
use crate::utils::cipher::SeedCipher;
use crate::utils::metrics::global_metrics;
use crate::utils::retry::{attempt, Attempt, RetryPolicy};
use tracing::{debug, info, instrument, warn};

/// What the radio reported during InfoQuery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Model name, up to the first `0xFF` or `0x00`.
    pub model: String,
    pub freq_band: u8,
    /// Seed the session was authenticated with.
    pub seed: u8,
}

impl DeviceInfo {
    pub fn is_k6(&self) -> bool {
        self.model == K6_MODEL
    }

    pub fn variant(&self) -> ModelVariant {
        ModelVariant::from_model(&self.model)
    }
}

/// Poll once for the raw wake acknowledgment.
fn poll_ack<T: Transport + ?Sized>(port: &mut T) -> Result<()> {
    match port.read(1)?.first() {
        Some(&ACK) => Ok(()),
        Some(&other) => {
            debug!(byte = other, "Unexpected byte while waiting for wake ack");
            Err(CodeplugError::Timeout)
        }
        None => Err(CodeplugError::Timeout),
    }
}

/// Send the wake packet and wait for `'A'`, escalating the baud rate once.
#[instrument(skip(port, config), fields(baud = port.baud_rate()))]
pub fn greet<T: Transport + ?Sized>(port: &mut T, config: &SessionConfig) -> Result<()> {
    let metrics = global_metrics();
    metrics.handshake_attempt();

    let previous = port.timeout();
    port.set_timeout(config.handshake_poll_timeout)?;
    port.write(&WAKE_PACKET)?;

    let polls = RetryPolicy::new(
        config.handshake_retries.saturating_sub(1),
        config.handshake_poll_interval,
    );
    let outcome = match attempt(polls, |_| poll_ack(port), |e| e.is_transient()) {
        Attempt::Succeeded { attempts, .. } => {
            debug!(attempts, "Radio answered wake packet");
            Ok(())
        }
        Attempt::Aborted { error, .. } => Err(error),
        Attempt::Exhausted { attempts, .. } => {
            warn!(
                attempts,
                from = port.baud_rate(),
                to = config.escalation_baud_rate,
                "No wake ack, escalating baud rate"
            );
            metrics.baud_escalated();
            port.set_baud_rate(config.escalation_baud_rate)?;
            port.write(&WAKE_PACKET)?;
            poll_ack(port).map_err(|e| match e {
                e if e.is_transient() => CodeplugError::NoResponse,
                e => e,
            })
        }
    };

    port.set_timeout(previous)?;
    if outcome.is_err() {
        metrics.handshake_failed();
    }
    outcome
}

/// Read one obfuscated ack byte and compare it with `'A'`.
fn expect_ack<T: Transport + ?Sized>(port: &mut T, cipher: &SeedCipher) -> Result<bool> {
    Ok(port
        .read(1)?
        .first()
        .is_some_and(|&b| cipher.matches(b, ACK)))
}

/// Send `"PROGRAM"` and the seed; the radio answers `'A' ^ seed`.
#[instrument(skip(port, cipher), fields(seed = cipher.seed()))]
pub fn program_auth<T: Transport + ?Sized>(port: &mut T, cipher: &SeedCipher) -> Result<()> {
    port.write(&program_frame(cipher.seed()))?;
    if !expect_ack(port, cipher)? {
        warn!("{}", constants::ERR_PROGRAM_ACK);
        global_metrics().handshake_failed();
        return Err(CodeplugError::AuthRejected);
    }
    debug!("Program mode accepted");
    Ok(())
}

/// Send the password frame obfuscated with the seed.
#[instrument(skip_all)]
pub fn password_auth<T: Transport + ?Sized>(
    port: &mut T,
    cipher: &SeedCipher,
    password: &[u8; PASSWORD_LEN],
) -> Result<()> {
    port.write(&cipher.encode(password))?;
    if !expect_ack(port, cipher)? {
        warn!("{}", constants::ERR_PASSWORD_ACK);
        global_metrics().handshake_failed();
        return Err(CodeplugError::WrongPassword);
    }
    debug!("Password accepted");
    Ok(())
}

/// Model name from a decoded INFORMATION reply.
fn model_name(decoded: &[u8]) -> String {
    let end = decoded
        .iter()
        .position(|&b| b == 0x00 || b == 0xFF)
        .unwrap_or(decoded.len());
    String::from_utf8_lossy(&decoded[..end]).trim().to_string()
}

/// Ask for the model name and band byte.
#[instrument(skip(port, cipher))]
pub fn info_query<T: Transport + ?Sized>(port: &mut T, cipher: &SeedCipher) -> Result<DeviceInfo> {
    port.write(&cipher.encode(INFORMATION))?;
    let mut reply = port.read(INFO_LEN)?;
    if reply.len() != INFO_LEN {
        global_metrics().handshake_failed();
        return Err(CodeplugError::InfoQueryFailed {
            actual: reply.len(),
        });
    }
    cipher.apply(&mut reply);

    let info = DeviceInfo {
        model: model_name(&reply),
        freq_band: reply[INFO_FREQ_BAND],
        seed: cipher.seed(),
    };
    info!(model = %info.model, freq_band = info.freq_band, "Radio identified");
    global_metrics().handshake_success();
    Ok(info)
}

/// Run all four steps in order.
#[instrument(skip(port, config))]
pub fn run<T: Transport + ?Sized>(
    port: &mut T,
    config: &SessionConfig,
    cipher: &SeedCipher,
) -> Result<DeviceInfo> {
    let password = config.password_frame()?;
    greet(port, config)?;
    program_auth(port, cipher)?;
    password_auth(port, cipher, &password)?;
    info_query(port, cipher)
}
