//! Clone-mode session state machine.
//!
//! A [`Session`] owns its transport for the lifetime of one exchange with the
//! radio and walks a linear path:
//!
//! ```text
//! Idle --handshake--> Authenticated --read/write--> Authenticated --finalize--> Finalized
//!   \___________________________ any error ____________________________/--> Failed
//! ```
//!
//! Any protocol failure leaves the session in `Failed`. Nothing partial is
//! recovered; the caller starts again from the greeting.

use crate::config::SessionConfig;
use crate::core::image::MemoryImage;
use crate::core::layout::{IMAGE_SIZE, PAGE_COUNT, PAGE_SIZE};
use crate::error::{constants, CodeplugError, Result};
use crate::protocol::command::{
    read_request, write_frame, ACK, END, PAGE_HEADER_LEN, READ, READ_RESPONSE_LEN, WRITE,
};
use crate::protocol::handshake::{self, DeviceInfo};
use crate::transport::Transport;
use crate::utils::cipher::SeedCipher;
use crate::utils::metrics::{global_metrics, Timer};
use crate::utils::retry::{attempt, Attempt, RetryPolicy};
use tracing::{debug, info, instrument, warn};

/// Where the session is in its exchange with the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Authenticated,
    Finalized,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Radio to host.
    Download,
    /// Host to radio.
    Upload,
}

/// Reported after every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub direction: Direction,
    pub bytes_done: usize,
    pub bytes_total: usize,
    pub percent: u8,
}

impl Progress {
    fn new(direction: Direction, bytes_done: usize, bytes_total: usize) -> Self {
        let percent = if bytes_total == 0 {
            100
        } else {
            (bytes_done * 100 / bytes_total).min(100) as u8
        };
        Self {
            direction,
            bytes_done,
            bytes_total,
            percent,
        }
    }
}

/// Receives progress and may cancel a download between pages.
pub trait ProgressObserver {
    fn on_progress(&mut self, progress: &Progress);

    /// Polled before each read page. Uploads are never cancelled.
    fn should_abort(&mut self) -> bool {
        false
    }
}

impl<F: FnMut(&Progress)> ProgressObserver for F {
    fn on_progress(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Observer that ignores progress and never aborts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _progress: &Progress) {}
}

/// One clone-mode exchange over a transport.
pub struct Session<T: Transport> {
    port: T,
    config: SessionConfig,
    cipher: SeedCipher,
    state: SessionState,
    device: Option<DeviceInfo>,
}

impl<T: Transport> Session<T> {
    /// Pick the seed from `config.seed` and wrap the transport.
    pub fn new(port: T, config: SessionConfig) -> Self {
        let cipher = SeedCipher::new(config.seed.pick());
        Self {
            port,
            config,
            cipher,
            state: SessionState::Idle,
            device: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn seed(&self) -> u8 {
        self.cipher.seed()
    }

    /// Identification from the last successful handshake.
    pub fn device(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.port
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.port
    }

    pub fn into_inner(self) -> T {
        self.port
    }

    fn track<R>(&mut self, result: Result<R>) -> Result<R> {
        if let Err(ref e) = result {
            warn!(error = %e, state = ?self.state, "Session failed");
            self.state = SessionState::Failed;
        }
        result
    }

    fn require_authenticated(&self) -> Result<()> {
        if self.state != SessionState::Authenticated {
            return Err(CodeplugError::NotAuthenticated);
        }
        Ok(())
    }

    /// Greeting, ProgramAuth, PasswordAuth and InfoQuery.
    pub fn handshake(&mut self) -> Result<&DeviceInfo> {
        self.state = SessionState::Idle;
        self.device = None;
        let result = handshake::run(&mut self.port, &self.config, &self.cipher);
        let info = self.track(result)?;
        self.state = SessionState::Authenticated;
        Ok(self.device.insert(info))
    }

    /// Enter a transfer mode with `'R'` or `'W'`.
    fn enter_mode(&mut self, cmd: u8, reason: &str) -> Result<()> {
        self.port.write(&[self.cipher.obfuscate(cmd)])?;
        let ack = self.port.read(1)?;
        if !ack.first().is_some_and(|&b| self.cipher.matches(b, ACK)) {
            return Err(CodeplugError::TransferFailed {
                address: 0,
                reason: reason.to_string(),
            });
        }
        Ok(())
    }

    /// One page with the page timeout and bounded retries.
    fn read_page(&mut self, address: usize) -> Result<Vec<u8>> {
        let metrics = global_metrics();
        let policy = RetryPolicy::new(self.config.page_retries, self.config.page_retry_backoff);
        let request = read_request(&self.cipher, address as u16);

        let previous = self.port.timeout();
        self.port.set_timeout(self.config.page_timeout)?;
        let port = &mut self.port;
        let outcome = attempt(
            policy,
            |n| {
                if n > 1 {
                    metrics.page_retry();
                }
                port.write(&request)?;
                port.read_exact(READ_RESPONSE_LEN)
            },
            |e| e.is_transient(),
        );
        self.port.set_timeout(previous)?;

        match outcome {
            Attempt::Succeeded { mut value, attempts } => {
                if attempts > 1 {
                    debug!(address, attempts, "Page read after retries");
                }
                let mut payload = value.split_off(PAGE_HEADER_LEN);
                self.cipher.apply(&mut payload);
                metrics.page_read(payload.len() as u64);
                Ok(payload)
            }
            Attempt::Exhausted {
                last_error,
                attempts,
            } => {
                warn!(address, attempts, error = %last_error, "Page read exhausted retries");
                Err(CodeplugError::TransferFailed {
                    address,
                    reason: last_error.to_string(),
                })
            }
            Attempt::Aborted { error, .. } => Err(error),
        }
    }

    fn read_pages<O: ProgressObserver + ?Sized>(&mut self, observer: &mut O) -> Result<MemoryImage> {
        self.enter_mode(READ, constants::ERR_READ_ACK)?;
        let mut data = Vec::with_capacity(IMAGE_SIZE);
        for page in 0..PAGE_COUNT {
            if observer.should_abort() {
                info!(page, "Download cancelled");
                return Err(CodeplugError::Cancelled);
            }
            let address = page * PAGE_SIZE;
            let payload = self.read_page(address)?;
            data.extend_from_slice(&payload);
            observer.on_progress(&Progress::new(Direction::Download, data.len(), IMAGE_SIZE));
        }
        MemoryImage::from_bytes(data)
    }

    /// Read all twelve pages into a fresh image.
    #[instrument(skip_all, fields(seed = self.cipher.seed()))]
    pub fn read_image<O: ProgressObserver + ?Sized>(&mut self, observer: &mut O) -> Result<MemoryImage> {
        self.require_authenticated()?;
        let result = self.read_pages(observer);
        if result.is_err() {
            global_metrics().transfer_failed();
        }
        self.track(result)
    }

    fn write_pages<O: ProgressObserver + ?Sized>(
        &mut self,
        image: &MemoryImage,
        observer: &mut O,
    ) -> Result<()> {
        self.enter_mode(WRITE, constants::ERR_WRITE_ACK)?;
        let bytes = image.as_bytes();
        for (page, payload) in bytes.chunks(PAGE_SIZE).enumerate() {
            let address = page * PAGE_SIZE;
            let frame = write_frame(&self.cipher, address as u16, payload);
            self.port.write(&frame)?;
            let ack = self.port.read(1)?;
            if !ack.first().is_some_and(|&b| self.cipher.matches(b, ACK)) {
                warn!(address, ack = ?ack, "Page write not acknowledged");
                return Err(CodeplugError::TransferFailed {
                    address,
                    reason: constants::ERR_PAGE_ACK.to_string(),
                });
            }
            global_metrics().page_written(payload.len() as u64);
            let done = address + payload.len();
            observer.on_progress(&Progress::new(Direction::Upload, done, bytes.len()));
        }
        Ok(())
    }

    /// Write every page of `image`. A missing page ack fails at once.
    #[instrument(skip_all, fields(seed = self.cipher.seed()))]
    pub fn write_image<O: ProgressObserver + ?Sized>(
        &mut self,
        image: &MemoryImage,
        observer: &mut O,
    ) -> Result<()> {
        self.require_authenticated()?;
        let result = self.write_pages(image, observer);
        if result.is_err() {
            global_metrics().transfer_failed();
        }
        self.track(result)
    }

    fn send_end(&mut self) -> Result<()> {
        self.port.write(&self.cipher.encode(END))?;
        let ack = self.port.read(1)?;
        if !ack.first().is_some_and(|&b| self.cipher.matches(b, ACK)) {
            return Err(CodeplugError::IncompleteTransfer);
        }
        Ok(())
    }

    /// Send `END` and close the exchange.
    pub fn finalize(&mut self) -> Result<()> {
        self.require_authenticated()?;
        let result = self.send_end();
        self.track(result)?;
        self.state = SessionState::Finalized;
        debug!("Session finalized");
        Ok(())
    }

    /// Handshake, read every page, finalize.
    pub fn download<O: ProgressObserver + ?Sized>(&mut self, observer: &mut O) -> Result<MemoryImage> {
        let _timer = Timer::start("download");
        self.handshake()?;
        let image = self.read_image(observer)?;
        self.finalize()?;
        global_metrics().download_completed();
        info!(bytes = IMAGE_SIZE, "Download complete");
        Ok(image)
    }

    /// Handshake, write every page, finalize.
    pub fn upload<O: ProgressObserver + ?Sized>(
        &mut self,
        image: &MemoryImage,
        observer: &mut O,
    ) -> Result<()> {
        let _timer = Timer::start("upload");
        self.handshake()?;
        self.write_image(image, observer)?;
        self.finalize()?;
        global_metrics().upload_completed();
        info!(bytes = IMAGE_SIZE, "Upload complete");
        Ok(())
    }
}
