//! High-level download and upload.

use super::codeplug::Codeplug;
use crate::config::SessionConfig;
use crate::core::zones::NormalizeReport;
use crate::error::Result;
use crate::protocol::handshake::DeviceInfo;
use crate::protocol::session::{ProgressObserver, Session};
use crate::transport::Transport;
use tracing::{info, instrument, warn};

/// A radio on the end of a transport.
///
/// Each call runs a full session from the greeting, so a failed transfer can
/// simply be retried.
pub struct Radio<T: Transport> {
    port: T,
    config: SessionConfig,
    device: Option<DeviceInfo>,
}

impl<T: Transport> Radio<T> {
    pub fn new(port: T, config: SessionConfig) -> Self {
        Self {
            port,
            config,
            device: None,
        }
    }

    pub fn with_defaults(port: T) -> Self {
        Self::new(port, SessionConfig::default())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Identification from the most recent handshake.
    pub fn device(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.port
    }

    pub fn into_inner(self) -> T {
        self.port
    }

    /// Read the whole image and wrap it with the detected model variant.
    #[instrument(skip_all)]
    pub fn download<O: ProgressObserver + ?Sized>(&mut self, observer: &mut O) -> Result<Codeplug> {
        let mut session = Session::new(&mut self.port, self.config.clone());
        let result = session.download(observer);
        self.device = session.device().cloned();
        let image = result?;
        let variant = self
            .device
            .as_ref()
            .map(DeviceInfo::variant)
            .unwrap_or_default();
        info!(?variant, "Codeplug downloaded");
        Ok(Codeplug::new(image, variant))
    }

    /// Normalize zones, then write the whole image.
    #[instrument(skip_all)]
    pub fn upload<O: ProgressObserver + ?Sized>(
        &mut self,
        codeplug: &mut Codeplug,
        observer: &mut O,
    ) -> Result<NormalizeReport> {
        let report = codeplug.normalize();
        let mut session = Session::new(&mut self.port, self.config.clone());
        let result = session.upload(codeplug.image(), observer);
        self.device = session.device().cloned();
        if let Some(device) = &self.device {
            if device.variant() != codeplug.variant() {
                warn!(
                    radio = ?device.variant(),
                    codeplug = ?codeplug.variant(),
                    "Codeplug was made for a different model"
                );
            }
        }
        result?;
        Ok(report)
    }
}
