//! Structured logging setup.
//!
//! Installs a global `tracing` subscriber from a [`LoggingConfig`]. Console and
//! file outputs are independent layers, so both can be active at once.
//! `RUST_LOG` takes precedence over the configured level when set.

use crate::config::LoggingConfig;
use crate::error::{CodeplugError, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Build the output layers the config asks for.
fn output_layers(config: &LoggingConfig) -> Result<Vec<BoxedLayer>> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.log_to_console {
        let layer = fmt::layer().with_target(true);
        layers.push(if config.json_format {
            layer.json().boxed()
        } else {
            layer.boxed()
        });
    }

    if config.log_to_file {
        let path = config.log_file_path.as_deref().ok_or_else(|| {
            CodeplugError::ConfigError("log_file_path must be specified when log_to_file is enabled".into())
        })?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| CodeplugError::ConfigError(format!("Failed to open log file {path}: {e}")))?;
        let layer = fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(Mutex::new(file));
        layers.push(if config.json_format {
            layer.json().boxed()
        } else {
            layer.boxed()
        });
    }

    if layers.is_empty() {
        return Err(CodeplugError::ConfigError(
            "At least one logging output (console or file) must be enabled".into(),
        ));
    }
    Ok(layers)
}

/// Install the global subscriber. Calling it again is a no-op.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let layers = output_layers(config)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string().to_lowercase()));

    let installed = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init();

    // A subscriber set by the host application wins.
    if installed.is_err() {
        tracing::debug!(app = %config.app_name, "Global subscriber already installed");
    }
    Ok(())
}
