//! # Configuration Management
//!
//! Centralized configuration for clone-mode sessions.
//!
//! This module provides structured configuration for the session protocol
//! (seed policy, password, baud rates, poll and page timing) and for logging.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides (`RADIO_CODEPLUG_*`)
//!
//! ## Notes
//! - The default seed is the constant `0`, which leaves every payload in clear.
//!   Use `SeedPolicy::Random` to draw a fresh seed per session.
//! - Page timing defaults (4 s timeout, 3 retries, 500 ms backoff) match what
//!   the radio firmware tolerates on a 115200 baud link.

use crate::error::{constants, CodeplugError, Result};
use crate::utils::cipher::SeedPolicy;
use crate::utils::timeout;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Maximum programming password length in digits
pub const MAX_PASSWORD_LEN: usize = 8;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CodeplugConfig {
    /// Session protocol configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CodeplugConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| CodeplugError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| CodeplugError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| CodeplugError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(seed) = std::env::var("RADIO_CODEPLUG_SEED") {
            if seed.eq_ignore_ascii_case("random") {
                config.session.seed = SeedPolicy::Random;
            } else if let Ok(val) = seed.parse::<u8>() {
                config.session.seed = SeedPolicy::Fixed(val);
            }
        }

        if let Ok(password) = std::env::var("RADIO_CODEPLUG_PASSWORD") {
            config.session.password = Some(password);
        }

        if let Ok(baud) = std::env::var("RADIO_CODEPLUG_BAUD_RATE") {
            if let Ok(val) = baud.parse::<u32>() {
                config.session.initial_baud_rate = val;
            }
        }

        if let Ok(timeout) = std::env::var("RADIO_CODEPLUG_PAGE_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.session.page_timeout = Duration::from_millis(val);
            }
        }

        if let Ok(retries) = std::env::var("RADIO_CODEPLUG_PAGE_RETRIES") {
            if let Ok(val) = retries.parse::<u32>() {
                config.session.page_retries = val;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CodeplugError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| CodeplugError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.session.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CodeplugError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Session protocol configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Programming password, up to 8 digits. `None` sends the "no password" pattern.
    #[serde(default)]
    pub password: Option<String>,

    /// Baud rate the port is opened at
    pub initial_baud_rate: u32,

    /// Baud rate tried once when the radio does not answer the wake packet
    pub escalation_baud_rate: u32,

    /// Read timeout for each wake poll
    #[serde(with = "duration_serde")]
    pub handshake_poll_timeout: Duration,

    /// Pause between wake polls
    #[serde(with = "duration_serde")]
    pub handshake_poll_interval: Duration,

    /// Wake polls before escalating the baud rate
    pub handshake_retries: u32,

    /// Read timeout for one page response
    #[serde(with = "duration_serde")]
    pub page_timeout: Duration,

    /// Retries after a short page read
    pub page_retries: u32,

    /// Sleep after each failed page read
    #[serde(with = "duration_serde")]
    pub page_retry_backoff: Duration,

    /// Seed selection
    #[serde(default)]
    pub seed: SeedPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            password: None,
            initial_baud_rate: timeout::INITIAL_BAUD_RATE,
            escalation_baud_rate: timeout::ESCALATION_BAUD_RATE,
            handshake_poll_timeout: timeout::HANDSHAKE_POLL_TIMEOUT,
            handshake_poll_interval: timeout::HANDSHAKE_POLL_INTERVAL,
            handshake_retries: timeout::HANDSHAKE_POLLS,
            page_timeout: timeout::PAGE_TIMEOUT,
            page_retries: timeout::PAGE_RETRIES,
            page_retry_backoff: timeout::PAGE_RETRY_BACKOFF,
            seed: SeedPolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Validate session configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(ref password) = self.password {
            if let Err(e) = password_bytes(Some(password)) {
                errors.push(format!("Invalid password: {e}"));
            }
        }

        if self.initial_baud_rate == 0 {
            errors.push("Initial baud rate must be greater than 0".to_string());
        }
        if self.escalation_baud_rate <= self.initial_baud_rate {
            errors.push(format!(
                "Escalation baud rate ({}) must be higher than the initial rate ({})",
                self.escalation_baud_rate, self.initial_baud_rate
            ));
        }

        if self.handshake_retries == 0 {
            errors.push("Handshake retries must be greater than 0".to_string());
        }
        if self.handshake_poll_timeout.as_millis() < 10 {
            errors.push("Handshake poll timeout too short (minimum: 10ms)".to_string());
        }
        if self.handshake_poll_interval.as_secs() > 10 {
            errors.push("Handshake poll interval too long (maximum: 10s)".to_string());
        }

        if self.page_timeout.as_millis() < 100 {
            errors.push("Page timeout too short (minimum: 100ms)".to_string());
        } else if self.page_timeout.as_secs() > 60 {
            errors.push("Page timeout too long (maximum: 60s)".to_string());
        }

        if self.page_retries > 20 {
            errors.push(format!(
                "Page retries too high: {} (maximum: 20)",
                self.page_retries
            ));
        }
        if self.page_retry_backoff.as_secs() > 10 {
            errors.push("Page retry backoff too long (maximum: 10s)".to_string());
        }

        errors
    }

    /// Password frame for the PasswordAuth step, before obfuscation.
    pub fn password_frame(&self) -> Result<[u8; 8]> {
        password_bytes(self.password.as_deref())
    }
}

/// Pad a digit password with `0xFF`. `None` or empty yields all `0xFF`.
pub fn password_bytes(password: Option<&str>) -> Result<[u8; 8]> {
    let mut frame = [0xFFu8; MAX_PASSWORD_LEN];
    let Some(password) = password else {
        return Ok(frame);
    };
    if password.len() > MAX_PASSWORD_LEN || !password.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodeplugError::InvalidValue(
            constants::ERR_INVALID_PASSWORD.into(),
        ));
    }
    frame[..password.len()].copy_from_slice(password.as_bytes());
    Ok(frame)
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("radio-codeplug"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
