//! Configuration management for mediadrop
//!
//! Built-in defaults, then an optional TOML file, then `MEDIADROP_*`
//! environment overrides. Nested keys use `__` in the environment, e.g.
//! `MEDIADROP_RECEIVER__DESTINATION_DIR`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::transport::MARKER_LEN;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "mediadrop";

const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Complete configuration for both endpoints
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// TCP port the receiver listens on and the sender dials
    pub port: u16,

    /// Bytes per read/write on the wire
    pub chunk_size: usize,

    /// Idle socket timeout in seconds; 0 waits forever
    pub idle_timeout_secs: u64,

    pub receiver: ReceiverConfig,
    pub sender: SenderConfig,
}

/// Receiver-only settings
#[derive(Debug, Deserialize, Clone)]
pub struct ReceiverConfig {
    pub bind_address: String,
    pub destination_dir: String,
    pub file_prefix: String,
    /// Extension given to every received file, whatever its content
    pub file_extension: String,
}

/// Sender-only settings
#[derive(Debug, Deserialize, Clone)]
pub struct SenderConfig {
    /// Fixed, pre-shared receiver IP
    pub receiver_address: String,
    pub source_dir: String,
    pub media_extensions: Vec<String>,
    pub connect_timeout_secs: u64,
}

impl AppConfig {
    /// Loads `path` if given, otherwise `mediadrop.toml` when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Self::defaults()?
            .add_source(file)
            .add_source(
                Environment::with_prefix("MEDIADROP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults only, ignoring files and the environment.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        let config: AppConfig = Self::defaults()?.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("port", 8080_i64)?
            .set_default("chunk_size", 1024_i64)?
            .set_default("idle_timeout_secs", 0_i64)?
            .set_default("receiver.bind_address", "0.0.0.0")?
            .set_default("receiver.destination_dir", "./receiver_directory")?
            .set_default("receiver.file_prefix", "received_file_")?
            .set_default("receiver.file_extension", "mp4")?
            .set_default("sender.receiver_address", "127.0.0.1")?
            .set_default("sender.source_dir", "./sender_directory")?
            .set_default("sender.media_extensions", vec!["mp4", "avi", "mkv"])?
            .set_default("sender.connect_timeout_secs", 10_i64)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size < MARKER_LEN {
            return Err(ConfigError::Message(format!(
                "chunk_size must be at least {MARKER_LEN} bytes"
            )));
        }

        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::Message(format!(
                "chunk_size must not exceed {MAX_CHUNK_SIZE} bytes"
            )));
        }

        if self.receiver.bind_address.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Message(format!(
                "receiver.bind_address is not an IP address: {}",
                self.receiver.bind_address
            )));
        }

        if self.sender.receiver_address.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Message(format!(
                "sender.receiver_address is not an IP address: {}",
                self.sender.receiver_address
            )));
        }

        if self.receiver.destination_dir.is_empty() || self.sender.source_dir.is_empty() {
            return Err(ConfigError::Message(
                "source and destination directories cannot be empty".into(),
            ));
        }

        if self.receiver.file_prefix.is_empty() {
            return Err(ConfigError::Message(
                "receiver.file_prefix cannot be empty".into(),
            ));
        }

        if self.receiver.file_extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Message(
                "receiver.file_extension cannot be empty".into(),
            ));
        }

        if self.sender.media_extensions.is_empty() {
            return Err(ConfigError::Message(
                "sender.media_extensions cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Address the receiver binds, all interfaces by default.
    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .receiver
            .bind_address
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid bind address: {e}")))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Fixed receiver endpoint the sender dials.
    pub fn receiver_socket(&self) -> Result<SocketAddr, ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message(
                "port 0 cannot be dialled; set a fixed receiver port".into(),
            ));
        }
        let ip: IpAddr = self
            .sender
            .receiver_address
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid receiver address: {e}")))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn destination_dir(&self) -> PathBuf {
        PathBuf::from(&self.receiver.destination_dir)
    }

    pub fn source_dir(&self) -> PathBuf {
        PathBuf::from(&self.sender.source_dir)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.sender.connect_timeout_secs > 0)
            .then(|| Duration::from_secs(self.sender.connect_timeout_secs))
    }
}
