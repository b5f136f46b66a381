//! Persisted bridge configuration
//!
//! Stored as pretty-printed JSON. Missing fields take their defaults, so a
//! file holding only `{"device": "/dev/ttyUSB0"}` is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::bridge::{
    UartSettings, DEFAULT_ADAPTER_BAUD, DEFAULT_DELIMITER, DEFAULT_MIN_DELAY_MS,
    DEFAULT_READ_TIMEOUT_MS,
};

/// Default adapter device node
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB1";

/// Errors loading or saving a config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything needed to open and configure a bridge session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Serial device the adapter is attached to
    pub device: String,

    /// Baud rate of the USB link to the adapter
    pub adapter_baud: u32,

    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,

    /// Settle delay after every command, in milliseconds
    pub min_delay_ms: u64,

    /// Message delimiter appended to outbound payloads
    pub delimiter: char,

    /// Bridged UART line settings
    pub uart: UartSettings,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            adapter_baud: DEFAULT_ADAPTER_BAUD,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            min_delay_ms: DEFAULT_MIN_DELAY_MS,
            delimiter: DEFAULT_DELIMITER,
            uart: UartSettings::default(),
        }
    }
}

impl BridgeConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Read timeout as a `Duration`
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Settle delay as a `Duration`
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }
}
