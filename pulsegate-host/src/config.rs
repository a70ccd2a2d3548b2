//! Host configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! receive_timeout_ms = 200
//! poll_interval_ms = 1
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::HostError;

/// Host session settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// How long `receive` waits for the first byte of a frame; 0 waits forever
    pub receive_timeout_ms: u64,
    /// Pause between reads that returned no data
    pub poll_interval_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            receive_timeout_ms: 200,
            poll_interval_ms: 1,
        }
    }
}

impl HostConfig {
    /// Parse from TOML text
    pub fn from_toml(text: &str) -> Result<Self, HostError> {
        Ok(toml::from_str(text)?)
    }

    /// Receive timeout, or `None` to wait forever
    pub fn receive_timeout(&self) -> Option<Duration> {
        match self.receive_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Pause between empty reads
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
