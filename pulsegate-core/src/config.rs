//! Device configuration
//!
//! Loaded from a TOML document, usually embedded in the board image:
//!
//! ```toml
//! accuracy = "us"
//! active_sequence = "sequence0"
//! stored_sequences = "sequences.tsv"
//! output_active_low = true
//! arm_poll_ms = 1
//! reply_timeout_ms = 2000
//! max_payload_len = 65535
//! ```
//!
//! Every field is optional.

use alloc::string::String;
use serde::Deserialize;

use crate::tick::Accuracy;

/// Default sequence fired on each trigger
pub const DEFAULT_ACTIVE_SEQUENCE: &str = "sequence0";

/// Default label of the on-board sequence file
pub const DEFAULT_STORED_SEQUENCES: &str = "sequences.tsv";

/// Device configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// Tick resolution of the board clock
    pub accuracy: Accuracy,
    /// Sequence fired on each trigger
    pub active_sequence: String,
    /// Name of the on-board fallback library, shown in status messages
    pub stored_sequences: String,
    /// Pulse output is asserted low
    pub output_active_low: bool,
    /// Poll interval while waiting for arm (ms)
    pub arm_poll_ms: u32,
    /// How long to wait for a host reply during acquisition (ms)
    pub reply_timeout_ms: u32,
    /// Largest incoming payload accepted from the host, in bytes
    pub max_payload_len: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::Micros,
            active_sequence: String::from(DEFAULT_ACTIVE_SEQUENCE),
            stored_sequences: String::from(DEFAULT_STORED_SEQUENCES),
            output_active_low: true,
            arm_poll_ms: 1,
            reply_timeout_ms: 2000,
            max_payload_len: u16::MAX,
        }
    }
}

impl DeviceConfig {
    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Arm poll interval in ticks (at least one)
    pub fn arm_poll_ticks(&self) -> u32 {
        self.accuracy.millis_to_ticks(self.arm_poll_ms).max(1)
    }

    /// Host reply timeout in ticks
    pub fn reply_timeout_ticks(&self) -> u32 {
        self.accuracy.millis_to_ticks(self.reply_timeout_ms)
    }
}
