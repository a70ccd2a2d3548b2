//! Host error type

use std::io;

use pulsegate_protocol::ProtocolError;
use thiserror::Error;

/// Errors raised on the host side of the link
#[derive(Error, Debug)]
pub enum HostError {
    /// The underlying stream failed or was closed
    #[error("serial link interrupted: {0}")]
    TransportInterrupted(#[from] io::Error),

    /// A frame could not be encoded, or arrived with an unparseable payload
    #[error("protocol error: {0}")]
    Protocol(ProtocolError),

    /// The host configuration file is invalid
    #[error("invalid host configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl From<ProtocolError> for HostError {
    fn from(e: ProtocolError) -> Self {
        HostError::Protocol(e)
    }
}

impl HostError {
    /// Returns true if the session can keep reading after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, HostError::Protocol(_))
    }
}
