//! Device error type

use core::fmt;

use pulsegate_hal::StorageError;
use pulsegate_protocol::{ProtocolError, SequenceError};

/// Errors that end the device loop
///
/// Missed deadlines are not errors; they are reported to the host and the
/// pass continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// The serial link failed; the board should reconnect and restart
    TransportInterrupted,
    /// The stored sequence library could not be read
    Storage(StorageError),
    /// A stored sequence failed validation
    Sequence(SequenceError),
    /// An outgoing payload could not be framed
    Protocol(ProtocolError),
    /// The configured active sequence is not in the library
    UnknownSequence,
    /// An event window ends past the range of the tick counter
    WindowOutOfRange,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::TransportInterrupted => write!(f, "serial link interrupted"),
            DeviceError::Storage(e) => write!(f, "stored sequences unavailable: {}", e),
            DeviceError::Sequence(e) => write!(f, "invalid sequence: {}", e),
            DeviceError::Protocol(e) => write!(f, "cannot send payload: {}", e),
            DeviceError::UnknownSequence => write!(f, "active sequence not found"),
            DeviceError::WindowOutOfRange => {
                write!(f, "event window exceeds the tick counter range")
            }
        }
    }
}

impl From<StorageError> for DeviceError {
    fn from(e: StorageError) -> Self {
        DeviceError::Storage(e)
    }
}

impl From<SequenceError> for DeviceError {
    fn from(e: SequenceError) -> Self {
        DeviceError::Sequence(e)
    }
}

impl From<ProtocolError> for DeviceError {
    fn from(e: ProtocolError) -> Self {
        DeviceError::Protocol(e)
    }
}
