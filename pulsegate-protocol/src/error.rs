//! Protocol error types

use core::fmt;

/// Errors raised by the frame codec
///
/// `ChecksumMismatch` and `FramingViolation` never leave the decoder: it
/// resynchronizes on its own and only counts them. `MalformedPayload` is
/// returned for a frame that passed framing and checksum but whose payload
/// does not parse as its declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Received checksum does not match the payload LRC
    ChecksumMismatch,
    /// Unexpected byte at a structural position
    FramingViolation,
    /// Payload does not decode as its declared type
    MalformedPayload,
    /// Type marker is not Sequence, Message or Instruction
    UnsupportedPayloadType,
    /// Payload longer than the 16-bit length field allows
    PayloadTooLarge,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::ChecksumMismatch => write!(f, "checksum mismatch"),
            ProtocolError::FramingViolation => write!(f, "framing violation"),
            ProtocolError::MalformedPayload => write!(f, "malformed payload"),
            ProtocolError::UnsupportedPayloadType => write!(f, "unsupported payload type"),
            ProtocolError::PayloadTooLarge => write!(f, "payload too large"),
        }
    }
}

/// Reasons a sequence is rejected at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceError {
    /// Frequency is zero or negative
    NonPositiveFrequency,
    /// Pulse width is zero or negative
    NonPositivePulseWidth,
    /// Onset or duration is negative
    NegativeTiming,
    /// A value is NaN or infinite
    NonFiniteValue,
    /// Sequence name is empty or holds a tab or line break
    BadSequenceName,
    /// Event name is not of the form `event<k>`
    BadEventName,
    /// The same event index appears twice
    DuplicateEvent(usize),
    /// Event indices have a gap; the first missing index is given
    MissingEvent(usize),
    /// Tabular text could not be parsed; 1-based line number
    Syntax(usize),
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::NonPositiveFrequency => write!(f, "frequency must be positive"),
            SequenceError::NonPositivePulseWidth => write!(f, "pulse width must be positive"),
            SequenceError::NegativeTiming => write!(f, "onset and duration must not be negative"),
            SequenceError::NonFiniteValue => write!(f, "timing value is not finite"),
            SequenceError::BadSequenceName => {
                write!(f, "sequence name must be non-empty without tabs or line breaks")
            }
            SequenceError::BadEventName => write!(f, "event name must be event<k>"),
            SequenceError::DuplicateEvent(i) => write!(f, "event{} defined twice", i),
            SequenceError::MissingEvent(i) => write!(f, "event{} is missing", i),
            SequenceError::Syntax(line) => write!(f, "syntax error on line {}", line),
        }
    }
}

impl From<SequenceError> for ProtocolError {
    fn from(_: SequenceError) -> Self {
        ProtocolError::MalformedPayload
    }
}
