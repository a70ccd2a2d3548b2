//! Typed payloads and the typed stream decoder
//!
//! The payload kind is decided once, at decode time, from the frame's type
//! marker. Callers dispatch by matching on [`Payload`].

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::error::ProtocolError;
use crate::frame::{DecoderStats, DecodeState, Frame, FrameDecoder, PayloadType};
use crate::instruction::Instruction;
use crate::sequence::Sequence;
use crate::tsv;

/// A decoded payload
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A complete sequence
    Sequence(Sequence),
    /// Free text for the user or the log
    Message(String),
    /// An instruction code (possibly one outside the known vocabulary)
    Instruction(i32),
}

impl Payload {
    /// Message payload
    pub fn message(text: impl Into<String>) -> Self {
        Payload::Message(text.into())
    }

    /// Instruction payload from the known vocabulary
    pub fn instruction(instruction: Instruction) -> Self {
        Payload::Instruction(instruction.code())
    }

    /// Kind of this payload
    pub fn payload_type(&self) -> PayloadType {
        match self {
            Payload::Sequence(_) => PayloadType::Sequence,
            Payload::Message(_) => PayloadType::Message,
            Payload::Instruction(_) => PayloadType::Instruction,
        }
    }

    /// Known instruction carried by this payload, if any
    pub fn as_instruction(&self) -> Option<Instruction> {
        match self {
            Payload::Instruction(code) => Instruction::from_code(*code),
            _ => None,
        }
    }

    /// Serialize the payload body
    pub fn body(&self) -> Vec<u8> {
        match self {
            Payload::Sequence(sequence) => tsv::encode_sequence(sequence).into_bytes(),
            Payload::Message(text) => text.as_bytes().to_vec(),
            Payload::Instruction(code) => {
                // "-2147483648" is the longest possible rendering
                let mut text: heapless::String<11> = heapless::String::new();
                let _ = write!(text, "{}", code);
                text.as_bytes().to_vec()
            }
        }
    }

    /// Wrap the payload into a frame
    pub fn to_frame(&self) -> Result<Frame, ProtocolError> {
        Frame::new(self.payload_type(), self.body())
    }

    /// Full wire encoding
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.to_frame()?.encode_to_vec())
    }

    /// Interpret a verified frame according to its type marker
    pub fn from_frame(frame: &Frame) -> Result<Self, ProtocolError> {
        let text =
            core::str::from_utf8(&frame.payload).map_err(|_| ProtocolError::MalformedPayload)?;
        match frame.payload_type {
            PayloadType::Sequence => Ok(Payload::Sequence(tsv::decode_sequence(text)?)),
            PayloadType::Message => Ok(Payload::Message(String::from(text))),
            PayloadType::Instruction => text
                .trim()
                .parse::<i32>()
                .map(Payload::Instruction)
                .map_err(|_| ProtocolError::MalformedPayload),
        }
    }
}

/// Streaming decoder yielding typed payloads
///
/// Framing and checksum errors are absorbed by the inner [`FrameDecoder`].
/// The only error this returns is `MalformedPayload`, for a frame that was
/// intact on the wire but whose body does not parse; the decoder has
/// already resynchronized when it is returned.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    frames: FrameDecoder,
}

impl Decoder {
    /// Create a decoder accepting the full 16-bit payload range
    pub fn new() -> Self {
        Self {
            frames: FrameDecoder::new(),
        }
    }

    /// Create a decoder that drops frames declaring more than `max` bytes
    pub fn with_max_payload_len(max: u16) -> Self {
        Self {
            frames: FrameDecoder::with_max_payload_len(max),
        }
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(None)` until a complete frame has been recognized.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Payload>, ProtocolError> {
        let Some(frame) = self.frames.feed(byte) else {
            return Ok(None);
        };
        match Payload::from_frame(&frame) {
            Ok(payload) => {
                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "frame decoded: {} ({} bytes)",
                    frame.payload_type,
                    frame.payload.len()
                );
                Ok(Some(payload))
            }
            Err(e) => {
                self.frames.record_malformed();
                #[cfg(feature = "defmt")]
                defmt::warn!("malformed {} payload", frame.payload_type);
                Err(e)
            }
        }
    }

    /// Current state of the inner frame decoder
    pub fn state(&self) -> DecodeState {
        self.frames.state()
    }

    /// Decoder counters
    pub fn stats(&self) -> DecoderStats {
        self.frames.stats()
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.frames.reset();
    }
}
