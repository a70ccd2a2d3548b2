//! Frame encoding and decoding for the host link.
//!
//! Frame format:
//! - SOH (1 byte): 0x01 start of header
//! - LENGTH (2 bytes): payload length, little-endian (0-65535)
//! - TYPE (1 byte): 0x05 Sequence, 0x06 Message, 0x07 Instruction
//! - STX (1 byte): 0x02 start of text
//! - PAYLOAD (LENGTH bytes)
//! - ETX (1 byte): 0x03 end of text
//! - CHECKSUM (1 byte): LRC of the payload bytes only
//! - EOT (1 byte): 0x04 end of transmission

use alloc::vec::Vec;

use crate::error::ProtocolError;
use crate::lrc::{compute_lrc, Lrc};

/// Start of header
pub const SOH: u8 = 0x01;
/// Start of text
pub const STX: u8 = 0x02;
/// End of text
pub const ETX: u8 = 0x03;
/// End of transmission
pub const EOT: u8 = 0x04;

/// Type marker: tabular sequence
pub const TYPE_SEQUENCE: u8 = 0x05;
/// Type marker: text message
pub const TYPE_MESSAGE: u8 = 0x06;
/// Type marker: decimal instruction
pub const TYPE_INSTRUCTION: u8 = 0x07;

/// Largest payload the length field can describe
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// Bytes added around the payload (SOH, LEN×2, TYPE, STX, ETX, LRC, EOT)
pub const FRAME_OVERHEAD: usize = 8;

/// Kind of payload carried by a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadType {
    Sequence,
    Message,
    Instruction,
}

impl PayloadType {
    /// Parse a type marker
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            TYPE_SEQUENCE => Some(PayloadType::Sequence),
            TYPE_MESSAGE => Some(PayloadType::Message),
            TYPE_INSTRUCTION => Some(PayloadType::Instruction),
            _ => None,
        }
    }

    /// Type marker byte
    pub fn to_byte(self) -> u8 {
        match self {
            PayloadType::Sequence => TYPE_SEQUENCE,
            PayloadType::Message => TYPE_MESSAGE,
            PayloadType::Instruction => TYPE_INSTRUCTION,
        }
    }
}

/// A checksum-verified frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Declared payload kind
    pub payload_type: PayloadType,
    /// Raw payload bytes
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a frame, rejecting payloads the length field cannot hold
    pub fn new(payload_type: PayloadType, payload: Vec<u8>) -> Result<Self, ProtocolError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::PayloadTooLarge);
        }
        Ok(Self {
            payload_type,
            payload,
        })
    }

    /// Checksum transmitted with this frame
    pub fn checksum(&self) -> u8 {
        compute_lrc(&self.payload)
    }

    /// Append the wire encoding of this frame to `out`
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let len = self.payload.len() as u16;
        out.reserve(FRAME_OVERHEAD + self.payload.len());
        out.push(SOH);
        out.extend_from_slice(&len.to_le_bytes());
        out.push(self.payload_type.to_byte());
        out.push(STX);
        out.extend_from_slice(&self.payload);
        out.push(ETX);
        out.push(self.checksum());
        out.push(EOT);
    }

    /// Wire encoding of this frame
    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }
}

/// Encode a raw payload under a type marker byte
///
/// Fails with `UnsupportedPayloadType` for any marker other than the three
/// known kinds; nothing is coerced.
pub fn encode_frame(type_byte: u8, payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let payload_type =
        PayloadType::from_byte(type_byte).ok_or(ProtocolError::UnsupportedPayloadType)?;
    let frame = Frame::new(payload_type, payload.to_vec())?;
    Ok(frame.encode_to_vec())
}

/// Decoder position within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeState {
    /// Scanning for SOH
    SeekStart,
    /// Got SOH, waiting for low length byte
    LenLow,
    /// Waiting for high length byte
    LenHigh,
    /// Waiting for type marker
    Type,
    /// Waiting for STX
    ExpectTextStart,
    /// Reading payload bytes
    Payload,
    /// Waiting for ETX
    ExpectTextEnd,
    /// Waiting for the LRC byte
    ExpectChecksum,
    /// Waiting for EOT
    ExpectEot,
}

/// Counters kept by the decoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderStats {
    /// Frames accepted
    pub frames: u32,
    /// Frames dropped for a bad LRC
    pub checksum_mismatches: u32,
    /// Frames dropped for a misplaced marker, unknown type, or oversized length
    pub framing_violations: u32,
    /// Frames that passed framing but whose payload did not parse
    pub malformed_payloads: u32,
}

/// Streaming frame decoder
///
/// Feed one byte at a time. Any structural error or checksum mismatch
/// silently drops the frame in progress and resumes scanning for SOH; only
/// complete, checksum-valid frames are returned.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecodeState,
    length: u16,
    type_byte: u8,
    buffer: Vec<u8>,
    lrc: Lrc,
    max_payload_len: u16,
    stats: DecoderStats,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a decoder accepting the full 16-bit payload range
    pub fn new() -> Self {
        Self::with_max_payload_len(u16::MAX)
    }

    /// Create a decoder that drops frames declaring more than `max` bytes
    ///
    /// Bounds the allocation made at STX on memory-constrained targets.
    pub fn with_max_payload_len(max: u16) -> Self {
        Self {
            state: DecodeState::SeekStart,
            length: 0,
            type_byte: 0,
            buffer: Vec::new(),
            lrc: Lrc::new(),
            max_payload_len: max,
            stats: DecoderStats::default(),
        }
    }

    /// Current decoder state
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Decoder counters
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    pub(crate) fn record_malformed(&mut self) {
        self.stats.malformed_payloads = self.stats.malformed_payloads.wrapping_add(1);
    }

    /// Reset to SeekStart, dropping any partial frame
    pub fn reset(&mut self) {
        self.state = DecodeState::SeekStart;
        self.length = 0;
        self.type_byte = 0;
        self.buffer = Vec::new();
        self.lrc.reset();
    }

    fn reject(&mut self, reason: ProtocolError) {
        match reason {
            ProtocolError::ChecksumMismatch => {
                self.stats.checksum_mismatches = self.stats.checksum_mismatches.wrapping_add(1);
            }
            _ => {
                self.stats.framing_violations = self.stats.framing_violations.wrapping_add(1);
            }
        }
        #[cfg(feature = "defmt")]
        defmt::trace!("frame dropped: {}", reason);
        self.reset();
    }

    /// Feed a single byte
    ///
    /// Returns `Some(frame)` when this byte completes a valid frame.
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            DecodeState::SeekStart => {
                // Silently ignore anything but SOH while scanning
                if byte == SOH {
                    self.state = DecodeState::LenLow;
                }
            }
            DecodeState::LenLow => {
                self.length = u16::from(byte);
                self.state = DecodeState::LenHigh;
            }
            DecodeState::LenHigh => {
                self.length |= u16::from(byte) << 8;
                if self.length > self.max_payload_len {
                    self.reject(ProtocolError::FramingViolation);
                } else {
                    self.state = DecodeState::Type;
                }
            }
            DecodeState::Type => {
                // Validated only once the frame is complete
                self.type_byte = byte;
                self.state = DecodeState::ExpectTextStart;
            }
            DecodeState::ExpectTextStart => {
                if byte == STX {
                    self.buffer = Vec::with_capacity(usize::from(self.length));
                    self.lrc.reset();
                    self.state = if self.length == 0 {
                        DecodeState::ExpectTextEnd
                    } else {
                        DecodeState::Payload
                    };
                } else {
                    self.reject(ProtocolError::FramingViolation);
                }
            }
            DecodeState::Payload => {
                self.buffer.push(byte);
                self.lrc.push(byte);
                if self.buffer.len() >= usize::from(self.length) {
                    self.state = DecodeState::ExpectTextEnd;
                }
            }
            DecodeState::ExpectTextEnd => {
                if byte == ETX {
                    self.state = DecodeState::ExpectChecksum;
                } else {
                    self.reject(ProtocolError::FramingViolation);
                }
            }
            DecodeState::ExpectChecksum => {
                if self.lrc.finish() == byte {
                    self.state = DecodeState::ExpectEot;
                } else {
                    self.reject(ProtocolError::ChecksumMismatch);
                }
            }
            DecodeState::ExpectEot => {
                let payload_type = PayloadType::from_byte(self.type_byte);
                match (byte, payload_type) {
                    (EOT, Some(payload_type)) => {
                        let payload = core::mem::take(&mut self.buffer);
                        self.reset();
                        self.stats.frames = self.stats.frames.wrapping_add(1);
                        return Some(Frame {
                            payload_type,
                            payload,
                        });
                    }
                    _ => self.reject(ProtocolError::FramingViolation),
                }
            }
        }
        None
    }

    /// Feed multiple bytes
    ///
    /// Returns the first complete frame found, if any, together with the
    /// number of bytes consumed. Bytes after that frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> (Option<Frame>, usize) {
        for (i, &byte) in bytes.iter().enumerate() {
            if let Some(frame) = self.feed(byte) {
                return (Some(frame), i + 1);
            }
        }
        (None, bytes.len())
    }
}
