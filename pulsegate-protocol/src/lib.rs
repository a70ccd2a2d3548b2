//! Pulsegate Serial Protocol
//!
//! This crate defines the byte-stream protocol between the pulse sequencer
//! board and its host, along with the sequence model both sides share.
//!
//! # Protocol Overview
//!
//! Every message travels in a self-delimiting frame:
//! ```text
//! ┌─────┬────────┬──────┬─────┬─────────────┬─────┬─────┬─────┐
//! │ SOH │ LENGTH │ TYPE │ STX │ PAYLOAD     │ ETX │ LRC │ EOT │
//! │ 1B  │ 2B LE  │ 1B   │ 1B  │ 0–65535B    │ 1B  │ 1B  │ 1B  │
//! └─────┴────────┴──────┴─────┴─────────────┴─────┴─────┴─────┘
//! ```
//!
//! Three payload kinds exist: a tab-separated sequence, free text, and a
//! decimal instruction code. The decoder is a byte-at-a-time state machine
//! that drops damaged frames and resynchronizes on the next SOH.
//!
//! The LRC only guards the payload. It catches any single-bit error but
//! not reordered bytes or errors that cancel out in the sum.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod error;
pub mod frame;
pub mod instruction;
pub mod lrc;
pub mod payload;
pub mod sequence;
pub mod tsv;

pub use error::{ProtocolError, SequenceError};
pub use frame::{
    encode_frame, DecodeState, DecoderStats, Frame, FrameDecoder, PayloadType, MAX_PAYLOAD_LEN,
};
pub use instruction::Instruction;
pub use lrc::compute_lrc;
pub use payload::{Decoder, Payload};
pub use sequence::{Event, EventName, Sequence, SequenceLibrary};
