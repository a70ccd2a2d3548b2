//! Framed host link
//!
//! Wraps a [`SerialPort`] with the payload decoder. Each `send` encodes the
//! whole frame first and hands it to the port in a single write, so frames
//! never interleave.

use pulsegate_hal::SerialPort;
use pulsegate_protocol::{Decoder, DecoderStats, Instruction, Payload};

use crate::error::DeviceError;

/// Serial port plus receive-side decoder state
pub struct Link<S> {
    port: S,
    decoder: Decoder,
}

impl<S: SerialPort> Link<S> {
    /// Wrap a serial port, accepting the full 16-bit payload range
    pub fn new(port: S) -> Self {
        Self::with_max_payload_len(port, u16::MAX)
    }

    /// Wrap a serial port, dropping frames that declare more than `max` bytes
    pub fn with_max_payload_len(port: S, max: u16) -> Self {
        Self {
            port,
            decoder: Decoder::with_max_payload_len(max),
        }
    }

    /// Encode and write one payload
    pub fn send(&mut self, payload: &Payload) -> Result<(), DeviceError> {
        let bytes = payload.encode()?;
        self.port
            .write(&bytes)
            .and_then(|()| self.port.flush())
            .map_err(|_| DeviceError::TransportInterrupted)
    }

    /// Send a text message
    pub fn send_message(&mut self, text: &str) -> Result<(), DeviceError> {
        self.send(&Payload::message(text))
    }

    /// Send an instruction
    pub fn send_instruction(&mut self, instruction: Instruction) -> Result<(), DeviceError> {
        self.send(&Payload::instruction(instruction))
    }

    /// Drain pending bytes until a payload completes or the port runs dry
    ///
    /// Never blocks. Malformed payloads are dropped and decoding continues.
    pub fn poll(&mut self) -> Result<Option<Payload>, DeviceError> {
        loop {
            let byte = match self.port.read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => return Ok(None),
                Err(_) => return Err(DeviceError::TransportInterrupted),
            };
            match self.decoder.feed(byte) {
                Ok(Some(payload)) => return Ok(Some(payload)),
                Ok(None) => {}
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("dropped frame from host: {}", _e);
                }
            }
        }
    }

    /// Receive-side counters
    pub fn stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// Access the underlying port
    pub fn port(&self) -> &S {
        &self.port
    }

    /// Mutable access to the underlying port
    pub fn port_mut(&mut self) -> &mut S {
        &mut self.port
    }

    /// Unwrap the underlying port
    pub fn into_port(self) -> S {
        self.port
    }
}
