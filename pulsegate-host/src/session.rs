//! Host side of the framed link
//!
//! A session owns the transport and its own decoder. `receive` polls the
//! transport with the configured timeout; once the first byte of a reply
//! has arrived the timeout no longer applies, so a frame in flight is never
//! abandoned halfway.

use std::io;
use std::thread;
use std::time::Instant;

use pulsegate_hal::SerialPort;
use pulsegate_protocol::{Decoder, DecoderStats, Instruction, Payload, Sequence};
use tracing::{debug, trace, warn};

use crate::config::HostConfig;
use crate::error::HostError;

/// Framed connection to one device
#[derive(Debug)]
pub struct HostSession<S> {
    port: S,
    decoder: Decoder,
    config: HostConfig,
}

impl<S> HostSession<S>
where
    S: SerialPort<Error = io::Error>,
{
    /// Open a session over an already connected transport
    pub fn new(port: S, config: HostConfig) -> Self {
        debug!(?config, "host session opened");
        Self {
            port,
            decoder: Decoder::new(),
            config,
        }
    }

    /// Session settings
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Receive-side counters
    pub fn stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// Access the transport
    pub fn port(&self) -> &S {
        &self.port
    }

    /// Mutable access to the transport
    pub fn port_mut(&mut self) -> &mut S {
        &mut self.port
    }

    /// Close the session and hand back the transport
    pub fn into_port(self) -> S {
        self.port
    }

    /// Encode one payload and write it as a single unit
    pub fn send(&mut self, payload: &Payload) -> Result<(), HostError> {
        let bytes = payload.encode()?;
        trace!(kind = ?payload.payload_type(), len = bytes.len(), "sending frame");
        self.port.write(&bytes)?;
        self.port.flush()?;
        Ok(())
    }

    /// Send an instruction
    pub fn send_instruction(&mut self, instruction: Instruction) -> Result<(), HostError> {
        self.send(&Payload::instruction(instruction))
    }

    /// Send one sequence
    pub fn send_sequence(&mut self, sequence: &Sequence) -> Result<(), HostError> {
        self.send(&Payload::Sequence(sequence.clone()))
    }

    /// Wait for the next payload
    ///
    /// Returns `Ok(None)` if the timeout expires before any byte arrives.
    /// A frame that passes the checksum but does not parse is returned as
    /// `HostError::Protocol`; the decoder has already resynchronized, so the
    /// caller can keep receiving.
    pub fn receive(&mut self) -> Result<Option<Payload>, HostError> {
        let mut deadline = self.config.receive_timeout().map(|t| Instant::now() + t);
        loop {
            let Some(byte) = self.port.read_byte()? else {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    return Ok(None);
                }
                thread::sleep(self.config.poll_interval());
                continue;
            };
            deadline = None;

            match self.decoder.feed(byte) {
                Ok(Some(payload)) => {
                    debug!(?payload, "received payload");
                    return Ok(Some(payload));
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "dropped malformed frame");
                    return Err(e.into());
                }
            }
        }
    }
}
