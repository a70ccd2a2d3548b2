//! Instruction and message dispatch
//!
//! The device drives the conversation: it asks whether the host has
//! sequences, whether the user wants them, and then asks for them. It also
//! reports status text and echoes each sequence after firing it. The
//! [`Dispatcher`] routes those payloads to a [`HostHandler`] and writes the
//! replies the device is waiting for.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use pulsegate_hal::SerialPort;
use pulsegate_protocol::{Instruction, Payload, Sequence};
use tracing::{debug, info, warn};

use crate::error::HostError;
use crate::session::HostSession;

/// Prefix of the device's missed-deadline reports
pub const MISSED_PREFIX: &str = "Missed";

/// Application side of the host
pub trait HostHandler {
    /// Whether sequences are available to offer the device
    fn check_for_sequences(&mut self) -> bool;

    /// Whether the user chose the host's sequences over the board's
    fn ask_user(&mut self) -> bool;

    /// Sequences to deliver, in order
    fn sequences_to_send(&mut self) -> Vec<Sequence>;

    /// The device finished a pass of `sequence`
    ///
    /// `missed` holds every missed-deadline report received since the
    /// previous pass.
    fn sequence_delivered(&mut self, sequence: Sequence, missed: &[String]);

    /// Status text from the device
    fn message(&mut self, text: &str) {
        info!(text, "device message");
    }
}

/// Routes device payloads to a handler
#[derive(Debug)]
pub struct Dispatcher<H> {
    handler: H,
    missed: Vec<String>,
}

impl<H: HostHandler> Dispatcher<H> {
    /// Wrap a handler
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            missed: Vec::new(),
        }
    }

    /// The wrapped handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutable access to the wrapped handler
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Unwrap the handler
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Missed-deadline reports collected since the last echoed sequence
    pub fn missed(&self) -> &[String] {
        &self.missed
    }

    /// Handle one payload, replying on `session` where the device expects it
    pub fn dispatch<S>(
        &mut self,
        payload: Payload,
        session: &mut HostSession<S>,
    ) -> Result<(), HostError>
    where
        S: SerialPort<Error = io::Error>,
    {
        match payload {
            Payload::Message(text) => {
                self.handler.message(&text);
                if text.starts_with(MISSED_PREFIX) {
                    self.missed.push(text);
                }
                Ok(())
            }
            Payload::Sequence(sequence) => {
                if !self.missed.is_empty() {
                    warn!(
                        sequence = sequence.name(),
                        missed = self.missed.len(),
                        "pass finished with missed deadlines"
                    );
                }
                self.handler.sequence_delivered(sequence, &self.missed);
                self.missed.clear();
                Ok(())
            }
            Payload::Instruction(code) => self.instruction(code, session),
        }
    }

    fn instruction<S>(&mut self, code: i32, session: &mut HostSession<S>) -> Result<(), HostError>
    where
        S: SerialPort<Error = io::Error>,
    {
        match Instruction::from_code(code) {
            Some(Instruction::CheckForSequences) => {
                let yes = self.handler.check_for_sequences();
                debug!(yes, "device asked for sequences");
                session.send_instruction(Instruction::answer(yes))
            }
            Some(Instruction::AskUser) => {
                let yes = self.handler.ask_user();
                debug!(yes, "user chose sequence source");
                session.send_instruction(Instruction::answer(yes))
            }
            Some(Instruction::SendSequences) => {
                let sequences = self.handler.sequences_to_send();
                info!(count = sequences.len(), "sending sequences");
                for sequence in &sequences {
                    session.send_sequence(sequence)?;
                }
                session.send_instruction(Instruction::No)
            }
            Some(answer) => {
                warn!(?answer, "unexpected answer from device");
                Ok(())
            }
            None => {
                warn!(code, "unrecognised instruction");
                Ok(())
            }
        }
    }

    /// Receive and handle at most one payload
    ///
    /// Returns `Ok(false)` if the receive timed out.
    pub fn run_once<S>(&mut self, session: &mut HostSession<S>) -> Result<bool, HostError>
    where
        S: SerialPort<Error = io::Error>,
    {
        match session.receive()? {
            Some(payload) => {
                self.dispatch(payload, session)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Dispatch until `stop` is set or the link fails
    ///
    /// Malformed frames are logged and skipped.
    pub fn run_until<S>(
        &mut self,
        session: &mut HostSession<S>,
        stop: &AtomicBool,
    ) -> Result<(), HostError>
    where
        S: SerialPort<Error = io::Error>,
    {
        while !stop.load(Ordering::Acquire) {
            match self.run_once(session) {
                Ok(_) => {}
                Err(e) if e.is_recoverable() => warn!(error = %e, "skipping frame"),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;
    use pulsegate_protocol::{Decoder, Event};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Loopback {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
    }

    impl SerialPort for Loopback {
        type Error = io::Error;

        fn read_byte(&mut self) -> Result<Option<u8>, io::Error> {
            Ok(self.rx.pop_front())
        }

        fn write(&mut self, data: &[u8]) -> Result<(), io::Error> {
            self.tx.extend_from_slice(data);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Recorder {
        offer: bool,
        accept: bool,
        sequences: Vec<Sequence>,
        messages: Vec<String>,
        delivered: Vec<(Sequence, Vec<String>)>,
    }

    impl HostHandler for Recorder {
        fn check_for_sequences(&mut self) -> bool {
            self.offer
        }

        fn ask_user(&mut self) -> bool {
            self.accept
        }

        fn sequences_to_send(&mut self) -> Vec<Sequence> {
            self.sequences.clone()
        }

        fn sequence_delivered(&mut self, sequence: Sequence, missed: &[String]) {
            self.delivered.push((sequence, missed.to_vec()));
        }

        fn message(&mut self, text: &str) {
            self.messages.push(text.to_string());
        }
    }

    fn seq(name: &str) -> Sequence {
        Sequence::new(name, vec![Event::new(2.0, 0.0, 1.0, 0.01)]).unwrap()
    }

    fn session() -> HostSession<Loopback> {
        HostSession::new(Loopback::default(), HostConfig::default())
    }

    fn replies(session: &HostSession<Loopback>) -> Vec<Payload> {
        let mut decoder = Decoder::new();
        session
            .port()
            .tx
            .iter()
            .filter_map(|&b| decoder.feed(b).unwrap())
            .collect()
    }

    #[test]
    fn test_handshake_replies() {
        let mut session = session();
        let mut dispatcher = Dispatcher::new(Recorder {
            offer: true,
            accept: false,
            sequences: vec![seq("sequence0"), seq("bench")],
            ..Default::default()
        });

        for ins in [
            Instruction::CheckForSequences,
            Instruction::AskUser,
            Instruction::SendSequences,
        ] {
            dispatcher
                .dispatch(Payload::instruction(ins), &mut session)
                .unwrap();
        }

        assert_eq!(
            replies(&session),
            vec![
                Payload::instruction(Instruction::Yes),
                Payload::instruction(Instruction::No),
                Payload::Sequence(seq("sequence0")),
                Payload::Sequence(seq("bench")),
                Payload::instruction(Instruction::No),
            ]
        );
    }

    #[test]
    fn test_unknown_instruction_is_ignored() {
        let mut session = session();
        let mut dispatcher = Dispatcher::new(Recorder::default());
        dispatcher
            .dispatch(Payload::Instruction(99), &mut session)
            .unwrap();
        dispatcher
            .dispatch(Payload::instruction(Instruction::Yes), &mut session)
            .unwrap();
        assert!(session.port().tx.is_empty());
    }

    #[test]
    fn test_missed_reports_are_handed_over_with_echo() {
        let mut session = session();
        let mut dispatcher = Dispatcher::new(Recorder::default());
        let missed = "Missed scheduled onset time of pulse 0 in sequence0:event0 by 50 us";

        for payload in [
            Payload::message("Ready to be armed!"),
            Payload::message(missed),
            Payload::Sequence(seq("sequence0")),
            Payload::Sequence(seq("sequence0")),
        ] {
            dispatcher.dispatch(payload, &mut session).unwrap();
        }

        let handler = dispatcher.into_handler();
        assert_eq!(handler.messages, vec!["Ready to be armed!", missed]);
        assert_eq!(
            handler.delivered,
            vec![
                (seq("sequence0"), vec![missed.to_string()]),
                (seq("sequence0"), Vec::new()),
            ]
        );
    }

    #[test]
    fn test_run_once_times_out() {
        let mut session = HostSession::new(
            Loopback::default(),
            HostConfig {
                receive_timeout_ms: 5,
                poll_interval_ms: 1,
            },
        );
        let mut dispatcher = Dispatcher::new(Recorder::default());
        assert!(!dispatcher.run_once(&mut session).unwrap());
    }

    #[test]
    fn test_run_until_skips_malformed_frames() {
        let mut session = HostSession::new(
            Loopback::default(),
            HostConfig {
                receive_timeout_ms: 5,
                poll_interval_ms: 1,
            },
        );
        let bad = pulsegate_protocol::encode_frame(0x07, b"maybe").unwrap();
        let good = Payload::instruction(Instruction::CheckForSequences)
            .encode()
            .unwrap();
        session.port_mut().rx.extend(bad);
        session.port_mut().rx.extend(good);

        struct StopAfterAnswer(Recorder, &'static AtomicBool);
        impl HostHandler for StopAfterAnswer {
            fn check_for_sequences(&mut self) -> bool {
                self.1.store(true, Ordering::Release);
                true
            }
            fn ask_user(&mut self) -> bool {
                self.0.ask_user()
            }
            fn sequences_to_send(&mut self) -> Vec<Sequence> {
                self.0.sequences_to_send()
            }
            fn sequence_delivered(&mut self, sequence: Sequence, missed: &[String]) {
                self.0.sequence_delivered(sequence, missed)
            }
        }

        static STOP: AtomicBool = AtomicBool::new(false);
        let mut dispatcher = Dispatcher::new(StopAfterAnswer(Recorder::default(), &STOP));
        dispatcher.run_until(&mut session, &STOP).unwrap();

        assert_eq!(replies(&session), vec![Payload::instruction(Instruction::Yes)]);
        assert_eq!(session.stats().malformed_payloads, 1);
    }
}
