//! Device control loop
//!
//! The device coordinates the host link, the interrupt latches, and the
//! pulse scheduler:
//! - Acquires sequences from the host, or from storage as a fallback
//! - Waits for the arm signal, then for the trigger edge
//! - Runs one pass of the active sequence
//! - Echoes the sequence back to the host and re-arms

use alloc::format;
use alloc::vec;
use core::convert::Infallible;

use pulsegate_hal::{OutputPin, SequenceStorage, SerialPort, StorageError, TickClock};
use pulsegate_protocol::{tsv, Instruction, Payload, SequenceError, SequenceLibrary};

use crate::config::DeviceConfig;
use crate::error::DeviceError;
use crate::link::Link;
use crate::scheduler::{Pass, PassReport, PulseOutput, RunPlan};
use crate::signals::Signals;
use crate::state::{Event, State};
use crate::tick::{ticks_add, ticks_diff};

/// Status sent whenever the device returns to Idle
pub const READY_MESSAGE: &str = "Ready to be armed!";

/// Status sent when the host delivered sequences
pub const RECEIVED_MESSAGE: &str = "Sequences received!";

/// Output pins owned by the device
pub struct DevicePins<P, L> {
    /// Pulse output
    pub output: P,
    /// LED mirroring the pulse output
    pub pulse_led: L,
    /// Lit while waiting for the trigger
    pub armed_led: L,
    /// Lit while a pass is running
    pub trigger_led: L,
}

/// Where the sequence library came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceSource {
    /// Delivered by the host during acquisition
    Host,
    /// Parsed from on-board storage
    Storage,
}

/// The pulse sequencer device
pub struct Device<'a, S, C, P, L, St> {
    config: DeviceConfig,
    signals: &'a Signals,
    link: Link<S>,
    clock: C,
    output: PulseOutput<P, L>,
    armed_led: L,
    trigger_led: L,
    storage: St,
    library: SequenceLibrary,
    /// Plan of the active sequence, built when armed
    plan: Option<RunPlan>,
    state: State,
}

impl<'a, S, C, P, L, St> Device<'a, S, C, P, L, St>
where
    S: SerialPort,
    C: TickClock,
    P: OutputPin,
    L: OutputPin,
    St: SequenceStorage,
{
    /// Create a device in the Idle state with all outputs off
    pub fn new(
        config: DeviceConfig,
        signals: &'a Signals,
        serial: S,
        clock: C,
        pins: DevicePins<P, L>,
        storage: St,
    ) -> Self {
        let output = PulseOutput::new(pins.output, pins.pulse_led, config.output_active_low);
        let link = Link::with_max_payload_len(serial, config.max_payload_len);
        let mut device = Self {
            config,
            signals,
            link,
            clock,
            output,
            armed_led: pins.armed_led,
            trigger_led: pins.trigger_led,
            storage,
            library: SequenceLibrary::new(),
            plan: None,
            state: State::Idle,
        };
        device.update_indicators();
        device
    }

    /// Run forever: acquire, then cycle arm → trigger → pass
    ///
    /// Only returns on an error; the board decides whether to reconnect.
    pub fn run(&mut self) -> Result<Infallible, DeviceError> {
        self.acquire_sequences()?;
        self.announce_ready()?;
        loop {
            self.cycle()?;
        }
    }

    /// One full trigger cycle starting from Idle
    pub fn cycle(&mut self) -> Result<PassReport, DeviceError> {
        self.wait_for_arm();
        self.arm()?;
        let start_tick = self.wait_for_trigger();
        self.fire(start_tick)
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Device configuration
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Sequences available to the device
    pub fn library(&self) -> &SequenceLibrary {
        &self.library
    }

    /// Framed host link
    pub fn link(&self) -> &Link<S> {
        &self.link
    }

    /// Pulse output
    pub fn output(&self) -> &PulseOutput<P, L> {
        &self.output
    }

    /// Armed indicator
    pub fn armed_led(&self) -> &L {
        &self.armed_led
    }

    /// Trigger indicator
    pub fn trigger_led(&self) -> &L {
        &self.trigger_led
    }

    /// Tick clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Obtain the sequence library
    ///
    /// Asks the host first. Falls back to storage when the host declines,
    /// does not answer in time, sends nothing, or the skip latch is raised.
    pub fn acquire_sequences(&mut self) -> Result<SequenceSource, DeviceError> {
        let received = self.request_from_host()?;
        if !received.is_empty() {
            #[cfg(feature = "defmt")]
            defmt::info!("received {} sequences from host", received.len());
            self.library = received;
            self.link.send_message(RECEIVED_MESSAGE)?;
            return Ok(SequenceSource::Host);
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("no sequences from host, loading stored library");
        let text = format!("Loading {} stored on board!", self.config.stored_sequences);
        self.link.send_message(&text)?;
        self.library = self.load_stored()?;
        Ok(SequenceSource::Storage)
    }

    /// Tell the host the device is waiting for the arm signal
    pub fn announce_ready(&mut self) -> Result<(), DeviceError> {
        self.link.send_message(READY_MESSAGE)
    }

    /// Block until the arm latch is raised
    pub fn wait_for_arm(&mut self) {
        let poll = self.config.arm_poll_ticks();
        while !self.signals.arm.take() {
            self.clock.sleep_ticks(poll);
        }
    }

    /// Plan the active sequence and wait for a trigger
    ///
    /// Trigger edges seen before this point are discarded. A sequence whose
    /// windows do not fit the tick counter is refused and the device stays
    /// Idle.
    pub fn arm(&mut self) -> Result<(), DeviceError> {
        let sequence = self
            .library
            .get(&self.config.active_sequence)
            .ok_or(DeviceError::UnknownSequence)?;
        self.plan = Some(RunPlan::new(sequence, self.config.accuracy)?);
        self.signals.trigger.clear();
        self.apply(Event::Arm);
        Ok(())
    }

    /// Spin until the trigger latch is raised
    ///
    /// Returns the tick read immediately after the edge was observed.
    pub fn wait_for_trigger(&mut self) -> u32 {
        loop {
            if self.signals.trigger.take() {
                return self.clock.ticks();
            }
            self.clock.sleep_ticks(1);
        }
    }

    /// Run one pass anchored at `start_tick`, then return to Idle
    ///
    /// Does nothing unless the device is armed. On a link failure the pass
    /// stops, the device returns to Idle, and the error is propagated.
    pub fn fire(&mut self, start_tick: u32) -> Result<PassReport, DeviceError> {
        if !self.state.accepts_trigger() {
            return Ok(PassReport::default());
        }
        let Some(plan) = self.plan.take() else {
            return Ok(PassReport::default());
        };
        self.apply(Event::Trigger);

        let name = self.config.active_sequence.as_str();
        let result = Pass::new(&plan, name, self.config.accuracy, start_tick).run(
            &mut self.clock,
            &mut self.output,
            &mut self.link,
        );
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                self.apply(Event::Abort);
                return Err(e);
            }
        };

        #[cfg(feature = "defmt")]
        defmt::info!("pass complete: {}", report);

        let echo = self.library.get(name).cloned().map(Payload::Sequence);
        if let Some(echo) = echo {
            if let Err(e) = self.link.send(&echo) {
                self.apply(Event::Abort);
                return Err(e);
            }
        }

        // A new pass needs a fresh arm signal
        self.signals.trigger.clear();
        self.signals.arm.clear();
        self.apply(Event::PassComplete);
        self.announce_ready()?;
        Ok(report)
    }

    fn apply(&mut self, event: Event) {
        let next = self.state.transition(event);
        if next != self.state {
            #[cfg(feature = "defmt")]
            defmt::info!("state: {} -> {}", self.state, next);
            self.state = next;
            self.update_indicators();
        }
    }

    fn update_indicators(&mut self) {
        self.armed_led.set_state(self.state.armed_led());
        self.trigger_led.set_state(self.state.trigger_led());
    }

    /// Run the acquisition handshake
    fn request_from_host(&mut self) -> Result<SequenceLibrary, DeviceError> {
        let mut library = SequenceLibrary::new();

        for request in [Instruction::CheckForSequences, Instruction::AskUser] {
            self.link.send_instruction(request)?;
            if !self.await_answer()? {
                return Ok(library);
            }
        }

        self.link.send_instruction(Instruction::SendSequences)?;
        while let Some(payload) = self.await_payload()? {
            match payload {
                Payload::Sequence(sequence) => library.insert(sequence),
                Payload::Instruction(code) if code == Instruction::No.code() => break,
                _ => {}
            }
        }
        Ok(library)
    }

    /// Wait for a yes/no answer; a timeout or skip counts as no
    fn await_answer(&mut self) -> Result<bool, DeviceError> {
        while let Some(payload) = self.await_payload()? {
            if let Some(answer) = payload.as_instruction().and_then(Instruction::as_answer) {
                return Ok(answer);
            }
        }
        Ok(false)
    }

    /// Wait for the next payload within the reply timeout
    ///
    /// Returns `None` on timeout or when the skip latch is raised.
    fn await_payload(&mut self) -> Result<Option<Payload>, DeviceError> {
        let deadline = ticks_add(self.clock.ticks(), self.config.reply_timeout_ticks());
        let poll = self.config.arm_poll_ticks();
        loop {
            if self.signals.skip.take() {
                #[cfg(feature = "defmt")]
                defmt::info!("acquisition skipped");
                return Ok(None);
            }
            if let Some(payload) = self.link.poll()? {
                return Ok(Some(payload));
            }
            if ticks_diff(deadline, self.clock.ticks()) <= 0 {
                return Ok(None);
            }
            self.clock.sleep_ticks(poll);
        }
    }

    /// Parse the library kept in storage
    fn load_stored(&mut self) -> Result<SequenceLibrary, DeviceError> {
        let len = self.storage.stored_len()?;
        let mut buffer = vec![0u8; len];
        let read = self.storage.read(&mut buffer)?;
        let bytes = buffer.get(..read).ok_or(StorageError::BufferTooSmall)?;
        let text = core::str::from_utf8(bytes).map_err(|e| {
            let line = bytes[..e.valid_up_to()].iter().filter(|&&b| b == b'\n').count() + 1;
            SequenceError::Syntax(line)
        })?;
        Ok(tsv::decode_library(text)?)
    }
}
