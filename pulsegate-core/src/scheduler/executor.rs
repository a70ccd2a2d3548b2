//! Real-time pass executor
//!
//! Fires every planned pulse of one pass against the tick clock. Events run
//! one after another in firing order; within an event, pulses are scheduled
//! at `start + onset + k * period` until the window ends.
//!
//! Pulse times are tracked as unwrapped offsets from the trigger tick, so a
//! pass may span up to 2^32 ticks (about 71 minutes at microsecond
//! accuracy).
//!
//! A pulse whose time has already passed is fired immediately and reported
//! to the host. Firing blocks for the pulse width, so an event whose pulses
//! land inside another event's pulse will see them reported as missed even
//! though they are still emitted.

use alloc::format;
use alloc::string::String;

use pulsegate_hal::{OutputPin, SerialPort, TickClock};
use pulsegate_protocol::EventName;

use super::output::PulseOutput;
use super::plan::{EventPlan, RunPlan};
use crate::error::DeviceError;
use crate::link::Link;
use crate::tick::{ticks_elapsed, Accuracy};

/// Outcome of one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PassReport {
    /// Pulses emitted, late ones included
    pub pulses_fired: u32,
    /// Pulses emitted after their scheduled tick
    pub missed: u32,
}

/// Status text for a late pulse
pub fn missed_message(
    pulse: u32,
    sequence: &str,
    event: EventName,
    late_ticks: u32,
    accuracy: Accuracy,
) -> String {
    format!(
        "Missed scheduled onset time of pulse {} in {}:{} by {} {}",
        pulse,
        sequence,
        event,
        late_ticks,
        accuracy.unit()
    )
}

/// One pass over a planned sequence
pub struct Pass<'a> {
    plan: &'a RunPlan,
    sequence: &'a str,
    accuracy: Accuracy,
    start_tick: u32,
}

impl<'a> Pass<'a> {
    /// Prepare a pass anchored at the trigger tick
    ///
    /// `start_tick` must not be later than the clock's current tick.
    pub fn new(plan: &'a RunPlan, sequence: &'a str, accuracy: Accuracy, start_tick: u32) -> Self {
        Self {
            plan,
            sequence,
            accuracy,
            start_tick,
        }
    }

    /// Fire every pulse of the plan
    ///
    /// Returns early only if a miss report cannot be written; pulses fired
    /// up to that point stay fired.
    pub fn run<C, P, L, S>(
        &self,
        clock: &mut C,
        output: &mut PulseOutput<P, L>,
        link: &mut Link<S>,
    ) -> Result<PassReport, DeviceError>
    where
        C: TickClock,
        P: OutputPin,
        L: OutputPin,
        S: SerialPort,
    {
        let mut report = PassReport::default();
        for event in self.plan.events() {
            self.run_event(event, clock, output, link, &mut report)?;
        }
        Ok(report)
    }

    fn run_event<C, P, L, S>(
        &self,
        event: &EventPlan,
        clock: &mut C,
        output: &mut PulseOutput<P, L>,
        link: &mut Link<S>,
        report: &mut PassReport,
    ) -> Result<(), DeviceError>
    where
        C: TickClock,
        P: OutputPin,
        L: OutputPin,
        S: SerialPort,
    {
        let mut offset = event.onset;
        let mut pulse = 0u32;

        while offset < event.end {
            let elapsed = ticks_elapsed(self.start_tick, clock.ticks());

            if offset > elapsed {
                clock.sleep_ticks(offset - elapsed);
                output.fire(clock, event.pulse_width);
            } else if offset == elapsed {
                output.fire(clock, event.pulse_width);
            } else {
                output.fire(clock, event.pulse_width);
                let late = elapsed - offset;
                report.missed += 1;
                #[cfg(feature = "defmt")]
                defmt::warn!("{} pulse {} late by {} ticks", event.name, pulse, late);
                link.send_message(&missed_message(
                    pulse,
                    self.sequence,
                    event.name,
                    late,
                    self.accuracy,
                ))?;
            }

            report.pulses_fired += 1;
            pulse += 1;
            offset = match offset.checked_add(event.period) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(())
    }
}
