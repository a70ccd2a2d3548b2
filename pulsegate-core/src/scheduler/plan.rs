//! Tick-domain plan of one pass
//!
//! Converting a sequence to ticks happens while the device is armed, so the
//! pass itself does no floating point work.
//!
//! Onsets and window ends are offsets from the trigger tick and must fit the
//! `u32` counter. Periods and widths saturate instead: a period past the
//! counter range simply ends the window after its first pulse.

use alloc::vec::Vec;

use pulsegate_protocol::{EventName, Sequence};

use crate::error::DeviceError;
use crate::tick::Accuracy;

/// One event converted to ticks, relative to the trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventPlan {
    /// Event name (firing order)
    pub name: EventName,
    /// Pulse period, at least one tick
    pub period: u32,
    /// First pulse offset from the trigger
    pub onset: u32,
    /// End of the pulse window (exclusive) from the trigger
    pub end: u32,
    /// High time of each pulse, at least one tick
    pub pulse_width: u32,
}

/// All events of a sequence in firing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    events: Vec<EventPlan>,
}

impl RunPlan {
    /// Convert a validated sequence at the given tick resolution
    ///
    /// Fails with `WindowOutOfRange` if any event window ends past the
    /// counter range.
    pub fn new(sequence: &Sequence, accuracy: Accuracy) -> Result<Self, DeviceError> {
        let events = sequence
            .iter_named()
            .map(|(name, event)| {
                let end = accuracy
                    .checked_seconds_to_ticks(event.end())
                    .ok_or(DeviceError::WindowOutOfRange)?;
                Ok(EventPlan {
                    name,
                    period: accuracy.seconds_to_ticks(event.period()).max(1),
                    onset: accuracy.seconds_to_ticks(event.onset),
                    end,
                    pulse_width: accuracy.seconds_to_ticks(event.pulse_width).max(1),
                })
            })
            .collect::<Result<Vec<_>, DeviceError>>()?;
        Ok(Self { events })
    }

    /// Planned events in firing order
    pub fn events(&self) -> &[EventPlan] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsegate_protocol::Event;

    fn plan(event: Event, accuracy: Accuracy) -> Result<RunPlan, DeviceError> {
        RunPlan::new(&Sequence::new("s", vec![event]).unwrap(), accuracy)
    }

    #[test]
    fn test_two_hertz_plan() {
        let plan = plan(Event::new(2.0, 0.0, 1.0, 0.01), Accuracy::Micros).unwrap();
        let event = plan.events()[0];
        assert_eq!(event.name, EventName(0));
        assert_eq!(event.period, 500_000);
        assert_eq!(event.onset, 0);
        assert_eq!(event.end, 1_000_000);
        assert_eq!(event.pulse_width, 10_000);
    }

    #[test]
    fn test_onset_shifts_window() {
        let event = plan(Event::new(10.0, 0.25, 0.5, 0.001), Accuracy::Millis).unwrap().events()[0];
        assert_eq!(event.onset, 250);
        assert_eq!(event.end, 750);
        assert_eq!(event.period, 100);
        assert_eq!(event.pulse_width, 1);
    }

    #[test]
    fn test_tiny_values_are_clamped() {
        // 1 MHz at millisecond accuracy would round to a zero period
        let event = plan(Event::new(1e6, 0.0, 0.003, 1e-7), Accuracy::Millis).unwrap().events()[0];
        assert_eq!(event.period, 1);
        assert_eq!(event.pulse_width, 1);
    }

    #[test]
    fn test_long_window_fits_unsigned_range() {
        // 2500 s is past 2^31 us but inside 2^32
        let event = plan(Event::new(0.0005, 0.0, 2500.0, 0.01), Accuracy::Micros).unwrap().events()[0];
        assert_eq!(event.period, 2_000_000_000);
        assert_eq!(event.end, 2_500_000_000);
    }

    #[test]
    fn test_window_past_counter_range_is_rejected() {
        let result = plan(Event::new(1.0, 0.0, 5000.0, 0.01), Accuracy::Micros);
        assert_eq!(result, Err(DeviceError::WindowOutOfRange));
        // The same window fits at millisecond accuracy
        assert!(plan(Event::new(1.0, 0.0, 5000.0, 0.01), Accuracy::Millis).is_ok());
    }

    #[test]
    fn test_huge_period_saturates() {
        let event = plan(Event::new(1e-6, 0.0, 1.0, 0.01), Accuracy::Micros).unwrap().events()[0];
        assert_eq!(event.period, u32::MAX);
    }

    #[test]
    fn test_plan_keeps_firing_order() {
        let seq = Sequence::new(
            "s",
            vec![
                Event::new(1.0, 0.0, 1.0, 0.01),
                Event::new(4.0, 0.0, 1.0, 0.01),
            ],
        )
        .unwrap();
        let plan = RunPlan::new(&seq, Accuracy::Micros).unwrap();
        assert_eq!(plan.events().len(), 2);
        assert_eq!(plan.events()[1].name, EventName(1));
        assert_eq!(plan.events()[1].period, 250_000);
    }
}
