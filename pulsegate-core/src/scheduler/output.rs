//! Pulse output with a mirrored indicator

use pulsegate_hal::{OutputPin, TickClock};

/// Pulse output pin plus the LED that mirrors it
///
/// The output can be active-low, in which case the pin idles high. The
/// indicator is always active-high.
pub struct PulseOutput<P, L> {
    pin: P,
    indicator: L,
    /// If true, pulse asserted = pin LOW
    active_low: bool,
    /// Current logical state (true = pulse asserted)
    asserted: bool,
}

impl<P: OutputPin, L: OutputPin> PulseOutput<P, L> {
    /// Create a pulse output, driving it to the idle level
    pub fn new(pin: P, indicator: L, active_low: bool) -> Self {
        let mut output = Self {
            pin,
            indicator,
            active_low,
            asserted: false,
        };
        output.set_asserted(false);
        output
    }

    /// Drive the output and indicator
    pub fn set_asserted(&mut self, asserted: bool) {
        self.asserted = asserted;
        self.pin.set_state(asserted != self.active_low);
        self.indicator.set_state(asserted);
    }

    /// Check if a pulse is currently being emitted
    pub fn is_asserted(&self) -> bool {
        self.asserted
    }

    /// Emit one pulse, blocking for its width
    pub fn fire<C: TickClock>(&mut self, clock: &mut C, width_ticks: u32) {
        self.set_asserted(true);
        clock.sleep_ticks(width_ticks);
        self.set_asserted(false);
    }

    /// Access the output pin
    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Access the indicator pin
    pub fn indicator(&self) -> &L {
        &self.indicator
    }
}
