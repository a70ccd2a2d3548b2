//! Output pins driven by the sequencer
//!
//! The pulse output and the three indicator LEDs are plain push-pull
//! outputs; the core never reads an input pin (arm, trigger and skip
//! arrive as latches raised from interrupt handlers).

/// Digital output pin
///
/// Used for the pulse output itself and for the status indicators.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;
}
