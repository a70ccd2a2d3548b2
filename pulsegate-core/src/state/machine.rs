//! State machine definition
//!
//! Indicator LEDs and trigger handling are a function of the current state.

use super::events::Event;

/// Device states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Waiting for the arm signal
    #[default]
    Idle,
    /// Waiting for a trigger edge
    Armed,
    /// Executing one pass over all events
    Running,
}

impl State {
    /// Check if a trigger edge should start a pass
    pub fn accepts_trigger(&self) -> bool {
        matches!(self, State::Armed)
    }

    /// Armed LED level for this state
    pub fn armed_led(&self) -> bool {
        matches!(self, State::Armed)
    }

    /// Trigger LED level for this state
    pub fn trigger_led(&self) -> bool {
        matches!(self, State::Running)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            (Idle, Arm) => Armed,

            (Armed, Trigger) => Running,

            (Running, PassComplete) => Idle,
            (Running, Abort) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
