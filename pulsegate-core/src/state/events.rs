//! Events that trigger state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Arm latch observed
    Arm,
    /// Trigger edge observed while armed
    Trigger,
    /// All events of the pass exhausted their windows
    PassComplete,
    /// The pass was cut short (link failure)
    Abort,
}

