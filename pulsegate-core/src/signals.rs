//! Interrupt latches
//!
//! Each latch is set by exactly one interrupt or callback source and read by
//! the main loop. The board wires them up, for example:
//!
//! ```ignore
//! static SIGNALS: Signals = Signals::new();
//!
//! #[interrupt]
//! fn EXTI0() {
//!     SIGNALS.trigger.set();
//! }
//! ```

use portable_atomic::{AtomicBool, Ordering};

/// Single-writer, single-reader boolean flag
#[derive(Debug, Default)]
pub struct Latch {
    flag: AtomicBool,
}

impl Latch {
    /// Create a cleared latch
    pub const fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
        }
    }

    /// Raise the latch (interrupt side)
    pub fn set(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Check without consuming
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Consume the latch, returning whether it was raised
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::AcqRel)
    }

    /// Drop any pending edge
    pub fn clear(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// The latches the device loop observes
#[derive(Debug, Default)]
pub struct Signals {
    /// Arm request (board button)
    pub arm: Latch,
    /// Trigger edge (external interrupt, or the button as a test trigger)
    pub trigger: Latch,
    /// Skip host acquisition and use the stored sequences
    pub skip: Latch,
}

impl Signals {
    /// All latches cleared
    pub const fn new() -> Self {
        Self {
            arm: Latch::new(),
            trigger: Latch::new(),
            skip: Latch::new(),
        }
    }
}
