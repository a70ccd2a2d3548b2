//! Board-agnostic core logic for the pulse sequencer
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Wrapping tick arithmetic
//! - Interrupt latches (arm, trigger, skip)
//! - State machine for the trigger cycle
//! - Pulse scheduler and real-time executor
//! - Device configuration
//! - Device control loop (acquisition handshake, arm, fire, report)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod config;
pub mod device;
pub mod error;
pub mod link;
pub mod scheduler;
pub mod signals;
pub mod state;
pub mod tick;

#[cfg(test)]
mod testing;

pub use config::DeviceConfig;
pub use device::{Device, DevicePins, SequenceSource};
pub use error::DeviceError;
pub use link::Link;
pub use signals::{Latch, Signals};
pub use tick::{ticks_add, ticks_diff, Accuracy};
