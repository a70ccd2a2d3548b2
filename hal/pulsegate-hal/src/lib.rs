//! Pulsegate Hardware Abstraction Layer
//!
//! This crate defines the hardware seams the pulse sequencer needs. A board
//! support crate implements them for a specific chip; tests implement them
//! with mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pulsegate-core (device control loop)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pulsegate-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  board support (pins, timer, USB VCP)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Pulse output and indicator LEDs
//! - [`clock::TickClock`] - Monotonic wrapping tick counter with blocking sleep
//! - [`serial::SerialPort`] - Non-blocking byte link to the host
//! - [`storage::SequenceStorage`] - Sequences persisted on the board

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod gpio;
pub mod serial;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use clock::TickClock;
pub use gpio::OutputPin;
pub use serial::SerialPort;
pub use storage::{SequenceStorage, StorageError};
