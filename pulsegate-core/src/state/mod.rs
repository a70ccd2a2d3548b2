//! Trigger cycle state machine
//!
//! The device cycles Idle → Armed → Running → Idle for as long as it runs.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::State;
