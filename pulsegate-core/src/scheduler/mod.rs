//! Pulse scheduler
//!
//! Converts a sequence into a tick-domain plan when the device is armed and
//! executes it against the tick clock when the trigger arrives.

pub mod executor;
pub mod output;
pub mod plan;

pub use executor::{missed_message, Pass, PassReport};
pub use output::PulseOutput;
pub use plan::{EventPlan, RunPlan};
