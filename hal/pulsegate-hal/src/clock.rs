//! Monotonic tick clock
//!
//! The tick counter is a free-running `u32` that wraps on overflow. Callers
//! must never compare raw tick values; use the signed difference helpers in
//! `pulsegate-core` instead.

/// Monotonic tick source with a matching blocking sleep
///
/// The tick unit (microseconds, milliseconds) is fixed by the board and
/// must match the accuracy the device is configured with.
pub trait TickClock {
    /// Current value of the wrapping tick counter
    fn ticks(&self) -> u32;

    /// Block for `ticks` tick units
    fn sleep_ticks(&mut self, ticks: u32);
}
