//! Wrapping tick arithmetic and time units
//!
//! The board's tick counter is a free-running `u32`. All comparisons go
//! through [`ticks_diff`], which stays correct across a wrap as long as the
//! two instants are less than 2^31 ticks apart (about 35 minutes at
//! microsecond accuracy). Offsets from a known earlier instant go through
//! [`ticks_elapsed`] instead, which covers the full 2^32 range.

use serde::Deserialize;

/// Number of distinct counter values (2^32)
const TICK_RANGE: f64 = 4_294_967_296.0;

/// Signed distance from `b` to `a` in ticks
///
/// Positive when `a` is later than `b`.
#[inline]
pub fn ticks_diff(a: u32, b: u32) -> i32 {
    a.wrapping_sub(b) as i32
}

/// `t + delta` on the wrapping counter
#[inline]
pub fn ticks_add(t: u32, delta: u32) -> u32 {
    t.wrapping_add(delta)
}

/// Unsigned ticks from `since` to `now`, where `since` is not later than `now`
///
/// Correct across a wrap for spans below 2^32 ticks.
#[inline]
pub fn ticks_elapsed(since: u32, now: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Resolution of the tick clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Accuracy {
    /// One tick per microsecond
    #[default]
    #[serde(rename = "us")]
    Micros,
    /// One tick per millisecond
    #[serde(rename = "ms")]
    Millis,
}

impl Accuracy {
    /// Ticks per second
    pub fn conversion_factor(self) -> f64 {
        match self {
            Accuracy::Micros => 1_000_000.0,
            Accuracy::Millis => 1_000.0,
        }
    }

    /// Unit label used in status messages
    pub fn unit(self) -> &'static str {
        match self {
            Accuracy::Micros => "us",
            Accuracy::Millis => "ms",
        }
    }

    /// Convert seconds to the nearest whole tick
    ///
    /// Negative and non-finite inputs give 0; values past the counter range
    /// saturate.
    pub fn seconds_to_ticks(self, seconds: f64) -> u32 {
        // `as` saturates and maps NaN to 0
        (seconds * self.conversion_factor() + 0.5) as u32
    }

    /// Convert seconds to the nearest whole tick, or `None` past the counter range
    pub fn checked_seconds_to_ticks(self, seconds: f64) -> Option<u32> {
        let ticks = seconds * self.conversion_factor() + 0.5;
        if ticks < TICK_RANGE {
            Some(ticks as u32)
        } else {
            None
        }
    }

    /// Convert milliseconds to ticks
    pub fn millis_to_ticks(self, ms: u32) -> u32 {
        match self {
            Accuracy::Micros => ms.saturating_mul(1_000),
            Accuracy::Millis => ms,
        }
    }
}
