//! Longitudinal redundancy check
//!
//! The checksum is the two's-complement negation of the byte sum, so the
//! payload bytes plus their LRC always sum to zero modulo 256.
//!
//! LRC catches every single-bit and single-byte error, but any multi-byte
//! corruption that preserves the sum (e.g. +1 on one byte, -1 on another)
//! goes undetected.

/// Compute the LRC of `bytes`
///
/// Defined for any input; the empty slice yields 0.
pub fn compute_lrc(bytes: &[u8]) -> u8 {
    let mut lrc = Lrc::new();
    lrc.update(bytes);
    lrc.finish()
}

/// Running LRC accumulator
///
/// Used by the decoder to checksum a payload one byte at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lrc {
    sum: u8,
}

impl Lrc {
    /// Create an empty accumulator
    pub const fn new() -> Self {
        Self { sum: 0 }
    }

    /// Add one byte
    pub fn push(&mut self, byte: u8) {
        self.sum = self.sum.wrapping_add(byte);
    }

    /// Add a run of bytes
    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    /// Finalize: `((sum ^ 0xFF) + 1) mod 256`
    pub fn finish(&self) -> u8 {
        (self.sum ^ 0xFF).wrapping_add(1)
    }

    /// Clear the accumulator
    pub fn reset(&mut self) {
        self.sum = 0;
    }
}
