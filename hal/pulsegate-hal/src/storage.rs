//! Persisted sequence storage
//!
//! Boards keep a fallback sequence library (tabular text) in flash or on a
//! filesystem. The core reads it when the host has nothing to offer.

/// Errors from sequence storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No stored sequences
    NotFound,
    /// Buffer too small for the stored data
    BufferTooSmall,
    /// Underlying storage failed
    Io,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageError::NotFound => write!(f, "no stored sequences"),
            StorageError::BufferTooSmall => write!(f, "storage buffer too small"),
            StorageError::Io => write!(f, "storage I/O failure"),
        }
    }
}

/// Read-only access to the stored sequence library
pub trait SequenceStorage {
    /// Size of the stored library in bytes
    fn stored_len(&mut self) -> Result<usize, StorageError>;

    /// Read the stored library into `buffer`
    ///
    /// Returns the number of bytes read.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, StorageError>;
}
