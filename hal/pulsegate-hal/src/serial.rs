//! Serial byte link to the host
//!
//! The link is modelled as a byte pipe: reads never block, writes push a
//! whole buffer out. Connection lifecycle (enumeration, connect, close) is
//! owned by the board or the host application, not by this trait.

/// Non-blocking serial link
pub trait SerialPort {
    /// Error raised when the link is physically interrupted
    type Error;

    /// Read one byte if one is available
    ///
    /// Returns `Ok(None)` immediately when no byte is pending.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Write the whole buffer to the link
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
