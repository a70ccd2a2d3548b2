//! Adapter from a std byte stream to [`SerialPort`]
//!
//! The stream should be non-blocking or carry a short read timeout (a serial
//! port opened with a timeout, a `TcpStream` with `set_read_timeout`). Reads
//! that would block or time out are reported as "no byte yet".

use std::io::{self, ErrorKind, Read, Write};

use pulsegate_hal::SerialPort;

/// Serial port over any `Read + Write` stream
#[derive(Debug)]
pub struct IoTransport<T> {
    inner: T,
}

impl<T> IoTransport<T> {
    /// Wrap a stream
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Access the wrapped stream
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutable access to the wrapped stream
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwrap the stream
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Write> SerialPort for IoTransport<T> {
    type Error = io::Error;

    fn read_byte(&mut self) -> Result<Option<u8>, io::Error> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Err(io::Error::from(ErrorKind::UnexpectedEof)),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Ok(None)
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<(), io::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Stream yielding scripted read results
    struct Scripted {
        reads: VecDeque<io::Result<u8>>,
        written: Vec<u8>,
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.reads.pop_front() {
                Some(Ok(b)) => {
                    buf[0] = b;
                    Ok(1)
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }

    impl Write for Scripted {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn transport(reads: Vec<io::Result<u8>>) -> IoTransport<Scripted> {
        IoTransport::new(Scripted {
            reads: reads.into(),
            written: Vec::new(),
        })
    }

    #[test]
    fn test_read_maps_would_block_to_none() {
        let mut port = transport(vec![
            Ok(0x01),
            Err(ErrorKind::WouldBlock.into()),
            Err(ErrorKind::TimedOut.into()),
            Err(ErrorKind::Interrupted.into()),
            Ok(0x02),
        ]);
        assert_eq!(port.read_byte().unwrap(), Some(0x01));
        assert_eq!(port.read_byte().unwrap(), None);
        assert_eq!(port.read_byte().unwrap(), None);
        // Interrupted is retried transparently
        assert_eq!(port.read_byte().unwrap(), Some(0x02));
    }

    #[test]
    fn test_closed_stream_is_an_error() {
        let mut port = transport(Vec::new());
        let err = port.read_byte().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_other_errors_propagate() {
        let mut port = transport(vec![Err(ErrorKind::BrokenPipe.into())]);
        assert_eq!(port.read_byte().unwrap_err().kind(), ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_write_passes_through() {
        let mut port = transport(Vec::new());
        port.write(&[1, 2, 3]).unwrap();
        port.flush().unwrap();
        assert_eq!(port.get_ref().written, vec![1, 2, 3]);
    }
}
