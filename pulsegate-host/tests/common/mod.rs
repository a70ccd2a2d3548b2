//! In-memory duplex byte pipe

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::sync::{Arc, Mutex};

type Buffer = Arc<Mutex<VecDeque<u8>>>;

/// One end of a pipe; reads would block when nothing is pending
#[derive(Clone, Default)]
pub struct PipeEnd {
    rx: Buffer,
    tx: Buffer,
}

/// Two connected ends
pub fn pipe() -> (PipeEnd, PipeEnd) {
    let a = Buffer::default();
    let b = Buffer::default();
    (
        PipeEnd {
            rx: a.clone(),
            tx: b.clone(),
        },
        PipeEnd { rx: b, tx: a },
    )
}

impl PipeEnd {
    /// Write raw bytes towards the other end
    pub fn inject(&self, bytes: &[u8]) {
        self.tx.lock().unwrap().extend(bytes.iter().copied());
    }

    /// Take everything the other end has written
    pub fn drain(&self) -> Vec<u8> {
        self.rx.lock().unwrap().drain(..).collect()
    }
}

impl Read for PipeEnd {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut rx = self.rx.lock().unwrap();
        if rx.is_empty() {
            return Err(ErrorKind::WouldBlock.into());
        }
        let n = buf.len().min(rx.len());
        for (slot, byte) in buf.iter_mut().zip(rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for PipeEnd {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tx.lock().unwrap().extend(buf.iter().copied());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
