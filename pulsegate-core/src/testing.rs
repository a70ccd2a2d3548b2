//! Mock hardware for unit tests

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use pulsegate_hal::{OutputPin, SequenceStorage, SerialPort, StorageError, TickClock};
use pulsegate_protocol::{Decoder, Payload};

use crate::signals::Latch;

/// Tick clock that only moves when slept on
///
/// Clones share the same time, so pins can stamp their writes.
#[derive(Clone)]
pub struct MockClock {
    now: Rc<Cell<u32>>,
    raise_at: Option<(u32, &'static Latch)>,
}

impl MockClock {
    pub fn new(now: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
            raise_at: None,
        }
    }

    /// Raise `latch` once the clock reaches `tick`
    pub fn raise_at(mut self, tick: u32, latch: &'static Latch) -> Self {
        self.raise_at = Some((tick, latch));
        self
    }
}

impl TickClock for MockClock {
    fn ticks(&self) -> u32 {
        self.now.get()
    }

    fn sleep_ticks(&mut self, ticks: u32) {
        let before = self.now.get();
        let after = before.wrapping_add(ticks);
        self.now.set(after);
        if let Some((at, latch)) = self.raise_at {
            if after.wrapping_sub(at) as i32 >= 0 {
                latch.set();
                self.raise_at = None;
            }
        }
    }
}

/// Output pin recording every write with its tick
pub struct MockPin {
    now: Rc<Cell<u32>>,
    high: bool,
    writes: Vec<(u32, bool)>,
}

impl MockPin {
    pub fn new(clock: &MockClock) -> Self {
        Self {
            now: clock.now.clone(),
            high: false,
            writes: Vec::new(),
        }
    }

    pub fn writes(&self) -> Vec<(u32, bool)> {
        self.writes.clone()
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
        self.writes.push((self.now.get(), true));
    }

    fn set_low(&mut self) {
        self.high = false;
        self.writes.push((self.now.get(), false));
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Ticks at which the pin went from low to high
pub fn rising_edges(pin: &MockPin) -> Vec<u32> {
    let mut level = false;
    let mut edges = Vec::new();
    for (tick, high) in pin.writes() {
        if high && !level {
            edges.push(tick);
        }
        level = high;
    }
    edges
}

/// In-memory serial link
#[derive(Default)]
pub struct MockSerial {
    rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub writes: usize,
    pub fail_writes: bool,
    pub fail_reads: bool,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw bytes for the device to read
    pub fn queue(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Queue an encoded payload for the device to read
    pub fn queue_payload(&mut self, payload: &Payload) {
        let bytes = payload.encode().unwrap();
        self.queue(&bytes);
    }
}

impl SerialPort for MockSerial {
    type Error = ();

    fn read_byte(&mut self) -> Result<Option<u8>, ()> {
        if self.fail_reads {
            return Err(());
        }
        Ok(self.rx.pop_front())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        self.tx.extend_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}

/// Every payload the device wrote, in order
pub fn decode_written(serial: &MockSerial) -> Vec<Payload> {
    let mut decoder = Decoder::new();
    serial
        .tx
        .iter()
        .filter_map(|&b| decoder.feed(b).unwrap())
        .collect()
}

/// Stored library backed by a byte vector
pub struct MockStorage {
    pub data: Option<Vec<u8>>,
}

impl MockStorage {
    pub fn with_text(text: &str) -> Self {
        Self {
            data: Some(text.as_bytes().to_vec()),
        }
    }

    pub fn empty() -> Self {
        Self { data: None }
    }
}

impl SequenceStorage for MockStorage {
    fn stored_len(&mut self) -> Result<usize, StorageError> {
        self.data
            .as_ref()
            .map(Vec::len)
            .ok_or(StorageError::NotFound)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let data = self.data.as_ref().ok_or(StorageError::NotFound)?;
        let target = buffer
            .get_mut(..data.len())
            .ok_or(StorageError::BufferTooSmall)?;
        target.copy_from_slice(data);
        Ok(data.len())
    }
}
