//! Test doubles for the platform traits

use core::cell::Cell;
use core::fmt::{self, Write};
use std::collections::VecDeque;

use gainspan_hal::{Console, MsTimer, SerialPort, SpiPort};

use crate::transport::spi::IDLE;

/// Console that records everything written to it
#[derive(Debug, Default)]
pub struct CaptureConsole {
    pub out: String,
}

impl CaptureConsole {
    /// Printed lines, without terminators
    pub fn lines(&self) -> Vec<&str> {
        self.out.split_terminator("\r\n").collect()
    }
}

impl Write for CaptureConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.push_str(s);
        Ok(())
    }
}

impl Console for CaptureConsole {}

/// Clock that only moves when delayed or advanced
#[derive(Debug, Default)]
pub struct MockClock {
    pub now: Cell<u32>,
    pub inits: u32,
    pub delayed_ms: u32,
}

impl MockClock {
    /// Clock whose counter already reads `now`
    pub fn at(now: u32) -> Self {
        Self {
            now: Cell::new(now),
            ..Self::default()
        }
    }
}

impl MsTimer for MockClock {
    fn init(&mut self) {
        self.inits += 1;
    }

    fn now(&self) -> u32 {
        self.now.get()
    }

    fn delay(&mut self, ms: u32) {
        self.delayed_ms += ms;
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSerialError {
    Write,
    Read,
}

/// Serial port fed from a script of arrivals
///
/// `Some(b)` entries are bytes, `None` entries are polls that find the
/// FIFO empty.
#[derive(Debug, Default)]
pub struct MockSerial {
    pub script: VecDeque<Option<u8>>,
    pub tx: Vec<u8>,
    pub baud: Option<u32>,
    pub fail_write: bool,
    pub fail_read: bool,
}

impl MockSerial {
    pub fn with_input(bytes: &[u8]) -> Self {
        let mut port = Self::default();
        port.script_bytes(bytes);
        port
    }

    pub fn script_bytes(&mut self, bytes: &[u8]) {
        self.script.extend(bytes.iter().copied().map(Some));
    }

    pub fn script_gap(&mut self) {
        self.script.push_back(None);
    }

    /// Bytes not yet read
    pub fn remaining(&self) -> usize {
        self.script.iter().filter(|entry| entry.is_some()).count()
    }
}

impl SerialPort for MockSerial {
    type Error = MockSerialError;

    fn set_baud_rate(&mut self, baud: u32) {
        self.baud = Some(baud);
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if self.fail_write {
            return Err(MockSerialError::Write);
        }
        self.tx.extend_from_slice(data);
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if self.fail_read {
            return Err(MockSerialError::Read);
        }
        Ok(self.script.pop_front().flatten())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockSpiError;

/// SPI slave that answers from a queue of raw link bytes
///
/// Answers [`IDLE`] once the queue is empty. Data-ready follows the queue
/// unless forced.
#[derive(Debug, Default)]
pub struct MockSpi {
    pub incoming: VecDeque<u8>,
    pub sent: Vec<u8>,
    pub frequency: Option<u32>,
    pub force_ready: bool,
    pub fail: bool,
}

impl MockSpi {
    pub fn with_incoming(raw: &[u8]) -> Self {
        Self {
            incoming: raw.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl SpiPort for MockSpi {
    type Error = MockSpiError;

    fn set_frequency(&mut self, hz: u32) {
        self.frequency = Some(hz);
    }

    fn exchange(&mut self, byte: u8) -> Result<u8, Self::Error> {
        if self.fail {
            return Err(MockSpiError);
        }
        self.sent.push(byte);
        Ok(self.incoming.pop_front().unwrap_or(IDLE))
    }

    fn data_ready(&mut self) -> bool {
        self.force_ready || !self.incoming.is_empty()
    }
}
