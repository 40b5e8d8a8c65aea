//! SPI transport
//!
//! The module is an SPI slave: every byte the host clocks out is answered
//! with one byte from the module. Both directions are byte-stuffed so the
//! link can carry idle fill and flow control in-band:
//!
//! - `IDLE` (0xF5) is clocked out by the host when it only wants to read,
//!   and returned by the module when it has nothing to send
//! - `XOFF` (0xFA) / `XON` (0xFD) from the module pause / resume host
//!   transmission
//! - data bytes that collide with a control code are sent as `ESC` (0xFB)
//!   followed by the byte XOR 0x20
//! - 0xFF and 0x00 from the module mean it is not ready and carry no data
//!
//! Bytes the module returns while the host is transmitting are kept in a
//! backlog of [`RX_BACKLOG_SIZE`] bytes and handed out first by the next
//! receive. Once the backlog is full further arrivals are dropped and
//! counted in [`SpiTransport::overruns`]; callers sending long runs must
//! read in between.

use heapless::Deque;

use gainspan_hal::spi::DEFAULT_FREQUENCY;
use gainspan_hal::SpiPort;

use super::{LinkState, Transport, TransportError, TransportKind};
use crate::diag::{ByteTap, NoTap};

/// Idle fill byte
pub const IDLE: u8 = 0xF5;
/// Escape prefix
pub const ESC: u8 = 0xFB;
/// Module asks the host to stop sending
pub const XOFF: u8 = 0xFA;
/// Module lets the host resume sending
pub const XON: u8 = 0xFD;
/// Module not ready (bus floating high)
pub const INVALID: u8 = 0xFF;
/// Module not ready (bus held low)
pub const ALL_ZERO: u8 = 0x00;
/// Mask applied to escaped bytes
pub const ESC_XOR: u8 = 0x20;

/// Capacity of the receive backlog
pub const RX_BACKLOG_SIZE: usize = 256;

/// Whether a data byte must be escaped on the wire
pub const fn needs_escape(byte: u8) -> bool {
    matches!(byte, IDLE | ESC | XOFF | XON | INVALID | ALL_ZERO)
}

/// Decoder for the byte stream clocked in from the module
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkDecoder {
    escape_pending: bool,
    paused: bool,
}

impl LinkDecoder {
    /// Create a decoder in the idle, unpaused state
    pub const fn new() -> Self {
        Self {
            escape_pending: false,
            paused: false,
        }
    }

    /// Feed one raw byte, returning the data byte it completes (if any)
    pub fn decode(&mut self, raw: u8) -> Option<u8> {
        if self.escape_pending {
            self.escape_pending = false;
            return Some(raw ^ ESC_XOR);
        }

        match raw {
            IDLE | INVALID | ALL_ZERO => None,
            ESC => {
                self.escape_pending = true;
                None
            }
            XOFF => {
                self.paused = true;
                None
            }
            XON => {
                self.paused = false;
                None
            }
            data => Some(data),
        }
    }

    /// Whether the module has paused host transmission
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether an escape prefix is waiting for its data byte
    pub fn escape_pending(&self) -> bool {
        self.escape_pending
    }
}

/// Module link over SPI
#[derive(Debug)]
pub struct SpiTransport<P, D = NoTap> {
    port: P,
    tap: D,
    state: LinkState,
    frequency: u32,
    decoder: LinkDecoder,
    backlog: Deque<u8, RX_BACKLOG_SIZE>,
    overruns: u32,
}

impl<P: SpiPort> SpiTransport<P> {
    /// Wrap a port with diagnostics disabled
    pub fn new(port: P) -> Self {
        Self::with_tap(port, NoTap)
    }
}

impl<P: SpiPort, D: ByteTap> SpiTransport<P, D> {
    /// Wrap a port, mirroring all data bytes to `tap`
    pub fn with_tap(port: P, tap: D) -> Self {
        Self {
            port,
            tap,
            state: LinkState::Unconfigured,
            frequency: 0,
            decoder: LinkDecoder::new(),
            backlog: Deque::new(),
            overruns: 0,
        }
    }

    /// Configured SCK frequency, if any
    pub fn frequency(&self) -> Option<u32> {
        match self.state {
            LinkState::Ready => Some(self.frequency),
            LinkState::Unconfigured => None,
        }
    }

    /// Received bytes lost because the backlog was full
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// The underlying port
    pub fn port(&self) -> &P {
        &self.port
    }

    /// The underlying port, mutably
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// The diagnostics tap
    pub fn tap(&self) -> &D {
        &self.tap
    }

    fn ensure_ready(&self) -> Result<(), TransportError<P::Error>> {
        match self.state {
            LinkState::Ready => Ok(()),
            LinkState::Unconfigured => Err(TransportError::Unconfigured),
        }
    }

    /// Clock one raw byte out and decode the byte clocked in
    fn clock(&mut self, out: u8) -> Result<(), TransportError<P::Error>> {
        let raw = self.port.exchange(out).map_err(TransportError::Port)?;
        if let Some(byte) = self.decoder.decode(raw) {
            if self.backlog.push_back(byte).is_err() {
                self.overruns = self.overruns.wrapping_add(1);

                #[cfg(feature = "defmt")]
                defmt::warn!("SPI receive backlog full, dropped {=u8:#x}", byte);
            }
        }
        Ok(())
    }

    /// Poll with idle fill until the module lifts any pause
    fn wait_unpaused(&mut self) -> Result<(), TransportError<P::Error>> {
        while self.decoder.is_paused() {
            self.clock(IDLE)?;
        }
        Ok(())
    }
}

impl<P: SpiPort, D: ByteTap> Transport for SpiTransport<P, D> {
    type PortError = P::Error;

    const KIND: TransportKind = TransportKind::Spi;
    const DEFAULT_RATE: u32 = DEFAULT_FREQUENCY;

    fn configure(&mut self, rate: u32) {
        self.port.set_frequency(rate);
        self.frequency = rate;
        self.state = LinkState::Ready;

        #[cfg(feature = "defmt")]
        defmt::debug!("SPI link configured at {} Hz", rate);
    }

    fn state(&self) -> LinkState {
        self.state
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TransportError<P::Error>> {
        self.ensure_ready()?;
        for &byte in data {
            self.wait_unpaused()?;
            if needs_escape(byte) {
                // No fill may separate the prefix from its byte
                self.clock(ESC)?;
                self.clock(byte ^ ESC_XOR)?;
            } else {
                self.clock(byte)?;
            }
        }
        self.tap.observe_all(data);
        Ok(())
    }

    fn recv(
        &mut self,
        buf: &mut [u8],
        block: bool,
    ) -> Result<usize, TransportError<P::Error>> {
        self.ensure_ready()?;

        let mut read = 0;
        while read < buf.len() {
            if let Some(byte) = self.backlog.pop_front() {
                buf[read] = byte;
                read += 1;
                self.tap.observe(byte);
                continue;
            }

            if !self.decoder.escape_pending() && !self.port.data_ready() {
                if !block {
                    break;
                }
                core::hint::spin_loop();
                continue;
            }

            self.clock(IDLE)?;

            // A poll that produced nothing means the module is drained
            if !block && self.backlog.is_empty() && !self.decoder.escape_pending() {
                break;
            }
        }
        Ok(read)
    }
}
