//! UART transport
//!
//! Bytes go out through [`SerialPort::write_all`] and come in one at a time
//! through the non-blocking [`SerialPort::read_byte`]. Blocking receive
//! spins on the port until the buffer is full.

use gainspan_hal::serial::DEFAULT_BAUDRATE;
use gainspan_hal::SerialPort;

use super::{LinkState, Transport, TransportError, TransportKind};
use crate::diag::{ByteTap, NoTap};

/// Module link over a UART
#[derive(Debug)]
pub struct UartTransport<P, D = NoTap> {
    port: P,
    tap: D,
    state: LinkState,
    baud: u32,
}

impl<P: SerialPort> UartTransport<P> {
    /// Wrap a port with diagnostics disabled
    pub fn new(port: P) -> Self {
        Self::with_tap(port, NoTap)
    }
}

impl<P: SerialPort, D: ByteTap> UartTransport<P, D> {
    /// Wrap a port, mirroring all traffic to `tap`
    pub fn with_tap(port: P, tap: D) -> Self {
        Self {
            port,
            tap,
            state: LinkState::Unconfigured,
            baud: 0,
        }
    }

    /// Configured baud rate, if any
    pub fn baud_rate(&self) -> Option<u32> {
        match self.state {
            LinkState::Ready => Some(self.baud),
            LinkState::Unconfigured => None,
        }
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
}

impl<P: SerialPort, D: ByteTap> Transport for UartTransport<P, D> {
    type PortError = P::Error;

    const KIND: TransportKind = TransportKind::Serial;
    const DEFAULT_RATE: u32 = DEFAULT_BAUDRATE;

    fn configure(&mut self, rate: u32) {
        self.port.set_baud_rate(rate);
        self.baud = rate;
        self.state = LinkState::Ready;

        #[cfg(feature = "defmt")]
        defmt::debug!("UART link configured at {} baud", rate);
    }

    fn state(&self) -> LinkState {
        self.state
    }

    fn send(&mut self, data: &[u8]) -> Result<(), TransportError<P::Error>> {
        self.ensure_ready()?;
        self.port.write_all(data).map_err(TransportError::Port)?;
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
            match self.port.read_byte().map_err(TransportError::Port)? {
                Some(byte) => {
                    buf[read] = byte;
                    read += 1;
                    self.tap.observe(byte);
                }
                None if !block => break,
                None => core::hint::spin_loop(),
            }
        }
        Ok(read)
    }
}
