//! UART link over `embedded-io`
//!
//! Works with any blocking reader/writer that can report whether a read
//! would block, such as embassy-rp's `BufferedUart`.

use embedded_io::{Read, ReadReady, Write};
use gainspan_hal::SerialPort;

/// Callback that reprograms the UART baud rate
pub type SetBaud<U> = fn(&mut U, u32);

/// [`SerialPort`] adapter for an `embedded-io` UART
pub struct IoSerial<U> {
    uart: U,
    set_baud: Option<SetBaud<U>>,
}

impl<U> IoSerial<U>
where
    U: Read + Write + ReadReady,
{
    /// Wrap `uart`; `set_baud` is called on every rate change
    pub fn new(uart: U, set_baud: SetBaud<U>) -> Self {
        Self {
            uart,
            set_baud: Some(set_baud),
        }
    }

    /// Wrap a UART whose baud rate was fixed when it was created
    pub fn fixed(uart: U) -> Self {
        Self {
            uart,
            set_baud: None,
        }
    }

    /// Release the UART
    pub fn into_inner(self) -> U {
        self.uart
    }
}

impl<U> SerialPort for IoSerial<U>
where
    U: Read + Write + ReadReady,
{
    type Error = U::Error;

    fn set_baud_rate(&mut self, baud: u32) {
        match self.set_baud {
            Some(set_baud) => set_baud(&mut self.uart, baud),
            None => defmt::warn!("UART baud rate is fixed, ignoring {=u32}", baud),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.uart.write_all(data)?;
        self.uart.flush()
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if !self.uart.read_ready()? {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}
