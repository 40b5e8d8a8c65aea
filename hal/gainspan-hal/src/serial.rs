//! Serial port abstraction for the module UART link
//!
//! The module talks 8N1 at [`DEFAULT_BAUDRATE`] out of reset; framing is
//! fixed when the platform port is created. Implementations only
//! move bytes; echoing and blocking policy live in `gainspan-core`.

/// UART connected to the module
pub trait SerialPort {
    /// Error type for port operations
    type Error: core::fmt::Debug;

    /// Reprogram the line rate
    ///
    /// Invalid rates are handled the way the platform handles them
    /// (clamped, rejected or ignored).
    fn set_baud_rate(&mut self, baud: u32);

    /// Write all bytes
    ///
    /// Blocks until the local transmitter has accepted every byte. Says
    /// nothing about delivery to the module.
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Take one received byte if one is already waiting
    ///
    /// Never blocks. `Ok(None)` means the receive FIFO is empty.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Module line rate out of reset
pub const DEFAULT_BAUDRATE: u32 = 115_200;
