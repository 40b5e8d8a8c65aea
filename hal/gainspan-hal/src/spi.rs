//! SPI port abstraction for the module SPI link
//!
//! The module is an SPI slave. Every byte the host clocks out is answered
//! with one byte from the module, so the only primitive needed is a
//! single-byte full-duplex exchange. The module raises a data-ready line
//! when it has bytes queued for the host.

/// SPI master wired to the module
pub trait SpiPort {
    /// Error type for SPI operations
    type Error: core::fmt::Debug;

    /// Reprogram the SCK frequency in Hz
    fn set_frequency(&mut self, hz: u32);

    /// Clock out `byte` and return the byte clocked in
    fn exchange(&mut self, byte: u8) -> Result<u8, Self::Error>;

    /// Whether the module is asserting its data-ready line
    fn data_ready(&mut self) -> bool;
}

/// SCK frequency used when none is given
pub const DEFAULT_FREQUENCY: u32 = 1_000_000;
