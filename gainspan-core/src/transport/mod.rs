//! Module link transports
//!
//! A transport moves raw bytes between the host and the module. Two
//! implementations exist, [`UartTransport`] and [`SpiTransport`]; the build
//! selects exactly one of them through the `uart` / `spi` features.
//!
//! # State
//!
//! ```text
//! Unconfigured ──configure(rate)──▶ Ready
//! ```
//!
//! There is no way back: a transport stays configured for the lifetime of
//! the process. I/O on an unconfigured transport is rejected.
//!
//! # Receive semantics
//!
//! - `block = true`: returns only once `buf` is completely filled. There is
//!   no timeout; a silent module hangs the caller.
//! - `block = false`: returns immediately with the bytes already available
//!   (possibly zero).

pub mod spi;
pub mod uart;

pub use spi::SpiTransport;
pub use uart::UartTransport;

/// Physical link to the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportKind {
    /// Asynchronous serial (UART)
    Serial,
    /// SPI with the module as slave
    Spi,
}

/// Transport compiled into this build
#[cfg(all(feature = "uart", not(feature = "spi")))]
pub const ACTIVE_TRANSPORT: TransportKind = TransportKind::Serial;

/// Transport compiled into this build
#[cfg(all(feature = "spi", not(feature = "uart")))]
pub const ACTIVE_TRANSPORT: TransportKind = TransportKind::Spi;

/// Transport type compiled into this build
#[cfg(all(feature = "uart", not(feature = "spi")))]
pub type ActiveTransport<P, D = crate::diag::NoTap> = UartTransport<P, D>;

/// Transport type compiled into this build
#[cfg(all(feature = "spi", not(feature = "uart")))]
pub type ActiveTransport<P, D = crate::diag::NoTap> = SpiTransport<P, D>;

/// Port trait the compiled-in transport drives
#[cfg(all(feature = "uart", not(feature = "spi")))]
pub use gainspan_hal::SerialPort as LinkPort;

/// Port trait the compiled-in transport drives
#[cfg(all(feature = "spi", not(feature = "uart")))]
pub use gainspan_hal::SpiPort as LinkPort;

/// Configuration state of a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// `configure` has not been called yet
    Unconfigured,
    /// Link rate set, I/O allowed
    Ready,
}

/// Errors from transport operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<E> {
    /// I/O attempted before [`Transport::configure`]
    Unconfigured,
    /// The platform port reported an error
    Port(E),
}

/// Byte-level link to the module
pub trait Transport {
    /// Error type of the underlying platform port
    type PortError: core::fmt::Debug;

    /// Which physical link this is
    const KIND: TransportKind;

    /// Rate used by the HAL facade when none is given
    const DEFAULT_RATE: u32;

    /// Set the link rate (baud for UART, SCK Hz for SPI) and enter
    /// [`LinkState::Ready`]
    ///
    /// Calling it again only reprograms the rate.
    fn configure(&mut self, rate: u32);

    /// Current configuration state
    fn state(&self) -> LinkState;

    /// Transmit every byte of `data`, in order
    ///
    /// Blocks until the local transmitter has accepted all of it.
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError<Self::PortError>>;

    /// Receive into `buf`
    ///
    /// See the module docs for the meaning of `block`. Returns the number of
    /// bytes written to the front of `buf`; never more than `buf.len()`.
    ///
    /// Bytes come out in arrival order. An implementation that has to
    /// buffer bytes arriving while the caller is not reading (SPI does,
    /// because every transmitted byte also clocks one in) may hold only a
    /// bounded number of them; beyond that limit arrivals are dropped and
    /// counted, see [`SpiTransport::overruns`].
    fn recv(
        &mut self,
        buf: &mut [u8],
        block: bool,
    ) -> Result<usize, TransportError<Self::PortError>>;

    /// Whether `configure` has been called
    fn is_ready(&self) -> bool {
        self.state() == LinkState::Ready
    }
}
