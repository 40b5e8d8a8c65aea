//! Board-agnostic host side of the GainSpan module link
//!
//! This crate contains everything between the platform traits of
//! `gainspan-hal` and the AT-command driver:
//!
//! - Link transports (UART, SPI) with blocking and non-blocking receive
//! - Build-time selection of the active transport
//! - Raw-data diagnostics mirror
//! - HAL facade owning the timer, link and console
//! - Module bring-up handshake
//!
//! # Transport selection
//!
//! Exactly one of the `uart` (default) or `spi` features must be enabled.
//! The choice is exported as [`transport::ACTIVE_TRANSPORT`] and
//! [`transport::ActiveTransport`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[cfg(all(feature = "uart", feature = "spi"))]
compile_error!("Only one of the `uart` or `spi` features should be enabled");

#[cfg(not(any(feature = "uart", feature = "spi")))]
compile_error!("One of the `uart` or `spi` features must be enabled");

pub mod bringup;
pub mod diag;
pub mod hal;
pub mod protocol;
pub mod transport;

#[cfg(test)]
mod mock;

pub use bringup::{bring_up, BringUpStep, HandshakeResult, SYNC_TOKEN};
pub use diag::{ByteTap, ConsoleTap, NoTap, RawDataEcho};
pub use hal::Hal;
pub use protocol::{MessageId, ModuleProtocol};
pub use transport::{
    LinkState, SpiTransport, Transport, TransportError, TransportKind, UartTransport,
};
