//! RP2040 platform support for the GainSpan host driver
//!
//! Implements the `gainspan-hal` traits on top of embassy-rp:
//!
//! - [`timer::EmbassyTimer`] - millisecond clock from `embassy-time`
//! - [`serial::IoSerial`] - any `embedded-io` UART (e.g. `BufferedUart`)
//! - [`spi::BusSpi`] - any `embedded-hal` SPI bus plus chip-select and
//!   data-ready pins
//! - [`console::DefmtConsole`] - console lines over defmt (the `rtt`
//!   feature installs `defmt-rtt` as the logger)
//! - [`flash::FlashStorage`] - storage in the last 64KB of flash

#![no_std]

// Global defmt logger, when the application does not bring one
#[cfg(feature = "rtt")]
use defmt_rtt as _;

pub mod console;
pub mod flash;
pub mod serial;
pub mod spi;
pub mod timer;

pub use console::DefmtConsole;
pub use flash::FlashStorage;
pub use serial::IoSerial;
pub use spi::{BusSpi, DataReadyPin, SpiLinkError};
pub use timer::EmbassyTimer;
