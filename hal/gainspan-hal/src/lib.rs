//! GainSpan Hardware Abstraction Layer
//!
//! This crate defines the platform traits the GainSpan host driver needs
//! from a microcontroller: a millisecond clock, a byte port for the module
//! link (serial or SPI), a debug console and a small non-volatile store.
//! Chip-specific crates implement them; `gainspan-core` builds the
//! transports, the HAL facade and the bring-up handshake on top.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  AT-command driver (external)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  gainspan-core (transports, bring-up)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  gainspan-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ gainspan-hal- │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`timer::MsTimer`] - Monotonic millisecond clock
//! - [`serial::SerialPort`] - UART link to the module
//! - [`spi::SpiPort`] - SPI link to the module
//! - [`gpio::InputPin`] - Data-ready line
//! - [`console::Console`] - Debug console output
//! - [`storage::NvStorage`] - Non-volatile storage

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod console;
pub mod gpio;
pub mod serial;
pub mod spi;
pub mod storage;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use console::{print_fmt, Console, PrintError, PRINT_BUFFER_SIZE};
pub use gpio::InputPin;
pub use serial::SerialPort;
pub use spi::SpiPort;
pub use storage::{NoStorage, NvStorage, RamStorage, StorageError};
pub use timer::{elapsed_between, MsTimer};
