//! SPI link over `embedded-hal`
//!
//! The module is the SPI slave. Chip select is asserted around every byte
//! and the module's data-ready output is read through [`DataReadyPin`].

use embedded_hal::digital::{InputPin as HalInputPin, OutputPin};
use embedded_hal::spi::SpiBus;
use gainspan_hal::{InputPin, SpiPort};

/// Callback that reprograms the SCK frequency
pub type SetFrequency<B> = fn(&mut B, u32);

/// Errors from the SPI link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiLinkError<B, P> {
    Bus(B),
    ChipSelect(P),
}

/// Data-ready input adapter for an `embedded-hal` pin
///
/// A pin that fails to read counts as not ready.
pub struct DataReadyPin<P>(pub P);

impl<P: HalInputPin> InputPin for DataReadyPin<P> {
    fn is_high(&mut self) -> bool {
        self.0.is_high().unwrap_or(false)
    }
}

/// [`SpiPort`] adapter: SPI bus, chip-select output and data-ready input
pub struct BusSpi<B, CS, DR> {
    bus: B,
    cs: CS,
    ready: DR,
    set_frequency: Option<SetFrequency<B>>,
}

impl<B, CS, DR> BusSpi<B, CS, DR>
where
    B: SpiBus<u8>,
    CS: OutputPin,
    DR: InputPin,
{
    /// Wrap the bus and pins; chip select is released immediately
    pub fn new(bus: B, mut cs: CS, ready: DR) -> Self {
        let _ = cs.set_high();
        Self {
            bus,
            cs,
            ready,
            set_frequency: None,
        }
    }

    /// Install the callback used for [`SpiPort::set_frequency`]
    pub fn with_set_frequency(mut self, set_frequency: SetFrequency<B>) -> Self {
        self.set_frequency = Some(set_frequency);
        self
    }

    /// Release the bus and pins
    pub fn release(self) -> (B, CS, DR) {
        (self.bus, self.cs, self.ready)
    }

    fn transfer(&mut self, byte: u8) -> Result<u8, B::Error> {
        let mut frame = [byte];
        self.bus.transfer_in_place(&mut frame)?;
        self.bus.flush()?;
        Ok(frame[0])
    }
}

impl<B, CS, DR> SpiPort for BusSpi<B, CS, DR>
where
    B: SpiBus<u8>,
    CS: OutputPin,
    DR: InputPin,
{
    type Error = SpiLinkError<B::Error, CS::Error>;

    fn set_frequency(&mut self, hz: u32) {
        match self.set_frequency {
            Some(set_frequency) => set_frequency(&mut self.bus, hz),
            None => defmt::warn!("SPI frequency is fixed, ignoring {=u32}", hz),
        }
    }

    fn exchange(&mut self, byte: u8) -> Result<u8, Self::Error> {
        self.cs.set_low().map_err(SpiLinkError::ChipSelect)?;
        let result = self.transfer(byte).map_err(SpiLinkError::Bus);
        // Release chip select even when the transfer failed
        let released = self.cs.set_high().map_err(SpiLinkError::ChipSelect);
        let received = result?;
        released?;
        Ok(received)
    }

    fn data_ready(&mut self) -> bool {
        self.ready.is_high()
    }
}
