//! AT-command collaborator interface
//!
//! The AT-command library (response parser, command encoders, saved
//! network settings) lives outside this crate. The bring-up sequencer only
//! needs the handful of operations below, each driven over the HAL facade
//! it is handed.

/// Identifier of a module response, as classified by the AT library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageId {
    /// `OK`
    Ok,
    /// `ERROR`
    Error,
    /// `ERROR: INVALID INPUT`
    InvalidInput,
    /// No complete response before the library gave up
    Timeout,
    /// `APP Reset-APP SW Reset`: the module application restarted
    AppReset,
    /// Any other classified response
    Other(u8),
}

impl MessageId {
    /// Whether this is the acknowledgement of a software reset
    pub fn is_app_reset(self) -> bool {
        self == MessageId::AppReset
    }
}

/// Operations the bring-up handshake asks of the AT library
///
/// `H` is the HAL facade type the library drives the module through.
pub trait ModuleProtocol<H> {
    /// Error type reported by the library
    type Error: core::fmt::Debug;

    /// Discard incoming bytes until the module output settles
    fn flush_incoming(&mut self, hal: &mut H) -> Result<(), Self::Error>;

    /// Issue a software reset and return the module's answer
    fn reset(&mut self, hal: &mut H) -> Result<MessageId, Self::Error>;

    /// Turn command echo on or off
    fn set_echo(&mut self, hal: &mut H, enabled: bool) -> Result<(), Self::Error>;

    /// Turn bulk-data transfer mode on or off
    fn set_bulk_data(&mut self, hal: &mut H, enabled: bool) -> Result<(), Self::Error>;

    /// Load previously saved network settings
    ///
    /// Where they come from (typically a [`gainspan_hal::NvStorage`]) is
    /// up to the library.
    fn load_network_config(&mut self, hal: &mut H) -> Result<(), Self::Error>;
}
