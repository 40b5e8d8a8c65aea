//! Module bring-up handshake
//!
//! Run once at startup to put the module into a known state:
//!
//! 1. Initialize the HAL (timer, link)
//! 2. Send `\r\n` to resynchronize the module's command parser
//! 3. Flush whatever the module had queued
//! 4. Software reset, checking for the application-reset acknowledgement
//! 5. Disable command echo
//! 6. Enable bulk-data mode
//! 7. Load saved network settings
//!
//! Nothing is retried and nothing aborts the sequence. A failing step is
//! reported on the console and the next step runs regardless.

use core::fmt::Debug;

use gainspan_hal::{Console, MsTimer};

use crate::hal::Hal;
use crate::protocol::ModuleProtocol;
use crate::transport::Transport;

/// Bytes sent to resynchronize the module's command parser
pub const SYNC_TOKEN: &[u8] = b"\r\n";

/// Outcome of the reset step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeResult {
    /// The module acknowledged the reset
    Success,
    /// The reset failed or was answered with something else
    ResetFailed,
}

/// Steps after HAL initialization, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BringUpStep {
    Sync,
    Flush,
    Reset,
    DisableEcho,
    EnableBulkData,
    LoadNetworkConfig,
}

impl BringUpStep {
    /// Human-readable step name
    pub fn as_str(self) -> &'static str {
        match self {
            BringUpStep::Sync => "Sync",
            BringUpStep::Flush => "Flush",
            BringUpStep::Reset => "Reset",
            BringUpStep::DisableEcho => "Echo off",
            BringUpStep::EnableBulkData => "Bulk data on",
            BringUpStep::LoadNetworkConfig => "Network config load",
        }
    }
}

/// Bring the module up and hand back the initialized HAL
///
/// The returned [`HandshakeResult`] only reflects the reset step; by the
/// time it is returned every later step has already been attempted.
pub fn bring_up<L, T, C, M>(
    timer: T,
    link: L,
    console: C,
    protocol: &mut M,
) -> (Hal<L, T, C>, HandshakeResult)
where
    L: Transport,
    T: MsTimer,
    C: Console,
    M: ModuleProtocol<Hal<L, T, C>>,
{
    let mut hal = Hal::init(timer, link, console);

    let sent = hal.send(SYNC_TOKEN);
    report(&mut hal, BringUpStep::Sync, sent);

    let flushed = protocol.flush_incoming(&mut hal);
    report(&mut hal, BringUpStep::Flush, flushed);

    let result = match protocol.reset(&mut hal) {
        Ok(id) if id.is_app_reset() => {
            hal.print("Reset OK");
            HandshakeResult::Success
        }
        Ok(_other) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Unexpected reset response: {}", _other);

            hal.print("Reset Fail");
            HandshakeResult::ResetFailed
        }
        Err(e) => {
            report(&mut hal, BringUpStep::Reset, Err::<(), _>(e));
            hal.print("Reset Fail");
            HandshakeResult::ResetFailed
        }
    };

    let echo = protocol.set_echo(&mut hal, false);
    report(&mut hal, BringUpStep::DisableEcho, echo);

    let bulk = protocol.set_bulk_data(&mut hal, true);
    report(&mut hal, BringUpStep::EnableBulkData, bulk);

    let loaded = protocol.load_network_config(&mut hal);
    report(&mut hal, BringUpStep::LoadNetworkConfig, loaded);

    #[cfg(feature = "defmt")]
    defmt::info!("Bring-up finished: {}", result);

    (hal, result)
}

/// Downgrade a step failure to a console diagnostic
fn report<L, T, C, E>(hal: &mut Hal<L, T, C>, step: BringUpStep, outcome: Result<(), E>)
where
    L: Transport,
    T: MsTimer,
    C: Console,
    E: Debug,
{
    if let Err(e) = outcome {
        #[cfg(feature = "defmt")]
        defmt::warn!("{} failed: {}", step.as_str(), defmt::Debug2Format(&e));

        // A diagnostic that does not fit is still printed, cut short
        let _ = hal.printf(format_args!("{} failed: {:?}", step.as_str(), e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{CaptureConsole, MockClock, MockSerial, MockSerialError};
    use crate::protocol::MessageId;
    use crate::transport::{LinkState, TransportError, UartTransport};

    type TestHal = Hal<UartTransport<MockSerial>, MockClock, CaptureConsole>;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Flush,
        Reset,
        Echo(bool),
        BulkData(bool),
        LoadConfig,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum FakeError {
        NoResponse,
    }

    /// Records calls and replays scripted answers
    struct FakeAtLib {
        calls: Vec<Call>,
        reset_answer: Result<MessageId, FakeError>,
        fail_echo: bool,
        fail_load: bool,
        link_ready_on_first_call: Option<bool>,
    }

    impl FakeAtLib {
        fn answering(reset_answer: Result<MessageId, FakeError>) -> Self {
            Self {
                calls: Vec::new(),
                reset_answer,
                fail_echo: false,
                fail_load: false,
                link_ready_on_first_call: None,
            }
        }
    }

    impl ModuleProtocol<TestHal> for FakeAtLib {
        type Error = FakeError;

        fn flush_incoming(&mut self, hal: &mut TestHal) -> Result<(), FakeError> {
            self.link_ready_on_first_call = Some(hal.link().state() == LinkState::Ready);
            self.calls.push(Call::Flush);
            hal.drain_incoming(2).map_err(|_| FakeError::NoResponse)?;
            Ok(())
        }

        fn reset(&mut self, hal: &mut TestHal) -> Result<MessageId, FakeError> {
            self.calls.push(Call::Reset);
            hal.send(b"AT+RESET=1\r\n").map_err(|_| FakeError::NoResponse)?;
            self.reset_answer
        }

        fn set_echo(&mut self, _hal: &mut TestHal, enabled: bool) -> Result<(), FakeError> {
            self.calls.push(Call::Echo(enabled));
            if self.fail_echo {
                Err(FakeError::NoResponse)
            } else {
                Ok(())
            }
        }

        fn set_bulk_data(&mut self, _hal: &mut TestHal, enabled: bool) -> Result<(), FakeError> {
            self.calls.push(Call::BulkData(enabled));
            Ok(())
        }

        fn load_network_config(&mut self, _hal: &mut TestHal) -> Result<(), FakeError> {
            self.calls.push(Call::LoadConfig);
            if self.fail_load {
                Err(FakeError::NoResponse)
            } else {
                Ok(())
            }
        }
    }

    const FULL_SEQUENCE: [Call; 5] = [
        Call::Flush,
        Call::Reset,
        Call::Echo(false),
        Call::BulkData(true),
        Call::LoadConfig,
    ];

    fn run(port: MockSerial, protocol: &mut FakeAtLib) -> (TestHal, HandshakeResult) {
        bring_up(
            MockClock::default(),
            UartTransport::new(port),
            CaptureConsole::default(),
            protocol,
        )
    }

    #[test]
    fn test_successful_bring_up() {
        let mut lib = FakeAtLib::answering(Ok(MessageId::AppReset));
        let (hal, result) = run(MockSerial::with_input(b"\r\nOK\r\n"), &mut lib);

        assert_eq!(result, HandshakeResult::Success);
        assert_eq!(lib.calls, FULL_SEQUENCE);
        assert_eq!(lib.link_ready_on_first_call, Some(true));
        assert_eq!(hal.timer().inits, 1);
        assert_eq!(hal.console().lines(), ["Reset OK"]);
    }

    #[test]
    fn test_sync_token_sent_before_anything_else() {
        let mut lib = FakeAtLib::answering(Ok(MessageId::AppReset));
        let (hal, _) = run(MockSerial::default(), &mut lib);

        assert!(hal.link().port().tx.starts_with(SYNC_TOKEN));
        assert_eq!(hal.link().port().tx, b"\r\nAT+RESET=1\r\n");
    }

    #[test]
    fn test_flush_discards_pending_input() {
        let mut lib = FakeAtLib::answering(Ok(MessageId::AppReset));
        let (hal, _) = run(MockSerial::with_input(b"stale boot banner\r\n"), &mut lib);

        assert_eq!(hal.link().port().remaining(), 0);
    }

    #[test]
    fn test_unexpected_reset_id_still_completes() {
        let mut lib = FakeAtLib::answering(Ok(MessageId::Ok));
        let (hal, result) = run(MockSerial::default(), &mut lib);

        assert_eq!(result, HandshakeResult::ResetFailed);
        assert_eq!(lib.calls, FULL_SEQUENCE);
        assert_eq!(hal.console().lines(), ["Reset Fail"]);
    }

    #[test]
    fn test_reset_error_still_completes() {
        let mut lib = FakeAtLib::answering(Err(FakeError::NoResponse));
        let (hal, result) = run(MockSerial::default(), &mut lib);

        assert_eq!(result, HandshakeResult::ResetFailed);
        assert_eq!(lib.calls, FULL_SEQUENCE);
        assert_eq!(
            hal.console().lines(),
            ["Reset failed: NoResponse", "Reset Fail"]
        );
    }

    #[test]
    fn test_later_step_failures_are_only_printed() {
        let mut lib = FakeAtLib::answering(Ok(MessageId::AppReset));
        lib.fail_echo = true;
        lib.fail_load = true;
        let (hal, result) = run(MockSerial::default(), &mut lib);

        assert_eq!(result, HandshakeResult::Success);
        assert_eq!(lib.calls, FULL_SEQUENCE);
        assert_eq!(
            hal.console().lines(),
            [
                "Reset OK",
                "Echo off failed: NoResponse",
                "Network config load failed: NoResponse",
            ]
        );
    }

    #[test]
    fn test_sync_send_failure_is_only_printed() {
        let mut port = MockSerial::default();
        port.fail_write = true;
        let mut lib = FakeAtLib::answering(Ok(MessageId::AppReset));
        let (hal, result) = run(port, &mut lib);

        // The reset command cannot be sent either, so the fake reports it
        assert_eq!(result, HandshakeResult::ResetFailed);
        assert_eq!(lib.calls, FULL_SEQUENCE);
        let sync_failure = std::format!(
            "Sync failed: {:?}",
            TransportError::Port(MockSerialError::Write)
        );
        assert_eq!(hal.console().lines()[0], sync_failure);
    }
}
