//! HAL facade
//!
//! [`Hal`] owns the process-wide singletons: the millisecond timer, the
//! compiled-in transport and the debug console. It is constructed exactly
//! once by [`Hal::init`]; because construction consumes the parts, there is
//! no second initialization to guard against.

use core::fmt;

use gainspan_hal::{print_fmt, Console, MsTimer, PrintError};

use crate::transport::{Transport, TransportError};

/// Scratch size used while draining the link
const DRAIN_CHUNK: usize = 32;

/// Platform context handed to the bring-up sequencer and the AT driver
#[derive(Debug)]
pub struct Hal<L, T, C> {
    link: L,
    timer: T,
    console: C,
}

impl<L, T, C> Hal<L, T, C>
where
    L: Transport,
    T: MsTimer,
    C: Console,
{
    /// Start the timer and configure the link at its default rate
    pub fn init(timer: T, link: L, console: C) -> Self {
        Self::init_with_rate(timer, link, console, L::DEFAULT_RATE)
    }

    /// Start the timer and configure the link at `rate`
    pub fn init_with_rate(mut timer: T, mut link: L, console: C, rate: u32) -> Self {
        timer.init();
        link.configure(rate);

        #[cfg(feature = "defmt")]
        defmt::info!("HAL initialized: {} link at {}", L::KIND, rate);

        Self {
            link,
            timer,
            console,
        }
    }

    /// Transmit `data` to the module
    pub fn send(&mut self, data: &[u8]) -> Result<(), TransportError<L::PortError>> {
        self.link.send(data)
    }

    /// Receive from the module (see [`Transport::recv`])
    pub fn recv(
        &mut self,
        buf: &mut [u8],
        block: bool,
    ) -> Result<usize, TransportError<L::PortError>> {
        self.link.recv(buf, block)
    }

    /// Milliseconds since initialization
    pub fn now(&self) -> u32 {
        self.timer.now()
    }

    /// Milliseconds since `start`, wraparound-safe
    pub fn elapsed(&self, start: u32) -> u32 {
        self.timer.elapsed(start)
    }

    /// Block for at least `ms` milliseconds
    pub fn delay(&mut self, ms: u32) {
        self.timer.delay(ms);
    }

    /// Discard incoming bytes until the link has been silent for `quiet_ms`
    ///
    /// Returns the number of bytes discarded. Never returns while the module
    /// keeps talking.
    pub fn drain_incoming(
        &mut self,
        quiet_ms: u32,
    ) -> Result<usize, TransportError<L::PortError>> {
        let mut scratch = [0u8; DRAIN_CHUNK];
        let mut discarded = 0;
        let mut last_rx = self.timer.now();

        loop {
            let n = self.link.recv(&mut scratch, false)?;
            if n > 0 {
                discarded += n;
                last_rx = self.timer.now();
                continue;
            }
            if self.timer.elapsed(last_rx) >= quiet_ms {
                return Ok(discarded);
            }
            self.timer.delay(1);
        }
    }

    /// Print one line on the console
    pub fn print(&mut self, line: &str) {
        self.console.print(line);
    }

    /// Format and print one line on the console
    ///
    /// Output beyond [`gainspan_hal::PRINT_BUFFER_SIZE`] bytes is cut and
    /// reported as [`PrintError::Truncated`].
    pub fn printf(&mut self, args: fmt::Arguments<'_>) -> Result<(), PrintError> {
        print_fmt(&mut self.console, args)
    }

    /// The module link
    pub fn link(&self) -> &L {
        &self.link
    }

    /// The module link, mutably
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// The timer
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// The console
    pub fn console(&self) -> &C {
        &self.console
    }

    /// The console, mutably
    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{CaptureConsole, MockClock, MockSerial};
    use crate::transport::{LinkState, UartTransport};

    type TestHal = Hal<UartTransport<MockSerial>, MockClock, CaptureConsole>;

    fn hal_with(port: MockSerial) -> TestHal {
        Hal::init(
            MockClock::default(),
            UartTransport::new(port),
            CaptureConsole::default(),
        )
    }

    #[test]
    fn test_init_starts_timer_and_configures_link() {
        let hal = hal_with(MockSerial::default());

        assert_eq!(hal.timer().inits, 1);
        assert_eq!(hal.link().state(), LinkState::Ready);
        assert_eq!(hal.link().baud_rate(), Some(115_200));
    }

    #[test]
    fn test_init_with_rate() {
        let hal = Hal::init_with_rate(
            MockClock::default(),
            UartTransport::new(MockSerial::default()),
            CaptureConsole::default(),
            9600,
        );
        assert_eq!(hal.link().port().baud, Some(9600));
    }

    #[test]
    fn test_send_and_recv_pass_through() {
        let mut hal = hal_with(MockSerial::with_input(b"OK\r\n"));
        hal.send(b"AT\r\n").unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(hal.recv(&mut buf, true), Ok(4));
        assert_eq!(&buf, b"OK\r\n");
        assert_eq!(hal.link().port().tx, b"AT\r\n");
    }

    #[test]
    fn test_elapsed_tracks_delay() {
        let mut hal = hal_with(MockSerial::default());
        let start = hal.now();
        assert_eq!(hal.elapsed(start), 0);

        hal.delay(25);
        assert_eq!(hal.elapsed(start), 25);
    }

    #[test]
    fn test_elapsed_across_wrap() {
        let mut hal = Hal::init(
            MockClock::at(u32::MAX - 4),
            UartTransport::new(MockSerial::default()),
            CaptureConsole::default(),
        );
        let start = hal.now();
        hal.delay(10);
        assert_eq!(hal.elapsed(start), 10);
    }

    #[test]
    fn test_drain_discards_until_quiet() {
        let mut port = MockSerial::default();
        port.script_bytes(b"garbage");
        port.script_gap();
        port.script_gap();
        port.script_bytes(b"\r\nmore");
        let mut hal = hal_with(port);

        assert_eq!(hal.drain_incoming(5), Ok(13));
        assert_eq!(hal.link().port().remaining(), 0);
        assert!(hal.timer().delayed_ms >= 5);
    }

    #[test]
    fn test_drain_on_silent_link() {
        let mut hal = hal_with(MockSerial::default());
        assert_eq!(hal.drain_incoming(3), Ok(0));
        assert_eq!(hal.timer().delayed_ms, 3);
    }

    #[test]
    fn test_print_and_printf() {
        let mut hal = hal_with(MockSerial::default());
        hal.print("Reset OK");
        hal.printf(format_args!("ch={}", 11)).unwrap();
        assert_eq!(hal.console().lines(), ["Reset OK", "ch=11"]);
    }
}
