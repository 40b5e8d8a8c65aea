//! Raw-data diagnostics
//!
//! Every byte crossing the module link can be mirrored to a console so a
//! human can follow the AT dialogue. The mirror is purely observational:
//! it sees copies of the bytes and its output errors are ignored.
//!
//! Rendering rules, per byte:
//! - `\r`, `\n` and `\r\n` each become exactly one line break
//! - printable ASCII is written verbatim
//! - anything else is written as `\` followed by two hex digits

use core::fmt::{self, Write};

use gainspan_hal::console::{Console, LINE_BREAK};

/// Observer of link traffic
pub trait ByteTap {
    /// Called once per byte sent or received
    fn observe(&mut self, byte: u8);

    /// Called for a run of bytes, in order
    fn observe_all(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.observe(byte);
        }
    }
}

/// Tap that discards everything (diagnostics not compiled in)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTap;

impl ByteTap for NoTap {
    #[inline]
    fn observe(&mut self, _byte: u8) {}
}

/// Byte-stream to text renderer
///
/// Holds one byte of lookahead-suppression state so a `\r\n` pair is
/// rendered as a single line break.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RawDataEcho {
    /// Byte to swallow if it arrives next
    ignore: Option<u8>,
}

impl RawDataEcho {
    /// Create a renderer with no pending suppression
    pub const fn new() -> Self {
        Self { ignore: None }
    }

    /// Forget any pending suppression
    pub fn reset(&mut self) {
        self.ignore = None;
    }

    /// Render one byte to `out`
    pub fn render<W: Write + ?Sized>(&mut self, c: u8, out: &mut W) -> fmt::Result {
        if self.ignore.take() == Some(c) {
            return Ok(());
        }

        match c {
            b'\r' => {
                self.ignore = Some(b'\n');
                out.write_str(LINE_BREAK)
            }
            b'\n' => out.write_str(LINE_BREAK),
            0x20..=0x7E => out.write_char(c as char),
            _ => write!(out, "\\{:02X}", c),
        }
    }
}

/// Tap that renders link traffic onto a console
#[derive(Debug)]
pub struct ConsoleTap<C> {
    console: C,
    echo: RawDataEcho,
}

impl<C: Console> ConsoleTap<C> {
    /// Mirror link traffic to `console`
    pub fn new(console: C) -> Self {
        Self {
            console,
            echo: RawDataEcho::new(),
        }
    }

    /// The console being written to
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Give the console back
    pub fn into_inner(self) -> C {
        self.console
    }
}

impl<C: Console> ByteTap for ConsoleTap<C> {
    fn observe(&mut self, byte: u8) {
        // Diagnostics never fail the link
        let _ = self.echo.render(byte, &mut self.console);
    }
}
