//! Debug console abstraction
//!
//! The console is wherever the platform can show text: a spare UART, an
//! RTT channel, an LCD. It is used for diagnostics only and is never on the
//! module data path.

use core::fmt::{self, Write};

use heapless::String;

/// Capacity of the formatted-print render buffer
pub const PRINT_BUFFER_SIZE: usize = 256;

/// Line terminator written after every printed line
pub const LINE_BREAK: &str = "\r\n";

/// Errors from formatted printing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PrintError {
    /// The rendered text did not fit in [`PRINT_BUFFER_SIZE`] bytes
    ///
    /// The fitting prefix was still printed.
    Truncated,
}

/// Text console
///
/// Implementors provide [`fmt::Write::write_str`]; a console that cannot
/// keep up may drop text but must not block the caller indefinitely.
pub trait Console: Write {
    /// Print `line` followed by a line break
    fn print(&mut self, line: &str) {
        let _ = self.write_str(line);
        let _ = self.write_str(LINE_BREAK);
    }
}

/// Render `args` into a bounded buffer and print it as one line
///
/// Output longer than [`PRINT_BUFFER_SIZE`] bytes is cut at the last
/// character boundary that fits; the prefix is printed and
/// [`PrintError::Truncated`] is returned.
pub fn print_fmt<C: Console + ?Sized>(
    console: &mut C,
    args: fmt::Arguments<'_>,
) -> Result<(), PrintError> {
    let mut buffer = Bounded {
        text: String::new(),
        truncated: false,
    };
    let _ = buffer.write_fmt(args);
    console.print(buffer.text.as_str());
    if buffer.truncated {
        Err(PrintError::Truncated)
    } else {
        Ok(())
    }
}

/// Format and print one line on a [`Console`]
///
/// ```ignore
/// gs_printf!(console, "Reset {}", if ok { "OK" } else { "Fail" });
/// ```
#[macro_export]
macro_rules! gs_printf {
    ($console:expr, $($arg:tt)*) => {
        $crate::console::print_fmt($console, core::format_args!($($arg)*))
    };
}

/// Render target that keeps what fits and remembers that something did not
struct Bounded {
    text: String<PRINT_BUFFER_SIZE>,
    truncated: bool,
}

impl Write for Bounded {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Err(fmt::Error);
        }
        if self.text.push_str(s).is_ok() {
            return Ok(());
        }

        // Keep the longest prefix that ends on a char boundary
        for ch in s.chars() {
            if self.text.push(ch).is_err() {
                break;
            }
        }
        self.truncated = true;
        Err(fmt::Error)
    }
}
