//! Debug console over defmt
//!
//! Text is collected until a line break and then emitted as one defmt
//! message, so a line printed in several `write_str` calls still shows up
//! as a single log line on the host.

use core::fmt;

use gainspan_hal::{Console, PRINT_BUFFER_SIZE};
use heapless::String;

/// [`Console`] that forwards complete lines to `defmt::println!`
#[derive(Default)]
pub struct DefmtConsole {
    line: String<PRINT_BUFFER_SIZE>,
}

impl DefmtConsole {
    pub const fn new() -> Self {
        Self {
            line: String::new(),
        }
    }

    fn emit(&mut self) {
        defmt::println!("{=str}", self.line.as_str());
        self.line.clear();
    }
}

impl fmt::Write for DefmtConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            match ch {
                '\r' => {}
                '\n' => self.emit(),
                _ => {
                    // A line longer than the buffer is split
                    if self.line.push(ch).is_err() {
                        self.emit();
                        let _ = self.line.push(ch);
                    }
                }
            }
        }
        Ok(())
    }
}

impl Console for DefmtConsole {}
