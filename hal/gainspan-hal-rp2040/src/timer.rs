//! Millisecond clock on the embassy time driver

use embassy_time::{block_for, Duration, Instant};
use gainspan_hal::MsTimer;

/// [`MsTimer`] backed by `embassy_time::Instant`
///
/// Requires the embassy-rp `time-driver` feature.
pub struct EmbassyTimer {
    base: Instant,
}

impl Default for EmbassyTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbassyTimer {
    /// Create a timer; time zero is reset by [`MsTimer::init`]
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
        }
    }
}

impl MsTimer for EmbassyTimer {
    fn init(&mut self) {
        self.base = Instant::now();
    }

    fn now(&self) -> u32 {
        // Truncation gives the wrapping 32-bit counter
        Instant::now().duration_since(self.base).as_millis() as u32
    }

    fn delay(&mut self, ms: u32) {
        block_for(Duration::from_millis(u64::from(ms)));
    }
}
