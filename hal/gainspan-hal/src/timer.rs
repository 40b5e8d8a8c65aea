//! Millisecond timer abstraction
//!
//! The counter is 32 bits wide and wraps after roughly 49.7 days. Callers
//! measure durations with [`MsTimer::elapsed`] (or [`elapsed_between`]),
//! never by comparing two raw timestamps.

/// Milliseconds between two samples of a wrapping 32-bit counter
#[inline]
pub fn elapsed_between(start: u32, now: u32) -> u32 {
    now.wrapping_sub(start)
}

/// Monotonic millisecond clock
///
/// Implementations own the process-wide time base. [`MsTimer::init`] is
/// called once by the HAL facade; the counter is never reset afterwards.
pub trait MsTimer {
    /// Establish time zero
    fn init(&mut self);

    /// Milliseconds since [`MsTimer::init`], wrapping at `u32::MAX`
    fn now(&self) -> u32;

    /// Milliseconds elapsed since `start`
    ///
    /// Wraparound-safe as long as the real interval is shorter than one
    /// full counter period.
    fn elapsed(&self, start: u32) -> u32 {
        elapsed_between(start, self.now())
    }

    /// Block for at least `ms` milliseconds
    fn delay(&mut self, ms: u32);
}
