use embedded_time::duration::Microseconds;
use embedded_time::{Clock, Instant};

/// Remembers when something last happened.
///
/// Elapsed time goes through [`Instant::checked_duration_since`], which
/// subtracts tick counts with wrapping arithmetic, so intervals stay correct
/// when the clock counter overflows.
pub(crate) struct Stopwatch<C: Clock<T = u64>> {
    start: Instant<C>,
}

impl<C: Clock<T = u64>> Stopwatch<C> {
    pub fn new(now: Instant<C>) -> Self {
        Self { start: now }
    }

    pub fn restart(&mut self, now: Instant<C>) {
        self.start = now;
    }

    pub fn elapsed(&self, now: &Instant<C>) -> Microseconds<u64> {
        match now.checked_duration_since(&self.start) {
            Some(ticks) => Microseconds::<u64>::try_from(ticks).unwrap_or(Microseconds(u64::MAX)),
            //start is ahead of now: treat as no time passed
            None => Microseconds(0),
        }
    }
}
