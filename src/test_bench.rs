//! Simulated clock and input lines.
//!
//! Every clock read advances simulated time by a fixed step, so the decoder's
//! busy loop makes progress. Lines idle high and are driven low over scripted
//! intervals, given in microseconds from the bench origin.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use embedded_hal::digital::v2::InputPin;
use embedded_time::duration::Fraction;
use embedded_time::{clock, Clock, Instant};
use failure::Fail;

/// Simulated time added by each clock read.
pub const STEP_US: u64 = 5;

#[derive(Debug, Fail)]
#[fail(display = "An error occurred")]
pub struct TestPinError;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Line {
    A,
    B,
    Button,
}

#[derive(Debug)]
struct Shared {
    origin: u64,
    now: AtomicU64,
    lows: Mutex<Vec<(Line, u64, u64)>>,
    broken: Mutex<Vec<(Line, u64)>>,
    clock_broken_from: Mutex<Option<u64>>,
}

#[derive(Clone, Debug)]
pub struct Bench {
    shared: Arc<Shared>,
}

impl Bench {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// A bench whose clock counter starts at `origin` ticks.
    pub fn starting_at(origin: u64) -> Self {
        Self {
            shared: Arc::new(Shared {
                origin,
                now: AtomicU64::new(origin),
                lows: Mutex::new(Vec::new()),
                broken: Mutex::new(Vec::new()),
                clock_broken_from: Mutex::new(None),
            }),
        }
    }

    pub fn clock(&self) -> BenchClock {
        BenchClock {
            shared: self.shared.clone(),
        }
    }

    pub fn pin(&self, line: Line) -> BenchPin {
        BenchPin {
            shared: self.shared.clone(),
            line,
        }
    }

    /// Drives `line` low over `[from, until)`.
    pub fn hold_low(&self, line: Line, from: u64, until: u64) {
        self.shared.lows.lock().unwrap().push((line, from, until));
    }

    /// Makes every read of `line` fail.
    pub fn break_line(&self, line: Line) {
        self.break_line_from(line, 0);
    }

    /// Makes reads of `line` fail from `offset` onwards.
    pub fn break_line_from(&self, line: Line, offset: u64) {
        self.shared.broken.lock().unwrap().push((line, offset));
    }

    /// Makes clock reads fail from `offset` onwards. A failed read does not
    /// advance time.
    pub fn break_clock_from(&self, offset: u64) {
        *self.shared.clock_broken_from.lock().unwrap() = Some(offset);
    }

    /// Undoes every `break_*` call.
    pub fn repair(&self) {
        self.shared.broken.lock().unwrap().clear();
        *self.shared.clock_broken_from.lock().unwrap() = None;
    }

    /// Moves time forward to `offset`; never moves it back.
    pub fn advance_to(&self, offset: u64) {
        if self.elapsed() < offset {
            self.shared
                .now
                .store(self.shared.origin.wrapping_add(offset), Ordering::SeqCst);
        }
    }

    /// Microseconds since the origin.
    pub fn elapsed(&self) -> u64 {
        self.shared.elapsed()
    }
}

impl Shared {
    fn elapsed(&self) -> u64 {
        self.now.load(Ordering::SeqCst).wrapping_sub(self.origin)
    }
}

#[derive(Debug)]
pub struct BenchClock {
    shared: Arc<Shared>,
}

impl Clock for BenchClock {
    type T = u64;
    const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

    fn try_now(&self) -> Result<Instant<Self>, clock::Error> {
        if let Some(from) = *self.shared.clock_broken_from.lock().unwrap() {
            if self.shared.elapsed() >= from {
                return Err(clock::Error::NotRunning);
            }
        }
        Ok(Instant::new(
            self.shared.now.fetch_add(STEP_US, Ordering::SeqCst),
        ))
    }
}

pub struct BenchPin {
    shared: Arc<Shared>,
    line: Line,
}

impl InputPin for BenchPin {
    type Error = TestPinError;

    fn is_high(&self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        let at = self.shared.elapsed();
        if self
            .shared
            .broken
            .lock()
            .unwrap()
            .iter()
            .any(|&(line, from)| line == self.line && from <= at)
        {
            return Err(TestPinError);
        }
        Ok(self
            .shared
            .lows
            .lock()
            .unwrap()
            .iter()
            .any(|&(line, from, until)| line == self.line && from <= at && at < until))
    }
}
