use embedded_hal::digital::v2::InputPin;
use embedded_time::duration::Microseconds;
use embedded_time::{Clock, Instant};
use log::debug;

use crate::time::Stopwatch;

/// Raw reads averaged into one level on every update.
pub const BUTTON_SAMPLES: u8 = 10;
/// Minimum time between two activations (300 ms).
pub const BUTTON_DEBOUNCE: Microseconds<u64> = Microseconds(300_000);

/// Debounces an active-low push button, activating on release.
///
/// Triggering on the release edge instead of the press keeps contact chatter
/// at press time from producing events.
pub struct ButtonDebouncer<C: Clock<T = u64>> {
    held: bool,
    last_activation: Stopwatch<C>,
}

impl<C: Clock<T = u64>> ButtonDebouncer<C> {
    /// The first activation is accepted no earlier than [`BUTTON_DEBOUNCE`]
    /// after `now`.
    pub fn new(now: Instant<C>) -> Self {
        Self {
            held: false,
            last_activation: Stopwatch::new(now),
        }
    }

    /// Level seen on the previous update.
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Samples the pin and returns whether the button was just activated.
    pub fn update<P: InputPin>(&mut self, pin: &P, now: Instant<C>) -> Result<bool, P::Error> {
        let mut active = 0;
        for _ in 0..BUTTON_SAMPLES {
            if pin.is_low()? {
                active += 1;
            }
        }
        //rounded average, ties count as held
        let held = active * 2 >= BUTTON_SAMPLES;

        let activated =
            self.held && !held && self.last_activation.elapsed(&now) >= BUTTON_DEBOUNCE;
        if activated {
            debug!("button activated");
            self.last_activation.restart(now);
        }

        self.held = held;
        Ok(activated)
    }
}
