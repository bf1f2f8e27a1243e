use embedded_hal::digital::v2::InputPin;
use embedded_time::Clock;

use crate::button::ButtonDebouncer;
use crate::error::Error;
use crate::event::UserEvent;
use crate::quadrature::{QuadratureDecoder, QuadratureState};

/// A rotary encoder with a push button, all three lines active-low.
///
/// Call [`poll`](Encoder::poll) from the main loop. Events are not buffered:
/// whatever a poll detects is returned by that poll or lost.
///
/// # Example
///
/// ```no_run
/// # fn demo<C, P, E>(clock: &C, a: P, b: P, button: P) -> Result<(), rotary_input::Error<E>>
/// # where C: embedded_time::Clock<T = u64>, P: embedded_hal::digital::v2::InputPin<Error = E> {
/// use rotary_input::{Encoder, UserEvent};
///
/// let mut encoder = Encoder::new(a, b, button, clock)?;
/// loop {
///     match encoder.poll()? {
///         Some(UserEvent::Clockwise) => {}
///         Some(UserEvent::CounterClockwise) => {}
///         Some(UserEvent::Button) => {}
///         _ => {}
///     }
/// }
/// # }
/// ```
pub struct Encoder<'a, A, B, S, C: Clock<T = u64>> {
    pin_a: A,
    pin_b: B,
    button_pin: S,
    clock: &'a C,
    rotation: QuadratureDecoder<C>,
    button: ButtonDebouncer<C>,
}

impl<'a, A, B, S, C, E> Encoder<'a, A, B, S, C>
where
    A: InputPin<Error = E>,
    B: InputPin<Error = E>,
    S: InputPin<Error = E>,
    C: Clock<T = u64>,
{
    pub fn new(pin_a: A, pin_b: B, button_pin: S, clock: &'a C) -> Result<Self, Error<E>> {
        let now = clock.try_now()?;

        Ok(Self {
            pin_a,
            pin_b,
            button_pin,
            clock,
            rotation: QuadratureDecoder::new(now),
            button: ButtonDebouncer::new(now),
        })
    }

    /// Samples the encoder once and returns the resulting event, if any.
    ///
    /// While a detent is in progress this keeps sampling until it completes
    /// or times out. When the button needs handling in the same poll, its
    /// outcome replaces the rotation result.
    pub fn poll(&mut self) -> Result<Option<UserEvent>, Error<E>> {
        let a_active = self.pin_a.is_low().map_err(Error::Pin)?;
        let b_active = self.pin_b.is_low().map_err(Error::Pin)?;
        let button_active = self.button_pin.is_low().map_err(Error::Pin)?;

        let mut event = None;

        if a_active || b_active {
            let trigger = self.clock.try_now()?;
            event = self
                .rotation
                .run(&self.pin_a, &self.pin_b, self.clock, trigger)?
                .map(UserEvent::from);
        }

        //keeps running after release so the release edge is seen
        if button_active || self.button.is_held() {
            let now = self.clock.try_now()?;
            let activated = self
                .button
                .update(&self.button_pin, now)
                .map_err(Error::Pin)?;
            event = activated.then(|| UserEvent::Button);
        }

        Ok(event)
    }

    pub fn state(&self) -> QuadratureState {
        self.rotation.state()
    }

    pub fn is_button_held(&self) -> bool {
        self.button.is_held()
    }

    pub fn release(self) -> (A, B, S) {
        (self.pin_a, self.pin_b, self.button_pin)
    }
}
