use embedded_hal::digital::v2::InputPin;
use embedded_time::Clock;

use crate::encoder::Encoder;
use crate::error::Error;
use crate::event::UserEvent;

/// Receives encoder events from a [`CallbackEncoder`].
pub trait EventHandler {
    fn clockwise(&mut self);
    fn counter_clockwise(&mut self);
    fn button(&mut self);
}

impl<H: EventHandler + ?Sized> EventHandler for &mut H {
    fn clockwise(&mut self) {
        (**self).clockwise()
    }
    fn counter_clockwise(&mut self) {
        (**self).counter_clockwise()
    }
    fn button(&mut self) {
        (**self).button()
    }
}

/// An [`Encoder`] that calls a handler instead of returning events.
///
/// Decoding is exactly that of the wrapped encoder; the handler is called
/// synchronously from within [`poll`](CallbackEncoder::poll).
pub struct CallbackEncoder<'a, A, B, S, C: Clock<T = u64>, H> {
    encoder: Encoder<'a, A, B, S, C>,
    handler: H,
}

impl<'a, A, B, S, C, E, H> CallbackEncoder<'a, A, B, S, C, H>
where
    A: InputPin<Error = E>,
    B: InputPin<Error = E>,
    S: InputPin<Error = E>,
    C: Clock<T = u64>,
    H: EventHandler,
{
    pub fn new(encoder: Encoder<'a, A, B, S, C>, handler: H) -> Self {
        Self { encoder, handler }
    }

    pub fn poll(&mut self) -> Result<(), Error<E>> {
        match self.encoder.poll()? {
            Some(UserEvent::Clockwise) => self.handler.clockwise(),
            Some(UserEvent::CounterClockwise) => self.handler.counter_clockwise(),
            Some(UserEvent::Button) => self.handler.button(),
            Some(UserEvent::Key(_)) | None => {}
        }
        Ok(())
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_parts(self) -> (Encoder<'a, A, B, S, C>, H) {
        (self.encoder, self.handler)
    }
}
