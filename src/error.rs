use core::fmt;

use embedded_time::clock;

/// Hardware faults hit while polling.
///
/// Decoding problems such as bounce, timeouts or out-of-order channels are not
/// errors; they make a poll return no event.
#[derive(Debug)]
pub enum Error<E> {
    /// Reading an input pin failed.
    Pin(E),

    /// The clock could not be read.
    Clock(clock::Error),
}

impl<E> From<clock::Error> for Error<E> {
    fn from(error: clock::Error) -> Self {
        Error::Clock(error)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Pin(e) => write!(f, "input pin error: {:?}", e),
            Error::Clock(e) => write!(f, "clock error: {:?}", e),
        }
    }
}
