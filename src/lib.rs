#![cfg_attr(not(test), no_std)]

//! Polled decoding of a mechanical rotary encoder with a push button.
//!
//! [`Encoder::poll`] samples the two quadrature channels and the button once
//! per call and returns at most one [`UserEvent`]. Events are not queued: an
//! event that is not returned by the poll that detects it is lost.

pub mod button;
pub mod encoder;
mod error;
pub mod event;
pub mod handler;
pub mod keypad;
pub mod quadrature;
pub mod sample_buffer;
mod time;

#[cfg(test)]
mod test_bench;

pub use encoder::Encoder;
pub use error::Error;
pub use event::{KeyCode, UserEvent};
pub use handler::{CallbackEncoder, EventHandler};
pub use keypad::{DebouncedPin, Keypad};
pub use quadrature::{Channel, QuadratureDecoder, QuadratureState, Rotation};
