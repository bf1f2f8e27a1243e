use arrayvec::ArrayVec;
use embedded_hal::digital::v2::InputPin;
use log::debug;

use crate::event::{KeyCode, UserEvent};

/// Upper history bits forced high; the level flips after 5 equal reads.
const STABLE_READS_MASK: u8 = 0b1110_0000;

/// An input pin that only changes level after several equal reads.
pub struct DebouncedPin<P> {
    pin: P,
    last: bool,
    history: u8,
}

impl<P, E> DebouncedPin<P>
where
    P: InputPin<Error = E>,
{
    pub fn new(pin: P, default_state: bool) -> DebouncedPin<P> {
        DebouncedPin {
            pin,
            last: default_state,
            history: if default_state {
                u8::MAX
            } else {
                STABLE_READS_MASK
            },
        }
    }

    pub fn update(&mut self) -> Result<(), E> {
        self.history = (self.history << 1)
            | if self.pin.is_high()? { 1 } else { 0 }
            | STABLE_READS_MASK;

        self.last = match self.history {
            u8::MAX => true,
            STABLE_READS_MASK => false,
            _ => self.last,
        };

        Ok(())
    }
}

impl<P> InputPin for DebouncedPin<P>
where
    P: InputPin,
{
    type Error = P::Error;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.last)
    }
    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(!self.last)
    }
}

/// Directly wired active-low keys sharing the encoder's event stream.
pub struct Keypad<P, const N: usize> {
    keys: [DebouncedPin<P>; N],
    keymap: [KeyCode; N],
    pressed: [bool; N],
}

impl<P, E, const N: usize> Keypad<P, N>
where
    P: InputPin<Error = E>,
{
    pub fn new(pins: [P; N], keymap: [KeyCode; N]) -> Keypad<P, N> {
        Keypad {
            keys: pins.map(|p| DebouncedPin::new(p, true)),
            keymap,
            pressed: [false; N],
        }
    }

    /// Scans every key once. Reports the first key, in keymap order, that went
    /// down on this scan; other keys going down on the same scan are dropped.
    pub fn poll(&mut self) -> Result<Option<UserEvent>, E> {
        let mut event = None;

        for (i, key) in self.keys.iter_mut().enumerate() {
            key.update()?;
            let down = key.is_low()?;

            if down && !self.pressed[i] && event.is_none() {
                debug!("key {:?} pressed", self.keymap[i]);
                event = Some(UserEvent::Key(self.keymap[i]));
            }
            self.pressed[i] = down;
        }

        Ok(event)
    }

    pub fn pressed_keys(&self) -> ArrayVec<KeyCode, N> {
        self.keys
            .iter()
            .zip(self.keymap.iter())
            .flat_map(|(k, &code)| k.is_low().ok().and_then(|v| v.then(|| code)))
            .collect()
    }
}
