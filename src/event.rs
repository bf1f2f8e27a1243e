/// A key code reported by a keypad sharing the event stream with the encoder.
///
/// The value space belongs to the keypad's keymap; the encoder never produces
/// or interprets it.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct KeyCode(pub u8);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UserEvent {
    Clockwise,
    CounterClockwise,
    /// The encoder button was released after a debounced press.
    Button,
    Key(KeyCode),
}
