//! Quadrature decoding for a detented rotary encoder.
//!
//! Both channels idle high. One detent pulls the leading channel low, then the
//! trailing one, then releases them in the same order. The decoder follows
//! that sequence through [`QuadratureState`] and reports the direction once
//! both channels are back high. Samples are filtered through a
//! [`SampleBuffer`] per channel: a channel only counts as low once the whole
//! window is low, and as high once the whole window is high.

use embedded_hal::digital::v2::InputPin;
use embedded_time::duration::Microseconds;
use embedded_time::{Clock, Instant};
use log::{debug, trace};

use crate::error::Error;
use crate::event::UserEvent;
use crate::sample_buffer::SampleBuffer;
use crate::time::Stopwatch;

pub const SAMPLES_PER_MS: usize = 40;
/// Span of the filter window.
pub const SAMPLE_WINDOW_US: usize = 250;
pub const SAMPLE_BUFFER_LEN: usize = SAMPLES_PER_MS * SAMPLE_WINDOW_US / 1_000;

pub const SAMPLE_PERIOD: Microseconds<u64> = Microseconds(1_000 / SAMPLES_PER_MS as u64);
/// Polls closer than this to the previous state change are ignored.
pub const DEBOUNCE_GUARD: Microseconds<u64> = Microseconds(1_500);
/// How long an Idle run waits for a channel to settle low.
pub const TRIGGER_WINDOW: Microseconds<u64> = Microseconds(3_000);
pub const ONE_CHANNEL_LOW_TIMEOUT: Microseconds<u64> = Microseconds(200_000);
pub const BOTH_CHANNELS_LOW_TIMEOUT: Microseconds<u64> = Microseconds(110_000);
pub const ONE_CHANNEL_BACK_HIGH_TIMEOUT: Microseconds<u64> = Microseconds(40_000);

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Channel {
    A,
    B,
}

impl Channel {
    pub fn other(self) -> Channel {
        match self {
            Channel::A => Channel::B,
            Channel::B => Channel::A,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    /// Channel B leading is clockwise.
    pub fn led_by(leading: Channel) -> Rotation {
        match leading {
            Channel::B => Rotation::Clockwise,
            Channel::A => Rotation::CounterClockwise,
        }
    }
}

impl From<Rotation> for UserEvent {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Clockwise => UserEvent::Clockwise,
            Rotation::CounterClockwise => UserEvent::CounterClockwise,
        }
    }
}

/// Progress through one detent. Every state but `Idle` carries the channel
/// that went low first.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum QuadratureState {
    Idle,
    OneChannelLow(Channel),
    BothChannelsLow(Channel),
    OneChannelBackHigh(Channel),
    BothChannelsBackHigh(Channel),
}

impl QuadratureState {
    pub fn leading(&self) -> Option<Channel> {
        match *self {
            QuadratureState::Idle => None,
            QuadratureState::OneChannelLow(c)
            | QuadratureState::BothChannelsLow(c)
            | QuadratureState::OneChannelBackHigh(c)
            | QuadratureState::BothChannelsBackHigh(c) => Some(c),
        }
    }

    /// Leaving `Idle` is driven by the filter (see [`ChannelLevels::update`]),
    /// so `Idle` only ever times out here.
    fn step(&self, observed: &Observation) -> Step {
        let levels = &observed.levels;

        match *self {
            QuadratureState::Idle => {
                if observed.since_trigger >= TRIGGER_WINDOW {
                    Step::Abort
                } else {
                    Step::Stay
                }
            }
            QuadratureState::OneChannelLow(leading) => {
                if observed.since_change >= ONE_CHANNEL_LOW_TIMEOUT {
                    Step::Abort
                } else if levels.is_high(leading) {
                    //leading channel bounced back before the other one fell
                    Step::Abort
                } else if !levels.a && !levels.b {
                    Step::Enter(QuadratureState::BothChannelsLow(leading))
                } else {
                    Step::Stay
                }
            }
            QuadratureState::BothChannelsLow(leading) => {
                if observed.since_change >= BOTH_CHANNELS_LOW_TIMEOUT {
                    Step::Abort
                } else if levels.a && levels.b {
                    // Both windows can fill high in the same sample on fast
                    // turns; finishing here instead of aborting catches those.
                    Step::Enter(QuadratureState::BothChannelsBackHigh(leading))
                } else if levels.is_high(leading.other()) {
                    Step::Enter(QuadratureState::OneChannelLow(leading))
                } else if levels.is_high(leading) {
                    Step::Enter(QuadratureState::OneChannelBackHigh(leading))
                } else {
                    Step::Stay
                }
            }
            QuadratureState::OneChannelBackHigh(leading) => {
                if observed.since_change >= ONE_CHANNEL_BACK_HIGH_TIMEOUT {
                    Step::Abort
                } else if !levels.is_high(leading) {
                    Step::Enter(QuadratureState::BothChannelsLow(leading))
                } else if observed.any_high(leading.other()) {
                    Step::Enter(QuadratureState::BothChannelsBackHigh(leading))
                } else {
                    Step::Stay
                }
            }
            QuadratureState::BothChannelsBackHigh(leading) => {
                Step::Complete(Rotation::led_by(leading))
            }
        }
    }
}

/// Filtered channel levels, `true` meaning high.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ChannelLevels {
    pub a: bool,
    pub b: bool,
}

impl ChannelLevels {
    pub const fn high() -> Self {
        Self { a: true, b: true }
    }

    pub fn is_high(&self, channel: Channel) -> bool {
        match channel {
            Channel::A => self.a,
            Channel::B => self.b,
        }
    }

    /// Applies the latest samples. A level goes high once its whole window is
    /// high and low once none of it is; otherwise it keeps its value.
    ///
    /// Returns the channel that is fully low while the other is still high.
    /// B is evaluated first, so B wins when both fall on the same sample.
    pub fn update<const N: usize>(
        &mut self,
        a: &SampleBuffer<N>,
        b: &SampleBuffer<N>,
    ) -> Option<Channel> {
        if b.all_true() {
            self.b = true;
        }
        if a.all_true() {
            self.a = true;
        }

        let mut fallen = None;
        if !b.any_true() {
            self.b = false;
            if self.a {
                fallen = Some(Channel::B);
            }
        }
        if !a.any_true() {
            self.a = false;
            if self.b {
                fallen = Some(Channel::A);
            }
        }
        fallen
    }
}

struct Observation {
    levels: ChannelLevels,
    any_high_a: bool,
    any_high_b: bool,
    since_change: Microseconds<u64>,
    since_trigger: Microseconds<u64>,
}

impl Observation {
    fn any_high(&self, channel: Channel) -> bool {
        match channel {
            Channel::A => self.any_high_a,
            Channel::B => self.any_high_b,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Step {
    Stay,
    Enter(QuadratureState),
    /// Give up on the sequence without reporting anything.
    Abort,
    Complete(Rotation),
}

pub struct QuadratureDecoder<C: Clock<T = u64>> {
    samples_a: SampleBuffer<SAMPLE_BUFFER_LEN>,
    samples_b: SampleBuffer<SAMPLE_BUFFER_LEN>,
    state: QuadratureState,
    last_change: Stopwatch<C>,
    last_sample: Stopwatch<C>,
}

impl<C: Clock<T = u64>> QuadratureDecoder<C> {
    pub fn new(now: Instant<C>) -> Self {
        Self {
            samples_a: SampleBuffer::new(),
            samples_b: SampleBuffer::new(),
            state: QuadratureState::Idle,
            last_change: Stopwatch::new(now),
            last_sample: Stopwatch::new(now),
        }
    }

    pub fn state(&self) -> QuadratureState {
        self.state
    }

    pub fn samples(&self, channel: Channel) -> &SampleBuffer<SAMPLE_BUFFER_LEN> {
        match channel {
            Channel::A => &self.samples_a,
            Channel::B => &self.samples_b,
        }
    }

    /// Follows a detent from `trigger`, the instant a channel was seen
    /// active, until it completes or is abandoned.
    ///
    /// Blocks while a sequence is in progress, at most for the sum of the
    /// state timeouts. Always returns with the decoder back in `Idle`, also
    /// when a pin or the clock fails part way through.
    pub fn run<A, B, E>(
        &mut self,
        pin_a: &A,
        pin_b: &B,
        clock: &C,
        trigger: Instant<C>,
    ) -> Result<Option<Rotation>, Error<E>>
    where
        A: InputPin<Error = E>,
        B: InputPin<Error = E>,
    {
        if self.last_change.elapsed(&trigger) <= DEBOUNCE_GUARD {
            trace!("trigger inside debounce guard");
            return Ok(None);
        }

        let mut last_seen = trigger;
        let result = self.follow(pin_a, pin_b, clock, trigger, &mut last_seen);

        if result.is_err() && self.state != QuadratureState::Idle {
            trace!("fault in {:?}", self.state);
            self.enter(QuadratureState::Idle, last_seen);
        }
        result
    }

    /// The sampling loop of [`run`](QuadratureDecoder::run). `last_seen` is
    /// kept at the latest clock reading.
    fn follow<A, B, E>(
        &mut self,
        pin_a: &A,
        pin_b: &B,
        clock: &C,
        trigger: Instant<C>,
        last_seen: &mut Instant<C>,
    ) -> Result<Option<Rotation>, Error<E>>
    where
        A: InputPin<Error = E>,
        B: InputPin<Error = E>,
    {
        let trigger = Stopwatch::new(trigger);
        let mut levels = ChannelLevels::high();

        loop {
            let now = clock.try_now()?;
            *last_seen = now;

            if self.last_sample.elapsed(&now) >= SAMPLE_PERIOD {
                self.last_sample.restart(now);
                self.samples_b.write(pin_b.is_high().map_err(Error::Pin)?);
                self.samples_a.write(pin_a.is_high().map_err(Error::Pin)?);

                let fallen = levels.update(&self.samples_a, &self.samples_b);
                if let (QuadratureState::Idle, Some(leading)) = (self.state, fallen) {
                    self.enter(QuadratureState::OneChannelLow(leading), now);
                }
            }

            let observed = Observation {
                levels,
                any_high_a: self.samples_a.any_true(),
                any_high_b: self.samples_b.any_true(),
                since_change: self.last_change.elapsed(&now),
                since_trigger: trigger.elapsed(&now),
            };

            match self.state.step(&observed) {
                Step::Stay => {}
                Step::Enter(next) => self.enter(next, now),
                Step::Abort => {
                    trace!("abandoned sequence in {:?}", self.state);
                    self.enter(QuadratureState::Idle, now);
                    return Ok(None);
                }
                Step::Complete(rotation) => {
                    debug!("rotation {:?}", rotation);
                    self.enter(QuadratureState::Idle, now);
                    return Ok(Some(rotation));
                }
            }
        }
    }

    fn enter(&mut self, next: QuadratureState, now: Instant<C>) {
        trace!("{:?} -> {:?}", self.state, next);
        self.state = next;
        self.last_change.restart(now);
    }
}
