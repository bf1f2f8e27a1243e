/// The most recent `N` raw samples of one encoder channel.
///
/// Samples are stored as the electrical level, `true` meaning high. The lines
/// are active-low, so a fresh buffer (all `true`) reads as an idle channel.
#[derive(Clone, Debug)]
pub struct SampleBuffer<const N: usize> {
    samples: [bool; N],
    index: usize,
}

impl<const N: usize> SampleBuffer<N> {
    pub const fn new() -> Self {
        Self {
            samples: [true; N],
            index: 0,
        }
    }

    /// Overwrites the oldest sample.
    pub fn write(&mut self, value: bool) {
        self.samples[self.index] = value;
        self.index = (self.index + 1) % N;
    }

    pub fn all_true(&self) -> bool {
        self.samples.iter().all(|&s| s)
    }

    pub fn any_true(&self) -> bool {
        self.samples.iter().any(|&s| s)
    }
}

impl<const N: usize> Default for SampleBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
