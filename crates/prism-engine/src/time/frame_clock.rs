use std::time::{Duration, Instant};

/// One clock tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameTick {
    /// Ticks taken before this one.
    pub index: u64,
    pub at: Instant,
    /// Time since the previous tick; zero for the first.
    pub delta: Duration,
}

impl FrameTick {
    /// Delta in seconds.
    #[inline]
    pub fn dt(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

/// Measures the wall-clock time between consecutive frames.
///
/// Deltas are reported as measured unless a cap is set with
/// [`FrameClock::with_max_delta`].
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    previous: Option<Instant>,
    ticks: u64,
    max_delta: Option<Duration>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock whose deltas never exceed `max_delta`.
    pub fn with_max_delta(max_delta: Duration) -> Self {
        Self {
            max_delta: Some(max_delta),
            ..Self::default()
        }
    }

    /// Ticks taken so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn max_delta(&self) -> Option<Duration> {
        self.max_delta
    }

    pub fn tick(&mut self) -> FrameTick {
        self.tick_at(Instant::now())
    }

    /// Ticks as if the frame started at `at`.
    pub fn tick_at(&mut self, at: Instant) -> FrameTick {
        let elapsed = self
            .previous
            .replace(at)
            .map_or(Duration::ZERO, |previous| at.saturating_duration_since(previous));
        let delta = match self.max_delta {
            Some(max) => elapsed.min(max),
            None => elapsed,
        };

        let tick = FrameTick {
            index: self.ticks,
            at,
            delta,
        };
        self.ticks = self.ticks.wrapping_add(1);
        tick
    }
}
