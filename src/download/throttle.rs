//! Client-side rate limiting.
//!
//! Two tiers approximate a video player filling its buffer: after
//! `delay_after` of continuous downloading the engine pauses for `delay`,
//! and between those pauses every segment that arrived faster than the
//! ceiling is followed by a proportional sleep.

use std::time::Duration;

/// How long to delay the next segment download.
pub const RATELIMIT_DELAY: Duration = Duration::from_secs(2);

/// Delay the next segment download after this much buffered download time.
pub const RATELIMIT_DELAY_AFTER: Duration = Duration::from_secs(5);

/// Lower bound for measured request time, keeps rates finite.
const MIN_ELAPSED_SECS: f64 = 1e-6;

/// Tunable constants of the buffer simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleSettings {
    pub delay: Duration,
    pub delay_after: Duration,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            delay: RATELIMIT_DELAY,
            delay_after: RATELIMIT_DELAY_AFTER,
        }
    }
}

/// What to do before the next request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pause {
    None,
    /// Buffer is full, simulate playback.
    Delay(Duration),
    /// Segment arrived faster than the ceiling.
    Throttle(Duration),
}

impl Pause {
    pub fn duration(&self) -> Duration {
        match self {
            Pause::None => Duration::ZERO,
            Pause::Delay(d) | Pause::Throttle(d) => *d,
        }
    }
}

/// Result of measuring one segment transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Instantaneous rate in bytes per second.
    pub rate: f64,
    /// Rate capped at the ceiling, as reported to the user.
    pub effective_rate: f64,
    pub pause: Pause,
}

/// Rate limiter state for one download.
#[derive(Debug, Clone)]
pub struct Throttle {
    ceiling: f64,
    settings: ThrottleSettings,
    buffered_secs: f64,
}

impl Throttle {
    /// `ceiling` is the maximum rate in bytes per second and must be positive.
    pub fn new(ceiling: f64, settings: ThrottleSettings) -> Self {
        Self {
            ceiling,
            settings,
            buffered_secs: 0.0,
        }
    }

    /// Measure a finished transfer and decide how long to pause.
    pub fn measure(&mut self, bytes: usize, elapsed: Duration) -> Measurement {
        let elapsed_secs = elapsed.as_secs_f64().max(MIN_ELAPSED_SECS);
        let rate = bytes as f64 / elapsed_secs;
        let effective_rate = rate.min(self.ceiling);

        let pause = if self.buffered_secs > self.settings.delay_after.as_secs_f64() {
            self.buffered_secs = 0.0;
            Pause::Delay(self.settings.delay)
        } else if rate > self.ceiling {
            let secs = (rate - self.ceiling) / self.ceiling * elapsed_secs;
            Pause::Throttle(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
        } else {
            Pause::None
        };

        Measurement {
            rate,
            effective_rate,
            pause,
        }
    }

    /// Account a finished iteration. Delaying iterations do not count.
    pub fn record_iteration(&mut self, pause: Pause, iteration: Duration) {
        if !matches!(pause, Pause::Delay(_)) {
            self.buffered_secs += iteration.as_secs_f64();
        }
    }
}
