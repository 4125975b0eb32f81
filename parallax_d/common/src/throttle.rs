use std::time::{Duration, Instant};

pub const DEFAULT_SAMPLING_INTERVAL: Duration = Duration::from_millis(33);

/// Self-throttling gate for the detector loop.
#[derive(Debug, Clone)]
pub struct SamplingThrottle {
    interval: Duration,
    last_run: Option<Instant>,
}

impl Default for SamplingThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLING_INTERVAL)
    }
}

impl SamplingThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True when at least one interval has elapsed since the last accepted run.
    /// Accepting a run records `now` as its start.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_run {
            if now.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last_run = Some(now);
        true
    }

    /// Time left until the next run is allowed.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_run {
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }
}
