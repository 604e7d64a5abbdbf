//! Rate limiter for best-effort publishing

use std::time::{Duration, Instant};

/// Lets an action through at most once per `interval`.
///
/// The first call to [`Throttle::ready`] always succeeds.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Time of the last accepted call.
    pub fn last(&self) -> Option<Instant> {
        self.last
    }

    /// Returns `true` and restarts the window if the interval has elapsed.
    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }

    pub fn ready_at(&mut self, now: Instant) -> bool {
        let open = match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        };
        if open {
            self.last = Some(now);
        }
        open
    }
}
