//! Fixed-step simulation time
//!
//! Frame loops accumulate real elapsed time here and run one fixed update
//! per whole tick. The default tick rate is 60 Hz.

use std::time::Duration;

/// Default simulation tick rate (60 Hz = 16.666ms per tick)
pub const TICK_RATE_HZ: u32 = 60;

/// Upper bound on ticks run for a single frame, so a long stall does not
/// turn into an ever-growing backlog.
pub const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 5;

/// Simulation time tracker
pub struct SimulationTime {
    tick_duration: Duration,
    max_ticks_per_frame: u32,
    tick_count: u64,
    accumulated_time: Duration,
    lag: Duration,
}

impl SimulationTime {
    pub fn new() -> Self {
        Self::with_rate(TICK_RATE_HZ, DEFAULT_MAX_TICKS_PER_FRAME)
    }

    /// Tick at `hz` (clamped to at least 1) running at most
    /// `max_ticks_per_frame` ticks per frame.
    pub fn with_rate(hz: u32, max_ticks_per_frame: u32) -> Self {
        Self {
            tick_duration: Duration::from_secs(1) / hz.max(1),
            max_ticks_per_frame,
            tick_count: 0,
            accumulated_time: Duration::ZERO,
            lag: Duration::ZERO,
        }
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Feed a frame's elapsed time; returns how many ticks to run now.
    ///
    /// Time beyond the per-frame cap is dropped.
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.lag += frame_time;

        let mut ticks = 0;
        while self.lag >= self.tick_duration && ticks < self.max_ticks_per_frame {
            self.lag -= self.tick_duration;
            self.advance_tick();
            ticks += 1;
        }
        if ticks == self.max_ticks_per_frame && self.lag >= self.tick_duration {
            tracing::debug!(dropped = ?self.lag, "simulation fell behind");
            self.lag = Duration::ZERO;
        }
        ticks
    }

    pub fn advance_tick(&mut self) {
        self.tick_count += 1;
        self.accumulated_time += self.tick_duration;
    }

    pub fn total_time(&self) -> Duration {
        self.accumulated_time
    }

    /// Fraction of a tick carried over to the next frame, in `[0, 1)`.
    pub fn alpha(&self) -> f64 {
        self.lag.as_secs_f64() / self.tick_duration.as_secs_f64()
    }
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self::new()
    }
}
