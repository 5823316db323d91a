//! Frame timing
//!
//! Tracks the delta between frames and a once-per-second FPS window on top of
//! a [`Clock`]. The console backend reads the time base register; desktop
//! uses [`MonotonicClock`].

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic time
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;

    fn sleep(&self, duration: Duration);
}

/// Wall-clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

const FPS_WINDOW: f64 = 1.0;

/// Frame timer
pub struct Timer {
    clock: Arc<dyn Clock>,
    last_time: Duration,
    window_start: Duration,
    delta: f64,
    fps: f64,
    average_delta: f64,
    frames: u32,
}

impl Timer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            clock,
            last_time: now,
            window_start: now,
            delta: 0.0,
            fps: 0.0,
            average_delta: 0.0,
            frames: 0,
        }
    }

    /// Timer over the process monotonic clock
    pub fn monotonic() -> Self {
        Self::new(Arc::new(MonotonicClock::new()))
    }

    /// Advance one frame; returns the delta in seconds
    pub fn step(&mut self) -> f64 {
        let now = self.clock.now();

        self.delta = now.saturating_sub(self.last_time).as_secs_f64();
        self.last_time = now;

        self.frames += 1;
        let window = now.saturating_sub(self.window_start).as_secs_f64();
        if window >= FPS_WINDOW {
            self.fps = f64::from(self.frames);
            self.average_delta = window / f64::from(self.frames);
            self.frames = 0;
            self.window_start = now;
        }

        self.delta
    }

    /// Seconds between the last two steps
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Frames counted in the last complete window
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Mean frame time over the last complete window
    pub fn average_delta(&self) -> f64 {
        self.average_delta
    }

    /// Time since the clock's origin
    pub fn time(&self) -> Duration {
        self.clock.now()
    }

    pub fn sleep(&self, duration: Duration) {
        self.clock.sleep(duration);
    }
}
