//! Clocks and frame pacing

use std::time::{Duration, Instant};

/// Time source for the game loop
pub trait Clock {
    /// Seconds since an arbitrary fixed origin
    fn now(&self) -> f64;

    /// Block (or advance) until the next tick is due
    fn end_frame(&mut self);
}

/// Keeps a loop at a fixed rate by sleeping off the rest of each frame
#[derive(Debug)]
pub struct FrameLimiter {
    frame: Duration,
    next: Option<Instant>,
}

impl FrameLimiter {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            frame: Duration::from_secs_f64(1.0 / tick_rate.max(1) as f64),
            next: None,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame
    }

    /// Sleep until the next frame boundary. A frame that overran resets the
    /// schedule instead of trying to catch up.
    pub fn wait(&mut self) {
        let now = Instant::now();
        let target = self.next.unwrap_or(now) + self.frame;
        if target > now {
            std::thread::sleep(target - now);
            self.next = Some(target);
        } else {
            self.next = Some(now);
        }
    }
}

/// Wall clock paced at the configured tick rate
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
    limiter: FrameLimiter,
}

impl SystemClock {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            origin: Instant::now(),
            limiter: FrameLimiter::new(tick_rate),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn end_frame(&mut self) {
        self.limiter.wait();
    }
}

/// Simulated clock: time only moves when told to. Each `end_frame` steps
/// one tick, so a headless session runs as fast as the CPU allows.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: f64,
    step: f64,
}

impl ManualClock {
    pub fn new(start: f64, step: f64) -> Self {
        Self { now: start, step }
    }

    pub fn advance(&mut self, seconds: f64) {
        self.now += seconds;
    }

    pub fn set(&mut self, now: f64) {
        self.now = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now
    }

    fn end_frame(&mut self) {
        self.now += self.step;
    }
}
