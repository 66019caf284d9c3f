//! Run clock: elapsed play time minus time spent paused
//!
//! Never reads wall-clock time itself; every call takes the caller's `now`
//! (seconds from any fixed origin).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunClock {
    start: Option<f64>,
    pause_start: Option<f64>,
    total_paused: f64,
}

impl RunClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the clock, clearing pause accounting
    pub fn start(&mut self, now: f64) {
        self.start = Some(now);
        self.pause_start = None;
        self.total_paused = 0.0;
    }

    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.pause_start.is_some()
    }

    /// No-op if already paused
    pub fn pause(&mut self, now: f64) {
        if self.pause_start.is_none() {
            self.pause_start = Some(now);
        }
    }

    /// No-op if not paused
    pub fn resume(&mut self, now: f64) {
        if let Some(paused_at) = self.pause_start.take() {
            self.total_paused += (now - paused_at).max(0.0);
        }
    }

    pub fn total_paused(&self) -> f64 {
        self.total_paused
    }

    /// Play time since `start`, frozen while paused; 0 before `start`
    pub fn elapsed(&self, now: f64) -> f64 {
        let Some(start) = self.start else {
            return 0.0;
        };
        let reading = self.pause_start.unwrap_or(now);
        (reading - start - self.total_paused).max(0.0)
    }
}
