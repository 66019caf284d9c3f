//! Rhythm Climb - an endless-runner rhythm game engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clock, scroll speed, platforms, player, session tick)
//! - `analysis`: Tempo estimation, computed once per track before a session starts
//! - `platform`: Clock and input abstraction
//! - `audio`: Music playback driver contract
//! - `persistence`: Per-player record files
//! - `highscores`: Leaderboard queries over the record files
//! - `runner`: Fixed-tick loop wiring the simulation to its collaborators

pub mod analysis;
pub mod audio;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod runner;
pub mod settings;
pub mod sim;

pub use analysis::{TempoEstimator, TempoTrack};
pub use error::{Error, Result};
pub use highscores::{Leaderboard, LeaderboardEntry};
pub use runner::{GameRunner, RenderSink};
pub use settings::{GameConfig, Level, Mode};

/// Game configuration constants
pub mod consts {
    /// Screen dimensions (pixels)
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 850.0;

    /// Player is lost once its top edge reaches this line
    pub const FALL_LINE: f32 = 750.0;

    /// Fixed simulation rate
    pub const TICK_RATE: u32 = 60;
    pub const TICK_DT: f64 = 1.0 / TICK_RATE as f64;

    /// Player defaults
    pub const PLAYER_SPAWN_X: f32 = 350.0;
    pub const PLAYER_SPAWN_Y: f32 = 600.0;
    pub const PLAYER_SIZE: f32 = 100.0;
    pub const JUMP_VELOCITY: f32 = -25.0;
    pub const GRAVITY: f32 = 1.0;
    pub const FAST_FALL_GRAVITY: f32 = 5.0;
    pub const MOVE_STEP: f32 = 10.0;

    /// Platform generation
    pub const PLATFORM_WIDTH: f32 = 150.0;
    pub const PLATFORM_HEIGHT: f32 = 20.0;
    pub const PLATFORM_GAP: f32 = 200.0;
    pub const REPLENISH_THRESHOLD: f32 = 200.0;
    pub const SPAWN_MARGIN_LEFT: f32 = 50.0;
    pub const SPAWN_MARGIN_RIGHT: f32 = 200.0;

    /// Scroll speed
    pub const NORMAL_BASE_SPEED: f32 = 5.0;
    /// Normalizes tempo units to pixels/tick
    pub const TEMPO_SPEED_DIVISOR: f32 = 12.0;
    pub const MAX_SCROLL_SPEED: f32 = 30.0;

    /// Tempo analysis
    pub const SEGMENT_DURATION: f64 = 1.0;
    pub const FALLBACK_TEMPO: f32 = 120.0;
}
