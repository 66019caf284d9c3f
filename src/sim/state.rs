//! Session state and core simulation types
//!
//! Everything one play session mutates lives in `SessionState`; it is owned
//! by a single thread and only changed through `tick`.

use serde::{Deserialize, Serialize};

use super::clock::RunClock;
use super::field::PlatformField;
use super::player::PlayerBody;
use super::rect::Rect;
use super::scroll::ScrollParams;
use crate::analysis::TempoTrack;
use crate::settings::{GameConfig, Mode};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first jump; platforms and clock are frozen
    Ready,
    /// Scrolling and scoring
    Playing,
    /// Nothing advances until resumed
    Paused,
    /// An outcome has been produced
    Over,
}

/// How a session ended. Produced exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// Survived until the end of the track
    Cleared { elapsed: f64 },
    /// Fell past the bottom of the screen
    Lost { elapsed: f64 },
    /// Quit mid-session
    Aborted { elapsed: f64 },
}

impl SessionOutcome {
    pub fn elapsed(&self) -> f64 {
        match *self {
            SessionOutcome::Cleared { elapsed }
            | SessionOutcome::Lost { elapsed }
            | SessionOutcome::Aborted { elapsed } => elapsed,
        }
    }

    /// Whole seconds survived
    pub fn score(&self) -> u64 {
        whole_seconds(self.elapsed())
    }

    pub fn is_cleared(&self) -> bool {
        matches!(self, SessionOutcome::Cleared { .. })
    }

    /// Cleared and lost runs are recorded; aborted ones are not
    pub fn is_recorded(&self) -> bool {
        !matches!(self, SessionOutcome::Aborted { .. })
    }
}

pub(crate) fn whole_seconds(elapsed: f64) -> u64 {
    elapsed.max(0.0).floor() as u64
}

/// A platform the player can land on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
        }
    }
}

/// What the UI needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub player: Rect,
    pub platforms: Vec<Rect>,
    pub score: u64,
    pub elapsed: f64,
    pub scroll_speed: f32,
    pub phase: GamePhase,
}

/// Complete state of one play session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub config: GameConfig,
    pub level: String,
    pub mode: Mode,
    /// Rhythm-mode multiplier of the level, if it has one
    pub speed_multiplier: Option<f32>,
    pub tempo_track: TempoTrack,
    /// Length of the music; reaching it clears the level
    pub track_duration: f64,
    pub seed: u64,
    pub phase: GamePhase,
    pub clock: RunClock,
    pub field: PlatformField,
    pub player: PlayerBody,
    /// Elapsed play time as of the last tick
    pub elapsed: f64,
    /// Scroll speed applied on the last tick
    pub scroll_speed: f32,
    /// Ticks processed (paused ticks excluded)
    pub time_ticks: u64,
    pub outcome: Option<SessionOutcome>,
}

impl SessionState {
    pub fn new(
        config: GameConfig,
        level: &str,
        mode: Mode,
        tempo_track: TempoTrack,
        track_duration: f64,
        seed: u64,
    ) -> Self {
        let speed_multiplier = config.level(level).map(|l| l.speed_multiplier);
        if speed_multiplier.is_none() {
            log::warn!("Level {:?} not in catalogue, rhythm mode will use normal speed", level);
        }

        let field = PlatformField::with_seed_platforms(seed);
        let player = PlayerBody::new(&config);

        log::info!(
            "Session: level={:?} mode={} duration={:.1}s segments={} seed={}",
            level,
            mode,
            track_duration,
            tempo_track.len(),
            seed
        );

        Self {
            config,
            level: level.to_string(),
            mode,
            speed_multiplier,
            tempo_track,
            track_duration,
            seed,
            phase: GamePhase::Ready,
            clock: RunClock::new(),
            field,
            player,
            elapsed: 0.0,
            scroll_speed: 0.0,
            time_ticks: 0,
            outcome: None,
        }
    }

    pub fn scroll_params(&self) -> ScrollParams<'_> {
        ScrollParams {
            mode: self.mode,
            level: &self.level,
            segment_duration: self.tempo_track.segment_duration(),
            tempo_track: &self.tempo_track,
            base_speed: self.config.normal_base_speed,
            speed_multiplier: self.speed_multiplier,
        }
    }

    /// Whole seconds survived so far
    pub fn score(&self) -> u64 {
        whole_seconds(self.elapsed)
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            player: self.player.rect,
            platforms: self.field.platforms().iter().map(|p| p.rect).collect(),
            score: self.score(),
            elapsed: self.elapsed,
            scroll_speed: self.scroll_speed,
            phase: self.phase,
        }
    }
}
