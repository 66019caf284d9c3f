//! Game configuration and level catalogue
//!
//! `GameConfig` is the one context object every component reads its screen
//! bounds and tuning from. Persisted as JSON next to the records.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;

/// How scroll speed is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Mode {
    /// Fixed per-level speed
    #[default]
    Normal,
    /// Speed follows the track's local tempo
    Rhythm,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "Normal",
            Mode::Rhythm => "Rhythm",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Some(Mode::Normal),
            // Older record files spell it "Rythm"
            "rhythm" | "rythm" => Some(Mode::Rhythm),
            _ => None,
        }
    }

    /// Menu left/right switches between the two modes
    pub fn toggle(self) -> Self {
        match self {
            Mode::Normal => Mode::Rhythm,
            Mode::Rhythm => Mode::Normal,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A playable level: one music track plus its rhythm speed multiplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Audio file backing the level
    pub file: String,
    /// Display name, also the key used in record files
    pub name: String,
    /// Scales tempo into scroll speed in Rhythm mode
    pub speed_multiplier: f32,
}

impl Level {
    pub fn new(file: &str, name: &str, speed_multiplier: f32) -> Self {
        Self {
            file: file.to_string(),
            name: name.to_string(),
            speed_multiplier,
        }
    }
}

/// The six shipped levels, easiest first
pub fn default_levels() -> Vec<Level> {
    vec![
        Level::new("Lofi.wav", "Tutorial - Lofi", 0.3),
        Level::new("Next_To_You.wav", "Easy - Next To You", 0.5),
        Level::new("Warriors.wav", "Intermediate - Warriors", 0.75),
        Level::new("Beat_Saber.wav", "Hard - Beat Saber", 0.80),
        Level::new("Last_Friday_Night.wav", "Ultra Hardcore - Hardstyle LFN", 1.1),
        Level::new("Camelia.wav", "GOD - Camelia", 1.4),
    ]
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Screen ===
    pub screen_width: f32,
    pub screen_height: f32,
    /// Player is lost once its `y` reaches this line
    pub fall_line: f32,

    // === Player physics (per tick) ===
    pub gravity: f32,
    pub fast_fall_gravity: f32,
    pub jump_velocity: f32,
    pub move_step: f32,
    pub player_spawn: (f32, f32),
    pub player_size: f32,

    // === Platforms ===
    pub platform_width: f32,
    pub platform_height: f32,
    /// Vertical distance between generated rows
    pub platform_gap: f32,
    /// Generate a new row once the topmost top is below this
    pub replenish_threshold: f32,
    pub spawn_margin_left: f32,
    pub spawn_margin_right: f32,
    /// Inclusive range of platforms per generated row
    pub platforms_per_row: (u32, u32),

    // === Scroll ===
    pub normal_base_speed: f32,
    /// `None` leaves the scroll speed uncapped
    pub max_scroll_speed: Option<f32>,

    // === Tempo ===
    pub segment_duration: f64,
    pub fallback_tempo: f32,

    // === Loop ===
    pub tick_rate: u32,

    pub levels: Vec<Level>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            fall_line: FALL_LINE,

            gravity: GRAVITY,
            fast_fall_gravity: FAST_FALL_GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            move_step: MOVE_STEP,
            player_spawn: (PLAYER_SPAWN_X, PLAYER_SPAWN_Y),
            player_size: PLAYER_SIZE,

            platform_width: PLATFORM_WIDTH,
            platform_height: PLATFORM_HEIGHT,
            platform_gap: PLATFORM_GAP,
            replenish_threshold: REPLENISH_THRESHOLD,
            spawn_margin_left: SPAWN_MARGIN_LEFT,
            spawn_margin_right: SPAWN_MARGIN_RIGHT,
            platforms_per_row: (1, 3),

            normal_base_speed: NORMAL_BASE_SPEED,
            max_scroll_speed: Some(MAX_SCROLL_SPEED),

            segment_duration: SEGMENT_DURATION,
            fallback_tempo: FALLBACK_TEMPO,

            tick_rate: TICK_RATE,

            levels: default_levels(),
        }
    }
}

impl GameConfig {
    /// Seconds per simulation tick
    pub fn tick_dt(&self) -> f64 {
        1.0 / self.tick_rate.max(1) as f64
    }

    /// Look up a level by display name
    pub fn level(&self, name: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.name == name)
    }

    /// Load config from a JSON file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(json) => {
                let config = serde_json::from_str(&json)?;
                log::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Save config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }
}
