//! Scroll speed controller
//!
//! Pure function of its inputs; safe to call every tick.

use crate::analysis::TempoTrack;
use crate::consts::TEMPO_SPEED_DIVISOR;
use crate::settings::Mode;

/// Normal-mode scroll speed per level (pixels/tick)
const NORMAL_SPEEDS: &[(&str, f32)] = &[
    ("Tutorial - Lofi", 3.0),
    ("Easy - Next To You", 5.0),
    ("Intermediate - Warriors", 8.0),
    ("Hard - Beat Saber", 12.0),
    ("Ultra Hardcore - Hardstyle LFN", 15.0),
    ("GOD - Camelia", 18.0),
];

/// Fixed speed for `level`, or `base_speed` for levels missing from the table
pub fn normal_speed(level: &str, base_speed: f32) -> f32 {
    NORMAL_SPEEDS
        .iter()
        .find(|(name, _)| *name == level)
        .map(|&(_, speed)| speed)
        .unwrap_or(base_speed)
}

/// Everything the controller needs besides the current time
#[derive(Debug, Clone, Copy)]
pub struct ScrollParams<'a> {
    pub mode: Mode,
    pub level: &'a str,
    pub segment_duration: f64,
    pub tempo_track: &'a TempoTrack,
    pub base_speed: f32,
    /// Rhythm-mode multiplier; `None` for levels without one
    pub speed_multiplier: Option<f32>,
}

/// Scroll speed (pixels/tick) at `elapsed` seconds of play.
///
/// Rhythm mode reads the tempo of segment `floor(elapsed / segment_duration)`
/// and falls back to the Normal-mode speed once past the end of the track.
pub fn scroll_speed(params: &ScrollParams<'_>, elapsed: f64) -> f32 {
    let normal = normal_speed(params.level, params.base_speed);
    match params.mode {
        Mode::Normal => normal,
        Mode::Rhythm => {
            let index = (elapsed / params.segment_duration).floor();
            let tempo = if index >= 0.0 {
                params.tempo_track.get(index as usize)
            } else {
                None
            };
            match (tempo, params.speed_multiplier) {
                (Some(tempo), Some(multiplier)) => tempo * multiplier / TEMPO_SPEED_DIVISOR,
                _ => normal,
            }
        }
    }
}
