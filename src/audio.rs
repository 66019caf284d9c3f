//! Music playback contract
//!
//! The game only ever drives one music track per session. Decoding and
//! output are left to whatever implements `AudioDriver`.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Playback state of the music track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

pub trait AudioDriver {
    fn load_track(&mut self, path: &Path) -> Result<()>;
    fn play(&mut self, looped: bool);
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
}

/// Driver with no output device; tracks state and logs transitions
#[derive(Debug, Default)]
pub struct SilentAudio {
    track: Option<PathBuf>,
    state: PlaybackState,
    looped: bool,
}

impl SilentAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn track(&self) -> Option<&Path> {
        self.track.as_deref()
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }
}

impl AudioDriver for SilentAudio {
    fn load_track(&mut self, path: &Path) -> Result<()> {
        log::info!("Loaded track {}", path.display());
        self.track = Some(path.to_path_buf());
        self.state = PlaybackState::Stopped;
        Ok(())
    }

    fn play(&mut self, looped: bool) {
        if self.track.is_none() {
            log::warn!("play() with no track loaded");
            return;
        }
        self.looped = looped;
        self.state = PlaybackState::Playing;
        log::debug!("Music playing (looped={})", looped);
    }

    fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            log::debug!("Music paused");
        }
    }

    fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
            log::debug!("Music resumed");
        }
    }

    fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        log::debug!("Music stopped");
    }
}
