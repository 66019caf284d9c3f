//! Player kinematics
//!
//! Gravity, jumping, one-sided landing and horizontal wrap. No side effects:
//! the first jump is reported back to the caller, which decides what to do
//! about music and scoring.

use serde::{Deserialize, Serialize};

use super::collision::find_landing;
use super::rect::Rect;
use super::state::Platform;
use crate::settings::GameConfig;

/// What a jump request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    /// Already in the air
    Ignored,
    Jumped,
    /// First jump of the session; happens once
    FirstJump,
}

/// Result of one physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStatus {
    Alive,
    /// Crossed the fall line; terminal
    Lost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBody {
    pub rect: Rect,
    /// Pixels/tick, positive is downward
    pub velocity_y: f32,
    pub is_jumping: bool,
    pub has_jumped_once: bool,
    pub first_jump_at: Option<f64>,
    lost: bool,
}

impl PlayerBody {
    pub fn new(config: &GameConfig) -> Self {
        let (x, y) = config.player_spawn;
        Self {
            rect: Rect::new(x, y, config.player_size, config.player_size),
            velocity_y: 0.0,
            is_jumping: false,
            has_jumped_once: false,
            first_jump_at: None,
            lost: false,
        }
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Standing on something with no vertical motion
    pub fn is_grounded(&self) -> bool {
        !self.is_jumping && self.velocity_y == 0.0
    }

    /// Start a jump unless one is already in progress
    pub fn jump(&mut self, now: f64, config: &GameConfig) -> JumpOutcome {
        if self.is_jumping || self.lost {
            return JumpOutcome::Ignored;
        }

        self.velocity_y = config.jump_velocity;
        self.is_jumping = true;

        if self.has_jumped_once {
            JumpOutcome::Jumped
        } else {
            self.has_jumped_once = true;
            self.first_jump_at = Some(now);
            JumpOutcome::FirstJump
        }
    }

    /// Horizontal step; wrapping happens in `tick`
    pub fn move_horizontal(&mut self, dx: f32) {
        if !self.lost {
            self.rect.pos.x += dx;
        }
    }

    /// One physics step: gravity, integration, landing, fall check, wrap
    pub fn tick(
        &mut self,
        platforms: &[Platform],
        fast_fall: bool,
        config: &GameConfig,
    ) -> BodyStatus {
        if self.lost {
            return BodyStatus::Lost;
        }

        self.velocity_y += if fast_fall {
            config.fast_fall_gravity
        } else {
            config.gravity
        };
        self.rect.pos.y += self.velocity_y;

        if let Some(landing) = find_landing(&self.rect, self.velocity_y, platforms) {
            self.rect.pos.y = landing.snapped_y;
            self.velocity_y = 0.0;
            self.is_jumping = false;
        }

        if self.rect.top() >= config.fall_line {
            self.lost = true;
            return BodyStatus::Lost;
        }

        self.wrap_horizontal(config.screen_width);
        BodyStatus::Alive
    }

    /// The screen is a horizontal cylinder
    pub fn wrap_horizontal(&mut self, screen_width: f32) {
        if self.rect.left() >= screen_width {
            self.rect.pos.x = -self.rect.size.x;
        } else if self.rect.right() < 0.0 {
            self.rect.pos.x = screen_width;
        }
    }
}
