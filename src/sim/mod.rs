//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes in as an argument, never read from the system
//! - Seeded RNG only
//! - No rendering, audio or file I/O

pub mod clock;
pub mod collision;
pub mod field;
pub mod player;
pub mod rect;
pub mod scroll;
pub mod state;
pub mod tick;

pub use clock::RunClock;
pub use collision::{Landing, find_landing, lands_on};
pub use field::PlatformField;
pub use player::{BodyStatus, JumpOutcome, PlayerBody};
pub use rect::Rect;
pub use scroll::{ScrollParams, normal_speed, scroll_speed};
pub use state::{FrameSnapshot, GamePhase, Platform, SessionOutcome, SessionState};
pub use tick::{SessionEffect, TickInput, tick};
