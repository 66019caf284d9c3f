//! Player/platform collision
//!
//! Platforms are one-sided: the player can only land on top of one while
//! falling. Rising through a platform from below never snaps.

use super::rect::Rect;
use super::state::Platform;

/// Result of a landing check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    /// Index of the platform landed on
    pub platform: usize,
    /// New top-left `y` for the player (bottom flush with platform top)
    pub snapped_y: f32,
}

/// Whether a body that moved by `velocity_y` this tick lands on `platform`.
///
/// `body` is the post-integration rectangle. The body must be falling, must
/// overlap the platform, and its bottom must have been at or above the
/// platform top before this tick's displacement.
pub fn lands_on(body: &Rect, velocity_y: f32, platform: &Rect) -> bool {
    velocity_y > 0.0 && body.overlaps(platform) && body.bottom() <= platform.top() + velocity_y
}

/// First platform the body lands on, in field order
pub fn find_landing(body: &Rect, velocity_y: f32, platforms: &[Platform]) -> Option<Landing> {
    platforms
        .iter()
        .position(|p| lands_on(body, velocity_y, &p.rect))
        .map(|platform| Landing {
            platform,
            snapped_y: platforms[platform].rect.top() - body.size.y,
        })
}
