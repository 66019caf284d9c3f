//! Platform field: scrolling, pruning and procedural generation
//!
//! Per-tick order is fixed: `advance` -> `prune` -> (collision) -> `replenish`,
//! so a platform spawned this tick is never part of this tick's collisions.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::Platform;
use crate::settings::GameConfig;

/// Starting layout; the wide one at the bottom is where the player lands first
const SEED_PLATFORMS: [(f32, f32, f32, f32); 6] = [
    (200.0, 400.0, 150.0, 20.0),
    (600.0, 200.0, 150.0, 20.0),
    (300.0, 100.0, 150.0, 20.0),
    (520.0, 590.0, 150.0, 20.0),
    (250.0, 740.0, 300.0, 20.0),
    (20.0, -100.0, 150.0, 20.0),
];

/// Owns the live platforms
#[derive(Debug, Clone)]
pub struct PlatformField {
    platforms: Vec<Platform>,
    rng: Pcg32,
}

impl PlatformField {
    /// Empty field
    pub fn new(seed: u64) -> Self {
        Self {
            platforms: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Field holding the six starting platforms
    pub fn with_seed_platforms(seed: u64) -> Self {
        let mut field = Self::new(seed);
        field.platforms = SEED_PLATFORMS
            .iter()
            .map(|&(x, y, w, h)| Platform::new(x, y, w, h))
            .collect();
        field
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn push(&mut self, platform: Platform) {
        self.platforms.push(platform);
    }

    pub fn clear(&mut self) {
        self.platforms.clear();
    }

    /// Shift every platform down by `scroll_speed`
    pub fn advance(&mut self, scroll_speed: f32) {
        for platform in &mut self.platforms {
            platform.rect.pos.y += scroll_speed;
        }
    }

    /// Drop platforms whose top has passed the bottom of the screen.
    /// Returns how many were removed.
    pub fn prune(&mut self, screen_height: f32) -> usize {
        let before = self.platforms.len();
        self.platforms.retain(|p| p.rect.top() < screen_height);
        before - self.platforms.len()
    }

    /// Top edge of the highest platform
    pub fn topmost_top(&self) -> Option<f32> {
        self.platforms.iter().map(|p| p.rect.top()).reduce(f32::min)
    }

    /// Spawn a new row `platform_gap` above the topmost platform once that one
    /// has scrolled below `replenish_threshold`. An empty field always spawns.
    /// Returns how many platforms were added.
    pub fn replenish(&mut self, config: &GameConfig) -> usize {
        let topmost = match self.topmost_top() {
            Some(top) if top > config.replenish_threshold => top,
            Some(_) => return 0,
            None => config.replenish_threshold,
        };

        let new_y = topmost - config.platform_gap;
        let (min_count, max_count) = config.platforms_per_row;
        let count = self.rng.random_range(min_count..=max_count.max(min_count));

        let left = config.spawn_margin_left.round() as i32;
        let right = ((config.screen_width - config.spawn_margin_right).round() as i32).max(left);

        for _ in 0..count {
            let x = self.rng.random_range(left..=right) as f32;
            self.platforms.push(Platform::new(
                x,
                new_y,
                config.platform_width,
                config.platform_height,
            ));
        }

        log::debug!("Spawned {} platforms at y={}", count, new_y);
        count as usize
    }
}
