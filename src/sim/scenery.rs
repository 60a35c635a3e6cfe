//! Ambient background decoration
//!
//! Clouds drift right regardless of what happens in the round and wrap to
//! the left edge instead of despawning.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use super::state::Viewport;
use crate::consts::CLOUD_COUNT;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: Vec2,
    pub size: f32,
    /// Pixels per frame
    pub speed: f32,
    pub opacity: f32,
}

impl Cloud {
    /// Drift and wrap around the right edge
    pub fn drift(&mut self, viewport: Viewport, frame_scale: f32) {
        self.pos.x += self.speed * frame_scale;
        if self.pos.x > viewport.width + self.size {
            self.pos.x = -self.size;
        }
    }
}

/// Scatter a fresh set of clouds across the upper sky
pub fn generate_clouds(viewport: Viewport, rng: &mut dyn RandomSource) -> Vec<Cloud> {
    (0..CLOUD_COUNT)
        .map(|_| {
            let x = rng.next_unit() * viewport.width;
            let y = 50.0 + rng.next_unit() * 100.0;
            Cloud {
                pos: Vec2::new(x, y),
                size: 40.0 + rng.next_unit() * 60.0,
                speed: 0.2 + rng.next_unit() * 0.3,
                opacity: 0.3 + rng.next_unit() * 0.4,
            }
        })
        .collect()
}
