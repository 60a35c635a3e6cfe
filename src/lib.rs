//! Duckshot - A round-based arcade duck shooting game
//!
//! Core modules:
//! - `sim`: Simulation (targets, physics, hit resolution, scoring)
//! - `engine`: Round/session state machine and cadence lifecycle
//! - `scheduler`: Frame and countdown cadence abstraction
//! - `renderer`: Scene composition into a host drawing surface
//! - `submission`: Score submission and login collaborators
//! - `platform`: Browser host (wasm32 only)

pub mod audio;
pub mod engine;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod scheduler;
pub mod settings;
pub mod sim;
pub mod submission;

pub use engine::{Engine, EngineConfig, Hud};
pub use error::EngineError;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Number of rounds in a session
    pub const TOTAL_ROUNDS: u32 = 3;
    /// Round length in seconds
    pub const ROUND_TIME_SECS: u32 = 30;

    /// Frame cadence (60 Hz)
    pub const TICK_HZ: f32 = 60.0;
    /// Animation time advanced per frame
    pub const FRAME_DT: f32 = 1.0 / TICK_HZ;
    pub const FRAME_PERIOD: Duration = Duration::from_micros(16_667);
    pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

    /// Base target diameter in pixels
    pub const TARGET_SIZE: f32 = 60.0;
    /// Per-frame spawn probability before the round multiplier
    pub const BASE_SPAWN_RATE: f32 = 0.02;
    /// Targets spawn this far outside the chosen edge
    pub const SPAWN_OFFSET: f32 = 50.0;
    /// Targets past this margin beyond any edge are despawned
    pub const DESPAWN_MARGIN: f32 = 100.0;
    /// Random jitter added to each spawn velocity axis (total span)
    pub const SPAWN_JITTER: f32 = 0.5;

    /// Frames a destroyed target stays on screen (0.5s)
    pub const DEATH_ANIMATION_TICKS: u32 = 30;
    /// Frames an armored target flashes after a non-lethal hit (200ms)
    pub const ARMOR_FLASH_TICKS: u32 = 12;
    /// Display-only value shown on an armor hit
    pub const ARMOR_HIT_DISPLAY_POINTS: u32 = 5;

    /// Feedback lifetimes in frames
    pub const HIT_FEEDBACK_LIFE: u32 = 60;
    pub const MISS_FEEDBACK_LIFE: u32 = 40;

    /// Smallest playable surface
    pub const MIN_WIDTH: f32 = 320.0;
    pub const MIN_HEIGHT: f32 = 300.0;

    /// Background decoration
    pub const CLOUD_COUNT: usize = 4;
    /// Water line as a fraction of surface height
    pub const WATER_LINE: f32 = 0.65;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Heading of a velocity vector in radians (atan2(vy, vx))
#[inline]
pub fn heading(vel: Vec2) -> f32 {
    vel.y.atan2(vel.x)
}
