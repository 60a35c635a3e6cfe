//! Simulation module
//!
//! All gameplay logic lives here, free of scheduling and rendering:
//! - Randomness only through `RandomSource`
//! - Targets iterate in spawn order (clicks scan newest first)
//! - One round of record in `RoundContext::index`

pub mod collision;
pub mod difficulty;
pub mod feedback;
pub mod physics;
pub mod rng;
pub mod scenery;
pub mod scoring;
pub mod state;
pub mod target;
pub mod tick;

pub use collision::{HitOutcome, resolve_click};
pub use difficulty::{Difficulty, difficulty_for, points_for_round, spawn_rate};
pub use feedback::{FeedbackEvent, FeedbackKind};
pub use rng::{GameRng, RandomSource, ScriptedRng};
pub use scenery::Cloud;
pub use scoring::ScoreTracker;
pub use state::{GamePhase, GameState, RoundContext, Viewport};
pub use target::{Target, TargetKind, maybe_spawn};
pub use tick::{Countdown, TickReport, countdown, tick};
