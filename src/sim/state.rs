//! Game state and core simulation types
//!
//! One `GameState` per engine instance. The round index inside
//! `RoundContext` is the only record of the current round; spawner, physics,
//! scoring and the renderer all read it from here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{HitOutcome, resolve_click};
use super::difficulty::{Difficulty, difficulty_for};
use super::feedback::FeedbackEvent;
use super::rng::RandomSource;
use super::scenery::{Cloud, generate_clouds};
use super::scoring::ScoreTracker;
use super::target::Target;
use crate::consts::*;

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle, waiting for the player to start
    Start,
    /// Active round, cadences running
    Playing,
    /// Between-round summary
    RoundEnd,
    /// Session finished, score submitted
    GameEnd,
}

/// Drawing surface dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Clamp to the minimum playable size. Non-finite input becomes the minimum.
    pub fn new(width: f32, height: f32) -> Self {
        let clamp = |v: f32, min: f32| if v.is_finite() { v.max(min) } else { min };
        Self {
            width: clamp(width, MIN_WIDTH),
            height: clamp(height, MIN_HEIGHT),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    pub fn water_line(&self) -> f32 {
        self.height * WATER_LINE
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 500.0)
    }
}

/// Per-round configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundContext {
    /// Round of record, 1..=TOTAL_ROUNDS
    pub index: u32,
    /// Seconds left, decremented by the countdown cadence
    pub time_remaining: u32,
    pub running: bool,
}

impl RoundContext {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            time_remaining: ROUND_TIME_SECS,
            running: false,
        }
    }

    /// Difficulty of the round of record, read fresh from the table
    pub fn difficulty(&self) -> Difficulty {
        difficulty_for(self.index)
    }

    pub fn is_final(&self) -> bool {
        self.index >= TOTAL_ROUNDS
    }
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub round: RoundContext,
    pub scoring: ScoreTracker,
    /// Active targets in spawn order
    pub targets: Vec<Target>,
    pub feedback: Vec<FeedbackEvent>,
    pub clouds: Vec<Cloud>,
    pub viewport: Viewport,
    /// Seconds of animation since round start
    pub anim_time: f32,
    /// Frames since round start
    pub time_ticks: u64,
    next_id: u32,
}

impl GameState {
    pub fn new(viewport: Viewport, rng: &mut dyn RandomSource) -> Self {
        Self {
            phase: GamePhase::Start,
            round: RoundContext::new(1),
            scoring: ScoreTracker::new(),
            targets: Vec::new(),
            feedback: Vec::new(),
            clouds: generate_clouds(viewport, rng),
            viewport,
            anim_time: 0.0,
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Peek at the ID the next spawn will get
    pub fn peek_entity_id(&self) -> u32 {
        self.next_id
    }

    pub fn round_index(&self) -> u32 {
        self.round.index
    }

    /// Set up a fresh round. Transient collections never carry over.
    pub fn begin_round(&mut self, index: u32, rng: &mut dyn RandomSource) {
        self.round = RoundContext::new(index);
        self.round.running = true;
        self.phase = GamePhase::Playing;
        self.clear_transients();
        self.scoring.reset_streak();
        self.anim_time = 0.0;
        self.time_ticks = 0;
        self.clouds = generate_clouds(self.viewport, rng);
    }

    /// Stop the running round and drop everything it owned
    pub fn end_round(&mut self) {
        self.round.running = false;
        self.clear_transients();
        self.scoring.reset_streak();
    }

    /// Back to a pristine Start state (viewport survives)
    pub fn reset_session(&mut self, rng: &mut dyn RandomSource) {
        *self = Self::new(self.viewport, rng);
    }

    /// Apply a pointer click: hit test, score, and feedback
    pub fn apply_click(&mut self, point: Vec2) -> HitOutcome {
        let outcome = resolve_click(point, &mut self.targets);
        self.scoring.record(&outcome);

        let event = match outcome {
            HitOutcome::Destroyed { points, kind, .. } => FeedbackEvent::hit(point, points, kind),
            HitOutcome::ArmorHit { .. } => FeedbackEvent::armor_hit(point),
            HitOutcome::Miss => FeedbackEvent::miss(point),
        };
        self.feedback.push(event);
        outcome
    }

    /// New surface size; size-dependent decoration is regenerated
    pub fn resize(&mut self, viewport: Viewport, rng: &mut dyn RandomSource) {
        self.viewport = viewport;
        self.clouds = generate_clouds(viewport, rng);
    }

    fn clear_transients(&mut self) {
        self.targets.clear();
        self.feedback.clear();
    }
}
