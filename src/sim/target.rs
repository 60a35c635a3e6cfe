//! Target model and spawner
//!
//! Targets enter from a random screen edge heading inward. Kind selection
//! is an ordered rule table evaluated against a single uniform draw.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::difficulty::{difficulty_for, points_for_round, spawn_rate};
use super::state::RoundContext;
use super::rng::RandomSource;
use super::state::Viewport;
use crate::consts::*;
use crate::heading;

/// Target categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetKind {
    #[default]
    Normal,
    Golden,
    Tiny,
    Armored,
}

impl TargetKind {
    /// Diameter relative to `TARGET_SIZE`
    pub fn size_factor(self) -> f32 {
        match self {
            TargetKind::Normal => 1.0,
            TargetKind::Golden => 0.8,
            TargetKind::Tiny => 0.6,
            TargetKind::Armored => 1.1,
        }
    }

    /// Hits required to destroy
    pub fn max_hp(self) -> u8 {
        match self {
            TargetKind::Armored => 2,
            _ => 1,
        }
    }

    /// Points awarded on destruction in the given round
    pub fn points(self, round: u32) -> u32 {
        match self {
            TargetKind::Normal => points_for_round(round),
            TargetKind::Golden => 50,
            TargetKind::Tiny => 25,
            TargetKind::Armored => 30,
        }
    }
}

/// One row of the kind selection table
#[derive(Debug, Clone, Copy)]
pub struct KindRule {
    pub kind: TargetKind,
    /// Rule matches when the draw is below this value
    pub below: f32,
    /// Restrict the rule to a single round
    pub only_round: Option<u32>,
}

/// Kind selection in precedence order. Thresholds are cumulative against
/// the same draw, so the first matching row wins. Falls through to Normal.
pub const KIND_TABLE: [KindRule; 3] = [
    KindRule {
        kind: TargetKind::Armored,
        below: 0.10,
        only_round: Some(3),
    },
    KindRule {
        kind: TargetKind::Golden,
        below: 0.05,
        only_round: None,
    },
    KindRule {
        kind: TargetKind::Tiny,
        below: 0.15,
        only_round: None,
    },
];

/// Pick a target kind for a draw in `[0, 1)`
pub fn select_kind(round: u32, draw: f32) -> TargetKind {
    KIND_TABLE
        .iter()
        .find(|rule| rule.only_round.is_none_or(|r| r == round) && draw < rule.below)
        .map(|rule| rule.kind)
        .unwrap_or(TargetKind::Normal)
}

/// A moving target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Diameter in pixels (hit radius is half)
    pub size: f32,
    /// Heading for rendering, atan2(vy, vx)
    pub rotation: f32,
    pub kind: TargetKind,
    pub points: u32,
    pub hp: u8,
    pub max_hp: u8,
    pub destroyed: bool,
    /// Erratic coefficient frozen at spawn time
    pub erratic: f32,
    /// Frames left before a destroyed target is removed
    #[serde(default)]
    pub death_ticks: u32,
    /// Frames left on the armor-hit flash
    #[serde(default)]
    pub flash_ticks: u32,
}

impl Target {
    pub fn new(id: u32, kind: TargetKind, round: u32, pos: Vec2, vel: Vec2) -> Self {
        let max_hp = kind.max_hp();
        Self {
            id,
            pos,
            vel,
            size: TARGET_SIZE * kind.size_factor(),
            rotation: heading(vel),
            kind,
            points: kind.points(round),
            hp: max_hp,
            max_hp,
            destroyed: false,
            erratic: difficulty_for(round).erratic,
            death_ticks: 0,
            flash_ticks: 0,
        }
    }

    pub fn hit_radius(&self) -> f32 {
        self.size / 2.0
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_ticks > 0
    }

    /// Apply one hit. Returns true if this hit destroyed the target.
    pub fn take_hit(&mut self) -> bool {
        self.hp = self.hp.saturating_sub(1);
        if self.hp == 0 {
            self.destroyed = true;
            self.death_ticks = DEATH_ANIMATION_TICKS;
            self.flash_ticks = 0;
            true
        } else {
            self.flash_ticks = ARMOR_FLASH_TICKS;
            false
        }
    }

    /// Count down death and flash timers. Returns true when the death
    /// animation has finished and the target should be removed.
    pub fn tick_timers(&mut self) -> bool {
        self.flash_ticks = self.flash_ticks.saturating_sub(1);
        if self.destroyed {
            self.death_ticks = self.death_ticks.saturating_sub(1);
            return self.death_ticks == 0;
        }
        false
    }
}

/// Screen edge a target enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    pub fn random(rng: &mut dyn RandomSource) -> Self {
        Self::ALL[rng.next_index(Self::ALL.len())]
    }
}

/// Entry position and inward velocity for an edge
pub fn entry_for_edge(
    edge: Edge,
    viewport: Viewport,
    speed: f32,
    rng: &mut dyn RandomSource,
) -> (Vec2, Vec2) {
    let (w, h) = (viewport.width, viewport.height);
    match edge {
        Edge::Top => {
            let x = rng.next_unit() * w;
            let vx = rng.next_centered() * speed;
            let vy = rng.next_unit() * speed + 0.5;
            (Vec2::new(x, -SPAWN_OFFSET), Vec2::new(vx, vy))
        }
        Edge::Right => {
            let y = rng.next_unit() * h;
            let vx = -rng.next_unit() * speed - 0.5;
            let vy = rng.next_centered() * speed;
            (Vec2::new(w + SPAWN_OFFSET, y), Vec2::new(vx, vy))
        }
        Edge::Bottom => {
            let x = rng.next_unit() * w;
            let vx = rng.next_centered() * speed;
            let vy = -rng.next_unit() * speed - 0.5;
            (Vec2::new(x, h + SPAWN_OFFSET), Vec2::new(vx, vy))
        }
        Edge::Left => {
            let y = rng.next_unit() * h;
            let vx = rng.next_unit() * speed + 0.5;
            let vy = rng.next_centered() * speed;
            (Vec2::new(-SPAWN_OFFSET, y), Vec2::new(vx, vy))
        }
    }
}

/// Roll for a spawn this frame. The spawn draw is always consumed; a target
/// is only produced when it succeeds and the round's cap has room.
pub fn maybe_spawn(
    id: u32,
    round: &RoundContext,
    active: &[Target],
    viewport: Viewport,
    rng: &mut dyn RandomSource,
) -> Option<Target> {
    let roll = rng.next_unit();
    if roll >= spawn_rate(round.index) || active.len() >= round.difficulty().max_targets {
        return None;
    }
    Some(spawn(id, round.index, viewport, rng))
}

/// Create a target at a random edge
pub fn spawn(id: u32, round: u32, viewport: Viewport, rng: &mut dyn RandomSource) -> Target {
    let difficulty = difficulty_for(round);
    let edge = Edge::random(rng);
    let (pos, mut vel) = entry_for_edge(edge, viewport, difficulty.speed, rng);
    vel.x += rng.next_centered() * SPAWN_JITTER;
    vel.y += rng.next_centered() * SPAWN_JITTER;

    let kind = select_kind(round, rng.next_unit());
    let target = Target::new(id, kind, round, pos, vel);
    log::debug!(
        "Round {}: spawned {:?} #{} from {:?} at ({:.0}, {:.0})",
        round,
        kind,
        id,
        edge,
        pos.x,
        pos.y
    );
    target
}
