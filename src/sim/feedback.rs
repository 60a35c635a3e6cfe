//! Short-lived hit/miss markers

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::target::TargetKind;
use crate::consts::{ARMOR_HIT_DISPLAY_POINTS, HIT_FEEDBACK_LIFE, MISS_FEEDBACK_LIFE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackKind {
    /// Target destroyed
    Hit { points: u32, target: TargetKind },
    /// Armor absorbed a hit (value is display-only)
    ArmorHit { points: u32 },
    Miss,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub pos: Vec2,
    pub kind: FeedbackKind,
    /// Frames remaining
    pub life: u32,
    /// Starting lifetime, for alpha fade
    pub start_life: u32,
}

impl FeedbackEvent {
    pub fn hit(pos: Vec2, points: u32, target: TargetKind) -> Self {
        Self::with_life(pos, FeedbackKind::Hit { points, target }, HIT_FEEDBACK_LIFE)
    }

    pub fn armor_hit(pos: Vec2) -> Self {
        Self::with_life(
            pos,
            FeedbackKind::ArmorHit {
                points: ARMOR_HIT_DISPLAY_POINTS,
            },
            HIT_FEEDBACK_LIFE,
        )
    }

    pub fn miss(pos: Vec2) -> Self {
        Self::with_life(pos, FeedbackKind::Miss, MISS_FEEDBACK_LIFE)
    }

    fn with_life(pos: Vec2, kind: FeedbackKind, life: u32) -> Self {
        Self {
            pos,
            kind,
            life,
            start_life: life,
        }
    }

    /// Opacity in `[0, 1]`, fading linearly with remaining life
    pub fn alpha(&self) -> f32 {
        if self.start_life == 0 {
            return 0.0;
        }
        self.life as f32 / self.start_life as f32
    }

    /// Frames elapsed since creation (text labels rise by this much)
    pub fn age(&self) -> u32 {
        self.start_life - self.life
    }
}

/// Count every event down by one frame and drop the expired ones
pub fn decay(events: &mut Vec<FeedbackEvent>) {
    for event in events.iter_mut() {
        event.life = event.life.saturating_sub(1);
    }
    events.retain(|e| e.life > 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetimes() {
        assert_eq!(FeedbackEvent::miss(Vec2::ZERO).life, 40);
        assert_eq!(FeedbackEvent::hit(Vec2::ZERO, 10, TargetKind::Normal).life, 60);
        let armor = FeedbackEvent::armor_hit(Vec2::ZERO);
        assert_eq!(armor.kind, FeedbackKind::ArmorHit { points: 5 });
    }

    #[test]
    fn test_decay_removes_at_zero() {
        let mut events = vec![FeedbackEvent::miss(Vec2::ZERO)];
        for _ in 0..39 {
            decay(&mut events);
        }
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].life, 1);
        decay(&mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_alpha_fades() {
        let mut event = FeedbackEvent::hit(Vec2::ZERO, 50, TargetKind::Golden);
        assert_eq!(event.alpha(), 1.0);
        event.life = 30;
        assert!((event.alpha() - 0.5).abs() < 1e-6);
        assert_eq!(event.age(), 30);
    }
}
