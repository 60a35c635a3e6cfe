//! Pointer hit resolution
//!
//! A click affects at most one target: the most recently spawned live target
//! whose hit circle contains the point.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::target::{Target, TargetKind};
use crate::distance;

/// Result of resolving a click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitOutcome {
    /// Target's last hit point removed; points awarded
    Destroyed {
        target_id: u32,
        kind: TargetKind,
        points: u32,
    },
    /// Armored target absorbed the hit and survives
    ArmorHit { target_id: u32, hp_remaining: u8 },
    /// Nothing under the pointer
    Miss,
}

impl HitOutcome {
    pub fn is_miss(&self) -> bool {
        matches!(self, HitOutcome::Miss)
    }
}

/// Index of the target under `point`, scanning newest first
pub fn find_target_at(point: Vec2, targets: &[Target]) -> Option<usize> {
    targets
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, t)| !t.destroyed)
        .find(|(_, t)| distance(point, t.pos) < t.hit_radius())
        .map(|(i, _)| i)
}

/// Apply a click to the target list
pub fn resolve_click(point: Vec2, targets: &mut [Target]) -> HitOutcome {
    let Some(index) = find_target_at(point, targets) else {
        return HitOutcome::Miss;
    };

    let target = &mut targets[index];
    if target.take_hit() {
        HitOutcome::Destroyed {
            target_id: target.id,
            kind: target.kind,
            points: target.points,
        }
    } else {
        HitOutcome::ArmorHit {
            target_id: target.id,
            hp_remaining: target.hp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(id: u32, kind: TargetKind, x: f32, y: f32) -> Target {
        Target::new(id, kind, 3, Vec2::new(x, y), Vec2::X)
    }

    #[test]
    fn test_center_click_destroys() {
        let mut targets = vec![at(1, TargetKind::Normal, 200.0, 200.0)];
        let outcome = resolve_click(Vec2::new(200.0, 200.0), &mut targets);
        assert_eq!(
            outcome,
            HitOutcome::Destroyed {
                target_id: 1,
                kind: TargetKind::Normal,
                points: 20
            }
        );
        assert!(targets[0].destroyed);
    }

    #[test]
    fn test_radius_is_strict() {
        let mut targets = vec![at(1, TargetKind::Normal, 200.0, 200.0)];
        // Exactly on the edge (size 60, radius 30) is a miss
        assert!(resolve_click(Vec2::new(230.0, 200.0), &mut targets).is_miss());
        assert!(!resolve_click(Vec2::new(229.9, 200.0), &mut targets).is_miss());
    }

    #[test]
    fn test_newest_wins_on_overlap() {
        let mut targets = vec![
            at(1, TargetKind::Normal, 200.0, 200.0),
            at(2, TargetKind::Tiny, 205.0, 200.0),
        ];
        let outcome = resolve_click(Vec2::new(203.0, 200.0), &mut targets);
        assert!(matches!(outcome, HitOutcome::Destroyed { target_id: 2, .. }));
        assert!(!targets[0].destroyed);

        // Second click falls through to the older target
        let outcome = resolve_click(Vec2::new(203.0, 200.0), &mut targets);
        assert!(matches!(outcome, HitOutcome::Destroyed { target_id: 1, .. }));
    }

    #[test]
    fn test_armored_needs_two_hits() {
        let mut targets = vec![at(9, TargetKind::Armored, 100.0, 100.0)];
        let p = Vec2::new(100.0, 100.0);
        assert_eq!(
            resolve_click(p, &mut targets),
            HitOutcome::ArmorHit {
                target_id: 9,
                hp_remaining: 1
            }
        );
        assert!(!targets[0].destroyed);
        assert!(matches!(
            resolve_click(p, &mut targets),
            HitOutcome::Destroyed { points: 30, .. }
        ));
        // Destroyed targets are skipped
        assert!(resolve_click(p, &mut targets).is_miss());
    }
}
