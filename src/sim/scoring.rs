//! Score, streak and miss accounting

use serde::{Deserialize, Serialize};

use super::collision::HitOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTracker {
    pub score: u64,
    /// Consecutive destructions without a miss
    pub streak: u32,
    pub max_streak: u32,
    pub misses: u32,
    /// Targets destroyed this session
    pub hits: u32,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a click outcome into the totals. Armor hits change nothing:
    /// only full destruction pays out.
    pub fn record(&mut self, outcome: &HitOutcome) {
        match *outcome {
            HitOutcome::Destroyed { points, .. } => {
                self.score += u64::from(points);
                self.hits += 1;
                self.streak += 1;
                self.max_streak = self.max_streak.max(self.streak);
            }
            HitOutcome::ArmorHit { .. } => {}
            HitOutcome::Miss => {
                self.misses += 1;
                self.streak = 0;
            }
        }
    }

    pub fn reset_streak(&mut self) {
        self.streak = 0;
    }

    /// Fraction of shots that destroyed a target (armor hits excluded)
    pub fn accuracy(&self) -> Option<f32> {
        let shots = self.hits + self.misses;
        (shots > 0).then(|| self.hits as f32 / shots as f32)
    }
}
