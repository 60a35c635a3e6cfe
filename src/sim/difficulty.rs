//! Per-round difficulty curve

use serde::{Deserialize, Serialize};

use crate::consts::BASE_SPAWN_RATE;

/// Difficulty parameters for one round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Base speed in pixels per frame (the clamp is twice this)
    pub speed: f32,
    /// Maximum concurrent targets
    pub max_targets: usize,
    /// Velocity perturbation amplitude applied each frame
    pub erratic: f32,
}

impl Difficulty {
    /// Speed ceiling for any target while this round is the round of record
    pub fn speed_cap(&self) -> f32 {
        self.speed * 2.0
    }
}

const ROUND_ONE: Difficulty = Difficulty {
    speed: 1.5,
    max_targets: 4,
    erratic: 0.05,
};

/// Difficulty for a round. Out-of-range rounds get round 1 settings.
pub fn difficulty_for(round: u32) -> Difficulty {
    match round {
        1 => ROUND_ONE,
        2 => Difficulty {
            speed: 2.5,
            max_targets: 5,
            erratic: 0.15,
        },
        3 => Difficulty {
            speed: 3.5,
            max_targets: 7,
            erratic: 0.25,
        },
        _ => ROUND_ONE,
    }
}

/// Points for destroying a normal target
pub fn points_for_round(round: u32) -> u32 {
    match round {
        2 => 15,
        3 => 20,
        _ => 10,
    }
}

/// Per-frame spawn probability. Round 1 is front-loaded at 3x.
pub fn spawn_rate(round: u32) -> f32 {
    if round == 1 {
        BASE_SPAWN_RATE * 3.0
    } else {
        BASE_SPAWN_RATE * 1.5
    }
}

/// Speed ceiling for any target while this round is the round of record
pub fn speed_cap(round: u32) -> f32 {
    difficulty_for(round).speed_cap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strictly_increasing() {
        let d: Vec<_> = (1..=3).map(difficulty_for).collect();
        for pair in d.windows(2) {
            assert!(pair[1].speed > pair[0].speed);
            assert!(pair[1].max_targets > pair[0].max_targets);
            assert!(pair[1].erratic > pair[0].erratic);
        }
    }

    #[test]
    fn test_points_per_round() {
        assert_eq!(points_for_round(1), 10);
        assert_eq!(points_for_round(2), 15);
        assert_eq!(points_for_round(3), 20);
    }

    #[test]
    fn test_spawn_rate_front_loaded() {
        assert!((spawn_rate(1) - 0.06).abs() < 1e-6);
        assert!((spawn_rate(2) - 0.03).abs() < 1e-6);
        assert_eq!(spawn_rate(2), spawn_rate(3));
    }

    proptest! {
        #[test]
        fn out_of_range_falls_back_to_round_one(round in 4u32..10_000) {
            prop_assert_eq!(difficulty_for(round), difficulty_for(1));
            prop_assert_eq!(points_for_round(round), 10);
        }
    }

    #[test]
    fn test_round_zero_fallback() {
        assert_eq!(difficulty_for(0), difficulty_for(1));
        assert_eq!(speed_cap(0), 3.0);
    }
}
