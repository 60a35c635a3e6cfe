//! Frame tick and round countdown
//!
//! `tick` runs on the ~60 Hz frame cadence, `countdown` on the 1 Hz cadence.
//! Both only touch state while a round is running.

use super::feedback;
use super::physics::{advance, is_corrupt, is_out_of_bounds};
use super::rng::RandomSource;
use super::state::{GamePhase, GameState};
use super::target::maybe_spawn;
use crate::consts::TICK_HZ;

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// ID of a target spawned this frame
    pub spawned: Option<u32>,
    /// Targets that left the screen (not misses)
    pub despawned: usize,
    /// Destroyed targets whose death animation finished
    pub removed: usize,
    /// Targets dropped because their state went non-finite
    pub faults: usize,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, rng: &mut dyn RandomSource, dt: f32) -> TickReport {
    let mut report = TickReport::default();
    if state.phase != GamePhase::Playing || !state.round.running {
        return report;
    }

    let frame_scale = dt * TICK_HZ;
    state.anim_time += dt;
    state.time_ticks += 1;

    let viewport = state.viewport;
    for cloud in &mut state.clouds {
        cloud.drift(viewport, frame_scale);
    }

    let next_id = state.peek_entity_id();
    if let Some(target) = maybe_spawn(next_id, &state.round, &state.targets, viewport, rng) {
        state.next_entity_id();
        report.spawned = Some(target.id);
        state.targets.push(target);
    }

    // Speed ceiling follows the round of record, erratic factor is per target
    let cap = state.round.difficulty().speed_cap();
    state.targets.retain_mut(|target| {
        advance(target, &mut *rng, cap, frame_scale);
        if is_corrupt(target) {
            log::warn!("Dropping target #{} with non-finite state", target.id);
            report.faults += 1;
            return false;
        }
        if is_out_of_bounds(target, viewport) {
            log::trace!("Target #{} left the screen", target.id);
            report.despawned += 1;
            return false;
        }
        if target.tick_timers() {
            report.removed += 1;
            return false;
        }
        true
    });

    feedback::decay(&mut state.feedback);

    report
}

/// Result of one countdown step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Running { remaining: u32 },
    Expired,
    /// No round running; nothing changed
    Idle,
}

/// Decrement the round clock by one second
pub fn countdown(state: &mut GameState) -> Countdown {
    if state.phase != GamePhase::Playing || !state.round.running {
        return Countdown::Idle;
    }
    state.round.time_remaining = state.round.time_remaining.saturating_sub(1);
    match state.round.time_remaining {
        0 => Countdown::Expired,
        remaining => Countdown::Running { remaining },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::rng::{GameRng, ScriptedRng};
    use crate::sim::state::Viewport;
    use crate::sim::target::{Target, TargetKind};
    use glam::Vec2;

    fn playing(round: u32) -> (GameState, GameRng) {
        let mut rng = GameRng::new(12345);
        let mut state = GameState::new(Viewport::default(), &mut rng);
        state.begin_round(round, &mut rng);
        (state, rng)
    }

    #[test]
    fn test_tick_idle_outside_playing() {
        let mut rng = GameRng::new(1);
        let mut state = GameState::new(Viewport::default(), &mut rng);
        let report = tick(&mut state, &mut rng, FRAME_DT);
        assert_eq!(report, TickReport::default());
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_tick_spawns_up_to_cap() {
        let (mut state, _) = playing(1);
        // Zero draws: every spawn roll succeeds
        let mut rng = ScriptedRng::constant(0.0);
        for _ in 0..20 {
            tick(&mut state, &mut rng, FRAME_DT);
        }
        assert_eq!(state.targets.len(), difficulty_cap(1));
    }

    fn difficulty_cap(round: u32) -> usize {
        crate::sim::difficulty::difficulty_for(round).max_targets
    }

    #[test]
    fn test_offscreen_despawn_is_not_a_miss() {
        let (mut state, mut rng) = playing(1);
        let id = state.next_entity_id();
        let mut target = Target::new(id, TargetKind::Normal, 1, Vec2::new(-99.0, 200.0), Vec2::ZERO);
        target.vel = Vec2::new(-2.0, 0.0);
        target.erratic = 0.0;
        state.targets.push(target);
        state.scoring.streak = 2;

        let mut despawned = 0;
        for _ in 0..3 {
            despawned += tick(&mut state, &mut rng, FRAME_DT).despawned;
        }
        assert_eq!(despawned, 1);
        assert!(state.targets.iter().all(|t| t.id != id));
        assert_eq!(state.scoring.misses, 0);
        assert_eq!(state.scoring.streak, 2);
    }

    #[test]
    fn test_destroyed_target_removed_after_death_window() {
        let (mut state, _) = playing(1);
        let mut rng = ScriptedRng::constant(0.99);
        let id = state.next_entity_id();
        state.targets.push(Target::new(id, TargetKind::Normal, 1, Vec2::new(200.0, 200.0), Vec2::ZERO));
        state.apply_click(Vec2::new(200.0, 200.0));

        for _ in 0..DEATH_ANIMATION_TICKS - 1 {
            tick(&mut state, &mut rng, FRAME_DT);
        }
        assert_eq!(state.targets.len(), 1);
        let report = tick(&mut state, &mut rng, FRAME_DT);
        assert_eq!(report.removed, 1);
        assert!(state.targets.is_empty());
    }

    #[test]
    fn test_corrupt_target_dropped() {
        let (mut state, mut rng) = playing(2);
        let id = state.next_entity_id();
        state.targets.push(Target::new(id, TargetKind::Normal, 2, Vec2::new(f32::NAN, 0.0), Vec2::ZERO));
        let report = tick(&mut state, &mut rng, FRAME_DT);
        assert_eq!(report.faults, 1);
        assert!(state.targets.iter().all(|t| t.id != id));
    }

    #[test]
    fn test_feedback_decays_each_tick() {
        let (mut state, _) = playing(1);
        let mut rng = ScriptedRng::constant(0.99);
        state.apply_click(Vec2::new(1.0, 1.0));
        for _ in 0..MISS_FEEDBACK_LIFE {
            tick(&mut state, &mut rng, FRAME_DT);
        }
        assert!(state.feedback.is_empty());
    }

    #[test]
    fn test_erratic_not_rewritten_by_round_change() {
        let (mut state, _) = playing(1);
        let mut rng = ScriptedRng::constant(0.99);
        let id = state.next_entity_id();
        state.targets.push(Target::new(id, TargetKind::Normal, 1, Vec2::new(300.0, 300.0), Vec2::ZERO));
        // Round of record changes under an in-flight target
        state.round.index = 3;
        tick(&mut state, &mut rng, FRAME_DT);
        assert_eq!(state.targets[0].erratic, 0.05);
    }

    #[test]
    fn test_countdown_expiry() {
        let (mut state, _) = playing(1);
        state.round.time_remaining = 2;
        assert_eq!(countdown(&mut state), Countdown::Running { remaining: 1 });
        assert_eq!(countdown(&mut state), Countdown::Expired);
        state.end_round();
        assert_eq!(countdown(&mut state), Countdown::Idle);
    }

    #[test]
    fn test_determinism() {
        let (mut a, mut rng_a) = playing(3);
        let (mut b, mut rng_b) = playing(3);
        for _ in 0..600 {
            tick(&mut a, &mut rng_a, FRAME_DT);
            tick(&mut b, &mut rng_b, FRAME_DT);
        }
        assert_eq!(a.targets.len(), b.targets.len());
        for (ta, tb) in a.targets.iter().zip(&b.targets) {
            assert_eq!(ta.id, tb.id);
            assert_eq!(ta.pos, tb.pos);
        }
    }
}
