//! Per-frame target motion
//!
//! Arcade approximation: velocities are pixels per frame, perturbed by the
//! target's frozen erratic factor and clamped to the round's speed ceiling.

use super::rng::RandomSource;
use super::state::Viewport;
use super::target::Target;
use crate::consts::DESPAWN_MARGIN;
use crate::heading;

/// Advance one target by one frame. `frame_scale` is 1.0 at the nominal
/// 60 Hz cadence. Destroyed targets hold still for their death animation.
pub fn advance(target: &mut Target, rng: &mut dyn RandomSource, speed_cap: f32, frame_scale: f32) {
    if target.destroyed {
        return;
    }

    target.pos += target.vel * frame_scale;

    target.vel.x += rng.next_centered() * target.erratic;
    target.vel.y += rng.next_centered() * target.erratic;

    target.rotation = heading(target.vel);

    clamp_speed(target, speed_cap);
}

/// Rescale velocity to `cap` if it is exceeded, preserving direction
pub fn clamp_speed(target: &mut Target, cap: f32) {
    let speed = target.vel.length();
    if speed > cap && speed > 0.0 {
        target.vel *= cap / speed;
    }
}

/// True once a target is more than `DESPAWN_MARGIN` past any edge
pub fn is_out_of_bounds(target: &Target, viewport: Viewport) -> bool {
    let p = target.pos;
    p.x > viewport.width + DESPAWN_MARGIN
        || p.x < -DESPAWN_MARGIN
        || p.y > viewport.height + DESPAWN_MARGIN
        || p.y < -DESPAWN_MARGIN
}

/// Non-finite state means something upstream went wrong
pub fn is_corrupt(target: &Target) -> bool {
    !(target.pos.is_finite() && target.vel.is_finite())
}
