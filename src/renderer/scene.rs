//! Scene composition
//!
//! Turns a `GameState` into a `Frame`, back to front: sky, celestial body,
//! stars, clouds, hills, water, targets, feedback, streak banner, phase
//! overlay, debug panel.

use glam::Vec2;

use super::frame::{Color, DrawCommand, Fill, Frame, TextAlign};
use super::shapes;
use super::theme::{Theme, theme_for_round};
use crate::consts::{ROUND_TIME_SECS, TOTAL_ROUNDS};
use crate::settings::Settings;
use crate::sim::{FeedbackEvent, FeedbackKind, GamePhase, GameState, TargetKind};
use crate::submission::SubmissionStatus;

/// Streak length that shows the banner
pub const STREAK_BANNER_MIN: u32 = 3;
/// Streak length that upgrades the banner
pub const STREAK_BANNER_HOT: u32 = 5;

const MISS_COLOR: Color = Color::hex(0xFF0000);
const MISS_HALF: f32 = 15.0;
const MISS_WIDTH: f32 = 4.0;
const FEEDBACK_FONT: f32 = 20.0;
const BANNER_POS: Vec2 = Vec2::new(80.0, 50.0);
const OVERLAY_DIM: Color = Color::rgba(0, 0, 0, 0.6);

/// Everything besides the game state that changes what is drawn
#[derive(Debug, Clone, Copy)]
pub struct SceneInputs<'a> {
    pub settings: &'a Settings,
    pub submission: &'a SubmissionStatus,
}

pub fn compose(state: &GameState, inputs: SceneInputs<'_>) -> Frame {
    let vp = state.viewport;
    let mut frame = Frame::new(vp.width, vp.height);
    let theme = theme_for_round(state.round_index());
    let t = inputs.settings.motion_time(state.anim_time);

    background(&mut frame, state, &theme, t);

    for target in &state.targets {
        frame.extend(shapes::duck(target, t));
    }

    for event in state.feedback.iter().rev() {
        feedback(&mut frame, event);
    }

    if inputs.settings.streak_banner && state.phase == GamePhase::Playing {
        streak_banner(&mut frame, state.scoring.streak, t);
    }

    overlay(&mut frame, state, inputs.submission);

    if inputs.settings.debug_overlay {
        debug_panel(&mut frame, state);
    }

    frame
}

fn background(frame: &mut Frame, state: &GameState, theme: &Theme, t: f32) {
    let vp = state.viewport;
    let water_line = vp.water_line();

    frame.rect(
        Vec2::ZERO,
        Vec2::new(vp.width, water_line),
        Fill::Linear {
            from: Vec2::ZERO,
            to: Vec2::new(0.0, water_line),
            stops: theme.sky.to_vec(),
        },
    );

    let body = theme.celestial;
    frame.circle(
        Vec2::new(vp.width * body.x, vp.height * body.y),
        body.radius,
        body.color,
    );

    if theme.stars {
        frame.extend(shapes::stars(vp, t));
    }

    for cloud in &state.clouds {
        frame.extend(shapes::cloud(cloud, theme.cloud, theme.cloud_opacity));
    }

    frame.push(shapes::hills(vp, theme.hills));
    frame.extend(shapes::water(vp, &theme.water, t));
}

/// Label and color for a scoring feedback event
pub fn feedback_label(kind: &FeedbackKind) -> Option<(String, Color)> {
    let label = match *kind {
        FeedbackKind::Miss => return None,
        FeedbackKind::Hit { points, target } => match target {
            TargetKind::Normal => (format!("+{points}"), Color::hex(0x00FF00)),
            TargetKind::Golden => (format!("+{points} GOLD!"), Color::hex(0xFFD700)),
            TargetKind::Tiny => (format!("+{points} TINY!"), Color::hex(0x87CEEB)),
            TargetKind::Armored => (format!("+{points} ARMOR!"), Color::hex(0x708090)),
        },
        FeedbackKind::ArmorHit { points } => (format!("+{points} HIT!"), Color::hex(0x87CEEB)),
    };
    Some(label)
}

fn feedback(frame: &mut Frame, event: &FeedbackEvent) {
    let alpha = event.alpha();
    match feedback_label(&event.kind) {
        None => frame.extend(shapes::cross(
            event.pos,
            MISS_HALF,
            MISS_WIDTH,
            MISS_COLOR.fade(alpha),
        )),
        Some((text, color)) => {
            // Labels rise one pixel per frame
            let pos = event.pos - Vec2::new(0.0, event.age() as f32);
            frame.text(pos, text, FEEDBACK_FONT, color.fade(alpha));
        }
    }
}

/// Banner text for a streak, if it earns one
pub fn streak_text(streak: u32) -> Option<String> {
    match streak {
        s if s >= STREAK_BANNER_HOT => Some(format!("AMAZING {s} HITS")),
        s if s >= STREAK_BANNER_MIN => Some(format!("GREAT {s} HITS")),
        _ => None,
    }
}

fn streak_banner(frame: &mut Frame, streak: u32, t: f32) {
    let Some(text) = streak_text(streak) else {
        return;
    };
    let pulse = (t * 4.0).sin() * 0.1 + 1.0;
    let size = Vec2::new(90.0, 24.0) * pulse;
    let origin = BANNER_POS - size / 2.0;

    let stops = if streak >= STREAK_BANNER_HOT {
        vec![
            (0.0, Color::rgba(255, 215, 0, 0.9)),
            (1.0, Color::rgba(255, 165, 0, 0.9)),
        ]
    } else {
        vec![
            (0.0, Color::rgba(76, 175, 80, 0.9)),
            (1.0, Color::rgba(56, 142, 60, 0.9)),
        ]
    };
    frame.rect(
        origin,
        size,
        Fill::Linear {
            from: origin,
            to: origin + size,
            stops,
        },
    );

    frame.text(
        BANNER_POS + Vec2::new(1.0, 4.0),
        text.clone(),
        14.0,
        Color::rgba(0, 0, 0, 0.5),
    );
    frame.text(BANNER_POS + Vec2::new(0.0, 3.0), text, 14.0, Color::WHITE);
}

fn overlay(frame: &mut Frame, state: &GameState, submission: &SubmissionStatus) {
    let lines: Vec<(String, f32)> = match state.phase {
        GamePhase::Playing => return,
        GamePhase::Start => vec![
            ("Ready to Hunt?".to_string(), 36.0),
            ("Click the ducks to score points!".to_string(), 18.0),
            (format!("{TOTAL_ROUNDS} rounds \u{2022} {ROUND_TIME_SECS} seconds each"), 18.0),
        ],
        GamePhase::RoundEnd => {
            let round = state.round_index();
            vec![
                (format!("Round {round} Complete!"), 36.0),
                (
                    format!(
                        "Score: {} points. Get ready for round {}!",
                        state.scoring.score,
                        round + 1
                    ),
                    18.0,
                ),
            ]
        }
        GamePhase::GameEnd => {
            let mut lines = vec![
                ("Game Complete!".to_string(), 36.0),
                (format!("Final Score: {}", state.scoring.score), 24.0),
            ];
            match submission {
                SubmissionStatus::NotSubmitted => {}
                SubmissionStatus::Pending { .. } => {
                    lines.push(("Submitting score...".to_string(), 16.0));
                }
                SubmissionStatus::Resolved(outcome) => {
                    lines.push((outcome.message.clone(), 16.0));
                    if outcome.prompt_login {
                        lines.push(("Sign in to save your score".to_string(), 16.0));
                    }
                }
            }
            lines
        }
    };

    frame.rect(
        Vec2::ZERO,
        Vec2::new(frame.width, frame.height),
        OVERLAY_DIM,
    );
    let mut y = frame.height * 0.4;
    let x = frame.width / 2.0;
    for (text, size) in lines {
        frame.text(Vec2::new(x, y), text, size, Color::WHITE);
        y += size * 1.6;
    }
}

/// Diagnostic lines shown in the corner panel
pub fn debug_lines(state: &GameState) -> Vec<String> {
    vec![
        format!("Phase: {:?}", state.phase),
        format!("Round: {}", state.round_index()),
        format!("Ducks: {}", state.targets.len()),
        format!("Anim time: {:.2}", state.anim_time),
        format!("Running: {}", state.round.running),
        format!("Clouds: {}", state.clouds.len()),
        format!("Streak: {}", state.scoring.streak),
    ]
}

fn debug_panel(frame: &mut Frame, state: &GameState) {
    let lines = debug_lines(state);
    let origin = Vec2::new(frame.width - 190.0, 10.0);
    frame.rect(
        origin,
        Vec2::new(180.0, 12.0 + lines.len() as f32 * 16.0),
        Color::rgba(0, 0, 0, 0.7),
    );
    for (i, line) in lines.into_iter().enumerate() {
        frame.push(DrawCommand::Text {
            pos: origin + Vec2::new(8.0, 20.0 + i as f32 * 16.0),
            text: line,
            size: 12.0,
            bold: false,
            align: TextAlign::Left,
            color: Color::hex(0x00FF00),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::GameRng;
    use crate::sim::{Target, Viewport};
    use crate::submission::SubmitOutcome;

    fn playing(round: u32) -> GameState {
        let mut rng = GameRng::new(5);
        let mut state = GameState::new(Viewport::default(), &mut rng);
        state.begin_round(round, &mut rng);
        state
    }

    fn render(state: &GameState, settings: &Settings, submission: &SubmissionStatus) -> Frame {
        compose(
            state,
            SceneInputs {
                settings,
                submission,
            },
        )
    }

    fn render_default(state: &GameState) -> Frame {
        render(state, &Settings::default(), &SubmissionStatus::NotSubmitted)
    }

    fn sky_top(frame: &Frame) -> Color {
        match &frame.commands[0] {
            DrawCommand::Rect {
                fill: Fill::Linear { stops, .. },
                ..
            } => stops[0].1,
            other => panic!("expected sky gradient, got {other:?}"),
        }
    }

    #[test]
    fn test_sky_follows_round() {
        assert_eq!(sky_top(&render_default(&playing(1))), Color::hex(0x87CEEB));
        assert_eq!(sky_top(&render_default(&playing(2))), Color::hex(0xFF6B6B));
        assert_eq!(sky_top(&render_default(&playing(3))), Color::hex(0x0F0F23));
    }

    #[test]
    fn test_feedback_labels() {
        let label = |kind| feedback_label(&kind).map(|(text, _)| text);
        assert_eq!(
            label(FeedbackKind::Hit {
                points: 15,
                target: TargetKind::Golden
            }),
            Some("+15 GOLD!".to_string())
        );
        assert_eq!(
            label(FeedbackKind::Hit {
                points: 10,
                target: TargetKind::Normal
            }),
            Some("+10".to_string())
        );
        assert_eq!(
            label(FeedbackKind::ArmorHit { points: 5 }),
            Some("+5 HIT!".to_string())
        );
        assert_eq!(label(FeedbackKind::Miss), None);
    }

    #[test]
    fn test_hit_label_drawn_at_click() {
        let mut state = playing(1);
        let id = state.next_entity_id();
        let p = Vec2::new(300.0, 200.0);
        state
            .targets
            .push(Target::new(id, TargetKind::Tiny, 1, p, Vec2::X));
        state.apply_click(p);
        let frame = render_default(&state);
        assert!(frame.has_text("TINY!"));
    }

    #[test]
    fn test_streak_banner_thresholds() {
        assert_eq!(streak_text(2), None);
        assert_eq!(streak_text(3), Some("GREAT 3 HITS".to_string()));
        assert_eq!(streak_text(5), Some("AMAZING 5 HITS".to_string()));

        let mut state = playing(1);
        state.scoring.streak = 4;
        assert!(render_default(&state).has_text("GREAT 4 HITS"));

        let off = Settings {
            streak_banner: false,
            ..Settings::default()
        };
        assert!(!render(&state, &off, &SubmissionStatus::NotSubmitted).has_text("HITS"));
    }

    #[test]
    fn test_phase_overlays() {
        let mut rng = GameRng::new(5);
        let mut state = GameState::new(Viewport::default(), &mut rng);
        assert!(render_default(&state).has_text("Ready to Hunt?"));

        state.begin_round(1, &mut rng);
        assert!(!render_default(&state).has_text("Ready to Hunt?"));

        state.end_round();
        state.phase = GamePhase::RoundEnd;
        assert!(render_default(&state).has_text("Round 1 Complete!"));

        state.phase = GamePhase::GameEnd;
        let pending = SubmissionStatus::Pending { score: 0 };
        let frame = render(&state, &Settings::default(), &pending);
        assert!(frame.has_text("Game Complete!"));
        assert!(frame.has_text("Submitting score"));

        let resolved = SubmissionStatus::Resolved(SubmitOutcome {
            success: false,
            message: "Log in to save".into(),
            prompt_login: true,
        });
        let frame = render(&state, &Settings::default(), &resolved);
        assert!(frame.has_text("Log in to save"));
        assert!(frame.has_text("Sign in"));
    }

    #[test]
    fn test_debug_panel_toggle() {
        let state = playing(2);
        assert!(!render_default(&state).has_text("Clouds:"));
        let settings = Settings {
            debug_overlay: true,
            ..Settings::default()
        };
        let frame = render(&state, &settings, &SubmissionStatus::NotSubmitted);
        assert!(frame.has_text("Round: 2"));
        assert!(frame.has_text("Running: true"));
    }
}
