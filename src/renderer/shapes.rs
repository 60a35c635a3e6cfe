//! Shape generation for scene primitives
//!
//! Targets are drawn in a local frame centred on the target and rotated by its
//! heading; `Local` maps those offsets to surface pixels.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use super::frame::{Color, DrawCommand, Fill};
use super::theme::STARS;
use crate::sim::{Cloud, Target, TargetKind, Viewport};

/// Hill silhouette sits on this fraction of the surface height
const HILL_LINE: f32 = 0.55;
const RIPPLE_COUNT: usize = 6;

const EYE: Color = Color::hex(0x000000);
const ARMOR_TINT: Color = Color::rgba(255, 0, 0, 0.3);
const PIP_ACTIVE: (Color, Color) = (Color::hex(0x87CEEB), Color::hex(0x4682B4));
const PIP_SPENT: (Color, Color) = (Color::hex(0x696969), Color::hex(0x2F4F4F));
const PIP_SIZE: f32 = 3.0;
const PIP_SPACING: f32 = 8.0;

/// Target-local coordinate frame
#[derive(Debug, Clone, Copy)]
struct Local {
    origin: Vec2,
    rot: Vec2,
}

impl Local {
    fn new(origin: Vec2, rotation: f32) -> Self {
        Self {
            origin,
            rot: Vec2::from_angle(rotation),
        }
    }

    fn at(&self, x: f32, y: f32) -> Vec2 {
        self.origin + self.rot.rotate(Vec2::new(x, y))
    }

    fn angle(&self) -> f32 {
        self.rot.to_angle()
    }
}

/// Body and beak colors per kind
pub fn duck_palette(kind: TargetKind) -> (Color, Color) {
    match kind {
        TargetKind::Normal | TargetKind::Golden => (Color::hex(0xFFD700), Color::hex(0xFF8C00)),
        TargetKind::Tiny => (Color::hex(0x87CEEB), Color::hex(0x4682B4)),
        TargetKind::Armored => (Color::hex(0x708090), Color::hex(0x2F4F4F)),
    }
}

/// Full target: glow or shield, tint, body and armor pips
///
/// `t` is the decorative animation clock (frozen under reduced motion).
pub fn duck(target: &Target, t: f32) -> Vec<DrawCommand> {
    let frame = Local::new(target.pos, target.rotation);
    let s = target.size;
    let mut alpha = 1.0;
    if target.destroyed {
        alpha = 0.5;
    }
    let mut cmds = Vec::with_capacity(16);

    if target.is_flashing() {
        alpha = 0.7;
        let h = s / 2.0;
        cmds.push(DrawCommand::Polygon {
            points: vec![
                frame.at(-h, -h),
                frame.at(h, -h),
                frame.at(h, h),
                frame.at(-h, h),
            ],
            fill: Fill::Solid(ARMOR_TINT.fade(alpha)),
        });
    }

    match target.kind {
        TargetKind::Golden => golden_radiance(&mut cmds, target.pos, s, t, alpha),
        TargetKind::Armored => armored_shield(&mut cmds, target.pos, s, t, alpha),
        _ => {}
    }

    let (body, beak) = duck_palette(target.kind);
    let ellipse = |x: f32, y: f32, rx: f32, ry: f32, color: Color| DrawCommand::Ellipse {
        center: frame.at(x, y),
        radii: Vec2::new(rx, ry),
        rotation: frame.angle(),
        fill: Fill::Solid(color.fade(alpha)),
    };
    cmds.push(ellipse(0.0, 0.0, s * 0.3, s * 0.2, body));
    cmds.push(ellipse(s * 0.15, -s * 0.1, s * 0.15, s * 0.15, body));
    cmds.push(ellipse(s * 0.25, -s * 0.1, s * 0.08, s * 0.05, beak));
    cmds.push(ellipse(s * 0.18, -s * 0.15, s * 0.03, s * 0.03, EYE));

    let hits_taken = target.max_hp.saturating_sub(target.hp);
    if target.kind == TargetKind::Armored && hits_taken > 0 {
        armor_pips(&mut cmds, &frame, target, hits_taken, alpha);
    }

    cmds
}

fn golden_radiance(cmds: &mut Vec<DrawCommand>, center: Vec2, size: f32, t: f32, alpha: f32) {
    let pulse = (t * 6.0).sin() * 0.3 + 0.7;
    let glow = size * 0.6 * pulse;

    for i in (1..=3).rev() {
        let radius = glow * i as f32 * 0.4;
        let a = (0.15 / i as f32) * pulse * alpha;
        cmds.push(DrawCommand::Circle {
            center,
            radius,
            fill: Fill::Radial {
                center,
                radius,
                stops: vec![
                    (0.0, Color::rgba(255, 215, 0, a)),
                    (0.5, Color::rgba(255, 165, 0, a * 0.6)),
                    (1.0, Color::rgba(255, 215, 0, 0.0)),
                ],
            },
        });
    }

    for i in 0..6 {
        let angle = (t * 2.0 + i as f32 * PI / 3.0) % TAU;
        let sparkle = (t * 4.0 + i as f32).sin() * 0.5 + 0.5;
        cmds.push(DrawCommand::Circle {
            center: center + Vec2::from_angle(angle) * size * 0.5,
            radius: 2.0,
            fill: Fill::Solid(Color::WHITE.with_alpha(sparkle * alpha)),
        });
    }
}

fn armored_shield(cmds: &mut Vec<DrawCommand>, center: Vec2, size: f32, t: f32, alpha: f32) {
    let pulse = (t * 4.0).sin() * 0.2 + 0.8;
    let radius = size * 0.6 * pulse;

    cmds.push(DrawCommand::Circle {
        center,
        radius,
        fill: Fill::Radial {
            center,
            radius,
            stops: vec![
                (0.0, Color::rgba(135, 206, 250, 0.1 * alpha)),
                (0.7, Color::rgba(70, 130, 180, 0.3 * alpha)),
                (1.0, Color::rgba(70, 130, 180, 0.0)),
            ],
        },
    });
    cmds.push(DrawCommand::Ring {
        center,
        radius: size * 0.5,
        width: 2.0,
        color: Color::rgba(135, 206, 250, 0.5 * pulse * alpha),
    });
}

fn armor_pips(cmds: &mut Vec<DrawCommand>, frame: &Local, target: &Target, hits: u8, alpha: f32) {
    let total_width = f32::from(target.max_hp.saturating_sub(1)) * PIP_SPACING;
    let start = -total_width / 2.0;
    let y = -target.size * 0.4;

    for i in 0..target.max_hp {
        let (fill, stroke) = if i < hits { PIP_ACTIVE } else { PIP_SPENT };
        let center = frame.at(start + f32::from(i) * PIP_SPACING, y);
        cmds.push(DrawCommand::Circle {
            center,
            radius: PIP_SIZE,
            fill: Fill::Solid(fill.fade(alpha)),
        });
        cmds.push(DrawCommand::Ring {
            center,
            radius: PIP_SIZE,
            width: 1.0,
            color: stroke.fade(alpha),
        });
    }
}

/// Four overlapping puffs
pub fn cloud(cloud: &Cloud, color: Color, opacity: f32) -> Vec<DrawCommand> {
    let c = color.with_alpha(cloud.opacity * opacity);
    let s = cloud.size;
    [
        (Vec2::ZERO, 0.5),
        (Vec2::new(s * 0.3, 0.0), 0.4),
        (Vec2::new(-s * 0.3, 0.0), 0.4),
        (Vec2::new(0.0, -s * 0.2), 0.3),
    ]
    .into_iter()
    .map(|(offset, r)| DrawCommand::Circle {
        center: cloud.pos + offset,
        radius: s * r,
        fill: Fill::Solid(c),
    })
    .collect()
}

/// Twinkling four-point stars
pub fn stars(viewport: Viewport, t: f32) -> Vec<DrawCommand> {
    STARS
        .iter()
        .enumerate()
        .map(|(i, &(fx, fy))| {
            let c = Vec2::new(fx * viewport.width, fy * viewport.height);
            let twinkle = (t * 3.0 + i as f32).sin() * 0.3 + 0.7;
            let points = [
                (0.0, -3.0),
                (1.0, -1.0),
                (3.0, 0.0),
                (1.0, 1.0),
                (0.0, 3.0),
                (-1.0, 1.0),
                (-3.0, 0.0),
                (-1.0, -1.0),
            ]
            .into_iter()
            .map(|(x, y)| c + Vec2::new(x, y))
            .collect();
            DrawCommand::Polygon {
                points,
                fill: Fill::Solid(Color::WHITE.with_alpha(twinkle)),
            }
        })
        .collect()
}

/// Rolling hill band down to the water line
pub fn hills(viewport: Viewport, color: Color) -> DrawCommand {
    let base = viewport.height * HILL_LINE;
    let mut points = vec![Vec2::new(0.0, base)];
    let mut x = 0.0;
    while x <= viewport.width {
        points.push(Vec2::new(x, base + (x * 0.01).sin() * 20.0));
        x += 50.0;
    }
    points.push(Vec2::new(viewport.width, viewport.water_line()));
    points.push(Vec2::new(0.0, viewport.water_line()));
    DrawCommand::Polygon {
        points,
        fill: Fill::Solid(color),
    }
}

/// Water body plus animated ripple lines
pub fn water(viewport: Viewport, colors: &[Color; 4], t: f32) -> Vec<DrawCommand> {
    let top = viewport.water_line();
    let mut cmds = vec![DrawCommand::Rect {
        origin: Vec2::new(0.0, top),
        size: Vec2::new(viewport.width, viewport.height - top),
        fill: Fill::Linear {
            from: Vec2::new(0.0, top),
            to: Vec2::new(0.0, viewport.height),
            stops: vec![
                (0.0, colors[0]),
                (0.3, colors[1]),
                (0.7, colors[2]),
                (1.0, colors[3]),
            ],
        },
    }];

    for i in 0..RIPPLE_COUNT {
        let fi = i as f32;
        let y = top + 20.0 + fi * 25.0;
        let wave = 3.0 + fi;
        let mut points = Vec::new();
        let mut x = 0.0;
        while x < viewport.width {
            points.push(Vec2::new(x, y + (x * 0.02 + t * 2.0 + fi * 0.5).sin() * wave));
            x += 10.0;
        }
        cmds.push(DrawCommand::Polyline {
            points,
            width: 1.0 + fi * 0.5,
            color: Color::WHITE.with_alpha(0.2 - fi * 0.02),
        });
    }
    cmds
}

/// X marker centred on `center`
pub fn cross(center: Vec2, half: f32, width: f32, color: Color) -> [DrawCommand; 2] {
    [
        DrawCommand::Polyline {
            points: vec![center - Vec2::splat(half), center + Vec2::splat(half)],
            width,
            color,
        },
        DrawCommand::Polyline {
            points: vec![center + Vec2::new(half, -half), center + Vec2::new(-half, half)],
            width,
            color,
        },
    ]
}
