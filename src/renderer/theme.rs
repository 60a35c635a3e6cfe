//! Per-round palettes
//!
//! The theme is a pure function of the round of record. Anything outside
//! 1..=3 reads as daytime.

use super::frame::{Color, Stop};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    Day,
    Sunset,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CelestialKind {
    Sun,
    Moon,
}

/// Sun or moon, positioned as fractions of the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Celestial {
    pub kind: CelestialKind,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub kind: ThemeKind,
    /// Vertical sky gradient, top to bottom
    pub sky: &'static [Stop],
    pub celestial: Celestial,
    pub cloud: Color,
    /// Multiplier on each cloud's own opacity
    pub cloud_opacity: f32,
    pub hills: Color,
    /// Water gradient top to bottom
    pub water: [Color; 4],
    pub stars: bool,
}

/// Star positions as fractions of the surface
pub const STARS: [(f32, f32); 9] = [
    (0.1, 0.1),
    (0.3, 0.15),
    (0.5, 0.08),
    (0.7, 0.12),
    (0.9, 0.18),
    (0.15, 0.25),
    (0.4, 0.3),
    (0.6, 0.22),
    (0.85, 0.35),
];

const DAY_SKY: [Stop; 2] = [(0.0, Color::hex(0x87CEEB)), (1.0, Color::hex(0xB0E0E6))];

const SUNSET_SKY: [Stop; 4] = [
    (0.0, Color::hex(0xFF6B6B)),
    (0.3, Color::hex(0xFF8E53)),
    (0.7, Color::hex(0xFF6B9D)),
    (1.0, Color::hex(0xC44569)),
];

const NIGHT_SKY: [Stop; 3] = [
    (0.0, Color::hex(0x0F0F23)),
    (0.5, Color::hex(0x1A1A2E)),
    (1.0, Color::hex(0x16213E)),
];

pub fn theme_for_round(round: u32) -> Theme {
    match round {
        2 => Theme {
            kind: ThemeKind::Sunset,
            sky: &SUNSET_SKY,
            celestial: Celestial {
                kind: CelestialKind::Sun,
                x: 0.2,
                y: 0.4,
                radius: 40.0,
                color: Color::hex(0xFF4500),
            },
            cloud: Color::hex(0xFFB347),
            cloud_opacity: 0.8,
            hills: Color::hex(0x8B4513),
            water: [
                Color::hex(0xFF6B6B),
                Color::hex(0xFF8E53),
                Color::hex(0xC44569),
                Color::hex(0x8B2635),
            ],
            stars: false,
        },
        3 => Theme {
            kind: ThemeKind::Night,
            sky: &NIGHT_SKY,
            celestial: Celestial {
                kind: CelestialKind::Moon,
                x: 0.8,
                y: 0.2,
                radius: 35.0,
                color: Color::hex(0xF5F5DC),
            },
            cloud: Color::hex(0x2C2C54),
            cloud_opacity: 0.6,
            hills: Color::hex(0x191919),
            water: [
                Color::hex(0x2C3E50),
                Color::hex(0x1B2631),
                Color::hex(0x0F1419),
                Color::hex(0x000000),
            ],
            stars: true,
        },
        _ => Theme {
            kind: ThemeKind::Day,
            sky: &DAY_SKY,
            celestial: Celestial {
                kind: CelestialKind::Sun,
                x: 0.85,
                y: 0.15,
                radius: 30.0,
                color: Color::hex(0xFFE55C),
            },
            cloud: Color::hex(0xFFFFFF),
            cloud_opacity: 1.0,
            hills: Color::hex(0x228B22),
            water: [
                Color::hex(0x4682B4),
                Color::hex(0x36648B),
                Color::hex(0x2F4F4F),
                Color::hex(0x1C3333),
            ],
            stars: false,
        },
    }
}
