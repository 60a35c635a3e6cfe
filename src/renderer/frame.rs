//! Backend-neutral draw commands
//!
//! A `Frame` is an ordered list of filled shapes, strokes and text in
//! surface pixels. Later commands paint over earlier ones.

use glam::Vec2;
use serde::Serialize;

/// sRGB color with straight alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::hex(0xFFFFFF);
    pub const BLACK: Color = Color::hex(0x000000);

    /// Opaque color from 0xRRGGBB
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
            a: 1.0,
        }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Scale the existing alpha
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }

    /// CSS color string for Canvas2D
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Color stop at `offset` in 0..=1
pub type Stop = (f32, Color);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Fill {
    Solid(Color),
    Linear { from: Vec2, to: Vec2, stops: Vec<Stop> },
    Radial { center: Vec2, radius: f32, stops: Vec<Stop> },
}

impl From<Color> for Fill {
    fn from(color: Color) -> Self {
        Fill::Solid(color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    Rect {
        origin: Vec2,
        size: Vec2,
        fill: Fill,
    },
    Circle {
        center: Vec2,
        radius: f32,
        fill: Fill,
    },
    /// Circle outline
    Ring {
        center: Vec2,
        radius: f32,
        width: f32,
        color: Color,
    },
    Ellipse {
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        fill: Fill,
    },
    /// Closed filled polygon
    Polygon { points: Vec<Vec2>, fill: Fill },
    /// Open stroked path
    Polyline {
        points: Vec<Vec2>,
        width: f32,
        color: Color,
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        bold: bool,
        align: TextAlign,
        color: Color,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::with_capacity(256),
        }
    }

    pub fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }

    pub fn extend(&mut self, cmds: impl IntoIterator<Item = DrawCommand>) {
        self.commands.extend(cmds);
    }

    pub fn rect(&mut self, origin: Vec2, size: Vec2, fill: impl Into<Fill>) {
        self.push(DrawCommand::Rect {
            origin,
            size,
            fill: fill.into(),
        });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, fill: impl Into<Fill>) {
        self.push(DrawCommand::Circle {
            center,
            radius,
            fill: fill.into(),
        });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, size: f32, color: Color) {
        self.push(DrawCommand::Text {
            pos,
            text: text.into(),
            size,
            bold: true,
            align: TextAlign::Center,
            color,
        });
    }

    /// All text strings, in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}
