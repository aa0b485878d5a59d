//! 2D rendering module
//!
//! Engines draw through the `Painter` trait in logical (CSS) pixels. On the web
//! the painter wraps a `CanvasRenderingContext2d`; natively and in tests a
//! `DrawList` records the commands instead.

pub mod color;
pub mod draw_list;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use color::Color;
pub use draw_list::{DrawCmd, DrawList};
pub use shapes::RoundedRect;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;

use glam::DVec2;

/// Font family used for all canvas text
pub const FONT_FAMILY: &str = "Inter, sans-serif";

/// A canvas font (weight + pixel size, fixed family)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub weight: u16,
    pub size_px: f64,
}

impl Font {
    pub const fn new(weight: u16, size_px: f64) -> Self {
        Self { weight, size_px }
    }

    /// CSS font shorthand, e.g. `900 32px Inter, sans-serif`
    pub fn css(&self) -> String {
        format!("{} {}px {}", self.weight, self.size_px, FONT_FAMILY)
    }
}

/// Horizontal text anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Start => "start",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// Immediate-mode 2D drawing surface.
///
/// Every call is self-contained (carries its own color), so painters never
/// leak style state between engines.
pub trait Painter {
    /// Clear the logical rectangle `[0, width] x [0, height]`
    fn clear(&mut self, width: f64, height: f64);

    /// Glow applied to subsequent fills and strokes; `blur == 0` disables it
    fn set_shadow(&mut self, blur: f64, color: Color);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color);

    fn fill_rounded_rect(&mut self, rect: RoundedRect, color: Color);

    fn stroke_rounded_rect(&mut self, rect: RoundedRect, color: Color, line_width: f64);

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Color);

    fn stroke_circle(&mut self, center: DVec2, radius: f64, color: Color, line_width: f64);

    fn line(&mut self, from: DVec2, to: DVec2, color: Color, line_width: f64);

    fn fill_polygon(&mut self, points: &[DVec2], color: Color);

    fn fill_text(&mut self, text: &str, pos: DVec2, font: Font, align: TextAlign, color: Color);

    /// Advance width of `text` rendered in `font`
    fn measure_text(&mut self, text: &str, font: Font) -> f64;
}
