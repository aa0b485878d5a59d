//! Recording painter
//!
//! Used natively (headless runs) and by tests to inspect what an engine drew.

use glam::DVec2;

use super::{Color, Font, Painter, RoundedRect, TextAlign};

/// Glyph advance as a fraction of the font size (roughly a heavy capital)
const GLYPH_ADVANCE: f64 = 0.9;

/// One recorded drawing command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear { width: f64, height: f64 },
    Shadow { blur: f64, color: Color },
    Rect { x: f64, y: f64, w: f64, h: f64, color: Color },
    RoundedRect { rect: RoundedRect, color: Color, stroke: Option<f64> },
    Circle { center: DVec2, radius: f64, color: Color, stroke: Option<f64> },
    Line { from: DVec2, to: DVec2, color: Color, width: f64 },
    Polygon { points: Vec<DVec2>, color: Color },
    Text { text: String, pos: DVec2, font: Font, align: TextAlign, color: Color },
}

/// A painter that records commands instead of rasterizing them
#[derive(Debug, Default)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Drop everything recorded so far
    pub fn reset(&mut self) {
        self.cmds.clear();
    }

    /// All text strings drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DrawCmd) -> bool) -> usize {
        self.cmds.iter().filter(|c| pred(c)).count()
    }
}

impl Painter for DrawList {
    fn clear(&mut self, width: f64, height: f64) {
        self.cmds.push(DrawCmd::Clear { width, height });
    }

    fn set_shadow(&mut self, blur: f64, color: Color) {
        self.cmds.push(DrawCmd::Shadow { blur, color });
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        self.cmds.push(DrawCmd::Rect { x, y, w, h, color });
    }

    fn fill_rounded_rect(&mut self, rect: RoundedRect, color: Color) {
        self.cmds.push(DrawCmd::RoundedRect { rect, color, stroke: None });
    }

    fn stroke_rounded_rect(&mut self, rect: RoundedRect, color: Color, line_width: f64) {
        self.cmds.push(DrawCmd::RoundedRect {
            rect,
            color,
            stroke: Some(line_width),
        });
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Color) {
        self.cmds.push(DrawCmd::Circle {
            center,
            radius,
            color,
            stroke: None,
        });
    }

    fn stroke_circle(&mut self, center: DVec2, radius: f64, color: Color, line_width: f64) {
        self.cmds.push(DrawCmd::Circle {
            center,
            radius,
            color,
            stroke: Some(line_width),
        });
    }

    fn line(&mut self, from: DVec2, to: DVec2, color: Color, line_width: f64) {
        self.cmds.push(DrawCmd::Line {
            from,
            to,
            color,
            width: line_width,
        });
    }

    fn fill_polygon(&mut self, points: &[DVec2], color: Color) {
        self.cmds.push(DrawCmd::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn fill_text(&mut self, text: &str, pos: DVec2, font: Font, align: TextAlign, color: Color) {
        self.cmds.push(DrawCmd::Text {
            text: text.to_string(),
            pos,
            font,
            align,
            color,
        });
    }

    fn measure_text(&mut self, text: &str, font: Font) -> f64 {
        text.chars().count() as f64 * font.size_px * GLYPH_ADVANCE
    }
}
