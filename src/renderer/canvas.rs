//! `CanvasRenderingContext2d` painter (web only)

use glam::DVec2;
use std::f64::consts::TAU;
use web_sys::CanvasRenderingContext2d;

use super::{Color, Font, Painter, RoundedRect, TextAlign};
use crate::surface::Surface;

/// Painter drawing straight into a 2D canvas context
pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
}

impl CanvasPainter {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    /// Apply the device-pixel-ratio transform so drawing uses CSS pixels
    pub fn apply_surface(&self, surface: &Surface) {
        let [a, b, c, d, e, f] = surface.transform();
        if let Err(err) = self.ctx.set_transform(a, b, c, d, e, f) {
            log::warn!("set_transform failed: {:?}", err);
        }
    }

    fn path_rounded_rect(&self, rect: &RoundedRect) {
        let start = rect.start();
        self.ctx.begin_path();
        self.ctx.move_to(start.x, start.y);
        for (corner, next) in rect.arc_to_points() {
            let _ = self.ctx.arc_to(corner.x, corner.y, next.x, next.y, rect.radius);
        }
        self.ctx.close_path();
    }

    fn path_circle(&self, center: DVec2, radius: f64) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(center.x, center.y, radius.max(0.0), 0.0, TAU);
    }
}

impl Painter for CanvasPainter {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn set_shadow(&mut self, blur: f64, color: Color) {
        self.ctx.set_shadow_blur(blur);
        self.ctx.set_shadow_color(&color.css());
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.fill_rect(x, y, w, h);
    }

    fn fill_rounded_rect(&mut self, rect: RoundedRect, color: Color) {
        self.ctx.set_fill_style_str(&color.css());
        self.path_rounded_rect(&rect);
        self.ctx.fill();
    }

    fn stroke_rounded_rect(&mut self, rect: RoundedRect, color: Color, line_width: f64) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(line_width);
        self.path_rounded_rect(&rect);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Color) {
        self.ctx.set_fill_style_str(&color.css());
        self.path_circle(center, radius);
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, center: DVec2, radius: f64, color: Color, line_width: f64) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(line_width);
        self.path_circle(center, radius);
        self.ctx.stroke();
    }

    fn line(&mut self, from: DVec2, to: DVec2, color: Color, line_width: f64) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(line_width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_polygon(&mut self, points: &[DVec2], color: Color) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        self.ctx.close_path();
        self.ctx.fill();
    }

    fn fill_text(&mut self, text: &str, pos: DVec2, font: Font, align: TextAlign, color: Color) {
        self.ctx.set_font(&font.css());
        self.ctx.set_text_align(align.as_str());
        self.ctx.set_fill_style_str(&color.css());
        let _ = self.ctx.fill_text(text, pos.x, pos.y);
    }

    fn measure_text(&mut self, text: &str, font: Font) -> f64 {
        self.ctx.set_font(&font.css());
        match self.ctx.measure_text(text) {
            Ok(metrics) => metrics.width(),
            Err(err) => {
                log::debug!("measure_text failed: {:?}", err);
                0.0
            }
        }
    }
}
