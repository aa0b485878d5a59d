//! Shape helpers shared by the painters and engines

use glam::DVec2;

/// An axis-aligned rectangle with rounded corners.
///
/// The corner radius never exceeds half of either side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub radius: f64,
}

impl RoundedRect {
    /// Returns `None` for degenerate (non-positive) sizes, which draw nothing
    pub fn new(x: f64, y: f64, w: f64, h: f64, radius: f64) -> Option<Self> {
        if !(w > 0.0 && h > 0.0) {
            return None;
        }
        let radius = radius.max(0.0).min(w / 2.0).min(h / 2.0);
        Some(Self { x, y, w, h, radius })
    }

    /// Corner arcs as `(corner, next_corner)` pairs for `arcTo`, clockwise from top-left
    pub fn arc_to_points(&self) -> [(DVec2, DVec2); 4] {
        let (x, y, w, h) = (self.x, self.y, self.w, self.h);
        [
            (DVec2::new(x + w, y), DVec2::new(x + w, y + h)),
            (DVec2::new(x + w, y + h), DVec2::new(x, y + h)),
            (DVec2::new(x, y + h), DVec2::new(x, y)),
            (DVec2::new(x, y), DVec2::new(x + w, y)),
        ]
    }

    /// Path start point (top edge, just past the top-left corner)
    pub fn start(&self) -> DVec2 {
        DVec2::new(self.x + self.radius, self.y)
    }
}

/// Rotate `points` (relative to the origin) by `angle` and move them to `origin`
pub fn place(points: &[DVec2], origin: DVec2, angle: f64) -> Vec<DVec2> {
    let rot = DVec2::from_angle(angle);
    points.iter().map(|p| origin + rot.rotate(*p)).collect()
}

/// Arrow head pointing along +x, scaled for the growth runner
pub fn arrow_head(origin: DVec2, angle: f64) -> Vec<DVec2> {
    const ARROW: [DVec2; 3] = [
        DVec2::new(10.0, 0.0),
        DVec2::new(-5.0, 5.0),
        DVec2::new(-5.0, -5.0),
    ];
    place(&ARROW, origin, angle)
}
