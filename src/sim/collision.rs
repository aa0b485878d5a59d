//! Axis-aligned collision boxes for the runner game

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in screen coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec2,
    pub max: DVec2,
}

impl Aabb {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    pub fn from_rect(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(DVec2::new(x, y), DVec2::new(x + w, y + h))
    }

    /// Shrink horizontally by `dx` and vertically by `dy` on each side
    pub fn inset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.min + DVec2::new(dx, dy), self.max - DVec2::new(dx, dy))
    }

    /// Strict overlap: touching edges do not collide. Symmetric in its arguments.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}
