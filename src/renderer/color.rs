//! RGBA colors for canvas fills and strokes

use serde::{Deserialize, Serialize};

/// An sRGB color with straight alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Same color with a new alpha, clamped to [0, 1]
    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: if a.is_finite() { a.clamp(0.0, 1.0) } else { 0.0 },
            ..self
        }
    }

    /// CSS `rgba(...)` string for the canvas API
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Site palette
pub mod colors {
    use super::Color;

    /// Brand teal used by the feed and network effects
    pub const TEAL: Color = Color::rgb(79, 209, 197);
    /// Emerald-500, growth graph
    pub const EMERALD: Color = Color::rgb(16, 185, 129);
    /// Emerald-900, growth graph arrow
    pub const EMERALD_DARK: Color = Color::rgb(6, 78, 59);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const NEAR_BLACK: Color = Color::rgb(23, 23, 23);
    pub const SILVER: Color = Color::rgb(200, 200, 200);
    /// Runner player body
    pub const CORAL: Color = Color::rgb(255, 107, 107);
    /// Runner player ear
    pub const CRIMSON: Color = Color::rgb(255, 71, 87);
    pub const SHADOW: Color = Color::rgba(0, 0, 0, 0.1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_output() {
        assert_eq!(colors::TEAL.with_alpha(0.15).css(), "rgba(79, 209, 197, 0.15)");
        assert_eq!(Color::rgb(1, 2, 3).css(), "rgba(1, 2, 3, 1)");
    }

    #[test]
    fn test_alpha_is_clamped() {
        assert_eq!(colors::WHITE.with_alpha(-0.4).a, 0.0);
        assert_eq!(colors::WHITE.with_alpha(3.0).a, 1.0);
        assert_eq!(colors::WHITE.with_alpha(f64::NAN).a, 0.0);
    }
}
