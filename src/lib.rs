//! Amblify canvas - animation engines for the portfolio site
//!
//! Core modules:
//! - `sim`: Per-frame simulations (feed, network graph, growth graph, runner game)
//! - `surface`: Surface sizing, frame-loop lifecycle and the `Animation` driver
//! - `renderer`: 2D painter abstraction (canvas on web, draw list on native)
//! - `platform`: Browser mounting and input mapping
//! - `chat`: Chat widget boundary for the generative-language API

pub mod chat;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod surface;

pub use highscores::SessionScores;
pub use settings::{Settings, Theme};
pub use surface::{Animation, Driver, FrameLoop, Surface, SurfaceError};

/// Exponential approach: move `value` a fixed fraction of the way to `target`
#[inline]
pub fn approach(value: f64, target: f64, factor: f64) -> f64 {
    value + (target - value) * factor
}
