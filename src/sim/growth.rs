//! Growth graph effect
//!
//! An arrow runs left to right along a noisy but rising path, shedding
//! fading trail particles and raising bars beneath itself. Once it leaves the
//! surface everything starts over.

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::seeded_rng;
use crate::approach;
use crate::renderer::color::colors;
use crate::renderer::{Painter, RoundedRect, shapes};
use crate::settings::Theme;
use crate::surface::{Animation, Surface};

/// Horizontal runner speed, px/frame
pub const RUNNER_SPEED: f64 = 3.0;
/// Runner starts at this fraction of the height
pub const START_HEIGHT: f64 = 0.6;
/// Trend line starts at this fraction of the height ...
pub const TREND_START: f64 = 0.7;
/// ... and rises by this fraction of the height across the width
pub const TREND_RISE: f64 = 0.4;
/// Blend factor pulling the runner toward its target y
pub const RUNNER_SMOOTHING: f64 = 0.1;
/// Chance per frame of dropping a trail particle
pub const TRAIL_CHANCE: f64 = 0.6;
pub const PARTICLE_DECAY: f64 = 0.005;
/// Horizontal distance between bars
pub const BAR_SPACING: f64 = 45.0;
/// No bars this close to the right edge
pub const BAR_EDGE_MARGIN: f64 = 20.0;
pub const BAR_WIDTH: f64 = 30.0;
/// Bars stop this far below the runner
pub const BAR_GAP: f64 = 15.0;
pub const BAR_SMOOTHING: f64 = 0.1;
/// Runner resets once this far past the right edge
pub const OVERRUN: f64 = 50.0;

/// The arrow marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runner {
    pub pos: DVec2,
    pub target_y: f64,
    /// Heading in radians (screen coordinates)
    pub angle: f64,
    pub last_bar_x: f64,
}

impl Runner {
    fn start(height: f64) -> Self {
        let y = height * START_HEIGHT;
        Self {
            pos: DVec2::new(0.0, y),
            target_y: y,
            angle: 0.0,
            last_bar_x: -50.0,
        }
    }
}

/// A fading dot left behind by the runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailParticle {
    pub pos: DVec2,
    pub size: f64,
    /// 1 when spawned, removed at 0
    pub life: f64,
    pub decay: f64,
}

impl TrailParticle {
    pub fn update(&mut self) {
        self.life -= self.decay;
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }
}

/// A bar growing up from the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub x: f64,
    pub baseline: f64,
    pub target_height: f64,
    pub height: f64,
}

impl Bar {
    pub fn update(&mut self) {
        self.height = approach(self.height, self.target_height, BAR_SMOOTHING);
    }
}

/// Runner path target at `x`: rising trend plus two sine wobbles
pub fn path_y(x: f64, width: f64, height: f64) -> f64 {
    let progress = x / width;
    let trend = height * TREND_START - progress * (height * TREND_RISE);
    let wobble = (x * 0.05).sin() * 20.0 + (x * 0.02).sin() * 40.0;
    trend + wobble
}

/// Growth graph simulation
#[derive(Debug, Clone)]
pub struct GrowthGraph {
    runner: Runner,
    particles: Vec<TrailParticle>,
    bars: Vec<Bar>,
    width: f64,
    height: f64,
    rng: Pcg32,
}

impl GrowthGraph {
    pub fn new(seed: u64) -> Self {
        Self {
            runner: Runner::start(0.0),
            particles: Vec::new(),
            bars: Vec::new(),
            width: 0.0,
            height: 0.0,
            rng: seeded_rng(seed),
        }
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    pub fn particles(&self) -> &[TrailParticle] {
        &self.particles
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    fn restart(&mut self) {
        self.runner = Runner::start(self.height);
        self.particles.clear();
        self.bars.clear();
    }

    fn update_runner(&mut self) {
        let (w, h) = (self.width, self.height);
        let baseline = h;
        let runner = &mut self.runner;

        runner.pos.x += RUNNER_SPEED;
        let x = runner.pos.x;
        runner.target_y = path_y(x, w, h);
        runner.pos.y = approach(runner.pos.y, runner.target_y, RUNNER_SMOOTHING);
        let dy = path_y(x + 1.0, w, h) - runner.target_y;
        runner.angle = dy.atan2(RUNNER_SPEED);

        if x < w && self.rng.random::<f64>() < TRAIL_CHANCE {
            self.particles.push(TrailParticle {
                pos: runner.pos,
                size: self.rng.random::<f64>() * 2.0 + 1.0,
                life: 1.0,
                decay: PARTICLE_DECAY,
            });
        }

        if x > runner.last_bar_x + BAR_SPACING && x < w - BAR_EDGE_MARGIN {
            let target_height = baseline - runner.pos.y - BAR_GAP;
            if target_height > 0.0 {
                self.bars.push(Bar {
                    x,
                    baseline,
                    target_height,
                    height: 0.0,
                });
            }
            runner.last_bar_x = x;
        }

        if x > w + OVERRUN {
            log::trace!("Growth runner overran at x={x}, restarting");
            self.restart();
        }
    }
}

impl Animation for GrowthGraph {
    fn resize(&mut self, surface: &Surface, _now_ms: f64) {
        self.width = surface.width;
        self.height = surface.height;
        self.restart();
    }

    fn update(&mut self, _now_ms: f64) {
        if self.width <= 0.0 {
            return;
        }
        for bar in &mut self.bars {
            bar.update();
        }
        for p in &mut self.particles {
            p.update();
        }
        self.particles.retain(|p| !p.is_dead());
        self.update_runner();
    }

    fn draw(&self, painter: &mut dyn Painter, _theme: Theme) {
        let bar_color = colors::EMERALD.with_alpha(0.15);
        for bar in self.bars.iter().filter(|b| b.height > 1.0) {
            let rect = RoundedRect::new(
                bar.x - BAR_WIDTH / 2.0,
                bar.baseline - bar.height,
                BAR_WIDTH,
                bar.height,
                6.0,
            );
            if let Some(rect) = rect {
                painter.fill_rounded_rect(rect, bar_color);
            }
        }

        for p in &self.particles {
            painter.fill_circle(p.pos, p.size, colors::EMERALD.with_alpha(p.life));
        }

        if self.width > 0.0 {
            let arrow = shapes::arrow_head(self.runner.pos, self.runner.angle);
            painter.fill_polygon(&arrow, colors::EMERALD_DARK);
        }
    }
}
