//! Network graph effect ("digital dominance")
//!
//! Drifting nodes around a fixed hub. A node links to the hub while it is
//! within `CONNECTION_DISTANCE` or while the expanding pulse ring passes it.

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::seeded_rng;
use crate::renderer::color::colors;
use crate::renderer::{Color, Painter};
use crate::settings::Theme;
use crate::surface::{Animation, Surface};

/// Drifting nodes (the hub comes on top)
pub const NODE_COUNT: usize = 20;
/// Hub link distance
pub const CONNECTION_DISTANCE: f64 = 130.0;
/// Pulse ring growth per frame
pub const PULSE_STEP: f64 = 2.0;
/// How close to the ring a node must be to count as hit
pub const PULSE_TOLERANCE: f64 = 20.0;
/// Ring is fully transparent at this radius
pub const PULSE_FADE_RADIUS: f64 = 300.0;
/// Max drift velocity per axis is half of this
pub const DRIFT_SPEED: f64 = 0.8;
pub const HUB_SIZE: f64 = 12.0;
/// Hub sits at (w / 2, h / HUB_HEIGHT_DIVISOR)
pub const HUB_HEIGHT_DIVISOR: f64 = 2.2;

/// A graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub pos: DVec2,
    pub vel: DVec2,
    pub size: f64,
    /// Linked to the hub this frame
    pub connected: bool,
    /// Link exists because of the pulse ring
    pub pulse_hit: bool,
    pub is_center: bool,
}

impl Node {
    fn hub(width: f64, height: f64) -> Self {
        Self {
            pos: DVec2::new(width / 2.0, height / HUB_HEIGHT_DIVISOR),
            vel: DVec2::ZERO,
            size: HUB_SIZE,
            connected: false,
            pulse_hit: false,
            is_center: true,
        }
    }

    fn drifting(rng: &mut Pcg32, width: f64, height: f64) -> Self {
        Self {
            pos: DVec2::new(rng.random::<f64>() * width, rng.random::<f64>() * height),
            vel: DVec2::new(
                (rng.random::<f64>() - 0.5) * DRIFT_SPEED,
                (rng.random::<f64>() - 0.5) * DRIFT_SPEED,
            ),
            size: rng.random::<f64>() * 3.0 + 2.0,
            connected: false,
            pulse_hit: false,
            is_center: false,
        }
    }

    /// Integrate velocity and bounce off the surface edges
    pub fn step(&mut self, width: f64, height: f64) {
        if self.is_center {
            return;
        }
        self.pos += self.vel;
        (self.pos.x, self.vel.x) = reflect_axis(self.pos.x, self.vel.x, width);
        (self.pos.y, self.vel.y) = reflect_axis(self.pos.y, self.vel.y, height);
    }
}

/// Reflective boundary on one axis.
///
/// Leaving `[0, max]` puts the coordinate back on the bound and points the
/// velocity inward, so the position never ends a step outside the surface.
pub fn reflect_axis(pos: f64, vel: f64, max: f64) -> (f64, f64) {
    if pos < 0.0 {
        (0.0, vel.abs())
    } else if pos > max {
        (max.max(0.0), -vel.abs())
    } else {
        (pos, vel)
    }
}

/// Node-and-pulse network simulation
#[derive(Debug, Clone)]
pub struct NetworkGraph {
    nodes: Vec<Node>,
    pulse_radius: f64,
    width: f64,
    height: f64,
    now_ms: f64,
    rng: Pcg32,
}

impl NetworkGraph {
    pub fn new(seed: u64) -> Self {
        Self {
            nodes: Vec::new(),
            pulse_radius: 0.0,
            width: 0.0,
            height: 0.0,
            now_ms: 0.0,
            rng: seeded_rng(seed),
        }
    }

    /// Hub first, then the drifting nodes
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn pulse_radius(&self) -> f64 {
        self.pulse_radius
    }

    pub fn set_pulse_radius(&mut self, radius: f64) {
        self.pulse_radius = radius;
    }

    fn seed_nodes(&mut self) {
        let (w, h) = (self.width, self.height);
        self.nodes.clear();
        self.nodes.push(Node::hub(w, h));
        for _ in 0..NODE_COUNT {
            let node = Node::drifting(&mut self.rng, w, h);
            self.nodes.push(node);
        }
    }

    fn advance_pulse(&mut self) {
        self.pulse_radius += PULSE_STEP;
        if self.pulse_radius > self.width.max(self.height) {
            self.pulse_radius = 0.0;
        }
    }

    fn link_to_hub(&mut self) {
        let Some((hub, rest)) = self.nodes.split_first_mut() else {
            return;
        };
        for node in rest {
            let dist = hub.pos.distance(node.pos);
            node.pulse_hit = (dist - self.pulse_radius).abs() < PULSE_TOLERANCE;
            node.connected = dist < CONNECTION_DISTANCE || node.pulse_hit;
        }
    }
}

/// Edge opacity: linear falloff with distance, zero past the link distance
pub fn edge_opacity(dist: f64) -> f64 {
    (1.0 - dist / CONNECTION_DISTANCE).clamp(0.0, 1.0)
}

impl Animation for NetworkGraph {
    const HONORS_REDUCED_MOTION: bool = true;

    fn resize(&mut self, surface: &Surface, now_ms: f64) {
        self.width = surface.width;
        self.height = surface.height;
        self.now_ms = now_ms;
        self.seed_nodes();
        log::debug!("Network graph reseeded for {}x{}", self.width, self.height);
    }

    fn update(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        let (w, h) = (self.width, self.height);
        for node in &mut self.nodes {
            node.step(w, h);
        }
        self.advance_pulse();
        self.link_to_hub();
    }

    fn draw(&self, painter: &mut dyn Painter, theme: Theme) {
        let Some((hub, rest)) = self.nodes.split_first() else {
            return;
        };
        let neutral = if theme.is_dark() {
            colors::WHITE.with_alpha(0.2)
        } else {
            colors::SILVER.with_alpha(0.5)
        };

        let ring_alpha = 1.0 - self.pulse_radius / PULSE_FADE_RADIUS;
        painter.stroke_circle(hub.pos, self.pulse_radius, colors::TEAL.with_alpha(ring_alpha), 1.0);

        for node in rest.iter().filter(|n| n.connected) {
            let opacity = edge_opacity(hub.pos.distance(node.pos));
            let width = if node.pulse_hit { 2.0 } else { 1.0 };
            painter.line(hub.pos, node.pos, colors::TEAL.with_alpha(opacity), width);
        }

        // Hub with breathing halo
        painter.set_shadow(20.0, colors::TEAL);
        painter.fill_circle(hub.pos, hub.size, colors::WHITE);
        painter.stroke_circle(hub.pos, hub.size, colors::TEAL, 4.0);
        let halo = 20.0 + (self.now_ms * 0.002).sin() * 5.0;
        painter.stroke_circle(hub.pos, halo, colors::TEAL.with_alpha(0.2), 2.0);

        for node in rest {
            let (blur, fill): (f64, Color) = if node.connected {
                (10.0, colors::TEAL)
            } else {
                (0.0, neutral)
            };
            painter.set_shadow(blur, colors::TEAL);
            painter.fill_circle(node.pos, node.size, fill);
        }
        painter.set_shadow(0.0, colors::TEAL);
    }
}
