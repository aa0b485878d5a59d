//! Endless runner mini-game
//!
//! A single "activate" input starts a run or makes the player jump. Letter
//! obstacles scroll in from the right; touching one ends the run at once.
//! Speed steps up every `LEVEL_SCORE` points.

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::seeded_rng;
use crate::highscores::SessionScores;
use crate::renderer::color::colors;
use crate::renderer::{Color, Font, Painter, RoundedRect, TextAlign};
use crate::settings::Theme;
use crate::surface::{Animation, Surface};

/// Downward acceleration, px/frame²
pub const GRAVITY: f64 = 0.6;
/// Vertical velocity applied by a jump
pub const JUMP_FORCE: f64 = -12.0;
pub const INITIAL_SPEED: f64 = 5.0;
/// Speed added per level
pub const SPEED_STEP: f64 = 0.5;
/// Points per level
pub const LEVEL_SCORE: f64 = 30.0;
pub const SCORE_PER_FRAME: f64 = 0.1;
/// Minimum distance between the spawn edge and the newest obstacle
pub const MIN_GAP: f64 = 300.0;
/// Spawn chance per frame at the initial speed
pub const BASE_SPAWN_CHANCE: f64 = 0.05;
/// Obstacles appear this far past the right edge
pub const SPAWN_OFFSET: f64 = 50.0;
/// Obstacle glyphs, used in order and cycled
pub const OBSTACLE_GLYPHS: [char; 8] = ['W', 'H', 'A', 'T', 'W', 'E', 'D', 'O'];
pub const OBSTACLE_FONT: Font = Font::new(900, 32.0);
pub const OBSTACLE_HEIGHT: f64 = 30.0;
/// Glyph baseline sits this far above the ground
pub const OBSTACLE_LIFT: f64 = 5.0;
/// Width used when the painter can't measure a glyph
pub const FALLBACK_GLYPH_WIDTH: f64 = 30.0;
/// Horizontal forgiveness on each side of an obstacle
pub const COLLISION_INSET_X: f64 = 10.0;
/// Obstacles only hit within this band above the ground
pub const COLLISION_BAND: f64 = 25.0;
pub const PLAYER_SIZE: f64 = 40.0;
pub const PLAYER_X: f64 = 50.0;

const HUD_FONT: Font = Font::new(700, 14.0);
const TITLE_FONT: Font = Font::new(700, 20.0);
const STATS_FONT: Font = Font::new(400, 16.0);
const HINT_FONT: Font = Font::new(400, 12.0);

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Waiting for the first activation
    Idle,
    Playing,
    /// Run ended; activation restarts
    GameOver,
}

/// What an activation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Started,
    Jumped,
    /// Mid-air: jumps need ground contact
    Ignored,
}

/// The player block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: DVec2,
    pub vel_y: f64,
    pub grounded: bool,
    pub jumping: bool,
}

impl Player {
    fn new(ground: f64) -> Self {
        let mut player = Self {
            pos: DVec2::new(PLAYER_X, 0.0),
            vel_y: 0.0,
            grounded: false,
            jumping: false,
        };
        player.reset(ground);
        player
    }

    pub fn reset(&mut self, ground: f64) {
        self.pos.y = ground - PLAYER_SIZE;
        self.vel_y = 0.0;
        self.jumping = false;
        self.grounded = true;
    }

    /// Jump if standing; returns whether the jump happened
    pub fn jump(&mut self) -> bool {
        if !self.grounded {
            return false;
        }
        self.vel_y = JUMP_FORCE;
        self.grounded = false;
        self.jumping = true;
        true
    }

    /// Gravity, integration and landing
    pub fn update(&mut self, ground: f64) {
        self.vel_y += GRAVITY;
        self.pos.y += self.vel_y;

        if self.pos.y + PLAYER_SIZE >= ground {
            self.pos.y = ground - PLAYER_SIZE;
            self.vel_y = 0.0;
            self.grounded = true;
            self.jumping = false;
        } else {
            self.grounded = false;
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_rect(self.pos.x, self.pos.y, PLAYER_SIZE, PLAYER_SIZE)
    }
}

/// A letter obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub glyph: char,
    pub x: f64,
    /// Measured glyph advance
    pub width: f64,
    pub height: f64,
    pub marked_for_deletion: bool,
}

impl Obstacle {
    pub fn update(&mut self, speed: f64) {
        self.x -= speed;
        if self.x + self.width < 0.0 {
            self.marked_for_deletion = true;
        }
    }

    /// Hit region: the glyph minus the side insets, limited to the ground band
    pub fn hitbox(&self, ground: f64) -> Aabb {
        Aabb::from_rect(self.x, ground - COLLISION_BAND, self.width, COLLISION_BAND)
            .inset(COLLISION_INSET_X, 0.0)
    }
}

/// Endless runner game state
#[derive(Debug, Clone)]
pub struct RunnerGame {
    phase: RunPhase,
    player: Player,
    obstacles: Vec<Obstacle>,
    glyph_index: usize,
    glyph_widths: [f64; OBSTACLE_GLYPHS.len()],
    /// Web fonts may load after mount; widths are re-read at each start
    metrics_stale: bool,
    score: f64,
    level: u32,
    speed: f64,
    scores: SessionScores,
    width: f64,
    ground: f64,
    rng: Pcg32,
}

impl RunnerGame {
    /// New idle game sharing the session's high score
    pub fn new(seed: u64, scores: SessionScores) -> Self {
        Self {
            phase: RunPhase::Idle,
            player: Player::new(0.0),
            obstacles: Vec::new(),
            glyph_index: 0,
            glyph_widths: [FALLBACK_GLYPH_WIDTH; OBSTACLE_GLYPHS.len()],
            metrics_stale: true,
            score: 0.0,
            level: 0,
            speed: INITIAL_SPEED,
            scores,
            width: 0.0,
            ground: 0.0,
            rng: seeded_rng(seed),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn ground(&self) -> f64 {
        self.ground
    }

    pub fn scores(&self) -> &SessionScores {
        &self.scores
    }

    /// The single input action: start/restart, or jump while playing
    pub fn activate(&mut self) -> Activation {
        match self.phase {
            RunPhase::Idle | RunPhase::GameOver => {
                self.reset_run();
                self.metrics_stale = true;
                self.phase = RunPhase::Playing;
                log::info!("Runner game started");
                Activation::Started
            }
            RunPhase::Playing => {
                if self.player.jump() {
                    Activation::Jumped
                } else {
                    Activation::Ignored
                }
            }
        }
    }

    fn reset_run(&mut self) {
        self.obstacles.clear();
        self.glyph_index = 0;
        self.score = 0.0;
        self.level = 0;
        self.speed = INITIAL_SPEED;
        self.player.reset(self.ground);
    }

    fn spawn_obstacle(&mut self) {
        let i = self.glyph_index;
        self.obstacles.push(Obstacle {
            glyph: OBSTACLE_GLYPHS[i],
            x: self.width + SPAWN_OFFSET,
            width: self.glyph_widths[i],
            height: OBSTACLE_HEIGHT,
            marked_for_deletion: false,
        });
        self.glyph_index = (i + 1) % OBSTACLE_GLYPHS.len();
    }

    /// Spawn chance per frame, scaled with the current speed
    pub fn spawn_chance(&self) -> f64 {
        BASE_SPAWN_CHANCE * (self.speed / INITIAL_SPEED)
    }

    fn maybe_spawn(&mut self) {
        match self.obstacles.last() {
            None => self.spawn_obstacle(),
            Some(last) => {
                if self.width - last.x > MIN_GAP && self.rng.random::<f64>() < self.spawn_chance() {
                    self.spawn_obstacle();
                }
            }
        }
    }

    fn advance_score(&mut self) {
        self.score += SCORE_PER_FRAME;
        self.scores.record(self.score);
        let level = (self.score / LEVEL_SCORE).floor() as u32;
        if level > self.level {
            self.speed += SPEED_STEP;
            self.level = level;
            log::debug!("Runner level {} (speed {})", level, self.speed);
        }
    }

    fn hit_obstacle(&self) -> Option<usize> {
        let player = self.player.bounds();
        self.obstacles
            .iter()
            .position(|o| player.overlaps(&o.hitbox(self.ground)))
    }

    fn foreground(theme: Theme) -> Color {
        if theme.is_dark() {
            colors::WHITE
        } else {
            colors::BLACK
        }
    }

    fn draw_player(&self, painter: &mut dyn Painter) {
        let DVec2 { x, y } = self.player.pos;
        if let Some(body) = RoundedRect::new(x, y, PLAYER_SIZE, PLAYER_SIZE, 8.0) {
            painter.fill_rounded_rect(body, colors::CORAL);
        }
        painter.fill_rect(x + 24.0, y + 8.0, 8.0, 8.0, colors::WHITE);
        painter.fill_rect(x + 28.0, y + 10.0, 4.0, 4.0, colors::BLACK);
        let ear = [
            DVec2::new(x + 10.0, y),
            DVec2::new(x, y + 15.0),
            DVec2::new(x + 20.0, y),
        ];
        painter.fill_polygon(&ear, colors::CRIMSON);
    }

    fn draw_overlay(&self, painter: &mut dyn Painter, fg: Color) {
        let center = DVec2::new(self.width / 2.0, self.ground / 2.0);
        let title = match self.phase {
            RunPhase::Idle => "Tap to Start",
            _ => "Game Over",
        };
        painter.fill_text(title, center - DVec2::new(0.0, 20.0), TITLE_FONT, TextAlign::Center, fg);

        if self.phase == RunPhase::GameOver {
            let score = format!("Score: {}", self.score.floor() as u64);
            let best = format!("High Score: {}", self.scores.display_best());
            painter.fill_text(&score, center + DVec2::new(0.0, 10.0), STATS_FONT, TextAlign::Center, fg);
            painter.fill_text(&best, center + DVec2::new(0.0, 35.0), STATS_FONT, TextAlign::Center, fg);
            painter.fill_text(
                "Tap to Restart",
                center + DVec2::new(0.0, 65.0),
                HINT_FONT,
                TextAlign::Center,
                fg.with_alpha(0.6),
            );
        }
    }

    fn draw_hud(&self, painter: &mut dyn Painter, fg: Color) {
        let x = self.width - 20.0;
        let score = format!("Score: {}", self.score.floor() as u64);
        let best = format!("HI: {}", self.scores.display_best());
        painter.fill_text(&score, DVec2::new(x, 30.0), HUD_FONT, TextAlign::Right, fg);
        painter.fill_text(&best, DVec2::new(x, 50.0), HUD_FONT, TextAlign::Right, fg.with_alpha(0.7));
    }
}

impl Animation for RunnerGame {
    fn resize(&mut self, surface: &Surface, _now_ms: f64) {
        self.width = surface.width;
        self.ground = surface.height;
        self.player.pos.y = self.ground - PLAYER_SIZE;
    }

    fn update(&mut self, _now_ms: f64) {
        if self.phase != RunPhase::Playing {
            return;
        }
        self.advance_score();
        self.player.update(self.ground);
        self.maybe_spawn();

        let speed = self.speed;
        for obstacle in &mut self.obstacles {
            obstacle.update(speed);
        }
        self.obstacles.retain(|o| !o.marked_for_deletion);

        if let Some(i) = self.hit_obstacle() {
            self.phase = RunPhase::GameOver;
            log::info!(
                "Runner hit '{}' - score {:.0}, best {:.0}",
                self.obstacles[i].glyph,
                self.score.floor(),
                self.scores.best().floor()
            );
        }
    }

    fn draw(&self, painter: &mut dyn Painter, theme: Theme) {
        let fg = Self::foreground(theme);
        if self.phase != RunPhase::Playing {
            self.draw_overlay(painter, fg);
            return;
        }
        self.draw_player(painter);
        for obstacle in &self.obstacles {
            let baseline = DVec2::new(obstacle.x, self.ground - OBSTACLE_LIFT);
            painter.fill_text(&obstacle.glyph.to_string(), baseline, OBSTACLE_FONT, TextAlign::Start, fg);
        }
        self.draw_hud(painter, fg);
    }

    fn measure(&mut self, painter: &mut dyn Painter) {
        for (width, glyph) in self.glyph_widths.iter_mut().zip(OBSTACLE_GLYPHS) {
            let measured = painter.measure_text(&glyph.to_string(), OBSTACLE_FONT);
            *width = if measured.is_finite() && measured > 0.0 {
                measured
            } else {
                FALLBACK_GLYPH_WIDTH
            };
        }
        self.metrics_stale = false;
    }

    fn wants_measure(&self) -> bool {
        self.metrics_stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::DrawList;

    fn game(seed: u64) -> RunnerGame {
        game_with(seed, SessionScores::new())
    }

    fn game_with(seed: u64, scores: SessionScores) -> RunnerGame {
        let mut g = RunnerGame::new(seed, scores);
        g.resize(&Surface::resized(800.0, 200.0, 1.0), 0.0);
        g.measure(&mut DrawList::new());
        g
    }

    /// Play without jumping until the run ends; returns frames played
    fn play_until_over(g: &mut RunnerGame) -> usize {
        let mut frames = 0;
        while g.phase() == RunPhase::Playing {
            g.update(0.0);
            frames += 1;
            assert!(frames < 10_000, "run never ended");
        }
        frames
    }

    #[test]
    fn test_starts_idle_and_activation_starts() {
        let mut g = game(1);
        assert_eq!(g.phase(), RunPhase::Idle);
        g.update(0.0);
        assert_eq!(g.score(), 0.0);
        assert_eq!(g.activate(), Activation::Started);
        assert_eq!(g.phase(), RunPhase::Playing);
        assert!(g.player().grounded);
    }

    #[test]
    fn test_jump_physics() {
        let mut g = game(2);
        g.activate();
        assert_eq!(g.activate(), Activation::Jumped);
        assert_eq!(g.player().vel_y, JUMP_FORCE);
        assert!(!g.player().grounded);

        // No double jump
        g.update(0.0);
        assert_eq!(g.activate(), Activation::Ignored);
        assert!((g.player().vel_y - (JUMP_FORCE + GRAVITY)).abs() < 1e-12);

        let mut frames = 1;
        while !g.player().grounded {
            g.update(0.0);
            frames += 1;
            assert!(frames < 100);
        }
        let p = g.player();
        assert_eq!(p.vel_y, 0.0);
        assert_eq!(p.pos.y + PLAYER_SIZE, g.ground());
        assert!(!p.jumping);
    }

    #[test]
    fn test_first_obstacle_is_fatal_without_jumping() {
        let mut g = game(3);
        g.activate();
        play_until_over(&mut g);
        assert_eq!(g.phase(), RunPhase::GameOver);
        let first = &g.obstacles()[0];
        assert_eq!(first.glyph, 'W');
        assert!(g.player().bounds().overlaps(&first.hitbox(g.ground())));
        assert!(first.hitbox(g.ground()).overlaps(&g.player().bounds()));
    }

    #[test]
    fn test_game_over_freezes_score() {
        let mut g = game(4);
        g.activate();
        play_until_over(&mut g);
        let final_score = g.score();
        let obstacles = g.obstacles().to_vec();
        for _ in 0..50 {
            g.update(0.0);
        }
        assert_eq!(g.score(), final_score);
        assert_eq!(g.obstacles(), obstacles.as_slice());
        assert_eq!(g.phase(), RunPhase::GameOver);
    }

    #[test]
    fn test_score_increases_every_frame() {
        let mut g = game(5);
        g.activate();
        let mut last = g.score();
        for _ in 0..60 {
            g.update(0.0);
            assert!(g.score() > last);
            last = g.score();
        }
    }

    #[test]
    fn test_speed_steps_per_level() {
        let mut g = game(6);
        g.activate();
        g.score = LEVEL_SCORE - 0.05;
        g.update(0.0);
        assert_eq!(g.level(), 1);
        assert_eq!(g.speed(), INITIAL_SPEED + SPEED_STEP);
        g.update(0.0);
        assert_eq!(g.speed(), INITIAL_SPEED + SPEED_STEP);
        assert!((g.spawn_chance() - BASE_SPAWN_CHANCE * 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_high_score_is_session_maximum() {
        let scores = SessionScores::new();
        let mut g = game_with(7, scores.clone());
        let mut observed = Vec::new();
        for _ in 0..3 {
            g.activate();
            play_until_over(&mut g);
            observed.push(g.score());
            let max = observed.iter().cloned().fold(0.0, f64::max);
            assert_eq!(scores.best(), max);
        }

        // A second game on the same page sees the same best
        let other = game_with(8, scores.clone());
        assert_eq!(other.scores().best(), scores.best());
    }

    #[test]
    fn test_restart_resets_run() {
        let mut g = game(9);
        g.activate();
        play_until_over(&mut g);
        assert_eq!(g.activate(), Activation::Started);
        assert_eq!(g.score(), 0.0);
        assert_eq!(g.speed(), INITIAL_SPEED);
        assert_eq!(g.level(), 0);
        assert!(g.obstacles().is_empty());
        g.update(0.0);
        assert_eq!(g.obstacles()[0].glyph, OBSTACLE_GLYPHS[0]);
    }

    #[test]
    fn test_single_obstacle_until_gap_opens() {
        let mut g = game(10);
        g.activate();
        // Gap is width - x = 5n - 50, so nothing else can spawn for 70 frames
        for _ in 0..70 {
            g.update(0.0);
            assert_eq!(g.obstacles().len(), 1);
        }
        assert_eq!(g.obstacles()[0].x, 800.0 + SPAWN_OFFSET - 70.0 * INITIAL_SPEED);
    }

    #[test]
    fn test_glyphs_cycle_through_palette() {
        let mut g = game(11);
        for _ in 0..10 {
            g.spawn_obstacle();
        }
        let glyphs: String = g.obstacles().iter().map(|o| o.glyph).collect();
        assert_eq!(glyphs, "WHATWEDOWH");
    }

    #[test]
    fn test_obstacle_marked_once_off_screen() {
        let mut o = Obstacle {
            glyph: 'A',
            x: -15.0,
            width: 20.0,
            height: OBSTACLE_HEIGHT,
            marked_for_deletion: false,
        };
        o.update(5.0);
        assert!(!o.marked_for_deletion, "right edge exactly at 0 stays");
        o.update(0.5);
        assert!(o.marked_for_deletion);
    }

    #[test]
    fn test_measure_uses_painter_widths() {
        let g = game(12);
        // DrawList advance: 0.9 * 32px per glyph
        assert!(g.glyph_widths.iter().all(|w| (*w - 28.8).abs() < 1e-9));
    }

    #[test]
    fn test_start_remeasures_late_fonts() {
        use crate::surface::Driver;
        use crate::Settings;

        // Mounted before the font loaded: measurement fell back
        let mut driver = Driver::new(RunnerGame::new(15, SessionScores::new()), Settings::default());
        let mut list = DrawList::new();
        driver.mount(Surface::resized(800.0, 200.0, 1.0), 0.0, &mut list);
        driver.engine_mut().glyph_widths = [FALLBACK_GLYPH_WIDTH; OBSTACLE_GLYPHS.len()];
        assert!(!driver.engine().wants_measure());

        assert_eq!(driver.engine_mut().activate(), Activation::Started);
        assert!(driver.engine().wants_measure());
        driver.frame(16.0, &mut list);
        assert!(!driver.engine().wants_measure());
        assert!(driver.engine().glyph_widths.iter().all(|w| (*w - 28.8).abs() < 1e-9));
    }

    #[test]
    fn test_overlay_text_by_phase() {
        let mut g = game(13);
        let mut list = DrawList::new();
        g.draw(&mut list, Theme::Light);
        assert_eq!(list.texts(), vec!["Tap to Start"]);

        g.activate();
        play_until_over(&mut g);
        list.reset();
        g.draw(&mut list, Theme::Dark);
        let texts = list.texts();
        assert_eq!(texts[0], "Game Over");
        assert!(texts[1].starts_with("Score: "));
        assert!(texts[2].starts_with("High Score: "));
        assert_eq!(texts[3], "Tap to Restart");
    }

    #[test]
    fn test_hud_while_playing() {
        let mut g = game(14);
        g.activate();
        for _ in 0..20 {
            g.update(0.0);
        }
        let mut list = DrawList::new();
        g.draw(&mut list, Theme::Light);
        let texts = list.texts();
        assert!(texts.contains(&"W"));
        assert!(texts.contains(&"Score: 2"));
        assert!(texts.contains(&"HI: 2"));
    }
}
