//! "Stop the scroll" feed effect
//!
//! A two-column feed of placeholder cards scrolls up, brakes, snaps the card
//! nearest the middle to the vertical center, holds it highlighted, then
//! scrolls again. The cycle never ends.

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::seeded_rng;
use crate::renderer::color::colors;
use crate::renderer::{Painter, RoundedRect};
use crate::settings::Theme;
use crate::surface::{Animation, Surface};

pub const COLUMN_COUNT: usize = 2;
/// Gutter between columns and around the feed
pub const GAP: f64 = 20.0;
/// Scroll speed in px/frame
pub const BASE_SPEED: f64 = 8.0;
/// Time spent scrolling before braking starts
pub const SCROLL_MS: f64 = 2000.0;
/// Per-frame speed multiplier while braking
pub const BRAKE_FACTOR: f64 = 0.90;
/// Braking ends below this speed
pub const STOP_SPEED: f64 = 0.5;
/// Fraction of the remaining snap distance covered per frame
pub const SNAP_FACTOR: f64 = 0.15;
/// Snap completes once the target is this close to center
pub const SNAP_EPSILON: f64 = 0.5;
/// Dwell on the highlighted card
pub const HOLD_MS: f64 = 2500.0;
/// Cards recycle once their bottom edge is this far above the top
pub const RECYCLE_MARGIN: f64 = 50.0;
/// Feed is seeded from this far below the bottom edge
const SEED_START_BELOW: f64 = 100.0;
/// ... up to this far above the top edge
const SEED_END_ABOVE: f64 = 300.0;
/// Odd columns start staggered by this much
const COLUMN_STAGGER: f64 = 50.0;
const CARD_RADIUS: f64 = 12.0;
const CARD_PADDING: f64 = 15.0;

/// Motion phase of the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedPhase {
    Scrolling,
    Braking,
    Snapping,
    Holding,
}

impl FeedPhase {
    /// Successor in the cycle
    pub fn next(&self) -> Self {
        match self {
            FeedPhase::Scrolling => FeedPhase::Braking,
            FeedPhase::Braking => FeedPhase::Snapping,
            FeedPhase::Snapping => FeedPhase::Holding,
            FeedPhase::Holding => FeedPhase::Scrolling,
        }
    }

    /// Cards scroll (and recycle) in these phases
    pub fn is_moving(&self) -> bool {
        matches!(self, FeedPhase::Scrolling | FeedPhase::Braking)
    }
}

/// A placeholder post in the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCard {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub column: usize,
    pub has_image: bool,
    /// Text placeholder lines (1..=3)
    pub lines: u8,
}

impl FeedCard {
    fn random(rng: &mut Pcg32, x: f64, y: f64, w: f64, h: f64, column: usize) -> Self {
        Self {
            x,
            y,
            w,
            h,
            column,
            has_image: rng.random::<f64>() > 0.3,
            lines: rng.random_range(1..=3),
        }
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.h / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

/// Feed simulation with its scroll/brake/snap/hold cycle
#[derive(Debug, Clone)]
pub struct ScrollFeed {
    cards: Vec<FeedCard>,
    phase: FeedPhase,
    speed: f64,
    cycle_start_ms: f64,
    hold_start_ms: f64,
    /// Index into `cards`; cards are recycled, never removed, so it stays valid
    snap_target: Option<usize>,
    width: f64,
    height: f64,
    rng: Pcg32,
}

impl ScrollFeed {
    pub fn new(seed: u64) -> Self {
        Self {
            cards: Vec::new(),
            phase: FeedPhase::Scrolling,
            speed: BASE_SPEED,
            cycle_start_ms: 0.0,
            hold_start_ms: 0.0,
            snap_target: None,
            width: 0.0,
            height: 0.0,
            rng: seeded_rng(seed),
        }
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn cards(&self) -> &[FeedCard] {
        &self.cards
    }

    pub fn cards_mut(&mut self) -> &mut [FeedCard] {
        &mut self.cards
    }

    pub fn snap_target(&self) -> Option<usize> {
        self.snap_target
    }

    /// Card currently drawn highlighted
    pub fn highlighted(&self) -> Option<usize> {
        match self.phase {
            FeedPhase::Snapping | FeedPhase::Holding => self.snap_target,
            _ => None,
        }
    }

    fn seed_cards(&mut self) {
        self.cards.clear();
        if self.width <= 0.0 {
            return;
        }
        let col_w = (self.width - GAP * 3.0) / COLUMN_COUNT as f64;
        if col_w <= 0.0 {
            return;
        }

        for column in 0..COLUMN_COUNT {
            let x = GAP + column as f64 * (col_w + GAP);
            let mut y = self.height + SEED_START_BELOW;
            while y > -SEED_END_ABOVE {
                let h = self.rng.random::<f64>() * 100.0 + 120.0;
                y -= h + GAP;
                let start_y = if column % 2 == 0 { y } else { y - COLUMN_STAGGER };
                let card = FeedCard::random(&mut self.rng, x, start_y, col_w, h, column);
                self.cards.push(card);
            }
        }
    }

    /// Card whose vertical center is nearest the surface's vertical center
    pub fn central_card(&self) -> Option<usize> {
        let center = self.height / 2.0;
        let mut best: Option<(usize, f64)> = None;
        for (i, card) in self.cards.iter().enumerate() {
            let dist = (card.center_y() - center).abs();
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((i, dist));
            }
        }
        best.map(|(i, _)| i)
    }

    fn enter(&mut self, phase: FeedPhase, now_ms: f64) {
        log::trace!("Feed {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        match phase {
            FeedPhase::Scrolling => {
                self.cycle_start_ms = now_ms;
                self.snap_target = None;
            }
            FeedPhase::Holding => self.hold_start_ms = now_ms,
            FeedPhase::Braking | FeedPhase::Snapping => {}
        }
    }

    /// Advance the phase machine by one frame (at most one transition)
    fn step_phase(&mut self, now_ms: f64) {
        match self.phase {
            FeedPhase::Scrolling => {
                self.speed = BASE_SPEED;
                if now_ms - self.cycle_start_ms > SCROLL_MS {
                    self.enter(FeedPhase::Braking, now_ms);
                }
            }
            FeedPhase::Braking => {
                self.speed *= BRAKE_FACTOR;
                if self.speed < STOP_SPEED {
                    self.speed = 0.0;
                    self.snap_target = self.central_card();
                    self.enter(FeedPhase::Snapping, now_ms);
                }
            }
            FeedPhase::Snapping => match self.snap_target {
                Some(i) => {
                    let target = &self.cards[i];
                    let diff = (self.height / 2.0 - target.h / 2.0) - target.y;
                    let nudge = diff * SNAP_FACTOR;
                    for card in &mut self.cards {
                        card.y += nudge;
                    }
                    if diff.abs() < SNAP_EPSILON {
                        self.enter(FeedPhase::Holding, now_ms);
                    }
                }
                // Nothing to center: the empty feed is already "snapped"
                None => self.enter(FeedPhase::Holding, now_ms),
            },
            FeedPhase::Holding => {
                self.speed = 0.0;
                if now_ms - self.hold_start_ms > HOLD_MS {
                    self.enter(FeedPhase::Scrolling, now_ms);
                }
            }
        }
    }

    fn scroll_cards(&mut self) {
        let speed = self.speed;
        let respawn_y = self.height + RECYCLE_MARGIN;
        for card in &mut self.cards {
            card.y -= speed;
            if card.bottom() < -RECYCLE_MARGIN {
                card.y = respawn_y;
                card.h = self.rng.random::<f64>() * 100.0 + 100.0;
            }
        }
    }

    fn draw_card(&self, painter: &mut dyn Painter, card: &FeedCard, highlighted: bool, dark: bool) {
        let Some(body) = RoundedRect::new(card.x, card.y, card.w, card.h, CARD_RADIUS) else {
            return;
        };
        if highlighted {
            painter.set_shadow(20.0, colors::SHADOW);
            let fill = if dark { colors::NEAR_BLACK } else { colors::WHITE };
            painter.fill_rounded_rect(body, fill);
            painter.stroke_rounded_rect(body, colors::TEAL, 2.0);
            painter.set_shadow(0.0, colors::SHADOW);
        } else {
            let fill = if dark {
                colors::WHITE.with_alpha(0.05)
            } else {
                colors::TEAL.with_alpha(0.15)
            };
            painter.fill_rounded_rect(body, fill);
        }

        let pad = CARD_PADDING;
        let inner_w = card.w - pad * 2.0;
        let accent = if highlighted {
            colors::TEAL
        } else {
            colors::TEAL.with_alpha(0.3)
        };
        let text_fill = if dark && !highlighted {
            colors::WHITE.with_alpha(0.1)
        } else {
            colors::TEAL.with_alpha(0.2)
        };
        let mut content_y = card.y + pad;

        // Avatar and name bar
        painter.fill_circle(DVec2::new(card.x + pad + 10.0, content_y + 10.0), 10.0, accent);
        if let Some(bar) = RoundedRect::new(card.x + pad + 30.0, content_y + 6.0, card.w * 0.4, 8.0, 4.0) {
            painter.fill_rounded_rect(bar, text_fill);
        }
        content_y += 35.0;

        if card.has_image {
            let img_h = card.h * 0.4;
            let img_fill = if dark && !highlighted {
                colors::WHITE.with_alpha(0.05)
            } else {
                colors::TEAL.with_alpha(0.1)
            };
            if let Some(img) = RoundedRect::new(card.x + pad, content_y, inner_w, img_h, 8.0) {
                painter.fill_rounded_rect(img, img_fill);
            }
            content_y += img_h + 10.0;
        }

        for i in 0..card.lines {
            if content_y + 8.0 >= card.bottom() - pad {
                break;
            }
            let line_w = if i + 1 == card.lines { inner_w * 0.6 } else { inner_w };
            if let Some(line) = RoundedRect::new(card.x + pad, content_y, line_w, 6.0, 3.0) {
                painter.fill_rounded_rect(line, text_fill);
            }
            content_y += 14.0;
        }
    }
}

impl Animation for ScrollFeed {
    fn resize(&mut self, surface: &Surface, now_ms: f64) {
        self.width = surface.width;
        self.height = surface.height;
        self.seed_cards();
        self.speed = BASE_SPEED;
        self.phase = FeedPhase::Scrolling;
        self.cycle_start_ms = now_ms;
        self.snap_target = None;
        log::debug!("Feed reseeded with {} cards", self.cards.len());
    }

    fn update(&mut self, now_ms: f64) {
        self.step_phase(now_ms);
        if self.phase.is_moving() {
            self.scroll_cards();
        }
    }

    fn draw(&self, painter: &mut dyn Painter, theme: Theme) {
        let highlighted = self.highlighted();
        let dark = theme.is_dark();
        for (i, card) in self.cards.iter().enumerate() {
            self.draw_card(painter, card, highlighted == Some(i), dark);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCmd, DrawList};
    use proptest::prelude::*;

    const FRAME_MS: f64 = 16.0;

    fn feed(width: f64, height: f64, seed: u64) -> ScrollFeed {
        let mut f = ScrollFeed::new(seed);
        f.resize(&Surface::resized(width, height, 1.0), 0.0);
        f
    }

    /// Run frames until the phase changes; returns (new phase, time)
    fn run_until_change(f: &mut ScrollFeed, mut now: f64, dt: f64) -> (FeedPhase, f64) {
        let start = f.phase();
        for _ in 0..100_000 {
            now += dt;
            f.update(now);
            if f.phase() != start {
                return (f.phase(), now);
            }
        }
        panic!("phase {:?} never exited", start);
    }

    #[test]
    fn test_seeding_fills_both_columns() {
        let f = feed(500.0, 600.0, 42);
        assert!(!f.cards().is_empty());
        let col_w = (500.0 - GAP * 3.0) / 2.0;
        for card in f.cards() {
            assert_eq!(card.w, col_w);
            assert!(card.h >= 120.0 && card.h < 220.0);
            assert!((1..=3).contains(&card.lines));
        }
        assert!(f.cards().iter().any(|c| c.column == 0));
        assert!(f.cards().iter().any(|c| c.column == 1));
    }

    #[test]
    fn test_narrow_surface_has_no_cards() {
        assert!(feed(50.0, 600.0, 1).cards().is_empty());
        assert!(feed(0.0, 600.0, 1).cards().is_empty());
    }

    #[test]
    fn test_full_cycle_order_and_timing() {
        let mut f = feed(480.0, 640.0, 9);
        assert_eq!(f.phase(), FeedPhase::Scrolling);

        let (phase, t_brake) = run_until_change(&mut f, 0.0, FRAME_MS);
        assert_eq!(phase, FeedPhase::Braking);
        assert!(t_brake > SCROLL_MS && t_brake <= SCROLL_MS + FRAME_MS);

        let (phase, t_snap) = run_until_change(&mut f, t_brake, FRAME_MS);
        assert_eq!(phase, FeedPhase::Snapping);
        assert_eq!(f.speed(), 0.0);
        assert!(f.snap_target().is_some());

        let (phase, t_hold) = run_until_change(&mut f, t_snap, FRAME_MS);
        assert_eq!(phase, FeedPhase::Holding);

        let (phase, t_again) = run_until_change(&mut f, t_hold, FRAME_MS);
        assert_eq!(phase, FeedPhase::Scrolling);
        assert!(t_again - t_hold > HOLD_MS);
        assert_eq!(f.snap_target(), None);

        // Second lap starts its scroll timer afresh
        let (phase, t_brake2) = run_until_change(&mut f, t_again, FRAME_MS);
        assert_eq!(phase, FeedPhase::Braking);
        assert!(t_brake2 - t_again > SCROLL_MS);
    }

    #[test]
    fn test_braking_decays_speed() {
        let mut f = feed(480.0, 640.0, 2);
        let (_, mut now) = run_until_change(&mut f, 0.0, FRAME_MS);
        let mut last = f.speed();
        while f.phase() == FeedPhase::Braking {
            now += FRAME_MS;
            f.update(now);
            if f.phase() == FeedPhase::Braking {
                assert!((f.speed() - last * BRAKE_FACTOR).abs() < 1e-9);
                last = f.speed();
            }
        }
        assert!(last * BRAKE_FACTOR < STOP_SPEED);
    }

    #[test]
    fn test_snap_picks_central_card_and_centers_it() {
        let mut f = feed(480.0, 640.0, 17);
        let mut now = 0.0;
        while f.phase() != FeedPhase::Snapping {
            now += FRAME_MS;
            f.update(now);
        }
        let target = f.snap_target().unwrap();
        assert_eq!(Some(target), f.central_card());

        while f.phase() != FeedPhase::Holding {
            now += FRAME_MS;
            f.update(now);
        }
        let card = &f.cards()[target];
        assert!((card.center_y() - 320.0).abs() < SNAP_EPSILON);
        assert_eq!(f.highlighted(), Some(target));
    }

    #[test]
    fn test_cards_recycle_below_surface() {
        let mut f = feed(480.0, 640.0, 5);
        f.cards_mut()[0].y = -200.0;
        f.cards_mut()[0].h = 100.0;
        f.update(FRAME_MS);
        let card = &f.cards()[0];
        assert_eq!(card.y, 640.0 + RECYCLE_MARGIN);
        assert!(card.h >= 100.0 && card.h < 200.0);
    }

    /// Park card `i` wholly above the recycle line
    fn lift_card(f: &mut ScrollFeed, i: usize) {
        f.cards_mut()[i].y = -200.0;
        f.cards_mut()[i].h = 100.0;
    }

    #[test]
    fn test_cards_recycle_while_braking() {
        let mut f = feed(480.0, 640.0, 5);
        let (phase, now) = run_until_change(&mut f, 0.0, FRAME_MS);
        assert_eq!(phase, FeedPhase::Braking);

        lift_card(&mut f, 0);
        f.update(now + FRAME_MS);
        assert_eq!(f.phase(), FeedPhase::Braking);
        assert_eq!(f.cards()[0].y, 640.0 + RECYCLE_MARGIN);
    }

    #[test]
    fn test_no_recycle_while_snapping() {
        let mut f = feed(480.0, 640.0, 5);
        let (_, now) = run_until_change(&mut f, 0.0, FRAME_MS);
        let (phase, now) = run_until_change(&mut f, now, FRAME_MS);
        assert_eq!(phase, FeedPhase::Snapping);

        let i = if f.snap_target() == Some(0) { 1 } else { 0 };
        lift_card(&mut f, i);
        f.update(now + FRAME_MS);
        // Only the snap nudge moves it
        let y = f.cards()[i].y;
        assert!((y + 200.0).abs() < 50.0, "card moved to {y}");
    }

    #[test]
    fn test_no_recycle_while_holding() {
        let mut f = feed(480.0, 640.0, 5);
        let mut now = 0.0;
        for _ in 0..3 {
            now = run_until_change(&mut f, now, FRAME_MS).1;
        }
        assert_eq!(f.phase(), FeedPhase::Holding);

        lift_card(&mut f, 0);
        f.update(now + FRAME_MS);
        assert_eq!(f.phase(), FeedPhase::Holding);
        assert_eq!(f.cards()[0].y, -200.0);
    }

    #[test]
    fn test_card_count_is_stable() {
        let mut f = feed(480.0, 640.0, 5);
        let count = f.cards().len();
        for i in 0..2_000 {
            f.update(i as f64 * FRAME_MS);
        }
        assert_eq!(f.cards().len(), count);
    }

    #[test]
    fn test_empty_feed_still_cycles() {
        let mut f = feed(10.0, 640.0, 3);
        let mut phase = f.phase();
        let mut now = 0.0;
        for _ in 0..4 {
            let (next, t) = run_until_change(&mut f, now, FRAME_MS);
            assert_eq!(next, phase.next());
            phase = next;
            now = t;
        }
        assert_eq!(phase, FeedPhase::Scrolling);
    }

    #[test]
    fn test_only_target_is_highlighted() {
        let mut f = feed(480.0, 640.0, 8);
        let mut now = 0.0;
        while f.phase() != FeedPhase::Holding {
            now += FRAME_MS;
            f.update(now);
        }
        let mut list = DrawList::new();
        f.draw(&mut list, Theme::Dark);
        let strokes = list.count(|c| matches!(c, DrawCmd::RoundedRect { stroke: Some(_), .. }));
        assert_eq!(strokes, 1);
    }

    #[test]
    fn test_resize_restarts_cycle() {
        let mut f = feed(480.0, 640.0, 8);
        let mut now = 0.0;
        while f.phase() != FeedPhase::Holding {
            now += FRAME_MS;
            f.update(now);
        }
        f.resize(&Surface::resized(600.0, 700.0, 2.0), now);
        assert_eq!(f.phase(), FeedPhase::Scrolling);
        assert_eq!(f.highlighted(), None);
        assert_eq!(f.speed(), BASE_SPEED);
    }

    proptest! {
        /// Every transition is to the successor phase, whatever the frame rate
        #[test]
        fn phases_follow_the_cycle(seed in any::<u64>(), dt in 4.0f64..120.0) {
            let mut f = feed(480.0, 640.0, seed);
            let mut now = 0.0;
            let mut transitions = 0;
            while transitions < 8 {
                let before = f.phase();
                now += dt;
                f.update(now);
                if f.phase() != before {
                    prop_assert_eq!(f.phase(), before.next());
                    transitions += 1;
                }
                prop_assert!(now < 1.0e6);
            }
        }
    }
}
