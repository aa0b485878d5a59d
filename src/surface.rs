//! Drawing surface sizing and the frame-loop driver
//!
//! A `Surface` maps the hosting container's CSS box onto a device-pixel
//! buffer. A `FrameLoop` tracks whether per-frame callbacks may still fire,
//! and a `Driver` ties one `Animation` to both.

use thiserror::Error;

use crate::renderer::Painter;
use crate::settings::{Settings, Theme};

/// Reasons an engine declines to initialize. All of them are silent no-ops
/// for the page; they only surface in the log.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("canvas element not found: {0}")]
    MissingCanvas(String),

    #[error("canvas has no hosting container")]
    MissingContainer,

    #[error("2D drawing context unavailable")]
    NoContext,

    #[error("container has no area ({width}x{height})")]
    ZeroSize { width: f64, height: f64 },
}

/// Logical drawing area plus device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    /// Width in CSS pixels
    pub width: f64,
    /// Height in CSS pixels
    pub height: f64,
    /// Device pixel ratio
    pub scale: f64,
}

impl Surface {
    /// Build a surface from a measured container box.
    ///
    /// Rejects boxes without area; an unusable ratio falls back to 1.
    pub fn measure(width: f64, height: f64, device_pixel_ratio: f64) -> Result<Self, SurfaceError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(SurfaceError::ZeroSize { width, height });
        }
        Ok(Self::resized(width, height, device_pixel_ratio))
    }

    /// Lenient variant used on window resize: a collapsed container yields an
    /// empty surface instead of an error
    pub fn resized(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        let clean = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        let scale = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            width: clean(width),
            height: clean(height),
            scale,
        }
    }

    /// Backing buffer size in device pixels
    pub fn buffer_size(&self) -> (u32, u32) {
        (
            (self.width * self.scale).floor() as u32,
            (self.height * self.scale).floor() as u32,
        )
    }

    /// Canvas transform `(a, b, c, d, e, f)` mapping CSS pixels to device pixels
    pub fn transform(&self) -> [f64; 6] {
        [self.scale, 0.0, 0.0, self.scale, 0.0, 0.0]
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Lifecycle of a recurring frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
    /// Terminal: the callback has been deregistered for good
    TornDown,
}

/// Cancellable frame-loop bookkeeping.
///
/// The browser binding checks `tick()` at the top of every
/// `requestAnimationFrame` callback, so a callback that was already queued
/// when teardown happened does nothing.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    state: LoopState,
    frames: u64,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames delivered since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Start (or resume) the loop. Returns false once torn down.
    pub fn start(&mut self) -> bool {
        if self.state == LoopState::TornDown {
            log::warn!("start() on a torn-down frame loop ignored");
            return false;
        }
        self.state = LoopState::Running;
        true
    }

    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Stopped;
        }
    }

    pub fn teardown(&mut self) {
        self.state = LoopState::TornDown;
    }

    pub fn should_fire(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Consume one frame if the loop is running
    pub fn tick(&mut self) -> bool {
        if self.should_fire() {
            self.frames += 1;
            true
        } else {
            false
        }
    }
}

/// A self-contained per-frame effect: flat update/draw over its own records
pub trait Animation {
    /// Whether the effect stays static when the user prefers reduced motion
    const HONORS_REDUCED_MOTION: bool = false;

    /// Re-derive geometry for a new surface (engines usually reseed here)
    fn resize(&mut self, surface: &Surface, now_ms: f64);

    /// Advance the simulation by one frame
    fn update(&mut self, now_ms: f64);

    /// Draw the current state in logical pixels
    fn draw(&self, painter: &mut dyn Painter, theme: Theme);

    /// Capture text metrics once a painter is available
    fn measure(&mut self, _painter: &mut dyn Painter) {}

    /// Ask the driver for another `measure` before the next update
    fn wants_measure(&self) -> bool {
        false
    }
}

/// Result of mounting an animation on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// Frame loop started
    Running,
    /// Reduced motion: nothing initialized, surface left blank
    Static,
}

/// Owns one engine, its surface and its frame loop
pub struct Driver<A: Animation> {
    engine: A,
    surface: Surface,
    frame_loop: FrameLoop,
    settings: Settings,
}

impl<A: Animation> Driver<A> {
    pub fn new(engine: A, settings: Settings) -> Self {
        Self {
            engine,
            surface: Surface::resized(0.0, 0.0, 1.0),
            frame_loop: FrameLoop::new(),
            settings,
        }
    }

    /// Size the engine and start the loop, unless reduced motion applies
    pub fn mount(&mut self, surface: Surface, now_ms: f64, painter: &mut dyn Painter) -> MountOutcome {
        self.surface = surface;
        if self.settings.reduced_motion && A::HONORS_REDUCED_MOTION {
            log::info!("Reduced motion preferred, leaving surface static");
            painter.clear(surface.width, surface.height);
            self.frame_loop.teardown();
            return MountOutcome::Static;
        }
        self.engine.resize(&surface, now_ms);
        self.engine.measure(painter);
        self.frame_loop.start();
        MountOutcome::Running
    }

    /// Apply a new surface after a window resize
    pub fn resize(&mut self, surface: Surface, now_ms: f64) {
        self.surface = surface;
        if self.frame_loop.state() != LoopState::TornDown {
            self.engine.resize(&surface, now_ms);
        }
    }

    /// Run one frame: clear, update, draw. Returns false if the loop is not running.
    pub fn frame(&mut self, now_ms: f64, painter: &mut dyn Painter) -> bool {
        if !self.frame_loop.tick() {
            return false;
        }
        painter.clear(self.surface.width, self.surface.height);
        if self.engine.wants_measure() {
            self.engine.measure(painter);
        }
        self.engine.update(now_ms);
        self.engine.draw(painter, self.settings.theme);
        true
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.settings.theme = theme;
    }

    pub fn stop(&mut self) {
        self.frame_loop.stop();
    }

    pub fn resume(&mut self) -> bool {
        self.frame_loop.start()
    }

    pub fn teardown(&mut self) {
        self.frame_loop.teardown();
        log::debug!("Frame loop torn down after {} frames", self.frame_loop.frames());
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.should_fire()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    pub fn engine(&self) -> &A {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut A {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCmd, DrawList};

    #[derive(Default)]
    struct Counter {
        updates: u32,
        resizes: u32,
    }

    impl Animation for Counter {
        fn resize(&mut self, _surface: &Surface, _now_ms: f64) {
            self.resizes += 1;
        }
        fn update(&mut self, _now_ms: f64) {
            self.updates += 1;
        }
        fn draw(&self, _painter: &mut dyn Painter, _theme: Theme) {}
    }

    /// Requests one re-measure per `stale` flag
    #[derive(Default)]
    struct Fonts {
        measures: u32,
        stale: bool,
    }

    impl Animation for Fonts {
        fn resize(&mut self, _surface: &Surface, _now_ms: f64) {}
        fn update(&mut self, _now_ms: f64) {}
        fn draw(&self, _painter: &mut dyn Painter, _theme: Theme) {}
        fn measure(&mut self, _painter: &mut dyn Painter) {
            self.measures += 1;
            self.stale = false;
        }
        fn wants_measure(&self) -> bool {
            self.stale
        }
    }

    #[derive(Default)]
    struct Calm(Counter);

    impl Animation for Calm {
        const HONORS_REDUCED_MOTION: bool = true;
        fn resize(&mut self, s: &Surface, now: f64) {
            self.0.resize(s, now)
        }
        fn update(&mut self, now: f64) {
            self.0.update(now)
        }
        fn draw(&self, _painter: &mut dyn Painter, _theme: Theme) {}
    }

    #[test]
    fn test_measure_scales_buffer() {
        let s = Surface::measure(300.0, 150.5, 2.0).unwrap();
        assert_eq!(s.buffer_size(), (600, 301));
        assert_eq!(s.transform(), [2.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_measure_rejects_zero_box() {
        assert!(matches!(
            Surface::measure(0.0, 100.0, 1.0),
            Err(SurfaceError::ZeroSize { .. })
        ));
        assert!(Surface::measure(f64::NAN, 100.0, 1.0).is_err());
    }

    #[test]
    fn test_bad_ratio_falls_back_to_one() {
        assert_eq!(Surface::resized(10.0, 10.0, 0.0).scale, 1.0);
        assert_eq!(Surface::resized(10.0, 10.0, f64::INFINITY).scale, 1.0);
        assert!(Surface::resized(-5.0, 10.0, 1.0).is_empty());
    }

    #[test]
    fn test_no_frames_after_teardown() {
        let mut driver = Driver::new(Counter::default(), Settings::default());
        let mut list = DrawList::new();
        let surface = Surface::measure(100.0, 100.0, 1.0).unwrap();
        assert_eq!(driver.mount(surface, 0.0, &mut list), MountOutcome::Running);

        assert!(driver.frame(16.0, &mut list));
        driver.teardown();
        assert!(!driver.frame(32.0, &mut list));
        assert!(!driver.resume());
        assert!(!driver.frame(48.0, &mut list));
        assert_eq!(driver.engine().updates, 1);
    }

    #[test]
    fn test_stop_and_resume() {
        let mut driver = Driver::new(Counter::default(), Settings::default());
        let mut list = DrawList::new();
        driver.mount(Surface::resized(50.0, 50.0, 1.0), 0.0, &mut list);
        driver.stop();
        assert!(!driver.frame(1.0, &mut list));
        assert!(driver.resume());
        assert!(driver.frame(2.0, &mut list));
        assert_eq!(driver.frame_loop().frames(), 1);
    }

    #[test]
    fn test_frame_clears_logical_area() {
        let mut driver = Driver::new(Counter::default(), Settings::default());
        let mut list = DrawList::new();
        driver.mount(Surface::resized(120.0, 80.0, 3.0), 0.0, &mut list);
        driver.frame(1.0, &mut list);
        assert!(list.commands().contains(&DrawCmd::Clear {
            width: 120.0,
            height: 80.0
        }));
    }

    #[test]
    fn test_reduced_motion_skips_initialization() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let mut driver = Driver::new(Calm::default(), settings.clone());
        let mut list = DrawList::new();
        let outcome = driver.mount(Surface::resized(100.0, 100.0, 1.0), 0.0, &mut list);
        assert_eq!(outcome, MountOutcome::Static);
        assert!(!driver.frame(1.0, &mut list));
        driver.resize(Surface::resized(200.0, 100.0, 1.0), 2.0);
        assert_eq!(driver.engine().0.resizes, 0);
        assert_eq!(driver.engine().0.updates, 0);

        // Effects that ignore the preference keep animating
        let mut other = Driver::new(Counter::default(), settings);
        let outcome = other.mount(Surface::resized(100.0, 100.0, 1.0), 0.0, &mut list);
        assert_eq!(outcome, MountOutcome::Running);
    }

    #[test]
    fn test_frame_measures_only_on_request() {
        let mut driver = Driver::new(Fonts::default(), Settings::default());
        let mut list = DrawList::new();
        driver.mount(Surface::resized(100.0, 100.0, 1.0), 0.0, &mut list);
        assert_eq!(driver.engine().measures, 1);

        driver.frame(16.0, &mut list);
        assert_eq!(driver.engine().measures, 1);

        driver.engine_mut().stale = true;
        driver.frame(32.0, &mut list);
        driver.frame(48.0, &mut list);
        assert_eq!(driver.engine().measures, 2);
    }
}
