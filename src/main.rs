//! Amblify canvas entry point
//!
//! On the web: installs logging and mounts every animated canvas on the page.
//! Natively: runs each engine headless against a draw list and logs a summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

    log::info!("Amblify canvas starting...");
    let settings = amblify_canvas::Settings::load();
    let mounted = amblify_canvas::platform::web::mount_all(&settings);
    log::info!("Mounted {} animation(s)", mounted);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Amblify canvas (native) starting...");
    log::info!("Native mode runs the engines headless - build for wasm32 to see them");

    headless::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use amblify_canvas::renderer::DrawList;
    use amblify_canvas::sim::{GrowthGraph, NetworkGraph, RunPhase, RunnerGame, ScrollFeed};
    use amblify_canvas::surface::MountOutcome;
    use amblify_canvas::{Animation, Driver, SessionScores, Settings, Surface};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const FRAMES: u32 = 600;

    /// Mount on an 800x400 surface and run `FRAMES` frames
    fn drive<A: Animation>(name: &str, engine: A, settings: &Settings) -> Driver<A> {
        let mut driver = Driver::new(engine, settings.clone());
        let mut painter = DrawList::new();
        let surface = Surface::resized(800.0, 400.0, 1.0);
        if driver.mount(surface, 0.0, &mut painter) == MountOutcome::Static {
            log::info!("{name}: static (reduced motion)");
            return driver;
        }
        let mut commands = 0;
        for i in 1..=FRAMES {
            painter.reset();
            driver.frame(f64::from(i) * FRAME_MS, &mut painter);
            commands += painter.len();
        }
        log::info!(
            "{name}: {} frames, {:.1} draw commands/frame",
            driver.frame_loop().frames(),
            commands as f64 / f64::from(FRAMES)
        );
        driver
    }

    pub fn run() {
        let settings = Settings::load();
        let seed = 42;

        let feed = drive("feed", ScrollFeed::new(seed), &settings);
        log::info!("feed: ended in {:?}", feed.engine().phase());

        let network = drive("network", NetworkGraph::new(seed), &settings);
        let linked = network.engine().nodes().iter().filter(|n| n.connected).count();
        log::info!("network: {linked} node(s) linked to the hub");

        let growth = drive("growth", GrowthGraph::new(seed), &settings);
        log::info!("growth: {} bar(s)", growth.engine().bars().len());

        let scores = SessionScores::new();
        let mut game = RunnerGame::new(seed, scores.clone());
        game.activate();
        let game = drive("runner", game, &settings);
        let game = game.engine();
        if game.phase() == RunPhase::GameOver {
            log::info!("runner: game over at {:.0}, best {}", game.score().floor(), scores.display_best());
        } else {
            log::info!("runner: still running at {:.0}", game.score().floor());
        }
    }
}
