//! Browser binding (WASM only)
//!
//! Mounts engines on `<canvas>` elements, schedules frames with
//! `requestAnimationFrame` and keeps every closure it registers so that
//! `unmount` can remove them again. Anything missing on the page makes the
//! mount a silent no-op.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Element, EventTarget, HtmlCanvasElement, KeyboardEvent};

use super::{EngineKind, InputEvent};
use crate::chat::{ChatClient, ChatConfig, ChatSession, ChatTurn, FetchTransport};
use crate::highscores::SessionScores;
use crate::renderer::CanvasPainter;
use crate::settings::{Settings, Theme};
use crate::sim::{GrowthGraph, NetworkGraph, RunnerGame, ScrollFeed};
use crate::surface::{Animation, Driver, LoopState, MountOutcome, Surface, SurfaceError};

/// Wait before the first measurement so the container has laid out
pub const INIT_DELAY_MS: i32 = 50;

thread_local! {
    static MOUNTS: RefCell<Vec<Mounted>> = const { RefCell::new(Vec::new()) };
    static SCORES: SessionScores = SessionScores::new();
}

/// Page clock in milliseconds, same origin as rAF timestamps
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

/// Browser handles owned by one mount
#[derive(Default)]
struct Handles {
    timeout: Cell<Option<i32>>,
    frame: Cell<Option<i32>>,
    init: RefCell<Option<Closure<dyn FnMut()>>>,
    tick: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    listeners: RefCell<Vec<Listener>>,
}

struct Instance<A: Animation> {
    label: &'static str,
    canvas: HtmlCanvasElement,
    container: Element,
    painter: RefCell<CanvasPainter>,
    driver: RefCell<Driver<A>>,
    handles: Handles,
}

impl<A: Animation + 'static> Instance<A> {
    fn create(
        label: &'static str,
        canvas: HtmlCanvasElement,
        engine: A,
        settings: Settings,
    ) -> Result<Rc<Self>, SurfaceError> {
        let container = canvas.parent_element().ok_or(SurfaceError::MissingContainer)?;
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(SurfaceError::NoContext)?;

        Ok(Rc::new(Self {
            label,
            canvas,
            container,
            painter: RefCell::new(CanvasPainter::new(ctx)),
            driver: RefCell::new(Driver::new(engine, settings)),
            handles: Handles::default(),
        }))
    }

    fn measure(&self) -> Result<Surface, SurfaceError> {
        let rect = self.container.get_bounding_client_rect();
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        Surface::measure(rect.width(), rect.height(), dpr)
    }

    /// Resize the backing buffer; resets the context transform, so reapply it
    fn apply_surface(&self, surface: &Surface) {
        let (w, h) = surface.buffer_size();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        self.painter.borrow().apply_surface(surface);
    }

    fn listen(
        &self,
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        if let Err(err) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
            log::warn!("Failed to add {} listener: {:?}", event, err);
            return;
        }
        self.handles.listeners.borrow_mut().push(Listener {
            target: target.clone(),
            event,
            closure,
        });
    }

    fn schedule_init(self: &Rc<Self>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let this = Rc::clone(self);
        let init = Closure::<dyn FnMut()>::new(move || {
            this.handles.timeout.set(None);
            if let Err(err) = this.start() {
                log::debug!("{} animation not started: {}", this.label, err);
            }
        });
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            init.as_ref().unchecked_ref(),
            INIT_DELAY_MS,
        ) {
            Ok(id) => self.handles.timeout.set(Some(id)),
            Err(err) => log::warn!("setTimeout failed: {:?}", err),
        }
        *self.handles.init.borrow_mut() = Some(init);
    }

    fn start(self: &Rc<Self>) -> Result<(), SurfaceError> {
        if self.driver.borrow().frame_loop().state() == LoopState::TornDown {
            return Ok(());
        }
        let surface = self.measure()?;
        self.apply_surface(&surface);

        let outcome = {
            let mut painter = self.painter.borrow_mut();
            self.driver.borrow_mut().mount(surface, now_ms(), &mut *painter)
        };
        if outcome == MountOutcome::Static {
            return Ok(());
        }

        if let Some(window) = web_sys::window() {
            let this = Rc::clone(self);
            self.listen(&window, "resize", move |_event| match this.measure() {
                Ok(surface) => {
                    this.apply_surface(&surface);
                    this.driver.borrow_mut().resize(surface, now_ms());
                }
                Err(err) => log::debug!("{} resize skipped: {}", this.label, err),
            });
        }
        self.run_frames();
        log::info!("{} animation running at {}x{}", self.label, surface.width, surface.height);
        Ok(())
    }

    fn run_frames(self: &Rc<Self>) {
        let this = Rc::clone(self);
        let tick = Closure::<dyn FnMut(f64)>::new(move |now: f64| {
            this.handles.frame.set(None);
            let fired = {
                let mut driver = this.driver.borrow_mut();
                driver.set_theme(Theme::from_document());
                let mut painter = this.painter.borrow_mut();
                driver.frame(now, &mut *painter)
            };
            if fired {
                this.request_frame();
            }
        });
        *self.handles.tick.borrow_mut() = Some(tick);
        self.request_frame();
    }

    fn request_frame(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let tick = self.handles.tick.borrow();
        let Some(tick) = tick.as_ref() else {
            return;
        };
        match window.request_animation_frame(tick.as_ref().unchecked_ref()) {
            Ok(id) => self.handles.frame.set(Some(id)),
            Err(err) => log::warn!("requestAnimationFrame failed: {:?}", err),
        }
    }

    /// Cancel everything scheduled, drop every listener, end the loop
    fn unmount(&self) {
        if let Some(window) = web_sys::window() {
            if let Some(id) = self.handles.frame.take() {
                let _ = window.cancel_animation_frame(id);
            }
            if let Some(id) = self.handles.timeout.take() {
                window.clear_timeout_with_handle(id);
            }
        }
        for listener in self.handles.listeners.borrow_mut().drain(..) {
            let _ = listener
                .target
                .remove_event_listener_with_callback(listener.event, listener.closure.as_ref().unchecked_ref());
        }
        self.driver.borrow_mut().teardown();
        // Closures hold an Rc back to this instance
        self.handles.tick.borrow_mut().take();
        self.handles.init.borrow_mut().take();
        log::info!("{} animation unmounted", self.label);
    }
}

impl Instance<RunnerGame> {
    fn listen_for_activation(self: &Rc<Self>) {
        if let Some(window) = web_sys::window() {
            let this = Rc::clone(self);
            self.listen(&window, "keydown", move |event| {
                let code = event
                    .dyn_ref::<KeyboardEvent>()
                    .map(|k| k.code())
                    .unwrap_or_default();
                this.handle_input(&event, InputEvent::KeyDown { code });
            });
        }
        let this = Rc::clone(self);
        self.listen(&self.canvas, "mousedown", move |event| {
            this.handle_input(&event, InputEvent::PointerDown);
        });
        let this = Rc::clone(self);
        self.listen(&self.canvas, "touchstart", move |event| {
            this.handle_input(&event, InputEvent::TouchStart);
        });
    }

    fn handle_input(&self, event: &web_sys::Event, input: InputEvent) {
        let response = input.response();
        if response.prevent_default {
            event.prevent_default();
        }
        if !response.activate || !self.driver.borrow().is_running() {
            return;
        }
        let outcome = self.driver.borrow_mut().engine_mut().activate();
        log::trace!("Runner input {:?} -> {:?}", input, outcome);
    }
}

/// A live mount. Dropping it leaves the animation running; call `unmount`.
pub struct Mounted {
    label: &'static str,
    teardown: Box<dyn Fn()>,
}

impl Mounted {
    fn new<A: Animation + 'static>(instance: Rc<Instance<A>>) -> Self {
        Self {
            label: instance.label,
            teardown: Box::new(move || instance.unmount()),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn unmount(self) {
        (self.teardown)();
    }
}

/// Mount an engine on a canvas; the loop starts after `INIT_DELAY_MS`
pub fn mount<A: Animation + 'static>(
    label: &'static str,
    canvas: HtmlCanvasElement,
    engine: A,
    settings: Settings,
) -> Result<Mounted, SurfaceError> {
    let instance = Instance::create(label, canvas, engine, settings)?;
    instance.schedule_init();
    Ok(Mounted::new(instance))
}

/// Mount the runner game and wire its input listeners
pub fn mount_runner(
    canvas: HtmlCanvasElement,
    game: RunnerGame,
    settings: Settings,
) -> Result<Mounted, SurfaceError> {
    let instance = Instance::create(EngineKind::Runner.as_str(), canvas, game, settings)?;
    instance.listen_for_activation();
    instance.schedule_init();
    Ok(Mounted::new(instance))
}

/// Look up a canvas by element id
pub fn canvas_by_id(id: &str) -> Result<HtmlCanvasElement, SurfaceError> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or_else(|| SurfaceError::MissingCanvas(id.to_string()))
}

fn mount_kind(kind: EngineKind, canvas: HtmlCanvasElement, seed: u64, settings: &Settings) -> Result<Mounted, SurfaceError> {
    let label = kind.as_str();
    match kind {
        EngineKind::Feed => mount(label, canvas, ScrollFeed::new(seed), settings.clone()),
        EngineKind::Network => mount(label, canvas, NetworkGraph::new(seed), settings.clone()),
        EngineKind::Growth => mount(label, canvas, GrowthGraph::new(seed), settings.clone()),
        EngineKind::Runner => {
            let scores = SCORES.with(SessionScores::clone);
            mount_runner(canvas, RunnerGame::new(seed, scores), settings.clone())
        }
    }
}

/// Mount every `canvas[data-animation]` on the page. Returns how many mounted.
pub fn mount_all(settings: &Settings) -> usize {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return 0;
    };
    let selector = format!("canvas[{}]", EngineKind::ATTRIBUTE);
    let Ok(nodes) = document.query_selector_all(&selector) else {
        return 0;
    };

    let seed = js_sys::Date::now() as u64;
    let mut mounted = 0;
    for i in 0..nodes.length() {
        let Some(canvas) = nodes.item(i).and_then(|n| n.dyn_into::<HtmlCanvasElement>().ok()) else {
            continue;
        };
        let attr = canvas.get_attribute(EngineKind::ATTRIBUTE).unwrap_or_default();
        let Some(kind) = EngineKind::from_attr(&attr) else {
            log::debug!("Unknown animation '{}'", attr);
            continue;
        };
        match mount_kind(kind, canvas, seed.wrapping_add(i as u64), settings) {
            Ok(m) => {
                MOUNTS.with(|mounts| mounts.borrow_mut().push(m));
                mounted += 1;
            }
            Err(err) => log::debug!("Skipping {} canvas: {}", kind.as_str(), err),
        }
    }
    mounted
}

/// Tear down every mounted animation
#[wasm_bindgen]
pub fn unmount_all() {
    let mounts = MOUNTS.with(|mounts| std::mem::take(&mut *mounts.borrow_mut()));
    for m in mounts {
        m.unmount();
    }
}

/// Advance the theme switcher; returns the new theme name
#[wasm_bindgen]
pub fn cycle_theme() -> String {
    let theme = Theme::from_document().next();
    theme.apply();
    theme.as_str().to_string()
}

/// Switch to a named theme (`light`, `dark`, `cloud`). Unknown names are ignored.
#[wasm_bindgen]
pub fn set_theme(name: &str) -> bool {
    match Theme::from_str(name) {
        Some(theme) => {
            theme.apply();
            true
        }
        None => {
            log::debug!("Unknown theme '{}'", name);
            false
        }
    }
}

/// Stateless chat entry: `history_json` is a JSON array of `{speaker, text}`.
/// The key comes from the host page at runtime; without one the reply is the
/// missing-key fallback.
#[wasm_bindgen]
pub async fn chat_send(
    history_json: String,
    message: String,
    api_key: Option<String>,
    model: Option<String>,
) -> String {
    let history: Vec<ChatTurn> = match serde_json::from_str(&history_json) {
        Ok(history) => history,
        Err(err) => {
            log::warn!("Bad chat history: {}", err);
            Vec::new()
        }
    };
    let client = ChatClient::new(ChatConfig::from_values(api_key, model), FetchTransport);
    client.generate_response(&history, &message).await
}

/// The assistant panel: owns the visible conversation and its send cycle
#[wasm_bindgen]
pub struct ChatPanel {
    session: Rc<ChatSession<FetchTransport>>,
}

#[wasm_bindgen]
impl ChatPanel {
    #[wasm_bindgen(constructor)]
    pub fn new(api_key: Option<String>, model: Option<String>) -> ChatPanel {
        let client = ChatClient::new(ChatConfig::from_values(api_key, model), FetchTransport);
        ChatPanel {
            session: Rc::new(ChatSession::new(client)),
        }
    }

    /// Conversation as a JSON array of `{speaker, text}`, greeting first
    pub fn messages_json(&self) -> String {
        match serde_json::to_string(self.session.widget().messages()) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Failed to encode chat messages: {}", err);
                "[]".to_string()
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.session.widget().is_loading()
    }

    /// Resolves to the reply text, or `null` when the input was rejected
    pub fn send(&self, input: String) -> js_sys::Promise {
        let session = Rc::clone(&self.session);
        wasm_bindgen_futures::future_to_promise(async move {
            Ok(session.send(&input).await.map_or(JsValue::NULL, JsValue::from))
        })
    }
}
