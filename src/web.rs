//! Browser host: canvas, sprite images, input listeners and the
//! `requestAnimationFrame` loop. Everything here just feeds the core.
//!
//! The entry point builds one [`Game`] and shares it through `Rc<RefCell<_>>`
//! with the frame callback and every listener; handlers run to completion one
//! at a time, so borrows never overlap.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{error, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, Event, EventTarget, HtmlCanvasElement, HtmlElement,
    HtmlImageElement, KeyboardEvent, Performance, window,
};

use crate::clock::{GameLoop, TimeSource};
use crate::config::{HostConfig, Tuning};
use crate::error::GameError;
use crate::session::Session;
use crate::sprite::{Blit, ClockHand, SpriteSheet};
use crate::telemetry;

struct PerformanceClock(Performance);

impl TimeSource for PerformanceClock {
    fn now(&self) -> f64 {
        self.0.now()
    }
}

/// Canvas plus the three images it is painted from.
struct Stage {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    background: HtmlImageElement,
    worker_sprites: HtmlImageElement,
    supervisor_sprites: HtmlImageElement,
    status: HtmlElement,
    last_status: String,
}

impl Stage {
    fn clear_and_draw_background(&self) -> Result<(), JsValue> {
        self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(
                &self.background,
                0.0,
                0.0,
                self.width,
                self.height,
            )
    }

    fn draw_clock_hand(&self, hand: ClockHand) {
        self.ctx.set_stroke_style_str(ClockHand::COLOR);
        self.ctx.set_line_width(ClockHand::WIDTH);
        self.ctx.begin_path();
        self.ctx.move_to(hand.from.0, hand.from.1);
        self.ctx.line_to(hand.to.0, hand.to.1);
        self.ctx.stroke();
    }

    fn blit(&self, image: &HtmlImageElement, Blit { src, dst }: Blit) -> Result<(), JsValue> {
        self.ctx
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image, src.x, src.y, src.w, src.h, dst.x, dst.y, dst.w, dst.h,
            )
    }

    fn set_status(&mut self, text: &str) {
        if self.last_status != text {
            self.status.set_text_content(Some(text));
            self.last_status = text.to_string();
        }
    }
}

struct Game {
    game_loop: GameLoop,
    stage: Stage,
    time: PerformanceClock,
    config: HostConfig,
}

impl Game {
    fn frame(&mut self) -> Result<(), JsValue> {
        if !self.game_loop.is_paused() {
            self.stage.clear_and_draw_background()?;
        }
        if self.game_loop.frame_at(&self.time).is_none() {
            return Ok(());
        }
        let session = self.game_loop.session();
        self.stage
            .draw_clock_hand(ClockHand::at(session.active_ms(), session.tuning().ms_per_hour));
        if let Some(frame) = session.supervisor().frame() {
            self.stage
                .blit(&self.stage.supervisor_sprites, SpriteSheet::SUPERVISOR.blit(frame))?;
        }
        if let Some(frame) = session.worker().frame() {
            self.stage
                .blit(&self.stage.worker_sprites, SpriteSheet::WORKER.blit(frame))?;
        }
        let status = session.status_text();
        self.stage.set_status(&status);
        Ok(())
    }
}

type Shared = Rc<RefCell<Game>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Handle returned to JS; keeps the game reachable for debugging and for
/// pausing from page code.
#[wasm_bindgen]
pub struct GameHandle {
    game: Shared,
    callback: FrameCallback,
}

#[wasm_bindgen]
impl GameHandle {
    pub fn status(&self) -> String {
        self.game.borrow().game_loop.session().status_text()
    }

    pub fn pause(&self) {
        self.game.borrow_mut().game_loop.set_paused(true);
    }

    pub fn resume(&self) -> Result<(), JsValue> {
        self.game.borrow_mut().game_loop.set_paused(false);
        schedule(&self.game, &self.callback)?;
        Ok(())
    }
}

#[cfg(feature = "serde_json")]
#[wasm_bindgen]
impl GameHandle {
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        let snapshot = self.game.borrow().game_loop.session().snapshot();
        serde_json::to_string(&snapshot).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

fn element<T: JsCast>(doc: &Document, id: &str, expected: &'static str) -> Result<T, GameError> {
    doc.get_element_by_id(id)
        .ok_or_else(|| GameError::MissingElement(id.to_string()))?
        .dyn_into::<T>()
        .map_err(|_| GameError::WrongElementType {
            id: id.to_string(),
            expected,
        })
}

fn add_listener(
    target: &EventTarget,
    kind: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), GameError> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// True on iOS and Android, which get touch listeners instead of mouse ones.
pub fn is_mobile_agent(platform: &str, user_agent: &str) -> bool {
    let ios = ["iPad", "iPhone", "iPod"].iter().any(|p| platform.contains(p));
    ios || user_agent.contains("Android")
}

pub fn start(config: HostConfig) -> Result<GameHandle, GameError> {
    telemetry::init(config.max_level());
    let win = window().ok_or(GameError::NoWindow)?;
    let doc = win.document().ok_or(GameError::NoDocument)?;
    let performance = win.performance().ok_or(GameError::NoPerformance)?;

    let canvas: HtmlCanvasElement = element(&doc, &config.canvas_id, "canvas")?;
    canvas.set_width(config.canvas_width);
    canvas.set_height(config.canvas_height);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or(GameError::NoContext2d)?
        .dyn_into()
        .map_err(|_| GameError::NoContext2d)?;

    let status: HtmlElement = element(&doc, &config.status_id, "html element")?;
    status.set_text_content(Some("Loading..."));

    let stage = Stage {
        ctx,
        width: f64::from(config.canvas_width),
        height: f64::from(config.canvas_height),
        background: element(&doc, &config.background_id, "img")?,
        worker_sprites: element(&doc, &config.worker_sprites_id, "img")?,
        supervisor_sprites: element(&doc, &config.supervisor_sprites_id, "img")?,
        status,
        last_status: "Loading...".to_string(),
    };
    let images = [
        stage.background.clone(),
        stage.worker_sprites.clone(),
        stage.supervisor_sprites.clone(),
    ];

    let mut rng = SmallRng::from_entropy();
    let session = Session::new(Tuning::default(), &mut rng)?;
    let game: Shared = Rc::new(RefCell::new(Game {
        game_loop: GameLoop::new(session, Box::new(rng)),
        stage,
        time: PerformanceClock(performance),
        config,
    }));
    let callback: FrameCallback = Rc::new(RefCell::new(None));

    let (ready_game, ready_callback) = (game.clone(), callback.clone());
    when_loaded(&images, move || {
        if let Err(err) = begin(&ready_game, &ready_callback) {
            error!(%err, "could not start the game");
        }
    })?;

    Ok(GameHandle { game, callback })
}

/// Runs `on_ready` once every image has finished loading.
fn when_loaded(
    images: &[HtmlImageElement],
    on_ready: impl FnOnce() + 'static,
) -> Result<(), GameError> {
    let waiting: Vec<&HtmlImageElement> = images.iter().filter(|i| !i.complete()).collect();
    if waiting.is_empty() {
        on_ready();
        return Ok(());
    }
    let pending = Rc::new(Cell::new(waiting.len()));
    let on_ready = Rc::new(RefCell::new(Some(on_ready)));
    for image in waiting {
        let (pending, on_ready) = (pending.clone(), on_ready.clone());
        add_listener(image, "load", move |_| {
            pending.set(pending.get().saturating_sub(1));
            if pending.get() == 0 {
                let ready = on_ready.borrow_mut().take();
                if let Some(ready) = ready {
                    ready();
                }
            }
        })?;
    }
    Ok(())
}

fn begin(game: &Shared, callback: &FrameCallback) -> Result<(), GameError> {
    {
        let mut g = game.borrow_mut();
        let status = g.game_loop.session().status_text();
        g.stage.set_status(&status);
    }
    listen(game, callback)?;

    let (frame_game, frame_callback) = (game.clone(), callback.clone());
    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        if let Err(err) = frame_game.borrow_mut().frame() {
            error!(?err, "frame failed");
        }
        if let Err(err) = schedule(&frame_game, &frame_callback) {
            error!(%err, "could not schedule next frame");
        }
    }) as Box<dyn FnMut(f64)>));
    info!("images ready, game loop starting");
    schedule(game, callback)
}

/// Arms one animation frame unless one is already pending, the game is
/// paused, or the frame callback does not exist yet.
fn schedule(game: &Shared, callback: &FrameCallback) -> Result<(), GameError> {
    let callback = callback.borrow();
    let Some(cb) = callback.as_ref() else {
        return Ok(());
    };
    if !game.borrow_mut().game_loop.request_frame() {
        return Ok(());
    }
    let armed = window()
        .ok_or(GameError::NoWindow)
        .and_then(|win| Ok(win.request_animation_frame(cb.as_ref().unchecked_ref())?));
    if armed.is_err() {
        game.borrow_mut().game_loop.cancel_request();
    }
    armed.map(|_| ())
}

fn listen(game: &Shared, callback: &FrameCallback) -> Result<(), GameError> {
    let win = window().ok_or(GameError::NoWindow)?;
    let doc = win.document().ok_or(GameError::NoDocument)?;
    let config = game.borrow().config.clone();
    let navigator = win.navigator();
    let mobile = is_mobile_agent(
        &navigator.platform().unwrap_or_default(),
        &navigator.user_agent().unwrap_or_default(),
    );

    {
        let (game, config) = (game.clone(), config.clone());
        add_listener(&doc, "keydown", move |e| {
            if let Some(key) = e.dyn_ref::<KeyboardEvent>() {
                if config.is_trigger_key(&key.key()) {
                    game.borrow_mut().game_loop.press();
                }
            }
        })?;
    }
    {
        let (game, config) = (game.clone(), config.clone());
        add_listener(&doc, "keyup", move |e| {
            if let Some(key) = e.dyn_ref::<KeyboardEvent>() {
                if config.is_trigger_key(&key.key()) {
                    game.borrow_mut().game_loop.release();
                }
            }
        })?;
    }

    if mobile {
        for id in [&config.touch_controller_id, &config.container_id] {
            let target: HtmlElement = element(&doc, id, "html element")?;
            let press_game = game.clone();
            add_listener(&target, "touchstart", move |e| {
                let mut g = press_game.borrow_mut();
                // keep taps from scrolling the page while the loop runs
                if !g.game_loop.is_paused() {
                    e.prevent_default();
                }
                g.game_loop.press();
            })?;
            let release_game = game.clone();
            add_listener(&target, "touchend", move |_| {
                release_game.borrow_mut().game_loop.release();
            })?;
        }
    } else {
        let press_game = game.clone();
        add_listener(&doc, "mousedown", move |_| {
            press_game.borrow_mut().game_loop.press();
        })?;
        let release_game = game.clone();
        add_listener(&doc, "mouseup", move |_| {
            release_game.borrow_mut().game_loop.release();
        })?;
    }

    {
        let (game, callback, visible_doc) = (game.clone(), callback.clone(), doc.clone());
        add_listener(&doc, "visibilitychange", move |_| {
            let hidden = visible_doc.hidden();
            game.borrow_mut().game_loop.set_hidden(hidden);
            if !hidden {
                if let Err(err) = schedule(&game, &callback) {
                    error!(%err, "could not resume");
                }
            }
        })?;
    }
    Ok(())
}
