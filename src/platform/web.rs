//! Browser host
//!
//! Wires an `Engine` to the page: `setInterval` cadences, a Canvas2D
//! surface, DOM HUD updates, and the page-provided score/login hooks
//! (`window.duckshotSubmitScore(score) -> Promise<{success, message,
//! showLoginButton}>` and `window.duckshotRequestLogin()`).

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};
use std::time::Duration;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent, Window};

use crate::audio::WebAudio;
use crate::engine::{Engine, EngineConfig};
use crate::error::{RenderError, SubmitError};
use crate::renderer::{DrawCommand, DrawSurface, Fill, Frame, TextAlign};
use crate::scheduler::{Cadence, CadenceHandle, Scheduler};
use crate::settings::Settings;
use crate::sim::GamePhase;
use crate::submission::{
    LoginRequester, ScoreSubmitter, SubmissionReply, SubmissionStatus, SubmitOutcome,
};

const CANVAS_ID: &str = "gameCanvas";
const SUBMIT_HOOK: &str = "duckshotSubmitScore";
const LOGIN_HOOK: &str = "duckshotRequestLogin";

type WebEngine = Engine<IntervalScheduler>;
/// Late-bound pointer to the engine, filled in once it exists
type HostLink = Rc<RefCell<Weak<RefCell<WebEngine>>>>;

thread_local! {
    static ENGINE: RefCell<Option<Rc<RefCell<WebEngine>>>> = const { RefCell::new(None) };
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn missing(what: &str) -> JsValue {
    JsValue::from_str(&format!("missing {what}"))
}

/// Run `f` against the engine unless it is gone or already borrowed, then
/// refresh the HUD
fn with_engine(link: &HostLink, f: impl FnOnce(&mut WebEngine)) {
    let Some(shared) = link.borrow().upgrade() else {
        return;
    };
    let Ok(mut engine) = shared.try_borrow_mut() else {
        log::trace!("Engine busy; event dropped");
        return;
    };
    f(&mut engine);
    update_hud(&engine);
}

// === Scheduler ===

struct Interval {
    handle: CadenceHandle,
    id: i32,
    callback: Closure<dyn FnMut()>,
}

/// `setInterval`-backed cadences
pub struct IntervalScheduler {
    window: Window,
    link: HostLink,
    next_id: u64,
    live: Vec<Interval>,
    /// Cancelled callbacks, kept alive until no interval can be mid-call
    retired: Vec<Closure<dyn FnMut()>>,
}

impl IntervalScheduler {
    fn new(window: Window, link: HostLink) -> Self {
        Self {
            window,
            link,
            next_id: 0,
            live: Vec::new(),
            retired: Vec::new(),
        }
    }
}

impl Scheduler for IntervalScheduler {
    fn arm(&mut self, cadence: Cadence, period: Duration) -> CadenceHandle {
        // Arming only happens from host events, never inside an interval callback
        self.retired.clear();

        self.next_id += 1;
        let handle = CadenceHandle {
            id: self.next_id,
            cadence,
        };
        let link = Rc::clone(&self.link);
        let callback = Closure::<dyn FnMut()>::new(move || {
            with_engine(&link, |engine| engine.on_cadence(handle));
        });

        let millis = i32::try_from(period.as_millis()).unwrap_or(i32::MAX).max(1);
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                millis,
            ) {
            Ok(id) => self.live.push(Interval {
                handle,
                id,
                callback,
            }),
            Err(err) => log::error!("setInterval failed for {cadence:?}: {}", describe(&err)),
        }
        handle
    }

    fn cancel(&mut self, handle: CadenceHandle) {
        let Some(index) = self.live.iter().position(|i| i.handle == handle) else {
            return;
        };
        let interval = self.live.swap_remove(index);
        self.window.clear_interval_with_handle(interval.id);
        self.retired.push(interval.callback);
    }

    fn live(&self) -> usize {
        self.live.len()
    }
}

// === Surface ===

pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

fn js_err(err: JsValue) -> RenderError {
    RenderError::Backend(describe(&err))
}

impl Canvas2dSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        Self { canvas, ctx }
    }

    fn set_fill(&self, fill: &Fill) -> Result<(), RenderError> {
        match fill {
            Fill::Solid(color) => self.ctx.set_fill_style_str(&color.to_css()),
            Fill::Linear { from, to, stops } => {
                let gradient = self.ctx.create_linear_gradient(
                    f64::from(from.x),
                    f64::from(from.y),
                    f64::from(to.x),
                    f64::from(to.y),
                );
                for (offset, color) in stops {
                    gradient
                        .add_color_stop(*offset, &color.to_css())
                        .map_err(js_err)?;
                }
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
            Fill::Radial {
                center,
                radius,
                stops,
            } => {
                let (x, y) = (f64::from(center.x), f64::from(center.y));
                let gradient = self
                    .ctx
                    .create_radial_gradient(x, y, 0.0, x, y, f64::from(radius.max(0.0)))
                    .map_err(js_err)?;
                for (offset, color) in stops {
                    gradient
                        .add_color_stop(*offset, &color.to_css())
                        .map_err(js_err)?;
                }
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
        }
        Ok(())
    }

    fn trace(&self, points: &[Vec2]) {
        self.ctx.begin_path();
        for (i, p) in points.iter().enumerate() {
            if i == 0 {
                self.ctx.move_to(f64::from(p.x), f64::from(p.y));
            } else {
                self.ctx.line_to(f64::from(p.x), f64::from(p.y));
            }
        }
    }

    fn draw(&self, cmd: &DrawCommand) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        match cmd {
            DrawCommand::Rect { origin, size, fill } => {
                self.set_fill(fill)?;
                ctx.fill_rect(
                    f64::from(origin.x),
                    f64::from(origin.y),
                    f64::from(size.x),
                    f64::from(size.y),
                );
            }
            DrawCommand::Circle {
                center,
                radius,
                fill,
            } => {
                self.set_fill(fill)?;
                ctx.begin_path();
                ctx.arc(
                    f64::from(center.x),
                    f64::from(center.y),
                    f64::from(radius.max(0.0)),
                    0.0,
                    TAU,
                )
                .map_err(js_err)?;
                ctx.fill();
            }
            DrawCommand::Ring {
                center,
                radius,
                width,
                color,
            } => {
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(f64::from(*width));
                ctx.begin_path();
                ctx.arc(
                    f64::from(center.x),
                    f64::from(center.y),
                    f64::from(radius.max(0.0)),
                    0.0,
                    TAU,
                )
                .map_err(js_err)?;
                ctx.stroke();
            }
            DrawCommand::Ellipse {
                center,
                radii,
                rotation,
                fill,
            } => {
                self.set_fill(fill)?;
                ctx.begin_path();
                ctx.ellipse(
                    f64::from(center.x),
                    f64::from(center.y),
                    f64::from(radii.x.max(0.0)),
                    f64::from(radii.y.max(0.0)),
                    f64::from(*rotation),
                    0.0,
                    TAU,
                )
                .map_err(js_err)?;
                ctx.fill();
            }
            DrawCommand::Polygon { points, fill } => {
                self.set_fill(fill)?;
                self.trace(points);
                ctx.close_path();
                ctx.fill();
            }
            DrawCommand::Polyline {
                points,
                width,
                color,
            } => {
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(f64::from(*width));
                self.trace(points);
                ctx.stroke();
            }
            DrawCommand::Text {
                pos,
                text,
                size,
                bold,
                align,
                color,
            } => {
                let weight = if *bold { "bold " } else { "" };
                ctx.set_font(&format!("{weight}{size}px Arial"));
                ctx.set_text_align(match align {
                    TextAlign::Left => "left",
                    TextAlign::Center => "center",
                    TextAlign::Right => "right",
                });
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill_text(text, f64::from(pos.x), f64::from(pos.y))
                    .map_err(js_err)?;
            }
        }
        Ok(())
    }
}

impl DrawSurface for Canvas2dSurface {
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError> {
        if !self.canvas.is_connected() {
            return Err(RenderError::SurfaceLost);
        }
        self.ctx.clear_rect(
            0.0,
            0.0,
            f64::from(frame.width),
            f64::from(frame.height),
        );
        for cmd in &frame.commands {
            self.draw(cmd)?;
        }
        Ok(())
    }
}

// === Collaborators ===

fn host_function(name: &str) -> Option<js_sys::Function> {
    let window = web_sys::window()?;
    js_sys::Reflect::get(&window, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()
}

fn parse_outcome(value: &JsValue) -> Result<SubmitOutcome, SubmitError> {
    if value.is_undefined() || value.is_null() {
        return Err(SubmitError::MalformedResponse("empty response".into()));
    }
    let json: String = js_sys::JSON::stringify(value)
        .map_err(|err| SubmitError::MalformedResponse(describe(&err)))?
        .into();
    serde_json::from_str(&json).map_err(|err| SubmitError::MalformedResponse(err.to_string()))
}

/// Forwards the final score to `window.duckshotSubmitScore`
pub struct JsSubmitter {
    link: HostLink,
}

impl ScoreSubmitter for JsSubmitter {
    fn submit_score(&mut self, final_score: u64, reply: SubmissionReply) {
        let Some(submit) = host_function(SUBMIT_HOOK) else {
            log::warn!("No {SUBMIT_HOOK} hook on the page; score not submitted");
            reply.resolve(Ok(SubmitOutcome {
                success: false,
                message: "Leaderboard unavailable".to_string(),
                prompt_login: false,
            }));
            return;
        };

        let pending = match submit.call1(&JsValue::NULL, &JsValue::from_f64(final_score as f64)) {
            Ok(value) => value,
            Err(err) => {
                reply.resolve(Err(SubmitError::Transport(describe(&err))));
                return;
            }
        };

        log::info!("Submitting final score {final_score}");
        let link = Rc::clone(&self.link);
        wasm_bindgen_futures::spawn_local(async move {
            let result = match JsFuture::from(js_sys::Promise::resolve(&pending)).await {
                Ok(value) => parse_outcome(&value),
                Err(err) => Err(SubmitError::Transport(describe(&err))),
            };
            reply.resolve(result);
            with_engine(&link, |engine| engine.refresh());
        });
    }
}

/// Calls `window.duckshotRequestLogin`
pub struct JsLogin;

impl LoginRequester for JsLogin {
    fn request_login(&mut self) {
        match host_function(LOGIN_HOOK) {
            Some(login) => {
                if let Err(err) = login.call0(&JsValue::NULL) {
                    log::warn!("Login hook failed: {}", describe(&err));
                }
            }
            None => log::warn!("No {LOGIN_HOOK} hook on the page"),
        }
    }
}

// === DOM ===

fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

fn set_visible(document: &Document, id: &str, visible: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
    }
}

fn update_hud(engine: &WebEngine) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let hud = engine.hud();

    set_text(&document, "score", &hud.score.to_string());
    set_text(&document, "round", &format!("{}/{}", hud.round, hud.total_rounds));
    set_text(&document, "timer", &hud.time_remaining.to_string());

    let prompt_login = matches!(
        &hud.submission,
        SubmissionStatus::Resolved(outcome) if outcome.prompt_login
    );
    set_visible(
        &document,
        "login-button",
        hud.phase == GamePhase::GameEnd && prompt_login,
    );
}

/// Canvas-relative position in canvas pixels
fn canvas_point(canvas: &HtmlCanvasElement, event: &MouseEvent) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    let scale_x = if rect.width() > 0.0 {
        f64::from(canvas.width()) / rect.width()
    } else {
        1.0
    };
    let scale_y = if rect.height() > 0.0 {
        f64::from(canvas.height()) / rect.height()
    } else {
        1.0
    };
    let x = (f64::from(event.client_x()) - rect.left()) * scale_x;
    let y = (f64::from(event.client_y()) - rect.top()) * scale_y;
    (x as f32, y as f32)
}

/// Clicks shoot while playing and otherwise act as the overlay button
fn setup_click(canvas: &HtmlCanvasElement, link: &HostLink) -> Result<(), JsValue> {
    let link = Rc::clone(link);
    let canvas_clone = canvas.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
        let (x, y) = canvas_point(&canvas_clone, &event);
        with_engine(&link, |engine| {
            let result = match engine.phase() {
                GamePhase::Playing => {
                    engine.handle_click(x, y);
                    Ok(())
                }
                GamePhase::Start => engine.start(),
                GamePhase::RoundEnd => engine.advance_round(),
                GamePhase::GameEnd => {
                    engine.reset();
                    Ok(())
                }
            };
            if let Err(err) = result {
                log::warn!("{err}");
            }
        });
    });
    canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn setup_login_button(document: &Document, link: &HostLink) -> Result<(), JsValue> {
    let Some(button) = document.get_element_by_id("login-button") else {
        return Ok(());
    };
    let link = Rc::clone(link);
    let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
        event.stop_propagation();
        with_engine(&link, |engine| {
            if let Err(err) = engine.request_login() {
                log::warn!("{err}");
            }
        });
    });
    button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Match the canvas backing size to its layout size
fn fit_canvas(canvas: &HtmlCanvasElement) -> (f32, f32) {
    let width = canvas.client_width().max(1) as u32;
    let height = canvas.client_height().max(1) as u32;
    canvas.set_width(width);
    canvas.set_height(height);
    (width as f32, height as f32)
}

fn setup_resize(window: &Window, canvas: &HtmlCanvasElement, link: &HostLink) -> Result<(), JsValue> {
    let link = Rc::clone(link);
    let canvas_clone = canvas.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        let (width, height) = fit_canvas(&canvas_clone);
        with_engine(&link, |engine| engine.resize(width, height));
    });
    window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("Logger already initialized");
    }

    log::info!("Duckshot starting...");

    let window = web_sys::window().ok_or_else(|| missing("window"))?;
    let document = window.document().ok_or_else(|| missing("document"))?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| missing("canvas"))?
        .dyn_into()?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| missing("2d context"))?
        .dyn_into()?;

    let (width, height) = fit_canvas(&canvas);
    let settings = Settings::load();
    let config = EngineConfig {
        seed: js_sys::Date::now() as u64,
        width,
        height,
    };

    let link: HostLink = Rc::new(RefCell::new(Weak::new()));
    let engine = Engine::new(
        IntervalScheduler::new(window.clone(), Rc::clone(&link)),
        config,
        JsSubmitter {
            link: Rc::clone(&link),
        },
        JsLogin,
    )
    .with_audio(WebAudio::new(&settings))
    .with_settings(settings)
    .with_surface(Canvas2dSurface::new(canvas.clone(), ctx));

    let engine = Rc::new(RefCell::new(engine));
    *link.borrow_mut() = Rc::downgrade(&engine);

    setup_click(&canvas, &link)?;
    setup_login_button(&document, &link)?;
    setup_resize(&window, &canvas, &link)?;
    update_hud(&engine.borrow());

    log::info!("Game initialized with seed: {}", config.seed);
    ENGINE.with(|slot| *slot.borrow_mut() = Some(engine));
    Ok(())
}
