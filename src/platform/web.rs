//! Browser host
//!
//! Draws onto a 2D canvas at the world's native resolution and lets CSS
//! scale it into the window. A second full-window canvas behind it carries
//! the star field scaled to cover the whole viewport. Keyboard state comes from keydown/keyup,
//! mouse and touch arrive as pointer events.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, PointerEvent};

use super::{SpriteKind, draw_list, mute_button, score_line, star_field};
use crate::audio::WebAudioBackend;
use crate::config::{GameConfig, Preset};
use crate::persistence::{KeyValueStore, LocalStore, MemoryStore};
use crate::session::Session;
use crate::sim::FrameEvent;
use crate::viewport::{Viewport, fit_size};

type WebSession = Session<Box<dyn KeyValueStore>, WebAudioBackend>;

/// Game instance shared between the event listeners and the frame loop
struct WebGame {
    session: WebSession,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    backdrop: HtmlCanvasElement,
    backdrop_ctx: CanvasRenderingContext2d,
    held: HashSet<String>,
    // FPS tracking
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl WebGame {
    fn world(&self) -> Vec2 {
        self.session.state().config.world()
    }

    /// Canvas-relative pointer position in world units
    fn pointer_world(&self, event: &PointerEvent) -> Vec2 {
        let rect = self.canvas.get_bounding_client_rect();
        let x = (event.client_x() as f64 - rect.left()) / rect.width().max(1.0);
        let y = (event.client_y() as f64 - rect.top()) / rect.height().max(1.0);
        Vec2::new(x as f32, y as f32) * self.world()
    }

    fn sync_held(&mut self) {
        let held = |keys: &[&str]| keys.iter().any(|k| self.held.contains(*k));
        let mut axis = Vec2::ZERO;
        if held(&["arrowleft", "a"]) {
            axis.x -= 1.0;
        }
        if held(&["arrowright", "d"]) {
            axis.x += 1.0;
        }
        if held(&["arrowup", "w"]) {
            axis.y -= 1.0;
        }
        if held(&["arrowdown", "s"]) {
            axis.y += 1.0;
        }
        let fire = held(&[" "]);
        self.session.set_held(axis, fire);
    }

    fn track_fps(&mut self, time: f64) {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 && time > oldest {
            self.fps = (60_000.0 / (time - oldest)).round() as u32;
        }
    }

    /// Window-sized star field, cropped rather than letterboxed
    fn draw_backdrop(&self) {
        let ctx = &self.backdrop_ctx;
        let screen = Vec2::new(self.backdrop.width() as f32, self.backdrop.height() as f32);
        ctx.set_fill_style_str("#03050f");
        ctx.fill_rect(0.0, 0.0, screen.x as f64, screen.y as f64);

        let cover = Viewport::cover(screen, self.world(), 1.0);
        let size = (3.0 * cover.scale.x).max(1.0) as f64;
        ctx.set_fill_style_str("#3a4468");
        for star in star_field(self.session.state()) {
            let p = cover.to_screen(star);
            ctx.fill_rect(p.x as f64, p.y as f64, size, size);
        }
    }

    fn draw(&self) -> Result<(), JsValue> {
        self.draw_backdrop();

        let ctx = &self.ctx;
        let state = self.session.state();
        let world = self.world();
        let (w, h) = (world.x as f64, world.y as f64);

        ctx.set_fill_style_str("#070b1f");
        ctx.fill_rect(0.0, 0.0, w, h);

        ctx.set_fill_style_str("#5a6488");
        for star in star_field(state) {
            ctx.fill_rect(star.x as f64, star.y as f64, 3.0, 3.0);
        }

        for sprite in draw_list(state) {
            let (x, y) = (sprite.pos.x as f64, sprite.pos.y as f64);
            let (sw, sh) = (sprite.size.x as f64, sprite.size.y as f64);
            match sprite.kind {
                SpriteKind::Player { .. } | SpriteKind::PlayerHit => {
                    let color = if sprite.kind == SpriteKind::PlayerHit {
                        "#ff3030"
                    } else {
                        "#e8f0ff"
                    };
                    ctx.set_fill_style_str(color);
                    ctx.begin_path();
                    ctx.move_to(x, y - sh / 2.0);
                    ctx.line_to(x + sw / 2.0, y + sh / 2.0);
                    ctx.line_to(x - sw / 2.0, y + sh / 2.0);
                    ctx.close_path();
                    ctx.fill();
                }
                SpriteKind::Enemy { flip_y, .. } => {
                    // Nose points the way the enemy is travelling
                    let dir = if flip_y { 1.0 } else { -1.0 };
                    ctx.set_fill_style_str("#50d060");
                    ctx.begin_path();
                    ctx.move_to(x, y + dir * sh / 2.0);
                    ctx.line_to(x + sw / 2.0, y - dir * sh / 2.0);
                    ctx.line_to(x - sw / 2.0, y - dir * sh / 2.0);
                    ctx.close_path();
                    ctx.fill();
                }
                SpriteKind::Bullet => {
                    ctx.set_fill_style_str("#60f0ff");
                    ctx.fill_rect(x - sw / 2.0, y - sh / 2.0, sw, sh);
                }
                SpriteKind::Explosion { frame, big } => {
                    let grow = (frame as f64 + 1.0) / 7.0;
                    ctx.set_fill_style_str(if big { "#ff6020" } else { "#ffd040" });
                    ctx.begin_path();
                    ctx.arc(x, y, sw / 2.0 * grow, 0.0, std::f64::consts::TAU)?;
                    ctx.fill();
                }
            }
        }

        // HUD
        ctx.set_fill_style_str("#ffffff");
        ctx.set_font("32px monospace");
        ctx.set_text_baseline("top");
        ctx.set_text_align("left");
        if let Some(score) = score_line(state) {
            ctx.fill_text(&score, 16.0, 16.0)?;
        }
        if self.session.settings().show_fps {
            ctx.fill_text(&format!("FPS {}", self.fps), 16.0, 56.0)?;
        }
        if self.session.autopilot() {
            ctx.set_text_align("center");
            ctx.fill_text("AUTO", w / 2.0, 16.0)?;
        }

        let button = mute_button(state);
        let size = button.max - button.min;
        ctx.set_stroke_style_str("#ffffff");
        ctx.stroke_rect(
            button.min.x as f64,
            button.min.y as f64,
            size.x as f64,
            size.y as f64,
        );
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.fill_text(
            state.mute_label(),
            (button.min.x + size.x / 2.0) as f64,
            (button.min.y + size.y / 2.0) as f64,
        )?;

        let lines = state.game_over_lines();
        if !lines.is_empty() {
            ctx.set_font("64px monospace");
            let first = h / 2.0 - (lines.len() as f64 - 1.0) * 40.0;
            for (i, line) in lines.iter().enumerate() {
                ctx.fill_text(line, w / 2.0, first + i as f64 * 80.0)?;
            }
        }
        Ok(())
    }
}

fn js_err(msg: &str) -> JsValue {
    JsValue::from_str(msg)
}

/// `?preset=classic` selects the 800x600 configuration
fn preset_from_location(window: &web_sys::Window) -> Preset {
    window
        .location()
        .search()
        .ok()
        .and_then(|query| {
            query
                .trim_start_matches('?')
                .split('&')
                .find_map(|pair| pair.strip_prefix("preset="))
                .and_then(Preset::from_str)
        })
        .unwrap_or_default()
}

pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).map_err(|e| js_err(&e.to_string()))?;

    log::info!("Skyfire starting...");

    let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
    let document = window.document().ok_or_else(|| js_err("no document"))?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id("canvas")
        .ok_or_else(|| js_err("no canvas"))?
        .dyn_into()
        .map_err(|_| js_err("#canvas is not a canvas"))?;
    let ctx = context_2d(&canvas)?;
    let backdrop = backdrop_canvas(&document)?;
    let backdrop_ctx = context_2d(&backdrop)?;

    let config: GameConfig = preset_from_location(&window).config();
    canvas.set_width(config.screen_width as u32);
    canvas.set_height(config.screen_height as u32);

    let store: Box<dyn KeyValueStore> = match LocalStore::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("{} - progress will not be saved", e);
            Box::new(MemoryStore::new())
        }
    };

    let seed = js_sys::Date::now() as u64;
    let session = Session::new(config, seed, store, WebAudioBackend::new());
    log::info!("Game initialized with seed: {}", seed);

    let game = Rc::new(RefCell::new(WebGame {
        session,
        canvas: canvas.clone(),
        ctx,
        backdrop,
        backdrop_ctx,
        held: HashSet::new(),
        frame_times: [0.0; 60],
        frame_index: 0,
        fps: 0,
    }));

    fit_to_window(&game.borrow())?;
    setup_input_handlers(&window, &canvas, game.clone())?;
    request_animation_frame(game)?;

    log::info!("Skyfire running!");
    Ok(())
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| js_err("2d context unavailable"))?
        .dyn_into()
        .map_err(|_| js_err("unexpected context type"))
}

/// Fixed full-window canvas behind the game, reusing `#backdrop` if the page
/// provides one
fn backdrop_canvas(document: &web_sys::Document) -> Result<HtmlCanvasElement, JsValue> {
    if let Some(existing) = document.get_element_by_id("backdrop") {
        return existing
            .dyn_into()
            .map_err(|_| js_err("#backdrop is not a canvas"));
    }
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| js_err("created element is not a canvas"))?;
    canvas.set_id("backdrop");
    let style = canvas.style();
    style.set_property("position", "fixed")?;
    style.set_property("left", "0")?;
    style.set_property("top", "0")?;
    style.set_property("z-index", "-1")?;
    style.set_property("pointer-events", "none")?;
    document
        .body()
        .ok_or_else(|| js_err("no body"))?
        .prepend_with_node_1(&canvas)?;
    Ok(canvas)
}

/// Letterbox the game canvas and stretch the backdrop over the window
fn fit_to_window(game: &WebGame) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
    let viewport = Vec2::new(
        window.inner_width()?.as_f64().unwrap_or(0.0) as f32,
        window.inner_height()?.as_f64().unwrap_or(0.0) as f32,
    );
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return Ok(());
    }
    let world = game.world();

    let size = fit_size(viewport, world);
    let style = game.canvas.style();
    style.set_property("width", &format!("{}px", size.x))?;
    style.set_property("height", &format!("{}px", size.y))?;

    game.backdrop.set_width(viewport.x as u32);
    game.backdrop.set_height(viewport.y as u32);
    let style = game.backdrop.style();
    style.set_property("width", &format!("{}px", viewport.x))?;
    style.set_property("height", &format!("{}px", viewport.y))?;
    game.draw_backdrop();
    log::debug!("Canvas fitted to {}x{}", size.x, size.y);
    Ok(())
}

fn setup_input_handlers(
    window: &web_sys::Window,
    canvas: &HtmlCanvasElement,
    game: Rc<RefCell<WebGame>>,
) -> Result<(), JsValue> {
    // Keyboard down
    {
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let key = event.key().to_lowercase();
            if matches!(key.as_str(), " " | "arrowleft" | "arrowright" | "arrowup" | "arrowdown") {
                event.prevent_default();
            }
            let mut g = game.borrow_mut();
            if !event.repeat() {
                match key.as_str() {
                    "m" => g.session.push_event(FrameEvent::ToggleMute),
                    "r" | "enter" => g.session.push_event(FrameEvent::Restart),
                    "i" | "p" => {
                        let on = !g.session.autopilot();
                        g.session.set_autopilot(on);
                    }
                    _ => {}
                }
            }
            g.held.insert(key);
            g.sync_held();
        });
        window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Keyboard up
    {
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut g = game.borrow_mut();
            g.held.remove(&event.key().to_lowercase());
            g.sync_held();
        });
        window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Losing focus never delivers keyup
    {
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            g.held.clear();
            g.sync_held();
        });
        window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Pointer down: mute button or drag start
    {
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            event.prevent_default();
            let mut g = game.borrow_mut();
            let pos = g.pointer_world(&event);
            if mute_button(g.session.state()).contains(pos) {
                g.session.push_event(FrameEvent::ToggleMute);
            } else {
                g.session.push_event(FrameEvent::PointerDown(pos));
            }
        });
        canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Pointer move
    {
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            let mut g = game.borrow_mut();
            let pos = g.pointer_world(&event);
            g.session.push_event(FrameEvent::PointerMove(pos));
        });
        canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Pointer up / cancel
    for name in ["pointerup", "pointercancel"] {
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
            game.borrow_mut().session.push_event(FrameEvent::PointerUp);
        });
        canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Resize
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Err(e) = fit_to_window(&game.borrow()) {
                log::warn!("Resize failed: {:?}", e);
            }
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

fn request_animation_frame(game: Rc<RefCell<WebGame>>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
    let closure = Closure::once(move |time: f64| {
        game_loop(game, time);
    });
    window.request_animation_frame(closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn game_loop(game: Rc<RefCell<WebGame>>, time: f64) {
    {
        let mut g = game.borrow_mut();
        g.session.update(time as u64);
        g.track_fps(time);
        if let Err(e) = g.draw() {
            log::warn!("Draw error: {:?}", e);
        }
    }

    if let Err(e) = request_animation_frame(game) {
        log::error!("Frame loop stopped: {:?}", e);
    }
}
