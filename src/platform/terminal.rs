//! Terminal host
//!
//! Raw-mode crossterm front end. Keyboard steers and fires, the mouse
//! drags the ship, and the world is letterboxed into the character grid.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
};
use glam::Vec2;

use super::{Sprite, SpriteKind, draw_list, mute_button, score_line, star_field};
use crate::audio::{AudioBackend, SoundEffect};
use crate::persistence::KeyValueStore;
use crate::session::Session;
use crate::sim::{FrameEvent, GameState};
use crate::viewport::Viewport;

const FRAME: Duration = Duration::from_millis(16);

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 2.0;

/// A key counts as held if its last press/repeat arrived within this window.
/// Terminals without key-release reporting only send repeats, so the window
/// must outlast the OS repeat interval.
const HOLD_WINDOW: Duration = Duration::from_millis(150);

const C_HUD: Color = Color::Yellow;
const C_PLAYER: Color = Color::White;
const C_PLAYER_HIT: Color = Color::Red;
const C_ENEMY: Color = Color::Green;
const C_BULLET: Color = Color::Cyan;
const C_STAR: Color = Color::DarkGrey;

/// Rings the terminal bell for hits and game over
#[derive(Debug, Default)]
pub struct BellBackend;

impl AudioBackend for BellBackend {
    fn play(&mut self, effect: SoundEffect, _volume: f32) {
        if effect == SoundEffect::Shoot {
            return;
        }
        let mut out = io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }
}

/// Lowercase letters so Shift does not change the binding
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

fn is_held(held: &HashMap<KeyCode, Instant>, key: KeyCode, now: Instant) -> bool {
    held.get(&key)
        .is_some_and(|&last| now.saturating_duration_since(last) <= HOLD_WINDOW)
}

/// Axis and fire state from the keys currently held
fn held_input(held: &HashMap<KeyCode, Instant>, now: Instant) -> (Vec2, bool) {
    let any = |keys: &[KeyCode]| keys.iter().any(|&k| is_held(held, k, now));
    let mut axis = Vec2::ZERO;
    if any(&[KeyCode::Left, KeyCode::Char('a')]) {
        axis.x -= 1.0;
    }
    if any(&[KeyCode::Right, KeyCode::Char('d')]) {
        axis.x += 1.0;
    }
    if any(&[KeyCode::Up, KeyCode::Char('w')]) {
        axis.y -= 1.0;
    }
    if any(&[KeyCode::Down, KeyCode::Char('s')]) {
        axis.y += 1.0;
    }
    (axis, any(&[KeyCode::Char(' ')]))
}

/// World placement below the HUD row
fn layout(cols: u16, rows: u16, world: Vec2) -> Viewport {
    let area = Vec2::new(cols as f32, rows.saturating_sub(1) as f32);
    let mut viewport = Viewport::fit(area, world, CELL_ASPECT);
    viewport.origin.y += 1.0;
    viewport
}

/// Backdrop placement: the world scaled to cover every cell below the HUD
fn backdrop_layout(cols: u16, rows: u16, world: Vec2) -> Viewport {
    let area = Vec2::new(cols as f32, rows.saturating_sub(1) as f32);
    let mut viewport = Viewport::cover(area, world, CELL_ASPECT);
    viewport.origin.y += 1.0;
    viewport
}

/// Cell under a mouse event, in world units
fn mouse_world(viewport: &Viewport, mouse: &MouseEvent) -> Vec2 {
    viewport.to_world(Vec2::new(mouse.column as f32 + 0.5, mouse.row as f32 + 0.5))
}

/// Run the terminal front end until the player quits
pub fn run<S: KeyValueStore>(session: &mut Session<S, BellBackend>) -> io::Result<()> {
    let mut out = io::BufWriter::new(io::stdout());

    terminal::enable_raw_mode()?;
    enter_screen(&mut out)?;

    // Key-release reporting where the terminal supports it
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking reads live on their own thread so the loop never stalls
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = game_loop(&mut out, session, &rx);
    restore(&mut out, keyboard_enhanced);
    result
}

/// Switch to the alternate screen with mouse capture. If a step fails the
/// terminal is restored, raw mode included, before the error is returned.
fn enter_screen<W: Write>(out: &mut W) -> io::Result<()> {
    let entered = out
        .execute(terminal::EnterAlternateScreen)
        .and_then(|o| o.execute(cursor::Hide))
        .and_then(|o| o.execute(EnableMouseCapture))
        .map(|_| ());
    if entered.is_err() {
        restore(out, false);
    }
    entered
}

/// Undo every mode `run` switched on. Failures are ignored so each step
/// still gets its turn.
fn restore<W: Write>(out: &mut W, keyboard_enhanced: bool) {
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

fn game_loop<S: KeyValueStore, W: Write>(
    out: &mut W,
    session: &mut Session<S, BellBackend>,
    rx: &mpsc::Receiver<Event>,
) -> io::Result<()> {
    let world = session.state().config.world();
    let (cols, rows) = terminal::size()?;
    let mut viewport = layout(cols, rows, world);
    let mut backdrop = backdrop_layout(cols, rows, world);
    let mut held: HashMap<KeyCode, Instant> = HashMap::new();
    let mut fps = FpsCounter::default();
    let start = Instant::now();

    loop {
        let frame_start = Instant::now();

        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => {
                    let code = normalize(code);
                    match kind {
                        KeyEventKind::Press => {
                            held.insert(code, frame_start);
                            match code {
                                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                    return Ok(());
                                }
                                KeyCode::Char('m') => session.push_event(FrameEvent::ToggleMute),
                                KeyCode::Char('r') | KeyCode::Enter => {
                                    session.push_event(FrameEvent::Restart)
                                }
                                KeyCode::Char('p') | KeyCode::Char('i') => {
                                    let on = !session.autopilot();
                                    session.set_autopilot(on);
                                }
                                _ => {}
                            }
                        }
                        KeyEventKind::Repeat => {
                            held.insert(code, frame_start);
                        }
                        KeyEventKind::Release => {
                            held.remove(&code);
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    let pos = mouse_world(&viewport, &mouse);
                    match mouse.kind {
                        MouseEventKind::Down(MouseButton::Left) => {
                            if mute_button(session.state()).contains(pos) {
                                session.push_event(FrameEvent::ToggleMute);
                            } else {
                                session.push_event(FrameEvent::PointerDown(pos));
                            }
                        }
                        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                            session.push_event(FrameEvent::PointerMove(pos))
                        }
                        MouseEventKind::Up(MouseButton::Left) => {
                            session.push_event(FrameEvent::PointerUp)
                        }
                        _ => {}
                    }
                }
                Event::Resize(cols, rows) => {
                    log::debug!("Terminal resized to {}x{}", cols, rows);
                    viewport = layout(cols, rows, world);
                    backdrop = backdrop_layout(cols, rows, world);
                }
                _ => {}
            }
        }

        let (axis, fire) = held_input(&held, frame_start);
        session.set_held(axis, fire);
        session.update(start.elapsed().as_millis() as u64);
        fps.frame(frame_start);

        let show_fps = session.settings().show_fps.then_some(fps.fps);
        let state = session.state();
        render(out, state, &viewport, &backdrop, session.autopilot(), show_fps)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

/// Frames counted over the last second
#[derive(Debug, Default)]
struct FpsCounter {
    window_start: Option<Instant>,
    frames: u32,
    fps: u32,
}

impl FpsCounter {
    fn frame(&mut self, now: Instant) {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        if now.duration_since(start) >= Duration::from_secs(1) {
            self.fps = self.frames;
            self.frames = 0;
            self.window_start = Some(now);
        }
    }
}

/// Glyph and colour for a sprite
fn glyph(kind: SpriteKind) -> (char, Color) {
    match kind {
        SpriteKind::Player { frame } => (if frame % 2 == 0 { 'A' } else { '^' }, C_PLAYER),
        SpriteKind::PlayerHit => ('X', C_PLAYER_HIT),
        SpriteKind::Enemy { flip_y: true, .. } => ('V', C_ENEMY),
        SpriteKind::Enemy { flip_y: false, .. } => ('W', C_ENEMY),
        SpriteKind::Bullet => ('|', C_BULLET),
        SpriteKind::Explosion { frame, big } => {
            const STAGES: [char; 7] = ['.', '+', '*', '#', '*', '+', '.'];
            let c = STAGES[(frame as usize).min(STAGES.len() - 1)];
            (c, if big { Color::Red } else { Color::Yellow })
        }
    }
}

/// Cells covered by a sprite, at least one
fn cell_rect(viewport: &Viewport, sprite: &Sprite) -> (i32, i32, i32, i32) {
    let min = viewport.to_screen(sprite.pos - sprite.size / 2.0);
    let max = viewport.to_screen(sprite.pos + sprite.size / 2.0);
    let x0 = min.x.floor() as i32;
    let y0 = min.y.floor() as i32;
    let x1 = (max.x.floor() as i32).max(x0 + 1);
    let y1 = (max.y.floor() as i32).max(y0 + 1);
    (x0, y0, x1, y1)
}

fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    viewport: &Viewport,
    backdrop: &Viewport,
    autopilot: bool,
    fps: Option<u32>,
) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let (cols, rows) = (cols as i32, rows as i32);
    let world = state.config.world();
    let top_left = viewport.to_screen(Vec2::ZERO);
    let bottom_right = viewport.to_screen(world);
    let in_play = |x: i32, y: i32| {
        x >= top_left.x.floor() as i32
            && x < bottom_right.x.ceil() as i32
            && y >= 1
            && y < rows
            && x >= 0
            && x < cols
    };

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    // Stars span the whole terminal, not just the play area
    out.queue(style::SetForegroundColor(C_STAR))?;
    for star in star_field(state) {
        let cell = backdrop.to_screen(star);
        let (cx, cy) = (cell.x.floor() as i32, cell.y.floor() as i32);
        if (0..cols).contains(&cx) && (1..rows).contains(&cy) {
            out.queue(cursor::MoveTo(cx as u16, cy as u16))?;
            out.queue(Print('.'))?;
        }
    }

    for sprite in draw_list(state) {
        let (c, color) = glyph(sprite.kind);
        let (x0, y0, x1, y1) = cell_rect(viewport, &sprite);
        out.queue(style::SetForegroundColor(color))?;
        for y in y0..y1 {
            for x in x0..x1 {
                if in_play(x, y) {
                    out.queue(cursor::MoveTo(x as u16, y as u16))?;
                    out.queue(Print(c))?;
                }
            }
        }
    }

    // HUD row
    out.queue(style::SetForegroundColor(C_HUD))?;
    if let Some(score) = score_line(state) {
        out.queue(cursor::MoveTo(1, 0))?;
        out.queue(Print(score))?;
    }
    let mut center = String::new();
    if autopilot {
        center.push_str("[AUTO]");
    }
    if let Some(fps) = fps {
        center.push_str(&format!(" FPS {}", fps));
    }
    if !center.is_empty() {
        let x = (cols / 2 - center.len() as i32 / 2).max(0);
        out.queue(cursor::MoveTo(x as u16, 0))?;
        out.queue(Print(&center))?;
    }
    let mute = format!("[M] {}", state.mute_label());
    let x = (cols - mute.len() as i32 - 1).max(0);
    out.queue(cursor::MoveTo(x as u16, 0))?;
    out.queue(Print(&mute))?;

    // Centered game over text
    let lines = state.game_over_lines();
    if !lines.is_empty() {
        out.queue(style::SetForegroundColor(Color::White))?;
        let middle = viewport.to_screen(world / 2.0);
        let first_row = middle.y as i32 - lines.len() as i32 / 2;
        for (i, line) in lines.iter().enumerate() {
            let x = (middle.x as i32 - line.chars().count() as i32 / 2).max(0);
            let y = (first_row + i as i32).clamp(1, rows.max(2) - 1);
            out.queue(cursor::MoveTo(x as u16, y as u16))?;
            out.queue(Print(line))?;
        }
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, (rows - 1).max(0) as u16))?;
    out.flush()?;
    Ok(())
}
