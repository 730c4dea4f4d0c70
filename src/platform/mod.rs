//! Platform hosts
//!
//! The simulation knows nothing about screens or input devices. A host
//! turns device input into `FrameEvent`s and held axes, drives a
//! `Session` with its clock, and draws what `draw_list` returns.
//!
//! - `terminal`: crossterm host (native)
//! - `web`: canvas 2D host (browser)

use glam::Vec2;

use crate::sim::{Aabb, EffectKind, GameState, PlayerVisual};

#[cfg(not(target_arch = "wasm32"))]
pub mod terminal;
#[cfg(target_arch = "wasm32")]
pub mod web;

/// What to draw for one body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Player { frame: u16 },
    /// Ship tinted after being hit (no explosion animation available)
    PlayerHit,
    Enemy { frame: u16, flip_y: bool },
    Bullet,
    Explosion { frame: u16, big: bool },
}

/// A body to draw, centered at `pos` in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub pos: Vec2,
    pub size: Vec2,
}

/// Everything visible this frame, back to front
pub fn draw_list(state: &GameState) -> Vec<Sprite> {
    let now = state.time_ms;
    let cfg = &state.config;
    let mut sprites = Vec::with_capacity(state.enemies.len() + state.effects.len() + 8);

    for enemy in state.enemies.iter().filter(|e| e.active) {
        sprites.push(Sprite {
            kind: SpriteKind::Enemy {
                frame: enemy.anim.map_or(0, |a| a.frame_at(now)),
                flip_y: enemy.flip_y,
            },
            pos: enemy.pos,
            size: Vec2::new(cfg.enemy_size.w, cfg.enemy_size.h),
        });
    }

    for (_, bullet) in state.bullets.iter_active() {
        sprites.push(Sprite {
            kind: SpriteKind::Bullet,
            pos: bullet.pos,
            size: Vec2::new(cfg.bullet_size.w, cfg.bullet_size.h),
        });
    }

    let player = &state.player;
    let player_size = Vec2::new(cfg.player_size.w, cfg.player_size.h);
    match player.visual {
        PlayerVisual::Flying => sprites.push(Sprite {
            kind: SpriteKind::Player {
                frame: player.anim.map_or(0, |a| a.frame_at(now)),
            },
            pos: player.pos,
            size: player_size,
        }),
        PlayerVisual::Hit => sprites.push(Sprite {
            kind: SpriteKind::PlayerHit,
            pos: player.pos,
            size: player_size,
        }),
        PlayerVisual::Hidden => {}
    }

    for effect in &state.effects {
        let big = effect.kind == EffectKind::PlayerExplosion;
        sprites.push(Sprite {
            kind: SpriteKind::Explosion {
                frame: effect.anim.frame_at(now),
                big,
            },
            pos: effect.pos,
            size: if big { player_size } else { Vec2::new(cfg.enemy_size.w, cfg.enemy_size.h) },
        });
    }

    sprites
}

/// Stars in the scrolling backdrop
const STAR_COUNT: u32 = 48;

/// Backdrop star positions in world units. Each star keeps its column and
/// drifts down with the background scroll, wrapping at the bottom edge.
pub fn star_field(state: &GameState) -> impl Iterator<Item = Vec2> + '_ {
    let world = state.config.world();
    let scroll = state.background.scroll_y;
    (0..STAR_COUNT).map(move |i| {
        let x = (i.wrapping_mul(7919) % 1000) as f32 / 1000.0 * world.x;
        let base = (i.wrapping_mul(104_729) % 1000) as f32 / 1000.0 * world.y;
        Vec2::new(x, (base - scroll).rem_euclid(world.y))
    })
}

/// Margin between the HUD and the world edges
pub const HUD_MARGIN: f32 = 16.0;

/// Clickable area of the mute control, top right of the world
pub fn mute_button(state: &GameState) -> Aabb {
    let size = Vec2::new(160.0, 48.0);
    let center = Vec2::new(
        state.config.screen_width - HUD_MARGIN - size.x / 2.0,
        HUD_MARGIN + size.y / 2.0,
    );
    Aabb::from_center(center, size / 2.0)
}

/// Score line for the HUD, if scoring is enabled
pub fn score_line(state: &GameState) -> Option<String> {
    state.config.has_scoring.then(|| state.score_text())
}
