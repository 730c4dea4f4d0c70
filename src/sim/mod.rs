//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes from the caller, never the wall clock
//! - Seeded RNG only
//! - Stable iteration order (spawn order / pool slot order)
//! - No rendering or platform dependencies

pub mod anim;
pub mod autopilot;
pub mod collision;
pub mod pool;
pub mod state;
pub mod tick;
pub mod timer;

pub use anim::{AnimationClip, Animator, Repeat};
pub use collision::{Aabb, Contact, detect_contacts};
pub use pool::{Bullet, BulletPool};
pub use state::{
    Background, Effect, EffectKind, Enemy, GamePhase, GameState, Player, PlayerVisual,
    PointerState,
};
pub use tick::{FrameEvent, GameEvent, TickInput, restart, tick};
pub use timer::RepeatingTimer;
