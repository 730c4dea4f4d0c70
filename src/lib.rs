//! Skyfire - a vertical arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic game loop controller (movement, spawning, collisions, game state)
//! - `config`: Parameterized game configuration and presets
//! - `persistence`: Durable key/value storage for high score and settings
//! - `audio`: Sound cues with mute handling
//! - `session`: Fixed-step driver tying the simulation to storage and audio
//! - `viewport`: Display surface scaling
//! - `platform`: Terminal (native) and canvas (browser) hosts

pub mod audio;
pub mod config;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod viewport;

pub use config::GameConfig;
pub use highscores::HighScore;
pub use settings::Settings;

use glam::Vec2;

/// Game loop timing constants
pub mod consts {
    /// Fixed simulation step used by the hosts (~60 Hz)
    pub const SIM_STEP_MS: u64 = 16;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Clamp a box center so the whole box stays inside the world rectangle
#[inline]
pub fn clamp_to_world(center: Vec2, half_extent: Vec2, world: Vec2) -> Vec2 {
    let max = (world - half_extent).max(half_extent);
    center.clamp(half_extent, max)
}
