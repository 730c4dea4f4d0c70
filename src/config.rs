//! Game configuration
//!
//! One record covers every playfield variant: screen size plus feature
//! toggles (scoring, high score, animated sprites, explosions). Tuning
//! values default to the classic arcade feel and can be overridden from JSON.

use std::fmt;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Named configuration presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// 800x600 playfield with score and animated sprites
    Classic,
    /// 1920x1080 playfield with every feature enabled
    #[default]
    Hd,
}

impl Preset {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "sd" => Some(Preset::Classic),
            "hd" | "full" => Some(Preset::Hd),
            _ => None,
        }
    }

    pub fn config(&self) -> GameConfig {
        match self {
            Preset::Classic => GameConfig::classic(),
            Preset::Hd => GameConfig::hd(),
        }
    }
}

/// Axis-aligned hitbox size in world pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f32,
    pub h: f32,
}

impl Size {
    pub const fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }

    #[inline]
    pub fn half(&self) -> Vec2 {
        Vec2::new(self.w / 2.0, self.h / 2.0)
    }
}

/// Longest accepted spawn period or fire cooldown (one hour)
pub const MAX_PERIOD_MS: u64 = 3_600_000;

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// World width in pixels
    pub screen_width: f32,
    /// World height in pixels
    pub screen_height: f32,
    /// Award points for bullet kills
    pub has_scoring: bool,
    /// Track and persist the best score
    pub has_high_score: bool,
    /// Looping flight animations
    pub has_animated_sprites: bool,
    /// Deaths play explosion effects; otherwise the ship is tinted
    pub has_explosions: bool,

    /// Enemy spawn period (ms)
    pub spawn_period_ms: u64,
    /// Minimum time between two shots (ms)
    pub fire_cooldown_ms: u64,
    /// Maximum concurrent bullets
    pub bullet_pool_capacity: usize,
    /// Keyboard movement speed (px/s, per axis)
    pub player_speed: f32,
    /// Bullet speed (px/s, upward)
    pub bullet_speed: f32,
    /// Enemy speed (px/s, downward)
    pub enemy_speed: f32,
    /// Points per enemy destroyed by a bullet
    pub score_per_kill: u64,
    /// Bullets appear this far above the player center
    pub bullet_spawn_offset: f32,
    /// Enemy spawn height range (negative = above the top edge)
    pub spawn_y_min: f32,
    pub spawn_y_max: f32,
    /// Background tile scroll per playing frame (px)
    pub background_scroll_per_frame: f32,

    pub player_size: Size,
    pub enemy_size: Size,
    pub bullet_size: Size,
    /// Player start position
    pub player_start: (f32, f32),
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::hd()
    }
}

impl GameConfig {
    /// 800x600 variant: score display, animated flight, tinted death, no
    /// high score
    pub fn classic() -> Self {
        Self {
            screen_width: 800.0,
            screen_height: 600.0,
            has_scoring: true,
            has_high_score: false,
            has_animated_sprites: true,
            has_explosions: false,

            spawn_period_ms: 1000,
            fire_cooldown_ms: 250,
            bullet_pool_capacity: 20,
            player_speed: 200.0,
            bullet_speed: 300.0,
            enemy_speed: 100.0,
            score_per_kill: 10,
            bullet_spawn_offset: 20.0,
            spawn_y_min: -50.0,
            spawn_y_max: -10.0,
            background_scroll_per_frame: 2.0,

            player_size: Size::new(48.0, 48.0),
            enemy_size: Size::new(56.0, 56.0),
            bullet_size: Size::new(6.0, 16.0),
            player_start: (400.0, 500.0),
        }
    }

    /// 1920x1080 variant with high score, explosions and mute
    pub fn hd() -> Self {
        Self {
            screen_width: 1920.0,
            screen_height: 1080.0,
            has_high_score: true,
            has_explosions: true,
            player_start: (960.0, 800.0),
            ..Self::classic()
        }
    }

    /// World dimensions as a vector
    #[inline]
    pub fn world(&self) -> Vec2 {
        Vec2::new(self.screen_width, self.screen_height)
    }

    /// Check that the configuration can drive a game
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.screen_width > 0.0 && self.screen_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "screen size must be positive, got {}x{}",
                self.screen_width, self.screen_height
            )));
        }
        if self.spawn_period_ms == 0 {
            return Err(ConfigError::Invalid("spawn_period_ms must be > 0".into()));
        }
        for (name, value) in [
            ("spawn_period_ms", self.spawn_period_ms),
            ("fire_cooldown_ms", self.fire_cooldown_ms),
        ] {
            if value > MAX_PERIOD_MS {
                return Err(ConfigError::Invalid(format!(
                    "{} must be at most {}, got {}",
                    name, MAX_PERIOD_MS, value
                )));
            }
        }
        if self.bullet_pool_capacity == 0 {
            return Err(ConfigError::Invalid(
                "bullet_pool_capacity must be > 0".into(),
            ));
        }
        if self.spawn_y_min > self.spawn_y_max {
            return Err(ConfigError::Invalid(format!(
                "spawn_y_min ({}) is above spawn_y_max ({})",
                self.spawn_y_min, self.spawn_y_max
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take the
    /// `hd` defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Configuration loading/validation failure
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
