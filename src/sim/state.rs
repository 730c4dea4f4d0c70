//! Game state and core simulation types
//!
//! `GameState` owns every entity of a run. Hosts read it to draw; only the
//! tick mutates it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::anim::{self, Animator};
use super::pool::BulletPool;
use super::timer::RepeatingTimer;
use crate::config::GameConfig;
use crate::highscores::HighScore;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Run ended, waiting for a restart request
    GameOver,
}

/// How the ship is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerVisual {
    /// Normal sprite (exhaust animation when animated)
    Flying,
    /// Red tint with the hit texture
    Hit,
    /// Replaced by an explosion effect
    Hidden,
}

/// The player's ship
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub alive: bool,
    pub visual: PlayerVisual,
    pub anim: Option<Animator>,
}

impl Player {
    pub fn new(config: &GameConfig, now_ms: u64) -> Self {
        let (x, y) = config.player_start;
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            alive: true,
            visual: PlayerVisual::Flying,
            anim: config
                .has_animated_sprites
                .then(|| Animator::play(anim::FLY, now_ms)),
        }
    }
}

/// A descending enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub active: bool,
    /// Drawn upside down (animated sprites face up in the sheet)
    pub flip_y: bool,
    pub anim: Option<Animator>,
}

/// One-shot visual effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    EnemyExplosion,
    PlayerExplosion,
}

/// A one-shot animation at a fixed position; removed when complete
#[derive(Debug, Clone)]
pub struct Effect {
    pub kind: EffectKind,
    pub pos: Vec2,
    pub anim: Animator,
}

/// Scrolling tile background
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Background {
    /// Tile offset; decreases while playing so the tile scrolls down
    pub scroll_y: f32,
}

/// Pointer (mouse/touch) state that persists between frames
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub down: bool,
}

/// Everything the outcome of a run depends on
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation clock (ms since the state was created)
    pub time_ms: u64,
    /// Ticks processed while playing
    pub frame: u64,
    pub player: Player,
    /// Live enemies in spawn order
    pub enemies: Vec<Enemy>,
    pub bullets: BulletPool,
    pub effects: Vec<Effect>,
    pub background: Background,
    pub pointer: PointerState,
    pub score: u64,
    /// Bullet kills since the last restart
    pub kills: u64,
    pub high_score: HighScore,
    pub muted: bool,
    pub spawn_timer: RepeatingTimer,
    /// Earliest time the next shot may fire; None before the first shot
    pub next_fire_ms: Option<u64>,
    next_id: u32,
}

impl GameState {
    /// Create a new run with the given seed; the spawn timer starts at t=0
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut spawn_timer = RepeatingTimer::new(config.spawn_period_ms);
        spawn_timer.start(0);
        Self {
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            time_ms: 0,
            frame: 0,
            player: Player::new(&config, 0),
            enemies: Vec::new(),
            bullets: BulletPool::new(config.bullet_pool_capacity),
            effects: Vec::new(),
            background: Background::default(),
            pointer: PointerState::default(),
            score: 0,
            kills: 0,
            high_score: HighScore::default(),
            muted: false,
            spawn_timer,
            next_fire_ms: None,
            next_id: 1,
            config,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn one enemy above the top edge at a random column
    pub fn spawn_enemy(&mut self) -> &Enemy {
        let x = self.rng.random_range(0.0..=self.config.screen_width);
        let y = self
            .rng
            .random_range(self.config.spawn_y_min..=self.config.spawn_y_max);
        let animated = self.config.has_animated_sprites;
        let id = self.next_entity_id();
        let now = self.time_ms;
        self.enemies.push(Enemy {
            id,
            pos: Vec2::new(x, y),
            vel: Vec2::new(0.0, self.config.enemy_speed),
            active: true,
            flip_y: animated,
            anim: animated.then(|| Animator::play(anim::ENEMY_FLY, now)),
        });
        log::debug!("Spawned enemy {} at ({:.0}, {:.0})", id, x, y);
        &self.enemies[self.enemies.len() - 1]
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Reset the run at the current clock. High score, mute, seed stream and
    /// configuration carry over.
    pub fn reset_run(&mut self) {
        let now = self.time_ms;
        self.phase = GamePhase::Playing;
        self.player = Player::new(&self.config, now);
        self.enemies.clear();
        self.bullets.clear();
        self.effects.clear();
        self.background = Background::default();
        self.pointer = PointerState::default();
        self.score = 0;
        self.kills = 0;
        self.next_fire_ms = None;
        self.spawn_timer.start(now);
    }

    // === HUD text ===

    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score)
    }

    /// Label for the mute control
    pub fn mute_label(&self) -> &'static str {
        if self.muted { "Unmute" } else { "Mute" }
    }

    /// Centered game over lines, empty while playing
    pub fn game_over_lines(&self) -> Vec<String> {
        if !self.is_game_over() {
            return Vec::new();
        }
        let mut lines = vec!["Game Over".to_string(), "Click to Restart".to_string()];
        if self.config.has_high_score {
            lines.push(format!("High Score: {}", self.high_score.best()));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = GameState::new(GameConfig::hd(), 7);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.pos, Vec2::new(960.0, 800.0));
        assert!(state.player.alive);
        assert!(state.enemies.is_empty());
        assert_eq!(state.bullets.capacity(), 20);
        assert_eq!(state.score, 0);
        assert_eq!(state.spawn_timer.next_due_ms(), Some(1000));
    }

    #[test]
    fn test_spawned_enemy_within_spawn_band() {
        let mut state = GameState::new(GameConfig::classic(), 42);
        for _ in 0..50 {
            let enemy = state.spawn_enemy().clone();
            assert!((0.0..=800.0).contains(&enemy.pos.x));
            assert!((-50.0..=-10.0).contains(&enemy.pos.y));
            assert_eq!(enemy.vel, Vec2::new(0.0, 100.0));
            assert!(enemy.flip_y);
            assert!(enemy.anim.is_some());
        }
        let ids: Vec<u32> = state.enemies.iter().map(|e| e.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_static_sprites_have_no_animation() {
        let config = GameConfig {
            has_animated_sprites: false,
            ..GameConfig::classic()
        };
        let mut state = GameState::new(config, 1);
        assert!(state.player.anim.is_none());
        let enemy = state.spawn_enemy();
        assert!(enemy.anim.is_none());
        assert!(!enemy.flip_y);
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = GameState::new(GameConfig::hd(), 99);
        let mut b = GameState::new(GameConfig::hd(), 99);
        for _ in 0..10 {
            assert_eq!(a.spawn_enemy().pos, b.spawn_enemy().pos);
        }
    }

    #[test]
    fn test_game_over_lines() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        assert!(state.game_over_lines().is_empty());
        state.phase = GamePhase::GameOver;
        state.high_score = HighScore::new(90);
        assert_eq!(
            state.game_over_lines(),
            vec!["Game Over", "Click to Restart", "High Score: 90"]
        );

        state.config.has_high_score = false;
        assert_eq!(state.game_over_lines().len(), 2);
    }
}
