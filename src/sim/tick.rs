//! Frame update
//!
//! Advances the game state by one host frame. Order within a frame:
//! frame events, spawn ticks, input, movement, off-screen cleanup,
//! collision detection, then score/state changes. Collisions therefore see
//! this frame's post-movement positions.

use glam::Vec2;

use super::anim::{self, Animator};
use super::autopilot;
use super::collision::{Contact, detect_contacts};
use super::state::{Effect, EffectKind, GamePhase, GameState, PlayerVisual};
use crate::clamp_to_world;

/// Discrete input that happened during a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameEvent {
    /// Mouse/touch pressed at a world position
    PointerDown(Vec2),
    /// Pointer moved (only steers while pressed)
    PointerMove(Vec2),
    PointerUp,
    /// Keyboard restart, equivalent to a pointer press while game over
    Restart,
    /// Flip the mute toggle
    ToggleMute,
    /// Contact reported by a host that runs its own physics
    Contact(Contact),
}

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held keyboard axes, each component in [-1, 1] (+y is down)
    pub axis: Vec2,
    /// Fire key held
    pub fire: bool,
    /// Events in arrival order
    pub events: Vec<FrameEvent>,
    /// Demo mode - the autopilot steers and fires
    pub autopilot: bool,
}

/// Something the host should react to (sound, effect, HUD, persistence)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    BulletFired { slot: usize, pos: Vec2 },
    EnemySpawned { id: u32, pos: Vec2 },
    /// Destroyed by a bullet
    EnemyDestroyed { id: u32, pos: Vec2 },
    /// Left the play area through the bottom edge
    EnemyEscaped { id: u32 },
    PlayerDestroyed { pos: Vec2 },
    ScoreChanged(u64),
    GameOver {
        score: u64,
        high_score: u64,
        new_high_score: bool,
    },
    Restarted,
    MuteToggled { muted: bool },
}

/// Advance the game to `now_ms` (host clock, ms since the state was created)
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: u64) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let mut dt = now_ms.saturating_sub(state.time_ms) as f32 / 1000.0;
    state.time_ms = state.time_ms.max(now_ms);

    let mut reported = Vec::new();
    for event in &input.events {
        match *event {
            FrameEvent::ToggleMute => {
                state.muted = !state.muted;
                log::info!("Audio {}", if state.muted { "muted" } else { "unmuted" });
                events.push(GameEvent::MuteToggled { muted: state.muted });
            }
            FrameEvent::PointerDown(_) | FrameEvent::Restart if state.is_game_over() => {
                restart(state, &mut events);
                // The press that restarted does not also start a drag, and
                // contacts reported before it name entities that are gone
                reported.clear();
                // The new run starts now; time spent in game over is not integrated
                dt = 0.0;
            }
            FrameEvent::Restart => {}
            FrameEvent::PointerDown(pos) => {
                state.pointer.down = true;
                move_player_to(state, pos);
            }
            FrameEvent::PointerMove(pos) => {
                if state.pointer.down && !state.is_game_over() {
                    move_player_to(state, pos);
                }
            }
            FrameEvent::PointerUp => state.pointer.down = false,
            FrameEvent::Contact(contact) => reported.push(contact),
        }
    }

    if state.is_game_over() {
        // Only cosmetic effects keep playing
        retire_finished_effects(state);
        return events;
    }

    state.frame += 1;

    for _ in 0..state.spawn_timer.poll(state.time_ms) {
        let enemy = state.spawn_enemy();
        events.push(GameEvent::EnemySpawned {
            id: enemy.id,
            pos: enemy.pos,
        });
    }

    state.background.scroll_y -= state.config.background_scroll_per_frame;

    let (axis, fire) = if input.autopilot {
        autopilot::drive(state)
    } else {
        (input.axis, input.fire)
    };
    state.player.vel = axis.clamp(Vec2::NEG_ONE, Vec2::ONE) * state.config.player_speed;

    if fire || state.pointer.down {
        fire_bullet(state, &mut events);
    }

    integrate(state, dt, &mut events);

    let mut contacts = detect_contacts(state);
    contacts.extend(reported);
    resolve_contacts(state, &contacts, &mut events);

    retire_finished_effects(state);
    events
}

/// Absolute pointer positioning, clamped to the world like keyboard motion
fn move_player_to(state: &mut GameState, pos: Vec2) {
    if !state.player.alive {
        return;
    }
    state.player.pos = clamp_to_world(
        pos,
        state.config.player_size.half(),
        state.config.world(),
    );
}

/// Fire if the cooldown has elapsed and the pool has a free slot
pub fn fire_bullet(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    let now = state.time_ms;
    if state.next_fire_ms.is_some_and(|next| now < next) {
        return false;
    }
    let pos = state.player.pos - Vec2::new(0.0, state.config.bullet_spawn_offset);
    let vel = Vec2::new(0.0, -state.config.bullet_speed);
    let Some(slot) = state.bullets.acquire(pos, vel) else {
        // Pool exhausted: no shot, cooldown untouched
        return false;
    };
    state.next_fire_ms = Some(now.saturating_add(state.config.fire_cooldown_ms));
    log::debug!("Bullet {} fired at {}ms", slot, now);
    events.push(GameEvent::BulletFired { slot, pos });
    true
}

/// Velocity integration and off-screen cleanup
fn integrate(state: &mut GameState, dt: f32, events: &mut Vec<GameEvent>) {
    let world = state.config.world();

    let player = &mut state.player;
    if player.alive {
        player.pos = clamp_to_world(
            player.pos + player.vel * dt,
            state.config.player_size.half(),
            world,
        );
    }

    for (slot, bullet) in state.bullets.iter_active_mut() {
        bullet.pos += bullet.vel * dt;
        if bullet.pos.y < 0.0 {
            bullet.active = false;
            log::trace!("Bullet {} left the screen", slot);
        }
    }

    let bottom = world.y + state.config.enemy_size.half().y;
    for enemy in state.enemies.iter_mut().filter(|e| e.active) {
        enemy.pos += enemy.vel * dt;
        if enemy.pos.y > bottom {
            enemy.active = false;
            events.push(GameEvent::EnemyEscaped { id: enemy.id });
        }
    }
    state.enemies.retain(|e| e.active);
}

fn resolve_contacts(state: &mut GameState, contacts: &[Contact], events: &mut Vec<GameEvent>) {
    // Ship hits end the run before any bullet hit of the same frame counts
    let player_hit = contacts.iter().find_map(|c| match *c {
        Contact::PlayerEnemy { enemy } if state.enemy(enemy).is_some_and(|e| e.active) => {
            Some(enemy)
        }
        _ => None,
    });
    if let Some(enemy) = player_hit {
        on_player_enemy_collision(state, enemy, events);
        return;
    }

    for contact in contacts {
        if let Contact::BulletEnemy { bullet, enemy } = *contact {
            on_bullet_enemy_collision(state, bullet, enemy, events);
        }
    }
}

/// Ship destroyed: freeze the run, stop spawning, record the high score
pub fn on_player_enemy_collision(
    state: &mut GameState,
    enemy_id: u32,
    events: &mut Vec<GameEvent>,
) {
    if state.is_game_over() || !state.player.alive {
        return;
    }
    let now = state.time_ms;
    let explosions = state.config.has_explosions;
    state.phase = GamePhase::GameOver;

    let player = &mut state.player;
    player.alive = false;
    player.vel = Vec2::ZERO;
    player.anim = None;
    let player_pos = player.pos;
    player.visual = if explosions {
        PlayerVisual::Hidden
    } else {
        PlayerVisual::Hit
    };

    if explosions {
        state.effects.push(Effect {
            kind: EffectKind::PlayerExplosion,
            pos: player_pos,
            anim: Animator::play(anim::PLAYER_EXPLODE, now),
        });
        if let Some(enemy) = state.enemy(enemy_id) {
            let pos = enemy.pos;
            state.effects.push(Effect {
                kind: EffectKind::EnemyExplosion,
                pos,
                anim: Animator::play(anim::EXPLODE, now),
            });
        }
    }
    events.push(GameEvent::PlayerDestroyed { pos: player_pos });

    state.spawn_timer.cancel();
    clear_enemies(state);
    state.pointer.down = false;

    let score = state.score;
    let new_high_score = state.config.has_high_score && state.high_score.submit(score);
    log::info!(
        "Game over: score {} (best {}){}",
        score,
        state.high_score.best(),
        if new_high_score { " - new high score!" } else { "" }
    );
    events.push(GameEvent::GameOver {
        score,
        high_score: state.high_score.best(),
        new_high_score,
    });
}

fn clear_enemies(state: &mut GameState) {
    if state.enemies.is_empty() {
        log::warn!("No enemies to clear");
        return;
    }
    log::debug!("Removing {} enemies", state.enemies.len());
    for enemy in &mut state.enemies {
        enemy.active = false;
        enemy.anim = None;
    }
    state.enemies.clear();
}

/// Bullet kill: both bodies retire and the score goes up
pub fn on_bullet_enemy_collision(
    state: &mut GameState,
    bullet: usize,
    enemy_id: u32,
    events: &mut Vec<GameEvent>,
) {
    if state.is_game_over() || !state.bullets.is_active(bullet) {
        return;
    }
    let Some(index) = state.enemies.iter().position(|e| e.id == enemy_id && e.active) else {
        return;
    };
    state.bullets.release(bullet);
    let enemy = state.enemies.remove(index);

    if state.config.has_explosions {
        state.effects.push(Effect {
            kind: EffectKind::EnemyExplosion,
            pos: enemy.pos,
            anim: Animator::play(anim::EXPLODE, state.time_ms),
        });
    }
    events.push(GameEvent::EnemyDestroyed {
        id: enemy.id,
        pos: enemy.pos,
    });

    state.kills += 1;
    if state.config.has_scoring {
        state.score += state.config.score_per_kill;
        events.push(GameEvent::ScoreChanged(state.score));
    }
}

/// Start a fresh run from game over
pub fn restart(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.reset_run();
    log::info!("Restarted at {}ms", state.time_ms);
    events.push(GameEvent::Restarted);
    events.push(GameEvent::ScoreChanged(0));
}

fn retire_finished_effects(state: &mut GameState) {
    let now = state.time_ms;
    state.effects.retain(|e| !e.anim.is_complete(now));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::consts::SIM_STEP_MS;
    use crate::highscores::HighScore;
    use crate::sim::state::Enemy;
    use proptest::prelude::*;

    fn fire_input() -> TickInput {
        TickInput {
            fire: true,
            ..Default::default()
        }
    }

    /// Place an enemy by hand, bypassing the spawner
    fn place_enemy(state: &mut GameState, pos: Vec2, vel: Vec2) -> u32 {
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            pos,
            vel,
            active: true,
            flip_y: false,
            anim: None,
        });
        id
    }

    fn run_until(state: &mut GameState, input: &TickInput, from: u64, to: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let mut t = from;
        while t <= to {
            events.extend(tick(state, input, t));
            t += SIM_STEP_MS;
        }
        events
    }

    fn crash(state: &mut GameState) {
        let pos = state.player.pos;
        place_enemy(state, pos, Vec2::ZERO);
        tick(state, &TickInput::default(), state.time_ms);
        assert!(state.is_game_over());
    }

    #[test]
    fn test_fire_is_rate_limited_by_timestamp() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        tick(&mut state, &fire_input(), 0);
        assert_eq!(state.bullets.active_count(), 1);

        tick(&mut state, &fire_input(), 200);
        assert_eq!(state.bullets.active_count(), 1);

        tick(&mut state, &fire_input(), 249);
        assert_eq!(state.bullets.active_count(), 1);

        tick(&mut state, &fire_input(), 250);
        assert_eq!(state.bullets.active_count(), 2);
    }

    #[test]
    fn test_unbounded_cooldown_saturates() {
        let mut config = GameConfig::hd();
        config.fire_cooldown_ms = u64::MAX;
        let mut state = GameState::new(config, 1);
        tick(&mut state, &fire_input(), 16);
        assert_eq!(state.next_fire_ms, Some(u64::MAX));
        tick(&mut state, &fire_input(), 32);
        assert_eq!(state.bullets.active_count(), 1);
    }

    #[test]
    fn test_bullet_starts_above_player_and_moves_up() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        let events = tick(&mut state, &fire_input(), 0);
        assert!(events.contains(&GameEvent::BulletFired {
            slot: 0,
            pos: Vec2::new(960.0, 780.0),
        }));

        tick(&mut state, &TickInput::default(), 100);
        let bullet = state.bullets.get(0).unwrap();
        assert!((bullet.pos.y - 750.0).abs() < 0.001);
    }

    #[test]
    fn test_bullets_retire_above_top_edge() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        state.spawn_timer.cancel();
        tick(&mut state, &fire_input(), 0);
        // 780px at 300px/s
        run_until(&mut state, &TickInput::default(), 16, 2590);
        assert_eq!(state.bullets.active_count(), 1);
        run_until(&mut state, &TickInput::default(), 2606, 2700);
        assert_eq!(state.bullets.active_count(), 0);
    }

    #[test]
    fn test_full_pool_does_not_consume_cooldown() {
        let config = GameConfig {
            bullet_pool_capacity: 1,
            ..GameConfig::hd()
        };
        let mut state = GameState::new(config, 1);
        tick(&mut state, &fire_input(), 0);
        tick(&mut state, &fire_input(), 300);
        assert_eq!(state.bullets.active_count(), 1);
        assert_eq!(state.next_fire_ms, Some(250));

        state.bullets.release(0);
        tick(&mut state, &fire_input(), 310);
        assert_eq!(state.bullets.active_count(), 1);
        assert_eq!(state.next_fire_ms, Some(560));
    }

    #[test]
    fn test_pointer_press_positions_and_fires() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        let input = TickInput {
            events: vec![FrameEvent::PointerDown(Vec2::new(300.0, 400.0))],
            ..Default::default()
        };
        tick(&mut state, &input, 0);
        assert_eq!(state.player.pos, Vec2::new(300.0, 400.0));
        assert_eq!(state.bullets.active_count(), 1);

        // Dragging keeps steering; release stops steering and firing
        let drag = TickInput {
            events: vec![FrameEvent::PointerMove(Vec2::new(320.0, 410.0))],
            ..Default::default()
        };
        tick(&mut state, &drag, 16);
        assert_eq!(state.player.pos, Vec2::new(320.0, 410.0));

        let release = TickInput {
            events: vec![
                FrameEvent::PointerUp,
                FrameEvent::PointerMove(Vec2::new(900.0, 900.0)),
            ],
            ..Default::default()
        };
        tick(&mut state, &release, 300);
        assert_eq!(state.player.pos, Vec2::new(320.0, 410.0));
        assert_eq!(state.bullets.active_count(), 1);
    }

    #[test]
    fn test_keyboard_axis_moves_and_clamps() {
        let mut state = GameState::new(GameConfig::classic(), 1);
        state.spawn_timer.cancel();
        let left = TickInput {
            axis: Vec2::new(-1.0, 0.0),
            ..Default::default()
        };
        tick(&mut state, &left, 0);
        tick(&mut state, &left, 500);
        assert!((state.player.pos.x - 300.0).abs() < 0.001);
        assert_eq!(state.player.vel, Vec2::new(-200.0, 0.0));

        run_until(&mut state, &left, 516, 10_000);
        assert_eq!(state.player.pos.x, state.config.player_size.w / 2.0);

        tick(&mut state, &TickInput::default(), 10_016);
        assert_eq!(state.player.vel, Vec2::ZERO);
    }

    #[test]
    fn test_spawn_count_over_3500ms() {
        let mut state = GameState::new(GameConfig::classic(), 5);
        let events = run_until(&mut state, &TickInput::default(), 0, 3500);
        let spawned = events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemySpawned { .. }))
            .count();
        assert_eq!(spawned, 3);
        assert_eq!(state.enemies.len(), 3);
    }

    #[test]
    fn test_enemies_descend_monotonically_and_escape() {
        let mut state = GameState::new(GameConfig::classic(), 5);
        state.spawn_timer.cancel();
        let id = place_enemy(&mut state, Vec2::new(100.0, -20.0), Vec2::new(0.0, 100.0));
        let mut last_y = -20.0;
        let mut escaped = false;
        let mut t = 0;
        while t <= 8000 {
            let events = tick(&mut state, &TickInput::default(), t);
            match state.enemy(id) {
                Some(enemy) => {
                    assert!(enemy.pos.y >= last_y);
                    last_y = enemy.pos.y;
                }
                None => {
                    escaped = events.contains(&GameEvent::EnemyEscaped { id });
                    break;
                }
            }
            t += SIM_STEP_MS;
        }
        assert!(escaped);
        assert!(last_y > 600.0);
    }

    #[test]
    fn test_bullet_kill_scores_ten() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        state.spawn_timer.cancel();
        let id = place_enemy(&mut state, Vec2::new(960.0, 700.0), Vec2::ZERO);
        tick(&mut state, &fire_input(), 0);
        let events = run_until(&mut state, &TickInput::default(), 16, 400);

        assert!(state.enemy(id).is_none());
        assert_eq!(state.bullets.active_count(), 0);
        assert_eq!(state.score, 10);
        assert_eq!(state.kills, 1);
        assert!(events.contains(&GameEvent::ScoreChanged(10)));
        assert_eq!(state.effects.len(), 1);
        assert_eq!(state.effects[0].kind, EffectKind::EnemyExplosion);
    }

    #[test]
    fn test_scoring_disabled_still_kills() {
        let config = GameConfig {
            has_scoring: false,
            ..GameConfig::hd()
        };
        let mut state = GameState::new(config, 1);
        state.spawn_timer.cancel();
        place_enemy(&mut state, Vec2::new(960.0, 700.0), Vec2::ZERO);
        tick(&mut state, &fire_input(), 0);
        run_until(&mut state, &TickInput::default(), 16, 400);
        assert!(state.enemies.is_empty());
        assert_eq!(state.kills, 1);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_player_hit_ends_run() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        state.score = 40;
        run_until(&mut state, &TickInput::default(), 0, 2100);
        assert_eq!(state.enemies.len(), 2);

        let pos = state.player.pos;
        place_enemy(&mut state, pos, Vec2::ZERO);
        let events = tick(&mut state, &TickInput::default(), 2116);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(!state.player.alive);
        assert_eq!(state.player.visual, PlayerVisual::Hidden);
        assert!(state.enemies.is_empty());
        assert!(!state.spawn_timer.is_active());
        assert_eq!(state.high_score.best(), 40);
        assert!(events.contains(&GameEvent::GameOver {
            score: 40,
            high_score: 40,
            new_high_score: true,
        }));
        let explosions = state
            .effects
            .iter()
            .filter(|e| e.kind == EffectKind::PlayerExplosion)
            .count();
        assert_eq!(explosions, 1);
    }

    #[test]
    fn test_classic_death_tints_ship_without_explosions() {
        // Classic flies animated sprites but dies with a tint
        let mut state = GameState::new(GameConfig::classic(), 1);
        assert!(state.player.anim.is_some());
        crash(&mut state);
        assert_eq!(state.player.visual, PlayerVisual::Hit);
        assert!(state.effects.is_empty());
    }

    #[test]
    fn test_classic_bullet_kill_leaves_no_effect() {
        let mut state = GameState::new(GameConfig::classic(), 1);
        state.spawn_timer.cancel();
        place_enemy(&mut state, Vec2::new(400.0, 420.0), Vec2::ZERO);
        tick(&mut state, &fire_input(), 0);
        run_until(&mut state, &TickInput::default(), 16, 400);
        assert_eq!(state.score, 10);
        assert!(state.effects.is_empty());
    }

    #[test]
    fn test_high_score_not_tracked_when_disabled() {
        let mut state = GameState::new(GameConfig::classic(), 1);
        state.score = 500;
        crash(&mut state);
        assert_eq!(state.high_score.best(), 0);
    }

    #[test]
    fn test_lower_score_keeps_high_score() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        state.high_score = HighScore::new(100);
        state.score = 30;
        let pos = state.player.pos;
        place_enemy(&mut state, pos, Vec2::ZERO);
        let events = tick(&mut state, &TickInput::default(), 0);
        assert!(events.contains(&GameEvent::GameOver {
            score: 30,
            high_score: 100,
            new_high_score: false,
        }));
    }

    #[test]
    fn test_game_over_freezes_gameplay() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        state.spawn_timer.cancel();
        tick(&mut state, &fire_input(), 0);
        crash(&mut state);

        let player_pos = state.player.pos;
        let bullet_pos = state.bullets.get(0).unwrap().pos;
        let score = state.score;
        let input = TickInput {
            axis: Vec2::new(1.0, 1.0),
            fire: true,
            events: vec![FrameEvent::PointerMove(Vec2::new(10.0, 10.0))],
            autopilot: false,
        };
        let events = run_until(&mut state, &input, 16, 10_000);

        assert!(events.is_empty());
        assert_eq!(state.player.pos, player_pos);
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, score);
        assert_eq!(state.bullets.get(0).unwrap().pos, bullet_pos);
        // Explosions finished even though gameplay is frozen
        assert!(state.effects.is_empty());
    }

    #[test]
    fn test_restart_resets_run() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        state.score = 70;
        tick(&mut state, &fire_input(), 0);
        crash(&mut state);
        assert_eq!(state.bullets.active_count(), 1);
        let crash_time = state.time_ms;

        let press = TickInput {
            events: vec![FrameEvent::PointerDown(Vec2::new(5.0, 5.0))],
            ..Default::default()
        };
        let events = tick(&mut state, &press, crash_time + 3000);
        assert!(events.contains(&GameEvent::Restarted));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.kills, 0);
        assert_eq!(state.high_score.best(), 70);
        assert!(state.player.alive);
        assert_eq!(state.player.pos, Vec2::new(960.0, 800.0));
        assert!(!state.pointer.down);
        assert_eq!(state.bullets.active_count(), 0);

        // Spawner resumes one period after the restart
        let restart_time = state.time_ms;
        let events = run_until(
            &mut state,
            &TickInput::default(),
            restart_time + 16,
            restart_time + 2000,
        );
        let spawned = events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemySpawned { .. }))
            .count();
        assert_eq!(spawned, 2);
    }

    #[test]
    fn test_restart_press_keeps_rest_of_batch() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        crash(&mut state);
        let press = TickInput {
            events: vec![
                FrameEvent::PointerDown(Vec2::new(100.0, 100.0)),
                FrameEvent::ToggleMute,
            ],
            ..Default::default()
        };
        let now = state.time_ms + 500;
        let events = tick(&mut state, &press, now);
        assert!(events.contains(&GameEvent::Restarted));
        assert!(events.contains(&GameEvent::MuteToggled { muted: true }));
        assert!(state.muted);
        assert_eq!(state.phase, GamePhase::Playing);
        // The restarting press is not a drag
        assert!(!state.pointer.down);
        assert_eq!(state.player.pos, Vec2::new(960.0, 800.0));
    }

    #[test]
    fn test_restart_frame_does_not_integrate_game_over_time() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        crash(&mut state);
        let input = TickInput {
            axis: Vec2::new(1.0, 0.0),
            events: vec![FrameEvent::Restart],
            ..Default::default()
        };
        let now = state.time_ms + 5000;
        tick(&mut state, &input, now);
        assert_eq!(state.player.pos, Vec2::new(960.0, 800.0));
        assert_eq!(state.player.vel, Vec2::new(200.0, 0.0));
    }

    #[test]
    fn test_restart_ignored_while_playing() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        state.score = 20;
        let input = TickInput {
            events: vec![FrameEvent::Restart],
            ..Default::default()
        };
        let events = tick(&mut state, &input, 0);
        assert!(!events.contains(&GameEvent::Restarted));
        assert_eq!(state.score, 20);
    }

    #[test]
    fn test_mute_toggles_in_any_phase() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        let input = TickInput {
            events: vec![FrameEvent::ToggleMute],
            ..Default::default()
        };
        let events = tick(&mut state, &input, 0);
        assert!(state.muted);
        assert_eq!(state.mute_label(), "Unmute");
        assert!(events.contains(&GameEvent::MuteToggled { muted: true }));

        crash(&mut state);
        tick(&mut state, &input, 100);
        assert!(!state.muted);
        assert_eq!(state.mute_label(), "Mute");
    }

    #[test]
    fn test_reported_contacts_for_dead_entities_are_ignored() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        state.spawn_timer.cancel();
        let input = TickInput {
            events: vec![
                FrameEvent::Contact(Contact::PlayerEnemy { enemy: 999 }),
                FrameEvent::Contact(Contact::BulletEnemy { bullet: 3, enemy: 999 }),
            ],
            ..Default::default()
        };
        tick(&mut state, &input, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_reported_bullet_contact_scores() {
        let mut state = GameState::new(GameConfig::hd(), 1);
        state.spawn_timer.cancel();
        tick(&mut state, &fire_input(), 0);
        let id = place_enemy(&mut state, Vec2::new(50.0, 50.0), Vec2::ZERO);
        let input = TickInput {
            events: vec![
                FrameEvent::Contact(Contact::BulletEnemy { bullet: 0, enemy: id }),
                FrameEvent::Contact(Contact::BulletEnemy { bullet: 0, enemy: id }),
            ],
            ..Default::default()
        };
        tick(&mut state, &input, 16);
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(GameConfig::hd(), 2024);
        let mut b = GameState::new(GameConfig::hd(), 2024);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let events_a = run_until(&mut a, &input, 0, 20_000);
        let events_b = run_until(&mut b, &input, 0, 20_000);
        assert_eq!(events_a, events_b);
        assert_eq!(a.score, b.score);
        assert_eq!(a.player.pos, b.player.pos);
    }

    proptest! {
        #[test]
        fn score_is_ten_per_kill(seed in any::<u64>(), steps in 50u64..1500) {
            let mut state = GameState::new(GameConfig::hd(), seed);
            let input = TickInput { autopilot: true, ..Default::default() };
            for step in 0..steps {
                tick(&mut state, &input, step * SIM_STEP_MS);
                prop_assert_eq!(state.score % 10, 0);
                prop_assert_eq!(state.score, state.kills * 10);
            }
        }

        #[test]
        fn fire_never_bursts(times in prop::collection::vec(0u64..5_000, 1..40)) {
            let mut times = times;
            times.sort();
            let mut state = GameState::new(GameConfig::hd(), 3);
            state.spawn_timer.cancel();
            let mut shots: Vec<u64> = Vec::new();
            for &t in &times {
                let events = tick(&mut state, &fire_input(), t);
                if events.iter().any(|e| matches!(e, GameEvent::BulletFired { .. })) {
                    shots.push(t);
                }
            }
            for pair in shots.windows(2) {
                prop_assert!(pair[1] - pair[0] >= 250);
            }
        }
    }
}
