//! Idle/demo mode - the game plays itself
//!
//! Steers under the lowest enemy still above the ship, sidesteps anything
//! about to reach the ship, and keeps the trigger held.

use glam::Vec2;

use super::state::GameState;

/// Horizontal distance considered "lined up" with a target
const AIM_TOLERANCE: f32 = 8.0;
/// Seconds of enemy travel treated as an imminent threat
const DANGER_HORIZON_S: f32 = 1.2;

/// Produce the (axis, fire) input for this frame
pub fn drive(state: &GameState) -> (Vec2, bool) {
    let player = &state.player;
    if !player.alive {
        return (Vec2::ZERO, false);
    }

    let player_half = state.config.player_size.half();
    let enemy_half = state.config.enemy_size.half();
    let reach_x = player_half.x + enemy_half.x;

    // Dodge first: an enemy that will overlap the ship soon
    let danger_band = state.config.enemy_speed * DANGER_HORIZON_S + player_half.y + enemy_half.y;
    let threat = state
        .enemies
        .iter()
        .filter(|e| e.active)
        .filter(|e| (e.pos.x - player.pos.x).abs() < reach_x + AIM_TOLERANCE)
        .filter(|e| {
            let gap = player.pos.y - e.pos.y;
            gap > -(player_half.y + enemy_half.y) && gap < danger_band
        })
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    let mut axis = Vec2::ZERO;
    if let Some(enemy) = threat {
        let away = player.pos.x - enemy.pos.x;
        let room_right = state.config.screen_width - player.pos.x > reach_x * 2.0;
        let room_left = player.pos.x > reach_x * 2.0;
        axis.x = match (away >= 0.0, room_right, room_left) {
            (true, true, _) => 1.0,
            (false, _, true) => -1.0,
            (true, false, _) => -1.0,
            (false, _, false) => 1.0,
        };
    } else {
        // Line up under the lowest enemy still above us
        let target = state
            .enemies
            .iter()
            .filter(|e| e.active && e.pos.y < player.pos.y - player_half.y)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
        if let Some(enemy) = target {
            let dx = enemy.pos.x - player.pos.x;
            if dx.abs() > AIM_TOLERANCE {
                axis.x = dx.signum();
            }
        }
    }

    // Drift back to the home row
    let home_y = state.config.player_start.1;
    let dy = home_y - player.pos.y;
    if dy.abs() > AIM_TOLERANCE {
        axis.y = dy.signum();
    }

    (axis, true)
}
