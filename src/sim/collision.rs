//! Arcade collision detection
//!
//! Every body is an axis-aligned box around its center. Contacts are
//! collected after movement and resolved by the tick in a fixed order.

use glam::Vec2;

use super::state::GameState;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extent: Vec2) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Strict overlap; boxes that only touch along an edge do not collide
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// A pair of colliding bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// The ship touched an enemy
    PlayerEnemy { enemy: u32 },
    /// A bullet (pool slot) hit an enemy
    BulletEnemy { bullet: usize, enemy: u32 },
}

/// Find all contacts in the current positions.
///
/// Player contacts come first. Each bullet reports at most one enemy (the
/// first in spawn order) and each enemy is claimed by at most one bullet.
pub fn detect_contacts(state: &GameState) -> Vec<Contact> {
    let mut contacts = Vec::new();
    let enemy_half = state.config.enemy_size.half();

    if state.player.alive {
        let player_box = Aabb::from_center(state.player.pos, state.config.player_size.half());
        for enemy in state.enemies.iter().filter(|e| e.active) {
            if player_box.overlaps(&Aabb::from_center(enemy.pos, enemy_half)) {
                contacts.push(Contact::PlayerEnemy { enemy: enemy.id });
            }
        }
    }

    let bullet_half = state.config.bullet_size.half();
    let mut claimed: Vec<u32> = Vec::new();
    for (slot, bullet) in state.bullets.iter_active() {
        let bullet_box = Aabb::from_center(bullet.pos, bullet_half);
        let hit = state.enemies.iter().find(|e| {
            e.active
                && !claimed.contains(&e.id)
                && bullet_box.overlaps(&Aabb::from_center(e.pos, enemy_half))
        });
        if let Some(enemy) = hit {
            claimed.push(enemy.id);
            contacts.push(Contact::BulletEnemy {
                bullet: slot,
                enemy: enemy.id,
            });
        }
    }

    contacts
}
