//! Fixed-capacity bullet pool
//!
//! Slots are allocated once and reused; a shot only succeeds while a slot
//! is free.

use glam::Vec2;

/// A pooled bullet. Inactive slots keep their last position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub active: bool,
}

impl Bullet {
    const IDLE: Bullet = Bullet {
        pos: Vec2::ZERO,
        vel: Vec2::ZERO,
        active: false,
    };
}

#[derive(Debug, Clone)]
pub struct BulletPool {
    slots: Vec<Bullet>,
}

impl BulletPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Bullet::IDLE; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of bullets currently in flight
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|b| b.active).count()
    }

    /// Activate the lowest free slot. Returns its index, or None when full.
    pub fn acquire(&mut self, pos: Vec2, vel: Vec2) -> Option<usize> {
        let slot = self.slots.iter().position(|b| !b.active)?;
        self.slots[slot] = Bullet {
            pos,
            vel,
            active: true,
        };
        Some(slot)
    }

    /// Return a slot to the pool. Returns false if it was already free.
    pub fn release(&mut self, slot: usize) -> bool {
        match self.slots.get_mut(slot) {
            Some(bullet) if bullet.active => {
                bullet.active = false;
                bullet.vel = Vec2::ZERO;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, slot: usize) -> Option<&Bullet> {
        self.slots.get(slot)
    }

    pub fn is_active(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|b| b.active)
    }

    /// Active bullets with their slot index
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &Bullet)> {
        self.slots.iter().enumerate().filter(|(_, b)| b.active)
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (usize, &mut Bullet)> {
        self.slots.iter_mut().enumerate().filter(|(_, b)| b.active)
    }

    /// Deactivate everything (restart)
    pub fn clear(&mut self) {
        self.slots.fill(Bullet::IDLE);
    }
}
