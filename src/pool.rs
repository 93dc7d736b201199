//! Free-list arena for explosion effects.
//!
//! Slots are never dropped: a faded explosion returns its index to the free
//! list and the next spawn overwrites it in place, so a long run reaches a
//! steady state with no per-frame allocation.

use crate::constants::EXPLOSION_MAX_AGE;
use crate::entities::Explosion;

/// Index of a slot in an [`ExplosionPool`].
type ExplosionHandle = usize;

#[derive(Clone, Debug, Default)]
pub struct ExplosionPool {
    slots: Vec<Explosion>,
    free: Vec<ExplosionHandle>,
    /// Live handles in spawn order.
    active: Vec<ExplosionHandle>,
}

impl ExplosionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh explosion at `(x, y)`, reusing a free slot if any.
    pub fn spawn(&mut self, x: f32, y: f32) {
        let explosion = Explosion {
            x,
            y,
            age: 0,
            max_age: EXPLOSION_MAX_AGE,
            alpha: 1.0,
        };
        let handle = match self.free.pop() {
            Some(handle) => {
                self.slots[handle] = explosion;
                handle
            }
            None => {
                self.slots.push(explosion);
                self.slots.len() - 1
            }
        };
        self.active.push(handle);
    }

    /// Age every live explosion by one frame and release the faded ones.
    /// Returns how many were released.
    pub fn advance(&mut self) -> usize {
        let slots = &mut self.slots;
        let free = &mut self.free;
        let before = self.active.len();
        self.active.retain(|&handle| {
            let exp = &mut slots[handle];
            exp.age += 1;
            exp.alpha = 1.0 - exp.age as f32 / exp.max_age as f32;
            if exp.is_faded() {
                free.push(handle);
                false
            } else {
                true
            }
        });
        before - self.active.len()
    }

    /// Release every live explosion (used on restart).
    pub fn clear(&mut self) {
        self.free.append(&mut self.active);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Explosion> + '_ {
        self.active.iter().map(move |&h| &self.slots[h])
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Total slots ever allocated (live + free).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
