//! Mana pool
//!
//! Tracks mana with optional passive regeneration. Consumption is all-or-nothing.

use spellforge_core::Observers;

use crate::error::SpellError;

/// A clamped mana resource
#[derive(Debug)]
pub struct ManaPool {
    current: f32,
    max: f32,
    /// Mana regenerated per second; zero disables regeneration
    regen_per_second: f32,
    /// Fired with `(current, max)` after every mutation
    pub on_changed: Observers<(f32, f32)>,
}

impl ManaPool {
    /// Create a pool. `start` is clamped into `[0, max]`.
    pub fn new(max: f32, start: f32, regen_per_second: f32) -> Result<Self, SpellError> {
        if !max.is_finite() || max < 0.0 {
            return Err(SpellError::InvalidMaximum {
                pool: "mana",
                value: max,
            });
        }
        if !regen_per_second.is_finite() || regen_per_second < 0.0 {
            return Err(SpellError::InvalidRegen(regen_per_second));
        }

        let start = if start.is_nan() { max } else { start };
        Ok(Self {
            current: start.clamp(0.0, max),
            max,
            regen_per_second,
            on_changed: Observers::new(),
        })
    }

    /// A full pool without regeneration
    pub fn full(max: f32) -> Result<Self, SpellError> {
        Self::new(max, max, 0.0)
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn regen_per_second(&self) -> f32 {
        self.regen_per_second
    }

    /// Mana as a 0.0-1.0 fraction
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }

    /// Spend `cost` if there is enough. A non-positive cost always succeeds
    /// without touching the pool; a non-finite one always fails.
    pub fn try_consume(&mut self, cost: f32) -> bool {
        if !cost.is_finite() {
            return false;
        }
        if cost <= 0.0 {
            return true;
        }
        if self.current < cost {
            return false;
        }
        self.current = (self.current - cost).clamp(0.0, self.max);
        self.raise_changed();
        true
    }

    /// Restore mana, clamped to the maximum. Negative amounts restore nothing.
    pub fn add(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).clamp(0.0, self.max);
        self.raise_changed();
    }

    /// Passive regeneration for one frame
    pub fn tick(&mut self, delta: f32) {
        if self.regen_per_second > 0.0 && self.current < self.max {
            self.current = (self.current + self.regen_per_second * delta.max(0.0)).clamp(0.0, self.max);
            self.raise_changed();
        }
    }

    fn raise_changed(&mut self) {
        self.on_changed.notify(&(self.current, self.max));
    }
}
