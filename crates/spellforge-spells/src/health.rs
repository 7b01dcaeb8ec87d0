//! Health pool and over-time effects
//!
//! A `HealthPool` takes instant damage and healing, and owns the over-time
//! effects applied to it. Effects stack independently and are advanced by the
//! pool's own `tick`. Once health reaches zero the pool is dead for good.

use spellforge_core::{EntityId, Observers};
use tracing::debug;

use crate::damage_type::DamageType;
use crate::error::SpellError;

/// Lower bound on the re-arm step so a degenerate interval cannot spin
pub const MIN_TICK_INTERVAL: f32 = 0.01;

/// An over-time effect held by a health pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveEffect {
    pub is_healing: bool,
    pub damage_type: DamageType,
    /// Seconds until the effect expires
    pub remaining: f32,
    pub tick_interval: f32,
    /// Seconds until the next tick is due; may go negative within a frame
    pub time_to_next_tick: f32,
    pub amount_per_tick: f32,
    /// Ticks still owed before the effect has delivered its total
    pub ticks_left: u32,
    pub source: Option<EntityId>,
}

impl ActiveEffect {
    /// Whether this effect has expired
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// Current/maximum health plus the effects ticking on it
#[derive(Debug)]
pub struct HealthPool {
    current: f32,
    max: f32,
    dead: bool,
    effects: Vec<ActiveEffect>,
    /// Fired with `(current, max)` after every accepted damage or healing
    pub on_changed: Observers<(f32, f32)>,
    /// Fired once, when health first reaches zero
    pub on_death: Observers<()>,
}

impl HealthPool {
    /// Create a pool. `start` is clamped into `[0, max]`; a pool that starts
    /// at zero is already dead.
    pub fn new(max: f32, start: f32) -> Result<Self, SpellError> {
        if !max.is_finite() || max < 0.0 {
            return Err(SpellError::InvalidMaximum {
                pool: "health",
                value: max,
            });
        }

        let start = if start.is_nan() { max } else { start };
        let current = start.clamp(0.0, max);
        Ok(Self {
            current,
            max,
            dead: current <= 0.0,
            effects: Vec::new(),
            on_changed: Observers::new(),
            on_death: Observers::new(),
        })
    }

    /// A pool at full health
    pub fn full(max: f32) -> Result<Self, SpellError> {
        Self::new(max, max)
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Health as a 0.0-1.0 fraction
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }

    /// Active over-time effects, in application order
    pub fn effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    /// Drop every active effect without applying what they still owe
    pub fn clear_effects(&mut self) {
        self.effects.clear();
    }

    /// Apply immediate typed damage. Ignored once dead.
    pub fn apply_damage(&mut self, amount: f32, damage_type: DamageType, source: Option<EntityId>) {
        if self.dead {
            return;
        }
        self.current = (self.current - amount.max(0.0)).clamp(0.0, self.max);
        self.raise_changed();

        if self.current <= 0.0 {
            self.dead = true;
            self.clear_effects();
            debug!(
                "Health pool died to {} damage from {:?}",
                damage_type, source
            );
            self.on_death.notify(&());
        }
    }

    /// Apply immediate healing. Ignored once dead; healing never revives.
    pub fn apply_healing(&mut self, amount: f32, _damage_type: DamageType, _source: Option<EntityId>) {
        if self.dead {
            return;
        }
        self.current = (self.current + amount.max(0.0)).clamp(0.0, self.max);
        self.raise_changed();
    }

    /// Register an over-time effect delivering `total_amount` across `duration`.
    ///
    /// The total is split into `max(1, round(duration / tick_interval))` equal
    /// ticks. Non-positive timing or a zero total registers nothing.
    pub fn apply_over_time(
        &mut self,
        total_amount: f32,
        duration: f32,
        tick_interval: f32,
        is_healing: bool,
        damage_type: DamageType,
        source: Option<EntityId>,
    ) {
        let valid = duration.is_finite()
            && duration > 0.0
            && tick_interval.is_finite()
            && tick_interval > 0.0
            && total_amount.is_finite()
            && total_amount != 0.0;
        if self.dead || !valid {
            return;
        }

        let ticks = ((duration / tick_interval).round_ties_even() as u32).max(1);
        let amount_per_tick = total_amount / ticks as f32;

        debug!(
            "Over-time {} {}: {} ticks of {} over {}s",
            damage_type,
            if is_healing { "healing" } else { "damage" },
            ticks,
            amount_per_tick,
            duration
        );

        self.effects.push(ActiveEffect {
            is_healing,
            damage_type,
            remaining: duration,
            tick_interval,
            time_to_next_tick: tick_interval,
            amount_per_tick,
            ticks_left: ticks,
            source,
        });
    }

    /// Advance every active effect by `delta` seconds.
    ///
    /// All ticks that come due this frame fire this frame. An effect that
    /// expires this frame delivers whatever it still owes in one application,
    /// then is removed.
    pub fn tick(&mut self, delta: f32) {
        if self.effects.is_empty() {
            return;
        }
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };

        // Back to front so removing an effect never shifts one not yet visited.
        let mut i = self.effects.len();
        while i > 0 {
            i -= 1;

            let effect = &mut self.effects[i];
            effect.time_to_next_tick -= delta;
            effect.remaining -= delta;

            let mut due = 0;
            while effect.ticks_left > 0 && effect.time_to_next_tick <= 0.0 {
                effect.time_to_next_tick += effect.tick_interval.max(MIN_TICK_INTERVAL);
                effect.ticks_left -= 1;
                due += 1;
            }
            let expired = effect.is_expired();
            let owed = if expired {
                std::mem::take(&mut effect.ticks_left)
            } else {
                0
            };
            let snapshot = *effect;

            for _ in 0..due {
                self.apply_tick(&snapshot, snapshot.amount_per_tick);
                if self.dead {
                    // Death already cleared the effect list.
                    return;
                }
            }
            if owed > 0 {
                self.apply_tick(&snapshot, snapshot.amount_per_tick * owed as f32);
                if self.dead {
                    return;
                }
            }

            if expired {
                self.effects.remove(i);
            }
        }
    }

    fn apply_tick(&mut self, effect: &ActiveEffect, amount: f32) {
        let amount = amount.max(0.0);
        if effect.is_healing {
            self.apply_healing(amount, effect.damage_type, effect.source);
        } else {
            self.apply_damage(amount, effect.damage_type, effect.source);
        }
    }

    fn raise_changed(&mut self) {
        self.on_changed.notify(&(self.current, self.max));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn counter(observers: &mut Observers<()>) -> Rc<RefCell<u32>> {
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        observers.subscribe(move |_| *c.borrow_mut() += 1);
        count
    }

    /// Records the size of every health change, signed (damage negative).
    fn change_log(pool: &mut HealthPool) -> Rc<RefCell<Vec<f32>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        let mut last = pool.current();
        pool.on_changed.subscribe(move |(current, _)| {
            l.borrow_mut().push(*current - last);
            last = *current;
        });
        log
    }

    #[test]
    fn test_damage_without_death() {
        let mut pool = HealthPool::full(100.0).unwrap();
        let deaths = counter(&mut pool.on_death);

        pool.apply_damage(30.0, DamageType::Fire, None);
        assert_eq!(pool.current(), 70.0);
        assert!(!pool.is_dead());
        assert_eq!(*deaths.borrow(), 0);
    }

    #[test]
    fn test_lethal_damage_fires_death_once() {
        let mut pool = HealthPool::new(100.0, 20.0).unwrap();
        let deaths = counter(&mut pool.on_death);

        pool.apply_damage(50.0, DamageType::Physical, None);
        assert_eq!(pool.current(), 0.0);
        assert!(pool.is_dead());
        assert_eq!(*deaths.borrow(), 1);

        // Dead pools ignore everything
        pool.apply_damage(10.0, DamageType::Physical, None);
        pool.apply_healing(80.0, DamageType::Holy, None);
        assert_eq!(pool.current(), 0.0);
        assert_eq!(*deaths.borrow(), 1);
    }

    #[test]
    fn test_clamping() {
        let mut pool = HealthPool::new(100.0, 90.0).unwrap();
        pool.apply_healing(25.0, DamageType::Holy, None);
        assert_eq!(pool.current(), 100.0);

        pool.apply_damage(-40.0, DamageType::Fire, None);
        assert_eq!(pool.current(), 100.0);

        pool.apply_healing(-40.0, DamageType::Holy, None);
        assert_eq!(pool.current(), 100.0);

        for amount in [12.5, 33.0, 0.0, 80.0] {
            pool.apply_damage(amount, DamageType::Ice, None);
            assert!(pool.current() >= 0.0 && pool.current() <= pool.max());
        }
    }

    #[test]
    fn test_invalid_maximum_rejected() {
        assert!(matches!(
            HealthPool::new(-10.0, 5.0),
            Err(SpellError::InvalidMaximum { pool: "health", .. })
        ));
        assert!(HealthPool::new(f32::NAN, 5.0).is_err());
    }

    #[test]
    fn test_fraction() {
        let mut pool = HealthPool::new(200.0, 50.0).unwrap();
        assert_eq!(pool.fraction(), 0.25);
        pool.apply_damage(80.0, DamageType::Fire, None);
        assert_eq!(pool.fraction(), 0.0);
        assert_eq!(HealthPool::full(0.0).unwrap().fraction(), 0.0);
    }

    #[test]
    fn test_zero_start_is_dead() {
        let pool = HealthPool::new(100.0, 0.0).unwrap();
        assert!(pool.is_dead());
    }

    #[test]
    fn test_over_time_six_ticks() {
        let mut pool = HealthPool::full(100.0).unwrap();
        let log = change_log(&mut pool);

        pool.apply_over_time(30.0, 3.0, 0.5, false, DamageType::Fire, None);
        assert_eq!(pool.effects().len(), 1);
        assert_eq!(pool.effects()[0].amount_per_tick, 5.0);

        for frame in 0..6 {
            pool.tick(0.5);
            assert_eq!(log.borrow().len(), frame + 1);
        }

        assert_eq!(log.borrow().as_slice(), &[-5.0; 6]);
        assert_eq!(pool.current(), 70.0);
        assert!(pool.effects().is_empty());

        // Nothing fires after expiry
        pool.tick(0.5);
        assert_eq!(log.borrow().len(), 6);
    }

    #[test]
    fn test_no_tick_before_interval() {
        let mut pool = HealthPool::full(100.0).unwrap();
        pool.apply_over_time(10.0, 2.0, 1.0, false, DamageType::Nature, None);

        pool.tick(0.75);
        assert_eq!(pool.current(), 100.0);
        pool.tick(0.25);
        assert_eq!(pool.current(), 95.0);
    }

    #[test]
    fn test_large_delta_fires_all_due_ticks() {
        let mut pool = HealthPool::full(100.0).unwrap();
        let log = change_log(&mut pool);

        pool.apply_over_time(30.0, 3.0, 0.5, false, DamageType::Fire, None);
        pool.tick(1.6);
        assert_eq!(log.borrow().len(), 3);
        assert_eq!(pool.current(), 85.0);

        pool.tick(10.0);
        assert_eq!(log.borrow().len(), 6);
        assert_eq!(pool.current(), 70.0);
        assert!(pool.effects().is_empty());
    }

    #[test]
    fn test_total_conserved_for_inexact_ratio() {
        // 1.1 / 0.3 rounds to 4 ticks of 2.5, but only 3 fit before expiry;
        // the last one lands on the expiry frame.
        let mut pool = HealthPool::full(1000.0).unwrap();
        pool.apply_over_time(10.0, 1.1, 0.3, false, DamageType::Arcane, None);
        assert_eq!(pool.effects()[0].ticks_left, 4);

        let mut frames = 0;
        while !pool.effects().is_empty() && frames < 100 {
            pool.tick(0.1);
            frames += 1;
        }

        assert!(pool.effects().is_empty());
        assert!((pool.current() - 990.0).abs() < 1e-3);
    }

    #[test]
    fn test_tiny_interval_settles_in_one_frame() {
        let mut pool = HealthPool::full(100.0).unwrap();
        let log = change_log(&mut pool);
        pool.apply_over_time(10.0, 1.0, 1e-6, false, DamageType::Arcane, None);
        assert!(pool.effects()[0].ticks_left > 900_000);

        pool.tick(1.0);

        // Ticks are spaced at least MIN_TICK_INTERVAL apart; the rest lands at once
        assert!(log.borrow().len() <= (1.0 / MIN_TICK_INTERVAL) as usize + 2);
        assert!(pool.effects().is_empty());
        assert!((pool.current() - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_owed_remainder_can_kill() {
        let mut pool = HealthPool::new(100.0, 5.0).unwrap();
        let deaths = counter(&mut pool.on_death);
        let log = change_log(&mut pool);
        // 100 ticks of 0.4, but only ten fit in the duration at the minimum spacing
        pool.apply_over_time(40.0, 0.1, 0.001, false, DamageType::Fire, None);

        pool.tick(0.1);

        assert!(pool.is_dead());
        assert!(pool.effects().is_empty());
        assert_eq!(*deaths.borrow(), 1);
        assert_eq!(log.borrow().len(), 11);
    }

    #[test]
    fn test_tick_count_rounds_ties_to_even() {
        let mut pool = HealthPool::full(100.0).unwrap();
        pool.apply_over_time(10.0, 2.5, 1.0, false, DamageType::Fire, None);
        assert_eq!(pool.effects()[0].ticks_left, 2);

        pool.apply_over_time(10.0, 0.2, 1.0, false, DamageType::Fire, None);
        assert_eq!(pool.effects()[1].ticks_left, 1);
        assert_eq!(pool.effects()[1].amount_per_tick, 10.0);
    }

    #[test]
    fn test_invalid_over_time_is_ignored() {
        let mut pool = HealthPool::full(100.0).unwrap();
        pool.apply_over_time(10.0, 0.0, 1.0, false, DamageType::Fire, None);
        pool.apply_over_time(10.0, 3.0, 0.0, false, DamageType::Fire, None);
        pool.apply_over_time(10.0, -1.0, 1.0, false, DamageType::Fire, None);
        pool.apply_over_time(0.0, 3.0, 1.0, false, DamageType::Fire, None);
        assert!(pool.effects().is_empty());
    }

    #[test]
    fn test_effects_stack_independently() {
        let mut pool = HealthPool::full(100.0).unwrap();
        let source = EntityId::new();
        pool.apply_over_time(10.0, 2.0, 1.0, false, DamageType::Fire, Some(source));
        pool.apply_over_time(10.0, 2.0, 1.0, false, DamageType::Fire, Some(source));
        assert_eq!(pool.effects().len(), 2);

        pool.tick(1.0);
        assert_eq!(pool.current(), 90.0);
        pool.tick(1.0);
        assert_eq!(pool.current(), 80.0);
        assert!(pool.effects().is_empty());
    }

    #[test]
    fn test_expiring_effect_does_not_skip_siblings() {
        let mut pool = HealthPool::full(100.0).unwrap();
        // Short effect expires on the first frame; the long ones keep going.
        pool.apply_over_time(4.0, 2.0, 1.0, false, DamageType::Ice, None);
        pool.apply_over_time(1.0, 1.0, 1.0, false, DamageType::Fire, None);
        pool.apply_over_time(6.0, 3.0, 1.0, true, DamageType::Holy, None);

        pool.apply_damage(50.0, DamageType::Physical, None);
        pool.tick(1.0);
        // -2 (ice) -1 (fire) +2 (holy)
        assert_eq!(pool.current(), 49.0);
        assert_eq!(pool.effects().len(), 2);
        assert_eq!(pool.effects()[0].damage_type, DamageType::Ice);
        assert_eq!(pool.effects()[1].damage_type, DamageType::Holy);
    }

    #[test]
    fn test_healing_over_time() {
        let mut pool = HealthPool::new(100.0, 50.0).unwrap();
        pool.apply_over_time(50.0, 5.0, 1.0, true, DamageType::Nature, None);
        for _ in 0..5 {
            pool.tick(1.0);
        }
        assert_eq!(pool.current(), 100.0);
        assert!(pool.effects().is_empty());
    }

    #[test]
    fn test_damage_over_time_can_kill() {
        let mut pool = HealthPool::new(100.0, 12.0).unwrap();
        let deaths = counter(&mut pool.on_death);
        pool.apply_over_time(30.0, 3.0, 0.5, false, DamageType::Fire, None);
        pool.apply_over_time(10.0, 10.0, 5.0, true, DamageType::Holy, None);

        pool.tick(0.5);
        assert_eq!(pool.current(), 7.0);
        pool.tick(0.5);
        assert_eq!(pool.current(), 2.0);
        pool.tick(0.5);

        assert!(pool.is_dead());
        assert_eq!(pool.current(), 0.0);
        assert!(pool.effects().is_empty());
        assert_eq!(*deaths.borrow(), 1);

        pool.tick(5.0);
        pool.apply_over_time(30.0, 3.0, 0.5, true, DamageType::Holy, None);
        assert!(pool.effects().is_empty());
        assert_eq!(pool.current(), 0.0);
    }
}
