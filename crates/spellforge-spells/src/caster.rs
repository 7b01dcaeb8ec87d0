//! Spell casting
//!
//! `SpellCaster` spends mana, fires the cast presentation hooks, and delivers a
//! spell either to its own health pool or as a projectile. [`apply_spell`] is
//! the one place that decides what a spell does to a target; self-casts and
//! projectile impacts both go through it.

use std::sync::Arc;

use glam::Vec3;
use spellforge_core::{EntityId, Observers, Transform};
use tracing::debug;

use crate::fx::FxSink;
use crate::health::HealthPool;
use crate::mana::ManaPool;
use crate::projectile::Projectile;
use crate::spell::{EffectDelivery, SpellDefinition, SpellTargeting};

/// Number of quick-cast slots a caster has
pub const MAX_SPELL_SLOTS: usize = 4;

/// Height above the caster's origin at which projectiles spawn
pub const PROJECTILE_SPAWN_HEIGHT: f32 = 0.5;

/// Why a cast did not happen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastRejection {
    /// Slot index out of range, or nothing equipped there
    EmptySlot,
    /// Not enough mana for the spell's cost
    InsufficientMana,
}

/// Result of a cast request
#[derive(Debug)]
pub enum CastOutcome {
    /// Nothing happened; no mana spent, no hooks fired
    Rejected(CastRejection),
    /// The spell was applied to the caster's own health pool
    SelfApplied,
    /// A projectile was created; the caller owns it from here
    Launched(Projectile),
}

impl CastOutcome {
    /// Whether the cast went through
    pub fn succeeded(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    /// The launched projectile, if any
    pub fn into_projectile(self) -> Option<Projectile> {
        match self {
            Self::Launched(projectile) => Some(projectile),
            _ => None,
        }
    }
}

/// Apply a spell's effect to a target. Does nothing without a target or spell.
pub fn apply_spell(
    target: Option<&mut HealthPool>,
    spell: Option<&SpellDefinition>,
    source: Option<EntityId>,
) {
    let (Some(target), Some(spell)) = (target, spell) else {
        return;
    };

    match spell.delivery {
        EffectDelivery::Instant => {
            if spell.is_healing {
                target.apply_healing(spell.amount, spell.damage_type, source);
            } else {
                target.apply_damage(spell.amount, spell.damage_type, source);
            }
        }
        EffectDelivery::OverTime => {
            target.apply_over_time(
                spell.amount,
                spell.duration,
                spell.tick_interval,
                spell.is_healing,
                spell.damage_type,
                source,
            );
        }
    }
}

/// An entity that can cast spells: owns its mana and, optionally, its own health
#[derive(Debug)]
pub struct SpellCaster {
    id: EntityId,
    pub transform: Transform,
    mana: ManaPool,
    health: Option<HealthPool>,
    slots: Vec<Option<Arc<SpellDefinition>>>,
    /// Projectile spawn point in the caster's local space
    spawn_point: Option<Vec3>,
    /// Fired after every successful cast
    pub on_cast: Observers<Arc<SpellDefinition>>,
}

impl SpellCaster {
    pub fn new(id: EntityId, transform: Transform, mana: ManaPool, health: Option<HealthPool>) -> Self {
        Self {
            id,
            transform,
            mana,
            health,
            slots: vec![None; MAX_SPELL_SLOTS],
            spawn_point: None,
            on_cast: Observers::new(),
        }
    }

    /// Spawn projectiles from a fixed point in local space instead of the
    /// spell's forward offset
    pub fn with_spawn_point(mut self, local_offset: Vec3) -> Self {
        self.spawn_point = Some(local_offset);
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn mana(&self) -> &ManaPool {
        &self.mana
    }

    pub fn health(&self) -> Option<&HealthPool> {
        self.health.as_ref()
    }

    pub fn health_mut(&mut self) -> Option<&mut HealthPool> {
        self.health.as_mut()
    }

    /// Whether the caster's own health pool is dead. Casters without one never die.
    pub fn is_dead(&self) -> bool {
        self.health.as_ref().is_some_and(HealthPool::is_dead)
    }

    /// Put a spell in a slot, returning what was there. Out-of-range slots are ignored.
    pub fn equip(
        &mut self,
        slot: usize,
        spell: Option<Arc<SpellDefinition>>,
    ) -> Option<Arc<SpellDefinition>> {
        let entry = self.slots.get_mut(slot)?;
        std::mem::replace(entry, spell)
    }

    /// The spell in a slot, if the slot exists and is filled
    pub fn spell_in_slot(&self, slot: usize) -> Option<&Arc<SpellDefinition>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Cast whatever is equipped in `slot`
    pub fn cast_slot(&mut self, slot: usize, fx: &mut dyn FxSink) -> CastOutcome {
        let Some(spell) = self.spell_in_slot(slot).cloned() else {
            debug!("{} tried to cast from empty slot {}", self.id, slot);
            return CastOutcome::Rejected(CastRejection::EmptySlot);
        };
        self.cast(&spell, fx)
    }

    /// Cast a spell: spend its mana cost, fire the cast hooks, then deliver it.
    pub fn cast(&mut self, spell: &Arc<SpellDefinition>, fx: &mut dyn FxSink) -> CastOutcome {
        if !self.mana.try_consume(spell.mana_cost) {
            debug!(
                "{} cannot afford '{}' ({} < {})",
                self.id,
                spell.name,
                self.mana.current(),
                spell.mana_cost
            );
            return CastOutcome::Rejected(CastRejection::InsufficientMana);
        }

        if let Some(effect) = &spell.fx.cast_effect {
            fx.spawn_effect(effect, self.transform.position, self.transform.rotation);
        }
        if let Some(sound) = &spell.fx.cast_sound {
            fx.play_sound(sound, self.transform.position);
        }

        let outcome = match spell.targeting {
            SpellTargeting::SelfCast => {
                apply_spell(self.health.as_mut(), Some(spell.as_ref()), Some(self.id));
                CastOutcome::SelfApplied
            }
            SpellTargeting::Projectile => CastOutcome::Launched(self.spawn_projectile(spell)),
        };

        debug!("{} cast '{}'", self.id, spell.name);
        self.on_cast.notify(spell);
        outcome
    }

    /// Advance the caster's own pools by one frame
    pub fn tick(&mut self, delta: f32) {
        self.mana.tick(delta);
        if let Some(health) = &mut self.health {
            health.tick(delta);
        }
    }

    fn spawn_projectile(&self, spell: &Arc<SpellDefinition>) -> Projectile {
        let forward = self.transform.forward();
        let position = match self.spawn_point {
            Some(local) => self.transform.transform_point(local),
            None => {
                self.transform.position
                    + forward * spell.projectile.spawn_offset.max(0.0)
                    + Vec3::Y * PROJECTILE_SPAWN_HEIGHT
            }
        };
        Projectile::new(Some(Arc::clone(spell)), self.id, position, forward)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::damage_type::DamageType;
    use crate::fx::FxRecorder;
    use crate::spell::SpellFx;

    fn caster(mana: f32, health: f32) -> SpellCaster {
        SpellCaster::new(
            EntityId::new(),
            Transform::default(),
            ManaPool::new(100.0, mana, 0.0).unwrap(),
            Some(HealthPool::new(100.0, health).unwrap()),
        )
    }

    fn heal(amount: f32, cost: f32) -> Arc<SpellDefinition> {
        Arc::new(SpellDefinition {
            name: "Instant Heal".to_string(),
            targeting: SpellTargeting::SelfCast,
            damage_type: DamageType::Holy,
            is_healing: true,
            mana_cost: cost,
            amount,
            fx: SpellFx {
                cast_effect: Some("heal_cast".into()),
                cast_sound: Some("heal_chime".into()),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn bolt(cost: f32) -> Arc<SpellDefinition> {
        Arc::new(SpellDefinition {
            name: "Eldritch Blast".to_string(),
            damage_type: DamageType::Force,
            mana_cost: cost,
            amount: 40.0,
            fx: SpellFx {
                cast_effect: Some("bolt_cast".into()),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[test]
    fn test_insufficient_mana_rejects_without_side_effects() {
        let mut caster = caster(5.0, 50.0);
        let mut fx = FxRecorder::new();
        let casts = Rc::new(RefCell::new(0));
        let c = Rc::clone(&casts);
        caster.on_cast.subscribe(move |_| *c.borrow_mut() += 1);

        let outcome = caster.cast(&heal(30.0, 10.0), &mut fx);

        assert!(matches!(
            outcome,
            CastOutcome::Rejected(CastRejection::InsufficientMana)
        ));
        assert!(!outcome.succeeded());
        assert!(fx.is_empty());
        assert_eq!(caster.mana().current(), 5.0);
        assert_eq!(caster.health().unwrap().current(), 50.0);
        assert_eq!(*casts.borrow(), 0);
    }

    #[test]
    fn test_self_cast_heals_and_spends_mana() {
        let mut caster = caster(50.0, 40.0);
        let mut fx = FxRecorder::new();
        let cast_names = Rc::new(RefCell::new(Vec::new()));
        let names = Rc::clone(&cast_names);
        caster
            .on_cast
            .subscribe(move |spell| names.borrow_mut().push(spell.name.clone()));

        let outcome = caster.cast(&heal(50.0, 20.0), &mut fx);

        assert!(matches!(outcome, CastOutcome::SelfApplied));
        assert_eq!(caster.mana().current(), 30.0);
        assert_eq!(caster.health().unwrap().current(), 90.0);
        assert_eq!(fx.effects(), vec!["heal_cast"]);
        assert_eq!(fx.sounds(), vec!["heal_chime"]);
        assert_eq!(cast_names.borrow().as_slice(), &["Instant Heal".to_string()]);
    }

    #[test]
    fn test_self_cast_without_health_still_succeeds() {
        let mut caster = SpellCaster::new(
            EntityId::new(),
            Transform::default(),
            ManaPool::full(100.0).unwrap(),
            None,
        );
        let outcome = caster.cast(&heal(50.0, 20.0), &mut FxRecorder::new());
        assert!(outcome.succeeded());
        assert_eq!(caster.mana().current(), 80.0);
    }

    #[test]
    fn test_projectile_spawns_ahead_of_caster() {
        let mut caster = caster(100.0, 100.0);
        caster.transform = Transform::facing(Vec3::new(2.0, 0.0, 0.0), Vec3::X);

        let projectile = caster
            .cast(&bolt(12.0), &mut FxRecorder::new())
            .into_projectile()
            .unwrap();

        // default spawn offset is 1 unit forward, plus the fixed height
        let expected = Vec3::new(3.0, PROJECTILE_SPAWN_HEIGHT, 0.0);
        assert!((projectile.position() - expected).length() < 1e-4);
        assert!((projectile.direction() - Vec3::X).length() < 1e-4);
        // Spawned facing the caster's forward
        assert!((projectile.rotation() * Vec3::NEG_Z - caster.transform.forward()).length() < 1e-4);
        assert!((projectile.rotation() * Vec3::NEG_Z - Vec3::X).length() < 1e-4);
        assert_eq!(projectile.owner(), caster.id());
        assert_eq!(caster.mana().current(), 88.0);
    }

    #[test]
    fn test_explicit_spawn_point() {
        let mut caster = caster(100.0, 100.0).with_spawn_point(Vec3::new(0.0, 1.5, -0.5));
        caster.transform = Transform::facing(Vec3::ZERO, Vec3::X);

        let projectile = caster
            .cast(&bolt(0.0), &mut FxRecorder::new())
            .into_projectile()
            .unwrap();

        assert!((projectile.position() - Vec3::new(0.5, 1.5, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_negative_spawn_offset_clamped() {
        let mut caster = caster(100.0, 100.0);
        let spell = Arc::new(SpellDefinition {
            projectile: crate::spell::ProjectileSettings {
                spawn_offset: -4.0,
                ..Default::default()
            },
            ..Default::default()
        });

        let projectile = caster
            .cast(&spell, &mut FxRecorder::new())
            .into_projectile()
            .unwrap();
        assert_eq!(projectile.position(), Vec3::new(0.0, PROJECTILE_SPAWN_HEIGHT, 0.0));
    }

    #[test]
    fn test_cast_slot() {
        let mut caster = caster(100.0, 50.0);
        let mut fx = FxRecorder::new();
        assert!(caster.equip(1, Some(heal(10.0, 5.0))).is_none());
        assert!(caster.equip(MAX_SPELL_SLOTS, Some(heal(10.0, 5.0))).is_none());

        assert!(matches!(
            caster.cast_slot(0, &mut fx),
            CastOutcome::Rejected(CastRejection::EmptySlot)
        ));
        assert!(matches!(
            caster.cast_slot(99, &mut fx),
            CastOutcome::Rejected(CastRejection::EmptySlot)
        ));
        assert!(caster.cast_slot(1, &mut fx).succeeded());
        assert_eq!(caster.health().unwrap().current(), 60.0);
        assert_eq!(caster.mana().current(), 95.0);
    }

    #[test]
    fn test_apply_spell_over_time() {
        let mut target = HealthPool::full(100.0).unwrap();
        let spell = SpellDefinition {
            delivery: EffectDelivery::OverTime,
            amount: 30.0,
            duration: 3.0,
            tick_interval: 0.5,
            ..Default::default()
        };
        let source = EntityId::new();

        apply_spell(Some(&mut target), Some(&spell), Some(source));

        let effect = target.effects()[0];
        assert_eq!(effect.amount_per_tick, 5.0);
        assert_eq!(effect.damage_type, DamageType::Fire);
        assert_eq!(effect.source, Some(source));
        assert_eq!(target.current(), 100.0);
    }

    #[test]
    fn test_apply_spell_without_target_or_spell() {
        let mut target = HealthPool::full(100.0).unwrap();
        apply_spell(Some(&mut target), None, None);
        apply_spell(None, Some(&SpellDefinition::default()), None);
        assert_eq!(target.current(), 100.0);
    }

    #[test]
    fn test_tick_regenerates_and_advances_effects() {
        let mut caster = SpellCaster::new(
            EntityId::new(),
            Transform::default(),
            ManaPool::new(100.0, 0.0, 10.0).unwrap(),
            Some(HealthPool::new(100.0, 50.0).unwrap()),
        );
        let regen = Arc::new(SpellDefinition {
            targeting: SpellTargeting::SelfCast,
            is_healing: true,
            mana_cost: 0.0,
            delivery: EffectDelivery::OverTime,
            amount: 50.0,
            duration: 5.0,
            tick_interval: 1.0,
            ..Default::default()
        });
        caster.cast(&regen, &mut FxRecorder::new());

        caster.tick(1.0);
        assert_eq!(caster.mana().current(), 10.0);
        assert_eq!(caster.health().unwrap().current(), 60.0);
    }
}
