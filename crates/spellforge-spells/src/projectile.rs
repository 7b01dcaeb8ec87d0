//! Spell projectiles
//!
//! A projectile flies in a straight line until it hits something or runs out
//! of lifetime. Collisions are detected elsewhere and reported through
//! [`Projectile::on_collision`]; the first one that is not the owner ends the flight.

use std::sync::Arc;

use glam::{Quat, Vec3};
use spellforge_core::{EntityId, Transform};
use tracing::debug;

use crate::caster::apply_spell;
use crate::fx::FxSink;
use crate::health::HealthPool;
use crate::spell::SpellDefinition;

/// Speed used when a projectile carries no spell
pub const DEFAULT_PROJECTILE_SPEED: f32 = 10.0;

/// Lifetime used when the spell is missing or gives a non-positive one
pub const DEFAULT_PROJECTILE_LIFETIME: f32 = 5.0;

/// Lifecycle of a projectile. `Hit` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectileState {
    Flying,
    /// Collided with a body or the environment
    Hit,
    /// Lifetime ran out without a collision
    Expired,
}

/// A collision reported by the physics layer
#[derive(Debug)]
pub struct CollisionHit<'a> {
    /// The collider that was touched
    pub collider: EntityId,
    /// The entity the collider belongs to; used for owner checks
    pub root: EntityId,
    /// Health pool on the root entity, if it has one
    pub health: Option<&'a mut HealthPool>,
}

impl<'a> CollisionHit<'a> {
    /// A hit on an entity's own collider
    pub fn body(root: EntityId, health: Option<&'a mut HealthPool>) -> Self {
        Self {
            collider: root,
            root,
            health,
        }
    }

    /// A hit on level geometry with no health
    pub fn environment(collider: EntityId) -> Self {
        Self {
            collider,
            root: collider,
            health: None,
        }
    }
}

/// A moving body carrying a spell to whatever it hits first
#[derive(Debug)]
pub struct Projectile {
    id: EntityId,
    spell: Option<Arc<SpellDefinition>>,
    owner: EntityId,
    direction: Vec3,
    transform: Transform,
    remaining_lifetime: f32,
    state: ProjectileState,
}

impl Projectile {
    /// Launch a projectile from `position` along `direction` (normalized here).
    pub fn new(
        spell: Option<Arc<SpellDefinition>>,
        owner: EntityId,
        position: Vec3,
        direction: Vec3,
    ) -> Self {
        let direction = direction.normalize_or_zero();
        let remaining_lifetime = spell
            .as_ref()
            .map(|s| s.projectile.lifetime)
            .filter(|lifetime| *lifetime > 0.0)
            .unwrap_or(DEFAULT_PROJECTILE_LIFETIME);

        Self {
            id: EntityId::new(),
            spell,
            owner,
            direction,
            transform: Transform::facing(position, direction),
            remaining_lifetime,
            state: ProjectileState::Flying,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn remaining_lifetime(&self) -> f32 {
        self.remaining_lifetime
    }

    pub fn state(&self) -> ProjectileState {
        self.state
    }

    /// Whether the projectile is still in flight
    pub fn is_alive(&self) -> bool {
        self.state == ProjectileState::Flying
    }

    /// Units per second along `direction`
    pub fn speed(&self) -> f32 {
        self.spell
            .as_ref()
            .map(|s| s.projectile.speed.max(0.0))
            .unwrap_or(DEFAULT_PROJECTILE_SPEED)
    }

    /// Move for one frame and age. Terminal projectiles do not move.
    pub fn tick(&mut self, delta: f32) {
        if !self.is_alive() {
            return;
        }
        let delta = delta.max(0.0);

        self.transform.translate(self.direction * self.speed() * delta);
        self.remaining_lifetime -= delta;

        if self.remaining_lifetime <= 0.0 {
            self.state = ProjectileState::Expired;
            debug!("Projectile {} expired at {:?}", self.id, self.position());
        }
    }

    /// Handle a reported collision. Returns `true` if it ended the flight.
    ///
    /// Hits on the owner (by root entity) are ignored, as is anything after
    /// the first honored hit.
    pub fn on_collision(&mut self, hit: CollisionHit<'_>, fx: &mut dyn FxSink) -> bool {
        if !self.is_alive() || hit.root == self.owner {
            return false;
        }

        let position = self.position();
        let spell = self.spell.as_deref();

        match hit.health {
            Some(health) => {
                apply_spell(Some(health), spell, Some(self.owner));
                if let Some(spell) = spell {
                    if let Some(effect) = &spell.fx.impact_effect {
                        fx.spawn_effect(effect, position, Quat::IDENTITY);
                    }
                    if let Some(sound) = &spell.fx.impact_sound {
                        fx.play_sound(sound, position);
                    }
                }
                debug!("Projectile {} hit {} (collider {})", self.id, hit.root, hit.collider);
            }
            None => {
                if let Some(effect) = spell.and_then(|s| s.fx.impact_effect.as_ref()) {
                    fx.spawn_effect(effect, position, Quat::IDENTITY);
                }
                debug!("Projectile {} hit environment {}", self.id, hit.collider);
            }
        }

        self.state = ProjectileState::Hit;
        true
    }
}
