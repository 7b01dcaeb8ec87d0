//! Frame scheduler for a small encounter
//!
//! The `Arena` owns casters, props, and in-flight projectiles and drives them
//! one frame at a time. It also stands in for the physics layer: a swept-sphere
//! overlap pass reports projectile collisions. Entities that die or finish
//! during a frame are removed at the end of that frame.

use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use spellforge_core::{EntityId, GameTime};
use tracing::{debug, info};

use crate::caster::{CastOutcome, SpellCaster};
use crate::fx::{FxSink, TracingFx};
use crate::health::HealthPool;
use crate::projectile::{CollisionHit, Projectile, ProjectileState};
use crate::spell::SpellDefinition;

/// Collision shapes used by the overlap pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Radius of every caster's collision sphere
    pub body_radius: f32,
    /// Height of a caster's sphere center above its origin
    pub body_center_height: f32,
    /// Radius of every projectile
    pub projectile_radius: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            body_radius: 0.5,
            body_center_height: 0.5,
            projectile_radius: 0.15,
        }
    }
}

/// A static collider: a training dummy, a wall, or an extra hitbox on a caster
#[derive(Debug)]
pub struct Prop {
    id: EntityId,
    /// Caster this prop belongs to; `position` is then local to that caster
    attached_to: Option<EntityId>,
    pub position: Vec3,
    pub radius: f32,
    health: Option<HealthPool>,
}

impl Prop {
    /// A free-standing prop. Props without health are environment.
    pub fn new(position: Vec3, radius: f32, health: Option<HealthPool>) -> Self {
        Self {
            id: EntityId::new(),
            attached_to: None,
            position,
            radius,
            health,
        }
    }

    /// An extra hitbox on a caster, placed in the caster's local space.
    /// Hits on it count as hits on the caster.
    pub fn attached(caster: EntityId, local_offset: Vec3, radius: f32) -> Self {
        Self {
            id: EntityId::new(),
            attached_to: Some(caster),
            position: local_offset,
            radius,
            health: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn health(&self) -> Option<&HealthPool> {
        self.health.as_ref()
    }

    pub fn health_mut(&mut self) -> Option<&mut HealthPool> {
        self.health.as_mut()
    }

    pub fn is_dead(&self) -> bool {
        self.health.as_ref().is_some_and(HealthPool::is_dead)
    }
}

/// What happened during one `Arena::step`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepSummary {
    /// Projectiles that hit something this frame
    pub impacts: usize,
    /// Projectiles whose lifetime ran out this frame
    pub expired: usize,
    /// Casters and props removed because they died
    pub removed: Vec<EntityId>,
}

#[derive(Debug, Clone, Copy)]
enum Body {
    Caster(usize),
    Prop(usize),
}

/// Owns an encounter's entities and advances them frame by frame
pub struct Arena<F: FxSink = TracingFx> {
    config: ArenaConfig,
    casters: Vec<SpellCaster>,
    props: Vec<Prop>,
    projectiles: Vec<Projectile>,
    fx: F,
}

impl Arena<TracingFx> {
    pub fn new(config: ArenaConfig) -> Self {
        Self::with_fx(config, TracingFx)
    }
}

impl<F: FxSink> Arena<F> {
    pub fn with_fx(config: ArenaConfig, fx: F) -> Self {
        Self {
            config,
            casters: Vec::new(),
            props: Vec::new(),
            projectiles: Vec::new(),
            fx,
        }
    }

    pub fn fx(&self) -> &F {
        &self.fx
    }

    /// Add a caster and return its id
    pub fn spawn_caster(&mut self, caster: SpellCaster) -> EntityId {
        let id = caster.id();
        self.casters.push(caster);
        id
    }

    /// Add a prop and return its id
    pub fn spawn_prop(&mut self, prop: Prop) -> EntityId {
        let id = prop.id();
        self.props.push(prop);
        id
    }

    pub fn caster(&self, id: EntityId) -> Option<&SpellCaster> {
        self.casters.iter().find(|c| c.id() == id)
    }

    pub fn caster_mut(&mut self, id: EntityId) -> Option<&mut SpellCaster> {
        self.casters.iter_mut().find(|c| c.id() == id)
    }

    pub fn prop(&self, id: EntityId) -> Option<&Prop> {
        self.props.iter().find(|p| p.id() == id)
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Cast from a caster's slot. Returns `false` if the caster is unknown or the cast failed.
    pub fn cast_slot(&mut self, caster: EntityId, slot: usize) -> bool {
        let Some(index) = self.casters.iter().position(|c| c.id() == caster) else {
            return false;
        };
        let outcome = self.casters[index].cast_slot(slot, &mut self.fx);
        self.accept(outcome)
    }

    /// Cast a specific spell. Returns `false` if the caster is unknown or the cast failed.
    pub fn cast(&mut self, caster: EntityId, spell: &Arc<SpellDefinition>) -> bool {
        let Some(index) = self.casters.iter().position(|c| c.id() == caster) else {
            return false;
        };
        let outcome = self.casters[index].cast(spell, &mut self.fx);
        self.accept(outcome)
    }

    fn accept(&mut self, outcome: CastOutcome) -> bool {
        let succeeded = outcome.succeeded();
        if let Some(projectile) = outcome.into_projectile() {
            self.projectiles.push(projectile);
        }
        succeeded
    }

    /// Feed a raw frame delta through `time` and step with the result
    pub fn advance(&mut self, time: &mut GameTime, raw_delta: f32) -> StepSummary {
        let delta = time.update(raw_delta);
        self.step(delta)
    }

    /// Advance every entity by `delta` seconds, resolve collisions, then
    /// remove whatever finished this frame.
    pub fn step(&mut self, delta: f32) -> StepSummary {
        let mut summary = StepSummary::default();

        for caster in &mut self.casters {
            caster.tick(delta);
        }
        for prop in &mut self.props {
            if let Some(health) = &mut prop.health {
                health.tick(delta);
            }
        }

        for i in 0..self.projectiles.len() {
            let start = self.projectiles[i].position();
            self.projectiles[i].tick(delta);
            if self.projectiles[i].state() == ProjectileState::Expired {
                summary.expired += 1;
                continue;
            }
            if self.resolve_collisions(i, start) {
                summary.impacts += 1;
            }
        }

        self.projectiles.retain(Projectile::is_alive);

        self.casters.retain(|caster| {
            if caster.is_dead() {
                summary.removed.push(caster.id());
                false
            } else {
                true
            }
        });
        self.props.retain(|prop| {
            if prop.is_dead() {
                summary.removed.push(prop.id());
                false
            } else {
                true
            }
        });
        // Hitboxes go with the caster they were attached to.
        let casters = &self.casters;
        self.props.retain(|prop| {
            prop.attached_to
                .map_or(true, |owner| casters.iter().any(|c| c.id() == owner))
        });

        for id in &summary.removed {
            info!("Entity {} died and was removed", id);
        }
        summary
    }

    /// Test the path swept this frame by projectile `index` against every
    /// body and report hits nearest-first. Returns `true` if one was honored.
    fn resolve_collisions(&mut self, index: usize, start: Vec3) -> bool {
        let end = self.projectiles[index].position();
        let projectile_radius = self.config.projectile_radius;

        let mut candidates: Vec<(f32, Body)> = Vec::new();
        for (i, caster) in self.casters.iter().enumerate() {
            let center = caster.transform.position + Vec3::Y * self.config.body_center_height;
            if let Some(t) = sweep_sphere(start, end, center, self.config.body_radius + projectile_radius) {
                candidates.push((t, Body::Caster(i)));
            }
        }
        for (i, prop) in self.props.iter().enumerate() {
            let center = match prop.attached_to {
                Some(owner) => match self.casters.iter().find(|c| c.id() == owner) {
                    Some(caster) => caster.transform.transform_point(prop.position),
                    None => continue,
                },
                None => prop.position,
            };
            if let Some(t) = sweep_sphere(start, end, center, prop.radius + projectile_radius) {
                candidates.push((t, Body::Prop(i)));
            }
        }
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

        let projectile = &mut self.projectiles[index];
        for (_, body) in candidates {
            let hit = match body {
                Body::Caster(i) => {
                    let caster = &mut self.casters[i];
                    CollisionHit::body(caster.id(), caster.health_mut())
                }
                Body::Prop(i) => {
                    let prop = &mut self.props[i];
                    match prop.attached_to {
                        Some(owner) => CollisionHit {
                            collider: prop.id,
                            root: owner,
                            health: self
                                .casters
                                .iter_mut()
                                .find(|c| c.id() == owner)
                                .and_then(|c| c.health_mut()),
                        },
                        None => CollisionHit {
                            collider: prop.id,
                            root: prop.id,
                            health: prop.health.as_mut(),
                        },
                    }
                }
            };

            if projectile.on_collision(hit, &mut self.fx) {
                debug!("Projectile {} resolved against {:?}", projectile.id(), body);
                return true;
            }
        }
        false
    }
}

/// Earliest fraction `t` in `[0, 1]` along `start..end` at which a point is
/// within `radius` of `center`, if any.
fn sweep_sphere(start: Vec3, end: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let segment = end - start;
    let to_start = start - center;
    let c = to_start.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let a = segment.length_squared();
    if a <= f32::EPSILON {
        return None;
    }
    let b = to_start.dot(segment);
    let discriminant = b * b - a * c;
    if b >= 0.0 || discriminant < 0.0 {
        // Moving away from the sphere, or passing wide of it
        return None;
    }

    let t = (-b - discriminant.sqrt()) / a;
    (t <= 1.0).then_some(t)
}
