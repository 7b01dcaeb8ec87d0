//! Spellforge Spells - Casting, resource pools, and projectiles
//!
//! This crate holds the spell simulation proper:
//! - `ManaPool` and `HealthPool`, including damage and healing over time
//! - `SpellDefinition` data and the `SpellCatalog` that loads it
//! - `SpellCaster` and the projectiles it launches
//! - `Arena`, a frame scheduler with a simple overlap pass for collisions

pub mod arena;
pub mod caster;
pub mod catalog;
pub mod damage_type;
pub mod error;
pub mod fx;
pub mod health;
pub mod mana;
pub mod projectile;
pub mod spell;

pub use arena::{Arena, ArenaConfig, Prop, StepSummary};
pub use caster::{apply_spell, CastOutcome, CastRejection, SpellCaster, MAX_SPELL_SLOTS};
pub use catalog::SpellCatalog;
pub use damage_type::DamageType;
pub use error::{CatalogError, SpellError};
pub use fx::{FxRecorder, FxRequest, FxSink, NullFx, TracingFx};
pub use health::{ActiveEffect, HealthPool};
pub use mana::ManaPool;
pub use projectile::{CollisionHit, Projectile, ProjectileState};
pub use spell::{
    EffectDelivery, EffectHandle, ProjectileSettings, SoundHandle, SpellDefinition, SpellFx,
    SpellTargeting,
};
