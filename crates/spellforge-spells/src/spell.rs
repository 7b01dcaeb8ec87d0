//! Spell definitions
//!
//! A `SpellDefinition` is authored data: loaded once, never mutated, and shared
//! as `Arc<SpellDefinition>` by every caster slot and projectile that uses it.

use serde::{Deserialize, Serialize};

use crate::damage_type::DamageType;
use crate::error::SpellError;

/// How a spell reaches its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpellTargeting {
    /// Applied to the caster's own health pool
    #[serde(alias = "Self")]
    SelfCast,
    /// Launched as a projectile that applies on impact
    #[default]
    Projectile,
}

/// How a spell applies its effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EffectDelivery {
    /// The full amount, once, at cast or impact time
    #[default]
    Instant,
    /// The amount split across periodic ticks over a duration
    OverTime,
}

/// Projectile kinematics, used only by projectile spells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileSettings {
    /// Units per second
    pub speed: f32,
    /// Seconds before the projectile expires without an impact
    pub lifetime: f32,
    /// Forward offset from the caster when spawning
    pub spawn_offset: f32,
}

impl Default for ProjectileSettings {
    fn default() -> Self {
        Self {
            speed: 15.0,
            lifetime: 5.0,
            spawn_offset: 1.0,
        }
    }
}

/// Opaque handle to a visual effect, resolved by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectHandle(pub String);

/// Opaque handle to a sound, resolved by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundHandle(pub String);

impl From<&str> for EffectHandle {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for SoundHandle {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Presentation hooks fired at cast and impact. Unset handles are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellFx {
    pub cast_effect: Option<EffectHandle>,
    pub impact_effect: Option<EffectHandle>,
    pub cast_sound: Option<SoundHandle>,
    pub impact_sound: Option<SoundHandle>,
}

/// Immutable description of a spell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellDefinition {
    pub name: String,
    pub description: String,
    pub targeting: SpellTargeting,
    pub damage_type: DamageType,
    /// True = healing, false = damage
    pub is_healing: bool,
    pub mana_cost: f32,
    pub delivery: EffectDelivery,
    /// Instant: exact amount. OverTime: total amount across the duration.
    pub amount: f32,
    /// Duration of an over-time effect in seconds
    pub duration: f32,
    /// Seconds between over-time ticks
    pub tick_interval: f32,
    pub projectile: ProjectileSettings,
    pub fx: SpellFx,
}

impl Default for SpellDefinition {
    fn default() -> Self {
        Self {
            name: "New Spell".to_string(),
            description: String::new(),
            targeting: SpellTargeting::Projectile,
            damage_type: DamageType::Fire,
            is_healing: false,
            mana_cost: 10.0,
            delivery: EffectDelivery::Instant,
            amount: 25.0,
            duration: 5.0,
            tick_interval: 1.0,
            projectile: ProjectileSettings::default(),
            fx: SpellFx::default(),
        }
    }
}

impl SpellDefinition {
    /// Whether this spell is launched as a projectile
    pub fn is_projectile(&self) -> bool {
        self.targeting == SpellTargeting::Projectile
    }

    /// Whether this spell applies over time
    pub fn is_over_time(&self) -> bool {
        self.delivery == EffectDelivery::OverTime
    }

    /// Check the authoring invariants: non-negative amount and cost, and a
    /// positive duration and tick interval for over-time spells.
    pub fn validate(&self) -> Result<(), SpellError> {
        for (field, value) in [("mana_cost", self.mana_cost), ("amount", self.amount)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SpellError::NegativeField {
                    spell: self.name.clone(),
                    field,
                    value,
                });
            }
        }

        if self.is_over_time() {
            for (field, value) in [("duration", self.duration), ("tick_interval", self.tick_interval)] {
                if !value.is_finite() || value <= 0.0 {
                    return Err(SpellError::NonPositiveTiming {
                        spell: self.name.clone(),
                        field,
                        value,
                    });
                }
            }
        }

        Ok(())
    }
}
