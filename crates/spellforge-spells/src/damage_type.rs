//! Damage types
//!
//! A damage type is a tag carried from the spell into the effects it produces.
//! The simulation itself gives no type any mechanical weight.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Element/school of a damage or healing effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DamageType {
    #[default]
    None,
    Fire,
    Ice,
    Holy,
    Force,
    Arcane,
    Nature,
    Physical,
}

/// Total number of damage types
pub const DAMAGE_TYPE_COUNT: usize = 8;

impl DamageType {
    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Fire => "Fire",
            Self::Ice => "Ice",
            Self::Holy => "Holy",
            Self::Force => "Force",
            Self::Arcane => "Arcane",
            Self::Nature => "Nature",
            Self::Physical => "Physical",
        }
    }

    /// All damage type variants
    pub fn all() -> &'static [DamageType] {
        &[
            Self::None,
            Self::Fire,
            Self::Ice,
            Self::Holy,
            Self::Force,
            Self::Arcane,
            Self::Nature,
            Self::Physical,
        ]
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
