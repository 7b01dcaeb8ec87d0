//! Spell catalog
//!
//! Authored spell data, validated once at load time and handed out as shared
//! `Arc<SpellDefinition>`s. TOML catalogs use `[[spell]]` tables; JSON catalogs
//! are a top-level array.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::damage_type::DamageType;
use crate::error::CatalogError;
use crate::spell::{EffectDelivery, ProjectileSettings, SpellDefinition, SpellFx, SpellTargeting};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "spell")]
    spells: Vec<SpellDefinition>,
}

/// A read-only set of spells keyed by name
#[derive(Debug, Clone, Default)]
pub struct SpellCatalog {
    spells: Vec<Arc<SpellDefinition>>,
    by_name: HashMap<String, usize>,
}

impl SpellCatalog {
    /// Build a catalog, validating every spell and rejecting duplicate names
    pub fn from_spells(spells: Vec<SpellDefinition>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for spell in spells {
            spell.validate()?;
            if catalog.by_name.contains_key(&spell.name) {
                return Err(CatalogError::DuplicateName(spell.name));
            }
            catalog.by_name.insert(spell.name.clone(), catalog.spells.len());
            catalog.spells.push(Arc::new(spell));
        }
        Ok(catalog)
    }

    /// Parse a TOML catalog (`[[spell]]` tables)
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(source)?;
        Self::from_spells(file.spells)
    }

    /// Parse a JSON catalog (array of spells)
    pub fn from_json_str(source: &str) -> Result<Self, CatalogError> {
        let spells: Vec<SpellDefinition> = serde_json::from_str(source)?;
        Self::from_spells(spells)
    }

    /// Load a catalog from disk; the format follows the file extension
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(path.to_path_buf(), e))?;

        let catalog = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&source)?,
            Some("json") => Self::from_json_str(&source)?,
            _ => return Err(CatalogError::UnsupportedFormat(path.to_path_buf())),
        };

        info!("Loaded {} spells from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// The sample spells shipped with the game
    pub fn builtin() -> Self {
        let spells = vec![
            SpellDefinition {
                name: "Instant Heal".to_string(),
                description: "Immediately restores health to the caster.".to_string(),
                targeting: SpellTargeting::SelfCast,
                damage_type: DamageType::Holy,
                is_healing: true,
                mana_cost: 20.0,
                delivery: EffectDelivery::Instant,
                amount: 50.0,
                fx: SpellFx {
                    cast_effect: Some("heal_cast".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
            SpellDefinition {
                name: "Heal Over Time".to_string(),
                description: "Regenerate health over a short duration.".to_string(),
                targeting: SpellTargeting::SelfCast,
                damage_type: DamageType::Nature,
                is_healing: true,
                mana_cost: 15.0,
                delivery: EffectDelivery::OverTime,
                amount: 50.0,
                duration: 5.0,
                tick_interval: 1.0,
                fx: SpellFx {
                    cast_effect: Some("regen_aura".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
            SpellDefinition {
                name: "Fireball (DoT)".to_string(),
                description: "Launch a fireball that burns enemies over time.".to_string(),
                targeting: SpellTargeting::Projectile,
                damage_type: DamageType::Fire,
                is_healing: false,
                mana_cost: 10.0,
                delivery: EffectDelivery::OverTime,
                amount: 30.0,
                duration: 3.0,
                tick_interval: 0.5,
                projectile: ProjectileSettings {
                    speed: 18.0,
                    lifetime: 5.0,
                    spawn_offset: 1.0,
                },
                fx: SpellFx {
                    impact_effect: Some("impact_fire".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
            SpellDefinition {
                name: "Eldritch Blast".to_string(),
                description: "Launch a bolt that deals force damage instantly.".to_string(),
                targeting: SpellTargeting::Projectile,
                damage_type: DamageType::Force,
                is_healing: false,
                mana_cost: 12.0,
                delivery: EffectDelivery::Instant,
                amount: 40.0,
                projectile: ProjectileSettings {
                    speed: 24.0,
                    lifetime: 4.0,
                    spawn_offset: 1.0,
                },
                fx: SpellFx {
                    impact_effect: Some("impact_eldritch".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
        ];

        let mut catalog = Self::default();
        for spell in spells {
            catalog.by_name.insert(spell.name.clone(), catalog.spells.len());
            catalog.spells.push(Arc::new(spell));
        }
        catalog
    }

    /// Look up a spell by name
    pub fn get(&self, name: &str) -> Option<&Arc<SpellDefinition>> {
        self.by_name.get(name).map(|&index| &self.spells[index])
    }

    /// All spells in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SpellDefinition>> {
        self.spells.iter()
    }

    /// Number of spells in the catalog
    pub fn len(&self) -> usize {
        self.spells.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }
}
