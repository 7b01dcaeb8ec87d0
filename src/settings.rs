//! Sandbox settings with persistence
//!
//! Settings are saved to `~/.config/spellforge/settings.toml`

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use spellforge_core::TimeConfig;
use spellforge_spells::ArenaConfig;
use tracing::{info, warn};

/// All sandbox settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Spell catalog to load instead of the built-in spells
    pub catalog: Option<PathBuf>,
    pub time: TimeSettings,
    pub duel: DuelSettings,
    pub arena: ArenaConfig,
}

impl SimSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("spellforge"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(path)
    }
}

/// Frame timing for the sandbox loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSettings {
    /// Simulation speed multiplier
    pub time_scale: f32,
    /// Longest frame delta the simulation accepts, in seconds
    pub max_delta_time: f32,
    /// Fixed raw delta fed in each frame
    pub frame_delta: f32,
}

impl Default for TimeSettings {
    fn default() -> Self {
        let config = TimeConfig::default();
        Self {
            time_scale: config.time_scale,
            max_delta_time: config.max_delta_time,
            frame_delta: 1.0 / 60.0,
        }
    }
}

impl TimeSettings {
    pub fn time_config(&self) -> TimeConfig {
        TimeConfig {
            time_scale: self.time_scale.max(0.0),
            max_delta_time: self.max_delta_time,
        }
    }
}

/// The scripted duel the sandbox plays out
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelSettings {
    /// Frames to simulate before calling it a draw
    pub max_frames: u32,
    /// Distance between the two duelists
    pub distance: f32,
    /// Frames between cast attempts for each duelist
    pub cast_every_frames: u32,
    pub max_mana: f32,
    pub mana_regen: f32,
    pub max_health: f32,
    /// Spell names equipped into slots 0.. for both duelists
    pub loadout: Vec<String>,
}

impl Default for DuelSettings {
    fn default() -> Self {
        Self {
            max_frames: 60 * 60,
            distance: 12.0,
            cast_every_frames: 45,
            max_mana: 100.0,
            mana_regen: 5.0,
            max_health: 100.0,
            loadout: vec![
                "Eldritch Blast".to_string(),
                "Fireball (DoT)".to_string(),
                "Heal Over Time".to_string(),
                "Instant Heal".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = SimSettings::from_toml_str(
            r#"
            catalog = "spells.toml"

            [duel]
            distance = 20.0
            loadout = ["Eldritch Blast"]

            [arena]
            projectile_radius = 0.3
            "#,
        )
        .unwrap();

        assert_eq!(settings.catalog, Some(PathBuf::from("spells.toml")));
        assert_eq!(settings.duel.distance, 20.0);
        assert_eq!(settings.duel.loadout, vec!["Eldritch Blast".to_string()]);
        assert_eq!(settings.duel.max_health, 100.0);
        assert_eq!(settings.arena.projectile_radius, 0.3);
        assert_eq!(settings.arena.body_radius, 0.5);
        assert_eq!(settings.time.time_scale, 1.0);
    }

    #[test]
    fn test_defaults_serialize() {
        let content = toml::to_string_pretty(&SimSettings::default()).unwrap();
        let parsed = SimSettings::from_toml_str(&content).unwrap();
        assert_eq!(parsed.duel.loadout.len(), 4);
        assert!(parsed.catalog.is_none());
    }

    #[test]
    fn test_time_config_clamps_scale() {
        let time = TimeSettings {
            time_scale: -2.0,
            ..Default::default()
        };
        assert_eq!(time.time_config().time_scale, 0.0);
    }
}
