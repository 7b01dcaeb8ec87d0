use std::path::PathBuf;

/// Invariant violations rejected when pools or spells are constructed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpellError {
    #[error("maximum {pool} must be a non-negative finite number, got {value}")]
    InvalidMaximum { pool: &'static str, value: f32 },

    #[error("mana regeneration must be a non-negative finite number, got {0}")]
    InvalidRegen(f32),

    #[error("spell '{spell}': {field} must be non-negative, got {value}")]
    NegativeField {
        spell: String,
        field: &'static str,
        value: f32,
    },

    #[error("spell '{spell}': over-time {field} must be positive, got {value}")]
    NonPositiveTiming {
        spell: String,
        field: &'static str,
        value: f32,
    },
}

/// Errors that can occur while loading a spell catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read spell catalog '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("unsupported spell catalog format '{0}' (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("invalid TOML spell catalog: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON spell catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate spell name '{0}'")]
    DuplicateName(String),

    #[error(transparent)]
    InvalidSpell(#[from] SpellError),
}
