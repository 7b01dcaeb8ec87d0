//! Spellforge - Spell casting simulation sandbox
//!
//! Plays out a scripted duel between two casters and logs what happens.
//!
//! Usage: `spellforge [CATALOG]` or `spellforge --write-settings`

mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Vec3;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use spellforge_core::{EntityId, GameTime, Transform};
use spellforge_spells::{Arena, HealthPool, ManaPool, SpellCaster, SpellCatalog, MAX_SPELL_SLOTS};

use settings::{DuelSettings, SimSettings};

const USAGE: &str = "Usage: spellforge [CATALOG] | spellforge --write-settings";

/// What the command line asked for
#[derive(Debug, PartialEq)]
enum Command {
    /// Run the duel, optionally with a catalog path
    Run(Option<PathBuf>),
    WriteSettings,
    Help,
    Unknown(String),
}

fn parse_args(arg: Option<String>) -> Command {
    match arg {
        None => Command::Run(None),
        Some(arg) => match arg.as_str() {
            "--write-settings" => Command::WriteSettings,
            "--help" | "-h" => Command::Help,
            flag if flag.starts_with("--") => Command::Unknown(flag.to_string()),
            path => Command::Run(Some(PathBuf::from(path))),
        },
    }
}

/// A duelist and the slot it will try next
struct Duelist {
    name: &'static str,
    id: EntityId,
    next_slot: usize,
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Starting Spellforge sandbox...");

    let settings = SimSettings::load();

    let catalog_path = match parse_args(std::env::args().nth(1)) {
        Command::WriteSettings => {
            let path = settings.save()?;
            info!("Wrote settings to {}", path.display());
            return Ok(());
        }
        Command::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        Command::Unknown(flag) => {
            println!("{}", USAGE);
            anyhow::bail!("Unknown option '{}'", flag);
        }
        Command::Run(path) => path.or_else(|| settings.catalog.clone()),
    };

    let catalog = match catalog_path {
        Some(path) => SpellCatalog::load(&path)
            .with_context(|| format!("Failed to load spell catalog {}", path.display()))?,
        None => {
            info!("Using built-in spells");
            SpellCatalog::builtin()
        }
    };

    run_duel(&settings, &catalog)
}

fn spawn_duelist(
    arena: &mut Arena,
    catalog: &SpellCatalog,
    duel: &DuelSettings,
    name: &'static str,
    position: Vec3,
    facing: Vec3,
) -> Result<Duelist> {
    let mana = ManaPool::new(duel.max_mana, duel.max_mana, duel.mana_regen)
        .context("Invalid mana settings")?;
    let mut health = HealthPool::full(duel.max_health).context("Invalid health settings")?;
    health.on_death.subscribe(move |_| info!("{} has fallen", name));

    let mut caster = SpellCaster::new(
        EntityId::new(),
        Transform::facing(position, facing),
        mana,
        Some(health),
    );
    caster
        .on_cast
        .subscribe(move |spell| info!("{} casts {}", name, spell.name));

    for (slot, spell_name) in duel.loadout.iter().take(MAX_SPELL_SLOTS).enumerate() {
        match catalog.get(spell_name) {
            Some(spell) => {
                caster.equip(slot, Some(Arc::clone(spell)));
            }
            None => warn!("{}: no spell named '{}' for slot {}", name, spell_name, slot),
        }
    }

    let id = arena.spawn_caster(caster);
    Ok(Duelist {
        name,
        id,
        next_slot: 0,
    })
}

fn run_duel(settings: &SimSettings, catalog: &SpellCatalog) -> Result<()> {
    let duel = &settings.duel;
    let mut arena = Arena::new(settings.arena.clone());
    let mut time = GameTime::new(settings.time.time_config());

    let half = duel.distance * 0.5;
    let mut duelists = [
        spawn_duelist(&mut arena, catalog, duel, "Left", Vec3::new(-half, 0.0, 0.0), Vec3::X)?,
        spawn_duelist(&mut arena, catalog, duel, "Right", Vec3::new(half, 0.0, 0.0), Vec3::NEG_X)?,
    ];

    let slots = duel.loadout.len().clamp(1, MAX_SPELL_SLOTS);
    let cast_every = duel.cast_every_frames.max(1);
    let mut impacts = 0;

    for frame in 0..duel.max_frames {
        if frame % cast_every == 0 {
            for duelist in &mut duelists {
                // Fall through the rotation until something casts
                for _ in 0..slots {
                    let slot = duelist.next_slot;
                    duelist.next_slot = (slot + 1) % slots;
                    if arena.cast_slot(duelist.id, slot) {
                        break;
                    }
                }
            }
        }

        let summary = arena.advance(&mut time, settings.time.frame_delta);
        impacts += summary.impacts;

        if !summary.removed.is_empty() {
            break;
        }
    }

    info!(
        "Duel over after {} frames ({:.2}s simulated), {} impacts",
        time.frame_count, time.total_time, impacts
    );
    for duelist in &duelists {
        match arena.caster(duelist.id) {
            Some(caster) => {
                let health = caster.health().map_or(0.0, HealthPool::current);
                info!(
                    "{}: {:.1} health, {:.1} mana",
                    duelist.name,
                    health,
                    caster.mana().current()
                );
            }
            None => info!("{}: defeated", duelist.name),
        }
    }

    Ok(())
}
