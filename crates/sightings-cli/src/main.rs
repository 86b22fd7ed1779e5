//! Command-line tool for the creature sightings engine.
//!
//! Loads the engine configuration, the monster catalog, and the location
//! pool, computes one day of sightings, and prints the report to stdout.
//! Logs go to stderr so the JSON output stays machine-readable.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Parse and validate command-line overrides
//! 3. Load engine configuration
//! 4. Load and validate the monster catalog
//! 5. Load the location pool
//! 6. Snapshot the calendar state for the requested date
//! 7. Recompute every enabled monster
//! 8. Print the report as JSON, or the breakdowns with `--explain`

mod error;

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use sightings_core::calendar::{
    CalendarState, DebugOverrides, HolidayOverride, parse_season_override, parse_time_override,
};
use sightings_core::config::EngineConfig;
use sightings_core::monster::{Monster, MonsterCatalog};
use sightings_core::rules::RulesEngine;
use sightings_sim::{ChaChaStreams, SightingReport, SimulationInputs, recompute};
use sightings_types::MonsterId;
use sightings_world::LocationPool;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Compute one day of creature sightings.
#[derive(Parser, Debug)]
#[command(name = "sightings")]
#[command(about = "Compute a reproducible day of creature sightings")]
struct Args {
    /// Engine configuration (YAML)
    #[arg(long)]
    config: PathBuf,

    /// Monster catalog (YAML, or JSON by extension)
    #[arg(long)]
    monsters: PathBuf,

    /// Location pool (JSON array)
    #[arg(long)]
    locations: PathBuf,

    /// Application date, YYYY-MM-DD; defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Forced time of day, HH:MM
    #[arg(long)]
    time: Option<String>,

    /// Forced season
    #[arg(long)]
    season: Option<String>,

    /// Forced full-moon flag
    #[arg(long)]
    full_moon: Option<bool>,

    /// Forced holiday: halloween, midsummer, yule, or none
    #[arg(long)]
    holiday: Option<String>,

    /// Debug probability multiplier
    #[arg(long)]
    multiplier: Option<f64>,

    /// Monster id to leave out; repeatable
    #[arg(long = "disable")]
    disabled: Vec<String>,

    /// Print breakdowns instead of JSON
    #[arg(long)]
    explain: bool,
}

impl Args {
    /// Validate every override before the engine sees it.
    fn overrides(&self) -> Result<DebugOverrides, CliError> {
        let probability_multiplier = match self.multiplier {
            Some(value) if !value.is_finite() || value < 0.0 => {
                return Err(CliError::InvalidMultiplier { value });
            }
            other => other,
        };
        Ok(DebugOverrides {
            time: self.time.as_deref().map(parse_time_override).transpose()?,
            season: self.season.as_deref().map(parse_season_override).transpose()?,
            full_moon: self.full_moon,
            holiday: self.holiday.as_deref().map(HolidayOverride::parse).transpose()?,
            probability_multiplier,
        })
    }
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if an override is invalid, an input file cannot be
/// loaded, or stdout cannot be written.
fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    // 2. Parse and validate overrides.
    let args = Args::parse();
    let overrides = args.overrides()?;

    // 3. Load engine configuration.
    let config = EngineConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    info!(
        periods = config.calendar.periods.len(),
        habitat_groups = config.habitat_groups.len(),
        max_sightings = config.simulation.max_sightings,
        "Configuration loaded"
    );

    // 4. Load and validate the monster catalog.
    let catalog = MonsterCatalog::from_file(&args.monsters)
        .with_context(|| format!("loading {}", args.monsters.display()))?
        .validate(&config);
    info!(
        monsters = catalog.monsters.len(),
        warnings = catalog.warnings.len(),
        "Monster catalog loaded"
    );

    // 5. Load the location pool.
    let pool = LocationPool::from_file(&args.locations)
        .with_context(|| format!("loading {}", args.locations.display()))?;

    // 6. Snapshot the calendar.
    let now = Local::now().naive_local();
    let date = args.date.unwrap_or_else(|| now.date());
    let calendar = CalendarState::new(date, now.time(), overrides, &config.calendar);

    // 7. Recompute.
    let disabled = disabled_set(&args.disabled, &catalog.monsters);
    let rules = RulesEngine::new(&config);
    let inputs = SimulationInputs {
        pool: &pool,
        habitat_groups: &config.habitat_groups,
        config: &config.simulation,
    };
    let report = recompute(
        &catalog.monsters,
        &disabled,
        &calendar,
        &rules,
        inputs,
        &ChaChaStreams,
    );

    // 8. Print.
    let mut out = io::stdout().lock();
    if args.explain {
        write_explanation(&mut out, &report, &catalog.monsters)?;
    } else {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    }
    Ok(())
}

/// The disabled overlay. Ids not in the catalog are logged and ignored.
fn disabled_set(ids: &[String], monsters: &[Monster]) -> BTreeSet<MonsterId> {
    let mut disabled = BTreeSet::new();
    for raw in ids {
        let id = MonsterId::new(raw.as_str());
        if monsters.iter().any(|monster| monster.id == id) {
            disabled.insert(id);
        } else {
            warn!(monster = %id, "--disable names an unknown monster");
        }
    }
    disabled
}

/// Human-readable report: conditions, then one block per monster.
fn write_explanation<W: Write>(
    out: &mut W,
    report: &SightingReport,
    monsters: &[Monster],
) -> io::Result<()> {
    let conditions = &report.conditions;
    writeln!(
        out,
        "{} {} | {} | {} | {} {}",
        conditions.date,
        conditions.time.format("%H:%M"),
        conditions.period,
        conditions.season,
        conditions.moon_icon,
        conditions.moon_phase.as_str(),
    )?;
    if let Some(holiday) = conditions.holiday {
        writeln!(out, "Holiday: {}", holiday.as_str())?;
    }

    for record in &report.records {
        let name = monsters
            .iter()
            .find(|monster| monster.id == record.monster_id)
            .map_or(record.monster_id.as_str(), |monster| monster.name.as_str());
        writeln!(out)?;
        writeln!(
            out,
            "{name}: {} sighting(s), {} ({:.1}%)",
            record.count,
            record.likelihood,
            record.probability * 100.0,
        )?;
        for line in record.breakdown.describe() {
            writeln!(out, "    {line}")?;
        }
        if let Some(issue) = &record.issue {
            writeln!(out, "    ! {issue:?}")?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Total sightings: {}", report.total_sightings())
}
