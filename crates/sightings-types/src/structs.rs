//! Core record structs for the sightings engine.
//!
//! Covers the read-only [`LocationEntry`] supplied by the data loader, the
//! per-day [`SightingRecord`] produced by the simulation, and the
//! [`Conditions`] summary shown next to the map.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::breakdown::Breakdown;
use crate::enums::{EventTag, Holiday, Likelihood, MoonPhase, Season};
use crate::ids::{LocationId, MonsterId};

// ---------------------------------------------------------------------------
// Location pool
// ---------------------------------------------------------------------------

/// One gazetteer entry in the location pool.
///
/// Owned by the data-loading collaborator; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LocationEntry {
    /// Gazetteer identifier.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Top-level feature class letter (e.g. `V` for vegetation).
    pub feature_class: String,
    /// Specific feature code within the class (e.g. `FRST`).
    pub feature_code: String,
    /// ISO country code.
    #[serde(default)]
    pub country_code: String,
    /// First-order administrative division.
    #[serde(default)]
    pub admin1: String,
    /// Second-order administrative division.
    #[serde(default)]
    pub admin2: String,
}

impl LocationEntry {
    /// The full `CLASS.CODE` feature code, e.g. `V.FRST`.
    pub fn full_code(&self) -> String {
        format!("{}.{}", self.feature_class, self.feature_code)
    }
}

// ---------------------------------------------------------------------------
// Simulation output
// ---------------------------------------------------------------------------

/// A single simulated sighting: a pool location with jittered coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Sighting {
    /// The pool location the sighting was drawn from.
    pub location_id: LocationId,
    /// Display name of that location.
    pub name: String,
    /// Jittered latitude.
    pub latitude: f64,
    /// Jittered longitude.
    pub longitude: f64,
}

/// A configuration inconsistency detected while simulating one monster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationIssue {
    /// Sightings were counted but the habitats resolved to no locations.
    EmptyHabitatPool {
        /// Number of sightings that could not be placed.
        count: u32,
        /// The habitat identifiers that were resolved.
        habitats: Vec<String>,
    },
    /// Sightings were placed, but some resolved feature codes matched no
    /// location and narrowed the pool.
    UnmatchedHabitats {
        /// Resolved codes with no matching location, sorted.
        codes: Vec<String>,
    },
}

/// Everything the simulation produced for one monster on one day.
///
/// Recomputed from scratch on every date or override change; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SightingRecord {
    /// The monster this record belongs to.
    pub monster_id: MonsterId,
    /// Number of sightings (successful trials).
    pub count: u32,
    /// Placed sightings. Shorter than `count` only when `issue` is set.
    pub locations: Vec<Sighting>,
    /// Coarse band for the count.
    pub likelihood: Likelihood,
    /// Final spotting probability from the rules engine.
    pub probability: f64,
    /// How the probability was derived.
    pub breakdown: Breakdown,
    /// Global event tag, if any.
    pub event: Option<EventTag>,
    /// Configuration inconsistency surfaced during simulation.
    pub issue: Option<SimulationIssue>,
}

// ---------------------------------------------------------------------------
// Current conditions
// ---------------------------------------------------------------------------

/// Snapshot of the calendar predicates for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Conditions {
    /// The `YYYY-MM-DD` calendar seed.
    pub seed: String,
    /// Application date.
    pub date: NaiveDate,
    /// Simulated local time of day.
    pub time: NaiveTime,
    /// Active time period name.
    pub period: String,
    /// Active season.
    pub season: Season,
    /// Lunar phase on the application date.
    pub moon_phase: MoonPhase,
    /// Glyph for the lunar phase.
    pub moon_icon: String,
    /// Whether it is night.
    pub is_night: bool,
    /// Whether it is dark.
    pub is_dark: bool,
    /// Whether it is the witching hour.
    pub is_witching_hour: bool,
    /// Whether the moon is full.
    pub is_full_moon: bool,
    /// Active holiday, if any.
    pub holiday: Option<Holiday>,
}
