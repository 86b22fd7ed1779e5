//! Shared type definitions for the creature sightings engine.
//!
//! This crate is the single source of truth for the values that cross crate
//! boundaries: calendar enums, rules-engine breakdowns, location pool entries,
//! and simulation output records. Types flow downstream to `TypeScript` via
//! `ts-rs` for the map front end.
//!
//! # Modules
//!
//! - [`ids`] -- String-backed identifier wrappers for monsters and locations
//! - [`enums`] -- Seasons, moon phases, holidays, event tags, likelihood bands
//! - [`breakdown`] -- Typed, replayable probability explanations
//! - [`structs`] -- Location entries, sighting records, current conditions

pub mod breakdown;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use breakdown::{Breakdown, BreakdownStep, SpottingData};
pub use enums::{EventTag, Holiday, Likelihood, MoonPhase, Season};
pub use ids::{LocationId, MonsterId};
pub use structs::{Conditions, LocationEntry, Sighting, SightingRecord, SimulationIssue};
