//! Calendar oracle, modifier registry, and rules engine for the creature
//! sightings engine.
//!
//! This crate owns everything needed to turn a date, a wall-clock time, and
//! a monster definition into a clamped spotting probability with a
//! replayable breakdown.
//!
//! # Modules
//!
//! - [`calendar`] -- Date seed, simulated time, periods, moon phase,
//!   seasons, holidays, and the [`CalendarState`] snapshot.
//! - [`config`] -- Configuration loading from `engine.yaml` into
//!   strongly-typed structs.
//! - [`modifiers`] -- [`ModifierKey`] registry of bonuses and penalties.
//! - [`monster`] -- Monster catalog loading and load-time validation.
//! - [`rules`] -- [`RulesEngine`] and its fixed probability pipeline.
//!
//! [`CalendarState`]: calendar::CalendarState
//! [`ModifierKey`]: modifiers::ModifierKey
//! [`RulesEngine`]: rules::RulesEngine

pub mod calendar;
pub mod config;
pub mod modifiers;
pub mod monster;
pub mod rules;
