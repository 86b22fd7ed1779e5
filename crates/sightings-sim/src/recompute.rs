//! Recomputation: one atomic pass over every enabled monster for one day.
//!
//! Each recomputation runs two phases per monster, in catalog order:
//!
//! 1. **Rules** -- [`RulesEngine::calculate_spotting_data`] against the
//!    shared [`CalendarState`].
//! 2. **Simulation** -- [`simulate`] with the monster's own stream.
//!
//! The only shared inputs are read-only: the calendar snapshot, the location
//! pool, and the habitat groups. Streams are keyed per monster, so removing
//! or disabling one monster never changes another's result. The report is
//! built in full and returned; callers replace their previous report
//! wholesale.
//!
//! [`RulesEngine::calculate_spotting_data`]: sightings_core::rules::RulesEngine::calculate_spotting_data

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sightings_core::calendar::CalendarState;
use sightings_core::monster::Monster;
use sightings_core::rules::RulesEngine;
use sightings_types::{Conditions, MonsterId, SightingRecord, SimulationIssue};
use tracing::info;

use crate::simulate::{SimulationInputs, simulate};
use crate::stream::StreamFactory;

/// The full output of one recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SightingReport {
    /// The `YYYY-MM-DD` calendar seed.
    pub seed: String,
    /// Calendar predicates at the simulated time.
    pub conditions: Conditions,
    /// One record per enabled monster, in catalog order.
    pub records: Vec<SightingRecord>,
}

impl SightingReport {
    /// Sum of sighting counts across all records.
    pub fn total_sightings(&self) -> u64 {
        self.records
            .iter()
            .map(|record| u64::from(record.count))
            .fold(0, u64::saturating_add)
    }

    /// The record for `id`, if it was simulated.
    pub fn record(&self, id: &MonsterId) -> Option<&SightingRecord> {
        self.records.iter().find(|record| record.monster_id == *id)
    }

    /// Every configuration inconsistency surfaced during simulation.
    pub fn issues(&self) -> impl Iterator<Item = (&MonsterId, &SimulationIssue)> {
        self.records
            .iter()
            .filter_map(|record| record.issue.as_ref().map(|issue| (&record.monster_id, issue)))
    }
}

/// Recompute every monster not in `disabled`.
pub fn recompute<F: StreamFactory>(
    monsters: &[Monster],
    disabled: &BTreeSet<MonsterId>,
    calendar: &CalendarState,
    rules: &RulesEngine,
    inputs: SimulationInputs<'_>,
    streams: &F,
) -> SightingReport {
    let seed = calendar.seed();
    let debug_multiplier = calendar.probability_multiplier();

    let records: Vec<SightingRecord> = monsters
        .iter()
        .filter(|monster| !disabled.contains(&monster.id))
        .map(|monster| {
            let spotting = rules.calculate_spotting_data(monster, calendar, debug_multiplier);
            simulate(monster, spotting, &seed, inputs, streams)
        })
        .collect();

    let report = SightingReport {
        conditions: calendar.conditions(),
        seed,
        records,
    };

    info!(
        seed = %report.seed,
        period = %report.conditions.period,
        monsters = report.records.len(),
        disabled = disabled.len(),
        total_sightings = report.total_sightings(),
        issues = report.issues().count(),
        "Recomputation complete"
    );

    report
}
