//! The simulation step: probability in, sightings out.
//!
//! For one monster on one day, [`simulate`] turns the rules-engine output
//! into a [`SightingRecord`]:
//!
//! 1. A non-positive probability short-circuits with no draws.
//! 2. Otherwise a fixed number of Bernoulli trials counts sightings.
//! 3. The count maps to a [`Likelihood`] band.
//! 4. Each sighting draws a location from the habitat candidate pool and
//!    jitters its coordinates, all from the same stream.
//!
//! The draw order per sighting is location, latitude offset, longitude
//! offset. Changing it changes every placement for every seed.

use sightings_core::config::SimulationConfig;
use sightings_core::monster::Monster;
use sightings_types::{Likelihood, Sighting, SightingRecord, SimulationIssue, SpottingData};
use sightings_world::{HabitatGroups, LocationPool, habitat};
use tracing::{debug, warn};

use crate::stream::{RandomStream, StreamFactory};

/// Read-only inputs shared by every monster in a recomputation.
#[derive(Debug, Clone, Copy)]
pub struct SimulationInputs<'a> {
    /// Locations sightings are drawn from.
    pub pool: &'a LocationPool,
    /// Habitat group definitions.
    pub habitat_groups: &'a HabitatGroups,
    /// Trial cap and jitter.
    pub config: &'a SimulationConfig,
}

/// The stream seed for `monster` on the day seeded by `calendar_seed`.
pub fn monster_seed(calendar_seed: &str, monster: &Monster) -> String {
    format!("{calendar_seed}{}", monster.id)
}

/// Simulate one monster's sightings for the day.
pub fn simulate<F: StreamFactory>(
    monster: &Monster,
    spotting: SpottingData,
    calendar_seed: &str,
    inputs: SimulationInputs<'_>,
    streams: &F,
) -> SightingRecord {
    let SpottingData {
        probability,
        event,
        breakdown,
    } = spotting;

    if probability <= 0.0 {
        let likelihood = if breakdown.is_impossible() {
            Likelihood::Impossible
        } else {
            Likelihood::VeryLow
        };
        debug!(monster = %monster.id, %likelihood, "no trials run");
        return SightingRecord {
            monster_id: monster.id.clone(),
            count: 0,
            locations: Vec::new(),
            likelihood,
            probability,
            breakdown,
            event,
            issue: None,
        };
    }

    let mut stream = streams.stream_for(&monster_seed(calendar_seed, monster));

    let mut count: u32 = 0;
    for _ in 0..inputs.config.max_sightings {
        if stream.next_f64() < probability {
            count = count.saturating_add(1);
        }
    }
    let likelihood = Likelihood::from_count(count);

    let mut locations = Vec::new();
    let mut issue = None;
    if count > 0 {
        let resolution = habitat::resolve(&monster.habitats, inputs.habitat_groups, inputs.pool);
        if resolution.is_empty() {
            warn!(
                monster = %monster.id,
                count,
                habitats = ?monster.habitats,
                "sightings counted but habitats resolved to no locations"
            );
            issue = Some(SimulationIssue::EmptyHabitatPool {
                count,
                habitats: monster.habitats.clone(),
            });
        } else {
            if !resolution.unmatched.is_empty() {
                warn!(
                    monster = %monster.id,
                    unmatched = ?resolution.unmatched,
                    "habitat codes matched no locations"
                );
                issue = Some(SimulationIssue::UnmatchedHabitats {
                    codes: resolution.unmatched.clone(),
                });
            }
            locations = place_sightings(
                &mut stream,
                count,
                &resolution.candidates,
                inputs.pool,
                inputs.config.jitter_degrees,
            );
        }
    }

    debug!(
        monster = %monster.id,
        probability,
        count,
        placed = locations.len(),
        %likelihood,
        "monster simulated"
    );

    SightingRecord {
        monster_id: monster.id.clone(),
        count,
        locations,
        likelihood,
        probability,
        breakdown,
        event,
        issue,
    }
}

/// Draw `count` jittered placements from `candidates`.
fn place_sightings<S: RandomStream>(
    stream: &mut S,
    count: u32,
    candidates: &[usize],
    pool: &LocationPool,
    jitter_degrees: f64,
) -> Vec<Sighting> {
    let mut sightings = Vec::new();
    for _ in 0..count {
        let pick = pick_index(stream.next_f64(), candidates.len());
        let lat_offset = jitter(stream.next_f64(), jitter_degrees);
        let lon_offset = jitter(stream.next_f64(), jitter_degrees);

        let Some(entry) = candidates.get(pick).and_then(|&index| pool.get(index)) else {
            continue;
        };
        sightings.push(Sighting {
            location_id: entry.id.clone(),
            name: entry.name.clone(),
            latitude: entry.latitude + lat_offset,
            longitude: entry.longitude + lon_offset,
        });
    }
    sightings
}

/// Uniform index into a list of `len` items: `floor(draw * len)`.
fn pick_index(draw: f64, len: usize) -> usize {
    // Pool sizes are far below 2^52.
    #[allow(clippy::cast_precision_loss)]
    let scaled = (draw * len as f64).floor();
    // `draw` is in [0, 1) so `scaled` is a non-negative integer below `len`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = scaled as usize;
    index.min(len.saturating_sub(1))
}

/// Symmetric offset in `[-half_width, half_width)`.
fn jitter(draw: f64, half_width: f64) -> f64 {
    draw.mul_add(2.0, -1.0) * half_width
}
