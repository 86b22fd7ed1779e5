//! Habitat resolution: from a monster's habitat list to candidate locations.
//!
//! Each habitat identifier is either the name of a configured group, which
//! expands to its member feature codes, or a literal feature code. Codes are
//! deduplicated before lookup and the matching pool positions are unioned
//! into a sorted list, so the candidate order depends only on load order.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::pool::LocationPool;

/// Habitat group name -> member feature codes.
pub type HabitatGroups = BTreeMap<String, Vec<String>>;

/// The candidate pool for one monster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitatResolution {
    /// Sorted, deduplicated positions into the location pool.
    pub candidates: Vec<usize>,
    /// Resolved codes that matched no location.
    pub unmatched: Vec<String>,
}

impl HabitatResolution {
    /// Whether no location matched any habitat.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Expand group names into feature codes and deduplicate.
pub fn resolve_codes(habitats: &[String], groups: &HabitatGroups) -> BTreeSet<String> {
    let mut codes = BTreeSet::new();
    for habitat in habitats {
        match groups.get(habitat) {
            Some(members) => codes.extend(members.iter().cloned()),
            None => {
                codes.insert(habitat.clone());
            }
        }
    }
    codes
}

/// Resolve `habitats` against `pool`.
pub fn resolve(
    habitats: &[String],
    groups: &HabitatGroups,
    pool: &LocationPool,
) -> HabitatResolution {
    let mut candidates = BTreeSet::new();
    let mut unmatched = Vec::new();

    for code in resolve_codes(habitats, groups) {
        let matches = pool.indices_for(&code);
        if matches.is_empty() {
            unmatched.push(code);
        } else {
            candidates.extend(matches.iter().copied());
        }
    }

    if !unmatched.is_empty() {
        debug!(?unmatched, "habitat codes matched no locations");
    }

    HabitatResolution {
        candidates: candidates.into_iter().collect(),
        unmatched,
    }
}
