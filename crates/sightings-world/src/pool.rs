//! The location pool: every place a sighting can be drawn from.
//!
//! A [`LocationPool`] holds the gazetteer entries in load order plus two
//! read-only indexes built once at construction: entries grouped by full
//! `CLASS.CODE` feature code, and entries grouped by top-level feature
//! class. Indexes store positions into the entry list so that a resolved
//! candidate pool is a sorted list of positions, independent of map
//! iteration order.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use sightings_types::LocationEntry;
use tracing::info;

use crate::error::WorldError;

/// Separator between the class letter and the specific code.
pub const CODE_SEPARATOR: char = '.';

/// Read-only location pool with code and class indexes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationPool {
    /// Entries in load order.
    entries: Vec<LocationEntry>,
    /// Full feature code (`V.FRST`) -> positions in `entries`.
    by_code: BTreeMap<String, Vec<usize>>,
    /// Feature class (`V`) -> positions in `entries`.
    by_class: BTreeMap<String, Vec<usize>>,
}

impl LocationPool {
    /// Build a pool and its indexes from already-loaded entries.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateLocation`] if two entries share an id,
    /// or [`WorldError::MalformedFeatureCode`] if a class is empty or either
    /// part contains the `.` separator.
    pub fn from_entries(entries: Vec<LocationEntry>) -> Result<Self, WorldError> {
        let mut seen = BTreeSet::new();
        let mut by_code: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_class: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (index, entry) in entries.iter().enumerate() {
            if !seen.insert(&entry.id) {
                return Err(WorldError::DuplicateLocation(entry.id.clone()));
            }
            if entry.feature_class.is_empty()
                || entry.feature_class.contains(CODE_SEPARATOR)
                || entry.feature_code.contains(CODE_SEPARATOR)
            {
                return Err(WorldError::MalformedFeatureCode {
                    location: entry.id.clone(),
                    code: entry.full_code(),
                });
            }
            by_code.entry(entry.full_code()).or_default().push(index);
            by_class
                .entry(entry.feature_class.clone())
                .or_default()
                .push(index);
        }

        Ok(Self {
            entries,
            by_code,
            by_class,
        })
    }

    /// Load a pool from a JSON array of [`LocationEntry`] values.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Io`] or [`WorldError::Json`] on read or parse
    /// failure, and any error from [`LocationPool::from_entries`].
    pub fn from_file(path: &Path) -> Result<Self, WorldError> {
        let contents = std::fs::read_to_string(path)?;
        let entries: Vec<LocationEntry> = serde_json::from_str(&contents)?;
        let pool = Self::from_entries(entries)?;
        info!(
            path = %path.display(),
            locations = pool.len(),
            codes = pool.by_code.len(),
            classes = pool.by_class.len(),
            "location pool loaded"
        );
        Ok(pool)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&LocationEntry> {
        self.entries.get(index)
    }

    /// All entries in load order.
    pub fn entries(&self) -> &[LocationEntry] {
        &self.entries
    }

    /// Positions of entries matching `code`.
    ///
    /// A code containing `.` is specific and matches the full-code index;
    /// anything else is a class letter and matches the class index. Unknown
    /// codes match nothing.
    pub fn indices_for(&self, code: &str) -> &[usize] {
        let index = if code.contains(CODE_SEPARATOR) {
            &self.by_code
        } else {
            &self.by_class
        };
        index.get(code).map(Vec::as_slice).unwrap_or(&[])
    }
}
