//! Monster catalog loading and validation.
//!
//! A [`MonsterDefinition`] is the raw catalog entry as written in YAML or
//! JSON. [`MonsterCatalog::validate`] turns each definition into a
//! [`Monster`] whose modifier, period and habitat references are checked
//! against the registry, the period table and the habitat groups. Anything
//! unknown is dropped and reported as a [`CatalogWarning`], so the engine
//! fails closed but visibly.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sightings_types::{MonsterId, Season};
use tracing::warn;

use crate::calendar::{ANY_TIME, ActiveTime};
use crate::config::{ConfigError, EngineConfig};
use crate::modifiers::{ModifierKey, ModifierKind};

/// Hard preconditions. Every flag that is set must hold or the monster
/// cannot be spotted at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restrictions {
    /// Only spotted under a full moon.
    #[serde(default)]
    pub requires_full_moon: bool,
    /// Only spotted in the dark.
    #[serde(default)]
    pub requires_dark: bool,
    /// Only spotted at night.
    #[serde(default)]
    pub requires_night: bool,
}

/// A catalog entry as written in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterDefinition {
    /// Unique identifier.
    pub id: MonsterId,
    /// Display name.
    pub name: String,
    /// Map marker icon.
    #[serde(default)]
    pub icon: String,
    /// Base spotting probability in `[0, 1]`.
    pub base_probability: f64,
    /// Season names; defaults to all four.
    #[serde(default = "default_active_seasons")]
    pub active_seasons: Vec<String>,
    /// Period names, or `["any"]`.
    #[serde(default = "default_active_time")]
    pub active_time: Vec<String>,
    /// Hard restrictions.
    #[serde(default)]
    pub restrictions: Restrictions,
    /// Bonus modifier names, applied in this order.
    #[serde(default)]
    pub bonuses: Vec<String>,
    /// Penalty modifier names, applied in this order.
    #[serde(default)]
    pub penalties: Vec<String>,
    /// Per-monster magnitude overrides keyed by modifier name.
    #[serde(default)]
    pub overrides: BTreeMap<String, f64>,
    /// Habitat group names or raw feature codes.
    #[serde(default)]
    pub habitats: Vec<String>,
}

/// A validated monster, ready for the rules and simulation engines.
#[derive(Debug, Clone, PartialEq)]
pub struct Monster {
    /// Unique identifier.
    pub id: MonsterId,
    /// Display name.
    pub name: String,
    /// Map marker icon.
    pub icon: String,
    /// Base spotting probability in `[0, 1]`.
    pub base_probability: f64,
    /// Seasons in which the monster is fully active.
    pub active_seasons: BTreeSet<Season>,
    /// Periods in which the monster is active.
    pub active_time: ActiveTime,
    /// Hard restrictions.
    pub restrictions: Restrictions,
    /// Bonuses, in declared order.
    pub bonuses: Vec<ModifierKey>,
    /// Penalties, in declared order.
    pub penalties: Vec<ModifierKey>,
    /// Per-monster magnitude overrides.
    pub overrides: BTreeMap<ModifierKey, f64>,
    /// Habitat group names or raw feature codes.
    pub habitats: Vec<String>,
}

impl Monster {
    /// A monster active in every season and at any time, with no
    /// restrictions, modifiers or habitats.
    pub fn new(id: impl Into<MonsterId>, base_probability: f64) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            icon: String::new(),
            base_probability,
            active_seasons: Season::ALL.into_iter().collect(),
            active_time: ActiveTime::Any,
            restrictions: Restrictions::default(),
            bonuses: Vec::new(),
            penalties: Vec::new(),
            overrides: BTreeMap::new(),
            habitats: Vec::new(),
        }
    }
}

/// A configuration inconsistency found while validating the catalog.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogWarning {
    /// A modifier name is not in the registry.
    #[error("{monster}: unknown modifier {name:?} ignored")]
    UnknownModifier {
        /// The offending monster.
        monster: MonsterId,
        /// The unknown name.
        name: String,
    },

    /// A modifier was listed under the wrong category.
    #[error("{monster}: {name:?} is not a {expected:?} and was ignored")]
    WrongModifierKind {
        /// The offending monster.
        monster: MonsterId,
        /// The misplaced name.
        name: String,
        /// The list it appeared in.
        expected: ModifierKind,
    },

    /// An active-time name is not in the period table.
    #[error("{monster}: unknown period {name:?} ignored")]
    UnknownPeriod {
        /// The offending monster.
        monster: MonsterId,
        /// The unknown name.
        name: String,
    },

    /// A season name could not be parsed.
    #[error("{monster}: unknown season {name:?} ignored")]
    UnknownSeason {
        /// The offending monster.
        monster: MonsterId,
        /// The unknown name.
        name: String,
    },

    /// The base probability was outside `[0, 1]` and was clamped.
    #[error("{monster}: base probability {value} clamped into [0, 1]")]
    BaseProbabilityOutOfRange {
        /// The offending monster.
        monster: MonsterId,
        /// The value as written.
        value: f64,
    },

    /// A habitat is neither a configured group nor a feature code.
    #[error("{monster}: unknown habitat {name:?} ignored")]
    UnknownHabitat {
        /// The offending monster.
        monster: MonsterId,
        /// The unknown name.
        name: String,
    },

    /// Two entries share an id; the later one was dropped.
    #[error("{monster}: duplicate monster id, later entry ignored")]
    DuplicateMonster {
        /// The repeated id.
        monster: MonsterId,
    },
}

/// The catalog file: a list of monster definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonsterCatalog {
    /// Entries in display order.
    pub monsters: Vec<MonsterDefinition>,
}

/// Validated monsters plus everything that had to be dropped on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedCatalog {
    /// Monsters in catalog order.
    pub monsters: Vec<Monster>,
    /// Inconsistencies found during validation.
    pub warnings: Vec<CatalogWarning>,
}

impl MonsterCatalog {
    /// Load a catalog from disk. Files ending in `.json` are parsed as JSON,
    /// everything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`], [`ConfigError::Yaml`] or
    /// [`ConfigError::Json`] on read or parse failure.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::parse_json(&contents)
        } else {
            Self::parse_yaml(&contents)
        }
    }

    /// Parse a YAML catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not a valid catalog.
    pub fn parse_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Parse a JSON catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the string is not a valid catalog.
    pub fn parse_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate every definition against the registry, period table and
    /// habitat groups.
    ///
    /// Never fails: unknown names are dropped, out-of-range probabilities
    /// are clamped, and each fix-up is recorded as a warning and logged.
    pub fn validate(&self, config: &EngineConfig) -> ValidatedCatalog {
        let mut validated = ValidatedCatalog::default();
        let mut seen = BTreeSet::new();

        for definition in &self.monsters {
            if !seen.insert(definition.id.clone()) {
                validated.warnings.push(CatalogWarning::DuplicateMonster {
                    monster: definition.id.clone(),
                });
                continue;
            }
            let monster = validate_definition(definition, config, &mut validated.warnings);
            validated.monsters.push(monster);
        }

        for warning in &validated.warnings {
            warn!(%warning, "monster catalog inconsistency");
        }
        validated
    }
}

fn validate_definition(
    definition: &MonsterDefinition,
    config: &EngineConfig,
    warnings: &mut Vec<CatalogWarning>,
) -> Monster {
    let id = &definition.id;

    let base = definition.base_probability;
    let base_probability = if (0.0..=1.0).contains(&base) {
        base
    } else {
        warnings.push(CatalogWarning::BaseProbabilityOutOfRange {
            monster: id.clone(),
            value: base,
        });
        if base.is_nan() { 0.0 } else { base.clamp(0.0, 1.0) }
    };

    let mut active_seasons = BTreeSet::new();
    for name in &definition.active_seasons {
        match Season::parse(name) {
            Some(season) => {
                active_seasons.insert(season);
            }
            None => warnings.push(CatalogWarning::UnknownSeason {
                monster: id.clone(),
                name: name.clone(),
            }),
        }
    }

    let active_time = if definition.active_time.iter().any(|name| name == ANY_TIME) {
        ActiveTime::Any
    } else {
        let mut periods = Vec::new();
        for name in &definition.active_time {
            if config.calendar.has_period(name) {
                periods.push(name.clone());
            } else {
                warnings.push(CatalogWarning::UnknownPeriod {
                    monster: id.clone(),
                    name: name.clone(),
                });
            }
        }
        ActiveTime::Periods(periods)
    };

    let bonuses = resolve_modifiers(id, &definition.bonuses, ModifierKind::Bonus, warnings);
    let penalties = resolve_modifiers(id, &definition.penalties, ModifierKind::Penalty, warnings);

    let mut overrides = BTreeMap::new();
    for (name, &magnitude) in &definition.overrides {
        match ModifierKey::parse(name) {
            Some(key) => {
                overrides.insert(key, magnitude);
            }
            None => warnings.push(CatalogWarning::UnknownModifier {
                monster: id.clone(),
                name: name.clone(),
            }),
        }
    }

    let mut habitats = Vec::with_capacity(definition.habitats.len());
    for name in &definition.habitats {
        if config.habitat_groups.contains_key(name) || is_feature_code(name) {
            habitats.push(name.clone());
        } else {
            warnings.push(CatalogWarning::UnknownHabitat {
                monster: id.clone(),
                name: name.clone(),
            });
        }
    }

    Monster {
        id: id.clone(),
        name: definition.name.clone(),
        icon: definition.icon.clone(),
        base_probability,
        active_seasons,
        active_time,
        restrictions: definition.restrictions,
        bonuses,
        penalties,
        overrides,
        habitats,
    }
}

/// `CLASS` or `CLASS.CODE`: uppercase class letters, optional uppercase
/// alphanumeric code.
fn is_feature_code(name: &str) -> bool {
    let (class, code) = match name.split_once('.') {
        Some((class, code)) => (class, Some(code)),
        None => (name, None),
    };
    let class_ok = !class.is_empty() && class.bytes().all(|b| b.is_ascii_uppercase());
    let code_ok = code.is_none_or(|code| {
        !code.is_empty()
            && code
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    });
    class_ok && code_ok
}

fn resolve_modifiers(
    monster: &MonsterId,
    names: &[String],
    expected: ModifierKind,
    warnings: &mut Vec<CatalogWarning>,
) -> Vec<ModifierKey> {
    let mut keys = Vec::with_capacity(names.len());
    for name in names {
        match ModifierKey::parse(name) {
            Some(key) if key.kind() == expected => keys.push(key),
            Some(_) => warnings.push(CatalogWarning::WrongModifierKind {
                monster: monster.clone(),
                name: name.clone(),
                expected,
            }),
            None => warnings.push(CatalogWarning::UnknownModifier {
                monster: monster.clone(),
                name: name.clone(),
            }),
        }
    }
    keys
}

fn default_active_seasons() -> Vec<String> {
    Season::ALL
        .into_iter()
        .map(|season| season.as_str().to_owned())
        .collect()
}

fn default_active_time() -> Vec<String> {
    vec![ANY_TIME.to_owned()]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATALOG: &str = r"
monsters:
  - id: werewolf
    name: Werewolf
    icon: wolf
    base_probability: 0.08
    active_seasons: [Fall, Winter]
    active_time: [Night, Midnight]
    restrictions:
      requires_full_moon: true
    bonuses: [fullMoon, midnight]
    penalties: [daylight]
    overrides:
      fullMoon: 0.3
    habitats: [denseForest, T.MT]
  - id: nessie
    name: Loch Ness Monster
    base_probability: 0.02
    habitats: [lakes]
";

    #[test]
    fn parses_and_validates_clean_catalog() {
        let catalog = MonsterCatalog::parse_yaml(CATALOG).unwrap();
        let validated = catalog.validate(&EngineConfig::default());
        assert!(validated.warnings.is_empty(), "{:?}", validated.warnings);
        assert_eq!(validated.monsters.len(), 2);

        let werewolf = validated.monsters.first().unwrap();
        assert_eq!(werewolf.bonuses, vec![ModifierKey::FullMoon, ModifierKey::Midnight]);
        assert_eq!(werewolf.penalties, vec![ModifierKey::Daylight]);
        assert_eq!(werewolf.overrides.get(&ModifierKey::FullMoon), Some(&0.3));
        assert!(werewolf.restrictions.requires_full_moon);
        assert_eq!(
            werewolf.active_time,
            ActiveTime::Periods(vec!["Night".to_owned(), "Midnight".to_owned()])
        );
        assert!(!werewolf.active_seasons.contains(&Season::Summer));
    }

    #[test]
    fn omitted_fields_default_to_always_active() {
        let catalog = MonsterCatalog::parse_yaml(CATALOG).unwrap();
        let validated = catalog.validate(&EngineConfig::default());
        let nessie = validated.monsters.get(1).unwrap();
        assert_eq!(nessie.active_time, ActiveTime::Any);
        assert_eq!(nessie.active_seasons.len(), 4);
        assert!(nessie.bonuses.is_empty());
    }

    #[test]
    fn unknown_names_are_dropped_with_warnings() {
        let yaml = r"
monsters:
  - id: ghost
    name: Ghost
    base_probability: 1.5
    active_seasons: [Monsoon]
    active_time: [Teatime]
    bonuses: [eclipse, daylight, dark]
    overrides:
      bloodMoon: 0.9
";
        let catalog = MonsterCatalog::parse_yaml(yaml).unwrap();
        let validated = catalog.validate(&EngineConfig::default());
        let ghost = validated.monsters.first().unwrap();

        assert!((ghost.base_probability - 1.0).abs() < f64::EPSILON);
        assert!(ghost.active_seasons.is_empty());
        assert_eq!(ghost.active_time, ActiveTime::Periods(Vec::new()));
        assert_eq!(ghost.bonuses, vec![ModifierKey::Dark]);
        assert!(ghost.overrides.is_empty());
        assert_eq!(validated.warnings.len(), 6);
        assert!(validated.warnings.iter().any(|w| matches!(
            w,
            CatalogWarning::WrongModifierKind { name, .. } if name == "daylight"
        )));
    }

    #[test]
    fn misspelled_habitat_group_is_dropped_with_warning() {
        let yaml = r"
monsters:
  - id: nessie
    name: Loch Ness Monster
    base_probability: 0.02
    habitats: [lakes, denseForst, T.CAVE, P, h.lk]
";
        let catalog = MonsterCatalog::parse_yaml(yaml).unwrap();
        let validated = catalog.validate(&EngineConfig::default());
        let nessie = validated.monsters.first().unwrap();

        assert_eq!(nessie.habitats, vec!["lakes", "T.CAVE", "P"]);
        assert_eq!(
            validated.warnings,
            vec![
                CatalogWarning::UnknownHabitat {
                    monster: MonsterId::new("nessie"),
                    name: "denseForst".to_owned(),
                },
                CatalogWarning::UnknownHabitat {
                    monster: MonsterId::new("nessie"),
                    name: "h.lk".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn feature_code_shapes() {
        assert!(is_feature_code("P"));
        assert!(is_feature_code("H.LK"));
        assert!(is_feature_code("T.MT2"));
        assert!(!is_feature_code("denseForst"));
        assert!(!is_feature_code("H."));
        assert!(!is_feature_code(".LK"));
        assert!(!is_feature_code(""));
    }

    #[test]
    fn duplicate_ids_keep_first_entry() {
        let yaml = r"
monsters:
  - { id: imp, name: First, base_probability: 0.1 }
  - { id: imp, name: Second, base_probability: 0.2 }
";
        let catalog = MonsterCatalog::parse_yaml(yaml).unwrap();
        let validated = catalog.validate(&EngineConfig::default());
        assert_eq!(validated.monsters.len(), 1);
        assert_eq!(validated.monsters.first().unwrap().name, "First");
        assert!(matches!(
            validated.warnings.as_slice(),
            [CatalogWarning::DuplicateMonster { .. }]
        ));
    }

    #[test]
    fn json_catalog_parses() {
        let json = r#"{"monsters":[{"id":"mothman","name":"Mothman","base_probability":0.04,"active_time":["any"]}]}"#;
        let catalog = MonsterCatalog::parse_json(json).unwrap();
        assert_eq!(catalog.monsters.len(), 1);
        assert_eq!(catalog.monsters.first().unwrap().id, MonsterId::new("mothman"));
    }
}
