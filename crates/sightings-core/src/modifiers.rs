//! Modifier registry: named bonuses and penalties bound to calendar
//! predicates.
//!
//! Each [`ModifierKey`] carries its category, display label, default
//! magnitude, and a predicate over [`CalendarState`]. Bonuses add their
//! magnitude to the running probability; penalties multiply it.
//!
//! Magnitudes resolve in three layers: the built-in default, the global
//! table in [`RulesConfig::modifier_magnitudes`], and finally a per-monster
//! override.
//!
//! [`RulesConfig::modifier_magnitudes`]: crate::config::RulesConfig::modifier_magnitudes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sightings_types::{MoonPhase, Season};

use crate::calendar::CalendarState;
use crate::config::RulesConfig;

/// Whether a modifier adds to or multiplies the running probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    /// Additive.
    Bonus,
    /// Multiplicative.
    Penalty,
}

/// Every modifier the registry knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModifierKey {
    /// The Midnight period is active.
    Midnight,
    /// It is the witching hour.
    WitchingHour,
    /// The moon is full.
    FullMoon,
    /// It is dark.
    Dark,
    /// It is night.
    Night,
    /// The Dusk period is active.
    Dusk,
    /// The Dawn period is active.
    Dawn,
    /// It is Midsummer.
    Midsummer,
    /// It is Yule.
    Yule,
    /// It is light out.
    Daylight,
    /// The moon is new.
    NewMoon,
    /// The season is winter.
    Winter,
    /// The season is summer.
    Summer,
}

impl ModifierKey {
    /// All keys, bonuses first.
    pub const ALL: [Self; 13] = [
        Self::Midnight,
        Self::WitchingHour,
        Self::FullMoon,
        Self::Dark,
        Self::Night,
        Self::Dusk,
        Self::Dawn,
        Self::Midsummer,
        Self::Yule,
        Self::Daylight,
        Self::NewMoon,
        Self::Winter,
        Self::Summer,
    ];

    /// Look up a key by its catalog name (e.g. `"fullMoon"`).
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Catalog name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Midnight => "midnight",
            Self::WitchingHour => "witchingHour",
            Self::FullMoon => "fullMoon",
            Self::Dark => "dark",
            Self::Night => "night",
            Self::Dusk => "dusk",
            Self::Dawn => "dawn",
            Self::Midsummer => "midsummer",
            Self::Yule => "yule",
            Self::Daylight => "daylight",
            Self::NewMoon => "newMoon",
            Self::Winter => "winter",
            Self::Summer => "summer",
        }
    }

    /// Display label recorded in breakdown steps.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Midnight => "Midnight",
            Self::WitchingHour => "Witching Hour",
            Self::FullMoon => "Full Moon",
            Self::Dark => "Darkness",
            Self::Night => "Nighttime",
            Self::Dusk => "Dusk",
            Self::Dawn => "Dawn",
            Self::Midsummer => "Midsummer",
            Self::Yule => "Yule",
            Self::Daylight => "Daylight",
            Self::NewMoon => "New Moon",
            Self::Winter => "Winter",
            Self::Summer => "Summer",
        }
    }

    /// Whether this modifier is a bonus or a penalty.
    pub const fn kind(self) -> ModifierKind {
        match self {
            Self::Daylight | Self::NewMoon | Self::Winter | Self::Summer => ModifierKind::Penalty,
            _ => ModifierKind::Bonus,
        }
    }

    /// Built-in magnitude: an addend for bonuses, a factor for penalties.
    pub const fn default_magnitude(self) -> f64 {
        match self {
            Self::Midnight => 0.15,
            Self::WitchingHour | Self::FullMoon | Self::Yule => 0.2,
            Self::Dark | Self::Night => 0.1,
            Self::Dusk | Self::Dawn => 0.05,
            Self::Midsummer => 0.25,
            Self::Daylight => 0.5,
            Self::NewMoon => 0.75,
            Self::Winter => 0.6,
            Self::Summer => 0.8,
        }
    }

    /// Evaluate the predicate against the calendar.
    pub fn is_active(self, calendar: &CalendarState) -> bool {
        match self {
            Self::Midnight => calendar.period() == "Midnight",
            Self::WitchingHour => calendar.is_witching_hour(),
            Self::FullMoon => calendar.is_full_moon(),
            Self::Dark => calendar.is_dark(),
            Self::Night => calendar.is_night(),
            Self::Dusk => calendar.period() == "Dusk",
            Self::Dawn => calendar.period() == "Dawn",
            Self::Midsummer => calendar.is_midsummer(),
            Self::Yule => calendar.is_yule(),
            Self::Daylight => !calendar.is_dark(),
            Self::NewMoon => calendar.moon_phase() == MoonPhase::New,
            Self::Winter => calendar.season() == Season::Winter,
            Self::Summer => calendar.season() == Season::Summer,
        }
    }
}

/// Result of evaluating one modifier for one monster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifierEvaluation {
    /// Whether the predicate holds.
    pub active: bool,
    /// Per-monster override, else the global magnitude.
    pub magnitude: f64,
    /// Display label.
    pub label: &'static str,
}

/// Global magnitude table.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierRegistry {
    magnitudes: BTreeMap<ModifierKey, f64>,
}

impl Default for ModifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModifierRegistry {
    /// Registry with built-in magnitudes only.
    pub fn new() -> Self {
        Self {
            magnitudes: ModifierKey::ALL
                .into_iter()
                .map(|key| (key, key.default_magnitude()))
                .collect(),
        }
    }

    /// Registry with the configured global magnitudes layered over the
    /// built-ins. Unknown names were rejected by config validation and are
    /// skipped here.
    pub fn from_config(config: &RulesConfig) -> Self {
        let mut registry = Self::new();
        for (name, &magnitude) in &config.modifier_magnitudes {
            if let Some(key) = ModifierKey::parse(name) {
                registry.magnitudes.insert(key, magnitude);
            }
        }
        registry
    }

    /// The global magnitude for `key`.
    pub fn magnitude(&self, key: ModifierKey) -> f64 {
        self.magnitudes
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.default_magnitude())
    }

    /// Evaluate `key` against the calendar, applying a per-monster override
    /// when present.
    pub fn evaluate(
        &self,
        key: ModifierKey,
        calendar: &CalendarState,
        overrides: &BTreeMap<ModifierKey, f64>,
    ) -> ModifierEvaluation {
        ModifierEvaluation {
            active: key.is_active(calendar),
            magnitude: overrides
                .get(&key)
                .copied()
                .unwrap_or_else(|| self.magnitude(key)),
            label: key.label(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::calendar::DebugOverrides;
    use crate::config::CalendarConfig;

    fn calendar_at(h: u32, m: u32, overrides: DebugOverrides) -> CalendarState {
        CalendarState::new(
            NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
            NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            overrides,
            &CalendarConfig::default(),
        )
    }

    #[test]
    fn names_round_trip_through_parse() {
        for key in ModifierKey::ALL {
            assert_eq!(ModifierKey::parse(key.name()), Some(key));
        }
        assert_eq!(ModifierKey::parse("eclipse"), None);
        assert_eq!(ModifierKey::parse("FullMoon"), None);
    }

    #[test]
    fn serde_name_matches_catalog_name() {
        for key in ModifierKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.name()));
        }
    }

    #[test]
    fn penalties_are_classified() {
        assert_eq!(ModifierKey::Daylight.kind(), ModifierKind::Penalty);
        assert_eq!(ModifierKey::FullMoon.kind(), ModifierKind::Bonus);
    }

    #[test]
    fn midnight_predicate_tracks_period() {
        let calendar = calendar_at(0, 30, DebugOverrides::default());
        assert!(ModifierKey::Midnight.is_active(&calendar));
        let calendar = calendar_at(12, 0, DebugOverrides::default());
        assert!(!ModifierKey::Midnight.is_active(&calendar));
        assert!(ModifierKey::Daylight.is_active(&calendar));
    }

    #[test]
    fn full_moon_predicate_honours_override() {
        let overrides = DebugOverrides {
            full_moon: Some(true),
            ..DebugOverrides::default()
        };
        let calendar = calendar_at(12, 0, overrides);
        assert!(ModifierKey::FullMoon.is_active(&calendar));
    }

    #[test]
    fn configured_magnitude_replaces_default() {
        let mut config = RulesConfig::default();
        config.modifier_magnitudes.insert("fullMoon".to_owned(), 0.4);
        let registry = ModifierRegistry::from_config(&config);
        assert!((registry.magnitude(ModifierKey::FullMoon) - 0.4).abs() < f64::EPSILON);
        assert!((registry.magnitude(ModifierKey::Dark) - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn per_monster_override_wins() {
        let registry = ModifierRegistry::new();
        let calendar = calendar_at(22, 0, DebugOverrides::default());
        let mut overrides = BTreeMap::new();
        overrides.insert(ModifierKey::Night, 0.35);

        let night = registry.evaluate(ModifierKey::Night, &calendar, &overrides);
        assert!(night.active);
        assert!((night.magnitude - 0.35).abs() < f64::EPSILON);
        assert_eq!(night.label, "Nighttime");

        let dark = registry.evaluate(ModifierKey::Dark, &calendar, &overrides);
        assert!((dark.magnitude - 0.1).abs() < f64::EPSILON);
    }
}
