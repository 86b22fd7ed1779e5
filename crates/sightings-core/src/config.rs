//! Configuration loading and typed config structures for the sightings engine.
//!
//! The engine configuration lives in a YAML file (`sightings.yaml` by
//! default). Every field has a default matching the reference tables, so an
//! empty document is a valid configuration. [`EngineConfig::validate`]
//! rejects tables the calendar or rules engine cannot evaluate.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::modifiers::ModifierKey;

/// Last minute of the day (23:59).
pub const LAST_MINUTE_OF_DAY: u32 = 1439;

/// Errors that can occur when loading configuration or catalogs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// Failed to parse JSON content.
    #[error("failed to parse config JSON: {source}")]
    Json {
        /// The underlying JSON parse error.
        source: serde_json::Error,
    },

    /// The content parsed but describes an unusable configuration.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Time-period table and fallback period.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Rules-engine constants and modifier magnitudes.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Simulation constants.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Named habitat groups, each a list of feature codes.
    #[serde(default = "default_habitat_groups")]
    pub habitat_groups: BTreeMap<String, Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig::default(),
            rules: RulesConfig::default(),
            simulation: SimulationConfig::default(),
            habitat_groups: default_habitat_groups(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every table for values the engine cannot evaluate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for period in &self.calendar.periods {
            period.validate()?;
        }

        for (name, magnitude) in &self.rules.modifier_magnitudes {
            if ModifierKey::parse(name).is_none() {
                return Err(invalid(format!("unknown modifier in magnitudes: {name}")));
            }
            if !magnitude.is_finite() {
                return Err(invalid(format!("magnitude for {name} is not finite")));
            }
        }

        let constants = [
            ("global_event_multiplier", self.rules.global_event_multiplier),
            ("inactive_time_penalty", self.rules.inactive_time_penalty),
            ("out_of_season_multiplier", self.rules.out_of_season_multiplier),
            ("jitter_degrees", self.simulation.jitter_degrees),
        ];
        for (name, value) in constants {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{name} must be a finite, non-negative number")));
            }
        }

        if self.simulation.max_sightings == 0 {
            return Err(invalid("max_sightings must be at least 1".to_owned()));
        }

        Ok(())
    }
}

/// One named time-of-day period.
///
/// Offsets are minutes past midnight. The interval `[start, end]` is closed
/// and lies within a single day; `peak` sits strictly between the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePeriod {
    /// Period name referenced by monster `active_time` lists.
    pub name: String,
    /// First minute of the period.
    pub start: u32,
    /// Last minute of the period.
    pub end: u32,
    /// Minute at which the multiplier peaks.
    pub peak: u32,
    /// Multiplier at the peak (at least 1).
    pub multiplier: f64,
}

impl TimePeriod {
    /// Build a period from its parts.
    pub fn new(name: &str, start: u32, peak: u32, end: u32, multiplier: f64) -> Self {
        Self {
            name: name.to_owned(),
            start,
            end,
            peak,
            multiplier,
        }
    }

    /// Whether `minute` falls inside the closed interval.
    pub const fn contains(&self, minute: u32) -> bool {
        minute >= self.start && minute <= self.end
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.start < self.peak && self.peak < self.end) {
            return Err(invalid(format!(
                "period {} must satisfy start < peak < end",
                self.name
            )));
        }
        if self.end > LAST_MINUTE_OF_DAY {
            return Err(invalid(format!(
                "period {} ends after minute {LAST_MINUTE_OF_DAY}",
                self.name
            )));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(invalid(format!(
                "period {} multiplier must be at least 1",
                self.name
            )));
        }
        Ok(())
    }
}

/// Time-period configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Ordered period table. The first match wins for the current period.
    #[serde(default = "default_periods")]
    pub periods: Vec<TimePeriod>,

    /// Period reported when no interval contains the current minute.
    #[serde(default = "default_fallback_period")]
    pub fallback_period: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            periods: default_periods(),
            fallback_period: default_fallback_period(),
        }
    }
}

impl CalendarConfig {
    /// Whether a period with this name is configured.
    pub fn has_period(&self, name: &str) -> bool {
        self.periods.iter().any(|period| period.name == name)
    }
}

/// Rules-engine constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Multiplier applied to the base probability on Halloween.
    #[serde(default = "default_global_event_multiplier")]
    pub global_event_multiplier: f64,

    /// Time multiplier for a monster outside all of its active periods.
    #[serde(default = "default_inactive_time_penalty")]
    pub inactive_time_penalty: f64,

    /// Multiplier for a monster outside its active seasons.
    #[serde(default = "default_out_of_season_multiplier")]
    pub out_of_season_multiplier: f64,

    /// Global magnitude overrides keyed by modifier name. Modifiers not
    /// listed keep their built-in default.
    #[serde(default)]
    pub modifier_magnitudes: BTreeMap<String, f64>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            global_event_multiplier: default_global_event_multiplier(),
            inactive_time_penalty: default_inactive_time_penalty(),
            out_of_season_multiplier: default_out_of_season_multiplier(),
            modifier_magnitudes: BTreeMap::new(),
        }
    }
}

/// Simulation constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of Bernoulli trials per monster per day, and therefore the
    /// ceiling on sightings.
    #[serde(default = "default_max_sightings")]
    pub max_sightings: u32,

    /// Half-width of the uniform coordinate jitter, in degrees.
    #[serde(default = "default_jitter_degrees")]
    pub jitter_degrees: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_sightings: default_max_sightings(),
            jitter_degrees: default_jitter_degrees(),
        }
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_periods() -> Vec<TimePeriod> {
    vec![
        TimePeriod::new("Midnight", 0, 60, 179, 2.5),
        TimePeriod::new("Witching Hour", 180, 210, 239, 3.0),
        TimePeriod::new("Dawn", 240, 330, 419, 1.5),
        TimePeriod::new("Day", 420, 750, 1079, 1.0),
        TimePeriod::new("Dusk", 1080, 1170, 1259, 1.8),
        TimePeriod::new("Night", 1260, 1350, 1439, 2.2),
    ]
}

fn default_fallback_period() -> String {
    "Day".to_owned()
}

const fn default_global_event_multiplier() -> f64 {
    2.5
}

const fn default_inactive_time_penalty() -> f64 {
    0.1
}

const fn default_out_of_season_multiplier() -> f64 {
    0.5
}

const fn default_max_sightings() -> u32 {
    40
}

const fn default_jitter_degrees() -> f64 {
    0.01
}

fn default_habitat_groups() -> BTreeMap<String, Vec<String>> {
    let groups: [(&str, &[&str]); 7] = [
        ("denseForest", &["V.FRST", "V.FRSTF"]),
        ("wetlands", &["H.SWMP", "H.MRSH", "H.BOG"]),
        ("mountains", &["T.MT", "T.MTS", "T.PK", "T.RDGE"]),
        ("lakes", &["H.LK", "H.LKS", "H.RSV"]),
        ("caves", &["T.CAVE"]),
        ("coast", &["T.BCH", "T.CAPE", "H.BAY"]),
        ("settlements", &["P"]),
    ];
    groups
        .into_iter()
        .map(|(name, codes)| {
            (
                name.to_owned(),
                codes.iter().map(|&code| code.to_owned()).collect(),
            )
        })
        .collect()
}
