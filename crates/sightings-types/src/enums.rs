//! Enumeration types for the sightings engine.
//!
//! Seasons, lunar phases, holidays, event tags, and likelihood bands. All of
//! them serialize to the strings the presentation layer displays.

use core::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// A season of the calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Season {
    /// March through May.
    Spring,
    /// June through August.
    Summer,
    /// September through November.
    #[serde(alias = "Autumn")]
    Fall,
    /// December through February.
    Winter,
}

impl Season {
    /// All seasons in calendar order.
    pub const ALL: [Self; 4] = [Self::Spring, Self::Summer, Self::Fall, Self::Winter];

    /// Display name used in breakdown sub-labels.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
            Self::Winter => "Winter",
        }
    }

    /// Parse a season name, case-insensitively. `autumn` is accepted as an
    /// alias for [`Season::Fall`].
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "spring" => Some(Self::Spring),
            "summer" => Some(Self::Summer),
            "fall" | "autumn" => Some(Self::Fall),
            "winter" => Some(Self::Winter),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Lunar phases
// ---------------------------------------------------------------------------

/// One of the eight discrete lunar phases.
///
/// Variants are ordered by phase index: `New` is 0, `Full` is 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MoonPhase {
    /// Phase index 0.
    New,
    /// Phase index 1.
    WaxingCrescent,
    /// Phase index 2.
    FirstQuarter,
    /// Phase index 3.
    WaxingGibbous,
    /// Phase index 4.
    Full,
    /// Phase index 5.
    WaningGibbous,
    /// Phase index 6.
    LastQuarter,
    /// Phase index 7.
    WaningCrescent,
}

impl MoonPhase {
    /// Map a phase index in `0..8` to its variant. Indices wrap modulo 8.
    pub const fn from_index(index: u8) -> Self {
        match index % 8 {
            0 => Self::New,
            1 => Self::WaxingCrescent,
            2 => Self::FirstQuarter,
            3 => Self::WaxingGibbous,
            4 => Self::Full,
            5 => Self::WaningGibbous,
            6 => Self::LastQuarter,
            _ => Self::WaningCrescent,
        }
    }

    /// The glyph shown next to the date.
    pub const fn icon(self) -> &'static str {
        match self {
            Self::New => "\u{1F311}",
            Self::WaxingCrescent => "\u{1F312}",
            Self::FirstQuarter => "\u{1F313}",
            Self::WaxingGibbous => "\u{1F314}",
            Self::Full => "\u{1F315}",
            Self::WaningGibbous => "\u{1F316}",
            Self::LastQuarter => "\u{1F317}",
            Self::WaningCrescent => "\u{1F318}",
        }
    }

    /// Display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "New Moon",
            Self::WaxingCrescent => "Waxing Crescent",
            Self::FirstQuarter => "First Quarter",
            Self::WaxingGibbous => "Waxing Gibbous",
            Self::Full => "Full Moon",
            Self::WaningGibbous => "Waning Gibbous",
            Self::LastQuarter => "Last Quarter",
            Self::WaningCrescent => "Waning Crescent",
        }
    }
}

// ---------------------------------------------------------------------------
// Holidays and events
// ---------------------------------------------------------------------------

/// A calendar holiday recognised by the modifier registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Holiday {
    /// October 31st. Overrides every other modifier.
    Halloween,
    /// June 21st.
    Midsummer,
    /// December 21st.
    Yule,
}

impl Holiday {
    /// Parse a holiday name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "halloween" => Some(Self::Halloween),
            "midsummer" => Some(Self::Midsummer),
            "yule" => Some(Self::Yule),
            _ => None,
        }
    }

    /// Display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Halloween => "Halloween",
            Self::Midsummer => "Midsummer",
            Self::Yule => "Yule",
        }
    }
}

/// Tag attached to a spotting result when a global event drove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum EventTag {
    /// The Halloween global multiplier replaced the normal pipeline.
    Halloween,
}

// ---------------------------------------------------------------------------
// Likelihood bands
// ---------------------------------------------------------------------------

/// Coarse classification of a day's sighting count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Likelihood {
    /// A hard restriction ruled the monster out.
    Impossible,
    /// No sightings.
    #[serde(rename = "Very Low")]
    VeryLow,
    /// One or two sightings.
    Low,
    /// Three to five sightings.
    Medium,
    /// Six or more sightings.
    High,
}

impl Likelihood {
    /// Classify a sighting count. Never returns [`Likelihood::Impossible`];
    /// that band is reserved for restriction short-circuits.
    pub const fn from_count(count: u32) -> Self {
        match count {
            0 => Self::VeryLow,
            1..=2 => Self::Low,
            3..=5 => Self::Medium,
            _ => Self::High,
        }
    }

    /// Display label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Impossible => "Impossible",
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Likelihood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
