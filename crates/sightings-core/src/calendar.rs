//! Calendar and time-of-day oracle for the sightings engine.
//!
//! Every temporal fact the rules engine consults is derived here, from three
//! inputs: the shared application date, the viewer's wall-clock time of day,
//! and an optional bundle of [`DebugOverrides`].
//!
//! # Design Principles
//!
//! - Date-derived facts (seed, season, moon phase, holidays) use calendar
//!   fields only, so every viewer on the same calendar day gets the same
//!   answers regardless of timezone.
//! - Time-of-day facts (period, night, dark, witching hour) use the viewer's
//!   local wall clock on purpose: they describe what that viewer experiences.
//! - A non-null override always beats the computed value.
//! - [`CalendarState`] snapshots all of this once per recomputation and is
//!   passed explicitly into every rules and simulation call.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sightings_types::{Conditions, Holiday, MoonPhase, Season};
use tracing::warn;

use crate::config::{CalendarConfig, TimePeriod};

/// Length of the synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588_853;

/// Sentinel in a monster's `active_time` list meaning "any time of day".
pub const ANY_TIME: &str = "any";

/// Seconds in one day.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Reference new moon: 2000-01-06 18:14 UTC, as a Unix timestamp.
const REFERENCE_NEW_MOON_UNIX: i64 = 947_182_440;

/// Errors raised when validating caller-supplied overrides.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// A forced time-of-day string could not be parsed.
    #[error("invalid time override {raw:?}: expected HH:MM or HH:MM:SS")]
    InvalidTimeOverride {
        /// The rejected input.
        raw: String,
    },

    /// A forced season string named no known season.
    #[error("invalid season override {raw:?}")]
    InvalidSeasonOverride {
        /// The rejected input.
        raw: String,
    },

    /// A forced holiday string named no known holiday.
    #[error("invalid holiday override {raw:?}: expected halloween, midsummer, yule or none")]
    InvalidHolidayOverride {
        /// The rejected input.
        raw: String,
    },
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// A forced holiday state.
///
/// Forcing a holiday makes its flag true and the other holiday flags false.
/// [`HolidayOverride::Ordinary`] forces every holiday flag off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayOverride {
    /// Force Halloween.
    Halloween,
    /// Force Midsummer.
    Midsummer,
    /// Force Yule.
    Yule,
    /// Force an ordinary day.
    Ordinary,
}

impl HolidayOverride {
    /// Parse an override name. `none` and `ordinary` both force an ordinary
    /// day.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidHolidayOverride`] for unknown names.
    pub fn parse(raw: &str) -> Result<Self, CalendarError> {
        match raw.trim().to_lowercase().as_str() {
            "none" | "ordinary" => Ok(Self::Ordinary),
            other => match Holiday::parse(other) {
                Some(Holiday::Halloween) => Ok(Self::Halloween),
                Some(Holiday::Midsummer) => Ok(Self::Midsummer),
                Some(Holiday::Yule) => Ok(Self::Yule),
                None => Err(CalendarError::InvalidHolidayOverride {
                    raw: raw.to_owned(),
                }),
            },
        }
    }

    /// The holiday this override produces, if any.
    pub const fn holiday(self) -> Option<Holiday> {
        match self {
            Self::Halloween => Some(Holiday::Halloween),
            Self::Midsummer => Some(Holiday::Midsummer),
            Self::Yule => Some(Holiday::Yule),
            Self::Ordinary => None,
        }
    }
}

/// Values a debug panel may inject. `None` means "no override".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugOverrides {
    /// Forced time of day.
    #[serde(default)]
    pub time: Option<NaiveTime>,
    /// Forced season.
    #[serde(default)]
    pub season: Option<Season>,
    /// Forced full-moon flag.
    #[serde(default)]
    pub full_moon: Option<bool>,
    /// Forced holiday state.
    #[serde(default)]
    pub holiday: Option<HolidayOverride>,
    /// Multiplier applied after the whole rules pipeline.
    #[serde(default)]
    pub probability_multiplier: Option<f64>,
}

/// Parse a forced time-of-day string (`HH:MM` or `HH:MM:SS`).
///
/// Callers validate overrides with this before they reach the engine, so a
/// malformed value leaves the previous state in effect.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidTimeOverride`] if the string is not a
/// valid time.
pub fn parse_time_override(raw: &str) -> Result<NaiveTime, CalendarError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_err| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_err| CalendarError::InvalidTimeOverride {
            raw: raw.to_owned(),
        })
}

/// Resolve an optional raw time override, dropping invalid values.
///
/// An invalid string is logged and treated as "no override", so the
/// simulated time falls back to the wall clock.
pub fn resolve_time_override(raw: Option<&str>) -> Option<NaiveTime> {
    let raw = raw?;
    match parse_time_override(raw) {
        Ok(time) => Some(time),
        Err(err) => {
            warn!(error = %err, "ignoring time override, using wall clock");
            None
        }
    }
}

/// Parse a forced season string.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidSeasonOverride`] for unknown names.
pub fn parse_season_override(raw: &str) -> Result<Season, CalendarError> {
    Season::parse(raw).ok_or_else(|| CalendarError::InvalidSeasonOverride {
        raw: raw.to_owned(),
    })
}

// ---------------------------------------------------------------------------
// Date-derived facts (timezone independent)
// ---------------------------------------------------------------------------

/// The calendar seed: the date formatted as `YYYY-MM-DD`.
///
/// This is the only seed source for the simulation. It never depends on the
/// wall clock, so every viewer on the same calendar day converges on the same
/// output.
pub fn date_seed(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Fraction of the lunar cycle elapsed at 00:00 UTC of `date`, in `[0, 1)`.
///
/// `0` is a new moon and `0.5` a full moon.
pub fn moon_phase_fraction(date: NaiveDate) -> f64 {
    let midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    let elapsed = midnight.timestamp().saturating_sub(REFERENCE_NEW_MOON_UNIX);
    // Second counts for any representable date are far below 2^52.
    #[allow(clippy::cast_precision_loss)]
    let days = elapsed as f64 / SECONDS_PER_DAY;
    days.rem_euclid(SYNODIC_MONTH_DAYS) / SYNODIC_MONTH_DAYS
}

/// The discrete lunar phase on `date`: `round(phase * 8) mod 8`.
pub fn moon_phase(date: NaiveDate) -> MoonPhase {
    // round(phase * 8) mod 8 is an integer in 0..8.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (moon_phase_fraction(date) * 8.0).round().rem_euclid(8.0) as u8;
    MoonPhase::from_index(index)
}

/// The season by month, northern-hemisphere meteorological convention.
pub fn computed_season(date: NaiveDate) -> Season {
    match date.month() {
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        9..=11 => Season::Fall,
        _ => Season::Winter,
    }
}

/// The holiday falling on `date`, if any.
pub fn computed_holiday(date: NaiveDate) -> Option<Holiday> {
    match (date.month(), date.day()) {
        (10, 31) => Some(Holiday::Halloween),
        (6, 21) => Some(Holiday::Midsummer),
        (12, 21) => Some(Holiday::Yule),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Time-of-day facts (local wall-clock semantics)
// ---------------------------------------------------------------------------

/// The application date combined with the override time, or the viewer's
/// wall-clock time when there is no override.
pub fn current_simulated_time(
    date: NaiveDate,
    wall_clock: NaiveTime,
    override_time: Option<NaiveTime>,
) -> NaiveDateTime {
    date.and_time(override_time.unwrap_or(wall_clock))
}

/// Minutes past midnight, `0..=1439`.
pub fn minutes_past_midnight(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

/// Name of the first configured period containing `time`, or the fallback.
pub fn current_period(time: NaiveTime, config: &CalendarConfig) -> &str {
    let minute = minutes_past_midnight(time);
    config
        .periods
        .iter()
        .find(|period| period.contains(minute))
        .map_or(config.fallback_period.as_str(), |period| period.name.as_str())
}

/// Night: 21:00 through 04:59.
pub fn is_night(time: NaiveTime) -> bool {
    let hour = time.hour();
    hour >= 21 || hour < 5
}

/// Dark: 19:00 through 05:59.
pub fn is_dark(time: NaiveTime) -> bool {
    let hour = time.hour();
    hour >= 19 || hour < 6
}

/// The witching hour: 03:00 through 03:59.
pub fn is_witching_hour(time: NaiveTime) -> bool {
    time.hour() == 3
}

// ---------------------------------------------------------------------------
// Time multiplier
// ---------------------------------------------------------------------------

/// When a monster is active during the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveTime {
    /// Active at every time of day; the time multiplier is always 1.
    Any,
    /// Active only during the named periods.
    Periods(Vec<String>),
}

/// Quadratic ramp for one period at `minute`.
///
/// Rises from 1 at `start` to `multiplier` at `peak` and falls back to 1 at
/// `end`. Returns `None` when `minute` is outside the period.
pub fn period_ramp(period: &TimePeriod, minute: u32) -> Option<f64> {
    if !period.contains(minute) {
        return None;
    }
    let max_bonus = period.multiplier - 1.0;
    let now = f64::from(minute);
    let start = f64::from(period.start);
    let peak = f64::from(period.peak);
    let end = f64::from(period.end);

    let progress = if minute <= period.peak {
        (now - start) / (peak - start)
    } else {
        (end - now) / (end - peak)
    };
    Some(max_bonus.mul_add(progress * progress, 1.0))
}

/// Time-of-day multiplier for a monster at `minute`.
///
/// `Any` yields exactly 1. Otherwise the highest ramp among the monster's
/// active periods that contain `minute` wins; if none contain it, the
/// `inactive_penalty` applies instead of zero.
pub fn time_multiplier(
    active: &ActiveTime,
    minute: u32,
    periods: &[TimePeriod],
    inactive_penalty: f64,
) -> f64 {
    let ActiveTime::Periods(names) = active else {
        return 1.0;
    };
    periods
        .iter()
        .filter(|period| names.iter().any(|name| *name == period.name))
        .filter_map(|period| period_ramp(period, minute))
        .reduce(f64::max)
        .unwrap_or(inactive_penalty)
}

// ---------------------------------------------------------------------------
// Calendar state
// ---------------------------------------------------------------------------

/// Snapshot of every calendar and time-of-day fact for one recomputation.
///
/// Built once and passed by reference into the rules and simulation
/// engines; nothing downstream reads ambient state.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarState {
    date: NaiveDate,
    simulated_time: NaiveDateTime,
    minute_of_day: u32,
    period: String,
    season: Season,
    moon_phase: MoonPhase,
    full_moon: bool,
    holiday: Option<Holiday>,
    overrides: DebugOverrides,
}

impl CalendarState {
    /// Derive the calendar state for `date` as seen at `wall_clock` local
    /// time, with `overrides` applied.
    pub fn new(
        date: NaiveDate,
        wall_clock: NaiveTime,
        overrides: DebugOverrides,
        config: &CalendarConfig,
    ) -> Self {
        let simulated_time = current_simulated_time(date, wall_clock, overrides.time);
        let time = simulated_time.time();
        let moon_phase = moon_phase(date);
        let holiday = match overrides.holiday {
            Some(forced) => forced.holiday(),
            None => computed_holiday(date),
        };

        Self {
            date,
            simulated_time,
            minute_of_day: minutes_past_midnight(time),
            period: current_period(time, config).to_owned(),
            season: overrides.season.unwrap_or_else(|| computed_season(date)),
            moon_phase,
            full_moon: overrides.full_moon.unwrap_or(moon_phase == MoonPhase::Full),
            holiday,
            overrides,
        }
    }

    /// The `YYYY-MM-DD` calendar seed.
    pub fn seed(&self) -> String {
        date_seed(self.date)
    }

    /// The application date.
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// The simulated local date and time.
    pub const fn simulated_time(&self) -> NaiveDateTime {
        self.simulated_time
    }

    /// Minutes past midnight of the simulated time.
    pub const fn minute_of_day(&self) -> u32 {
        self.minute_of_day
    }

    /// Name of the active time period.
    pub fn period(&self) -> &str {
        &self.period
    }

    /// The active season.
    pub const fn season(&self) -> Season {
        self.season
    }

    /// The computed lunar phase. Not affected by the full-moon override.
    pub const fn moon_phase(&self) -> MoonPhase {
        self.moon_phase
    }

    /// The active holiday, if any.
    pub const fn holiday(&self) -> Option<Holiday> {
        self.holiday
    }

    /// The overrides this state was built with.
    pub const fn overrides(&self) -> &DebugOverrides {
        &self.overrides
    }

    /// Whether the moon is full (override first).
    pub const fn is_full_moon(&self) -> bool {
        self.full_moon
    }

    /// Whether it is night at the simulated time.
    pub fn is_night(&self) -> bool {
        is_night(self.simulated_time.time())
    }

    /// Whether it is dark at the simulated time.
    pub fn is_dark(&self) -> bool {
        is_dark(self.simulated_time.time())
    }

    /// Whether it is the witching hour at the simulated time.
    pub fn is_witching_hour(&self) -> bool {
        is_witching_hour(self.simulated_time.time())
    }

    /// Whether it is Halloween.
    pub fn is_halloween(&self) -> bool {
        self.holiday == Some(Holiday::Halloween)
    }

    /// Whether it is Midsummer.
    pub fn is_midsummer(&self) -> bool {
        self.holiday == Some(Holiday::Midsummer)
    }

    /// Whether it is Yule.
    pub fn is_yule(&self) -> bool {
        self.holiday == Some(Holiday::Yule)
    }

    /// The debug probability multiplier, 1 when not overridden.
    pub fn probability_multiplier(&self) -> f64 {
        self.overrides.probability_multiplier.unwrap_or(1.0)
    }

    /// Serializable summary for a presentation layer.
    pub fn conditions(&self) -> Conditions {
        Conditions {
            seed: self.seed(),
            date: self.date,
            time: self.simulated_time.time(),
            period: self.period.clone(),
            season: self.season,
            moon_phase: self.moon_phase,
            moon_icon: self.moon_phase.icon().to_owned(),
            is_night: self.is_night(),
            is_dark: self.is_dark(),
            is_witching_hour: self.is_witching_hour(),
            is_full_moon: self.full_moon,
            holiday: self.holiday,
        }
    }
}
