//! Rules engine: one monster, one moment, one probability.
//!
//! [`RulesEngine::calculate_spotting_data`] runs a frozen pipeline whose
//! order is visible in the breakdown and, for multiplicative steps, in the
//! number itself:
//!
//! 1. Halloween: base times the global event multiplier, nothing else.
//! 2. Otherwise: restrictions (short-circuit to impossible), base, season,
//!    time of day, bonuses (additive), penalties (multiplicative).
//! 3. Debug multiplier, on either branch.
//! 4. Clamp to `[0, 1]` and prepend the final step.
//!
//! Every input path is total. Names that did not survive catalog validation
//! never reach this module.

use sightings_types::{Breakdown, BreakdownStep, EventTag, SpottingData};
use tracing::debug;

use crate::calendar::{CalendarState, time_multiplier};
use crate::config::{EngineConfig, RulesConfig, TimePeriod};
use crate::modifiers::ModifierRegistry;
use crate::monster::{Monster, Restrictions};

/// Label on the Halloween multiplier step.
pub const GLOBAL_MULTIPLIER_LABEL: &str = "Global Multiplier";

/// Label on the out-of-season multiplier step.
pub const SEASON_LABEL: &str = "Season";

/// Label on the time-of-day multiplier step.
pub const TIME_OF_DAY_LABEL: &str = "Time of Day";

/// Label on the debug multiplier step.
pub const DEBUG_OVERRIDE_LABEL: &str = "Debug Override";

/// Computes spotting probabilities from a fixed configuration.
#[derive(Debug, Clone)]
pub struct RulesEngine {
    registry: ModifierRegistry,
    rules: RulesConfig,
    periods: Vec<TimePeriod>,
}

impl RulesEngine {
    /// Build an engine from validated configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            registry: ModifierRegistry::from_config(&config.rules),
            rules: config.rules.clone(),
            periods: config.calendar.periods.clone(),
        }
    }

    /// The modifier registry in use.
    pub const fn registry(&self) -> &ModifierRegistry {
        &self.registry
    }

    /// Compute the spotting probability for `monster` under `calendar`.
    ///
    /// `debug_multiplier` is applied last on both branches when it is not 1.
    pub fn calculate_spotting_data(
        &self,
        monster: &Monster,
        calendar: &CalendarState,
        debug_multiplier: f64,
    ) -> SpottingData {
        let mut breakdown = Breakdown::new();
        let mut event = None;
        let mut probability;

        if calendar.is_halloween() {
            let multiplier = self.rules.global_event_multiplier;
            probability = monster.base_probability * multiplier;
            event = Some(EventTag::Halloween);
            breakdown.push(BreakdownStep::Multiplier {
                label: GLOBAL_MULTIPLIER_LABEL.to_owned(),
                sub_label: Some("Halloween".to_owned()),
                value: multiplier,
            });
        } else {
            let unmet = unmet_restrictions(monster.restrictions, calendar);
            if !unmet.is_empty() {
                let reason = unmet.join(", ");
                debug!(monster = %monster.id, %reason, "spotting impossible");
                return SpottingData {
                    probability: 0.0,
                    event: None,
                    breakdown: Breakdown::impossible(reason),
                };
            }
            probability = self.apply_modifiers(monster, calendar, &mut breakdown);
        }

        if (debug_multiplier - 1.0).abs() > f64::EPSILON {
            probability *= debug_multiplier;
            breakdown.push(BreakdownStep::Multiplier {
                label: DEBUG_OVERRIDE_LABEL.to_owned(),
                sub_label: None,
                value: debug_multiplier,
            });
        }

        let probability = clamp_probability(probability);
        breakdown.prepend_final(probability);

        debug!(
            monster = %monster.id,
            probability,
            steps = breakdown.len(),
            "spotting probability computed"
        );

        SpottingData {
            probability,
            event,
            breakdown,
        }
    }

    /// Steps 2b through 2f: base, season, time, bonuses, penalties.
    fn apply_modifiers(
        &self,
        monster: &Monster,
        calendar: &CalendarState,
        breakdown: &mut Breakdown,
    ) -> f64 {
        let mut probability = monster.base_probability;
        breakdown.push(BreakdownStep::Base { value: probability });

        let season = calendar.season();
        if !monster.active_seasons.contains(&season) {
            let multiplier = self.rules.out_of_season_multiplier;
            probability *= multiplier;
            breakdown.push(BreakdownStep::Multiplier {
                label: SEASON_LABEL.to_owned(),
                sub_label: Some(season.as_str().to_owned()),
                value: multiplier,
            });
        }

        let time = time_multiplier(
            &monster.active_time,
            calendar.minute_of_day(),
            &self.periods,
            self.rules.inactive_time_penalty,
        );
        if (time - 1.0).abs() > f64::EPSILON {
            probability *= time;
            breakdown.push(BreakdownStep::Multiplier {
                label: TIME_OF_DAY_LABEL.to_owned(),
                sub_label: Some(calendar.period().to_owned()),
                value: time,
            });
        }

        for &key in &monster.bonuses {
            let bonus = self.registry.evaluate(key, calendar, &monster.overrides);
            if bonus.active {
                probability += bonus.magnitude;
                breakdown.push(BreakdownStep::Bonus {
                    label: bonus.label.to_owned(),
                    value: bonus.magnitude,
                });
            }
        }

        for &key in &monster.penalties {
            let penalty = self.registry.evaluate(key, calendar, &monster.overrides);
            if penalty.active {
                probability *= penalty.magnitude;
                breakdown.push(BreakdownStep::Penalty {
                    label: penalty.label.to_owned(),
                    value: penalty.magnitude,
                });
            }
        }

        probability
    }
}

/// Names of every restriction `calendar` fails, in a fixed order.
fn unmet_restrictions(restrictions: Restrictions, calendar: &CalendarState) -> Vec<&'static str> {
    let mut unmet = Vec::new();
    if restrictions.requires_full_moon && !calendar.is_full_moon() {
        unmet.push("Requires Full Moon");
    }
    if restrictions.requires_dark && !calendar.is_dark() {
        unmet.push("Requires Darkness");
    }
    if restrictions.requires_night && !calendar.is_night() {
        unmet.push("Requires Night");
    }
    unmet
}

/// Clamp into `[0, 1]`; NaN becomes 0.
fn clamp_probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
