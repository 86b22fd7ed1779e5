//! Replayable explanation of how a spotting probability was derived.
//!
//! A [`Breakdown`] is an append-only list of typed [`BreakdownStep`]s. It
//! carries every number the rules engine used so a reader can reconstruct
//! the audit trail without re-running the calculation.
//!
//! Two shapes are valid:
//!
//! - a single [`BreakdownStep::Impossible`] (probability is exactly 0), or
//! - a [`BreakdownStep::Final`] first, followed by the pipeline steps in the
//!   order they were applied.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::EventTag;

/// One step of a probability calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BreakdownStep {
    /// The clamped final probability.
    Final {
        /// Probability in `[0, 1]`.
        value: f64,
    },
    /// The monster's base probability.
    Base {
        /// Probability in `[0, 1]`.
        value: f64,
    },
    /// A multiplicative adjustment (season, time of day, event, debug).
    Multiplier {
        /// What kind of multiplier this is.
        label: String,
        /// Which season, period, or event triggered it.
        sub_label: Option<String>,
        /// The factor applied to the running probability.
        value: f64,
    },
    /// An additive bonus from the modifier registry.
    Bonus {
        /// Human-readable modifier name.
        label: String,
        /// Amount added to the running probability.
        value: f64,
    },
    /// A multiplicative penalty from the modifier registry.
    Penalty {
        /// Human-readable modifier name.
        label: String,
        /// The factor applied to the running probability.
        value: f64,
    },
    /// A hard restriction was not met.
    Impossible {
        /// Comma-joined list of the unmet restrictions.
        reason: String,
    },
}

impl BreakdownStep {
    /// Render the step as a single audit line.
    pub fn describe(&self) -> String {
        match self {
            Self::Final { value } => format!("= Final: {value:.4}"),
            Self::Base { value } => format!("Base: {value:.4}"),
            Self::Multiplier {
                label,
                sub_label: Some(sub),
                value,
            } => format!("\u{d7} {label} ({sub}): \u{d7}{value:.2}"),
            Self::Multiplier {
                label,
                sub_label: None,
                value,
            } => format!("\u{d7} {label}: \u{d7}{value:.2}"),
            Self::Bonus { label, value } => format!("+ {label}: +{value:.2}"),
            Self::Penalty { label, value } => format!("\u{d7} {label}: \u{d7}{value:.2}"),
            Self::Impossible { reason } => format!("Impossible: {reason}"),
        }
    }
}

/// Ordered list of [`BreakdownStep`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Breakdown(Vec<BreakdownStep>);

impl Breakdown {
    /// Create an empty breakdown.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// A breakdown consisting of a single impossible step.
    pub fn impossible(reason: impl Into<String>) -> Self {
        Self(vec![BreakdownStep::Impossible {
            reason: reason.into(),
        }])
    }

    /// Append a step.
    pub fn push(&mut self, step: BreakdownStep) {
        self.0.push(step);
    }

    /// Insert the final step at the front. Called once, after the pipeline
    /// has run.
    pub fn prepend_final(&mut self, value: f64) {
        self.0.insert(0, BreakdownStep::Final { value });
    }

    /// Whether this breakdown records a restriction short-circuit.
    pub fn is_impossible(&self) -> bool {
        self.0
            .iter()
            .any(|step| matches!(step, BreakdownStep::Impossible { .. }))
    }

    /// All steps, in order.
    pub fn steps(&self) -> &[BreakdownStep] {
        &self.0
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no steps have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render every step, one audit line each.
    pub fn describe(&self) -> Vec<String> {
        self.0.iter().map(BreakdownStep::describe).collect()
    }
}

/// Output of the rules engine for one monster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpottingData {
    /// Final probability, clamped to `[0, 1]`.
    pub probability: f64,
    /// Global event that drove the result, if any.
    pub event: Option<EventTag>,
    /// How the probability was derived.
    pub breakdown: Breakdown,
}
