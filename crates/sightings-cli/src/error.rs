//! Error types for the sightings command-line tool.
//!
//! [`CliError`] covers argument values that parse as strings but are not
//! valid overrides. They are rejected before any engine state is built.

use sightings_core::calendar::CalendarError;

/// An invalid command-line override.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A time, season, or holiday override failed to parse.
    #[error("invalid override: {source}")]
    Calendar {
        /// The underlying calendar error.
        #[from]
        source: CalendarError,
    },

    /// The probability multiplier is negative or not finite.
    #[error("probability multiplier must be a finite non-negative number, got {value}")]
    InvalidMultiplier {
        /// The rejected value.
        value: f64,
    },
}
