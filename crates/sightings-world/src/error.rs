//! Error types for the `sightings-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use sightings_types::LocationId;

/// Errors that can occur while building or loading the location pool.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Two pool entries share an identifier.
    #[error("duplicate location id: {0}")]
    DuplicateLocation(LocationId),

    /// A feature class or code cannot form a `CLASS.CODE` pair.
    #[error("location {location} has malformed feature code {code:?}")]
    MalformedFeatureCode {
        /// The offending location.
        location: LocationId,
        /// The code as written.
        code: String,
    },

    /// The pool file could not be read.
    #[error("failed to read location pool: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The pool file is not a JSON array of entries.
    #[error("failed to parse location pool: {source}")]
    Json {
        /// Underlying parse error.
        #[from]
        source: serde_json::Error,
    },
}
