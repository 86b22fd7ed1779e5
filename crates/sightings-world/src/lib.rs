//! Location pool and habitat resolution for the creature sightings engine.
//!
//! The pool is loaded once from a gazetteer file and indexed by full feature
//! code and by feature class. Habitat resolution turns a monster's habitat
//! list into the candidate locations the simulation draws from.
//!
//! # Modules
//!
//! - [`error`] -- Error types for loading and indexing the pool.
//! - [`habitat`] -- Group expansion, deduplication, and candidate lookup.
//! - [`pool`] -- [`LocationPool`] with its code and class indexes.
//!
//! [`LocationPool`]: pool::LocationPool

pub mod error;
pub mod habitat;
pub mod pool;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use habitat::{HabitatGroups, HabitatResolution};
pub use pool::LocationPool;
