//! Simulation engine for the creature sightings engine.
//!
//! Turns rules-engine probabilities into a reproducible set of sightings for
//! one calendar day. All randomness comes from an injectable
//! [`StreamFactory`], keyed per monster by the date seed plus the monster id.
//!
//! # Modules
//!
//! - [`recompute`] -- Full pass over the enabled monsters producing a
//!   [`SightingReport`].
//! - [`simulate`] -- Fixed-trial sighting count, likelihood band, and
//!   placement for one monster.
//! - [`stream`] -- [`StreamFactory`] trait, `ChaCha8` production streams,
//!   and scripted streams for tests.
//!
//! [`SightingReport`]: recompute::SightingReport
//! [`StreamFactory`]: stream::StreamFactory

pub mod recompute;
pub mod simulate;
pub mod stream;

// Re-export primary types at crate root.
pub use recompute::{SightingReport, recompute};
pub use simulate::{SimulationInputs, simulate};
pub use stream::{ChaChaStreams, RandomStream, ScriptedStreams, StreamFactory};
