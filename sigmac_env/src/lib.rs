//! Σc Environment Abstraction Layer
//!
//! This crate holds everything the candidate builder and the decay-tree
//! matcher consume from, or hand back to, the surrounding framework:
//! - Per-event data (tracks, three-prong candidates, simulated particles)
//! - Output records (composite candidates, match results)
//! - The sink seam through which records leave the core
//!
//! # Ownership
//!
//! All collections are owned by an [`Event`] and are read-only once built.
//! Simulated particles live in a per-event [`ParticleArena`] and refer to
//! each other by [`ParticleId`], so decay trees are walked by index and never
//! through back-pointers.
//!
//! # Example
//!
//! ```ignore
//! use sigmac_env::{Event, RecordSink, TableSink};
//!
//! fn drain<S: RecordSink>(event: &Event, sink: &mut S) {
//!     for candidate in build(event) {
//!         sink.write_candidate(&candidate);
//!     }
//! }
//! ```

mod arena;
mod error;
mod sink;
mod types;

pub use arena::{ArenaBuilder, ParticleArena, SimulatedParticle};
pub use error::DataError;
pub use sink::{RecordSink, TableSink};
pub use types::{
    CandidateId, CompositeCandidate, Event, EventId, MatchResult, Origin, ParticleId,
    ThreeBodyCandidate, Track, TrackId,
};
