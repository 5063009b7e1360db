//! Sigma_c Core - Σc0,++ → Λc+(→ pK-π+) π candidate building and truth matching
//!
//! This library handles two per-event jobs of a charm-baryon analysis:
//! 1. **Combinatorics**: pair pre-selected Λc candidates with soft-pion tracks
//!    into Σc0 / Σc++ candidates, enforcing identity and charge invariants
//! 2. **Truth matching**: classify reconstructed candidates and generated
//!    particles against the simulated decay tree, with prompt / non-prompt origin
//!
//! Everything is single-threaded and stateless across events; configuration is
//! an immutable value handed to the components that need it.

pub mod candidate_builder;
pub mod config;
pub mod decay_tree;
pub mod kinematics;
pub mod mc_matcher;
pub mod origin;
pub mod pdg;
pub mod track_filter;
pub mod validation;

// Re-export key types for convenience
pub use candidate_builder::{BuildOutput, BuildStats, CandidateBuilder, MassWindowStatus};
pub use config::{ConfigError, SigmacConfig, SoftPionConfig};
pub use mc_matcher::DecayTreeMatcher;
pub use origin::{CharmHadronOrigin, OriginClassifier};
pub use pdg::{SigmacDecay, ThreeProngDecay};
pub use track_filter::TrackFilter;
pub use validation::{ValidationReport, ValidationSession};
