//! Sigma_c Simulation Harness
//!
//! A seeded stand-in for the collision-processing framework: it generates
//! events with a known truth record, pushes them through the candidate
//! builder and the truth matcher, and checks the outcome per scenario.
//!
//! # Core Principle: One Seed
//!
//! Every random draw comes from a single `ChaCha8Rng`, so a failing
//! `(scenario, seed)` pair replays exactly.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────────┐   Event    ┌──────────────────┐  CompositeCandidate
//! │  EventGenerator  │──────────► │ CandidateBuilder │──────────┬──────────►  TableSink
//! │ (truth + tracks) │            └──────────────────┘          │
//! └──────────────────┘                                          ▼
//!          │ ParticleArena                             ┌──────────────────┐  MatchResult
//!          └─────────────────────────────────────────► │ DecayTreeMatcher │────────────►  TableSink
//!                                                      └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use sigmac_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42, 100).run(ScenarioId::FeedDown)?;
//! result.report.print();
//! ```

mod error;
mod exporter;
mod generator;
mod runner;
pub mod scenarios;

pub use error::SimError;
pub use exporter::SimExport;
pub use generator::{EventGenerator, GeneratorConfig, LcDecayMode};
pub use runner::{process_event, ScenarioResult, ScenarioRunner};
