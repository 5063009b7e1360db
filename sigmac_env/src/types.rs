//! Common types for the Σc environment layer.

use crate::arena::ParticleArena;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Identity of a collision event. Only used to tag output rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

/// Globally unique track identity (the track's global index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub u64);

/// Globally unique identity of a three-prong candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub u64);

/// Index of a simulated particle inside its event's [`ParticleArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleId(pub usize);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ev{}", self.0)
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "trk{}", self.0)
    }
}

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cand{}", self.0)
    }
}

impl std::fmt::Display for ParticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mc{}", self.0)
    }
}

fn transverse(p: &Vector3<f64>) -> f64 {
    p.x.hypot(p.y)
}

fn pseudorapidity(p: &Vector3<f64>) -> f64 {
    let norm = p.norm();
    if norm == 0.0 {
        return 0.0;
    }
    0.5 * ((norm + p.z) / (norm - p.z)).ln()
}

// ============================================================================
// TRACK (Input)
// ============================================================================

/// A reconstructed charged-particle track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Global track index
    pub id: TrackId,

    /// Momentum [px, py, pz] in GeV/c
    pub momentum: Vector3<f64>,

    /// Charge sign (+1 or -1)
    pub sign: i8,

    /// Transverse impact parameter to the primary vertex (cm)
    pub dca_xy: f32,

    /// Longitudinal impact parameter to the primary vertex (cm)
    pub dca_z: f32,

    /// ITS cluster map: bit i set when layer i has a hit
    pub its_cluster_map: u8,

    /// Whether the ITS refit succeeded
    pub its_refit: bool,

    /// Simulated particle this track was produced by (MC only)
    pub mc_label: Option<ParticleId>,
}

impl Track {
    /// Transverse momentum in GeV/c.
    #[inline]
    pub fn pt(&self) -> f64 {
        transverse(&self.momentum)
    }

    /// Pseudorapidity computed from the momentum direction.
    #[inline]
    pub fn eta(&self) -> f64 {
        pseudorapidity(&self.momentum)
    }

    /// True when the ITS layer `layer` (0..6) has a hit.
    #[inline]
    pub fn has_its_hit(&self, layer: u8) -> bool {
        layer < 8 && self.its_cluster_map & (1 << layer) != 0
    }
}

// ============================================================================
// THREE-PRONG CANDIDATE (Input)
// ============================================================================

/// A Λc-like three-prong candidate as delivered by the upstream selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeBodyCandidate {
    /// Global candidate index
    pub id: CandidateId,

    /// Collision this candidate was built in
    pub event_id: EventId,

    /// Total momentum in GeV/c
    pub momentum: Vector3<f64>,

    /// Track identities of prong 0, 1, 2
    pub prong_ids: [TrackId; 3],

    /// Momenta of prong 0, 1, 2 (GeV/c)
    pub prong_momenta: [Vector3<f64>; 3],

    /// Decay-hypothesis bitmask set by the vertexer
    pub hf_flag: u8,

    /// Selector status for the p K π hypothesis
    pub is_sel_pkpi: i32,

    /// Selector status for the π K p hypothesis
    pub is_sel_pikp: i32,

    /// Reconstruction-level MC match flag of this candidate (0 = unmatched)
    pub mc_flag_rec: i8,
}

impl ThreeBodyCandidate {
    /// Upstream pre-filter: at least one mass hypothesis passed the selector.
    pub fn passes_selection(&self, selection_flag: i32) -> bool {
        self.is_sel_pkpi >= selection_flag || self.is_sel_pikp >= selection_flag
    }

    /// Rapidity of the candidate under the given mass hypothesis.
    pub fn rapidity(&self, mass: f64) -> f64 {
        let energy = (self.momentum.norm_squared() + mass * mass).sqrt();
        0.5 * ((energy + self.momentum.z) / (energy - self.momentum.z)).ln()
    }

    /// Transverse momentum in GeV/c.
    pub fn pt(&self) -> f64 {
        transverse(&self.momentum)
    }

    /// True when `track` is one of the three prongs.
    pub fn has_prong(&self, track: TrackId) -> bool {
        self.prong_ids.contains(&track)
    }
}

// ============================================================================
// COMPOSITE CANDIDATE (Output)
// ============================================================================

/// A Σc-like candidate: one three-prong candidate plus one soft track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeCandidate {
    pub event_id: EventId,

    /// Momentum of the three-prong constituent
    pub lc_momentum: Vector3<f64>,

    /// Momentum of the soft track
    pub soft_momentum: Vector3<f64>,

    pub lc_id: CandidateId,
    pub soft_track_id: TrackId,

    /// Decay-hypothesis bitmask inherited from the three-prong candidate
    pub hf_flag: u8,

    /// Net charge: 0 or ±2
    pub charge: i8,

    /// 1 when the p K π mass window was satisfied
    pub status_pkpi: u8,

    /// 1 when the π K p mass window was satisfied
    pub status_pikp: u8,
}

impl CompositeCandidate {
    /// Total momentum of the pair.
    #[inline]
    pub fn momentum(&self) -> Vector3<f64> {
        self.lc_momentum + self.soft_momentum
    }

    #[inline]
    pub fn pt(&self) -> f64 {
        transverse(&self.momentum())
    }

    #[inline]
    pub fn eta(&self) -> f64 {
        pseudorapidity(&self.momentum())
    }
}

// ============================================================================
// MATCH RESULT (Output)
// ============================================================================

/// Production origin of a matched charm hadron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i8)]
pub enum Origin {
    #[default]
    None = 0,
    Prompt = 1,
    NonPrompt = 2,
}

impl Origin {
    /// Integer code as written to the output table.
    pub fn code(self) -> i8 {
        self as i8
    }
}

/// Truth-matching outcome for one candidate or one generated particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchResult {
    /// ±(1 << decay type), or 0 when not matched
    pub flag: i8,

    pub origin: Origin,
}

impl MatchResult {
    /// The explicit no-match row.
    pub const NONE: MatchResult = MatchResult {
        flag: 0,
        origin: Origin::None,
    };

    pub fn new(flag: i8, origin: Origin) -> Self {
        Self { flag, origin }
    }

    #[inline]
    pub fn is_matched(&self) -> bool {
        self.flag != 0
    }

    /// +1 for particle, -1 for antiparticle, 0 when unmatched.
    #[inline]
    pub fn sign(&self) -> i8 {
        self.flag.signum()
    }
}

// ============================================================================
// EVENT
// ============================================================================

/// All per-collision inputs, owned together and read-only while processed.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: EventId,
    pub tracks: Vec<Track>,
    pub candidates: Vec<ThreeBodyCandidate>,

    /// Generator record; `None` for real data
    pub particles: Option<ParticleArena>,
}

impl Event {
    /// Creates an event without simulated truth.
    pub fn new(id: EventId, tracks: Vec<Track>, candidates: Vec<ThreeBodyCandidate>) -> Self {
        Self {
            id,
            tracks,
            candidates,
            particles: None,
        }
    }

    /// Attaches the generator record.
    pub fn with_particles(mut self, particles: ParticleArena) -> Self {
        self.particles = Some(particles);
        self
    }

    /// Three-prong candidates surviving the upstream selection-flag filter.
    pub fn selected_candidates(&self, selection_flag: i32) -> Vec<ThreeBodyCandidate> {
        self.candidates
            .iter()
            .filter(|c| c.passes_selection(selection_flag))
            .cloned()
            .collect()
    }
}
