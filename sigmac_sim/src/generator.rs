//! Seeded event generator.
//!
//! The generator owns the truth record of every event and derives the
//! detector-level view from it:
//! - Σc0 / Σc++ (and antiparticles) → Λc+ π, optionally from a beauty hadron
//! - Λc+ → p K- π+ directly or through K*0, Δ++ or Λ(1520)
//! - Underlying-event pions
//! - Three-prong candidates from the Λc prongs and from random triplets
//!
//! All randomness comes from one `ChaCha8Rng`, so a seed fixes the event
//! sequence bit for bit.

use crate::error::SimError;
use nalgebra::{Unit, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Exp1, StandardNormal};
use serde::{Deserialize, Serialize};
use sigmac_core::kinematics::{two_body_decay, LorentzVector};
use sigmac_core::mc_matcher::lc_reco_flag;
use sigmac_core::pdg::{self, code, SigmacDecay, ThreeProngDecay};
use sigmac_env::{
    ArenaBuilder, CandidateId, Event, EventId, ParticleArena, ParticleId, ThreeBodyCandidate,
    Track, TrackId,
};
use std::f64::consts::TAU;
use tracing::debug;

/// How the Λc+ reaches p K- π+.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LcDecayMode {
    Direct,
    /// Λc+ → p K*0, K*0 → K- π+
    KStar,
    /// Λc+ → Δ++ K-, Δ++ → p π+
    Delta,
    /// Λc+ → Λ(1520) π+, Λ(1520) → p K-
    Lambda1520,
}

const RESONANT_MODES: [LcDecayMode; 3] =
    [LcDecayMode::KStar, LcDecayMode::Delta, LcDecayMode::Lambda1520];

const BEAUTY_PARENTS: [i32; 3] = [code::LAMBDA_B_0, code::B_ZERO, code::B_PLUS];

/// Event composition and detector response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Σc decays per event (default: 2)
    pub signal_per_event: usize,

    /// Fraction of Σc++ among the signal, the rest is Σc0 (default: 0.5)
    pub sc_plus_plus_fraction: f64,

    /// Fraction of antiparticles (default: 0.5)
    pub antiparticle_fraction: f64,

    /// Fraction of Σc produced in beauty-hadron decays (default: 0.0)
    pub feed_down_fraction: f64,

    /// Fraction of Λc decaying through a resonance (default: 0.3)
    pub resonant_fraction: f64,

    /// Mean Σc transverse momentum in GeV/c (default: 3.0)
    pub mean_pt: f64,

    /// Σc pseudorapidity range (default: 0.8)
    pub eta_max: f64,

    /// Underlying-event pions per event (default: 20)
    pub background_pions: usize,

    /// Random (+,-,+) / (-,+,-) triplets per event (default: 5)
    pub background_triplets: usize,

    /// Λc candidates with all prongs of the same sign, per event (default: 0)
    pub corrupted_candidates: usize,

    /// Relative momentum resolution (default: 0.002)
    pub momentum_resolution: f64,

    /// Impact-parameter resolution in cm (default: 0.01)
    pub dca_resolution: f64,

    /// Hit probability per ITS layer (default: 0.9)
    pub its_layer_efficiency: f64,

    /// ITS refit probability (default: 0.98)
    pub its_refit_efficiency: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            signal_per_event: 2,
            sc_plus_plus_fraction: 0.5,
            antiparticle_fraction: 0.5,
            feed_down_fraction: 0.0,
            resonant_fraction: 0.3,
            mean_pt: 3.0,
            eta_max: 0.8,
            background_pions: 20,
            background_triplets: 5,
            corrupted_candidates: 0,
            momentum_resolution: 0.002,
            dca_resolution: 0.01,
            its_layer_efficiency: 0.9,
            its_refit_efficiency: 0.98,
        }
    }
}

/// Lab-frame four-vectors of one Σc decay.
struct SignalKinematics {
    proton: LorentzVector,
    kaon: LorentzVector,
    pion: LorentzVector,
    soft_pion: LorentzVector,
}

/// Track indices of a signal Λc, in prong order.
#[derive(Debug, Clone, Copy)]
struct LcProngs {
    tracks: [usize; 3],

    /// Proton at prong 0 (p K π) rather than prong 2 (π K p)
    proton_first: bool,
}

/// Per-event scratch state.
#[derive(Default)]
struct EventDraft {
    arena: ArenaBuilder,
    tracks: Vec<Track>,
    signal: Vec<LcProngs>,
}

/// Deterministic event source.
pub struct EventGenerator {
    seed: u64,
    rng: ChaCha8Rng,
    config: GeneratorConfig,
    next_event: u64,
    next_track: u64,
    next_candidate: u64,
}

impl EventGenerator {
    pub fn new(seed: u64, config: GeneratorConfig) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
            next_event: 0,
            next_track: 0,
            next_candidate: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates the next event, truth record attached.
    pub fn generate(&mut self) -> Result<Event, SimError> {
        let event_id = EventId(self.next_event);
        self.next_event += 1;

        let mut draft = EventDraft::default();
        for _ in 0..self.config.signal_per_event {
            self.add_signal(&mut draft);
        }
        for _ in 0..self.config.background_pions {
            self.add_background_pion(&mut draft);
        }

        let EventDraft {
            arena,
            mut tracks,
            signal,
        } = draft;
        let arena = arena.finish()?;

        let mut candidates = Vec::new();
        for lc in &signal {
            let (sel_pkpi, sel_pikp) = if lc.proton_first { (1, 0) } else { (0, 1) };
            candidates.push(self.make_candidate(
                event_id,
                &tracks,
                lc.tracks,
                ThreeProngDecay::LcToPKPi.bit(),
                (sel_pkpi, sel_pikp),
                &arena,
            ));
        }

        for _ in 0..self.config.background_triplets {
            let Some(triplet) = self.pick_triplet(&tracks) else {
                break;
            };
            let hf_flag = match self.rng.gen_range(0..3) {
                0 => ThreeProngDecay::LcToPKPi.bit(),
                1 => ThreeProngDecay::LcToPKPi.bit() | ThreeProngDecay::DplusToPiKPi.bit(),
                _ => ThreeProngDecay::DplusToPiKPi.bit(),
            };
            let selection = match self.rng.gen_range(0..3) {
                0 => (1, 0),
                1 => (0, 1),
                _ => (1, 1),
            };
            candidates.push(self.make_candidate(event_id, &tracks, triplet, hf_flag, selection, &arena));
        }

        if !signal.is_empty() {
            for _ in 0..self.config.corrupted_candidates {
                let source = signal[self.rng.gen_range(0..signal.len())];
                let triplet = self.corrupt(&mut tracks, source);
                let selection = if source.proton_first { (1, 0) } else { (0, 1) };
                candidates.push(self.make_candidate(
                    event_id,
                    &tracks,
                    triplet,
                    ThreeProngDecay::LcToPKPi.bit(),
                    selection,
                    &arena,
                ));
            }
        }

        debug!(
            event = %event_id,
            particles = arena.len(),
            tracks = tracks.len(),
            lc_candidates = candidates.len(),
            "Event generated"
        );

        Ok(Event::new(event_id, tracks, candidates).with_particles(arena))
    }

    // =========================================================================
    // TRUTH RECORD
    // =========================================================================

    fn add_signal(&mut self, draft: &mut EventDraft) {
        let channel = if self.chance(self.config.sc_plus_plus_fraction) {
            SigmacDecay::ScPlusPlusToPKPiPi
        } else {
            SigmacDecay::Sc0ToPKPiPi
        };
        let sign: i32 = if self.chance(self.config.antiparticle_fraction) { -1 } else { 1 };
        let mode = if self.chance(self.config.resonant_fraction) {
            RESONANT_MODES[self.rng.gen_range(0..RESONANT_MODES.len())]
        } else {
            LcDecayMode::Direct
        };

        let sigmac_p4 = LorentzVector::from_mass(self.sample_momentum(), mass_of(channel.mother_pdg()));
        let Some(kin) = self.decay_sigmac(&sigmac_p4, mode) else {
            debug!(?mode, "Sc decay kinematically closed, skipped");
            return;
        };

        let arena = &mut draft.arena;
        let sigmac = if self.chance(self.config.feed_down_fraction) {
            let parent = BEAUTY_PARENTS[self.rng.gen_range(0..BEAUTY_PARENTS.len())];
            let beauty = arena.add_primary(sign * parent);
            arena.add_daughter(beauty, sign * channel.mother_pdg())
        } else {
            arena.add_primary(sign * channel.mother_pdg())
        };
        let lc = arena.add_daughter(sigmac, sign * code::LAMBDA_C_PLUS);
        let soft = arena.add_daughter(sigmac, sign * channel.soft_pion_pdg());

        let (proton, kaon, pion) = match mode {
            LcDecayMode::Direct => (
                arena.add_daughter(lc, sign * code::PROTON),
                arena.add_daughter(lc, -sign * code::KAON_PLUS),
                arena.add_daughter(lc, sign * code::PION_PLUS),
            ),
            LcDecayMode::KStar => {
                let proton = arena.add_daughter(lc, sign * code::PROTON);
                let kstar = arena.add_daughter(lc, sign * code::K_STAR_0);
                let kaon = arena.add_daughter(kstar, -sign * code::KAON_PLUS);
                let pion = arena.add_daughter(kstar, sign * code::PION_PLUS);
                (proton, kaon, pion)
            }
            LcDecayMode::Delta => {
                let delta = arena.add_daughter(lc, sign * code::DELTA_PLUS_PLUS);
                let kaon = arena.add_daughter(lc, -sign * code::KAON_PLUS);
                let proton = arena.add_daughter(delta, sign * code::PROTON);
                let pion = arena.add_daughter(delta, sign * code::PION_PLUS);
                (proton, kaon, pion)
            }
            LcDecayMode::Lambda1520 => {
                let lambda = arena.add_daughter(lc, sign * code::LAMBDA_1520);
                let pion = arena.add_daughter(lc, sign * code::PION_PLUS);
                let proton = arena.add_daughter(lambda, sign * code::PROTON);
                let kaon = arena.add_daughter(lambda, -sign * code::KAON_PLUS);
                (proton, kaon, pion)
            }
        };

        let p = self.push_track(draft, kin.proton.momentum, sign * code::PROTON, Some(proton));
        let k = self.push_track(draft, kin.kaon.momentum, -sign * code::KAON_PLUS, Some(kaon));
        let pi = self.push_track(draft, kin.pion.momentum, sign * code::PION_PLUS, Some(pion));
        self.push_track(
            draft,
            kin.soft_pion.momentum,
            sign * channel.soft_pion_pdg(),
            Some(soft),
        );

        let proton_first = self.rng.gen_bool(0.5);
        let tracks = if proton_first { [p, k, pi] } else { [pi, k, p] };
        draft.signal.push(LcProngs {
            tracks,
            proton_first,
        });
    }

    fn add_background_pion(&mut self, draft: &mut EventDraft) {
        let pdg = if self.rng.gen_bool(0.5) {
            code::PION_PLUS
        } else {
            code::PION_MINUS
        };
        let particle = draft.arena.add_primary(pdg);
        let momentum = self.sample_momentum() * 0.3;
        self.push_track(draft, momentum, pdg, Some(particle));
    }

    /// Σc → Λc π, then Λc → p K π through the given mode.
    fn decay_sigmac(&mut self, sigmac: &LorentzVector, mode: LcDecayMode) -> Option<SignalKinematics> {
        let (lc, soft_pion) = two_body_decay(
            sigmac,
            pdg::MASS_LAMBDA_C,
            pdg::MASS_PION,
            &self.isotropic(),
        )?;

        let (proton, kaon, pion) = match mode {
            LcDecayMode::Direct => {
                let lo = pdg::MASS_KAON + pdg::MASS_PION;
                let hi = pdg::MASS_LAMBDA_C - pdg::MASS_PROTON;
                let m_kpi = lo + (hi - lo) * self.rng.gen::<f64>();
                let (proton, kpi) = two_body_decay(&lc, pdg::MASS_PROTON, m_kpi, &self.isotropic())?;
                let (kaon, pion) = two_body_decay(&kpi, pdg::MASS_KAON, pdg::MASS_PION, &self.isotropic())?;
                (proton, kaon, pion)
            }
            LcDecayMode::KStar => {
                let (proton, kstar) =
                    two_body_decay(&lc, pdg::MASS_PROTON, mass_of(code::K_STAR_0), &self.isotropic())?;
                let (kaon, pion) = two_body_decay(&kstar, pdg::MASS_KAON, pdg::MASS_PION, &self.isotropic())?;
                (proton, kaon, pion)
            }
            LcDecayMode::Delta => {
                let (delta, kaon) =
                    two_body_decay(&lc, mass_of(code::DELTA_PLUS_PLUS), pdg::MASS_KAON, &self.isotropic())?;
                let (proton, pion) = two_body_decay(&delta, pdg::MASS_PROTON, pdg::MASS_PION, &self.isotropic())?;
                (proton, kaon, pion)
            }
            LcDecayMode::Lambda1520 => {
                let (lambda, pion) =
                    two_body_decay(&lc, mass_of(code::LAMBDA_1520), pdg::MASS_PION, &self.isotropic())?;
                let (proton, kaon) = two_body_decay(&lambda, pdg::MASS_PROTON, pdg::MASS_KAON, &self.isotropic())?;
                (proton, kaon, pion)
            }
        };

        Some(SignalKinematics {
            proton,
            kaon,
            pion,
            soft_pion,
        })
    }

    // =========================================================================
    // DETECTOR VIEW
    // =========================================================================

    /// Smears a true particle into a track and returns its index.
    fn push_track(
        &mut self,
        draft: &mut EventDraft,
        momentum: Vector3<f64>,
        pdg: i32,
        label: Option<ParticleId>,
    ) -> usize {
        let track = self.make_track(momentum, pdg::charge(pdg).unwrap_or(0), label);
        draft.tracks.push(track);
        draft.tracks.len() - 1
    }

    fn make_track(&mut self, momentum: Vector3<f64>, sign: i8, label: Option<ParticleId>) -> Track {
        let id = TrackId(self.next_track);
        self.next_track += 1;

        let scale = 1.0 + self.config.momentum_resolution * self.gauss();
        let dca_xy = (self.config.dca_resolution * self.gauss()) as f32;
        let dca_z = (self.config.dca_resolution * self.gauss()) as f32;

        let mut its_cluster_map = 0u8;
        for layer in 0..7 {
            if self.chance(self.config.its_layer_efficiency) {
                its_cluster_map |= 1 << layer;
            }
        }

        Track {
            id,
            momentum: momentum * scale,
            sign,
            dca_xy,
            dca_z,
            its_cluster_map,
            its_refit: self.chance(self.config.its_refit_efficiency),
            mc_label: label,
        }
    }

    fn make_candidate(
        &mut self,
        event_id: EventId,
        tracks: &[Track],
        prongs: [usize; 3],
        hf_flag: u8,
        (is_sel_pkpi, is_sel_pikp): (i32, i32),
        arena: &ParticleArena,
    ) -> ThreeBodyCandidate {
        let id = CandidateId(self.next_candidate);
        self.next_candidate += 1;

        let prong_momenta = prongs.map(|i| tracks[i].momentum);
        let labels = prongs.map(|i| tracks[i].mc_label);

        ThreeBodyCandidate {
            id,
            event_id,
            momentum: prong_momenta.iter().sum(),
            prong_ids: prongs.map(|i| tracks[i].id),
            prong_momenta,
            hf_flag,
            is_sel_pkpi,
            is_sel_pikp,
            mc_flag_rec: lc_reco_flag(arena, labels),
        }
    }

    /// Three distinct tracks with charges (+,-,+) or (-,+,-).
    fn pick_triplet(&mut self, tracks: &[Track]) -> Option<[usize; 3]> {
        let (positive, negative): (Vec<usize>, Vec<usize>) =
            (0..tracks.len()).partition(|&i| tracks[i].sign > 0);
        let (outer, middle) = if self.rng.gen_bool(0.5) {
            (positive, negative)
        } else {
            (negative, positive)
        };
        if outer.len() < 2 || middle.is_empty() {
            return None;
        }

        let first = self.rng.gen_range(0..outer.len());
        let mut last = self.rng.gen_range(0..outer.len() - 1);
        if last >= first {
            last += 1;
        }
        let mid = self.rng.gen_range(0..middle.len());
        Some([outer[first], middle[mid], outer[last]])
    }

    /// Adds an unlabelled copy of the middle prong with flipped charge and
    /// returns the same-sign triplet using it.
    fn corrupt(&mut self, tracks: &mut Vec<Track>, source: LcProngs) -> [usize; 3] {
        let [first, middle, last] = source.tracks;
        let mut ghost = tracks[middle].clone();
        ghost.id = TrackId(self.next_track);
        self.next_track += 1;
        ghost.sign = -ghost.sign;
        ghost.mc_label = None;
        tracks.push(ghost);
        [first, tracks.len() - 1, last]
    }

    // =========================================================================
    // SAMPLING
    // =========================================================================

    fn sample_momentum(&mut self) -> Vector3<f64> {
        let exp: f64 = self.rng.sample(Exp1);
        let pt = (self.config.mean_pt * exp).max(0.2);
        let eta = (2.0 * self.rng.gen::<f64>() - 1.0) * self.config.eta_max;
        let phi = TAU * self.rng.gen::<f64>();
        Vector3::new(pt * phi.cos(), pt * phi.sin(), pt * eta.sinh())
    }

    fn isotropic(&mut self) -> Unit<Vector3<f64>> {
        let cos_theta = 2.0 * self.rng.gen::<f64>() - 1.0;
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = TAU * self.rng.gen::<f64>();
        Unit::new_normalize(Vector3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta))
    }

    fn gauss(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    /// Bernoulli draw that tolerates probabilities outside [0, 1].
    fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen::<f64>() < probability
    }
}

fn mass_of(pdg: i32) -> f64 {
    pdg::mass(pdg).unwrap_or(0.0)
}
