//! The "TRUTH" Engine - MC matching of Σc0,++ candidates
//!
//! Two independent passes over one event:
//! - **Reconstruction level**: each Σc candidate is matched to a generated
//!   Σc0 → Λc+ π- or Σc++ → Λc+ π+ decay, with Λc+ → pK-π+ direct or through
//!   K*0, Δ++ or Λ(1520) (three decay levels).
//! - **Generation level**: each generated particle is tested for being such a
//!   Σc whose Λc daughter decays to pK-π+.
//!
//! Both passes emit exactly one [`MatchResult`] per input, in input order.

use crate::decay_tree::{match_generated, match_reconstructed};
use crate::origin::{CharmHadronOrigin, OriginClassifier};
use crate::pdg::{code, SigmacDecay, ThreeProngDecay};
use sigmac_env::{
    CandidateId, CompositeCandidate, MatchResult, ParticleArena, ParticleId,
    ThreeBodyCandidate, Track, TrackId,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Σc → Λc (→ resonance →) p K π
pub const RECO_MAX_DEPTH: u32 = 3;

/// Σc → Λc π, immediate daughters only
pub const GEN_SIGMAC_MAX_DEPTH: u32 = 1;

/// Λc → (resonance →) p K π
pub const GEN_LC_MAX_DEPTH: u32 = 2;

const LC_FINAL_STATE: [i32; 3] = [code::PROTON, -code::KAON_PLUS, code::PION_PLUS];

/// Reconstruction-level flag of a Λc → pKπ candidate from its prong labels.
///
/// Returns ±(1 << LcToPKPi) or 0. Used where the upstream three-prong
/// matcher has to be emulated.
pub fn lc_reco_flag(arena: &ParticleArena, prong_labels: [Option<ParticleId>; 3]) -> i8 {
    match_reconstructed(
        arena,
        &prong_labels,
        code::LAMBDA_C_PLUS,
        &LC_FINAL_STATE,
        true,
        Some(GEN_LC_MAX_DEPTH),
    )
    .map_or(0, |found| found.sign * ThreeProngDecay::LcToPKPi.bit() as i8)
}

/// Truth matcher, generic over the origin classifier.
#[derive(Debug, Clone, Default)]
pub struct DecayTreeMatcher<O = CharmHadronOrigin> {
    origin: O,
}

impl DecayTreeMatcher<CharmHadronOrigin> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<O: OriginClassifier> DecayTreeMatcher<O> {
    /// Uses a custom origin classifier.
    pub fn with_classifier(origin: O) -> Self {
        Self { origin }
    }

    /// Reconstruction-level pass over all Σc candidates of an event.
    ///
    /// `lc_candidates` and `tracks` resolve the constituents; a constituent
    /// that cannot be resolved yields a no-match row.
    pub fn match_reconstructed(
        &self,
        candidates: &[CompositeCandidate],
        lc_candidates: &[ThreeBodyCandidate],
        tracks: &[Track],
        arena: &ParticleArena,
    ) -> Vec<MatchResult> {
        let lc_by_id: HashMap<CandidateId, &ThreeBodyCandidate> =
            lc_candidates.iter().map(|c| (c.id, c)).collect();
        let labels: HashMap<TrackId, Option<ParticleId>> =
            tracks.iter().map(|t| (t.id, t.mc_label)).collect();

        let results: Vec<MatchResult> = candidates
            .iter()
            .map(|sc| self.match_candidate(sc, &lc_by_id, &labels, arena))
            .collect();

        debug!(
            candidates = candidates.len(),
            matched = results.iter().filter(|r| r.is_matched()).count(),
            "Reconstruction-level matching done"
        );
        results
    }

    fn match_candidate(
        &self,
        sc: &CompositeCandidate,
        lc_by_id: &HashMap<CandidateId, &ThreeBodyCandidate>,
        labels: &HashMap<TrackId, Option<ParticleId>>,
        arena: &ParticleArena,
    ) -> MatchResult {
        let Some(cand_lc) = lc_by_id.get(&sc.lc_id) else {
            warn!(lc = %sc.lc_id, "Lc candidate of Sc candidate not found");
            return MatchResult::NONE;
        };

        // Σc candidates without an MC-matched Λc+ → pK-π+ are skipped immediately
        if i16::from(cand_lc.mc_flag_rec).abs() != i16::from(ThreeProngDecay::LcToPKPi.bit()) {
            return MatchResult::NONE;
        }

        let mut daughters = [None; 4];
        for (slot, track_id) in daughters
            .iter_mut()
            .zip(cand_lc.prong_ids.iter().chain(std::iter::once(&sc.soft_track_id)))
        {
            match labels.get(track_id) {
                Some(label) => *slot = *label,
                None => {
                    warn!(track = %track_id, "Track of Sc candidate not found");
                    return MatchResult::NONE;
                }
            }
        }

        let Some(channel) = SigmacDecay::for_charge(sc.charge) else {
            return MatchResult::NONE;
        };

        match match_reconstructed(
            arena,
            &daughters,
            channel.mother_pdg(),
            &channel.final_state(),
            true,
            Some(RECO_MAX_DEPTH),
        ) {
            Some(found) => MatchResult::new(
                found.sign * channel.bit(),
                self.origin.classify(arena, found.mother),
            ),
            None => MatchResult::NONE,
        }
    }

    /// Generation-level pass: one row per particle, arena order.
    pub fn match_generated(&self, arena: &ParticleArena) -> Vec<MatchResult> {
        let results: Vec<MatchResult> = arena
            .iter()
            .map(|(id, _)| self.match_particle(arena, id))
            .collect();

        debug!(
            particles = arena.len(),
            matched = results.iter().filter(|r| r.is_matched()).count(),
            "Generation-level matching done"
        );
        results
    }

    /// Generation-level result for a single particle.
    ///
    /// The origin is taken from `particle` itself, never from an earlier match.
    pub fn match_particle(&self, arena: &ParticleArena, particle: ParticleId) -> MatchResult {
        for channel in [SigmacDecay::Sc0ToPKPiPi, SigmacDecay::ScPlusPlusToPKPiPi] {
            let Some(sign) = match_generated(
                arena,
                particle,
                channel.mother_pdg(),
                &[code::LAMBDA_C_PLUS, channel.soft_pion_pdg()],
                true,
                Some(GEN_SIGMAC_MAX_DEPTH),
            ) else {
                continue;
            };

            if self.has_lc_to_pkpi_daughter(arena, particle) {
                return MatchResult::new(sign * channel.bit(), self.origin.classify(arena, particle));
            }
            return MatchResult::NONE;
        }
        MatchResult::NONE
    }

    fn has_lc_to_pkpi_daughter(&self, arena: &ParticleArena, particle: ParticleId) -> bool {
        let Some(sigmac) = arena.get(particle) else {
            return false;
        };
        sigmac
            .daughters
            .iter()
            .filter(|&&d| arena.pdg(d).is_some_and(|pdg| pdg.abs() == code::LAMBDA_C_PLUS))
            .any(|&d| {
                match_generated(
                    arena,
                    d,
                    code::LAMBDA_C_PLUS,
                    &LC_FINAL_STATE,
                    true,
                    Some(GEN_LC_MAX_DEPTH),
                )
                .is_some()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use sigmac_env::{ArenaBuilder, EventId, Origin};

    struct Decay {
        arena: ParticleArena,
        sigmac: ParticleId,
        lc: ParticleId,
        soft: ParticleId,
        prongs: [ParticleId; 3],
    }

    /// Σc(charge class) → Λc π, Λc → p K π (direct), optionally from a Λb.
    fn sigmac_decay(channel: SigmacDecay, sign: i32, from_beauty: bool) -> Decay {
        let mut b = ArenaBuilder::new();
        let sigmac = if from_beauty {
            let lb = b.add_primary(sign * code::LAMBDA_B_0);
            b.add_daughter(lb, sign * channel.mother_pdg())
        } else {
            b.add_primary(sign * channel.mother_pdg())
        };
        let lc = b.add_daughter(sigmac, sign * code::LAMBDA_C_PLUS);
        let soft = b.add_daughter(sigmac, sign * channel.soft_pion_pdg());
        let p = b.add_daughter(lc, sign * code::PROTON);
        let k = b.add_daughter(lc, -sign * code::KAON_PLUS);
        let pi = b.add_daughter(lc, sign * code::PION_PLUS);
        Decay {
            arena: b.finish().unwrap(),
            sigmac,
            lc,
            soft,
            prongs: [p, k, pi],
        }
    }

    fn labelled_track(id: u64, sign: i8, label: Option<ParticleId>) -> Track {
        Track {
            id: TrackId(id),
            momentum: Vector3::new(0.5, 0.0, 0.0),
            sign,
            dca_xy: 0.0,
            dca_z: 0.0,
            its_cluster_map: 127,
            its_refit: true,
            mc_label: label,
        }
    }

    /// Tracks 1..=3 are the Λc prongs, track 4 the soft pion.
    fn reco_inputs(
        decay: &Decay,
        charge: i8,
        lc_flag: i8,
    ) -> (Vec<CompositeCandidate>, Vec<ThreeBodyCandidate>, Vec<Track>) {
        let tracks = vec![
            labelled_track(1, 1, Some(decay.prongs[0])),
            labelled_track(2, -1, Some(decay.prongs[1])),
            labelled_track(3, 1, Some(decay.prongs[2])),
            labelled_track(4, -1, Some(decay.soft)),
        ];
        let lc = ThreeBodyCandidate {
            id: CandidateId(7),
            event_id: EventId(0),
            momentum: Vector3::new(1.0, 0.0, 0.0),
            prong_ids: [TrackId(1), TrackId(2), TrackId(3)],
            prong_momenta: [Vector3::zeros(); 3],
            hf_flag: ThreeProngDecay::LcToPKPi.bit(),
            is_sel_pkpi: 1,
            is_sel_pikp: 0,
            mc_flag_rec: lc_flag,
        };
        let sc = CompositeCandidate {
            event_id: EventId(0),
            lc_momentum: lc.momentum,
            soft_momentum: Vector3::new(0.1, 0.0, 0.0),
            lc_id: lc.id,
            soft_track_id: TrackId(4),
            hf_flag: lc.hf_flag,
            charge,
            status_pkpi: 1,
            status_pikp: 0,
        };
        (vec![sc], vec![lc], tracks)
    }

    #[test]
    fn test_lc_reco_flag() {
        let decay = sigmac_decay(SigmacDecay::Sc0ToPKPiPi, -1, false);
        let labels = decay.prongs.map(Some);
        assert_eq!(lc_reco_flag(&decay.arena, labels), -2);
        assert_eq!(lc_reco_flag(&decay.arena, [labels[0], labels[1], None]), 0);
    }

    #[test]
    fn test_reco_sigmac0_prompt() {
        let decay = sigmac_decay(SigmacDecay::Sc0ToPKPiPi, 1, false);
        let (sc, lc, tracks) = reco_inputs(&decay, 0, 2);
        let results = DecayTreeMatcher::new().match_reconstructed(&sc, &lc, &tracks, &decay.arena);
        assert_eq!(results, vec![MatchResult::new(1, Origin::Prompt)]);
    }

    #[test]
    fn test_reco_anti_sigmacpp_nonprompt() {
        let decay = sigmac_decay(SigmacDecay::ScPlusPlusToPKPiPi, -1, true);
        let (sc, lc, tracks) = reco_inputs(&decay, -2, -2);
        let results = DecayTreeMatcher::new().match_reconstructed(&sc, &lc, &tracks, &decay.arena);
        assert_eq!(results, vec![MatchResult::new(-2, Origin::NonPrompt)]);
    }

    #[test]
    fn test_reco_requires_matched_lc() {
        let decay = sigmac_decay(SigmacDecay::Sc0ToPKPiPi, 1, false);
        let (sc, lc, tracks) = reco_inputs(&decay, 0, 0);
        let results = DecayTreeMatcher::new().match_reconstructed(&sc, &lc, &tracks, &decay.arena);
        assert_eq!(results, vec![MatchResult::NONE]);

        // a Λc matched to a different three-prong channel does not count either
        let (sc, lc, tracks) = reco_inputs(&decay, 0, ThreeProngDecay::DsToKKPi.bit() as i8);
        let results = DecayTreeMatcher::new().match_reconstructed(&sc, &lc, &tracks, &decay.arena);
        assert_eq!(results, vec![MatchResult::NONE]);
    }

    #[test]
    fn test_reco_wrong_charge_hypothesis() {
        // Σc0 decay reconstructed with a ++ charge: soft pion species mismatch
        let decay = sigmac_decay(SigmacDecay::Sc0ToPKPiPi, 1, false);
        let (sc, lc, tracks) = reco_inputs(&decay, 2, 2);
        let results = DecayTreeMatcher::new().match_reconstructed(&sc, &lc, &tracks, &decay.arena);
        assert_eq!(results, vec![MatchResult::NONE]);
    }

    #[test]
    fn test_reco_unresolved_constituents_keep_cardinality() {
        let decay = sigmac_decay(SigmacDecay::Sc0ToPKPiPi, 1, false);
        let (mut sc, lc, tracks) = reco_inputs(&decay, 0, 2);
        let mut orphan = sc[0].clone();
        orphan.lc_id = CandidateId(999);
        sc.push(orphan);
        let mut foreign = sc[0].clone();
        foreign.soft_track_id = TrackId(999);
        sc.push(foreign);

        let results = DecayTreeMatcher::new().match_reconstructed(&sc, &lc, &tracks, &decay.arena);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_matched());
        assert_eq!(results[1], MatchResult::NONE);
        assert_eq!(results[2], MatchResult::NONE);
    }

    #[test]
    fn test_generated_rows_and_flags() {
        let decay = sigmac_decay(SigmacDecay::ScPlusPlusToPKPiPi, 1, true);
        let results = DecayTreeMatcher::new().match_generated(&decay.arena);

        assert_eq!(results.len(), decay.arena.len());
        assert_eq!(results[decay.sigmac.0], MatchResult::new(2, Origin::NonPrompt));
        let matched: Vec<_> = results.iter().filter(|r| r.is_matched()).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(results[decay.lc.0], MatchResult::NONE);
    }

    #[test]
    fn test_generated_anti_sigmac0() {
        let decay = sigmac_decay(SigmacDecay::Sc0ToPKPiPi, -1, false);
        let result = DecayTreeMatcher::new().match_particle(&decay.arena, decay.sigmac);
        assert_eq!(result, MatchResult::new(-1, Origin::Prompt));
    }

    #[test]
    fn test_generated_lc_other_decay_not_flagged() {
        // Σc0 → Λc+ π-, Λc+ → p K0s (not pK-π+)
        let mut b = ArenaBuilder::new();
        let sc = b.add_primary(code::SIGMA_C_0);
        let lc = b.add_daughter(sc, code::LAMBDA_C_PLUS);
        b.add_daughter(sc, code::PION_MINUS);
        b.add_daughter(lc, code::PROTON);
        b.add_daughter(lc, 310);
        let arena = b.finish().unwrap();

        let results = DecayTreeMatcher::new().match_generated(&arena);
        assert!(results.iter().all(|r| *r == MatchResult::NONE));
    }

    #[test]
    fn test_generated_origin_not_carried_between_particles() {
        // a non-prompt Σc followed by an unrelated prompt Σc in the same arena
        let mut b = ArenaBuilder::new();
        let lb = b.add_primary(code::LAMBDA_B_0);
        let first = b.add_daughter(lb, code::SIGMA_C_0);
        let lc1 = b.add_daughter(first, code::LAMBDA_C_PLUS);
        b.add_daughter(first, code::PION_MINUS);
        for pdg in LC_FINAL_STATE {
            b.add_daughter(lc1, pdg);
        }
        let second = b.add_primary(code::SIGMA_C_PLUS_PLUS);
        let lc2 = b.add_daughter(second, code::LAMBDA_C_PLUS);
        b.add_daughter(second, code::PION_PLUS);
        for pdg in LC_FINAL_STATE {
            b.add_daughter(lc2, pdg);
        }
        let arena = b.finish().unwrap();

        let results = DecayTreeMatcher::new().match_generated(&arena);
        assert_eq!(results[first.0], MatchResult::new(1, Origin::NonPrompt));
        assert_eq!(results[second.0], MatchResult::new(2, Origin::Prompt));
        assert_eq!(results.iter().filter(|r| r.is_matched()).count(), 2);
    }

    #[test]
    fn test_custom_classifier() {
        let decay = sigmac_decay(SigmacDecay::Sc0ToPKPiPi, 1, false);
        let matcher = DecayTreeMatcher::with_classifier(|_: &ParticleArena, _: ParticleId| Origin::NonPrompt);
        let result = matcher.match_particle(&decay.arena, decay.sigmac);
        assert_eq!(result, MatchResult::new(1, Origin::NonPrompt));
        assert_eq!(CharmHadronOrigin.classify(&decay.arena, decay.sigmac), Origin::Prompt);
    }
}
