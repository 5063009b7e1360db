//! The "BUILDER" Engine - Σc0,++ → Λc+(→ pK-π+) π-,+ candidate combinatorics
//!
//! For every pre-selected Λc candidate of an event and every track of the
//! same event:
//! 1. Λc decay hypothesis, rapidity and mass-window checks (once per Λc)
//! 2. Soft-pion track cuts (once per track)
//! 3. Identity exclusion: the soft pion cannot be a Λc prong
//! 4. Charge conservation: Σc charge must be 0 or ±2
//!
//! Emission order is Λc outer, track inner. Nothing survives across events.

use crate::config::{ConfigError, SigmacConfig};
use crate::kinematics::invariant_mass;
use crate::pdg::{ThreeProngDecay, MASS_KAON, MASS_LAMBDA_C, MASS_PION, MASS_PROTON};
use crate::track_filter::TrackFilter;
use serde::{Deserialize, Serialize};
use sigmac_env::{CompositeCandidate, Event, EventId, ThreeBodyCandidate, Track, TrackId};
use std::collections::HashMap;
use tracing::{debug, error};

/// Per-reason counters for one build pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Λc candidates inspected
    pub lc_seen: u64,
    /// Λc without the pKπ decay hypothesis
    pub lc_wrong_decay: u64,
    /// Λc outside the rapidity window
    pub lc_rapidity: u64,
    /// Λc with neither mass hypothesis in its window
    pub lc_mass_window: u64,
    /// Λc whose prong tracks are missing from the event
    pub lc_missing_prong: u64,
    /// Tracks failing the soft-pion cuts
    pub soft_pi_rejected: u64,
    /// Pairs skipped because the soft pion is a Λc prong
    pub prong_reuse: u64,
    /// Pairs with an impossible net charge
    pub charge_violations: u64,
    /// Σc candidates written
    pub emitted: u64,
}

impl BuildStats {
    /// Adds another pass's counters into this one.
    pub fn merge(&mut self, other: &BuildStats) {
        self.lc_seen += other.lc_seen;
        self.lc_wrong_decay += other.lc_wrong_decay;
        self.lc_rapidity += other.lc_rapidity;
        self.lc_mass_window += other.lc_mass_window;
        self.lc_missing_prong += other.lc_missing_prong;
        self.soft_pi_rejected += other.soft_pi_rejected;
        self.prong_reuse += other.prong_reuse;
        self.charge_violations += other.charge_violations;
        self.emitted += other.emitted;
    }
}

/// Candidates plus the counters explaining what was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutput {
    pub candidates: Vec<CompositeCandidate>,
    pub stats: BuildStats,
}

/// Mass-window status of the two Λc hypotheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MassWindowStatus {
    pub pkpi: u8,
    pub pikp: u8,
}

impl MassWindowStatus {
    #[inline]
    pub fn any(&self) -> bool {
        self.pkpi != 0 || self.pikp != 0
    }
}

/// Pairs Λc candidates with soft-pion tracks.
#[derive(Debug, Clone)]
pub struct CandidateBuilder {
    config: SigmacConfig,
    track_filter: TrackFilter,
}

impl CandidateBuilder {
    /// Validates the configuration and sets up the soft-pion filter.
    pub fn new(config: SigmacConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let track_filter = TrackFilter::new(&config.soft_pion);
        Ok(Self {
            config,
            track_filter,
        })
    }

    pub fn config(&self) -> &SigmacConfig {
        &self.config
    }

    pub fn track_filter(&self) -> &TrackFilter {
        &self.track_filter
    }

    /// Applies the upstream selection-flag filter, then builds.
    pub fn build_event(&self, event: &Event) -> BuildOutput {
        let selected = event.selected_candidates(self.config.selection_flag_lc);
        self.build_with_stats(event.id, &selected, &event.tracks)
    }

    /// Builds Σc candidates from already pre-filtered Λc candidates.
    pub fn build(
        &self,
        event_id: EventId,
        candidates: &[ThreeBodyCandidate],
        tracks: &[Track],
    ) -> Vec<CompositeCandidate> {
        self.build_with_stats(event_id, candidates, tracks).candidates
    }

    /// As [`build`](Self::build), also returning the reject counters.
    pub fn build_with_stats(
        &self,
        event_id: EventId,
        candidates: &[ThreeBodyCandidate],
        tracks: &[Track],
    ) -> BuildOutput {
        let mut stats = BuildStats::default();
        let mut output = Vec::new();

        let signs: HashMap<TrackId, i8> = tracks.iter().map(|t| (t.id, t.sign)).collect();

        let soft_pions: Vec<&Track> = tracks
            .iter()
            .filter(|track| self.track_filter.accepts(track))
            .collect();
        stats.soft_pi_rejected = (tracks.len() - soft_pions.len()) as u64;

        for cand_lc in candidates {
            stats.lc_seen += 1;

            if !ThreeProngDecay::LcToPKPi.is_set_in(cand_lc.hf_flag) {
                stats.lc_wrong_decay += 1;
                continue;
            }
            if self.config.rapidity_cut_enabled()
                && cand_lc.rapidity(MASS_LAMBDA_C).abs() > self.config.y_cand_lc_max
            {
                stats.lc_rapidity += 1;
                continue;
            }

            let status = self.mass_window_status(cand_lc);
            if !status.any() {
                stats.lc_mass_window += 1;
                continue;
            }

            let Some(charge_lc) = prong_charge(cand_lc, &signs) else {
                error!(
                    event = %event_id,
                    lc = %cand_lc.id,
                    prongs = ?cand_lc.prong_ids,
                    "Lc prong track missing from event, candidate skipped"
                );
                stats.lc_missing_prong += 1;
                continue;
            };

            for soft_pi in &soft_pions {
                if cand_lc.has_prong(soft_pi.id) {
                    stats.prong_reuse += 1;
                    continue;
                }

                let charge_sigmac = charge_lc + soft_pi.sign;
                if charge_sigmac.abs() != 0 && charge_sigmac.abs() != 2 {
                    error!(
                        fatal = true,
                        event = %event_id,
                        lc = %cand_lc.id,
                        soft_pi = %soft_pi.id,
                        charge_lc,
                        charge_soft_pi = soft_pi.sign,
                        "Sc candidate with charge {} built, not possible",
                        charge_sigmac
                    );
                    stats.charge_violations += 1;
                    continue;
                }

                output.push(CompositeCandidate {
                    event_id,
                    lc_momentum: cand_lc.momentum,
                    soft_momentum: soft_pi.momentum,
                    lc_id: cand_lc.id,
                    soft_track_id: soft_pi.id,
                    hf_flag: cand_lc.hf_flag,
                    charge: charge_sigmac,
                    status_pkpi: status.pkpi,
                    status_pikp: status.pikp,
                });
                stats.emitted += 1;
            }
        }

        debug!(
            event = %event_id,
            lc = stats.lc_seen,
            soft_pi = soft_pions.len(),
            emitted = stats.emitted,
            "Sc candidates built"
        );

        BuildOutput {
            candidates: output,
            stats,
        }
    }

    /// Evaluates both Λc mass hypotheses against their windows.
    ///
    /// A hypothesis counts only if the upstream selector flagged it (≥ 1).
    pub fn mass_window_status(&self, cand_lc: &ThreeBodyCandidate) -> MassWindowStatus {
        let mut status = MassWindowStatus::default();
        if cand_lc.is_sel_pkpi >= 1
            && (inv_mass_pkpi(cand_lc) - MASS_LAMBDA_C).abs() <= self.config.m_pkpi_cand_lc_max
        {
            status.pkpi = 1;
        }
        if cand_lc.is_sel_pikp >= 1
            && (inv_mass_pikp(cand_lc) - MASS_LAMBDA_C).abs() <= self.config.m_pikp_cand_lc_max
        {
            status.pikp = 1;
        }
        status
    }
}

/// Invariant mass with prongs 0, 1, 2 taken as p, K, π.
pub fn inv_mass_pkpi(cand_lc: &ThreeBodyCandidate) -> f64 {
    invariant_mass(&cand_lc.prong_momenta, &[MASS_PROTON, MASS_KAON, MASS_PION])
}

/// Invariant mass with prongs 0, 1, 2 taken as π, K, p.
pub fn inv_mass_pikp(cand_lc: &ThreeBodyCandidate) -> f64 {
    invariant_mass(&cand_lc.prong_momenta, &[MASS_PION, MASS_KAON, MASS_PROTON])
}

fn prong_charge(cand_lc: &ThreeBodyCandidate, signs: &HashMap<TrackId, i8>) -> Option<i8> {
    cand_lc
        .prong_ids
        .iter()
        .map(|id| signs.get(id).copied())
        .sum()
}
