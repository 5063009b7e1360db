//! Validation Module - Truth-level summary of a Σc reconstruction run
//! ===================================================================
//!
//! Collects the builder counters and both match tables over many events and
//! turns them into a report.
//!
//! Key metrics:
//! - Matched candidates per channel, sign and origin
//! - Generated Σc → Λc(→ pKπ) π per channel, sign and origin
//! - Reconstruction efficiency (matched reconstructed / matched generated)
//! - Purity (matched reconstructed / all candidates)
//! - Charge-invariant violations seen by the builder
//!
//! Usage:
//! ```ignore
//! use sigmac_core::validation::ValidationSession;
//!
//! let mut session = ValidationSession::new();
//! session.record_build(&output.stats);
//! session.record_reconstructed(&rec_rows);
//! session.record_generated(&gen_rows);
//! session.end_event();
//!
//! let report = session.generate_report();
//! ```

use crate::candidate_builder::BuildStats;
use crate::pdg::SigmacDecay;
use serde::Serialize;
use sigmac_env::{MatchResult, Origin};
use std::collections::BTreeMap;

// =============================================================================
// CHANNEL METRICS
// =============================================================================

/// Matched counts for one side (reconstructed or generated) of one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchCounts {
    pub particles: u64,
    pub antiparticles: u64,
    pub prompt: u64,
    pub non_prompt: u64,
}

impl MatchCounts {
    pub fn total(&self) -> u64 {
        self.particles + self.antiparticles
    }

    fn record(&mut self, result: &MatchResult) {
        if result.sign() > 0 {
            self.particles += 1;
        } else {
            self.antiparticles += 1;
        }
        match result.origin {
            Origin::Prompt => self.prompt += 1,
            Origin::NonPrompt => self.non_prompt += 1,
            Origin::None => {}
        }
    }
}

/// Per-channel validation statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelMetrics {
    pub reconstructed: MatchCounts,
    pub generated: MatchCounts,
}

impl ChannelMetrics {
    /// Matched reconstructed over matched generated, 0 without generated signal
    pub fn efficiency(&self) -> f64 {
        ratio(self.reconstructed.total(), self.generated.total())
    }
}

/// Global validation metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GlobalMetrics {
    /// Total events processed
    pub total_events: u64,
    /// Σc candidates with a reconstruction-level row
    pub total_candidates: u64,
    /// Candidates with a non-zero flag
    pub matched_candidates: u64,
    /// Particles with a generation-level row
    pub total_particles: u64,
    /// Particles with a non-zero flag
    pub matched_particles: u64,
    /// Summed builder counters
    pub build: BuildStats,
}

impl GlobalMetrics {
    pub fn efficiency(&self) -> f64 {
        ratio(self.matched_candidates, self.matched_particles)
    }

    pub fn purity(&self) -> f64 {
        ratio(self.matched_candidates, self.total_candidates)
    }

    pub fn charge_violations(&self) -> u64 {
        self.build.charge_violations
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den > 0 {
        num as f64 / den as f64
    } else {
        0.0
    }
}

// =============================================================================
// VALIDATION SESSION
// =============================================================================

/// Accumulates builder and matcher output event by event
#[derive(Debug, Clone, Default)]
pub struct ValidationSession {
    per_channel: BTreeMap<&'static str, ChannelMetrics>,
    global_metrics: GlobalMetrics,
}

impl ValidationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one build pass's counters
    pub fn record_build(&mut self, stats: &BuildStats) {
        self.global_metrics.build.merge(stats);
    }

    /// Adds one event's reconstruction-level rows
    pub fn record_reconstructed(&mut self, results: &[MatchResult]) {
        self.global_metrics.total_candidates += results.len() as u64;
        for result in results.iter().filter(|r| r.is_matched()) {
            self.global_metrics.matched_candidates += 1;
            if let Some(channel) = SigmacDecay::from_flag(result.flag) {
                self.channel_mut(channel).reconstructed.record(result);
            }
        }
    }

    /// Adds one event's generation-level rows
    pub fn record_generated(&mut self, results: &[MatchResult]) {
        self.global_metrics.total_particles += results.len() as u64;
        for result in results.iter().filter(|r| r.is_matched()) {
            self.global_metrics.matched_particles += 1;
            if let Some(channel) = SigmacDecay::from_flag(result.flag) {
                self.channel_mut(channel).generated.record(result);
            }
        }
    }

    /// Mark end of event
    pub fn end_event(&mut self) {
        self.global_metrics.total_events += 1;
    }

    fn channel_mut(&mut self, channel: SigmacDecay) -> &mut ChannelMetrics {
        self.per_channel.entry(channel.name()).or_default()
    }

    /// Generate final validation report
    pub fn generate_report(&self) -> ValidationReport {
        ValidationReport {
            global_metrics: self.global_metrics,
            per_channel: self.per_channel.clone(),
        }
    }
}

// =============================================================================
// VALIDATION REPORT
// =============================================================================

/// Final validation report with all metrics
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub global_metrics: GlobalMetrics,
    pub per_channel: BTreeMap<&'static str, ChannelMetrics>,
}

impl ValidationReport {
    pub fn channel(&self, channel: SigmacDecay) -> ChannelMetrics {
        self.per_channel.get(channel.name()).copied().unwrap_or_default()
    }

    /// Print formatted report to console
    pub fn print(&self) {
        let g = &self.global_metrics;
        println!();
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║               SIGMA_C VALIDATION REPORT                      ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ SUMMARY                                                      ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ Events:                {:>10}                            ║", g.total_events);
        println!("║ Lc Candidates Seen:    {:>10}                            ║", g.build.lc_seen);
        println!("║ Sc Candidates:         {:>10}                            ║", g.build.emitted);
        println!("║ Charge Violations:     {:>10}                            ║", g.charge_violations());
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ TRUTH MATCHING                                               ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!("║ Matched Candidates:    {:>10} / {:<10}               ║",
            g.matched_candidates, g.total_candidates);
        println!("║ Matched Particles:     {:>10} / {:<10}               ║",
            g.matched_particles, g.total_particles);
        println!("║ Efficiency:            {:>10.1}%                           ║", g.efficiency() * 100.0);
        println!("║ Purity:                {:>10.1}%                           ║", g.purity() * 100.0);
        println!("╚══════════════════════════════════════════════════════════════╝");

        if !self.per_channel.is_empty() {
            println!();
            println!("Per-Channel Breakdown:");
            println!("─────────────────────────────────────────────────────────────────");
            println!("  Channel   Rec (+/-)     Gen (+/-)     Prompt   NonPrompt   Eff");
            println!("─────────────────────────────────────────────────────────────────");
            for (name, m) in &self.per_channel {
                println!("  {:<7}   {:>5}/{:<5}   {:>5}/{:<5}   {:>6}   {:>9}   {:>5.1}%",
                    name,
                    m.reconstructed.particles,
                    m.reconstructed.antiparticles,
                    m.generated.particles,
                    m.generated.antiparticles,
                    m.generated.prompt,
                    m.generated.non_prompt,
                    m.efficiency() * 100.0,
                );
            }
        }
    }

    /// Check if validation passes acceptance criteria
    pub fn passes_criteria(&self, min_efficiency: f64, max_charge_violations: u64) -> bool {
        self.global_metrics.efficiency() >= min_efficiency
            && self.global_metrics.charge_violations() <= max_charge_violations
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_validation_session() {
        let mut session = ValidationSession::new();

        session.record_build(&BuildStats { lc_seen: 3, emitted: 2, ..Default::default() });
        session.record_reconstructed(&[MatchResult::new(2, Origin::Prompt), MatchResult::NONE]);
        session.record_generated(&[
            MatchResult::NONE,
            MatchResult::new(2, Origin::Prompt),
            MatchResult::new(-1, Origin::NonPrompt),
            MatchResult::NONE,
        ]);
        session.end_event();

        let report = session.generate_report();
        let g = report.global_metrics;
        assert_eq!(g.total_events, 1);
        assert_eq!(g.total_candidates, 2);
        assert_eq!(g.matched_candidates, 1);
        assert_eq!(g.total_particles, 4);
        assert_eq!(g.matched_particles, 2);
        assert_eq!(g.build.emitted, 2);
        assert_relative_eq!(g.efficiency(), 0.5);
        assert_relative_eq!(g.purity(), 0.5);

        let sc_pp = report.channel(SigmacDecay::ScPlusPlusToPKPiPi);
        assert_eq!(sc_pp.reconstructed.particles, 1);
        assert_eq!(sc_pp.generated.prompt, 1);
        assert_relative_eq!(sc_pp.efficiency(), 1.0);

        let sc0 = report.channel(SigmacDecay::Sc0ToPKPiPi);
        assert_eq!(sc0.generated.antiparticles, 1);
        assert_eq!(sc0.generated.non_prompt, 1);
        assert_eq!(sc0.reconstructed.total(), 0);
        assert_relative_eq!(sc0.efficiency(), 0.0);
    }

    #[test]
    fn test_build_stats_accumulate() {
        let mut session = ValidationSession::new();
        for _ in 0..3 {
            session.record_build(&BuildStats { charge_violations: 1, emitted: 4, ..Default::default() });
            session.end_event();
        }

        let report = session.generate_report();
        assert_eq!(report.global_metrics.charge_violations(), 3);
        assert_eq!(report.global_metrics.build.emitted, 12);
        assert!(!report.passes_criteria(0.0, 2));
        assert!(report.passes_criteria(0.0, 3));
    }

    #[test]
    fn test_empty_session() {
        let report = ValidationSession::new().generate_report();
        assert_eq!(report.global_metrics.efficiency(), 0.0);
        assert_eq!(report.global_metrics.purity(), 0.0);
        assert!(report.per_channel.is_empty());
        assert!(report.passes_criteria(0.0, 0));
        assert!(!report.passes_criteria(0.1, 0));
    }
}
