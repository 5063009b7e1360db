//! Scenario runner - drives generator, builder and matcher event by event.

use crate::error::SimError;
use crate::generator::EventGenerator;
use crate::scenarios::ScenarioId;

use sigmac_core::{
    CandidateBuilder, DecayTreeMatcher, OriginClassifier, SigmacConfig, ValidationReport,
    ValidationSession,
};
use sigmac_env::{Event, RecordSink, TableSink};
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Events processed
    pub events: u64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Summary over all events
    pub report: ValidationReport,

    /// Every row written during the run
    pub tables: TableSink,
}

/// Runs scenarios over freshly generated events.
pub struct ScenarioRunner {
    /// Generator seed
    seed: u64,

    /// Events per scenario
    num_events: u64,

    /// Builder configuration
    config: SigmacConfig,

    /// Run the truth matcher (false = data mode, builder only)
    with_mc: bool,

    /// Minimum reconstruction efficiency for signal scenarios
    min_efficiency: f64,
}

impl ScenarioRunner {
    /// Creates a new scenario runner with the default builder configuration.
    pub fn new(seed: u64, num_events: u64) -> Self {
        Self {
            seed,
            num_events,
            config: SigmacConfig::default(),
            with_mc: true,
            min_efficiency: 0.5,
        }
    }

    /// Sets the builder configuration.
    pub fn with_config(mut self, config: SigmacConfig) -> Self {
        self.config = config;
        self
    }

    /// Enables or disables truth matching.
    pub fn with_mc(mut self, enabled: bool) -> Self {
        self.with_mc = enabled;
        self
    }

    /// Sets the efficiency threshold of signal scenarios.
    pub fn with_min_efficiency(mut self, min_efficiency: f64) -> Self {
        self.min_efficiency = min_efficiency;
        self
    }

    pub fn config(&self) -> &SigmacConfig {
        &self.config
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        info!(
            "Starting scenario: {} (seed={}, events={})",
            scenario.name(),
            self.seed,
            self.num_events
        );
        debug!("  {}", scenario.description());

        let builder = CandidateBuilder::new(self.config.clone())?;
        let matcher = DecayTreeMatcher::new();
        let mut generator = EventGenerator::new(self.seed, scenario.generator_config());

        let mut tables = TableSink::new();
        let mut session = ValidationSession::new();

        for _ in 0..self.num_events {
            let mut event = generator.generate()?;
            if !self.with_mc {
                strip_truth(&mut event);
            }
            process_event(&event, &builder, &matcher, &mut tables, &mut session);
        }

        let report = session.generate_report();
        let failure_reason = self.check(scenario, &report, &tables).err();
        if let Some(reason) = &failure_reason {
            warn!(scenario = scenario.name(), "{}", reason);
        }

        Ok(ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            events: self.num_events,
            failure_reason,
            report,
            tables,
        })
    }

    /// Pass criteria of each scenario.
    fn check(
        &self,
        scenario: ScenarioId,
        report: &ValidationReport,
        tables: &TableSink,
    ) -> Result<(), String> {
        if let Some(bad) = tables.candidates.iter().find(|c| !matches!(c.charge, 0 | 2 | -2)) {
            return Err(format!("Sc candidate with charge {} was emitted", bad.charge));
        }

        let g = &report.global_metrics;
        let violations = g.charge_violations();
        if scenario.expects_charge_violations() {
            if violations == 0 && self.num_events > 0 {
                return Err("Same-sign Lc candidates did not trip the charge check".to_string());
            }
        } else if violations > 0 {
            return Err(format!("{} unexpected charge violations", violations));
        }

        if !self.with_mc {
            if !tables.rec_matches.is_empty() || !tables.gen_matches.is_empty() {
                return Err("Match rows written in data mode".to_string());
            }
            return Ok(());
        }

        if tables.rec_matches.len() != tables.candidates.len() {
            return Err(format!(
                "{} reconstruction rows for {} candidates",
                tables.rec_matches.len(),
                tables.candidates.len()
            ));
        }

        let (prompt, non_prompt) = report.per_channel.values().fold((0, 0), |(p, np), m| {
            (p + m.generated.prompt, np + m.generated.non_prompt)
        });

        match scenario {
            ScenarioId::Background => {
                if g.matched_candidates > 0 || g.matched_particles > 0 {
                    return Err(format!(
                        "Background matched: {} candidates, {} particles",
                        g.matched_candidates, g.matched_particles
                    ));
                }
                return Ok(());
            }
            ScenarioId::FeedDown => {
                if prompt > 0 || non_prompt == 0 {
                    return Err(format!(
                        "Feed-down origin wrong: {} prompt, {} non-prompt",
                        prompt, non_prompt
                    ));
                }
            }
            ScenarioId::PromptSignal | ScenarioId::Resonant | ScenarioId::ChargeCorruption => {
                if non_prompt > 0 {
                    return Err(format!("{} prompt Sc classified as non-prompt", non_prompt));
                }
            }
            ScenarioId::Mixed => {}
        }

        if self.num_events > 0 && g.efficiency() < self.min_efficiency {
            return Err(format!(
                "Efficiency {:.1}% below {:.1}%",
                g.efficiency() * 100.0,
                self.min_efficiency * 100.0
            ));
        }
        Ok(())
    }
}

/// Build, match and record one event.
///
/// Candidate rows come first, then one reconstruction row per candidate and
/// one generation row per particle when truth is present.
pub fn process_event<S, O>(
    event: &Event,
    builder: &CandidateBuilder,
    matcher: &DecayTreeMatcher<O>,
    sink: &mut S,
    session: &mut ValidationSession,
) where
    S: RecordSink,
    O: OriginClassifier,
{
    let output = builder.build_event(event);
    for candidate in &output.candidates {
        sink.write_candidate(candidate);
    }
    session.record_build(&output.stats);

    if let Some(arena) = &event.particles {
        let rec = matcher.match_reconstructed(&output.candidates, &event.candidates, &event.tracks, arena);
        let gen = matcher.match_generated(arena);
        for result in &rec {
            sink.write_rec_match(*result);
        }
        for result in &gen {
            sink.write_gen_match(*result);
        }
        session.record_reconstructed(&rec);
        session.record_generated(&gen);
    }
    session.end_event();
}

/// Turns a simulated event into what real data looks like.
fn strip_truth(event: &mut Event) {
    event.particles = None;
    for track in &mut event.tracks {
        track.mc_label = None;
    }
    for candidate in &mut event.candidates {
        candidate.mc_flag_rec = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sigmac_core::SigmacDecay;

    #[test]
    fn test_prompt_signal_passes() {
        let result = ScenarioRunner::new(42, 20).run(ScenarioId::PromptSignal).unwrap();
        assert!(result.passed, "{:?}", result.failure_reason);

        let g = result.report.global_metrics;
        assert_eq!(g.total_events, 20);
        assert_eq!(g.matched_particles, 40);
        assert!(g.matched_candidates > 0);
        assert_eq!(result.tables.rec_matches.len(), result.tables.candidates.len());
    }

    #[test]
    fn test_feed_down_is_non_prompt() {
        let result = ScenarioRunner::new(7, 10).run(ScenarioId::FeedDown).unwrap();
        assert!(result.passed, "{:?}", result.failure_reason);

        let sc0 = result.report.channel(SigmacDecay::Sc0ToPKPiPi);
        let sc_pp = result.report.channel(SigmacDecay::ScPlusPlusToPKPiPi);
        assert_eq!(sc0.generated.prompt + sc_pp.generated.prompt, 0);
        assert_eq!(sc0.reconstructed.prompt + sc_pp.reconstructed.prompt, 0);
    }

    #[test]
    fn test_background_never_matches() {
        let result = ScenarioRunner::new(3, 10).run(ScenarioId::Background).unwrap();
        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.tables.rec_matches.iter().all(|r| !r.is_matched()));
        assert!(result.tables.gen_matches.iter().all(|r| !r.is_matched()));
    }

    #[test]
    fn test_charge_corruption_is_counted_not_emitted() {
        let result = ScenarioRunner::new(5, 10).run(ScenarioId::ChargeCorruption).unwrap();
        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.report.global_metrics.charge_violations() > 0);
        assert!(result.tables.candidates.iter().all(|c| matches!(c.charge, 0 | 2 | -2)));
    }

    #[test]
    fn test_data_mode_writes_no_match_rows() {
        let result = ScenarioRunner::new(1, 5)
            .with_mc(false)
            .run(ScenarioId::Mixed)
            .unwrap();
        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(!result.tables.candidates.is_empty());
        assert!(result.tables.rec_matches.is_empty());
        assert!(result.tables.gen_matches.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SigmacConfig {
            m_pkpi_cand_lc_max: -1.0,
            ..Default::default()
        };
        let runner = ScenarioRunner::new(1, 1).with_config(config);
        assert!(matches!(runner.run(ScenarioId::Mixed), Err(SimError::Config(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_runs_are_reproducible(seed in any::<u64>()) {
            let a = ScenarioRunner::new(seed, 2).run(ScenarioId::Mixed).unwrap();
            let b = ScenarioRunner::new(seed, 2).run(ScenarioId::Mixed).unwrap();
            prop_assert_eq!(a.tables, b.tables);
        }

        #[test]
        fn prop_one_generation_row_per_particle(seed in any::<u64>()) {
            let runner = ScenarioRunner::new(seed, 1);
            let mut generator = EventGenerator::new(seed, ScenarioId::Mixed.generator_config());
            let particles = generator.generate().unwrap().particles.unwrap().len();

            let result = runner.run(ScenarioId::Mixed).unwrap();
            prop_assert_eq!(result.tables.gen_matches.len(), particles);
        }
    }
}
