//! Event-composition scenarios for the simulation harness.

use crate::generator::GeneratorConfig;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// SIM-001: prompt Σc signal over light background
    PromptSignal,

    /// SIM-002: every Σc from a beauty-hadron decay
    FeedDown,

    /// SIM-003: every Λc through K*0, Δ++ or Λ(1520)
    Resonant,

    /// SIM-004: underlying event only, nothing may match
    Background,

    /// SIM-005: same-sign Λc candidates must trip the charge check
    ChargeCorruption,

    /// SIM-006: all of the above at realistic fractions
    Mixed,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::PromptSignal,
            ScenarioId::FeedDown,
            ScenarioId::Resonant,
            ScenarioId::Background,
            ScenarioId::ChargeCorruption,
            ScenarioId::Mixed,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::PromptSignal => "prompt_signal",
            ScenarioId::FeedDown => "feed_down",
            ScenarioId::Resonant => "resonant",
            ScenarioId::Background => "background",
            ScenarioId::ChargeCorruption => "charge_corruption",
            ScenarioId::Mixed => "mixed",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::PromptSignal => "2 prompt Sc per event, direct Lc decays, 20 background pions",
            ScenarioId::FeedDown => "Sc from Lb0 / B0 / B+ decays, origin must be non-prompt",
            ScenarioId::Resonant => "Lc -> p K*0, Delta++ K-, Lambda(1520) pi+ only",
            ScenarioId::Background => "No signal, 40 pions and 10 random triplets per event",
            ScenarioId::ChargeCorruption => "Signal plus same-sign Lc candidates, violations counted",
            ScenarioId::Mixed => "30% feed-down, 30% resonant, corruption and background",
        }
    }

    /// Generator settings for this scenario.
    pub fn generator_config(&self) -> GeneratorConfig {
        let base = GeneratorConfig::default();
        match self {
            ScenarioId::PromptSignal => GeneratorConfig {
                resonant_fraction: 0.0,
                ..base
            },
            ScenarioId::FeedDown => GeneratorConfig {
                feed_down_fraction: 1.0,
                ..base
            },
            ScenarioId::Resonant => GeneratorConfig {
                resonant_fraction: 1.0,
                ..base
            },
            ScenarioId::Background => GeneratorConfig {
                signal_per_event: 0,
                background_pions: 40,
                background_triplets: 10,
                ..base
            },
            ScenarioId::ChargeCorruption => GeneratorConfig {
                corrupted_candidates: 2,
                ..base
            },
            ScenarioId::Mixed => GeneratorConfig {
                signal_per_event: 3,
                feed_down_fraction: 0.3,
                resonant_fraction: 0.3,
                background_pions: 30,
                background_triplets: 8,
                corrupted_candidates: 1,
                ..base
            },
        }
    }

    /// Whether the scenario injects charge-invariant violations on purpose.
    pub fn expects_charge_violations(&self) -> bool {
        matches!(self, ScenarioId::ChargeCorruption | ScenarioId::Mixed)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prompt_signal" | "promptsignal" | "prompt" | "sim-001" => Ok(ScenarioId::PromptSignal),
            "feed_down" | "feeddown" | "sim-002" => Ok(ScenarioId::FeedDown),
            "resonant" | "sim-003" => Ok(ScenarioId::Resonant),
            "background" | "sim-004" => Ok(ScenarioId::Background),
            "charge_corruption" | "chargecorruption" | "sim-005" => Ok(ScenarioId::ChargeCorruption),
            "mixed" | "sim-006" => Ok(ScenarioId::Mixed),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
