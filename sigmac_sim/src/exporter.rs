//! JSON exporter for scenario runs.
//!
//! Writes the three output tables together with the configuration and the
//! validation summary, so a run can be inspected or diffed offline.

use crate::error::SimError;
use crate::generator::GeneratorConfig;
use crate::runner::ScenarioResult;
use serde::Serialize;
use sigmac_core::{SigmacConfig, ValidationReport};
use sigmac_env::TableSink;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

/// Complete simulation export.
#[derive(Debug, Clone, Serialize)]
pub struct SimExport {
    /// Unique id of this export
    pub run_id: Uuid,

    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Events processed
    pub events: u64,

    /// Whether truth matching ran
    pub mc: bool,

    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    pub config: SigmacConfig,
    pub generator: GeneratorConfig,
    pub report: ValidationReport,

    /// Candidate, reconstruction-match and generation-match rows
    pub tables: TableSink,
}

impl SimExport {
    /// Captures a finished run.
    pub fn new(result: &ScenarioResult, config: &SigmacConfig, mc: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            scenario: result.scenario.name().to_string(),
            seed: result.seed,
            events: result.events,
            mc,
            passed: result.passed,
            failure_reason: result.failure_reason.clone(),
            config: config.clone(),
            generator: result.scenario.generator_config(),
            report: result.report.clone(),
            tables: result.tables.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
