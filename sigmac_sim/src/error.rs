//! Simulation harness errors.

use sigmac_core::ConfigError;
use sigmac_env::DataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Generated particle record is malformed: {0}")]
    Data(#[from] DataError),

    #[error("Export failed: {0}")]
    Export(#[from] std::io::Error),

    #[error("Export serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
