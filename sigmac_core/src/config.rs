//! Selection parameters for the Σc candidate builder.
//!
//! Fixed at startup and passed by reference into every component; nothing
//! here is read from global state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading / validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// SOFT PION CUTS
// ============================================================================

/// Track-quality cuts applied to the soft pion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftPionConfig {
    /// Max |η| (default: 0.9)
    pub eta_max: f32,

    /// ITS layers of interest, bit i = layer i (default: 127 = all 7 layers)
    pub its_hit_map: i32,

    /// Minimum number of hits among the layers of interest (default: 1)
    pub its_hits_min: i32,

    /// Max |dcaXY| in cm (default: 0.065)
    pub dca_xy_max: f32,

    /// Max |dcaZ| in cm (default: 0.065)
    pub dca_z_max: f32,
}

impl Default for SoftPionConfig {
    fn default() -> Self {
        Self {
            eta_max: 0.9,
            its_hit_map: 127,
            its_hits_min: 1,
            dca_xy_max: 0.065,
            dca_z_max: 0.065,
        }
    }
}

// ============================================================================
// BUILDER CONFIG
// ============================================================================

/// Full selection configuration of the Σc builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigmacConfig {
    /// Threshold on the upstream Λc selection flags (default: 1)
    pub selection_flag_lc: i32,

    /// Max |y| of the Λc; negative disables the cut (default: -1)
    pub y_cand_lc_max: f64,

    /// Max |M(pKπ) - M_PDG(Λc)| in GeV/c² (default: 0.03)
    pub m_pkpi_cand_lc_max: f64,

    /// Max |M(πKp) - M_PDG(Λc)| in GeV/c² (default: 0.03)
    pub m_pikp_cand_lc_max: f64,

    pub soft_pion: SoftPionConfig,
}

impl Default for SigmacConfig {
    fn default() -> Self {
        Self {
            selection_flag_lc: 1,
            y_cand_lc_max: -1.0,
            m_pkpi_cand_lc_max: 0.03,
            m_pikp_cand_lc_max: 0.03,
            soft_pion: SoftPionConfig::default(),
        }
    }
}

impl SigmacConfig {
    /// Reads a JSON file; absent keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: SigmacConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values no cut can be built from.
    ///
    /// A negative `y_cand_lc_max` is legal (cut disabled); NaN is not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.y_cand_lc_max.is_nan() {
            return Err(ConfigError::invalid("y_cand_lc_max", "NaN"));
        }
        for (field, value) in [
            ("m_pkpi_cand_lc_max", self.m_pkpi_cand_lc_max),
            ("m_pikp_cand_lc_max", self.m_pikp_cand_lc_max),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(field, format!("{value} is not a tolerance")));
            }
        }
        let soft = &self.soft_pion;
        for (field, value) in [
            ("soft_pion.eta_max", soft.eta_max),
            ("soft_pion.dca_xy_max", soft.dca_xy_max),
            ("soft_pion.dca_z_max", soft.dca_z_max),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(field, format!("{value} is not a cut value")));
            }
        }
        if soft.its_hit_map < 0 {
            return Err(ConfigError::invalid(
                "soft_pion.its_hit_map",
                format!("{} is negative", soft.its_hit_map),
            ));
        }
        Ok(())
    }

    /// Whether the Λc rapidity cut is active.
    #[inline]
    pub fn rapidity_cut_enabled(&self) -> bool {
        self.y_cand_lc_max >= 0.0
    }
}
