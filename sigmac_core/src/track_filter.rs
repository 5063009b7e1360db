//! Soft-pion track selection.

use crate::config::SoftPionConfig;
use sigmac_env::Track;
use tracing::{info, warn};

/// Number of ITS layers.
pub const ITS_LAYERS: u8 = 7;

/// Pure predicate over one track. Built once, shared read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackFilter {
    eta_max: f32,
    dca_xy_max: f32,
    dca_z_max: f32,
    hits_min: i32,

    /// ITS layers whose hits are counted, derived from the configured bitmask
    layers: Vec<u8>,
}

impl TrackFilter {
    /// Derives the layer subset and freezes the cuts.
    pub fn new(config: &SoftPionConfig) -> Self {
        let layers = layers_from_hit_map(config.its_hit_map);
        if config.its_hit_map >> ITS_LAYERS != 0 {
            warn!(
                its_hit_map = config.its_hit_map,
                "ITS hit map has bits above layer {}, ignored",
                ITS_LAYERS - 1
            );
        }
        info!(
            n_layers = layers.len(),
            ?layers,
            hits_min = config.its_hits_min,
            "Soft pion ITS hit map"
        );

        Self {
            eta_max: config.eta_max,
            dca_xy_max: config.dca_xy_max,
            dca_z_max: config.dca_z_max,
            hits_min: config.its_hits_min,
            layers,
        }
    }

    /// Layers of interest, ascending.
    pub fn layers(&self) -> &[u8] {
        &self.layers
    }

    /// True when `track` passes every soft-pion cut.
    pub fn accepts(&self, track: &Track) -> bool {
        if track.eta().abs() > f64::from(self.eta_max) {
            return false;
        }
        if track.dca_xy.abs() > self.dca_xy_max || track.dca_z.abs() > self.dca_z_max {
            return false;
        }
        if !track.its_refit {
            return false;
        }
        self.count_hits(track) >= self.hits_min
    }

    /// Hits on the layers of interest.
    pub fn count_hits(&self, track: &Track) -> i32 {
        self.layers
            .iter()
            .filter(|&&layer| track.has_its_hit(layer))
            .count() as i32
    }
}

/// Layers 0..6 whose bit is set in `hit_map`.
pub fn layers_from_hit_map(hit_map: i32) -> Vec<u8> {
    (0..ITS_LAYERS)
        .filter(|&layer| hit_map & (1 << layer) != 0)
        .collect()
}
