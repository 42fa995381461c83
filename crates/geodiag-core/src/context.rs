//! Diagnostic Context: numeric knobs shared by the detectors
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticContext {
    /// Confidence added by a sub-region boundary match; half for a country match
    pub boundary_boost: f64,
    /// Geometries sampled by the consistency estimate
    pub consistency_sample: usize,
    /// Following geometries each sampled geometry is compared with
    pub consistency_window: usize,
    /// IQR multiplier for the outlier fences
    pub iqr_factor: f64,
    /// Fewer non-null geometries than this skips outlier detection
    pub min_outlier_features: usize,
}

impl Default for DiagnosticContext {
    fn default() -> Self {
        Self {
            boundary_boost: 0.1,
            consistency_sample: 100,
            consistency_window: 10,
            iqr_factor: 1.5,
            min_outlier_features: 4,
        }
    }
}

impl DiagnosticContext {
    pub fn with_boundary_boost(mut self, boost: f64) -> Self {
        self.boundary_boost = boost;
        self
    }
}
