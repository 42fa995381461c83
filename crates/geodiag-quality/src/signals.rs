//! Detector outputs an assessment looks at
use geodiag_core::InferenceResult;
use geodiag_inference::{OriginClass, Unit};
use geodiag_validation::ValidationReport;
use std::collections::BTreeSet;

/// Borrowed view over one diagnosis, shared by both assessors.
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a> {
    pub crs: &'a InferenceResult<String>,
    pub units: &'a InferenceResult<Unit>,
    pub origin: &'a InferenceResult<OriginClass>,
    pub scale: &'a InferenceResult<u32>,
    pub planimetric: &'a InferenceResult<f64>,
    pub altimetric: &'a InferenceResult<f64>,
    pub validation: &'a ValidationReport,
}

impl<'a> Signals<'a> {
    pub fn crs_id(&self) -> Option<&'a str> {
        self.crs.value.as_deref()
    }

    pub fn error_count(&self) -> usize {
        self.validation.error_count()
    }

    pub fn outlier_count(&self) -> usize {
        self.validation.outlier_count()
    }

    /// Share of features flagged on at least one axis.
    pub fn outlier_ratio(&self) -> f64 {
        let features = self.validation.statistics.num_features;
        if features == 0 {
            return 0.0;
        }
        let flagged: BTreeSet<usize> = self.validation.outliers.iter().map(|o| o.index).collect();
        flagged.len() as f64 / features as f64
    }
}
