//! Diagnostic Record: everything one diagnosis produced
use geodiag_core::{GeodiagError, InferenceResult};
use geodiag_inference::{CrsReport, OriginClass, Unit};
use geodiag_quality::{QualityVerdict, Signals, UseCase, UseCaseVerdict};
use geodiag_validation::ValidationReport;
use serde::{Deserialize, Serialize};

/// Output digest of one pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDigest {
    pub id: String,
    pub out_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub version: String,
    /// `blake3:<hex>` of the input snapshot
    pub input_hash: String,
    pub declared_crs: Option<String>,
    pub crs: CrsReport,
    pub units: InferenceResult<Unit>,
    pub origin: InferenceResult<OriginClass>,
    /// Datum name of the detected origin
    pub origin_name: Option<String>,
    pub scale: InferenceResult<u32>,
    pub planimetric_error: InferenceResult<f64>,
    pub altimetric_error: InferenceResult<f64>,
    pub validation: ValidationReport,
    pub quality: QualityVerdict,
    pub use_cases: Vec<UseCaseVerdict>,
    pub stages: Vec<StageDigest>,
}

impl DiagnosticRecord {
    pub fn signals(&self) -> Signals<'_> {
        Signals {
            crs: &self.crs.result,
            units: &self.units,
            origin: &self.origin,
            scale: &self.scale,
            planimetric: &self.planimetric_error,
            altimetric: &self.altimetric_error,
            validation: &self.validation,
        }
    }

    pub fn use_case(&self, use_case: UseCase) -> Option<&UseCaseVerdict> {
        self.use_cases.iter().find(|v| v.use_case == use_case)
    }

    /// Turn non-finite primary values into undetermined results.
    pub fn sanitize(mut self) -> Self {
        self.planimetric_error = finite_or_undetermined(self.planimetric_error);
        self.altimetric_error = finite_or_undetermined(self.altimetric_error);
        self
    }

    /// Same input and same stage outputs.
    pub fn same_outcome(&self, other: &DiagnosticRecord) -> bool {
        self.input_hash == other.input_hash && self.stages == other.stages
    }

    pub fn to_json(&self) -> Result<String, GeodiagError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, GeodiagError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub(crate) fn finite_or_undetermined(result: InferenceResult<f64>) -> InferenceResult<f64> {
    match result.value {
        Some(v) if !v.is_finite() => {
            let rationale = format!("{} (non-finite value {} discarded)", result.rationale, v);
            result.into_undetermined(rationale)
        }
        _ => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_becomes_undetermined() {
        let r = finite_or_undetermined(InferenceResult::determined(f64::INFINITY, 0.7, "std_deviation", "spread"));
        assert_eq!(r.value, None);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.method, "std_deviation");
        assert!(r.rationale.contains("discarded"));

        let r = finite_or_undetermined(InferenceResult::determined(0.5, 0.7, "scale_based", "1:1000"));
        assert_eq!(r.value, Some(0.5));
    }
}
