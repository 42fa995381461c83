//! Inference Result: the one output shape of every detector
use serde::{Deserialize, Serialize};

/// Outcome of one heuristic detector.
///
/// Detectors never fail. "Could not infer" is a result with `value: None`
/// and a low confidence, tagged with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult<T> {
    pub value: Option<T>,
    #[serde(with = "crate::finite")]
    pub confidence: f64,
    pub method: String,
    pub rationale: String,
}

impl<T> InferenceResult<T> {
    pub fn determined(value: T, confidence: f64, method: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            confidence: clamp_confidence(confidence),
            method: method.into(),
            rationale: rationale.into(),
        }
    }

    pub fn undetermined(confidence: f64, method: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            value: None,
            confidence: clamp_confidence(confidence),
            method: method.into(),
            rationale: rationale.into(),
        }
    }

    pub fn is_determined(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> InferenceResult<U> {
        InferenceResult {
            value: self.value.map(f),
            confidence: self.confidence,
            method: self.method,
            rationale: self.rationale,
        }
    }

    /// Drop the value, keeping the trail of how it was (not) reached.
    pub fn into_undetermined(self, rationale: impl Into<String>) -> Self {
        Self {
            value: None,
            confidence: 0.0,
            method: self.method,
            rationale: rationale.into(),
        }
    }
}

/// Confidence always lives in [0, 1]; NaN collapses to 0.
pub fn clamp_confidence(c: f64) -> f64 {
    if c.is_nan() {
        0.0
    } else {
        c.clamp(0.0, 1.0)
    }
}
