//! Origin Detector: official geodetic datum vs. local or international frames
use crate::rule::{Rule, RuleLadder};
use geodiag_core::crs::{self, WGS84};
use geodiag_core::{GeometryCollection, InferenceResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginClass {
    /// National datum (MAGNA-SIRGAS)
    Official,
    /// Arbitrary or locally shifted frame
    Local,
    /// Global datum (WGS 84)
    International,
}

impl OriginClass {
    pub fn datum_name(&self) -> &'static str {
        match self {
            OriginClass::Official => "MAGNA-SIRGAS",
            OriginClass::Local => "local/arbitrary",
            OriginClass::International => "WGS84",
        }
    }
}

/// Looks for a systematic shift of the data against a known reference.
pub trait DisplacementCheck: Send + Sync {
    fn is_displaced(&self, collection: &GeometryCollection) -> bool;
}

/// Check with no reference data: never reports a shift.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisplacement;

impl DisplacementCheck for NoDisplacement {
    fn is_displaced(&self, _collection: &GeometryCollection) -> bool {
        false
    }
}

struct OriginSignal {
    crs: Option<String>,
    displaced: bool,
}

impl OriginSignal {
    fn unofficial_or_missing(&self) -> bool {
        self.crs.as_deref().map(|id| id == WGS84).unwrap_or(true)
    }

    fn crs_label(&self) -> &str {
        self.crs.as_deref().unwrap_or("none")
    }
}

static ORIGIN_LADDER: Lazy<RuleLadder<OriginSignal, OriginClass>> = Lazy::new(|| {
    RuleLadder::new(
        Rule::<OriginSignal, OriginClass>::new("undetermined", 0.4, None, |_| true)
            .with_explain(|s| format!("CRS {} does not reveal its geodetic origin", s.crs_label())),
    )
    .with_rule(
        Rule::<OriginSignal, OriginClass>::new("official_crs", 0.9, Some(OriginClass::Official), |s| {
            s.crs.as_deref().map(crs::is_official).unwrap_or(false)
        })
        .with_explain(|s| format!("CRS {} belongs to the MAGNA-SIRGAS datum", s.crs_label())),
    )
    .with_rule(
        Rule::<OriginSignal, OriginClass>::new("displacement_detected", 0.7, Some(OriginClass::Local), |s| {
            s.unofficial_or_missing() && s.displaced
        })
        .with_explain(|_| "systematic displacement suggests a local origin".to_string()),
    )
    .with_rule(
        Rule::<OriginSignal, OriginClass>::new("international_default", 0.6, Some(OriginClass::International), |s| {
            s.unofficial_or_missing()
        })
        .with_explain(|s| format!("CRS {} with no displacement, assuming WGS84", s.crs_label())),
    )
});

/// Classify the origin of `collection` given the CRS detected for it.
///
/// The check only runs when the CRS is missing or WGS 84.
pub fn detect_origin(
    collection: &GeometryCollection,
    crs: Option<&str>,
    check: &dyn DisplacementCheck,
) -> InferenceResult<OriginClass> {
    let crs = crs.map(crs::normalize_id);
    let needs_check = crs.as_deref().map(|id| id == WGS84).unwrap_or(true);
    let signal = OriginSignal {
        displaced: needs_check && check.is_displaced(collection),
        crs,
    };
    let result = ORIGIN_LADDER.evaluate(&signal);
    debug!(origin = ?result.value, confidence = result.confidence, method = %result.method, "origin detected");
    result
}
