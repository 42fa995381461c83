//! Unit Detector: coordinate magnitude -> measurement unit
use crate::rule::{Rule, RuleLadder};
use geodiag_core::{crs, Extent, InferenceResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Degrees,
    Metres,
    Centimetres,
    Feet,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Unit::Degrees => "degrees",
            Unit::Metres => "metres",
            Unit::Centimetres => "centimetres",
            Unit::Feet => "feet",
        };
        write!(f, "{}", s)
    }
}

/// What the ladder looks at.
#[derive(Debug, Clone)]
pub struct UnitSignal {
    pub crs: Option<String>,
    /// Mean of extent width and height
    pub mean_span: Option<f64>,
}

impl UnitSignal {
    pub fn new(extent: Option<&Extent>, crs: Option<&str>) -> Self {
        Self {
            crs: crs.map(crs::normalize_id),
            mean_span: extent.map(|e| e.mean_span()).filter(|s| s.is_finite()),
        }
    }

    fn span_in(&self, lo: f64, hi: f64) -> bool {
        self.mean_span.map(|s| (lo..=hi).contains(&s)).unwrap_or(false)
    }

    fn describe(&self) -> String {
        match self.mean_span {
            Some(s) => format!("mean extent span {:.4}", s),
            None => "no extent".to_string(),
        }
    }
}

static UNIT_LADDER: Lazy<RuleLadder<UnitSignal, Unit>> = Lazy::new(|| {
    RuleLadder::new(
        Rule::<UnitSignal, Unit>::new("unknown", 0.3, None, |_| true)
            .with_explain(|s| format!("{} matches no known unit range", s.describe())),
    )
    .with_rule(
        Rule::<UnitSignal, Unit>::new("crs_geographic", 0.9, Some(Unit::Degrees), |s| {
            s.crs.as_deref().map(|id| crs::GEOGRAPHIC_IDS.contains(&id)).unwrap_or(false)
        })
        .with_explain(|s| format!("geographic CRS {}", s.crs.as_deref().unwrap_or_default())),
    )
    .with_rule(
        Rule::<UnitSignal, Unit>::new("crs_projected", 0.85, Some(Unit::Metres), |s| {
            s.crs.as_deref().map(crs::is_known_projected).unwrap_or(false) && s.span_in(100.0, 1e6)
        })
        .with_explain(|s| format!("projected CRS {} and {}", s.crs.as_deref().unwrap_or_default(), s.describe())),
    )
    .with_rule(
        Rule::<UnitSignal, Unit>::new("magnitude_metres", 0.7, Some(Unit::Metres), |s| s.span_in(0.1, 1e6))
            .with_explain(|s| format!("{} fits metres", s.describe())),
    )
    .with_rule(
        Rule::<UnitSignal, Unit>::new("magnitude_centimetres", 0.7, Some(Unit::Centimetres), |s| s.span_in(0.001, 1e4))
            .with_explain(|s| format!("{} fits centimetres", s.describe())),
    )
    .with_rule(
        Rule::<UnitSignal, Unit>::new("magnitude_feet", 0.6, Some(Unit::Feet), |s| s.span_in(0.03, 3e5))
            .with_explain(|s| format!("{} fits feet", s.describe())),
    )
});

pub fn detect_units(extent: Option<&Extent>, crs: Option<&str>) -> InferenceResult<Unit> {
    let result = UNIT_LADDER.evaluate(&UnitSignal::new(extent, crs));
    debug!(unit = ?result.value, confidence = result.confidence, method = %result.method, "units detected");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Extent {
        Extent::new(0.0, 0.0, side, side)
    }

    #[test]
    fn test_geographic_crs_means_degrees() {
        let r = detect_units(Some(&square(2.0)), Some("EPSG:4686"));
        assert_eq!(r.value, Some(Unit::Degrees));
        assert_eq!(r.confidence, 0.9);
    }

    #[test]
    fn test_projected_crs_means_metres() {
        let r = detect_units(Some(&square(5000.0)), Some("EPSG:3116"));
        assert_eq!(r.value, Some(Unit::Metres));
        assert_eq!(r.confidence, 0.85);
    }

    #[test]
    fn test_magnitude_ladder() {
        assert_eq!(detect_units(Some(&square(50.0)), None).value, Some(Unit::Metres));
        let tiny = detect_units(Some(&square(0.01)), None);
        assert_eq!(tiny.value, Some(Unit::Centimetres));
        assert_eq!(tiny.confidence, 0.7);
    }

    #[test]
    fn test_unknown() {
        let r = detect_units(Some(&square(5e7)), None);
        assert_eq!(r.value, None);
        assert_eq!(r.confidence, 0.3);
        assert_eq!(detect_units(None, None).method, "unknown");
    }
}
