//! Use Case Assessor: weighted criteria of a profile against one diagnosis
use crate::assessor::{Check, CheckStatus};
use crate::profile::{Criterion, CrsRequirement, UseCase, UseCaseProfile};
use crate::signals::Signals;
use geodiag_core::crs;
use geodiag_inference::OriginClass;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseVerdict {
    pub use_case: UseCase,
    pub suitable: bool,
    #[serde(with = "geodiag_core::finite")]
    pub score: f64,
    #[serde(with = "geodiag_core::finite")]
    pub max_score: f64,
    /// 0 to 100
    #[serde(with = "geodiag_core::finite")]
    pub percentage: f64,
    pub reasons: Vec<String>,
    pub recommendations: Vec<String>,
    pub checks: Vec<Check>,
}

enum Outcome {
    Met(String),
    NotMet(String),
    /// Input missing: scores nothing and carries no advice
    Unknown(String),
}

/// Runs a set of profiles, the built-ins unless told otherwise.
pub struct UseCaseAssessor<'a> {
    profiles: &'a [UseCaseProfile],
}

impl<'a> UseCaseAssessor<'a> {
    pub fn new(profiles: &'a [UseCaseProfile]) -> Self {
        Self { profiles }
    }

    pub fn profiles(&self) -> &'a [UseCaseProfile] {
        self.profiles
    }

    pub fn assess(&self, signals: &Signals) -> Vec<UseCaseVerdict> {
        self.profiles.iter().map(|p| assess_use_case(p, signals)).collect()
    }

    pub fn assess_one(&self, use_case: UseCase, signals: &Signals) -> Option<UseCaseVerdict> {
        self.profiles
            .iter()
            .find(|p| p.use_case == use_case)
            .map(|p| assess_use_case(p, signals))
    }
}

impl Default for UseCaseAssessor<'static> {
    fn default() -> Self {
        Self::new(UseCaseProfile::builtin())
    }
}

pub fn assess_use_case(profile: &UseCaseProfile, signals: &Signals) -> UseCaseVerdict {
    let mut score = 0.0;
    let mut reasons = Vec::new();
    let mut recommendations = Vec::new();
    let mut checks = Vec::new();

    for wc in &profile.criteria {
        let (status, message, impact) = match evaluate(profile, wc.criterion, signals) {
            Outcome::Met(reason) => (CheckStatus::Ok, reason, wc.weight),
            Outcome::NotMet(reason) => {
                recommendations.extend(wc.advice.clone());
                (CheckStatus::Fail, reason, 0.0)
            }
            Outcome::Unknown(reason) => (CheckStatus::Warn, reason, 0.0),
        };
        score += impact;
        reasons.push(message.clone());
        checks.push(Check::new(wc.criterion.name(), status, message, impact));
    }

    let max_score = profile.max_score();
    let percentage = if max_score > 0.0 { (100.0 * score / max_score).clamp(0.0, 100.0) } else { 0.0 };
    let suitable = score >= profile.pass_score();
    debug!(use_case = %profile.use_case, score, max_score, suitable, "use case assessed");

    UseCaseVerdict {
        use_case: profile.use_case,
        suitable,
        score,
        max_score,
        percentage,
        reasons,
        recommendations,
        checks,
    }
}

fn evaluate(profile: &UseCaseProfile, criterion: Criterion, s: &Signals) -> Outcome {
    match criterion {
        Criterion::PlanimetricError => match s.planimetric.value.filter(|e| e.is_finite()) {
            Some(e) if e <= profile.max_planimetric_error => Outcome::Met(format!(
                "Planimetric error {:.2} m within {} m",
                e, profile.max_planimetric_error
            )),
            Some(e) => Outcome::NotMet(format!(
                "Planimetric error {:.2} m above {} m",
                e, profile.max_planimetric_error
            )),
            None => Outcome::Unknown("Planimetric error not computed".to_string()),
        },
        Criterion::AltimetricError => {
            let Some(max) = profile.max_altimetric_error else {
                return Outcome::Met("No altimetric requirement".to_string());
            };
            match s.altimetric.value.filter(|e| e.is_finite()) {
                Some(e) if e <= max => Outcome::Met(format!("Altimetric error {:.2} m within {} m", e, max)),
                Some(e) => Outcome::NotMet(format!("Altimetric error {:.2} m above {} m", e, max)),
                None => Outcome::Unknown("Altimetric error not available (acceptable without Z values)".to_string()),
            }
        }
        Criterion::Scale => match s.scale.value {
            Some(scale) if scale >= profile.min_scale => {
                Outcome::Met(format!("Scale 1:{} meets 1:{}", scale, profile.min_scale))
            }
            Some(scale) => Outcome::NotMet(format!("Scale 1:{} below 1:{}", scale, profile.min_scale)),
            None => Outcome::Unknown("Scale not estimated".to_string()),
        },
        Criterion::Crs => crs_outcome(profile.crs_requirement, s),
        Criterion::GeometryValidity => match s.error_count() {
            0 => Outcome::Met("All geometries are valid".to_string()),
            n if profile.strict_validity => Outcome::NotMet(format!("{} invalid geometries", n)),
            n => Outcome::Met(format!("{} invalid geometries, tolerated for this use", n)),
        },
        Criterion::OutlierRatio => {
            let ratio = s.outlier_ratio();
            if ratio <= profile.max_outlier_ratio {
                Outcome::Met(format!(
                    "Outlier ratio {:.2}% within {:.2}%",
                    ratio * 100.0,
                    profile.max_outlier_ratio * 100.0
                ))
            } else {
                Outcome::NotMet(format!(
                    "Outlier ratio {:.2}% above {:.2}%",
                    ratio * 100.0,
                    profile.max_outlier_ratio * 100.0
                ))
            }
        }
    }
}

fn crs_outcome(requirement: CrsRequirement, s: &Signals) -> Outcome {
    let detected = s.crs_id();
    let origin = s.origin.value;
    match requirement {
        CrsRequirement::Official => {
            if detected.is_some_and(crs::is_official) || origin == Some(OriginClass::Official) {
                Outcome::Met("Official CRS (MAGNA-SIRGAS) detected".to_string())
            } else {
                Outcome::NotMet(format!("CRS {} is not official", detected.unwrap_or("undetermined")))
            }
        }
        CrsRequirement::Any => match (detected, origin) {
            (Some(id), _) => Outcome::Met(format!("CRS defined: {}", id)),
            (None, Some(o)) => Outcome::Met(format!("Geodetic origin known: {}", o.datum_name())),
            (None, None) => Outcome::NotMet("No CRS or geodetic origin determined".to_string()),
        },
        CrsRequirement::Consistent | CrsRequirement::GeographicOrProjected => match detected {
            Some(id) => Outcome::Met(format!("CRS {} detected", id)),
            None => Outcome::NotMet("CRS not determined".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::WeightedCriterion;
    use geodiag_core::InferenceResult;
    use geodiag_inference::Unit;
    use geodiag_validation::{GeometryError, ValidationReport};

    fn verdict(profile: &UseCaseProfile, crs: Option<&str>, errors: usize) -> UseCaseVerdict {
        let crs = match crs {
            Some(id) => InferenceResult::determined(id.to_string(), 0.9, "m", "r"),
            None => InferenceResult::undetermined(0.3, "insufficient_data", "r"),
        };
        let units = InferenceResult::determined(Unit::Metres, 0.7, "m", "r");
        let origin = InferenceResult::undetermined(0.4, "undetermined", "r");
        let scale = InferenceResult::determined(25_000, 0.6, "m", "r");
        let planimetric = InferenceResult::determined(8.0, 0.6, "m", "r");
        let altimetric = InferenceResult::undetermined(0.0, "no_z_data", "r");
        let mut validation = ValidationReport::trivially_valid(10);
        validation.errors = (0..errors).map(GeometryError::null).collect();
        let signals = Signals {
            crs: &crs,
            units: &units,
            origin: &origin,
            scale: &scale,
            planimetric: &planimetric,
            altimetric: &altimetric,
            validation: &validation,
        };
        assess_use_case(profile, &signals)
    }

    #[test]
    fn test_territorial_passes_with_crs() {
        let v = verdict(&UseCaseProfile::territorial_analysis(), Some("EPSG:32618"), 0);
        assert!(v.suitable);
        assert_eq!(v.score, 4.0);
        assert_eq!(v.percentage, 100.0);
        assert!(v.recommendations.is_empty());
    }

    #[test]
    fn test_missing_crs_adds_advice() {
        let v = verdict(&UseCaseProfile::territorial_analysis(), None, 0);
        assert_eq!(v.score, 3.0);
        assert!(v.suitable);
        assert_eq!(v.recommendations, vec!["Define a consistent CRS for territorial analysis".to_string()]);
    }

    #[test]
    fn test_lenient_validity_tolerates_errors() {
        let profile = UseCaseProfile {
            criteria: vec![WeightedCriterion::new(Criterion::GeometryValidity, 1.0)],
            ..UseCaseProfile::environmental_modeling()
        };
        let v = verdict(&profile, None, 3);
        assert_eq!(v.score, 1.0);
        assert!(v.reasons[0].contains("tolerated"));

        let strict = UseCaseProfile { strict_validity: true, ..profile };
        assert_eq!(verdict(&strict, None, 3).score, 0.0);
    }

    #[test]
    fn test_cadastral_fails_loose_data() {
        let v = verdict(&UseCaseProfile::cadastral(), Some("EPSG:4326"), 0);
        assert!(!v.suitable);
        // scale, validity and outliers only
        assert_eq!(v.score, 2.5);
        assert_eq!(v.checks[1].status, CheckStatus::Warn);
        assert!(v.recommendations.contains(&"Use the official MAGNA-SIRGAS coordinate system for cadastral use".to_string()));
    }

    #[test]
    fn test_every_failed_criterion_carries_advice() {
        let crs = InferenceResult::undetermined(0.3, "insufficient_data", "r");
        let units = InferenceResult::undetermined(0.3, "unknown", "r");
        let origin = InferenceResult::undetermined(0.4, "undetermined", "r");
        let scale = InferenceResult::determined(100, 0.5, "m", "r");
        let planimetric = InferenceResult::determined(500.0, 0.5, "m", "r");
        let altimetric = InferenceResult::determined(50.0, 0.5, "m", "r");
        let mut validation = ValidationReport::trivially_valid(4);
        validation.errors = (0..2).map(GeometryError::null).collect();
        let signals = Signals {
            crs: &crs,
            units: &units,
            origin: &origin,
            scale: &scale,
            planimetric: &planimetric,
            altimetric: &altimetric,
            validation: &validation,
        };
        for v in UseCaseAssessor::default().assess(&signals) {
            let failed = v.checks.iter().filter(|c| c.status == CheckStatus::Fail).count();
            assert!(failed > 0, "{}", v.use_case);
            assert_eq!(failed, v.recommendations.len(), "{}: {:?}", v.use_case, v.checks);
        }
    }

    #[test]
    fn test_default_assessor_runs_all_profiles() {
        assert_eq!(UseCaseAssessor::default().profiles().len(), 4);
    }
}
