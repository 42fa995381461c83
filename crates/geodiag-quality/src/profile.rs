//! Use-case profiles
//!
//! Thresholds and weighted criteria deciding whether a dataset is fit for a
//! given use. Profiles are plain data: the four built-ins below, or any set
//! loaded from YAML.

use geodiag_core::GeodiagError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCase {
    Cadastral,
    EngineeringSurvey,
    TerritorialAnalysis,
    EnvironmentalModeling,
}

impl UseCase {
    pub const ALL: [UseCase; 4] = [
        UseCase::Cadastral,
        UseCase::EngineeringSurvey,
        UseCase::TerritorialAnalysis,
        UseCase::EnvironmentalModeling,
    ];
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            UseCase::Cadastral => "cadastral",
            UseCase::EngineeringSurvey => "engineering_survey",
            UseCase::TerritorialAnalysis => "territorial_analysis",
            UseCase::EnvironmentalModeling => "environmental_modeling",
        };
        write!(f, "{}", s)
    }
}

/// What the CRS criterion asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrsRequirement {
    /// The national datum, by CRS or detected origin
    Official,
    /// Any CRS or at least a known origin
    Any,
    /// A single detected CRS for the whole dataset
    Consistent,
    GeographicOrProjected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    PlanimetricError,
    AltimetricError,
    Scale,
    Crs,
    GeometryValidity,
    OutlierRatio,
}

impl Criterion {
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::PlanimetricError => "planimetric_error",
            Criterion::AltimetricError => "altimetric_error",
            Criterion::Scale => "scale",
            Criterion::Crs => "crs",
            Criterion::GeometryValidity => "geometry_validity",
            Criterion::OutlierRatio => "outlier_ratio",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCriterion {
    pub criterion: Criterion,
    pub weight: f64,
    /// Recommendation when the criterion is not met
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
}

impl WeightedCriterion {
    pub fn new(criterion: Criterion, weight: f64) -> Self {
        Self { criterion, weight, advice: None }
    }

    pub fn with_advice(mut self, advice: impl Into<String>) -> Self {
        self.advice = Some(advice.into());
        self
    }
}

fn default_strict() -> bool {
    true
}

/// Requirements of one use case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseProfile {
    pub use_case: UseCase,

    // === Positional accuracy ===

    /// Metres
    pub max_planimetric_error: f64,
    /// Metres; `None` when heights do not matter
    #[serde(default)]
    pub max_altimetric_error: Option<f64>,

    /// Smallest acceptable scale denominator
    pub min_scale: u32,

    pub crs_requirement: CrsRequirement,

    // === Geometry ===

    /// When false, invalid geometries are tolerated
    #[serde(default = "default_strict")]
    pub strict_validity: bool,
    /// Share of features allowed to be outliers
    pub max_outlier_ratio: f64,

    /// Fraction of the maximum score needed to be suitable
    pub pass_threshold: f64,
    /// Score the verdict is measured against; the sum of weights when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    /// Evaluated in order
    pub criteria: Vec<WeightedCriterion>,
}

static BUILTIN: Lazy<Vec<UseCaseProfile>> =
    Lazy::new(|| UseCase::ALL.iter().map(|&u| UseCaseProfile::for_use_case(u)).collect());

impl UseCaseProfile {
    pub fn cadastral() -> Self {
        Self {
            use_case: UseCase::Cadastral,
            max_planimetric_error: 0.5,
            max_altimetric_error: Some(0.3),
            min_scale: 1000,
            crs_requirement: CrsRequirement::Official,
            strict_validity: true,
            max_outlier_ratio: 0.01,
            pass_threshold: 0.7,
            max_score: Some(6.0),
            criteria: vec![
                WeightedCriterion::new(Criterion::PlanimetricError, 1.5)
                    .with_advice("Reduce planimetric error with better calibration or reference data"),
                WeightedCriterion::new(Criterion::AltimetricError, 1.0)
                    .with_advice("Improve altimetric precision for cadastral use"),
                WeightedCriterion::new(Criterion::Scale, 1.5)
                    .with_advice("A scale of 1:1000 or above is required for cadastral use"),
                WeightedCriterion::new(Criterion::Crs, 1.5)
                    .with_advice("Use the official MAGNA-SIRGAS coordinate system for cadastral use"),
                WeightedCriterion::new(Criterion::GeometryValidity, 0.5)
                    .with_advice("Correct invalid geometries before cadastral use"),
                WeightedCriterion::new(Criterion::OutlierRatio, 0.5)
                    .with_advice("Review and validate outliers before cadastral use"),
            ],
        }
    }

    pub fn engineering_survey() -> Self {
        Self {
            use_case: UseCase::EngineeringSurvey,
            max_planimetric_error: 2.0,
            max_altimetric_error: Some(1.0),
            min_scale: 500,
            crs_requirement: CrsRequirement::Any,
            strict_validity: true,
            max_outlier_ratio: 0.05,
            pass_threshold: 0.6,
            max_score: Some(5.0),
            criteria: vec![
                WeightedCriterion::new(Criterion::PlanimetricError, 1.5)
                    .with_advice("Verify the calibration of the measuring instruments"),
                WeightedCriterion::new(Criterion::Scale, 1.5)
                    .with_advice("A scale of 1:500 or above is required for engineering surveys"),
                WeightedCriterion::new(Criterion::Crs, 1.0)
                    .with_advice("Define a coordinate system for the survey"),
                WeightedCriterion::new(Criterion::GeometryValidity, 1.0).with_advice("Correct invalid geometries"),
            ],
        }
    }

    pub fn territorial_analysis() -> Self {
        Self {
            use_case: UseCase::TerritorialAnalysis,
            max_planimetric_error: 10.0,
            max_altimetric_error: None,
            min_scale: 10_000,
            crs_requirement: CrsRequirement::Consistent,
            strict_validity: true,
            max_outlier_ratio: 0.10,
            pass_threshold: 0.5,
            max_score: Some(4.0),
            criteria: vec![
                WeightedCriterion::new(Criterion::PlanimetricError, 1.5)
                    .with_advice("Consider more precise data for detailed territorial analysis"),
                WeightedCriterion::new(Criterion::Scale, 1.5)
                    .with_advice("Scale may be insufficient for detailed territorial analysis; check the source scale"),
                WeightedCriterion::new(Criterion::Crs, 1.0)
                    .with_advice("Define a consistent CRS for territorial analysis"),
            ],
        }
    }

    pub fn environmental_modeling() -> Self {
        Self {
            use_case: UseCase::EnvironmentalModeling,
            max_planimetric_error: 50.0,
            max_altimetric_error: None,
            min_scale: 25_000,
            crs_requirement: CrsRequirement::GeographicOrProjected,
            strict_validity: false,
            max_outlier_ratio: 0.20,
            pass_threshold: 0.5,
            max_score: Some(3.0),
            criteria: vec![
                WeightedCriterion::new(Criterion::PlanimetricError, 1.5)
                    .with_advice("Consider more precise data for detailed environmental modeling"),
                WeightedCriterion::new(Criterion::Scale, 1.5)
                    .with_advice("Scale may be insufficient for detailed modeling; check the source scale"),
                WeightedCriterion::new(Criterion::Crs, 1.0)
                    .with_advice("Define an appropriate CRS for environmental modeling"),
            ],
        }
    }

    pub fn for_use_case(use_case: UseCase) -> Self {
        match use_case {
            UseCase::Cadastral => Self::cadastral(),
            UseCase::EngineeringSurvey => Self::engineering_survey(),
            UseCase::TerritorialAnalysis => Self::territorial_analysis(),
            UseCase::EnvironmentalModeling => Self::environmental_modeling(),
        }
    }

    /// The four built-in profiles, in [`UseCase::ALL`] order.
    pub fn builtin() -> &'static [UseCaseProfile] {
        &BUILTIN
    }

    /// Load profile from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, GeodiagError> {
        let profile: Self = serde_yaml::from_str(yaml)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), GeodiagError> {
        let bad = |msg: String| Err(GeodiagError::ConfigError(format!("{}: {}", self.use_case, msg)));
        if self.criteria.is_empty() {
            return bad("no criteria".to_string());
        }
        if let Some(c) = self.criteria.iter().find(|c| !(c.weight.is_finite() && c.weight > 0.0)) {
            return bad(format!("weight of {} must be positive, got {}", c.criterion.name(), c.weight));
        }
        if !(self.pass_threshold > 0.0 && self.pass_threshold <= 1.0) {
            return bad(format!("pass_threshold must be in (0, 1], got {}", self.pass_threshold));
        }
        if !(self.max_outlier_ratio >= 0.0 && self.max_outlier_ratio <= 1.0) {
            return bad(format!("max_outlier_ratio must be in [0, 1], got {}", self.max_outlier_ratio));
        }
        if let Some(max) = self.max_score.filter(|m| !(m.is_finite() && *m > 0.0)) {
            return bad(format!("max_score must be positive, got {}", max));
        }
        Ok(())
    }

    /// Declared maximum, else the sum of criterion weights. Weights may add
    /// up to more than the declared maximum; percentages are clamped.
    pub fn max_score(&self) -> f64 {
        self.max_score
            .unwrap_or_else(|| self.criteria.iter().map(|c| c.weight).sum())
    }

    /// Score needed to be suitable
    pub fn pass_score(&self) -> f64 {
        self.pass_threshold * self.max_score()
    }
}

impl Default for UseCaseProfile {
    fn default() -> Self {
        Self::cadastral()
    }
}
