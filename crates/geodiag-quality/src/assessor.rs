//! Quality Assessor
//!
//! Folds CRS confidence, geometry validity, outliers and unit detection into
//! a score in [0, 1] and a traffic-light tier (ROJO, AMARILLO, VERDE).

use crate::signals::Signals;
use geodiag_core::crs;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Rojo,
    Amarillo,
    Verde,
}

impl Tier {
    pub const AMARILLO_FROM: f64 = 0.4;
    pub const VERDE_FROM: f64 = 0.7;

    /// NaN lands in `Rojo`.
    pub fn from_score(score: f64) -> Self {
        if score >= Self::VERDE_FROM {
            Tier::Verde
        } else if score >= Self::AMARILLO_FROM {
            Tier::Amarillo
        } else {
            Tier::Rojo
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            Tier::Verde => "The data meet the criteria for reliable use.",
            Tier::Amarillo => "The data are usable with caution once the listed issues are reviewed.",
            Tier::Rojo => "The data need manual review before any use.",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Tier::Rojo => "ROJO",
            Tier::Amarillo => "AMARILLO",
            Tier::Verde => "VERDE",
        };
        write!(f, "{}", s)
    }
}

/// Single check result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    /// Contribution to the score, negative for penalties
    #[serde(with = "geodiag_core::finite")]
    pub impact: f64,
}

impl Check {
    pub(crate) fn new(name: &str, status: CheckStatus, message: impl Into<String>, impact: f64) -> Self {
        Self { name: name.to_string(), status, message: message.into(), impact }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityVerdict {
    pub tier: Tier,
    #[serde(with = "geodiag_core::finite")]
    pub score: f64,
    pub reasons: Vec<String>,
    pub recommendations: Vec<String>,
    pub technical_explanation: String,
    pub checks: Vec<Check>,
}

impl QualityVerdict {
    /// Verdict for input nothing could be measured on.
    pub fn unassessable(reason: impl Into<String>) -> Self {
        let tier = Tier::Rojo;
        Self {
            tier,
            score: 0.0,
            reasons: vec![reason.into()],
            recommendations: MANUAL_REVIEW.iter().map(|s| s.to_string()).collect(),
            technical_explanation: format!("No usable coordinates. Quality tier {} (score 0.00). {}", tier, tier.summary()),
            checks: Vec::new(),
        }
    }
}

const MANUAL_REVIEW: [&str; 2] = [
    "Review the CRS and coordinates manually",
    "Verify the data source and its original metadata",
];

pub fn assess_quality(signals: &Signals) -> QualityVerdict {
    let mut checks = Vec::new();

    // === CRS ===
    let confidence = signals.crs.confidence;
    let crs_label = signals.crs_id().unwrap_or("undetermined");
    checks.push(if confidence >= 0.8 {
        Check::new("crs_confidence", CheckStatus::Ok, format!("CRS {} detected with high confidence ({:.2})", crs_label, confidence), 0.4)
    } else if confidence >= 0.6 {
        Check::new("crs_confidence", CheckStatus::Warn, format!("CRS {} detected with moderate confidence ({:.2})", crs_label, confidence), 0.25)
    } else {
        Check::new("crs_confidence", CheckStatus::Fail, format!("CRS {} has low confidence ({:.2})", crs_label, confidence), 0.0)
    });

    // === Geometry ===
    let errors = signals.error_count();
    checks.push(if errors == 0 {
        Check::new("geometry_validity", CheckStatus::Ok, "All geometries are valid", 0.3)
    } else {
        let penalty = 0.2 * (errors as f64 / 10.0).min(1.0);
        Check::new("geometry_validity", CheckStatus::Fail, format!("{} invalid geometries", errors), -penalty)
    });

    let outliers = signals.outlier_count();
    checks.push(if outliers == 0 {
        Check::new("spatial_outliers", CheckStatus::Ok, "No spatial outliers detected", 0.2)
    } else {
        let penalty = (outliers as f64 / 20.0).min(0.2);
        Check::new("spatial_outliers", CheckStatus::Warn, format!("{} spatial outliers detected", outliers), -penalty)
    });

    // === Units ===
    checks.push(match signals.units.value {
        Some(unit) => Check::new("units", CheckStatus::Ok, format!("Units detected: {}", unit), 0.1),
        None => Check::new("units", CheckStatus::Warn, "Units could not be determined", 0.0),
    });

    let raw: f64 = checks.iter().map(|c| c.impact).sum();
    let score = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };
    let tier = Tier::from_score(score);

    let mut recommendations: Vec<String> = Vec::new();
    if score < Tier::AMARILLO_FROM {
        recommendations.extend(MANUAL_REVIEW.iter().map(|s| s.to_string()));
    }
    if errors > 0 {
        recommendations.push("Correct invalid geometries before using the data".to_string());
    }
    if outliers > 0 {
        recommendations.push("Review and validate the detected outliers".to_string());
    }
    if signals.crs_id().is_some_and(crs::is_official) {
        recommendations.push("Data in the official MAGNA-SIRGAS frame, suitable for use in Colombia".to_string());
    }
    if score >= Tier::VERDE_FROM {
        recommendations.push("Data reliable for spatial analysis".to_string());
    }

    debug!(tier = %tier, score, "quality assessed");
    QualityVerdict {
        tier,
        score,
        reasons: checks.iter().map(|c| c.message.clone()).collect(),
        recommendations,
        technical_explanation: explain(signals, tier, score),
        checks,
    }
}

fn explain(signals: &Signals, tier: Tier, score: f64) -> String {
    let crs = match signals.crs_id() {
        Some(id) => format!("{} ({}, confidence {:.2})", id, crs::display_name(id), signals.crs.confidence),
        None => "undetermined".to_string(),
    };
    let origin = signals.origin.value.map(|o| o.datum_name()).unwrap_or("undetermined");
    let units = signals.units.value.map(|u| u.to_string()).unwrap_or_else(|| "undetermined".to_string());
    format!(
        "CRS: {}. Geodetic origin: {}. Units: {}. Quality tier {} (score {:.2}). {}",
        crs,
        origin,
        units,
        tier,
        score,
        tier.summary()
    )
}
