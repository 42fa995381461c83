//! Geometric Validator: validity, outliers and basic statistics
use crate::outliers::{detect_outliers, OutlierRecord};
use crate::validity::{check_geometry, GeometryError};
use geodiag_core::finite::clean;
use geodiag_core::measures::area;
use geodiag_core::{DiagnosticContext, Extent, GeometryCollection, MeasurementFrame, Reprojector};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationStatistics {
    pub num_features: usize,
    pub extent: Option<Extent>,
    /// Total polygon area in the measurement frame, square metres
    #[serde(with = "geodiag_core::finite::option", default)]
    pub area_estimated: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<GeometryError>,
    pub outliers: Vec<OutlierRecord>,
    pub warnings: Vec<String>,
    pub statistics: ValidationStatistics,
}

impl ValidationReport {
    /// Report of a collection nothing could be checked on.
    pub fn trivially_valid(num_features: usize) -> Self {
        Self {
            is_valid: true,
            statistics: ValidationStatistics { num_features, ..Default::default() },
            ..Default::default()
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn outlier_count(&self) -> usize {
        self.outliers.len()
    }
}

pub struct GeometricValidator<'a> {
    reprojector: &'a dyn Reprojector,
    ctx: &'a DiagnosticContext,
}

impl<'a> GeometricValidator<'a> {
    pub fn new(reprojector: &'a dyn Reprojector, ctx: &'a DiagnosticContext) -> Self {
        Self { reprojector, ctx }
    }

    pub fn validate(&self, collection: &GeometryCollection) -> ValidationReport {
        let frame = MeasurementFrame::build(collection, self.reprojector);
        self.validate_in_frame(collection, &frame)
    }

    /// Same as [`validate`](Self::validate) with a frame already built for
    /// `collection`.
    pub fn validate_in_frame(&self, collection: &GeometryCollection, frame: &MeasurementFrame) -> ValidationReport {
        let errors: Vec<GeometryError> = collection
            .geometries
            .iter()
            .enumerate()
            .filter_map(|(index, g)| match g {
                None => Some(GeometryError::null(index)),
                Some(g) => check_geometry(g).map(|reason| GeometryError::invalid(index, reason)),
            })
            .collect();

        let outliers = detect_outliers(collection, self.ctx);

        let mut warnings = Vec::new();
        if !outliers.is_empty() {
            warnings.push(format!("{} spatial outliers detected", outliers.len()));
        }

        let area_estimated = if frame.is_metric() {
            clean(frame.collection.present().map(|(_, g)| area(g)).sum())
        } else {
            warnings.push(format!("area not estimated: {}", frame.note));
            None
        };

        debug!(errors = errors.len(), outliers = outliers.len(), "geometry validated");
        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
            outliers,
            warnings,
            statistics: ValidationStatistics {
                num_features: collection.len(),
                extent: collection.extent(),
                area_estimated,
            },
        }
    }
}
