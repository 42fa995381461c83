//! Measurement frame: a metric working copy of a collection.
use crate::crs::{self, MAGNA_BOGOTA, UTM_18N, WGS84};
use crate::data_model::GeometryCollection;
use crate::reproject::Reprojector;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Metric targets tried in order for geographic input.
pub const METRIC_TARGETS: &[&str] = &[MAGNA_BOGOTA, UTM_18N];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSource {
    /// Geographic input moved into a projected CRS
    Reprojected,
    /// Input already projected (or of unknown CRS), used as is
    Native,
    /// Geographic input that could not be moved; values are degrees
    RawFallback,
}

#[derive(Debug, Clone)]
pub struct MeasurementFrame {
    pub collection: GeometryCollection,
    /// CRS the collection was read in
    pub working_crs: Option<String>,
    pub source: FrameSource,
    pub note: String,
}

impl MeasurementFrame {
    /// Build the frame following the declared CRS, else WGS 84 when the
    /// extent looks geographic, else raw coordinates.
    ///
    /// Geometries with non-finite vertices are nulled out first.
    pub fn build(collection: &GeometryCollection, reprojector: &dyn Reprojector) -> Self {
        let collection = &collection.finite_only();
        let working_crs = match &collection.crs {
            Some(declared) => Some(crs::normalize_id(declared)),
            None => collection
                .extent()
                .filter(|e| e.is_geographic_range())
                .map(|_| WGS84.to_string()),
        };

        let Some(working) = working_crs.clone().filter(|id| crs::is_geographic(id)) else {
            return Self {
                collection: collection.clone(),
                note: match &working_crs {
                    Some(id) => format!("measured in {}", id),
                    None => "unknown CRS, raw coordinates treated as metric".to_string(),
                },
                working_crs,
                source: FrameSource::Native,
            };
        };

        let geographic = collection.clone().with_crs(working.clone());
        for target in METRIC_TARGETS {
            match reprojector.reproject(&geographic, target) {
                Ok(projected) => {
                    return Self {
                        collection: projected,
                        working_crs,
                        source: FrameSource::Reprojected,
                        note: format!("reprojected from {} to {}", working, target),
                    }
                }
                Err(e) => warn!(from = %working, to = %target, error = %e, "reprojection failed"),
            }
        }

        Self {
            collection: geographic,
            working_crs,
            source: FrameSource::RawFallback,
            note: format!("reprojection from {} failed, raw coordinates used", working),
        }
    }

    pub fn is_metric(&self) -> bool {
        self.source != FrameSource::RawFallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::{Coord, Geometry};
    use crate::error::TransformError;
    use crate::reproject::TransverseMercatorReprojector;

    struct Failing;

    impl Reprojector for Failing {
        fn reproject(&self, _: &GeometryCollection, target: &str) -> Result<GeometryCollection, TransformError> {
            Err(TransformError::UnsupportedCrs(target.to_string()))
        }
    }

    fn points(coords: &[(f64, f64)]) -> GeometryCollection {
        GeometryCollection::from_geometries(coords.iter().map(|&(x, y)| Geometry::Point(Coord::new(x, y))))
    }

    #[test]
    fn test_geographic_without_crs_is_reprojected() {
        let gc = points(&[(-74.1, 4.6), (-74.0, 4.7)]);
        let frame = MeasurementFrame::build(&gc, &TransverseMercatorReprojector);
        assert_eq!(frame.source, FrameSource::Reprojected);
        assert_eq!(frame.working_crs.as_deref(), Some("EPSG:4326"));
        assert_eq!(frame.collection.crs.as_deref(), Some("EPSG:3116"));
        let e = frame.collection.extent().unwrap();
        assert!(e.width() > 10_000.0);
    }

    #[test]
    fn test_projected_input_untouched() {
        let gc = points(&[(1_000_000.0, 1_000_000.0), (1_000_500.0, 1_000_100.0)]).with_crs("EPSG:3116");
        let frame = MeasurementFrame::build(&gc, &TransverseMercatorReprojector);
        assert_eq!(frame.source, FrameSource::Native);
        assert_eq!(frame.collection, gc);
    }

    #[test]
    fn test_failed_reprojection_falls_back_to_raw() {
        let gc = points(&[(-74.1, 4.6), (-74.0, 4.7)]);
        let frame = MeasurementFrame::build(&gc, &Failing);
        assert_eq!(frame.source, FrameSource::RawFallback);
        assert!(!frame.is_metric());
        assert!(frame.note.contains("raw coordinates"));
    }
}
