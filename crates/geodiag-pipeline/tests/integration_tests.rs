//! End-to-end diagnoses through the default runner.

use geodiag_core::{Coord, Geometry, GeometryCollection, Polygon, Reprojector, TransverseMercatorReprojector};
use geodiag_inference::{DisplacementCheck, OriginClass};
use geodiag_pipeline::{diagnose, extract_features, DiagnosticConfig, DiagnosticRunner, METHOD_EMPTY};
use geodiag_quality::{Tier, UseCase};
use geodiag_validation::{Axis, OutlierRecord};

fn points(coords: &[(f64, f64)]) -> GeometryCollection {
    GeometryCollection::from_geometries(coords.iter().map(|&(x, y)| Geometry::Point(Coord::new(x, y))))
}

/// Ten points spread over [-76, -74] x [5, 7].
fn antioquia_points() -> GeometryCollection {
    points(&[
        (-76.0, 5.0),
        (-75.8, 5.4),
        (-75.5, 6.1),
        (-75.2, 5.7),
        (-75.0, 6.0),
        (-74.8, 6.5),
        (-74.6, 5.2),
        (-74.4, 6.8),
        (-74.2, 6.3),
        (-74.0, 7.0),
    ])
}

/// A row of 20 x 30 m parcels in MAGNA-SIRGAS / Bogota.
fn parcels() -> GeometryCollection {
    let parcel = |x0: f64| {
        Geometry::Polygon(Polygon::new(vec![
            Coord::new(x0, 1_000_000.0),
            Coord::new(x0 + 20.0, 1_000_000.0),
            Coord::new(x0 + 20.0, 1_000_030.0),
            Coord::new(x0, 1_000_030.0),
            Coord::new(x0, 1_000_000.0),
        ]))
    };
    GeometryCollection::from_geometries((0..8).map(|i| parcel(1_000_000.0 + 25.0 * i as f64))).with_crs("EPSG:3116")
}

// =============================================================================
// CRS
// =============================================================================

#[test]
fn test_declared_crs_is_kept() {
    let record = diagnose(&parcels());
    assert_eq!(record.crs.crs(), Some("EPSG:3116"));
    assert_eq!(record.crs.confidence(), 0.9);
    assert_eq!(record.crs.result.method, "metadata_existente");
    assert_eq!(record.declared_crs.as_deref(), Some("EPSG:3116"));
    assert_eq!(record.origin.value, Some(OriginClass::Official));
    assert_eq!(record.origin_name.as_deref(), Some("MAGNA-SIRGAS"));
}

#[test]
fn test_colombia_extent_without_crs() {
    let record = diagnose(&points(&[(-79.0, 4.0), (-67.0, 4.0), (-67.0, 12.0), (-79.0, 12.0)]));
    assert!(record.crs.crs().is_some());
    assert!(record.crs.confidence() >= 0.8);
}

#[test]
fn test_antioquia_points_resolve_to_bogota_zone() {
    let record = diagnose(&antioquia_points());
    assert_eq!(record.crs.crs(), Some("EPSG:3116"));
    assert!((0.8..=1.0).contains(&record.crs.confidence()));
    assert!(record.crs.result.method.contains("boundary_match"));
    assert!(!record.crs.candidates.is_empty());
}

#[test]
fn test_identity_reprojection_keeps_identifier() {
    let gc = parcels();
    let same = TransverseMercatorReprojector.reproject(&gc, "EPSG:3116").unwrap();
    assert_eq!(same.crs.as_deref(), Some("EPSG:3116"));
    assert_eq!(same.geometries, gc.geometries);
}

// =============================================================================
// Validation and quality
// =============================================================================

#[test]
fn test_collinear_points_with_far_outlier() {
    let gc = points(&[(10.0, 3.0), (11.0, 3.0), (12.0, 3.0), (13.0, 3.0), (500.0, 3.0)]);
    let record = diagnose(&gc);
    let outliers = &record.validation.outliers;
    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0].index, 4);
    assert_eq!(outliers[0].axis, Axis::X);
    assert!(record.quality.recommendations.contains(&"Review and validate the detected outliers".to_string()));
}

#[test]
fn test_scores_stay_in_range() {
    for gc in [antioquia_points(), parcels(), points(&[(1.0, 1.0), (1e7, -1e7)])] {
        let record = diagnose(&gc);
        assert!((0.0..=1.0).contains(&record.crs.confidence()));
        assert!((0.0..=1.0).contains(&record.quality.score));
        assert_eq!(record.quality.tier, Tier::from_score(record.quality.score));
        assert_eq!(record.use_cases.len(), 4);
        for v in &record.use_cases {
            assert!((0.0..=100.0).contains(&v.percentage));
        }
    }
}

// =============================================================================
// Degenerate input
// =============================================================================

#[test]
fn test_empty_collection() {
    let record = diagnose(&GeometryCollection::default());
    assert_eq!(record.crs.crs(), None);
    assert_eq!(record.crs.result.method, METHOD_EMPTY);
    assert_eq!(record.units.value, None);
    assert_eq!(record.origin.value, None);
    assert_eq!(record.scale.value, None);
    assert_eq!(record.planimetric_error.value, None);
    assert_eq!(record.altimetric_error.value, None);
    assert_eq!(record.validation.statistics.num_features, 0);
    assert!(record.validation.is_valid);
    assert_eq!(record.quality.tier, Tier::Rojo);
    assert_eq!(record.quality.score, 0.0);
    assert!(record.use_cases.iter().all(|v| !v.suitable));
}

#[test]
fn test_only_null_geometries() {
    let record = diagnose(&GeometryCollection::new(vec![None, None, None], None));
    assert_eq!(record.validation.statistics.num_features, 3);
    assert_eq!(record.quality.tier, Tier::Rojo);
}

// =============================================================================
// Record
// =============================================================================

#[test]
fn test_diagnosis_is_deterministic() {
    let a = diagnose(&antioquia_points());
    let b = diagnose(&antioquia_points());
    assert!(a.same_outcome(&b));
    assert!(!a.same_outcome(&diagnose(&parcels())));
}

#[test]
fn test_non_finite_values_serialize_as_unknown() {
    let mut record = diagnose(&parcels());
    record.quality.score = f64::NAN;
    let json: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
    assert_eq!(json["quality"]["score"], "unknown");
    assert_eq!(json["crs"]["method"], "metadata_existente");
    assert_eq!(json["quality"]["tier"], "VERDE");

    record.planimetric_error.value = Some(f64::INFINITY);
    let record = record.sanitize();
    assert_eq!(record.planimetric_error.value, None);
}

#[test]
fn test_non_finite_outlier_serializes_as_unknown() {
    let mut record = diagnose(&parcels());
    record.validation.outliers.push(OutlierRecord {
        index: 3,
        axis: Axis::X,
        value: f64::INFINITY,
        bounds: (f64::NAN, 12.0),
    });
    let json: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
    let last = json["validation"]["outliers"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["value"], "unknown");
    assert_eq!(last["bounds"][0], "unknown");
    assert_eq!(last["bounds"][1], 12.0);
}

#[test]
fn test_features_with_record() {
    let gc = parcels();
    let record = diagnose(&gc);
    let features = extract_features(&gc, Some(&record), &TransverseMercatorReprojector);
    assert_eq!(features["num_polygons"], 8.0);
    assert_eq!(features["total_area"], 8.0 * 600.0);
    assert_eq!(features["has_crs"], 1.0);
    assert_eq!(features["crs_is_official"], 1.0);
    assert_eq!(features["crs_is_wgs84"], 0.0);
    assert_eq!(features["quality_score"], record.quality.score);
}

// =============================================================================
// Custom runner
// =============================================================================

struct AlwaysShifted;

impl DisplacementCheck for AlwaysShifted {
    fn is_displaced(&self, _: &GeometryCollection) -> bool {
        true
    }
}

#[test]
fn test_displacement_check_marks_local_origin() {
    // outside every configured country
    let gc = points(&[(2.0, 41.0), (2.5, 41.5), (3.0, 42.0)]);
    let record = DiagnosticRunner::default().with_displacement_check(AlwaysShifted).diagnose(&gc);
    assert_eq!(record.crs.crs(), Some("EPSG:4326"));
    assert_eq!(record.origin.value, Some(OriginClass::Local));
}

#[test]
fn test_custom_profiles() {
    let config = DiagnosticConfig::default().with_profiles(vec![geodiag_quality::UseCaseProfile::territorial_analysis()]);
    let record = DiagnosticRunner::new(config).diagnose(&parcels());
    assert_eq!(record.use_cases.len(), 1);
    assert!(record.use_case(UseCase::TerritorialAnalysis).is_some());
    assert!(record.use_case(UseCase::Cadastral).is_none());
}
