//! Feature extraction: a flat, ordered numeric view of a snapshot and its
//! diagnosis, ready for an external classifier.
use crate::record::DiagnosticRecord;
use geodiag_core::crs::{self, WGS84};
use geodiag_core::measures::{area, length};
use geodiag_core::{GeometryCollection, GeometryKind, MeasurementFrame, Reprojector};
use geodiag_inference::positional::population_std;
use std::collections::BTreeMap;

pub type FeatureMap = BTreeMap<String, f64>;

#[derive(Default)]
struct Features(FeatureMap);

impl Features {
    /// Non-finite values are left out.
    fn put(&mut self, name: &str, value: f64) {
        if value.is_finite() {
            self.0.insert(name.to_string(), value);
        }
    }

    fn flag(&mut self, name: &str, on: bool) {
        self.put(name, if on { 1.0 } else { 0.0 });
    }
}

/// Features of `collection`, plus analysis features when a record is given.
/// Empty collections yield only the analysis part.
pub fn extract_features(
    collection: &GeometryCollection,
    record: Option<&DiagnosticRecord>,
    reprojector: &dyn Reprojector,
) -> FeatureMap {
    let mut f = Features::default();
    if !collection.is_empty() {
        geometric(&mut f, collection, reprojector);
        coordinates(&mut f, collection);
    }
    if let Some(record) = record {
        analysis(&mut f, record);
    }
    f.0
}

fn geometric(f: &mut Features, collection: &GeometryCollection, reprojector: &dyn Reprojector) {
    f.put("num_features", collection.len() as f64);
    for (name, kind) in [
        ("num_points", GeometryKind::Point),
        ("num_linestrings", GeometryKind::LineString),
        ("num_polygons", GeometryKind::Polygon),
        ("num_multipoints", GeometryKind::MultiPoint),
        ("num_multilinestrings", GeometryKind::MultiLineString),
        ("num_multipolygons", GeometryKind::MultiPolygon),
    ] {
        f.put(name, collection.present().filter(|(_, g)| g.kind() == kind).count() as f64);
    }

    let frame = MeasurementFrame::build(collection, reprojector);
    let areas: Vec<f64> = frame.collection.present().map(|(_, g)| area(g)).collect();
    f.put("total_area", areas.iter().sum());
    f.put("mean_area", mean(&areas).unwrap_or(0.0));
    f.put("std_area", population_std(&areas).unwrap_or(0.0));

    let lengths: Vec<f64> = frame
        .collection
        .present()
        .filter(|(_, g)| !g.is_puntal())
        .map(|(_, g)| length(g))
        .collect();
    f.put("mean_length", mean(&lengths).unwrap_or(0.0));
    f.put("std_length", population_std(&lengths).unwrap_or(0.0));

    let total_vertices: usize = collection.present().map(|(_, g)| g.vertex_count()).sum();
    f.put("total_vertices", total_vertices as f64);
    f.put("vertices_per_feature", total_vertices as f64 / collection.len() as f64);
}

fn coordinates(f: &mut Features, collection: &GeometryCollection) {
    if let Some(e) = collection.extent() {
        f.put("min_x", e.min_x);
        f.put("min_y", e.min_y);
        f.put("max_x", e.max_x);
        f.put("max_y", e.max_y);
        f.put("width", e.width());
        f.put("height", e.height());
        f.put("center_x", (e.min_x + e.max_x) / 2.0);
        f.put("center_y", (e.min_y + e.max_y) / 2.0);
    }

    let coords = collection.usable_vertices();
    let xs: Vec<f64> = coords.iter().map(|c| c.x).collect();
    let ys: Vec<f64> = coords.iter().map(|c| c.y).collect();
    f.put("mean_x", mean(&xs).unwrap_or(0.0));
    f.put("mean_y", mean(&ys).unwrap_or(0.0));
    f.put("std_x", population_std(&xs).unwrap_or(0.0));
    f.put("std_y", population_std(&ys).unwrap_or(0.0));
}

fn analysis(f: &mut Features, record: &DiagnosticRecord) {
    let detected = record.crs.crs();
    f.flag("has_crs", detected.is_some());
    f.flag("crs_is_official", detected.is_some_and(crs::is_official));
    f.flag("crs_is_wgs84", detected.is_some_and(|id| crs::same_crs(id, WGS84)));
    f.put("crs_confidence", record.crs.confidence());

    f.put("estimated_scale", record.scale.value.map(f64::from).unwrap_or(0.0));
    f.flag("has_scale", record.scale.value.is_some());
    f.put("planimetric_error", record.planimetric_error.value.unwrap_or(0.0));
    f.flag("has_planimetric_error", record.planimetric_error.value.is_some());
    f.put("altimetric_error", record.altimetric_error.value.unwrap_or(0.0));
    f.flag("has_altimetric_error", record.altimetric_error.value.is_some());

    f.put("num_validation_errors", record.validation.error_count() as f64);
    f.put("num_outliers", record.validation.outlier_count() as f64);
    f.flag("is_valid", record.validation.is_valid);
    f.put("quality_score", record.quality.score);
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
