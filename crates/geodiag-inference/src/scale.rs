//! Scale Estimator
//!
//! Three independent estimates (vertex density, spatial resolution, extent)
//! each snapped to the standard ladder, then combined.

use crate::combiner::{combine, Estimate};
use crate::rule::{band, classify_above, classify_below, Band};
use geodiag_core::measures::{area, length};
use geodiag_core::{GeometryCollection, InferenceResult};
use tracing::debug;

pub const STANDARD_SCALES: [u32; 12] = [
    100, 200, 500, 1000, 2000, 5000, 10000, 25000, 50000, 100000, 250000, 500000,
];

const DENSITY_BANDS: [Band<u32>; 4] = [
    band(10.0, 500, 0.7),
    band(1.0, 2000, 0.6),
    band(0.1, 10000, 0.5),
    band(f64::NEG_INFINITY, 50000, 0.4),
];

const RESOLUTION_BANDS: [Band<u32>; 5] = [
    band(0.5, 500, 0.8),
    band(2.0, 2000, 0.7),
    band(5.0, 5000, 0.6),
    band(25.0, 25000, 0.5),
    band(f64::INFINITY, 100000, 0.4),
];

const EXTENT_BANDS: [Band<u32>; 5] = [
    band(1000.0, 1000, 0.7),
    band(5000.0, 5000, 0.6),
    band(10000.0, 25000, 0.5),
    band(50000.0, 50000, 0.5),
    band(f64::INFINITY, 100000, 0.4),
];

/// Nearest standard scale; ties resolve to the earlier ladder entry.
pub fn snap_to_standard(scale: f64) -> u32 {
    STANDARD_SCALES
        .iter()
        .copied()
        .min_by(|a, b| (*a as f64 - scale).abs().total_cmp(&(*b as f64 - scale).abs()))
        .unwrap_or(STANDARD_SCALES[0])
}

fn snapped(scale: u32, confidence: f64, method: &str, rationale: String) -> Estimate<u32> {
    Estimate::new(snap_to_standard(scale as f64), confidence, method, rationale)
}

/// Vertices per unit of perimeter length, or per unit of area when the
/// data has no linear extent.
pub fn vertex_density(collection: &GeometryCollection) -> Option<Estimate<u32>> {
    let vertices = collection.usable_vertices().len();
    if vertices == 0 {
        return None;
    }
    let total_length: f64 = collection.present().map(|(_, g)| length(g)).sum();
    let density = if total_length > 0.0 {
        vertices as f64 / total_length
    } else {
        let total_area: f64 = collection.present().map(|(_, g)| area(g)).sum();
        if total_area <= 0.0 {
            return None;
        }
        vertices as f64 / total_area
    };
    if !density.is_finite() {
        return None;
    }
    let (scale, confidence) = classify_above(density, &DENSITY_BANDS)?;
    Some(snapped(
        scale,
        confidence,
        "vertex_density",
        format!("vertex density {:.2} vertices/m suggests 1:{}", density, scale),
    ))
}

/// Smallest nonzero distance between consecutive vertices.
pub fn spatial_resolution(collection: &GeometryCollection) -> Option<Estimate<u32>> {
    let min_distance = collection
        .present()
        .flat_map(|(_, g)| g.paths())
        .flat_map(|p| p.windows(2).map(|w| w[0].distance(&w[1])).collect::<Vec<_>>())
        .filter(|d| d.is_finite() && *d > 0.0)
        .min_by(f64::total_cmp)?;
    let (scale, confidence) = classify_below(min_distance, &RESOLUTION_BANDS)?;
    Some(snapped(
        scale,
        confidence,
        "spatial_resolution",
        format!("minimum spatial resolution {:.2}m suggests 1:{}", min_distance, scale),
    ))
}

pub fn area_extent(collection: &GeometryCollection) -> Option<Estimate<u32>> {
    let max_extent = collection.extent()?.max_span();
    let (scale, confidence) = classify_below(max_extent, &EXTENT_BANDS)?;
    Some(snapped(
        scale,
        confidence,
        "area_extent",
        format!("maximum extent {:.0}m suggests 1:{}", max_extent, scale),
    ))
}

/// Estimate the capture scale denominator of an already metric collection.
pub fn estimate_scale(collection: &GeometryCollection) -> InferenceResult<u32> {
    if !collection.has_usable_vertices() {
        return InferenceResult::undetermined(0.0, "empty_dataset", "empty dataset, scale cannot be estimated");
    }

    let estimates: Vec<Estimate<u32>> = [vertex_density(collection), spatial_resolution(collection), area_extent(collection)]
        .into_iter()
        .flatten()
        .collect();

    let result = combine(&estimates).unwrap_or_else(|| {
        InferenceResult::undetermined(0.0, "no_estimation", "no method could estimate the scale")
    });
    debug!(scale = ?result.value, confidence = result.confidence, method = %result.method, "scale estimated");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodiag_core::{Coord, Geometry};

    #[test]
    fn test_snapping_idempotent() {
        for s in [1.0, 150.0, 740.0, 3500.0, 37500.0, 1e9] {
            let once = snap_to_standard(s);
            assert_eq!(snap_to_standard(once as f64), once);
        }
        // 150 is halfway between 100 and 200
        assert_eq!(snap_to_standard(150.0), 100);
    }

    #[test]
    fn test_dense_small_survey() {
        let line: Vec<Coord> = (0..50).map(|i| Coord::new(i as f64 * 0.1, 0.0)).collect();
        let gc = GeometryCollection::from_geometries(vec![Geometry::LineString(line)]);
        let r = estimate_scale(&gc);
        assert_eq!(r.value, Some(500));
        assert!(r.method.contains("vertex_density"));
        assert!(r.method.contains("spatial_resolution"));
    }

    #[test]
    fn test_empty() {
        let r = estimate_scale(&GeometryCollection::default());
        assert_eq!(r.value, None);
        assert_eq!(r.method, "empty_dataset");
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn test_single_point_uses_extent_only() {
        let gc = GeometryCollection::from_geometries(vec![Geometry::Point(Coord::new(5.0, 5.0))]);
        let r = estimate_scale(&gc);
        assert_eq!(r.value, Some(1000));
        assert_eq!(r.method, "area_extent");
    }
}
