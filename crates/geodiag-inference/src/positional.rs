//! Error Calculator: planimetric and altimetric error magnitudes
//!
//! All values are in the units of the collection passed in, which should be
//! a metric measurement frame.

use geodiag_core::measures::distance;
use geodiag_core::{DiagnosticContext, GeometryCollection, InferenceResult};
use tracing::debug;

pub const METHOD_STD: &str = "std_deviation";
pub const METHOD_SCALE: &str = "scale_based";
pub const METHOD_CONSISTENCY: &str = "consistency_analysis";

/// Population standard deviation.
pub fn population_std(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(var.sqrt())
}

/// Median of an unsorted sample.
fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

/// Spread of the vertices, clamped to 1 % of the extent when it exceeds
/// 10 % of it.
fn std_estimate(collection: &GeometryCollection) -> Option<(f64, String)> {
    let vertices = collection.usable_vertices();
    if vertices.len() < 2 {
        return None;
    }
    let xs: Vec<f64> = vertices.iter().map(|c| c.x).collect();
    let ys: Vec<f64> = vertices.iter().map(|c| c.y).collect();
    let spread = population_std(&xs)?.hypot(population_std(&ys)?);

    let max_extent = collection.extent().map(|e| e.max_span()).unwrap_or(0.0);
    if spread > 0.1 * max_extent {
        let clamped = 0.01 * max_extent;
        return Some((
            clamped,
            format!("vertex spread {:.2} exceeds 10% of the extent, clamped to {:.2}", spread, clamped),
        ));
    }
    Some((spread, format!("vertex spread over {} vertices", vertices.len())))
}

fn consistency_estimate(collection: &GeometryCollection, ctx: &DiagnosticContext) -> Option<(f64, String)> {
    let geoms: Vec<_> = collection.present().map(|(_, g)| g).collect();
    let sample = geoms.len().min(ctx.consistency_sample);

    let mut distances = Vec::new();
    for i in 0..sample {
        let upto = (i + 1 + ctx.consistency_window).min(geoms.len());
        for other in &geoms[i + 1..upto] {
            let d = distance(geoms[i], other);
            if d.is_finite() && d > 0.0 {
                distances.push(d);
            }
        }
    }

    let min = distances.iter().copied().min_by(f64::total_cmp)?;
    if min < 0.1 {
        return Some((10.0 * min, format!("closest neighbour at {:.4}", min)));
    }
    let med = median(&mut distances)?;
    if med < 1.0 {
        return Some((0.5 * med, format!("median neighbour distance {:.4}", med)));
    }
    None
}

fn confidence_for(estimates: usize) -> f64 {
    (0.4 + 0.15 * estimates as f64).min(0.85)
}

/// Largest of the computable horizontal error estimates.
pub fn planimetric_error(
    collection: &GeometryCollection,
    scale: Option<u32>,
    ctx: &DiagnosticContext,
) -> InferenceResult<f64> {
    if !collection.has_usable_vertices() {
        return InferenceResult::undetermined(0.0, "empty_dataset", "no usable coordinates");
    }

    let estimates: Vec<(&str, f64, String)> = [
        std_estimate(collection).map(|(v, r)| (METHOD_STD, v, r)),
        scale.map(|s| (METHOD_SCALE, s as f64 / 2000.0, format!("scale 1:{} tolerance", s))),
        consistency_estimate(collection, ctx).map(|(v, r)| (METHOD_CONSISTENCY, v, r)),
    ]
    .into_iter()
    .flatten()
    .filter(|(_, v, _)| v.is_finite())
    .collect();

    let mut best: Option<&(&str, f64, String)> = None;
    for est in &estimates {
        if best.map(|b| est.1 > b.1).unwrap_or(true) {
            best = Some(est);
        }
    }

    let result = match best {
        Some((method, value, rationale)) => InferenceResult::determined(
            *value,
            confidence_for(estimates.len()),
            *method,
            format!("{} ({:.3} via {})", rationale, value, method),
        ),
        None => InferenceResult::undetermined(0.0, "no_method_available", "no planimetric estimate could be computed"),
    };
    debug!(error = ?result.value, method = %result.method, "planimetric error");
    result
}

/// Vertical error from the explicit Z values.
pub fn altimetric_error(collection: &GeometryCollection) -> InferenceResult<f64> {
    let zs: Vec<f64> = collection
        .vertices()
        .filter_map(|c| c.z)
        .filter(|z| z.is_finite())
        .collect();
    if zs.len() < 2 {
        return InferenceResult::undetermined(0.0, "no_z_data", "no altimetric (Z) data available");
    }

    let (lo, hi) = zs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), z| (lo.min(*z), hi.max(*z)));
    let range = hi - lo;
    let result = if range > 100.0 {
        InferenceResult::determined(
            0.01 * range,
            0.5,
            "relief_range",
            format!("1% of a {:.1} relief range over {} Z values", range, zs.len()),
        )
    } else {
        match population_std(&zs) {
            Some(std) => InferenceResult::determined(
                0.5 * std,
                0.6,
                "std_deviation_z",
                format!("computed from {} points with a Z coordinate", zs.len()),
            ),
            None => InferenceResult::undetermined(0.0, "no_z_data", "no altimetric (Z) data available"),
        }
    };
    debug!(error = ?result.value, method = %result.method, "altimetric error");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodiag_core::{Coord, Geometry};

    fn points(coords: &[(f64, f64)]) -> GeometryCollection {
        GeometryCollection::from_geometries(coords.iter().map(|&(x, y)| Geometry::Point(Coord::new(x, y))))
    }

    #[test]
    fn test_population_std() {
        assert_eq!(population_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), Some(2.0));
    }

    #[test]
    fn test_scale_estimate_wins_when_largest() {
        let gc = points(&[(0.0, 0.0), (0.0, 0.0)]);
        let r = planimetric_error(&gc, Some(1000), &DiagnosticContext::default());
        assert_eq!(r.value, Some(0.5));
        assert_eq!(r.method, METHOD_SCALE);
    }

    #[test]
    fn test_spread_is_clamped() {
        let gc = points(&[(0.0, 0.0), (100.0, 0.0)]);
        let r = planimetric_error(&gc, None, &DiagnosticContext::default());
        // spread 50 > 10 of a 100 extent, clamps to 1
        assert_eq!(r.value, Some(1.0));
        assert_eq!(r.method, METHOD_STD);
    }

    #[test]
    fn test_consistency_close_neighbours() {
        let gc = points(&[(0.0, 0.0), (0.05, 0.0), (0.5, 0.0)]);
        let r = planimetric_error(&gc, None, &DiagnosticContext::default());
        assert_eq!(r.method, METHOD_CONSISTENCY);
        assert!((r.value.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_method() {
        let r = planimetric_error(&GeometryCollection::default(), None, &DiagnosticContext::default());
        assert!(r.value.is_none());
    }

    #[test]
    fn test_altimetric() {
        let flat = GeometryCollection::from_geometries(vec![Geometry::Point(Coord::new(0.0, 0.0))]);
        assert_eq!(altimetric_error(&flat).method, "no_z_data");

        let relief = GeometryCollection::from_geometries(vec![Geometry::LineString(vec![
            Coord::xyz(0.0, 0.0, 100.0),
            Coord::xyz(1.0, 0.0, 400.0),
        ])]);
        let r = altimetric_error(&relief);
        assert_eq!(r.value, Some(3.0));
        assert_eq!(r.method, "relief_range");

        let gentle = GeometryCollection::from_geometries(vec![Geometry::LineString(vec![
            Coord::xyz(0.0, 0.0, 10.0),
            Coord::xyz(1.0, 0.0, 14.0),
        ])]);
        assert_eq!(altimetric_error(&gentle).value, Some(1.0));
    }
}
