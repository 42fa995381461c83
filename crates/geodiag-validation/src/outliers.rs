//! IQR spatial outliers over representative points
use geodiag_core::measures::centroid;
use geodiag_core::{DiagnosticContext, GeometryCollection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierRecord {
    /// Position of the geometry in the collection
    pub index: usize,
    pub axis: Axis,
    #[serde(with = "geodiag_core::finite")]
    pub value: f64,
    /// `(lower, upper)` fences
    #[serde(with = "geodiag_core::finite::pair")]
    pub bounds: (f64, f64),
}

/// Percentile with linear interpolation between closest ranks.
/// `sorted` must be ascending and non-empty; `p` is in [0, 1].
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// `(lower, upper)` fences of `values` for multiplier `k`.
pub fn iqr_fences(values: &[f64], k: f64) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let q1 = percentile(&sorted, 0.25);
    let q3 = percentile(&sorted, 0.75);
    let iqr = q3 - q1;
    Some((q1 - k * iqr, q3 + k * iqr))
}

/// Flags representative points outside the IQR fences, each axis on its own.
///
/// Points are the geometry itself for a point, its centroid otherwise.
pub fn detect_outliers(collection: &GeometryCollection, ctx: &DiagnosticContext) -> Vec<OutlierRecord> {
    let reps: Vec<(usize, f64, f64)> = collection
        .present()
        .filter_map(|(i, g)| centroid(g).map(|c| (i, c.x, c.y)))
        .collect();
    if reps.len() < ctx.min_outlier_features {
        return Vec::new();
    }

    let mut out = Vec::new();
    for axis in [Axis::X, Axis::Y] {
        let values: Vec<f64> = reps
            .iter()
            .map(|&(_, x, y)| if axis == Axis::X { x } else { y })
            .collect();
        let Some((lower, upper)) = iqr_fences(&values, ctx.iqr_factor) else {
            continue;
        };
        for (&(index, _, _), &value) in reps.iter().zip(&values) {
            if value < lower || value > upper {
                out.push(OutlierRecord { index, axis, value, bounds: (lower, upper) });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodiag_core::{Coord, Geometry};

    #[test]
    fn test_percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&v, 0.25), 1.75);
        assert_eq!(percentile(&v, 0.75), 3.25);
        assert_eq!(percentile(&[5.0], 0.5), 5.0);
    }

    #[test]
    fn test_far_x_outlier_only() {
        let gc = GeometryCollection::from_geometries(
            [0.0, 1.0, 2.0, 3.0, 100.0].map(|x| Geometry::Point(Coord::new(x, 7.0))),
        );
        let found = detect_outliers(&gc, &DiagnosticContext::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].index, 4);
        assert_eq!(found[0].axis, Axis::X);
        assert_eq!(found[0].bounds, (-2.0, 6.0));
    }

    #[test]
    fn test_index_counts_null_entries() {
        let mut geoms: Vec<Option<Geometry>> = [0.0, 1.0, 2.0, 3.0].map(|x| Some(Geometry::Point(Coord::new(x, 0.0)))).into();
        geoms.insert(1, None);
        geoms.push(Some(Geometry::Point(Coord::new(50.0, 0.0))));
        let found = detect_outliers(&GeometryCollection::new(geoms, None), &DiagnosticContext::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].index, 5);
    }

    #[test]
    fn test_record_with_infinite_fence_serializes() {
        let record = OutlierRecord { index: 2, axis: Axis::Y, value: f64::NAN, bounds: (f64::NEG_INFINITY, 4.0) };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["value"], "unknown");
        assert_eq!(json["bounds"], serde_json::json!(["unknown", 4.0]));
        let back: OutlierRecord = serde_json::from_value(json).unwrap();
        assert!(back.value.is_nan());
        assert_eq!(back.bounds.1, 4.0);
    }

    #[test]
    fn test_too_few_features() {
        let gc = GeometryCollection::from_geometries([0.0, 1.0, 100.0].map(|x| Geometry::Point(Coord::new(x, 0.0))));
        assert!(detect_outliers(&gc, &DiagnosticContext::default()).is_empty());
    }
}
