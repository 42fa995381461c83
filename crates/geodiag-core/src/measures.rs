//! Planar measures over the data model, computed with `geo`.
//!
//! Everything here works on raw `x`/`y` values. Callers that need metric
//! answers run these on a measurement frame (see [`crate::frame`]).

use crate::data_model::{to_line_string, Coord, Geometry};
use geo::{Area, Centroid, EuclideanDistance, EuclideanLength};

/// Length of linear parts plus polygon exterior perimeters. Points have none.
pub fn length(geom: &Geometry) -> f64 {
    match geom {
        Geometry::Point(_) | Geometry::MultiPoint(_) => 0.0,
        Geometry::LineString(line) => to_line_string(line).euclidean_length(),
        Geometry::MultiLineString(lines) => lines.iter().map(|l| to_line_string(l).euclidean_length()).sum(),
        Geometry::Polygon(poly) => to_line_string(&poly.exterior).euclidean_length(),
        Geometry::MultiPolygon(polys) => polys.iter().map(|p| to_line_string(&p.exterior).euclidean_length()).sum(),
    }
}

/// Polygon area net of holes; zero for points and lines.
pub fn area(geom: &Geometry) -> f64 {
    match geom {
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => geom.to_geo().unsigned_area(),
        _ => 0.0,
    }
}

/// Representative point of a geometry.
///
/// Polygons use their area centroid, lines the length-weighted midpoint of
/// their segments, points the vertex mean. A non-finite answer falls back to
/// the mean of the finite vertices; `None` when there are none.
pub fn centroid(geom: &Geometry) -> Option<Coord> {
    geom.to_geo()
        .centroid()
        .map(|p| Coord::from(p.0))
        .filter(Coord::is_finite)
        .or_else(|| vertex_mean(geom.vertices()))
}

pub fn vertex_mean<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Option<Coord> {
    let (mut sx, mut sy, mut n) = (0.0, 0.0, 0usize);
    for c in coords.into_iter().filter(|c| c.is_finite()) {
        sx += c.x;
        sy += c.y;
        n += 1;
    }
    (n > 0).then(|| Coord::new(sx / n as f64, sy / n as f64))
}

/// Minimum planar distance between two geometries; zero when they touch,
/// cross or one lies inside the other's area. NaN if either has no vertex.
pub fn distance(a: &Geometry, b: &Geometry) -> f64 {
    if a.vertex_count() == 0 || b.vertex_count() == 0 {
        return f64::NAN;
    }
    a.to_geo().euclidean_distance(&b.to_geo())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::Polygon;

    fn square(x0: f64, y0: f64, side: f64) -> Polygon {
        Polygon::new(vec![
            Coord::new(x0, y0),
            Coord::new(x0 + side, y0),
            Coord::new(x0 + side, y0 + side),
            Coord::new(x0, y0 + side),
            Coord::new(x0, y0),
        ])
    }

    #[test]
    fn test_area_and_length() {
        let poly = Geometry::Polygon(square(0.0, 0.0, 10.0));
        assert_eq!(area(&poly), 100.0);
        assert_eq!(length(&poly), 40.0);

        let holed = Geometry::Polygon(square(0.0, 0.0, 10.0).with_interior(square(2.0, 2.0, 2.0).exterior));
        assert_eq!(area(&holed), 96.0);

        let line = Geometry::LineString(vec![Coord::new(0.0, 0.0), Coord::new(3.0, 4.0)]);
        assert_eq!(length(&line), 5.0);
        assert_eq!(area(&line), 0.0);
    }

    #[test]
    fn test_centroid() {
        let c = centroid(&Geometry::Polygon(square(0.0, 0.0, 2.0))).unwrap();
        assert!((c.x - 1.0).abs() < 1e-12 && (c.y - 1.0).abs() < 1e-12);

        let mp = Geometry::MultiPoint(vec![Coord::new(0.0, 0.0), Coord::new(4.0, 2.0)]);
        assert_eq!(centroid(&mp), Some(Coord::new(2.0, 1.0)));

        let bad = Geometry::Point(Coord::new(f64::NAN, 1.0));
        assert_eq!(centroid(&bad), None);
    }

    #[test]
    fn test_distance() {
        let p = Geometry::Point(Coord::new(0.0, 0.0));
        let q = Geometry::Point(Coord::new(3.0, 4.0));
        assert_eq!(distance(&p, &q), 5.0);

        let sq = Geometry::Polygon(square(0.0, 0.0, 10.0));
        let inside = Geometry::Point(Coord::new(5.0, 5.0));
        assert_eq!(distance(&sq, &inside), 0.0);

        let line = Geometry::LineString(vec![Coord::new(12.0, 0.0), Coord::new(12.0, 10.0)]);
        assert_eq!(distance(&sq, &line), 2.0);
    }

    #[test]
    fn test_empty_geometry_has_no_distance() {
        let p = Geometry::Point(Coord::new(0.0, 0.0));
        assert!(distance(&p, &Geometry::MultiPoint(vec![])).is_nan());
    }
}
