//! Per-geometry validity checks
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::EuclideanLength;
use geodiag_core::data_model::to_line_string;
use geodiag_core::{Coord, Geometry, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryErrorKind {
    /// The collection holds no geometry at this index
    Null,
    Invalid,
}

/// One invalid (or null) entry of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryError {
    pub index: usize,
    pub kind: GeometryErrorKind,
    pub reason: String,
}

impl GeometryError {
    pub fn null(index: usize) -> Self {
        Self { index, kind: GeometryErrorKind::Null, reason: "null geometry".to_string() }
    }

    pub fn invalid(index: usize, reason: impl Into<String>) -> Self {
        Self { index, kind: GeometryErrorKind::Invalid, reason: reason.into() }
    }

    pub fn is_null(&self) -> bool {
        self.kind == GeometryErrorKind::Null
    }
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            GeometryErrorKind::Null => write!(f, "Null geometry at index {}", self.index),
            GeometryErrorKind::Invalid => write!(f, "Invalid geometry at index {}: {}", self.index, self.reason),
        }
    }
}

/// First reason `geom` is invalid, if any.
pub fn check_geometry(geom: &Geometry) -> Option<String> {
    if let Some(c) = geom.vertices().find(|c| !c.is_finite()) {
        return Some(format!("non-finite coordinate ({}, {})", c.x, c.y));
    }
    match geom {
        Geometry::Point(_) => None,
        Geometry::MultiPoint(points) if points.is_empty() => Some("empty geometry".to_string()),
        Geometry::MultiPoint(_) => None,
        Geometry::LineString(line) => check_line(line),
        Geometry::MultiLineString(lines) if lines.is_empty() => Some("empty geometry".to_string()),
        Geometry::MultiLineString(lines) => lines.iter().find_map(|l| check_line(l)),
        Geometry::Polygon(poly) => check_polygon(poly),
        Geometry::MultiPolygon(polys) if polys.is_empty() => Some("empty geometry".to_string()),
        Geometry::MultiPolygon(polys) => polys.iter().find_map(check_polygon),
    }
}

fn check_line(line: &[Coord]) -> Option<String> {
    if line.len() < 2 {
        return Some(format!("too few points ({}, need 2)", line.len()));
    }
    if to_line_string(line).euclidean_length() == 0.0 {
        return Some("line has no length".to_string());
    }
    None
}

fn check_polygon(poly: &Polygon) -> Option<String> {
    poly.rings().enumerate().find_map(|(i, ring)| {
        let label = if i == 0 { "exterior ring".to_string() } else { format!("interior ring {}", i) };
        check_ring(ring).map(|reason| format!("{} {}", label, reason))
    })
}

fn check_ring(ring: &[Coord]) -> Option<String> {
    if ring.len() < 4 {
        return Some(format!("has too few points ({}, need 4)", ring.len()));
    }
    let (first, last) = (ring[0], ring[ring.len() - 1]);
    if first.x != last.x || first.y != last.y {
        return Some("is not closed".to_string());
    }
    // repeated vertices add zero-length edges, not crossings
    let mut line = to_line_string(ring);
    line.0.dedup();
    if line.0.len() < 4 {
        return Some(format!("has too few distinct points ({}, need 4)", line.0.len()));
    }
    self_intersection(&line).map(|c| format!("self-intersects near ({}, {})", c.x, c.y))
}

/// First place two edges of a closed ring meet other than at their shared
/// vertex. Adjacent edges folding back onto each other count as a crossing.
fn self_intersection(ring: &geo::LineString<f64>) -> Option<geo::Coord<f64>> {
    let edges: Vec<geo::Line<f64>> = ring.lines().collect();
    let n = edges.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(LineIntersection::SinglePoint { intersection, .. }) => return Some(intersection),
                Some(LineIntersection::Collinear { intersection }) => return Some(intersection.start),
            }
        }
    }
    None
}
