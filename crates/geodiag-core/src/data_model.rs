//! Data Model: Coord, Geometry, Extent, GeometryCollection
//!
//! Positions serialize as GeoJSON-style arrays (`[x, y]` or `[x, y, z]`) and
//! geometries as `{"type": ..., "coordinates": ...}`, so a snapshot handed
//! over by the ingestion layer reads like a stripped-down GeoJSON document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single vertex. `z` is only present for 3D data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// True when both planar components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Planar euclidean distance; `z` is ignored.
    pub fn distance(&self, other: &Coord) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<Coord> for geo::Coord<f64> {
    fn from(c: Coord) -> Self {
        geo::coord! { x: c.x, y: c.y }
    }
}

impl From<geo::Coord<f64>> for Coord {
    fn from(c: geo::Coord<f64>) -> Self {
        Coord::new(c.x, c.y)
    }
}

/// Planar copy of a vertex sequence; `z` is dropped.
pub fn to_line_string(coords: &[Coord]) -> geo::LineString<f64> {
    coords.iter().map(|c| geo::Coord::from(*c)).collect()
}

impl TryFrom<Vec<f64>> for Coord {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [x, y] => Ok(Coord::new(*x, *y)),
            [x, y, z] => Ok(Coord::xyz(*x, *y, *z)),
            other => Err(format!("position must have 2 or 3 values, got {}", other.len())),
        }
    }
}

impl From<Coord> for Vec<f64> {
    fn from(c: Coord) -> Self {
        match c.z {
            Some(z) => vec![c.x, c.y, z],
            None => vec![c.x, c.y],
        }
    }
}

/// Polygon with one exterior ring and any number of holes.
///
/// Serialized as a list of rings, exterior first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<Coord>>", into = "Vec<Vec<Coord>>")]
pub struct Polygon {
    pub exterior: Vec<Coord>,
    pub interiors: Vec<Vec<Coord>>,
}

impl Polygon {
    pub fn new(exterior: Vec<Coord>) -> Self {
        Self { exterior, interiors: Vec::new() }
    }

    pub fn with_interior(mut self, ring: Vec<Coord>) -> Self {
        self.interiors.push(ring);
        self
    }

    /// All rings, exterior first.
    pub fn rings(&self) -> impl Iterator<Item = &Vec<Coord>> {
        std::iter::once(&self.exterior).chain(self.interiors.iter())
    }

    pub fn to_geo(&self) -> geo::Polygon<f64> {
        geo::Polygon::new(
            to_line_string(&self.exterior),
            self.interiors.iter().map(|r| to_line_string(r)).collect(),
        )
    }
}

impl From<Vec<Vec<Coord>>> for Polygon {
    fn from(mut rings: Vec<Vec<Coord>>) -> Self {
        if rings.is_empty() {
            return Polygon::default();
        }
        let exterior = rings.remove(0);
        Self { exterior, interiors: rings }
    }
}

impl From<Polygon> for Vec<Vec<Coord>> {
    fn from(p: Polygon) -> Self {
        let mut rings = Vec::with_capacity(1 + p.interiors.len());
        rings.push(p.exterior);
        rings.extend(p.interiors);
        rings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::MultiPolygon => "MultiPolygon",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    Polygon(Polygon),
    MultiPoint(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
        }
    }

    /// Vertex sequences making up the geometry. A point is a one-vertex path,
    /// a polygon contributes every ring.
    pub fn paths(&self) -> Vec<&[Coord]> {
        match self {
            Geometry::Point(c) => vec![std::slice::from_ref(c)],
            Geometry::LineString(line) => vec![line.as_slice()],
            Geometry::Polygon(poly) => poly.rings().map(|r| r.as_slice()).collect(),
            Geometry::MultiPoint(points) => points.iter().map(std::slice::from_ref).collect(),
            Geometry::MultiLineString(lines) => lines.iter().map(|l| l.as_slice()).collect(),
            Geometry::MultiPolygon(polys) => polys
                .iter()
                .flat_map(|p| p.rings().map(|r| r.as_slice()))
                .collect(),
        }
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Coord> + '_ {
        self.paths().into_iter().flat_map(|p| p.iter())
    }

    pub fn vertex_count(&self) -> usize {
        self.paths().iter().map(|p| p.len()).sum()
    }

    pub fn is_puntal(&self) -> bool {
        matches!(self, Geometry::Point(_) | Geometry::MultiPoint(_))
    }

    /// Planar `geo` counterpart, for the algorithms in [`crate::measures`].
    pub fn to_geo(&self) -> geo::Geometry<f64> {
        let point = |c: &Coord| geo::Point::from(geo::Coord::from(*c));
        match self {
            Geometry::Point(c) => geo::Geometry::Point(point(c)),
            Geometry::LineString(line) => geo::Geometry::LineString(to_line_string(line)),
            Geometry::Polygon(poly) => geo::Geometry::Polygon(poly.to_geo()),
            Geometry::MultiPoint(points) => geo::Geometry::MultiPoint(points.iter().map(point).collect()),
            Geometry::MultiLineString(lines) => {
                geo::Geometry::MultiLineString(geo::MultiLineString::new(lines.iter().map(|l| to_line_string(l)).collect()))
            }
            Geometry::MultiPolygon(polys) => {
                geo::Geometry::MultiPolygon(geo::MultiPolygon::new(polys.iter().map(Polygon::to_geo).collect()))
            }
        }
    }

    /// Rebuild the geometry with every vertex passed through `f`.
    pub fn try_map_coords<E>(&self, f: &mut impl FnMut(&Coord) -> Result<Coord, E>) -> Result<Geometry, E> {
        let mut map_seq = |seq: &[Coord]| seq.iter().map(&mut *f).collect::<Result<Vec<_>, E>>();
        Ok(match self {
            Geometry::Point(c) => Geometry::Point(map_seq(std::slice::from_ref(c))?[0]),
            Geometry::LineString(line) => Geometry::LineString(map_seq(line)?),
            Geometry::Polygon(poly) => Geometry::Polygon(map_polygon(poly, &mut map_seq)?),
            Geometry::MultiPoint(points) => Geometry::MultiPoint(map_seq(points)?),
            Geometry::MultiLineString(lines) => Geometry::MultiLineString(
                lines.iter().map(|l| map_seq(l)).collect::<Result<_, E>>()?,
            ),
            Geometry::MultiPolygon(polys) => Geometry::MultiPolygon(
                polys
                    .iter()
                    .map(|p| map_polygon(p, &mut map_seq))
                    .collect::<Result<_, E>>()?,
            ),
        })
    }
}

fn map_polygon<E>(
    poly: &Polygon,
    map_seq: &mut impl FnMut(&[Coord]) -> Result<Vec<Coord>, E>,
) -> Result<Polygon, E> {
    Ok(Polygon {
        exterior: map_seq(&poly.exterior)?,
        interiors: poly
            .interiors
            .iter()
            .map(|r| map_seq(r))
            .collect::<Result<_, E>>()?,
    })
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Option<Self> {
        let mut extent: Option<Extent> = None;
        for c in coords.into_iter().filter(|c| c.is_finite()) {
            extent = Some(match extent {
                None => Extent { min_x: c.x, min_y: c.y, max_x: c.x, max_y: c.y },
                Some(e) => Extent {
                    min_x: e.min_x.min(c.x),
                    min_y: e.min_y.min(c.y),
                    max_x: e.max_x.max(c.x),
                    max_y: e.max_y.max(c.y),
                },
            });
        }
        extent
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn max_span(&self) -> f64 {
        self.width().abs().max(self.height().abs())
    }

    pub fn mean_span(&self) -> f64 {
        (self.width().abs() + self.height().abs()) / 2.0
    }

    /// True when `other` lies fully inside (boundary inclusive).
    pub fn contains(&self, other: &Extent) -> bool {
        self.min_x <= other.min_x
            && other.max_x <= self.max_x
            && self.min_y <= other.min_y
            && other.max_y <= self.max_y
    }

    pub fn contains_coord(&self, c: &Coord) -> bool {
        (self.min_x..=self.max_x).contains(&c.x) && (self.min_y..=self.max_y).contains(&c.y)
    }

    /// Overlapping box, `None` when the intersection has no area.
    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        let max_x = self.max_x.min(other.max_x);
        let max_y = self.max_y.min(other.max_y);
        if min_x >= max_x || min_y >= max_y {
            return None;
        }
        Some(Extent { min_x, min_y, max_x, max_y })
    }

    /// True when every corner lies inside longitude [-180, 180] and latitude [-90, 90].
    pub fn is_geographic_range(&self) -> bool {
        let lon = -180.0..=180.0;
        let lat = -90.0..=90.0;
        lon.contains(&self.min_x) && lon.contains(&self.max_x) && lat.contains(&self.min_y) && lat.contains(&self.max_y)
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

/// Immutable snapshot handed to one diagnosis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometryCollection {
    /// Declared CRS identifier, if the source carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
    /// Ordered geometries; `None` marks a null geometry
    pub geometries: Vec<Option<Geometry>>,
}

impl GeometryCollection {
    pub fn new(geometries: Vec<Option<Geometry>>, crs: Option<String>) -> Self {
        Self { crs, geometries }
    }

    pub fn from_geometries(geometries: impl IntoIterator<Item = Geometry>) -> Self {
        Self {
            crs: None,
            geometries: geometries.into_iter().map(Some).collect(),
        }
    }

    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Non-null geometries with their position in the collection.
    pub fn present(&self) -> impl Iterator<Item = (usize, &Geometry)> + '_ {
        self.geometries
            .iter()
            .enumerate()
            .filter_map(|(i, g)| g.as_ref().map(|g| (i, g)))
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Coord> + '_ {
        self.present().flat_map(|(_, g)| g.vertices())
    }

    /// Finite vertices only.
    pub fn usable_vertices(&self) -> Vec<Coord> {
        self.vertices().filter(|c| c.is_finite()).copied().collect()
    }

    pub fn has_usable_vertices(&self) -> bool {
        self.vertices().any(|c| c.is_finite())
    }

    pub fn extent(&self) -> Option<Extent> {
        Extent::from_coords(self.vertices())
    }

    /// Copy where every geometry holding a non-finite vertex becomes null.
    /// Positions are kept so indices still line up with the source.
    pub fn finite_only(&self) -> GeometryCollection {
        GeometryCollection {
            crs: self.crs.clone(),
            geometries: self
                .geometries
                .iter()
                .map(|g| g.as_ref().filter(|g| g.vertices().all(|c| c.is_finite())).cloned())
                .collect(),
        }
    }
}
