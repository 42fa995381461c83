//! Reprojection primitive and a small built-in implementation.
//!
//! The diagnostics only ever move data between the few reference systems of
//! the CRS registry, so the built-in reprojector covers geographic <->
//! transverse Mercator on a single ellipsoid per system. Datum shifts between
//! WGS 84 and MAGNA-SIRGAS are below a metre and ignored.

use crate::crs::{self, CrsKind, TransverseMercator};
use crate::data_model::{Coord, GeometryCollection};
use crate::error::TransformError;

/// Moves a whole collection into `target`.
pub trait Reprojector: Send + Sync {
    fn reproject(&self, collection: &GeometryCollection, target: &str) -> Result<GeometryCollection, TransformError>;
}

/// Largest longitude distance from the central meridian the series
/// expansions are trusted for.
const MAX_MERIDIAN_OFFSET_DEG: f64 = 30.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct TransverseMercatorReprojector;

impl TransverseMercatorReprojector {
    pub fn new() -> Self {
        Self
    }

    fn to_geographic(&self, c: &Coord, source: &str) -> Result<Coord, TransformError> {
        let def = crs::lookup(source).ok_or_else(|| TransformError::UnsupportedCrs(source.to_string()))?;
        match (def.kind, def.projection) {
            (CrsKind::Geographic, _) => check_geographic(c).map(|_| *c),
            (CrsKind::Projected, Some(tm)) => inverse(&tm, c),
            (CrsKind::Projected, None) => Err(TransformError::UnsupportedCrs(source.to_string())),
        }
    }

    fn from_geographic(&self, c: &Coord, target: &str) -> Result<Coord, TransformError> {
        let def = crs::lookup(target).ok_or_else(|| TransformError::UnsupportedCrs(target.to_string()))?;
        match (def.kind, def.projection) {
            (CrsKind::Geographic, _) => Ok(*c),
            (CrsKind::Projected, Some(tm)) => forward(&tm, c),
            (CrsKind::Projected, None) => Err(TransformError::UnsupportedCrs(target.to_string())),
        }
    }
}

impl Reprojector for TransverseMercatorReprojector {
    fn reproject(&self, collection: &GeometryCollection, target: &str) -> Result<GeometryCollection, TransformError> {
        let source = collection.crs.as_deref().ok_or(TransformError::MissingSourceCrs)?;
        let source = crs::normalize_id(source);
        let target = crs::normalize_id(target);

        if source == target {
            return Ok(collection.clone().with_crs(target));
        }
        if crs::lookup(&target).is_none() {
            return Err(TransformError::UnsupportedCrs(target));
        }

        let mut convert = |c: &Coord| -> Result<Coord, TransformError> {
            let geo = self.to_geographic(c, &source)?;
            self.from_geographic(&geo, &target)
        };
        let geometries = collection
            .geometries
            .iter()
            .map(|g| g.as_ref().map(|g| g.try_map_coords(&mut convert)).transpose())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GeometryCollection::new(geometries, Some(target)))
    }
}

fn check_geographic(c: &Coord) -> Result<(), TransformError> {
    if !c.is_finite() {
        return Err(TransformError::Degenerate(format!("non-finite coordinate ({}, {})", c.x, c.y)));
    }
    if !(-180.0..=180.0).contains(&c.x) || !(-90.0..=90.0).contains(&c.y) {
        return Err(TransformError::Degenerate(format!("({}, {}) is not a longitude/latitude pair", c.x, c.y)));
    }
    Ok(())
}

struct Series {
    a: f64,
    e2: f64,
    ep2: f64,
}

impl Series {
    fn new(tm: &TransverseMercator) -> Self {
        let e2 = tm.ellipsoid.e2();
        Self { a: tm.ellipsoid.a, e2, ep2: e2 / (1.0 - e2) }
    }

    /// Meridian arc length from the equator to `phi` (radians).
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }
}

/// Geographic degrees -> projected metres.
fn forward(tm: &TransverseMercator, c: &Coord) -> Result<Coord, TransformError> {
    check_geographic(c)?;
    let dlon = c.x - tm.central_meridian;
    if dlon.abs() > MAX_MERIDIAN_OFFSET_DEG {
        return Err(TransformError::Degenerate(format!(
            "longitude {} too far from central meridian {}",
            c.x, tm.central_meridian
        )));
    }

    let s = Series::new(tm);
    let phi = c.y.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let n = s.a / (1.0 - s.e2 * sin_phi * sin_phi).sqrt();
    let t = phi.tan().powi(2);
    let cc = s.ep2 * cos_phi * cos_phi;
    let a = dlon.to_radians() * cos_phi;
    let m = s.meridian_arc(phi);
    let m0 = s.meridian_arc(tm.lat_origin.to_radians());
    let k0 = tm.scale_factor;

    let x = k0
        * n
        * (a + (1.0 - t + cc) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * cc - 58.0 * s.ep2) * a.powi(5) / 120.0);
    let y = k0
        * (m - m0
            + n * phi.tan()
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * cc + 4.0 * cc * cc) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * cc - 330.0 * s.ep2) * a.powi(6) / 720.0));

    Ok(Coord { x: tm.false_easting + x, y: tm.false_northing + y, z: c.z })
}

/// Projected metres -> geographic degrees.
fn inverse(tm: &TransverseMercator, c: &Coord) -> Result<Coord, TransformError> {
    if !c.is_finite() {
        return Err(TransformError::Degenerate(format!("non-finite coordinate ({}, {})", c.x, c.y)));
    }
    let s = Series::new(tm);
    let k0 = tm.scale_factor;
    let e2 = s.e2;

    let m = s.meridian_arc(tm.lat_origin.to_radians()) + (c.y - tm.false_northing) / k0;
    let mu = m / (s.a * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0));
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let (sin1, cos1) = phi1.sin_cos();
    if cos1.abs() < 1e-12 {
        return Err(TransformError::Degenerate("footpoint latitude at a pole".to_string()));
    }
    let c1 = s.ep2 * cos1 * cos1;
    let t1 = phi1.tan().powi(2);
    let w = 1.0 - e2 * sin1 * sin1;
    let n1 = s.a / w.sqrt();
    let r1 = s.a * (1.0 - e2) / w.powf(1.5);
    let d = (c.x - tm.false_easting) / (n1 * k0);

    let phi = phi1
        - (n1 * phi1.tan() / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * s.ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * s.ep2 - 3.0 * c1 * c1) * d.powi(6)
                    / 720.0);
    let lambda = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * s.ep2 + 24.0 * t1 * t1) * d.powi(5) / 120.0)
        / cos1;

    let out = Coord { x: tm.central_meridian + lambda.to_degrees(), y: phi.to_degrees(), z: c.z };
    check_geographic(&out)?;
    Ok(out)
}
