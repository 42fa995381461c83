//! CRS Registry: the reference systems the diagnostics know by name
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const WGS84: &str = "EPSG:4326";
pub const MAGNA_SIRGAS: &str = "EPSG:4686";
pub const MAGNA_BOGOTA: &str = "EPSG:3116";
pub const MAGNA_WEST: &str = "EPSG:3115";
pub const UTM_18N: &str = "EPSG:32618";

/// Generic geographic identifiers (coordinates in degrees).
pub const GEOGRAPHIC_IDS: &[&str] = &[WGS84, MAGNA_SIRGAS];

/// Identifiers tied to the national geodetic datum.
pub const OFFICIAL_IDS: &[&str] = &[MAGNA_SIRGAS, MAGNA_BOGOTA, MAGNA_WEST];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrsKind {
    Geographic,
    Projected,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub a: f64,
    pub inv_f: f64,
}

impl Ellipsoid {
    pub const GRS80: Ellipsoid = Ellipsoid { a: 6_378_137.0, inv_f: 298.257_222_101 };
    pub const WGS84: Ellipsoid = Ellipsoid { a: 6_378_137.0, inv_f: 298.257_223_563 };

    pub fn flattening(&self) -> f64 {
        1.0 / self.inv_f
    }

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        let f = self.flattening();
        f * (2.0 - f)
    }
}

/// Transverse Mercator parameters, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    pub ellipsoid: Ellipsoid,
    pub lat_origin: f64,
    pub central_meridian: f64,
    pub scale_factor: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrsDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: CrsKind,
    pub projection: Option<TransverseMercator>,
}

static REGISTRY: Lazy<HashMap<&'static str, CrsDefinition>> = Lazy::new(|| {
    let magna_tm = |central_meridian: f64| TransverseMercator {
        ellipsoid: Ellipsoid::GRS80,
        lat_origin: 4.596_200_416_666_666,
        central_meridian,
        scale_factor: 1.0,
        false_easting: 1_000_000.0,
        false_northing: 1_000_000.0,
    };

    let defs = [
        CrsDefinition { id: WGS84, name: "WGS 84", kind: CrsKind::Geographic, projection: None },
        CrsDefinition { id: MAGNA_SIRGAS, name: "MAGNA-SIRGAS", kind: CrsKind::Geographic, projection: None },
        CrsDefinition {
            id: MAGNA_BOGOTA,
            name: "MAGNA-SIRGAS / Colombia Bogota zone",
            kind: CrsKind::Projected,
            projection: Some(magna_tm(-74.077_507_916_666_66)),
        },
        CrsDefinition {
            id: MAGNA_WEST,
            name: "MAGNA-SIRGAS / Colombia West zone",
            kind: CrsKind::Projected,
            projection: Some(magna_tm(-77.077_507_916_666_66)),
        },
        CrsDefinition {
            id: UTM_18N,
            name: "WGS 84 / UTM zone 18N",
            kind: CrsKind::Projected,
            projection: Some(TransverseMercator {
                ellipsoid: Ellipsoid::WGS84,
                lat_origin: 0.0,
                central_meridian: -75.0,
                scale_factor: 0.9996,
                false_easting: 500_000.0,
                false_northing: 0.0,
            }),
        },
    ];
    defs.into_iter().map(|d| (d.id, d)).collect()
});

/// Canonical `AUTHORITY:CODE` form: trims, upper-cases the authority and
/// treats a bare number as an EPSG code.
pub fn normalize_id(id: &str) -> String {
    let id = id.trim();
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        return format!("EPSG:{}", id);
    }
    match id.split_once(':') {
        Some((auth, code)) => format!("{}:{}", auth.trim().to_ascii_uppercase(), code.trim()),
        None => id.to_string(),
    }
}

pub fn lookup(id: &str) -> Option<&'static CrsDefinition> {
    REGISTRY.get(normalize_id(id).as_str())
}

pub fn display_name(id: &str) -> String {
    lookup(id).map(|d| d.name.to_string()).unwrap_or_else(|| normalize_id(id))
}

pub fn is_geographic(id: &str) -> bool {
    let id = normalize_id(id);
    GEOGRAPHIC_IDS.contains(&id.as_str())
        || lookup(&id).map(|d| d.kind == CrsKind::Geographic).unwrap_or(false)
}

pub fn is_official(id: &str) -> bool {
    OFFICIAL_IDS.contains(&normalize_id(id).as_str())
}

pub fn is_known_projected(id: &str) -> bool {
    lookup(id).map(|d| d.kind == CrsKind::Projected).unwrap_or(false)
}

pub fn same_crs(a: &str, b: &str) -> bool {
    normalize_id(a) == normalize_id(b)
}
