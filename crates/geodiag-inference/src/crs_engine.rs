//! CRS Inference Engine
//!
//! Priority ladder: declared metadata, bounding box, statistical centroid,
//! coordinate ranges. A boundary match against the region table boosts the
//! winning step and may swap in a more specific CRS.

use crate::regions::{BoundaryMatch, RegionTable};
use geodiag_core::crs::{self, CrsKind, WGS84};
use geodiag_core::measures::vertex_mean;
use geodiag_core::{Extent, GeometryCollection, InferenceResult, Reprojector};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, warn};

pub const METHOD_METADATA: &str = "metadata_existente";
pub const METHOD_BBOX: &str = "bounding_box_match";
pub const METHOD_BOUNDARY: &str = "boundary_match";
pub const METHOD_STATISTICAL: &str = "statistical_inference";
pub const METHOD_COORDINATES: &str = "coordinate_analysis";
pub const METHOD_INSUFFICIENT: &str = "insufficient_data";

/// Boosted confidence at or above which a country-wide boundary match keeps
/// the base candidate.
const COUNTRY_OVERRIDE_CEILING: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrsCandidate {
    pub identifier: String,
    pub name: String,
    pub kind: Option<CrsKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(with = "geodiag_core::finite")]
    pub score: f64,
    pub method: String,
}

impl CrsCandidate {
    fn new(identifier: &str, score: f64, method: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            name: crs::display_name(identifier),
            kind: crs::lookup(identifier).map(|d| d.kind),
            region: None,
            score,
            method: method.to_string(),
        }
    }

    fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryReport {
    pub region: String,
    #[serde(with = "geodiag_core::finite")]
    pub overlap: f64,
    pub suggested_crs: String,
    #[serde(with = "geodiag_core::finite")]
    pub boost: f64,
    /// True for a named sub-region, false for a country-wide match
    pub specific: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrsReport {
    #[serde(flatten)]
    pub result: InferenceResult<String>,
    /// Display name of the detected CRS
    pub name: Option<String>,
    /// Every candidate that fired, best first
    pub candidates: Vec<CrsCandidate>,
    pub boundary: Option<BoundaryReport>,
}

impl CrsReport {
    pub fn crs(&self) -> Option<&str> {
        self.result.value.as_deref()
    }

    pub fn confidence(&self) -> f64 {
        self.result.confidence
    }
}

pub struct CrsEngine<'a> {
    regions: &'a RegionTable,
    reprojector: &'a dyn Reprojector,
    boundary_boost: f64,
}

impl<'a> CrsEngine<'a> {
    pub fn new(regions: &'a RegionTable, reprojector: &'a dyn Reprojector) -> Self {
        Self { regions, reprojector, boundary_boost: 0.1 }
    }

    pub fn with_boundary_boost(mut self, boost: f64) -> Self {
        self.boundary_boost = boost;
        self
    }

    pub fn infer(&self, collection: &GeometryCollection) -> CrsReport {
        if let Some(declared) = &collection.crs {
            let candidate = CrsCandidate::new(declared, 0.9, METHOD_METADATA);
            debug!(crs = %declared, "CRS taken from metadata");
            return CrsReport {
                name: Some(candidate.name.clone()),
                result: InferenceResult::determined(
                    declared.clone(),
                    0.9,
                    METHOD_METADATA,
                    format!("CRS found in metadata: {}", declared),
                ),
                candidates: vec![candidate],
                boundary: None,
            };
        }

        let geographic = self.normalize_geographic(collection);
        let extent = geographic.extent();
        let boundary = extent.as_ref().and_then(|e| self.match_boundaries(e));

        let Some(extent) = extent else {
            return CrsReport {
                result: InferenceResult::undetermined(0.3, METHOD_INSUFFICIENT, "no usable coordinates to analyse"),
                name: None,
                candidates: Vec::new(),
                boundary: None,
            };
        };

        let mut candidates = self.ladder_candidates(&geographic, &extent);
        let Some((base, rationale)) = candidates.first().cloned() else {
            return CrsReport {
                result: InferenceResult::undetermined(
                    0.3,
                    METHOD_INSUFFICIENT,
                    "the CRS could not be determined with enough confidence",
                ),
                name: None,
                candidates: Vec::new(),
                boundary,
            };
        };

        let mut chosen = base.identifier.clone();
        let mut confidence = base.score;
        let mut method = base.method.clone();
        let mut rationale = rationale;

        if let Some(b) = &boundary {
            confidence = (confidence + b.boost).min(1.0);
            method = format!("{}+{}", method, METHOD_BOUNDARY);
            if b.specific || confidence < COUNTRY_OVERRIDE_CEILING {
                chosen = b.suggested_crs.clone();
            }
            rationale = format!(
                "{}; matches {} ({:.1}% overlap), suggests {}",
                rationale,
                b.region,
                b.overlap * 100.0,
                b.suggested_crs
            );
            candidates.push((
                CrsCandidate::new(&b.suggested_crs, confidence, METHOD_BOUNDARY).in_region(b.region.clone()),
                String::new(),
            ));
        }

        let mut ranked: Vec<CrsCandidate> = candidates.into_iter().map(|(c, _)| c).collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        debug!(crs = %chosen, confidence, method = %method, "CRS inferred");
        CrsReport {
            name: Some(crs::display_name(&chosen)),
            result: InferenceResult::determined(chosen, confidence, method, rationale),
            candidates: ranked,
            boundary,
        }
    }

    /// Candidates of the bounding-box, statistical and coordinate-range
    /// steps that fire, in priority order.
    fn ladder_candidates(&self, geographic: &GeometryCollection, extent: &Extent) -> Vec<(CrsCandidate, String)> {
        let mut out = Vec::new();

        if let Some(country) = self.regions.country_containing(extent) {
            out.push((
                CrsCandidate::new(&country.official_crs, 0.8, METHOD_BBOX).in_region(country.name.clone()),
                format!(
                    "extent lies inside the {} bounding box, official CRS {}",
                    country.name, country.official_crs
                ),
            ));
        }

        if let Some(center) = vertex_mean(geographic.vertices()) {
            if let Some(country) = self.regions.country_containing_point(&center) {
                out.push((
                    CrsCandidate::new(&country.official_crs, 0.75, METHOD_STATISTICAL).in_region(country.name.clone()),
                    format!(
                        "vertex centroid ({:.4}, {:.4}) lies inside {}",
                        center.x, center.y, country.name
                    ),
                ));
            }
        }

        if extent.is_geographic_range() {
            out.push((
                CrsCandidate::new(WGS84, 0.6, METHOD_COORDINATES),
                "coordinates fall within geographic ranges, assuming WGS 84".to_string(),
            ));
        }
        out
    }

    /// Geographic working copy: projected input is moved to WGS 84, anything
    /// else is read as longitude/latitude. Failures keep the raw values.
    pub fn normalize_geographic<'c>(&self, collection: &'c GeometryCollection) -> Cow<'c, GeometryCollection> {
        match collection.crs.as_deref() {
            Some(id) if !crs::is_geographic(id) => match self.reprojector.reproject(collection, WGS84) {
                Ok(projected) => Cow::Owned(projected),
                Err(e) => {
                    warn!(from = %id, error = %e, "normalization to WGS 84 failed, using raw coordinates");
                    Cow::Borrowed(collection)
                }
            },
            _ => Cow::Borrowed(collection),
        }
    }

    pub fn match_boundaries(&self, extent: &Extent) -> Option<BoundaryReport> {
        match self.regions.match_boundaries(extent) {
            BoundaryMatch::SubRegion { region, overlap, .. } => Some(BoundaryReport {
                region: region.name.clone(),
                overlap,
                suggested_crs: region.crs.clone(),
                boost: self.boundary_boost,
                specific: true,
            }),
            BoundaryMatch::Country { country } => Some(BoundaryReport {
                region: format!("{}_general", country.name),
                overlap: 1.0,
                suggested_crs: country.official_crs.clone(),
                boost: self.boundary_boost * 0.5,
                specific: false,
            }),
            BoundaryMatch::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodiag_core::{Coord, Geometry, TransverseMercatorReprojector};

    fn points(coords: &[(f64, f64)]) -> GeometryCollection {
        GeometryCollection::from_geometries(coords.iter().map(|&(x, y)| Geometry::Point(Coord::new(x, y))))
    }

    fn infer(gc: &GeometryCollection) -> CrsReport {
        CrsEngine::new(RegionTable::builtin(), &TransverseMercatorReprojector).infer(gc)
    }

    #[test]
    fn test_declared_crs_returned_unchanged() {
        let gc = points(&[(1.0, 2.0)]).with_crs("EPSG:9377");
        let r = infer(&gc);
        assert_eq!(r.crs(), Some("EPSG:9377"));
        assert_eq!(r.confidence(), 0.9);
        assert_eq!(r.result.method, METHOD_METADATA);
    }

    #[test]
    fn test_country_box_keeps_official_crs() {
        let gc = points(&[(-79.0, 4.0), (-67.0, 12.0)]);
        let r = infer(&gc);
        assert_eq!(r.crs(), Some("EPSG:4686"));
        assert!((r.confidence() - 0.85).abs() < 1e-12);
        assert_eq!(r.result.method, "bounding_box_match+boundary_match");
    }

    #[test]
    fn test_subregion_overrides() {
        let gc = points(&[(-76.0, 5.0), (-74.0, 7.0), (-75.0, 6.0)]);
        let r = infer(&gc);
        assert_eq!(r.crs(), Some("EPSG:3116"));
        assert!((r.confidence() - 0.9).abs() < 1e-12);
        assert!(r.result.method.contains(METHOD_BOUNDARY));
        assert_eq!(r.boundary.as_ref().map(|b| b.region.as_str()), Some("antioquia"));
        assert_eq!(r.candidates[0].identifier, "EPSG:3116");
    }

    #[test]
    fn test_single_point_gets_country_boost_only() {
        let r = infer(&points(&[(-74.1, 4.6)]));
        assert_eq!(r.crs(), Some("EPSG:4686"));
        assert!((r.confidence() - 0.85).abs() < 1e-12);
        let b = r.boundary.unwrap();
        assert!(!b.specific);
        assert_eq!(b.region, "colombia_general");
    }

    #[test]
    fn test_statistical_when_extent_spills_over() {
        // centroid inside the country, extent crossing its western edge
        let gc = points(&[(-80.0, 5.0), (-70.0, 5.0), (-72.0, 6.0)]);
        let r = infer(&gc);
        assert_eq!(r.result.method, METHOD_STATISTICAL);
        assert_eq!(r.confidence(), 0.75);
    }

    #[test]
    fn test_coordinate_range_fallback() {
        let gc = points(&[(2.0, 41.0), (3.0, 42.0)]);
        let r = infer(&gc);
        assert_eq!(r.crs(), Some(WGS84));
        assert_eq!(r.confidence(), 0.6);
        assert_eq!(r.result.method, METHOD_COORDINATES);
    }

    #[test]
    fn test_projected_values_without_crs() {
        let gc = points(&[(1_000_000.0, 1_000_000.0), (1_000_500.0, 1_002_000.0)]);
        let r = infer(&gc);
        assert_eq!(r.crs(), None);
        assert_eq!(r.confidence(), 0.3);
        assert_eq!(r.result.method, METHOD_INSUFFICIENT);
    }

    #[test]
    fn test_declared_crs_skips_boundary_matching() {
        let gc = points(&[(1_000_000.0, 1_000_000.0), (1_001_000.0, 1_001_000.0)]).with_crs("EPSG:3116");
        let r = infer(&gc);
        assert_eq!(r.crs(), Some("EPSG:3116"));
        assert!(r.boundary.is_none());
        assert_eq!(r.candidates.len(), 1);

        // a declared CRS wins even over coordinates inside a sub-region
        let gc = points(&[(-76.0, 5.0), (-74.0, 7.0)]).with_crs("EPSG:4326");
        let r = infer(&gc);
        assert_eq!(r.crs(), Some("EPSG:4326"));
        assert!(r.boundary.is_none());
    }
}
