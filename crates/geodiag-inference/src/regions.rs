//! Region tables: country and sub-region boxes with their typical CRS.
//!
//! Boxes are in geographic degrees, `[min_lon, min_lat, max_lon, max_lat]`.

use geodiag_core::crs::{MAGNA_BOGOTA, MAGNA_SIRGAS};
use geodiag_core::{Coord, Extent, GeodiagError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubRegion {
    pub name: String,
    pub bounds: [f64; 4],
    /// CRS typically used for data captured in this region
    pub crs: String,
}

impl SubRegion {
    pub fn new(name: impl Into<String>, bounds: [f64; 4], crs: impl Into<String>) -> Self {
        Self { name: name.into(), bounds, crs: crs.into() }
    }

    pub fn extent(&self) -> Extent {
        let [a, b, c, d] = self.bounds;
        Extent::new(a, b, c, d)
    }

    /// Share of `extent` covered by this region. A degenerate extent (a
    /// single point or an axis-aligned line) has no area to share: 0.
    pub fn overlap(&self, extent: &Extent) -> f64 {
        if extent.area() <= 0.0 {
            return 0.0;
        }
        self.extent()
            .intersection(extent)
            .map(|i| i.area() / extent.area())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRegion {
    pub name: String,
    pub bounds: [f64; 4],
    /// Official geographic CRS, also the generic fallback for the country
    pub official_crs: String,
    #[serde(default)]
    pub subregions: Vec<SubRegion>,
}

impl CountryRegion {
    pub fn extent(&self) -> Extent {
        let [a, b, c, d] = self.bounds;
        Extent::new(a, b, c, d)
    }

    pub fn contains(&self, extent: &Extent) -> bool {
        self.extent().contains(extent)
    }

    pub fn contains_point(&self, c: &Coord) -> bool {
        self.extent().contains_coord(c)
    }
}

/// Result of matching an extent against the administrative boxes.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryMatch<'a> {
    /// A sub-region covers more than half the extent
    SubRegion { country: &'a CountryRegion, region: &'a SubRegion, overlap: f64 },
    /// Inside a country box, no sub-region covers enough
    Country { country: &'a CountryRegion },
    None,
}

/// Minimum share of the extent a sub-region must cover to match.
pub const MIN_SUBREGION_OVERLAP: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionTable {
    pub countries: Vec<CountryRegion>,
}

impl Default for RegionTable {
    fn default() -> Self {
        BUILTIN_REGIONS.clone()
    }
}

impl RegionTable {
    pub fn builtin() -> &'static RegionTable {
        &BUILTIN_REGIONS
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, GeodiagError> {
        let table: RegionTable = serde_yaml::from_str(yaml)?;
        table.validate()?;
        Ok(table)
    }

    /// Every country and sub-region box must be finite and not inverted.
    pub fn validate(&self) -> Result<(), GeodiagError> {
        for country in &self.countries {
            if !valid_bounds(&country.bounds) {
                return Err(GeodiagError::ConfigError(format!("country {} has invalid bounds", country.name)));
            }
            if let Some(bad) = country.subregions.iter().find(|r| !valid_bounds(&r.bounds)) {
                return Err(GeodiagError::ConfigError(format!("region {} has invalid bounds", bad.name)));
            }
        }
        Ok(())
    }

    /// First country whose box holds the whole extent.
    pub fn country_containing(&self, extent: &Extent) -> Option<&CountryRegion> {
        self.countries.iter().find(|c| c.contains(extent))
    }

    pub fn country_containing_point(&self, c: &Coord) -> Option<&CountryRegion> {
        self.countries.iter().find(|country| country.contains_point(c))
    }

    pub fn match_boundaries(&self, extent: &Extent) -> BoundaryMatch<'_> {
        let Some(country) = self.country_containing(extent) else {
            return BoundaryMatch::None;
        };

        let mut best: Option<(&SubRegion, f64)> = None;
        for region in &country.subregions {
            let overlap = region.overlap(extent);
            if overlap > best.map(|(_, o)| o).unwrap_or(0.0) {
                best = Some((region, overlap));
            }
        }

        match best {
            Some((region, overlap)) if overlap > MIN_SUBREGION_OVERLAP => {
                BoundaryMatch::SubRegion { country, region, overlap }
            }
            _ => BoundaryMatch::Country { country },
        }
    }
}

fn valid_bounds(b: &[f64; 4]) -> bool {
    b.iter().all(|v| v.is_finite()) && b[0] <= b[2] && b[1] <= b[3]
}

static BUILTIN_REGIONS: Lazy<RegionTable> = Lazy::new(|| RegionTable {
    countries: vec![CountryRegion {
        name: "colombia".to_string(),
        bounds: [-79.0, 4.0, -67.0, 12.0],
        official_crs: MAGNA_SIRGAS.to_string(),
        subregions: vec![
            SubRegion::new("antioquia", [-77.5, 5.5, -74.0, 8.5], MAGNA_BOGOTA),
            SubRegion::new("cundinamarca", [-75.0, 3.5, -73.0, 5.5], MAGNA_BOGOTA),
            SubRegion::new("valle_del_cauca", [-77.5, 3.0, -75.5, 5.0], MAGNA_BOGOTA),
            SubRegion::new("atlantico", [-75.5, 10.0, -74.5, 11.5], MAGNA_BOGOTA),
            SubRegion::new("santander", [-74.5, 5.5, -72.5, 7.5], MAGNA_BOGOTA),
        ],
    }],
});
