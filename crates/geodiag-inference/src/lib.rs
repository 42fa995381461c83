//! Heuristic detectors: CRS, units, origin, scale and positional error.
//!
//! Every detector is a pure function over an immutable snapshot and answers
//! with an [`InferenceResult`](geodiag_core::InferenceResult); none of them
//! fail.

pub mod combiner;
pub mod crs_engine;
pub mod origin;
pub mod positional;
pub mod regions;
pub mod rule;
pub mod scale;
pub mod units;

pub use combiner::{combine, Estimate};
pub use crs_engine::{BoundaryReport, CrsCandidate, CrsEngine, CrsReport};
pub use origin::{detect_origin, DisplacementCheck, NoDisplacement, OriginClass};
pub use positional::{altimetric_error, planimetric_error};
pub use regions::{BoundaryMatch, CountryRegion, RegionTable, SubRegion};
pub use rule::{Rule, RuleLadder};
pub use scale::{estimate_scale, snap_to_standard, STANDARD_SCALES};
pub use units::{detect_units, Unit};
