//! geodiag core: geometry model, CRS registry, reprojection and the shared
//! result types every detector speaks.

pub mod context;
pub mod crs;
pub mod data_model;
pub mod error;
pub mod finite;
pub mod frame;
pub mod inference;
pub mod measures;
pub mod reproject;

pub use context::DiagnosticContext;
pub use crs::{CrsDefinition, CrsKind};
pub use data_model::{Coord, Extent, Geometry, GeometryCollection, GeometryKind, Polygon};
pub use error::{GeodiagError, TransformError};
pub use frame::{FrameSource, MeasurementFrame};
pub use inference::InferenceResult;
pub use reproject::{Reprojector, TransverseMercatorReprojector};

/// Engine version stamped on every diagnostic record
pub const GEODIAG_VERSION: &str = "1.0.0";
