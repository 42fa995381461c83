//! Unified Error Model
use thiserror::Error;

/// Failure of the reprojection primitive. Callers always recover from it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("TRANSFORM/UNSUPPORTED: {0}")]
    UnsupportedCrs(String),

    #[error("TRANSFORM/NO_SOURCE_CRS")]
    MissingSourceCrs,

    #[error("TRANSFORM/DEGENERATE: {0}")]
    Degenerate(String),
}

#[derive(Error, Debug)]
pub enum GeodiagError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("INPUT/{0}")]
    InputError(String),

    #[error("CONFIG/{0}")]
    ConfigError(String),

    #[error("SERIALIZE/{0}")]
    SerializeError(String),
}

impl From<serde_json::Error> for GeodiagError {
    fn from(e: serde_json::Error) -> Self {
        GeodiagError::SerializeError(e.to_string())
    }
}

impl From<serde_yaml::Error> for GeodiagError {
    fn from(e: serde_yaml::Error) -> Self {
        GeodiagError::ConfigError(e.to_string())
    }
}
