//! Geometric validation: per-geometry validity, IQR outliers and basic
//! statistics of a collection.

pub mod outliers;
pub mod validator;
pub mod validity;

pub use outliers::{detect_outliers, iqr_fences, Axis, OutlierRecord};
pub use validator::{GeometricValidator, ValidationReport, ValidationStatistics};
pub use validity::{check_geometry, GeometryError, GeometryErrorKind};
