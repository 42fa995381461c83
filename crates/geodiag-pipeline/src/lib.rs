//! geodiag pipeline: one call from a geometry snapshot to a diagnostic
//! record.
//!
//! # Example
//!
//! ```ignore
//! use geodiag_pipeline::{DiagnosticConfig, DiagnosticRunner};
//!
//! let runner = DiagnosticRunner::new(DiagnosticConfig::default());
//! let record = runner.diagnose(&collection);
//! println!("{} ({:.2})", record.quality.tier, record.quality.score);
//! ```

pub mod config;
pub mod features;
pub mod record;
pub mod runner;

pub use config::DiagnosticConfig;
pub use features::{extract_features, FeatureMap};
pub use record::{DiagnosticRecord, StageDigest};
pub use runner::{digest, DiagnosticRunner, METHOD_EMPTY};

use geodiag_core::GeometryCollection;
use once_cell::sync::Lazy;

static DEFAULT_RUNNER: Lazy<DiagnosticRunner> = Lazy::new(DiagnosticRunner::default);

/// Diagnose with the built-in configuration.
pub fn diagnose(collection: &GeometryCollection) -> DiagnosticRecord {
    DEFAULT_RUNNER.diagnose(collection)
}
