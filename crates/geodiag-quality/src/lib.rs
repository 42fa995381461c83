//! Quality verdicts for a diagnosed dataset.
//!
//! Two assessors read the same [`Signals`]: the quality assessor folds them
//! into a ROJO / AMARILLO / VERDE tier, and the use-case assessor scores them
//! against weighted profiles (cadastral, engineering survey, territorial
//! analysis, environmental modeling).
//!
//! # Example
//!
//! ```ignore
//! use geodiag_quality::{assess_quality, Signals, UseCaseAssessor};
//!
//! let signals = Signals { crs: &crs, units: &units, origin: &origin, scale: &scale,
//!     planimetric: &planimetric, altimetric: &altimetric, validation: &report };
//! let verdict = assess_quality(&signals);
//! let uses = UseCaseAssessor::default().assess(&signals);
//! println!("{} ({:.2}), {} use cases", verdict.tier, verdict.score, uses.len());
//! ```

pub mod assessor;
pub mod profile;
pub mod signals;
pub mod use_case;

pub use assessor::{assess_quality, Check, CheckStatus, QualityVerdict, Tier};
pub use profile::{Criterion, CrsRequirement, UseCase, UseCaseProfile, WeightedCriterion};
pub use signals::Signals;
pub use use_case::{assess_use_case, UseCaseAssessor, UseCaseVerdict};

/// Whether the built-in profile for `use_case` accepts the diagnosis.
pub fn is_suitable(signals: &Signals, use_case: UseCase) -> bool {
    assess_use_case(&UseCaseProfile::for_use_case(use_case), signals).suitable
}
