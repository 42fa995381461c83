//! Diagnostic configuration: numeric knobs, region table and use-case profiles
use geodiag_core::{DiagnosticContext, GeodiagError};
use geodiag_inference::RegionTable;
use geodiag_quality::UseCaseProfile;
use serde::{Deserialize, Serialize};

/// Everything a runner can be tuned with. Missing YAML keys keep the
/// built-in values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticConfig {
    #[serde(flatten)]
    pub context: DiagnosticContext,
    pub regions: RegionTable,
    pub profiles: Vec<UseCaseProfile>,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            context: DiagnosticContext::default(),
            regions: RegionTable::default(),
            profiles: UseCaseProfile::builtin().to_vec(),
        }
    }
}

impl DiagnosticConfig {
    /// Load config from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, GeodiagError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, GeodiagError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), GeodiagError> {
        let ctx = &self.context;
        if !(ctx.boundary_boost.is_finite() && (0.0..=1.0).contains(&ctx.boundary_boost)) {
            return Err(GeodiagError::ConfigError(format!(
                "boundary_boost must be in [0, 1], got {}",
                ctx.boundary_boost
            )));
        }
        if !(ctx.iqr_factor.is_finite() && ctx.iqr_factor > 0.0) {
            return Err(GeodiagError::ConfigError(format!("iqr_factor must be positive, got {}", ctx.iqr_factor)));
        }
        if ctx.consistency_sample == 0 || ctx.consistency_window == 0 {
            return Err(GeodiagError::ConfigError("consistency sample and window must be non-zero".to_string()));
        }
        self.regions.validate()?;
        for profile in &self.profiles {
            profile.validate()?;
        }
        Ok(())
    }

    pub fn with_context(mut self, context: DiagnosticContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_profiles(mut self, profiles: Vec<UseCaseProfile>) -> Self {
        self.profiles = profiles;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodiag_quality::UseCase;

    #[test]
    fn test_defaults() {
        let config = DiagnosticConfig::default();
        assert_eq!(config.context.boundary_boost, 0.1);
        assert_eq!(config.profiles.len(), 4);
        assert!(!config.regions.countries.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_builtins() {
        let config = DiagnosticConfig::from_yaml("boundary_boost: 0.2\nconsistency_window: 5\n").unwrap();
        assert_eq!(config.context.boundary_boost, 0.2);
        assert_eq!(config.context.consistency_window, 5);
        assert_eq!(config.context.consistency_sample, 100);
        assert_eq!(config.profiles[0].use_case, UseCase::Cadastral);
    }

    #[test]
    fn test_rejects_bad_knobs() {
        let err = DiagnosticConfig::from_yaml("iqr_factor: -1.0\n").unwrap_err();
        assert!(err.to_string().contains("iqr_factor"));
        assert!(DiagnosticConfig::from_yaml("boundary_boost: [1, 2]\n").is_err());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = DiagnosticConfig::default();
        let back = DiagnosticConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
