//! Pipeline configuration persisted as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use transit::{ProcessingConfig, SearchConfig};

use crate::classifier::HabitabilityCriteria;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for every pipeline stage. Missing sections take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Light-curve cleaning and smoothing
    pub processing: ProcessingConfig,
    /// Transit search grids and threshold
    pub search: SearchConfig,
    /// Habitability bounds
    pub criteria: HabitabilityCriteria,
}

impl PipelineConfig {
    /// Check every section for inconsistent settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.processing
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.search
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.criteria.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Save to a pretty-printed JSON file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::debug!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stellar::SpectralType;

    #[test]
    fn test_default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");

        let mut config = PipelineConfig::default();
        config.search.min_snr = 9.0;
        config.criteria.allowed_spectral_types = vec![SpectralType::G, SpectralType::K];
        config.save_to_file(&path).unwrap();

        let loaded = PipelineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"processing": {"smoothing_window": 11}}"#).unwrap();
        assert_eq!(config.processing.smoothing_window, 11);
        assert_eq!(config.processing.flatten_window, 101);
        assert_eq!(config.search, SearchConfig::default());
        assert_eq!(config.criteria, HabitabilityCriteria::default());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"processing": {"smoothing_window": 24}}"#).unwrap();
        assert!(matches!(
            PipelineConfig::load_from_file(&path),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            PipelineConfig::load_from_file(&path),
            Err(ConfigError::Json(_))
        ));

        assert!(matches!(
            PipelineConfig::load_from_file(&dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
