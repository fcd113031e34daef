//! Configuration management and loading.
//!
//! Provides the runtime configuration for ingestion concurrency, the
//! prediction endpoint, race defaults and export naming. Values come from a
//! TOML file when one exists and fall back to built-in defaults.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_ENDPOINT, DEFAULT_EXPORT_STEM,
    DEFAULT_TIMEOUT_SECS, REPORT_TITLE,
};
use crate::error::{Result, TelemetryError};
use crate::models::RaceConditions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Global configuration for the telemetry pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Prediction service endpoint
    pub endpoint: String,

    /// Request timeout for the prediction call, in seconds
    pub request_timeout_secs: u64,

    /// Maximum number of uploads read concurrently
    pub max_concurrent_reads: usize,

    /// Show a progress bar while ingesting
    pub show_progress: bool,

    /// Race context sent with each prediction round
    pub race: RaceConditions,

    /// File stem for written exports
    pub export_stem: String,

    /// Title printed at the top of the report export
    pub report_title: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_concurrent_reads: num_cpus::get(),
            show_progress: true,
            race: RaceConditions::default(),
            export_stem: DEFAULT_EXPORT_STEM.to_string(),
            report_title: REPORT_TITLE.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Load from an explicit path, else the user config file if present,
    /// else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(TelemetryError::InputNotFound {
                        path: path.to_path_buf(),
                    });
                }
                Self::from_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No configuration file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|source| TelemetryError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/race-telemetry/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(TelemetryError::configuration("endpoint must not be empty"));
        }
        if self.max_concurrent_reads == 0 {
            return Err(TelemetryError::configuration(
                "max_concurrent_reads must be at least 1",
            ));
        }
        if self.race.duration_hours.is_nan() || self.race.duration_hours <= 0.0 {
            return Err(TelemetryError::configuration(
                "race.duration_hours must be positive",
            ));
        }
        Ok(())
    }

    /// Set the prediction endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Set maximum concurrent reads
    pub fn with_max_concurrent_reads(mut self, reads: usize) -> Self {
        self.max_concurrent_reads = reads;
        self
    }

    /// Disable the ingestion progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Replace the race context
    pub fn with_race(mut self, race: RaceConditions) -> Self {
        self.race = race;
        self
    }

    /// Set the export file stem
    pub fn with_export_stem(mut self, stem: impl Into<String>) -> Self {
        self.export_stem = stem.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = TelemetryConfig::default();
        assert_eq!(config.endpoint, "http://localhost:8000/predict");
        assert_eq!(config.race.track_conditions, "Dry");
        assert_eq!(config.race.weather, "Sunny");
        assert_eq!(config.race.duration_hours, 6.0);
        assert!(config.max_concurrent_reads >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "endpoint = \"http://predictor:9000/predict\"").unwrap();
        writeln!(file, "[race]").unwrap();
        writeln!(file, "weather = \"Rain\"").unwrap();
        writeln!(file, "duration_hours = 24.0").unwrap();

        let config = TelemetryConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.endpoint, "http://predictor:9000/predict");
        assert_eq!(config.race.weather, "Rain");
        assert_eq!(config.race.duration_hours, 24.0);
        assert_eq!(config.race.track_conditions, "Dry");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "endpoint = [").unwrap();
        assert!(matches!(
            TelemetryConfig::load(Some(file.path())),
            Err(TelemetryError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = TelemetryConfig::load(Some(Path::new("/nonexistent/race.toml")));
        assert!(matches!(result, Err(TelemetryError::InputNotFound { .. })));
    }

    #[test]
    fn test_validation() {
        assert!(TelemetryConfig::default()
            .with_max_concurrent_reads(0)
            .validate()
            .is_err());
        assert!(TelemetryConfig::default()
            .with_endpoint(" ")
            .validate()
            .is_err());
    }
}
