//! Error handling for telemetry ingestion and prediction rounds.
//!
//! Malformed uploads are not errors: they are recorded as flagged files in the
//! registry. The variants here cover the failures a caller has to react to:
//! I/O, configuration, eligibility, and the prediction service itself.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Input not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Invalid input pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Prediction requested without the required uploads. Carries the
    /// message shown to the user.
    #[error("{message}")]
    Eligibility { message: String },

    /// A second prediction round was requested while one is outstanding.
    #[error("A prediction round is already in progress")]
    PredictionInProgress,

    /// Any non-success outcome of the prediction call.
    #[error("Prediction failed: {reason}")]
    Service { reason: String },

    #[error("Export failed: {message}")]
    Export { message: String },
}

impl TelemetryError {
    pub fn eligibility(message: impl Into<String>) -> Self {
        Self::Eligibility {
            message: message.into(),
        }
    }

    pub fn service(reason: impl Into<String>) -> Self {
        Self::Service {
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Message suitable for direct display to an operator
    pub fn user_message(&self) -> String {
        match self {
            TelemetryError::Eligibility { message } => message.clone(),
            TelemetryError::Service { .. } => {
                "Analysis failed. Check Backend Connection.".to_string()
            }
            TelemetryError::PredictionInProgress => {
                "Analysis already running. Wait for it to finish.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
