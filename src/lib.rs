//! Race Telemetry Library
//!
//! A Rust library for turning race-weekend timing exports into predicted
//! race results.
//!
//! This library provides tools for:
//! - Decoding JSON and comma-separated uploads into field-keyed records
//! - Classifying uploads as practice, qualifying or race results
//! - Validating practice and qualifying uploads against known field sets
//! - Holding accepted uploads in a copy-on-write registry
//! - Requesting a prediction and assembling one normalized record per car
//! - Exporting results as JSON, CSV or a printable report

pub mod assembler;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod service;
pub mod session;
pub mod validator;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::TelemetryConfig;
pub use error::{Result, TelemetryError};
pub use models::{Category, PredictionResponse, RaceResultRecord, UploadedFile};
pub use registry::{IngestionRegistry, RegistryHandle};
pub use service::PredictionService;
pub use session::PredictionSession;
