//! Command-line argument definitions for race_telemetry
//!
//! This module defines the CLI interface using the clap derive API. Flags
//! given here override the values loaded from the configuration file.

use crate::config::TelemetryConfig;
use crate::export::ExportFormat;
use crate::filter::ResultFilter;
use crate::{Result, TelemetryError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the race telemetry tool
///
/// Ingests practice, qualifying and race-result exports, requests a race
/// prediction from the prediction service and renders the assembled results.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "race_telemetry",
    version,
    about = "Ingest race telemetry exports and assemble predicted race results",
    long_about = "Classifies and validates practice, qualifying and race-result files \
                  (JSON or CSV), sends the first practice and qualifying sessions to the \
                  prediction service, and exports the assembled per-car results as JSON, \
                  CSV or a printable report."
)]
pub struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        help = "Enable debug logging"
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Ingest uploads and report category, validity and eligibility
    Inspect(InspectArgs),
    /// Ingest uploads, request a prediction and export the results
    Predict(PredictArgs),
    /// Re-render a previously exported JSON result collection
    Export(ExportArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Upload files, directories or glob patterns
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<String>,

    #[arg(long = "no-progress", help = "Disable the ingestion progress bar")]
    pub no_progress: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct PredictArgs {
    /// Upload files, directories or glob patterns
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<String>,

    #[arg(long, value_name = "URL", help = "Prediction service endpoint")]
    pub endpoint: Option<String>,

    #[arg(long = "race-name", value_name = "NAME")]
    pub race_name: Option<String>,

    #[arg(long = "duration-hours", value_name = "HOURS")]
    pub duration_hours: Option<f64>,

    #[arg(long = "track", value_name = "CONDITIONS", help = "Track conditions, e.g. Dry or Wet")]
    pub track_conditions: Option<String>,

    #[arg(long, value_name = "WEATHER")]
    pub weather: Option<String>,

    #[arg(long = "car-type", value_name = "TYPE")]
    pub car_type: Option<String>,

    /// Only keep results whose class contains this text
    #[arg(long = "class", value_name = "CLASS", default_value = "all")]
    pub class: String,

    /// Only keep results whose car number or team contains this text
    #[arg(long = "search", value_name = "TEXT")]
    pub search: Option<String>,

    #[arg(long, value_enum, default_value = "report")]
    pub format: ExportFormat,

    /// Write exports into this directory instead of printing them
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    #[arg(long = "no-progress", help = "Disable the ingestion progress bar")]
    pub no_progress: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct ExportArgs {
    /// JSON result collection written by an earlier `predict`
    #[arg(value_name = "RESULTS_JSON")]
    pub results: PathBuf,

    #[arg(long = "class", value_name = "CLASS", default_value = "all")]
    pub class: String,

    #[arg(long = "search", value_name = "TEXT")]
    pub search: Option<String>,

    #[arg(long, value_enum, default_value = "report")]
    pub format: ExportFormat,

    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

impl InspectArgs {
    pub fn apply_overrides(&self, mut config: TelemetryConfig) -> TelemetryConfig {
        if self.no_progress {
            config.show_progress = false;
        }
        config
    }
}

impl PredictArgs {
    /// Layer command-line values over the loaded configuration
    pub fn apply_overrides(&self, mut config: TelemetryConfig) -> TelemetryConfig {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(race_name) = &self.race_name {
            config.race.race_name = race_name.clone();
        }
        if let Some(hours) = self.duration_hours {
            config.race.duration_hours = hours;
        }
        if let Some(track) = &self.track_conditions {
            config.race.track_conditions = track.clone();
        }
        if let Some(weather) = &self.weather {
            config.race.weather = weather.clone();
        }
        if let Some(car_type) = &self.car_type {
            config.race.car_type = car_type.clone();
        }
        if self.no_progress {
            config.show_progress = false;
        }
        config
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(hours) = self
            .duration_hours
            .filter(|hours| hours.is_nan() || *hours <= 0.0)
        {
            return Err(TelemetryError::configuration(format!(
                "Race duration must be positive, got {hours}"
            )));
        }
        Ok(())
    }

    pub fn filter(&self) -> ResultFilter {
        build_filter(&self.class, self.search.as_deref())
    }
}

impl ExportArgs {
    pub fn filter(&self) -> ResultFilter {
        build_filter(&self.class, self.search.as_deref())
    }
}

fn build_filter(class: &str, search: Option<&str>) -> ResultFilter {
    let filter = ResultFilter::new().with_class(class);
    match search {
        Some(term) => filter.with_search(term),
        None => filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_parsing() {
        let args = Args::try_parse_from([
            "race_telemetry",
            "predict",
            "practice.json",
            "qualifying.csv",
            "--track",
            "Wet",
            "--duration-hours",
            "24",
            "--format",
            "csv",
            "-v",
        ])
        .unwrap();

        assert!(args.verbose);
        assert_eq!(args.get_log_level(), "debug");
        let Commands::Predict(predict) = args.command else {
            panic!("Expected predict command");
        };
        assert_eq!(predict.inputs, vec!["practice.json", "qualifying.csv"]);
        assert_eq!(predict.format, ExportFormat::Csv);
        assert_eq!(predict.class, "all");
        assert!(predict.validate().is_ok());

        let config = predict.apply_overrides(TelemetryConfig::default());
        assert_eq!(config.race.track_conditions, "Wet");
        assert_eq!(config.race.duration_hours, 24.0);
        assert_eq!(config.race.weather, "Sunny");
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(Args::try_parse_from(["race_telemetry", "inspect"]).is_err());
        assert!(Args::try_parse_from(["race_telemetry"]).is_err());
    }

    #[test]
    fn test_invalid_duration() {
        let args =
            Args::try_parse_from(["race_telemetry", "predict", "a.json", "--duration-hours", "0"])
                .unwrap();
        let Commands::Predict(predict) = args.command else {
            panic!("Expected predict command");
        };
        assert!(predict.validate().is_err());
    }

    #[test]
    fn test_export_filter() {
        let args = Args::try_parse_from([
            "race_telemetry",
            "--config",
            "race.toml",
            "export",
            "results.json",
            "--class",
            "GTD",
            "--search",
            "Penske",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("race.toml")));
        assert_eq!(args.get_log_level(), "info");
        let Commands::Export(export) = args.command else {
            panic!("Expected export command");
        };
        assert_eq!(
            export.filter(),
            ResultFilter::new().with_class("GTD").with_search("Penske")
        );
        assert_eq!(export.format, ExportFormat::Report);
    }
}
