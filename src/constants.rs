//! Application constants for the race telemetry pipeline
//!
//! Recognized schema fields, classification keywords, assembly defaults and
//! export layouts used throughout the crate.

// =============================================================================
// Decoding
// =============================================================================

/// Field delimiter for tabular uploads
pub const FIELD_DELIMITER: char = ',';

/// Enclosing quote character for tabular fields
pub const QUOTE_CHAR: char = '"';

/// Leading marker some timing exports carry, dropped before decoding
pub const BYTE_ORDER_MARK: char = '\u{feff}';

/// File extension selecting the tabular decoder (anything else is parsed as JSON)
pub const TABULAR_EXTENSION: &str = ".csv";

/// Key holding the entry array when a JSON upload has an object root
pub const CLASSIFICATION_KEY: &str = "classification";

/// Supported upload extensions when walking directories
pub const UPLOAD_EXTENSIONS: &[&str] = &["json", "csv"];

// =============================================================================
// Classification
// =============================================================================

/// Name fragments checked in priority order (lowercased file name)
pub mod name_keywords {
    pub const PRACTICE: &[&str] = &["practice"];
    pub const QUALIFYING: &[&str] = &["qualifying", "qual"];
    pub const RACE_RESULTS: &[&str] = &["race"];
}

/// Entry key signalling a practice session export
pub const SESSION_INDICATOR_KEY: &str = "Session";

/// Top-level key of a JSON object root signalling a practice session export
pub const ROOT_SESSION_KEY: &str = "session";

/// Entry key signalling a qualifying export
pub const QUALIFYING_POSITION_KEY: &str = "QualPos";

// =============================================================================
// Schema validation
// =============================================================================

/// Fields of which a practice entry must carry at least one.
/// Covers both the legacy and the current timing-export schema.
pub const PRACTICE_FIELDS: &[&str] = &[
    "CarNumber",
    "number",
    "Team",
    "team",
    "Driver",
    "drivers",
    "LapTime",
    "time",
];

/// Fields of which a qualifying entry must carry at least one
pub const QUALIFYING_FIELDS: &[&str] = &[
    "CarNumber",
    "number",
    "QualPos",
    "position",
    "BestLap",
    "time",
    "Driver",
    "drivers",
];

pub mod defects {
    pub const DECODE_FAILURE: &str = "Failed to parse file content";
    pub const NOT_A_SEQUENCE: &str =
        "Data must be an array of entries or contain a classification array";
    pub const PRACTICE_MISSING_FIELDS: &str =
        "Entry 1: Missing core fields (Number, Team, Driver, or Time)";
    pub const QUALIFYING_MISSING_FIELDS: &str =
        "Entry 1: Missing core fields (Number, Position, Driver, or Time)";
}

// =============================================================================
// Eligibility
// =============================================================================

pub mod messages {
    pub const NO_VALID_DATA: &str = "Upload at least one valid data file to run analysis.";
    pub const MISSING_PRACTICE_OR_QUALIFYING: &str =
        "Please upload both Practice and Qualifying data to run analysis.";
}

// =============================================================================
// Result assembly
// =============================================================================

/// Confidence used when the service omits a car
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Stint count used when `expected_stints` is shorter than the compound sequence
pub const DEFAULT_STINTS: f64 = 1.0;

/// Flat degradation figure attached to every tyre stint
pub const DEFAULT_DEGRADATION: f64 = 0.1;

/// Estimated laps between pit stops; stop `i` is placed on lap `(i + 1) * cadence`
pub const PIT_LAP_CADENCE: u32 = 30;

/// Assembled keys that always come from assembly, never from the prediction entry
pub const TYRE_STRATEGY_KEY: &str = "TYRE_STRATEGY";
pub const PITSTOPS_KEY: &str = "PITSTOPS";
pub const CONFIDENCE_KEY: &str = "CONFIDENCE";

/// Car number key on prediction entries when the service returns an array
pub const CAR_NUMBER_KEY: &str = "NUMBER";

// =============================================================================
// Prediction service defaults
// =============================================================================

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/predict";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RACE_NAME: &str = "IMSA Event";
pub const DEFAULT_DURATION_HOURS: f64 = 6.0;
pub const DEFAULT_TRACK_CONDITIONS: &str = "Dry";
pub const DEFAULT_WEATHER: &str = "Sunny";
pub const DEFAULT_CAR_TYPE: &str = "all";
pub const USER_AGENT: &str = concat!("race_telemetry/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Export layouts
// =============================================================================

/// Tabular export: (header, record field)
pub const CSV_COLUMNS: &[(&str, &str)] = &[
    ("Position", "POSITION"),
    ("Number", "NUMBER"),
    ("Team", "TEAM"),
    ("Class", "CLASS"),
    ("Laps", "LAPS"),
    ("Gap", "GAP_FIRST"),
];

/// Printable report: (header, record field)
pub const REPORT_COLUMNS: &[(&str, &str)] = &[
    ("Pos", "POSITION"),
    ("#", "NUMBER"),
    ("Class", "CLASS"),
    ("Team", "TEAM"),
    ("Laps", "LAPS"),
    ("Gap", "GAP_FIRST"),
    ("Best Lap", "FL_TIME"),
];

pub const REPORT_TITLE: &str = "IMEC-S3 v1.2 Race Analysis Report";
pub const DEFAULT_EXPORT_STEM: &str = "imec-s3-results";

/// Config file location under the user config directory
pub const CONFIG_DIR_NAME: &str = "race-telemetry";
pub const CONFIG_FILE_NAME: &str = "config.toml";
