//! Core data structures for telemetry ingestion and race-result assembly.
//!
//! Defines upload categories, the uploaded-file record kept by the registry,
//! the prediction service request/response contract and the normalized
//! per-car race result consumed by every export.

use crate::constants::{
    CAR_NUMBER_KEY, DEFAULT_CAR_TYPE, DEFAULT_DURATION_HOURS, DEFAULT_RACE_NAME,
    DEFAULT_TRACK_CONDITIONS, DEFAULT_WEATHER,
};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// One decoded row or entry of an upload, keyed by field name
pub type DecodedRecord = Map<String, Value>;

/// Semantic file type assigned to an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Practice,
    Qualifying,
    RaceResults,
    Unknown,
    /// Content could not be decoded at all
    Invalid,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Practice => "practice",
            Category::Qualifying => "qualifying",
            Category::RaceResults => "race-results",
            Category::Unknown => "unknown",
            Category::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user-submitted artifact after decoding, classification and validation.
///
/// Immutable once built. `entries` is `None` exactly when the category is
/// [`Category::Invalid`], and the file is valid exactly when it has no defects.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    name: String,
    category: Category,
    defects: Vec<String>,
    entries: Option<Vec<DecodedRecord>>,
}

impl UploadedFile {
    /// A file whose content decoded successfully
    pub fn decoded(
        name: impl Into<String>,
        category: Category,
        entries: Vec<DecodedRecord>,
        defects: Vec<String>,
    ) -> Self {
        debug_assert!(category != Category::Invalid);
        Self {
            name: name.into(),
            category,
            defects,
            entries: Some(entries),
        }
    }

    /// A file whose content could not be decoded
    pub fn invalid(name: impl Into<String>, defect: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: Category::Invalid,
            defects: vec![defect.into()],
            entries: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_valid(&self) -> bool {
        self.defects.is_empty()
    }

    pub fn defects(&self) -> &[String] {
        &self.defects
    }

    pub fn entries(&self) -> Option<&[DecodedRecord]> {
        self.entries.as_deref()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }
}

/// Operator-supplied race context sent along with the uploads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConditions {
    pub race_name: String,
    pub duration_hours: f64,
    pub track_conditions: String,
    pub weather: String,
    pub car_type: String,
}

impl Default for RaceConditions {
    fn default() -> Self {
        Self {
            race_name: DEFAULT_RACE_NAME.to_string(),
            duration_hours: DEFAULT_DURATION_HOURS,
            track_conditions: DEFAULT_TRACK_CONDITIONS.to_string(),
            weather: DEFAULT_WEATHER.to_string(),
            car_type: DEFAULT_CAR_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceDetails {
    pub race_name: String,
    /// RFC 3339 timestamp of the request
    pub date: String,
    pub duration_hours: f64,
}

/// Body of the single prediction service call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub practice: Vec<DecodedRecord>,
    pub qualifying: Vec<DecodedRecord>,
    pub race_details: RaceDetails,
    pub track_conditions: String,
    pub weather: String,
    pub car_type: String,
}

/// Per-car predicted result rows, in the order the service returned them.
///
/// Accepts either an object keyed by car number or an array of entries that
/// each carry a `NUMBER` field. A repeated car number replaces the earlier
/// entry in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarPredictions {
    entries: Vec<(String, DecodedRecord)>,
}

impl CarPredictions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, car_number: impl Into<String>, fields: DecodedRecord) {
        let car_number = car_number.into();
        match self.entries.iter_mut().find(|(car, _)| *car == car_number) {
            Some((_, existing)) => *existing = fields,
            None => self.entries.push((car_number, fields)),
        }
    }

    pub fn get(&self, car_number: &str) -> Option<&DecodedRecord> {
        self.entries
            .iter()
            .find(|(car, _)| car == car_number)
            .map(|(_, fields)| fields)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodedRecord)> {
        self.entries
            .iter()
            .map(|(car, fields)| (car.as_str(), fields))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_value(value: Value) -> std::result::Result<Self, String> {
        let mut predictions = Self::new();
        match value {
            Value::Object(map) => {
                for (car, fields) in map {
                    match fields {
                        Value::Object(fields) => predictions.insert(car, fields),
                        _ => return Err(format!("prediction for car {car} is not an object")),
                    }
                }
            }
            Value::Array(items) => {
                for (index, item) in items.into_iter().enumerate() {
                    let Value::Object(fields) = item else {
                        return Err(format!("prediction entry {index} is not an object"));
                    };
                    let car = fields
                        .get(CAR_NUMBER_KEY)
                        .and_then(scalar_text)
                        .ok_or_else(|| {
                            format!("prediction entry {index} has no {CAR_NUMBER_KEY}")
                        })?;
                    predictions.insert(car, fields);
                }
            }
            other => {
                return Err(format!(
                    "predictions must be an object or an array, got {}",
                    json_type_name(&other)
                ));
            }
        }
        Ok(predictions)
    }
}

impl<'de> Deserialize<'de> for CarPredictions {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        CarPredictions::from_value(value).map_err(de::Error::custom)
    }
}

impl Serialize for CarPredictions {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (car, fields) in &self.entries {
            map.serialize_entry(car, fields)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TyreStrategy {
    pub compound_sequence: Vec<String>,
    /// A null element falls back to the default stint count
    #[serde(default)]
    pub expected_stints: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PitstopStrategy {
    /// Only the count is used; lap numbers are estimated from position
    pub pit_timestamps: Vec<Value>,
    #[serde(default)]
    pub pit_durations: Vec<Option<f64>>,
}

/// Response contract of the prediction service.
///
/// The three auxiliary maps are looked up by car number and never iterated
/// on their own; a missing map deserializes as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predictions: CarPredictions,
    #[serde(default)]
    pub tyre_strategies: HashMap<String, TyreStrategy>,
    #[serde(default)]
    pub pitstop_strategies: HashMap<String, PitstopStrategy>,
    #[serde(default)]
    pub confidence: HashMap<String, Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TyreStint {
    pub compound: String,
    pub stints: f64,
    pub degradation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitStop {
    pub lap: u32,
    /// Absent when the service listed fewer durations than stops
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// Normalized race result for one car.
///
/// Serializes as the prediction entry's own fields followed by
/// `TYRE_STRATEGY`, `PITSTOPS` and `CONFIDENCE`, which are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResultRecord {
    #[serde(flatten)]
    pub fields: DecodedRecord,
    #[serde(rename = "TYRE_STRATEGY")]
    pub tyre_strategy: Vec<TyreStint>,
    #[serde(rename = "PITSTOPS")]
    pub pitstops: Vec<PitStop>,
    #[serde(rename = "CONFIDENCE")]
    pub confidence: f64,
}

impl RaceResultRecord {
    /// Text form of a base field; `None` when absent or null
    pub fn field_text(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(|value| match value {
            Value::Null => None,
            Value::Array(_) | Value::Object(_) => Some(value.to_string()),
            scalar => scalar_text(scalar),
        })
    }
}

/// Counters reported after an ingestion run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestionStats {
    pub files_seen: usize,
    pub files_valid: usize,
    pub files_flagged: usize,
    pub files_undecodable: usize,
    pub entries_decoded: usize,
    pub processing_time_ms: u128,
}

/// Text of a string, number or bool JSON value
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
