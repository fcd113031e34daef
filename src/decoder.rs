//! Upload decoding: delimited text and JSON exports into decoded records.
//!
//! The tabular decoder is minimal. It splits every line on the
//! field delimiter without tracking quote state, so a delimiter inside a
//! quoted field splits that field. Doubled quotes inside an enclosed field are
//! collapsed. Lines with more fields than the header are logged so such
//! exports can be spotted.

use crate::constants::{
    BYTE_ORDER_MARK, CLASSIFICATION_KEY, FIELD_DELIMITER, QUOTE_CHAR, TABULAR_EXTENSION,
};

const QUOTE_STR: &str = "\"";
const DOUBLED_QUOTE: &str = "\"\"";
use crate::models::DecodedRecord;
use serde_json::{Map, Value};
use tracing::debug;

/// How an upload's bytes are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    Tabular,
    Json,
}

impl DecodeMode {
    /// Select the decode mode from the file name alone
    pub fn for_file_name(name: &str) -> Self {
        if name.to_lowercase().ends_with(TABULAR_EXTENSION) {
            DecodeMode::Tabular
        } else {
            DecodeMode::Json
        }
    }
}

/// Decoded content of one upload
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPayload {
    pub mode: DecodeMode,
    pub entries: Vec<DecodedRecord>,
    /// Top-level keys of a JSON object root, kept for content sniffing
    pub root_keys: Vec<String>,
}

impl DecodedPayload {
    pub fn first_entry(&self) -> Option<&DecodedRecord> {
        self.entries.first()
    }

    pub fn has_root_key(&self, key: &str) -> bool {
        self.root_keys.iter().any(|k| k == key)
    }
}

/// Content that could not be decoded in its selected mode
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeFailure {
    pub reason: String,
}

/// Decode raw upload bytes using the mode selected by `name`
pub fn decode_upload(name: &str, bytes: &[u8]) -> Result<DecodedPayload, DecodeFailure> {
    let text = std::str::from_utf8(bytes).map_err(|e| DecodeFailure {
        reason: format!("not valid UTF-8: {e}"),
    })?;
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);

    match DecodeMode::for_file_name(name) {
        DecodeMode::Tabular => Ok(DecodedPayload {
            mode: DecodeMode::Tabular,
            entries: decode_tabular(text),
            root_keys: Vec::new(),
        }),
        DecodeMode::Json => decode_json(text),
    }
}

/// Decode delimited text into records keyed by the header line.
///
/// Blank lines are skipped. Rows shorter than the header keep the trailing
/// keys with a null value; extra fields are dropped.
pub fn decode_tabular(text: &str) -> Vec<DecodedRecord> {
    let mut lines = text.split('\n').filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers = split_fields(header_line);

    lines
        .enumerate()
        .map(|(row, line)| {
            let values = split_fields(line);
            if values.len() > headers.len() {
                debug!(
                    row = row + 1,
                    fields = values.len(),
                    columns = headers.len(),
                    "Row has more fields than header; extra fields dropped"
                );
            }

            let mut values = values.into_iter();
            headers
                .iter()
                .map(|header| {
                    let value = values.next().map_or(Value::Null, Value::String);
                    (header.clone(), value)
                })
                .collect::<Map<String, Value>>()
        })
        .collect()
}

/// Split one line, trimming each token and stripping one enclosing quote layer.
/// Inside an enclosed token a doubled quote stands for one quote.
fn split_fields(line: &str) -> Vec<String> {
    line.split(FIELD_DELIMITER)
        .map(|token| {
            let token = token.trim();
            let enclosed =
                token.len() >= 2 && token.starts_with(QUOTE_CHAR) && token.ends_with(QUOTE_CHAR);
            let token = token.strip_prefix(QUOTE_CHAR).unwrap_or(token);
            let token = token.strip_suffix(QUOTE_CHAR).unwrap_or(token);
            if enclosed {
                token.replace(DOUBLED_QUOTE, QUOTE_STR)
            } else {
                token.to_string()
            }
        })
        .collect()
}

/// Decode a JSON export. An array root holds the entries directly; an object
/// root holds them under `classification` (absent means no entries).
fn decode_json(text: &str) -> Result<DecodedPayload, DecodeFailure> {
    let root: Value = serde_json::from_str(text).map_err(|e| DecodeFailure {
        reason: e.to_string(),
    })?;

    let (items, root_keys) = match root {
        Value::Array(items) => (items, Vec::new()),
        Value::Object(mut map) => {
            let root_keys = map.keys().cloned().collect();
            let items = match map.remove(CLASSIFICATION_KEY) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            (items, root_keys)
        }
        _ => {
            return Err(DecodeFailure {
                reason: "root must be an array or an object".to_string(),
            });
        }
    };

    let entries = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(DecodeFailure {
                reason: format!("entry {} is not an object", index + 1),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DecodedPayload {
        mode: DecodeMode::Json,
        entries,
        root_keys,
    })
}
