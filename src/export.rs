//! Export rendering for assembled race results
//!
//! Three independent renderings of the same record sequence: pretty JSON,
//! comma-separated text over a fixed column subset, and a fixed-width
//! printable report. Rendering is pure; [`write_exports`] is the only
//! function that touches the filesystem.

use crate::constants::{CSV_COLUMNS, FIELD_DELIMITER, QUOTE_CHAR, REPORT_COLUMNS};
use crate::error::{Result, TelemetryError};
use crate::models::RaceResultRecord;
use clap::ValueEnum;
use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Which renderings to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Full records as pretty-printed JSON
    Json,
    /// Fixed column subset as comma-separated text
    Csv,
    /// Fixed-width printable table
    Report,
    /// Every format
    All,
}

impl ExportFormat {
    pub fn includes(self, other: ExportFormat) -> bool {
        self == ExportFormat::All || self == other
    }
}

/// Render the full record sequence as pretty-printed JSON
pub fn to_json(records: &[RaceResultRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parse a previously exported JSON result collection
pub fn from_json(text: &str) -> Result<Vec<RaceResultRecord>> {
    Ok(serde_json::from_str(text)?)
}

/// Render the tabular column subset.
///
/// Returns `None` for an empty sequence rather than a header-only document.
pub fn to_csv(records: &[RaceResultRecord]) -> Option<String> {
    if records.is_empty() {
        return None;
    }

    let delimiter = FIELD_DELIMITER.to_string();
    let header = CSV_COLUMNS
        .iter()
        .map(|(title, _)| *title)
        .collect::<Vec<_>>()
        .join(&delimiter);

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header);
    for record in records {
        let row = CSV_COLUMNS
            .iter()
            .map(|(_, key)| csv_cell(record.fields.get(*key)))
            .collect::<Vec<_>>()
            .join(&delimiter);
        lines.push(row);
    }

    Some(lines.join("\n"))
}

/// Strings carrying the delimiter or quote are quoted with quotes doubled;
/// everything else is written bare
fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) if text.contains([FIELD_DELIMITER, QUOTE_CHAR]) => {
            let quote = QUOTE_CHAR.to_string();
            let escaped = text.replace(QUOTE_CHAR, &quote.repeat(2));
            format!("{quote}{escaped}{quote}")
        }
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Render the printable report
pub fn to_report(records: &[RaceResultRecord], generated_at: &str, title: &str) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            REPORT_COLUMNS
                .iter()
                .map(|(_, key)| record.field_text(key).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = REPORT_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, (header, _))| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .fold(header.chars().count(), usize::max)
        })
        .collect();

    let mut report = String::new();
    let _ = writeln!(report, "{title}");
    let _ = writeln!(report, "Generated: {generated_at}");
    report.push('\n');

    let headers: Vec<String> = REPORT_COLUMNS.iter().map(|(h, _)| h.to_string()).collect();
    push_row(&mut report, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut report, &rule, &widths);
    for row in &rows {
        push_row(&mut report, row, &widths);
    }

    report
}

fn push_row(report: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    report.push_str(line.trim_end());
    report.push('\n');
}

/// Write the selected renderings to `<dir>/<stem>.{json,csv,txt}`.
///
/// The tabular file is skipped when there are no records. Returns the paths
/// actually written.
pub fn write_exports(
    records: &[RaceResultRecord],
    format: ExportFormat,
    dir: &Path,
    stem: &str,
    title: &str,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| TelemetryError::Export {
        message: format!("cannot create {}: {e}", dir.display()),
    })?;

    let mut written = Vec::new();

    if format.includes(ExportFormat::Json) {
        let path = dir.join(format!("{stem}.json"));
        write_file(&path, &to_json(records)?)?;
        written.push(path);
    }

    if format.includes(ExportFormat::Csv) {
        match to_csv(records) {
            Some(text) => {
                let path = dir.join(format!("{stem}.csv"));
                write_file(&path, &text)?;
                written.push(path);
            }
            None => warn!("No results to export as CSV"),
        }
    }

    if format.includes(ExportFormat::Report) {
        let path = dir.join(format!("{stem}.txt"));
        let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        write_file(&path, &to_report(records, &generated_at, title))?;
        written.push(path);
    }

    info!(files = written.len(), dir = %dir.display(), "Exports written");
    Ok(written)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    debug!("Writing {}", path.display());
    fs::write(path, content).map_err(|e| TelemetryError::Export {
        message: format!("cannot write {}: {e}", path.display()),
    })
}
