//! Input discovery for ingestion runs
//!
//! Resolves command-line inputs into an ordered list of upload files. An
//! input may be a file, a directory (walked recursively for `.json` and
//! `.csv` files) or a glob pattern. Inputs keep the order they were given
//! in; directory and glob results are sorted by path.

use crate::constants::UPLOAD_EXTENSIONS;
use crate::error::{Result, TelemetryError};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Resolve every input, preserving input order
pub fn resolve_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let resolved = resolve_input(input)?;
        debug!("Input '{}' resolved to {} files", input, resolved.len());
        files.extend(resolved);
    }
    Ok(files)
}

fn resolve_input(input: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(input);

    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if path.is_dir() {
        return discover_uploads(path);
    }

    if is_glob_pattern(input) {
        return expand_glob(input);
    }

    Err(TelemetryError::InputNotFound {
        path: path.to_path_buf(),
    })
}

/// Walk a directory for upload files
pub fn discover_uploads(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| TelemetryError::Io(e.into()))?;
        if entry.file_type().is_file() && is_upload_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| TelemetryError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for path in paths {
        let path = path.map_err(|e| TelemetryError::Io(e.into_error()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Check if a path has an upload extension
fn is_upload_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            UPLOAD_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}
