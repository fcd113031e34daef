//! Ingestion pipeline: read, decode, classify, validate, register.
//!
//! Each upload is read asynchronously and decoded on the blocking pool. A
//! malformed upload never fails the run; it is registered as a flagged file
//! so the operator sees it and can replace it.

pub mod discovery;

#[cfg(test)]
pub mod tests;

use crate::classifier::FormatClassifier;
use crate::config::TelemetryConfig;
use crate::constants::defects;
use crate::decoder::decode_upload;
use crate::models::{Category, IngestionStats, UploadedFile};
use crate::registry::RegistryHandle;
use crate::validator::SchemaValidator;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::{fs, task};
use tracing::{debug, info, warn};

/// Turns upload files into registry entries
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    config: TelemetryConfig,
    classifier: FormatClassifier,
    validator: SchemaValidator,
}

impl IngestionPipeline {
    pub fn new(config: TelemetryConfig) -> Self {
        Self {
            config,
            classifier: FormatClassifier::default(),
            validator: SchemaValidator::new(),
        }
    }

    /// Use a custom classification rule set
    pub fn with_classifier(mut self, classifier: FormatClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Decode, classify and validate one upload's content
    pub fn ingest_bytes(&self, name: &str, bytes: &[u8]) -> UploadedFile {
        let payload = match decode_upload(name, bytes) {
            Ok(payload) => payload,
            Err(failure) => {
                warn!(file = name, reason = %failure.reason, "Upload could not be decoded");
                return UploadedFile::invalid(name, defects::DECODE_FAILURE);
            }
        };

        let category = self.classifier.classify(name, Some(&payload));
        let defects = self.validator.validate(category, &payload.entries);

        if defects.is_empty() {
            debug!(file = name, %category, entries = payload.entries.len(), "Upload accepted");
        } else {
            warn!(file = name, %category, defects = defects.len(), "Upload failed schema validation");
        }

        UploadedFile::decoded(name, category, payload.entries, defects)
    }

    /// Read and ingest one upload from disk
    pub async fn ingest_path(&self, path: &Path) -> UploadedFile {
        let name = upload_name(path);

        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %name, error = %e, "Upload could not be read");
                return UploadedFile::invalid(name, defects::DECODE_FAILURE);
            }
        };

        let pipeline = self.clone();
        let task_name = name.clone();
        match task::spawn_blocking(move || pipeline.ingest_bytes(&task_name, &bytes)).await {
            Ok(file) => file,
            Err(e) => {
                warn!(file = %name, error = %e, "Decode task failed");
                UploadedFile::invalid(name, defects::DECODE_FAILURE)
            }
        }
    }

    /// Ingest every path and register the results in input order.
    ///
    /// Reads run concurrently up to the configured limit. Each registration
    /// is derived from the registry's latest snapshot.
    pub async fn ingest_all(&self, paths: &[PathBuf], registry: &RegistryHandle) -> IngestionStats {
        let start_time = Instant::now();
        let mut stats = IngestionStats::default();

        let progress = self.progress_bar(paths.len());

        let mut uploads = stream::iter(paths)
            .map(|path| self.ingest_path(path))
            .buffered(self.config.max_concurrent_reads.max(1));

        while let Some(file) = uploads.next().await {
            stats.files_seen += 1;
            stats.entries_decoded += file.entry_count();
            if file.is_valid() {
                stats.files_valid += 1;
            } else if file.category() == Category::Invalid {
                stats.files_undecodable += 1;
            } else {
                stats.files_flagged += 1;
            }

            if let Some(pb) = &progress {
                pb.set_message(file.name().to_string());
                pb.inc(1);
            }

            registry.add(file).await;
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        stats.processing_time_ms = start_time.elapsed().as_millis();
        info!(
            files = stats.files_seen,
            valid = stats.files_valid,
            flagged = stats.files_flagged,
            undecodable = stats.files_undecodable,
            "Ingestion complete"
        );
        stats
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        if !self.config.show_progress || total < 2 {
            return None;
        }

        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        Some(pb)
    }
}

/// File name used for classification and display
fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
