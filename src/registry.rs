//! Ingestion registry: the ordered collection of accepted uploads.
//!
//! [`IngestionRegistry`] is an immutable snapshot. `add` and `remove` return
//! new snapshots and never touch the receiver, so anyone holding an older
//! snapshot keeps seeing a complete, unchanged collection.
//!
//! [`RegistryHandle`] is the single shared holder of the current snapshot.
//! [`RegistryHandle::replace`] is last-write-wins and not merge-safe: a
//! caller that derived its new snapshot from a stale one discards every
//! update made in between. [`RegistryHandle::update`] derives from the
//! latest snapshot under the write lock and is what ingestion uses.

use crate::constants::messages;
use crate::error::{Result, TelemetryError};
use crate::models::{Category, UploadedFile};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct IngestionRegistry {
    files: Arc<[UploadedFile]>,
}

/// The uploads a prediction round is built from
#[derive(Debug, Clone, Copy)]
pub struct EligibleUploads<'a> {
    pub practice: &'a UploadedFile,
    pub qualifying: &'a UploadedFile,
}

impl IngestionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// New snapshot with `file` appended
    pub fn add(&self, file: UploadedFile) -> Self {
        let files = self
            .files
            .iter()
            .cloned()
            .chain(std::iter::once(file))
            .collect();
        Self { files }
    }

    /// New snapshot without the file at `index`; out of range yields an
    /// identical snapshot
    pub fn remove(&self, index: usize) -> Self {
        let files = self
            .files
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, file)| file.clone())
            .collect();
        Self { files }
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn get(&self, index: usize) -> Option<&UploadedFile> {
        self.files.get(index)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// At least one upload passed validation
    pub fn has_valid_data(&self) -> bool {
        self.files.iter().any(UploadedFile::is_valid)
    }

    /// First upload of `category`, in registration order
    pub fn first_of(&self, category: Category) -> Option<&UploadedFile> {
        self.files.iter().find(|file| file.category() == category)
    }

    /// Both a practice and a qualifying upload are present
    pub fn is_prediction_eligible(&self) -> bool {
        self.first_of(Category::Practice).is_some() && self.first_of(Category::Qualifying).is_some()
    }

    /// Check both preconditions of a prediction round
    pub fn check_eligibility(&self) -> Result<EligibleUploads<'_>> {
        if !self.has_valid_data() {
            return Err(TelemetryError::eligibility(messages::NO_VALID_DATA));
        }

        match (
            self.first_of(Category::Practice),
            self.first_of(Category::Qualifying),
        ) {
            (Some(practice), Some(qualifying)) => Ok(EligibleUploads {
                practice,
                qualifying,
            }),
            _ => Err(TelemetryError::eligibility(
                messages::MISSING_PRACTICE_OR_QUALIFYING,
            )),
        }
    }
}

/// Shared holder of the current registry snapshot
#[derive(Debug, Clone, Default)]
pub struct RegistryHandle {
    current: Arc<RwLock<IngestionRegistry>>,
}

impl RegistryHandle {
    pub fn new(initial: IngestionRegistry) -> Self {
        Self {
            current: Arc::new(RwLock::new(initial)),
        }
    }

    pub async fn snapshot(&self) -> IngestionRegistry {
        self.current.read().await.clone()
    }

    /// Install `registry` as the current snapshot. Last write wins.
    pub async fn replace(&self, registry: IngestionRegistry) {
        *self.current.write().await = registry;
    }

    /// Derive the next snapshot from the latest one and install it
    pub async fn update<F>(&self, derive: F) -> IngestionRegistry
    where
        F: FnOnce(&IngestionRegistry) -> IngestionRegistry,
    {
        let mut current = self.current.write().await;
        let next = derive(&*current);
        *current = next.clone();
        next
    }

    pub async fn add(&self, file: UploadedFile) -> IngestionRegistry {
        debug!(file = file.name(), category = %file.category(), "Registering upload");
        self.update(|registry| registry.add(file)).await
    }

    pub async fn remove(&self, index: usize) -> IngestionRegistry {
        self.update(|registry| registry.remove(index)).await
    }
}
