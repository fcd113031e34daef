//! Multi-file ingestion tests

use crate::config::TelemetryConfig;
use crate::models::Category;
use crate::pipeline::IngestionPipeline;
use crate::pipeline::discovery::discover_uploads;
use crate::registry::RegistryHandle;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a weekend's worth of uploads
fn create_upload_dir(temp_dir: &TempDir) -> Vec<PathBuf> {
    let uploads = [
        (
            "01_practice_1.json",
            r#"[{"CarNumber":"7","Team":"Porsche Penske","LapTime":"1:35.412"}]"#,
        ),
        (
            "02_qualifying.csv",
            "QualPos,CarNumber,Driver\n1,7,\"F. Nasr\"\n2,31,\"P. Derani\"\n",
        ),
        ("03_notes.json", "this is not json"),
        ("04_race.json", r#"{"classification":[{"POS":1}]}"#),
    ];

    uploads
        .iter()
        .map(|(name, content)| {
            let path = temp_dir.path().join(name);
            fs::write(&path, content).unwrap();
            path
        })
        .collect()
}

#[tokio::test]
async fn test_ingest_all_registers_in_input_order() {
    let temp_dir = TempDir::new().unwrap();
    let paths = create_upload_dir(&temp_dir);
    let registry = RegistryHandle::default();

    let pipeline = IngestionPipeline::new(
        TelemetryConfig::default()
            .without_progress()
            .with_max_concurrent_reads(3),
    );
    let stats = pipeline.ingest_all(&paths, &registry).await;

    assert_eq!(stats.files_seen, 4);
    assert_eq!(stats.files_valid, 3);
    assert_eq!(stats.files_undecodable, 1);
    assert_eq!(stats.files_flagged, 0);
    assert_eq!(stats.entries_decoded, 4);

    let snapshot = registry.snapshot().await;
    let categories: Vec<Category> = snapshot.files().iter().map(|f| f.category()).collect();
    assert_eq!(
        categories,
        vec![
            Category::Practice,
            Category::Qualifying,
            Category::Invalid,
            Category::RaceResults
        ]
    );
    assert!(snapshot.has_valid_data());
    assert!(snapshot.check_eligibility().is_ok());
}

#[tokio::test]
async fn test_unreadable_path_is_registered_invalid() {
    let temp_dir = TempDir::new().unwrap();
    let registry = RegistryHandle::default();
    let pipeline = IngestionPipeline::new(TelemetryConfig::default().without_progress());

    let missing = temp_dir.path().join("practice_gone.json");
    let stats = pipeline.ingest_all(&[missing], &registry).await;

    assert_eq!(stats.files_undecodable, 1);
    let snapshot = registry.snapshot().await;
    assert_eq!(snapshot.get(0).unwrap().name(), "practice_gone.json");
    assert_eq!(snapshot.get(0).unwrap().category(), Category::Invalid);
}

#[tokio::test]
async fn test_duplicate_names_are_kept_by_position() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("practice.json");
    fs::write(&path, r#"[{"Driver":"A"}]"#).unwrap();

    let registry = RegistryHandle::default();
    let pipeline = IngestionPipeline::new(TelemetryConfig::default().without_progress());
    pipeline
        .ingest_all(&[path.clone(), path.clone()], &registry)
        .await;

    let snapshot = registry.snapshot().await;
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.remove(0).len(), 1);
}

#[tokio::test]
async fn test_directory_discovery_feeds_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    create_upload_dir(&temp_dir);
    fs::write(temp_dir.path().join("readme.txt"), "ignored").unwrap();

    let paths = discover_uploads(temp_dir.path()).unwrap();
    assert_eq!(paths.len(), 4);

    let registry = RegistryHandle::default();
    IngestionPipeline::new(TelemetryConfig::default().without_progress())
        .ingest_all(&paths, &registry)
        .await;
    assert_eq!(
        registry.snapshot().await.get(0).unwrap().name(),
        "01_practice_1.json"
    );
}
