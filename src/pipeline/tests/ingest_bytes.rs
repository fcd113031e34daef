//! Single-upload ingestion tests

use crate::config::TelemetryConfig;
use crate::constants::defects;
use crate::models::Category;
use crate::pipeline::IngestionPipeline;
use serde_json::json;

fn pipeline() -> IngestionPipeline {
    IngestionPipeline::new(TelemetryConfig::default().without_progress())
}

#[test]
fn test_practice_json_is_valid() {
    let file = pipeline().ingest_bytes("practice_1.json", br#"[{"CarNumber":"01","Team":"X"}]"#);

    assert_eq!(file.category(), Category::Practice);
    assert!(file.is_valid());
    assert_eq!(file.entry_count(), 1);
    assert_eq!(file.entries().unwrap()[0]["Team"], json!("X"));
}

#[test]
fn test_tabular_upload_decodes_rows() {
    let file = pipeline().ingest_bytes("data.csv", b"a,b\n1,2\n");

    assert_eq!(file.category(), Category::Unknown);
    assert!(file.is_valid());
    let entries = file.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["a"], json!("1"));
    assert_eq!(entries[0]["b"], json!("2"));
}

#[test]
fn test_undecodable_upload_is_flagged_invalid() {
    let file = pipeline().ingest_bytes("practice.json", b"{\"truncated\": ");

    assert_eq!(file.category(), Category::Invalid);
    assert!(!file.is_valid());
    assert_eq!(file.defects(), &[defects::DECODE_FAILURE.to_string()]);
    assert!(file.entries().is_none());
}

#[test]
fn test_schema_defect_keeps_the_file() {
    let file = pipeline().ingest_bytes("qualifying.json", br#"[{"Speed": 290}]"#);

    assert_eq!(file.category(), Category::Qualifying);
    assert!(!file.is_valid());
    assert_eq!(file.defects().len(), 1);
    assert_eq!(file.entry_count(), 1);
}

#[test]
fn test_object_root_without_classification_fails_session_schema() {
    let file = pipeline().ingest_bytes("practice.json", br#"{"event":"Sebring"}"#);

    assert_eq!(file.category(), Category::Practice);
    assert_eq!(file.defects(), &[defects::NOT_A_SEQUENCE.to_string()]);
    assert_eq!(file.entries().map(<[_]>::len), Some(0));
}

#[test]
fn test_race_results_accepted_without_schema() {
    let file = pipeline().ingest_bytes("race_final.csv", b"whatever,columns\nx,y\n");

    assert_eq!(file.category(), Category::RaceResults);
    assert!(file.is_valid());
}

#[test]
fn test_qualifying_sniffed_from_tabular_content() {
    let file = pipeline().ingest_bytes("export.csv", b"QualPos,CarNumber,Team\n1,7,Penske\n");

    assert_eq!(file.category(), Category::Qualifying);
    assert!(file.is_valid());
}

#[test]
fn test_short_row_keeps_core_field_key() {
    let file = pipeline().ingest_bytes("practice.csv", b"Speed,CarNumber\n301\n");

    assert_eq!(file.category(), Category::Practice);
    assert!(file.is_valid());
    let entries = file.entries().unwrap();
    assert_eq!(entries[0]["Speed"], json!("301"));
    assert_eq!(entries[0]["CarNumber"], serde_json::Value::Null);
}

#[test]
fn test_byte_order_mark_prefixed_uploads() {
    let file = pipeline().ingest_bytes(
        "practice.json",
        "\u{feff}[{\"CarNumber\":\"01\",\"Team\":\"X\"}]".as_bytes(),
    );
    assert_eq!(file.category(), Category::Practice);
    assert!(file.is_valid());

    let file = pipeline().ingest_bytes("export.csv", "\u{feff}QualPos,CarNumber\n1,7\n".as_bytes());
    assert_eq!(file.category(), Category::Qualifying);
    assert!(file.is_valid());
}

#[test]
fn test_validity_matches_defects_for_every_category() {
    let uploads: [(&str, &[u8]); 6] = [
        ("practice.json", br#"[{"Team":"X"}]"#),
        ("practice.json", br#"[{"Nope":1}]"#),
        ("qual.csv", b"position\n1\n"),
        ("race.json", b"[]"),
        ("misc.json", br#"[{"a":1}]"#),
        ("broken.json", b"nope"),
    ];

    for (name, bytes) in uploads {
        let file = pipeline().ingest_bytes(name, bytes);
        assert_eq!(file.is_valid(), file.defects().is_empty(), "{name}");
        assert_eq!(
            file.entries().is_none(),
            file.category() == Category::Invalid,
            "{name}"
        );
    }
}
