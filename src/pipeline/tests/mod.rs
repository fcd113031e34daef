//! Tests for the ingestion pipeline
//!
//! Covers single-upload ingestion from bytes and full runs over temporary
//! upload directories.

pub mod ingest_bytes;
pub mod ingest_files;
