//! Integration tests for diaqc
//!
//! These tests exercise on-disk databases through the public API.

use chrono::{NaiveDate, NaiveDateTime};
use diaqc::diagnostics::{Diagnostics, Level};
use diaqc::metadata::{Dtype, SampleAnnotations, TypedValue};
use diaqc::schema::{KEY_SCHEMA_VERSION, SCHEMA_VERSION};
use diaqc::store::{DiaDatabase, NewReplicate, StoreError};
use rusqlite::Connection;
use std::collections::BTreeMap;
use tempfile::tempdir;

fn t(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn populate(db: &mut DiaDatabase) {
    db.insert_replicates(
        "Study",
        &[
            NewReplicate::new("Study_03", t(3, 9), 2.0e9),
            NewReplicate::new("Study_01", t(1, 9), 2.1e9),
            NewReplicate::new("Study_02", t(2, 9), 1.9e9),
        ],
    )
    .unwrap();
    db.insert_replicates(
        "QC",
        &[
            NewReplicate::new("QC_01", t(1, 8), 3.0e9),
            NewReplicate::new("QC_02", t(3, 8), 3.1e9),
        ],
    )
    .unwrap();
}

/// Create, close and reopen a database file through the schema gate
#[test]
fn test_create_and_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("qc.db3");

    {
        let mut db = DiaDatabase::create(&path).unwrap();
        populate(&mut db);
    }

    let mut diag = Diagnostics::new("open");
    let db = DiaDatabase::open(&path, &mut diag).unwrap();
    assert!(diag.is_empty());
    assert_eq!(db.replicates().unwrap().len(), 5);

    let order: Vec<String> = db
        .included_replicates()
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(
        order,
        vec!["QC_01", "Study_01", "Study_02", "QC_02", "Study_03"]
    );
}

/// A database written by another schema version never yields a handle
#[test]
fn test_open_rejects_schema_mismatch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("old.db3");
    {
        let mut db = DiaDatabase::create(&path).unwrap();
        db.upsert_meta_value(KEY_SCHEMA_VERSION, "1.7").unwrap();
    }

    let mut diag = Diagnostics::new("open");
    let result = DiaDatabase::open(&path, &mut diag);
    assert!(matches!(
        result,
        Err(StoreError::SchemaVersionMismatch { found: Some(ref v), expected }) if v == "1.7" && expected == SCHEMA_VERSION
    ));
    assert_eq!(diag.count(Level::Error), 1);
}

/// Opening a file without the metadata table fails instead of creating one
#[test]
fn test_open_rejects_foreign_database() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("other.db3");
    Connection::open(&path)
        .unwrap()
        .execute("CREATE TABLE unrelated (x INTEGER)", [])
        .unwrap();

    let mut diag = Diagnostics::new("open");
    assert!(DiaDatabase::open(&path, &mut diag).is_err());
}

/// Opening never creates a file, and accepts SQLite `file:` URIs
#[test]
fn test_open_existing_only_and_uri() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.db3");
    let mut diag = Diagnostics::new("open");
    assert!(matches!(
        DiaDatabase::open(&missing, &mut diag),
        Err(StoreError::Sqlite(_))
    ));
    assert!(!missing.exists());

    let path = dir.path().join("uri.db3");
    DiaDatabase::create(&path).unwrap();
    let uri = format!("file:{}?mode=rw", path.display());
    let db = DiaDatabase::open(&uri, &mut diag).unwrap();
    assert_eq!(db.get_meta_value(KEY_SCHEMA_VERSION).unwrap(), SCHEMA_VERSION);
    assert!(diag.is_empty());
}

/// A failure part way through a batch upsert leaves no key behind
#[test]
fn test_upsert_many_is_atomic() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("atomic.db3");
    let mut db = DiaDatabase::create(&path).unwrap();
    db.upsert_meta_value("b_existing", "old").unwrap();

    db.connection()
        .execute_batch(
            "CREATE TRIGGER reject_boom BEFORE INSERT ON metadata
             WHEN NEW.key = 'c_boom'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();
    let before = db.metadata_entries().unwrap();

    let batch: BTreeMap<&str, &str> = [("a_new", "1"), ("b_existing", "new"), ("c_boom", "x"), ("d_new", "2")]
        .into_iter()
        .collect();
    assert!(db.upsert_meta_values(batch).is_err());

    assert_eq!(db.metadata_entries().unwrap(), before);
    assert_eq!(db.get_meta_value("b_existing").unwrap(), "old");
    assert!(db.get_meta_value("a_new").is_err());

    // Without the failing key the same batch commits completely
    let batch = [("a_new", "1"), ("b_existing", "new")];
    assert_eq!(db.upsert_meta_values(batch).unwrap(), 2);
    assert_eq!(db.get_meta_value("b_existing").unwrap(), "new");
}

/// Failed exclusion leaves every table unchanged
#[test]
fn test_failed_exclusion_snapshot() {
    let mut db = DiaDatabase::in_memory().unwrap();
    populate(&mut db);

    let dump = |db: &DiaDatabase| -> Vec<(i64, bool, i64)> {
        let mut stmt = db
            .connection()
            .prepare("SELECT replicateId, includeRep, acquiredRank FROM replicates ORDER BY replicateId")
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        rows
    };
    let before = (dump(&db), db.metadata_entries().unwrap());

    let mut diag = Diagnostics::new("exclude");
    let result = db.exclude(["Study_01", "Study_99"], ["QC"], &mut diag);
    assert!(matches!(result, Err(StoreError::UnknownExclusionTargets { .. })));

    assert_eq!((dump(&db), db.metadata_entries().unwrap()), before);
}

/// Full workflow: annotate two projects, exclude, re-include
#[test]
fn test_annotation_and_inclusion_workflow() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("workflow.db3");
    let mut db = DiaDatabase::create(&path).unwrap();
    populate(&mut db);

    let study = SampleAnnotations::from_reader(
        std::io::Cursor::new(
            "replicate\tdose\tcontrol\nStudy_01\t0\tTRUE\nStudy_02\t5\tFALSE\nStudy_03\t10\tFALSE",
        ),
        b'\t',
    )
    .unwrap();
    let qc = SampleAnnotations::from_json(
        r#"{"QC_01": {"dose": "NA", "control": "pooled"}, "QC_02": {"dose": 2.5, "control": "pooled"}}"#,
    )
    .unwrap();

    let mut diag = Diagnostics::new("annotations");
    db.insert_sample_metadata("Study", &study, &mut diag).unwrap();
    db.insert_sample_metadata("QC", &qc, &mut diag).unwrap();

    let types = db.metadata_types().unwrap();
    assert_eq!(types["dose"], Dtype::Float);
    assert_eq!(types["control"], Dtype::String);

    let study_02 = db
        .replicates()
        .unwrap()
        .into_iter()
        .find(|r| r.name == "Study_02")
        .unwrap();
    let values = db.sample_metadata(study_02.id).unwrap();
    assert_eq!(values["dose"], TypedValue::Float(5.0));
    assert_eq!(values["control"], TypedValue::String("FALSE".to_string()));

    let mut diag = Diagnostics::new("exclude");
    let summary = db.exclude(["QC_01"], ["QC"], &mut diag).unwrap();
    assert_eq!(summary.redundant, 1);
    assert_eq!(summary.remaining, 3);
    assert_eq!(diag.count(Level::Warning), 1);

    let ranks: Vec<(String, i64)> = db
        .included_replicates()
        .unwrap()
        .into_iter()
        .map(|r| (r.name, r.acquired_rank))
        .collect();
    assert_eq!(
        ranks,
        vec![
            ("Study_01".to_string(), 0),
            ("Study_02".to_string(), 1),
            ("Study_03".to_string(), 2)
        ]
    );

    assert_eq!(db.include_all().unwrap(), 2);
    assert_eq!(db.include_all().unwrap(), 0);
    assert_eq!(db.included_replicates().unwrap().len(), 5);
}
