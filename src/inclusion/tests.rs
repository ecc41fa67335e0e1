use super::*;
use crate::diagnostics::Level;
use crate::store::{DiaDatabase, NewReplicate, Replicate, StoreError};
use chrono::{NaiveDate, NaiveDateTime};

fn t(minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 11, 20)
        .unwrap()
        .and_hms_opt(12, minute, 0)
        .unwrap()
}

fn seeded() -> DiaDatabase {
    let mut db = DiaDatabase::in_memory().unwrap();
    db.insert_replicates(
        "Plasma",
        &[
            NewReplicate::new("P3", t(30), 1.0),
            NewReplicate::new("P1", t(10), 1.0),
            NewReplicate::new("P2", t(20), 1.0),
        ],
    )
    .unwrap();
    db.insert_replicates(
        "Serum",
        &[
            NewReplicate::new("S1", t(15), 1.0),
            NewReplicate::new("S2", t(25), 1.0),
        ],
    )
    .unwrap();
    db
}

fn included_names(db: &DiaDatabase) -> Vec<String> {
    db.included_replicates()
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect()
}

fn assert_dense_ranks(db: &DiaDatabase) {
    let ranks: Vec<i64> = db
        .included_replicates()
        .unwrap()
        .iter()
        .map(|r| r.acquired_rank)
        .collect();
    let expected: Vec<i64> = (0..ranks.len() as i64).collect();
    assert_eq!(ranks, expected);
}

fn snapshot(db: &DiaDatabase) -> (Vec<Replicate>, std::collections::BTreeMap<String, String>) {
    (db.replicates().unwrap(), db.metadata_entries().unwrap())
}

#[test]
fn test_assign_ranks_is_stable_for_ties() {
    let ranks = assign_ranks(vec![(5, t(2)), (3, t(1)), (9, t(1)), (1, t(0))]);
    assert_eq!(ranks, vec![(1, 0), (3, 1), (9, 2), (5, 3)]);
}

#[test]
fn test_exclude_by_name() {
    let mut db = seeded();
    let mut diag = Diagnostics::new("exclude");
    let summary = db.exclude(["P2"], Vec::<String>::new(), &mut diag).unwrap();

    assert_eq!(summary.matched.len(), 1);
    assert_eq!(summary.newly_excluded, 1);
    assert_eq!(summary.redundant, 0);
    assert_eq!(summary.remaining, 4);
    assert_eq!(included_names(&db), vec!["P1", "S1", "S2", "P3"]);
    assert_dense_ranks(&db);
    assert!(diag.is_empty());
}

#[test]
fn test_exclude_by_project() {
    let mut db = seeded();
    let mut diag = Diagnostics::new("exclude");
    db.exclude(Vec::<String>::new(), ["Serum"], &mut diag).unwrap();

    assert_eq!(included_names(&db), vec!["P1", "P2", "P3"]);
    assert_dense_ranks(&db);
}

#[test]
fn test_redundant_exclusion_warns_once_per_replicate() {
    let mut db = seeded();
    let mut diag = Diagnostics::new("exclude");
    let summary = db.exclude(["S1", "P1"], ["Serum"], &mut diag).unwrap();

    assert_eq!(summary.matched.len(), 3);
    assert_eq!(summary.redundant, 1);
    assert_eq!(diag.count(Level::Warning), 1);
    assert!(diag.messages(Level::Warning).next().unwrap().contains("'S1'"));
    assert_eq!(included_names(&db), vec!["P2", "P3"]);
    assert_dense_ranks(&db);
}

#[test]
fn test_exclude_unknown_name_changes_nothing() {
    let mut db = seeded();
    let mut diag = Diagnostics::new("exclude");
    db.exclude(["P1"], Vec::<String>::new(), &mut diag).unwrap();
    let before = snapshot(&db);

    let err = db
        .exclude(["P2", "Missing"], ["Urine", "Serum"], &mut diag)
        .unwrap_err();
    match err {
        StoreError::UnknownExclusionTargets {
            unknown_replicates,
            unknown_projects,
        } => {
            assert_eq!(unknown_replicates, vec!["Missing"]);
            assert_eq!(unknown_projects, vec!["Urine"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(diag.has_errors());
    assert_eq!(snapshot(&db), before);
}

#[test]
fn test_exclude_already_excluded_still_reranks() {
    let mut db = seeded();
    let mut diag = Diagnostics::new("exclude");
    db.exclude(["P1"], Vec::<String>::new(), &mut diag).unwrap();
    let summary = db.exclude(["P1"], Vec::<String>::new(), &mut diag).unwrap();

    assert_eq!(summary.newly_excluded, 0);
    assert_eq!(summary.matched.len(), 1);
    assert_dense_ranks(&db);
}

#[test]
fn test_include_all_restores_original_order() {
    let mut db = seeded();
    let original: Vec<(String, i64)> = db
        .included_replicates()
        .unwrap()
        .into_iter()
        .map(|r| (r.name, r.acquired_rank))
        .collect();

    let mut diag = Diagnostics::new("exclude");
    db.exclude(["P2"], ["Serum"], &mut diag).unwrap();
    assert_eq!(db.include_all().unwrap(), 3);

    let restored: Vec<(String, i64)> = db
        .included_replicates()
        .unwrap()
        .into_iter()
        .map(|r| (r.name, r.acquired_rank))
        .collect();
    assert_eq!(restored, original);
}

#[test]
fn test_include_all_without_exclusions_is_noop() {
    let mut db = seeded();
    db.connection()
        .execute("DELETE FROM metadata WHERE key = ?1", [crate::schema::KEY_RANKS_UPDATED])
        .unwrap();

    assert_eq!(db.include_all().unwrap(), 0);
    // No recomputation happened, so the completion marker was not rewritten
    assert!(db.get_meta_value(crate::schema::KEY_RANKS_UPDATED).is_err());
}

#[test]
fn test_excluded_rank_is_stale_but_unused() {
    let mut db = seeded();
    let mut diag = Diagnostics::new("exclude");
    db.exclude(Vec::<String>::new(), ["Plasma"], &mut diag).unwrap();

    let serum: Vec<i64> = db
        .included_replicates()
        .unwrap()
        .iter()
        .map(|r| r.acquired_rank)
        .collect();
    assert_eq!(serum, vec![0, 1]);
    assert!(db
        .replicates()
        .unwrap()
        .iter()
        .filter(|r| !r.included)
        .all(|r| r.project == "Plasma"));
}
