//! Sample annotations (`sampleMetadata`, `sampleMetadataTypes`).

use rusqlite::{params, Connection};
use std::collections::{BTreeMap, BTreeSet};

use super::replicates::replicate_ids;
use super::{Result, StoreError};
use crate::diagnostics::Diagnostics;
use crate::metadata::{changed_types, consolidate, Dtype, SampleAnnotations, TypedValue};

/// Stored annotation type of every key
pub(crate) fn metadata_types(conn: &Connection) -> Result<BTreeMap<String, Dtype>> {
    let mut stmt = conn.prepare("SELECT annotationKey, annotationType FROM sampleMetadataTypes")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(key, name)| -> Result<(String, Dtype)> { Ok((key, name.parse::<Dtype>()?)) })
        .collect()
}

/// Keys stored as `STRING` whose every stored value is a null token.
///
/// Such a key was typed `STRING` only because no real value had been seen yet.
fn null_only_keys(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.annotationKey, m.annotationValue
         FROM sampleMetadataTypes t
         JOIN sampleMetadata m ON m.annotationKey = t.annotationKey
         WHERE t.annotationType = ?1",
    )?;
    let rows = stmt
        .query_map(params![Dtype::String.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut null_only: BTreeMap<String, bool> = BTreeMap::new();
    for (key, value) in rows {
        let is_null = value.map_or(true, |v| Dtype::infer(&v) == Dtype::Null);
        *null_only.entry(key).or_insert(true) &= is_null;
    }
    Ok(null_only
        .into_iter()
        .filter_map(|(key, only_nulls)| only_nulls.then_some(key))
        .collect())
}

/// Consolidate `new_types` with the stored types and write the result back.
///
/// Every key of the merged map is upserted. A key that is still `NULL` after
/// merging (only null tokens observed) is stored as `STRING`, the column
/// default, because the stored type domain has no `NULL`. Such a placeholder
/// counts as `NULL` when merging: a later source with real values sets the
/// key's type as if it were new.
pub(crate) fn update_metadata_dtypes(
    conn: &Connection,
    new_types: &BTreeMap<String, Dtype>,
    diagnostics: &mut Diagnostics,
) -> Result<BTreeMap<String, Dtype>> {
    let stored = metadata_types(conn)?;
    let mut existing = stored.clone();
    for key in null_only_keys(conn)? {
        existing.insert(key, Dtype::Null);
    }
    let merged: BTreeMap<String, Dtype> = consolidate(&existing, new_types)
        .into_iter()
        .map(|(key, dtype)| match dtype {
            Dtype::Null => (key, Dtype::String),
            dtype => (key, dtype),
        })
        .collect();

    for (key, old, new) in changed_types(&stored, &merged) {
        match old {
            Some(old) if old > new => {
                log::debug!("Annotation '{key}' had only null values, now typed as {new}")
            }
            Some(old) => diagnostics.info(format!(
                "Annotation '{key}' type widened from {old} to {new}"
            )),
            None => log::debug!("New annotation key '{key}' typed as {new}"),
        }
    }

    let mut stmt = conn.prepare_cached(
        "INSERT INTO sampleMetadataTypes (annotationKey, annotationType) VALUES (?1, ?2)
         ON CONFLICT(annotationKey) DO UPDATE SET annotationType = excluded.annotationType",
    )?;
    for (key, dtype) in &merged {
        stmt.execute(params![key, dtype.as_str()])?;
    }

    Ok(merged)
}

/// Store one project's annotations, consolidating key types first.
///
/// Every annotated replicate must exist in `project`; otherwise nothing is
/// written by the caller's transaction. Returns the number of values stored.
pub(crate) fn insert_sample_metadata(
    conn: &Connection,
    project: &str,
    annotations: &SampleAnnotations,
    diagnostics: &mut Diagnostics,
) -> Result<usize> {
    let ids = replicate_ids(conn, project)?;
    if let Some(missing) = annotations.replicates().find(|r| !ids.contains_key(*r)) {
        return Err(StoreError::UnknownReplicate {
            replicate: missing.to_string(),
            project: project.to_string(),
        });
    }

    update_metadata_dtypes(conn, &annotations.inferred_types(), diagnostics)?;

    let mut stmt = conn.prepare_cached(
        "INSERT INTO sampleMetadata (replicateId, annotationKey, annotationValue) VALUES (?1, ?2, ?3)
         ON CONFLICT(replicateId, annotationKey) DO UPDATE SET annotationValue = excluded.annotationValue",
    )?;
    let mut written = 0;
    for (replicate, key, value) in annotations.iter() {
        stmt.execute(params![ids[replicate], key, value])?;
        written += 1;
    }
    Ok(written)
}

/// Annotations of one replicate, converted with each key's stored type
pub(crate) fn sample_metadata(
    conn: &Connection,
    replicate_id: i64,
) -> Result<BTreeMap<String, TypedValue>> {
    let mut stmt = conn.prepare(
        "SELECT m.annotationKey, m.annotationValue, t.annotationType
         FROM sampleMetadata m
         JOIN sampleMetadataTypes t ON t.annotationKey = m.annotationKey
         WHERE m.replicateId = ?1",
    )?;
    let rows = stmt
        .query_map(params![replicate_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(key, raw, type_name)| -> Result<(String, TypedValue)> {
            let dtype: Dtype = type_name.parse()?;
            Ok((key, dtype.convert(&raw)?))
        })
        .collect()
}
