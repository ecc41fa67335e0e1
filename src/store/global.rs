//! Key-value program metadata (`metadata` table).

use rusqlite::{params, Connection};
use std::collections::BTreeMap;

use super::{Result, StoreError};
use crate::diagnostics::Diagnostics;
use crate::schema::KEY_IS_NORMALIZED;

/// Read one metadata value.
///
/// Fails when the key is absent (or stored as SQL NULL) and when more than one
/// row exists for it.
pub(crate) fn meta_value(conn: &Connection, key: &str) -> Result<String> {
    let mut stmt = conn.prepare("SELECT value FROM metadata WHERE key = ?1")?;
    let values = stmt
        .query_map(params![key], |row| row.get::<_, Option<String>>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    match values.as_slice() {
        [Some(value)] => Ok(value.clone()),
        [] | [None] => Err(StoreError::MissingMetadataKey(key.to_string())),
        _ => Err(StoreError::DuplicateMetadataKey {
            key: key.to_string(),
            count: values.len(),
        }),
    }
}

/// Insert a key or overwrite its value.
pub(crate) fn upsert_meta_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// Upsert every pair through one prepared statement.
///
/// Callers provide the transaction; a failure part way leaves the rollback to
/// them.
pub(crate) fn upsert_meta_values<I, K, V>(conn: &Connection, pairs: I) -> Result<usize>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut stmt = conn.prepare_cached(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )?;
    let mut written = 0;
    for (key, value) in pairs {
        stmt.execute(params![key.as_ref(), value.as_ref()])?;
        written += 1;
    }
    Ok(written)
}

/// All metadata rows. SQL NULL values are returned as empty strings.
pub(crate) fn meta_entries(conn: &Connection) -> Result<BTreeMap<String, String>> {
    let mut stmt = conn.prepare("SELECT key, value FROM metadata")?;
    let entries = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            ))
        })?
        .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;
    Ok(entries)
}

/// Interpret a textual metadata boolean; `"true"` and `"1"` in any case are true.
pub fn parse_meta_bool(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("true") || value == "1"
}

/// Whether normalized values are available.
///
/// A missing key or any value other than a true spelling yields `false` with a
/// warning, so callers fall back to unnormalized values.
pub(crate) fn is_normalized(conn: &Connection, diagnostics: &mut Diagnostics) -> Result<bool> {
    let value = match meta_value(conn, KEY_IS_NORMALIZED) {
        Ok(value) => value,
        Err(e @ StoreError::MissingMetadataKey(_))
        | Err(e @ StoreError::DuplicateMetadataKey { .. }) => {
            diagnostics.warning(e.to_string());
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    if parse_meta_bool(&value) {
        Ok(true)
    } else {
        diagnostics.warning(format!(
            "metadata.{KEY_IS_NORMALIZED} is '{value}'. Only using unnormalized values."
        ));
        Ok(false)
    }
}
