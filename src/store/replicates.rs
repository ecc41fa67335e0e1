//! Replicate records (`replicates` table).

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Params};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{Result, StoreError};
use crate::schema::METADATA_TIME_FORMAT;

/// One acquisition run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replicate {
    /// `replicateId`
    pub id: i64,
    /// Replicate name, unique within its project
    pub name: String,
    /// Owning project
    pub project: String,
    /// `includeRep`: whether the replicate takes part in ranking and reports
    pub included: bool,
    /// Acquisition start time
    pub acquired_time: NaiveDateTime,
    /// Position among included replicates by acquisition time.
    /// Stale for excluded replicates.
    pub acquired_rank: i64,
    /// Total ion current area
    pub tic_area: f64,
}

/// A replicate to be ingested
#[derive(Debug, Clone, PartialEq)]
pub struct NewReplicate {
    /// Replicate name
    pub name: String,
    /// Acquisition start time
    pub acquired_time: NaiveDateTime,
    /// Total ion current area
    pub tic_area: f64,
}

impl NewReplicate {
    /// Create a replicate record
    pub fn new(name: impl Into<String>, acquired_time: NaiveDateTime, tic_area: f64) -> Self {
        Self {
            name: name.into(),
            acquired_time,
            tic_area,
        }
    }

    /// Parse replicates from a tab (or, for `.csv`, comma) separated file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Self>> {
        let path = path.as_ref();
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
            _ => b'\t',
        };
        let reader = BufReader::new(File::open(path)?);
        Self::from_reader(reader, delimiter)
    }

    /// Parse a table with `replicate`, `acquiredTime` and `ticArea` columns.
    ///
    /// Times use [`METADATA_TIME_FORMAT`].
    pub fn from_reader<R: BufRead>(reader: R, delimiter: u8) -> Result<Vec<Self>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| StoreError::InvalidInput(format!("missing required column: {name}")))
        };
        let name_idx = column("replicate")?;
        let time_idx = column("acquiredTime")?;
        let tic_idx = column("ticArea")?;

        let mut replicates = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let field = |i: usize| record.get(i).unwrap_or("").trim();

            let name = field(name_idx);
            if name.is_empty() {
                continue;
            }
            let tic_area = field(tic_idx).parse::<f64>().map_err(|_| {
                StoreError::InvalidInput(format!(
                    "ticArea '{}' for '{name}' is not a number",
                    field(tic_idx)
                ))
            })?;

            replicates.push(Self::new(name, parse_acquired_time(field(time_idx))?, tic_area));
        }
        Ok(replicates)
    }
}

/// Parse an acquisition time in [`METADATA_TIME_FORMAT`]
pub fn parse_acquired_time(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, METADATA_TIME_FORMAT).map_err(|source| {
        StoreError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })
}

/// Format an acquisition time for storage
pub fn format_acquired_time(time: &NaiveDateTime) -> String {
    time.format(METADATA_TIME_FORMAT).to_string()
}

/// Insert replicates of one project as included, returning their ids.
///
/// Ranks are left at 0; callers recompute them in the same transaction.
pub(crate) fn insert_replicates(
    conn: &Connection,
    project: &str,
    replicates: &[NewReplicate],
) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO replicates (replicate, project, includeRep, acquiredTime, acquiredRank, ticArea)
         VALUES (?1, ?2, TRUE, ?3, 0, ?4)",
    )?;

    let mut ids = Vec::with_capacity(replicates.len());
    for replicate in replicates {
        stmt.execute(params![
            &replicate.name,
            project,
            format_acquired_time(&replicate.acquired_time),
            replicate.tic_area,
        ])?;
        ids.push(conn.last_insert_rowid());
    }
    Ok(ids)
}

fn query_replicates<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Replicate>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, f64>(6)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(id, name, project, included, time, acquired_rank, tic_area)| -> Result<Replicate> {
            Ok(Replicate {
                id,
                name,
                project,
                included,
                acquired_time: parse_acquired_time(&time)?,
                acquired_rank,
                tic_area,
            })
        })
        .collect()
}

const REPLICATE_COLUMNS: &str =
    "replicateId, replicate, project, includeRep, acquiredTime, acquiredRank, ticArea";

/// All replicates ordered by id
pub(crate) fn all_replicates(conn: &Connection) -> Result<Vec<Replicate>> {
    query_replicates(
        conn,
        &format!("SELECT {REPLICATE_COLUMNS} FROM replicates ORDER BY replicateId"),
        [],
    )
}

/// Included replicates ordered by acquisition rank
pub(crate) fn included_replicates(conn: &Connection) -> Result<Vec<Replicate>> {
    query_replicates(
        conn,
        &format!(
            "SELECT {REPLICATE_COLUMNS} FROM replicates
             WHERE includeRep = TRUE ORDER BY acquiredRank, replicateId"
        ),
        [],
    )
}

/// Distinct project names
pub(crate) fn projects(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT project FROM replicates ORDER BY project")?;
    let projects = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(projects)
}

/// Map of replicate name to id within one project
pub(crate) fn replicate_ids(conn: &Connection, project: &str) -> Result<HashMap<String, i64>> {
    let mut stmt =
        conn.prepare("SELECT replicate, replicateId FROM replicates WHERE project = ?1")?;
    let ids = stmt
        .query_map(params![project], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<HashMap<String, i64>>>()?;
    Ok(ids)
}
