use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::schema::{KEY_RANKS_UPDATED, META_TRUE};
use crate::store::replicates::parse_acquired_time;
use crate::store::{global, Result};

/// Assign dense ranks `0..n` by ascending acquisition time.
///
/// The sort is stable: replicates acquired at the same instant keep the order
/// they were given in, so repeated runs over unchanged data assign the same
/// ranks.
pub fn assign_ranks(mut replicates: Vec<(i64, NaiveDateTime)>) -> Vec<(i64, i64)> {
    replicates.sort_by_key(|(_, time)| *time);
    replicates
        .into_iter()
        .enumerate()
        .map(|(rank, (id, _))| (id, rank as i64))
        .collect()
}

/// Recompute `acquiredRank` for every included replicate.
///
/// Excluded replicates keep whatever rank they had. Must run inside the same
/// transaction as the inclusion change that triggered it. Returns the number of
/// ranked replicates.
pub(crate) fn update_acquired_ranks(conn: &Connection) -> Result<usize> {
    let mut stmt = conn.prepare(
        "SELECT replicateId, acquiredTime FROM replicates
         WHERE includeRep = TRUE ORDER BY replicateId",
    )?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let replicates = rows
        .into_iter()
        .map(|(id, time)| -> Result<(i64, NaiveDateTime)> { Ok((id, parse_acquired_time(&time)?)) })
        .collect::<Result<Vec<_>>>()?;

    let ranks = assign_ranks(replicates);
    let mut update =
        conn.prepare_cached("UPDATE replicates SET acquiredRank = ?1 WHERE replicateId = ?2")?;
    for (id, rank) in &ranks {
        update.execute(params![rank, id])?;
    }

    global::upsert_meta_value(conn, KEY_RANKS_UPDATED, META_TRUE)?;
    log::debug!("Updated acquiredRank for {} replicates", ranks.len());
    Ok(ranks.len())
}
