//! # Replicate Inclusion
//!
//! Each replicate is either included in downstream ranking and reports or
//! excluded from them (`replicates.includeRep`). Every transition that changes
//! at least one replicate ends by recomputing `acquiredRank`, so included
//! replicates always carry the dense ranks `0..k` ordered by acquisition time.
//!
//! Both transitions run inside the caller's transaction together with the rank
//! recomputation; a failure anywhere leaves the database untouched.

mod ranks;

#[cfg(test)]
mod tests;

use rusqlite::{params, Connection};
use std::collections::{BTreeMap, BTreeSet};

use crate::diagnostics::Diagnostics;
use crate::store::{Result, StoreError};

pub use ranks::assign_ranks;
pub(crate) use ranks::update_acquired_ranks;

/// Outcome of an exclusion request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSummary {
    /// Ids of every replicate matched by name or project
    pub matched: BTreeSet<i64>,
    /// Matched replicates that were still included before the call
    pub newly_excluded: usize,
    /// Matched replicates reached through more than one criterion
    pub redundant: usize,
    /// Included replicates after the call
    pub remaining: usize,
}

/// Exclude replicates by name and by project.
///
/// Every requested name and project must exist; otherwise nothing is changed
/// and [`StoreError::UnknownExclusionTargets`] lists the unknown ones. A
/// replicate matched both by name and by project is excluded once and reported
/// as a warning. Ranks are recomputed afterwards.
pub(crate) fn exclude(
    conn: &Connection,
    replicate_names: &BTreeSet<String>,
    project_names: &BTreeSet<String>,
    diagnostics: &mut Diagnostics,
) -> Result<ExclusionSummary> {
    let mut stmt = conn.prepare(
        "SELECT replicateId, replicate, project, includeRep FROM replicates ORDER BY replicateId",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let known_replicates: BTreeSet<&str> = rows.iter().map(|r| r.1.as_str()).collect();
    let known_projects: BTreeSet<&str> = rows.iter().map(|r| r.2.as_str()).collect();
    let unknown_replicates: Vec<String> = replicate_names
        .iter()
        .filter(|name| !known_replicates.contains(name.as_str()))
        .cloned()
        .collect();
    let unknown_projects: Vec<String> = project_names
        .iter()
        .filter(|name| !known_projects.contains(name.as_str()))
        .cloned()
        .collect();
    if !unknown_replicates.is_empty() || !unknown_projects.is_empty() {
        let err = StoreError::UnknownExclusionTargets {
            unknown_replicates,
            unknown_projects,
        };
        diagnostics.error(err.to_string());
        return Err(err);
    }

    let by_name: Vec<i64> = rows
        .iter()
        .filter(|r| replicate_names.contains(&r.1))
        .map(|r| r.0)
        .collect();
    let by_project: Vec<i64> = rows
        .iter()
        .filter(|r| project_names.contains(&r.2))
        .map(|r| r.0)
        .collect();

    // Effect: set union of both criteria.
    let matched: BTreeSet<i64> = by_name.iter().chain(&by_project).copied().collect();

    // Diagnostic only: how many criteria reached each replicate.
    let mut multiplicity: BTreeMap<i64, usize> = BTreeMap::new();
    for id in by_name.iter().chain(&by_project) {
        *multiplicity.entry(*id).or_default() += 1;
    }
    let mut redundant = 0;
    for (_, name, project, _) in rows
        .iter()
        .filter(|r| multiplicity.get(&r.0).copied().unwrap_or(0) > 1)
    {
        redundant += 1;
        diagnostics.warning(format!(
            "Replicate '{name}' in project '{project}' is excluded by more than one criterion"
        ));
    }

    let newly_excluded = rows
        .iter()
        .filter(|r| r.3 && matched.contains(&r.0))
        .count();

    let mut update =
        conn.prepare_cached("UPDATE replicates SET includeRep = FALSE WHERE replicateId = ?1")?;
    for id in &matched {
        update.execute(params![id])?;
    }

    let remaining = update_acquired_ranks(conn)?;
    log::info!(
        "Excluded {} replicates ({} newly), {} remain included",
        matched.len(),
        newly_excluded,
        remaining
    );

    Ok(ExclusionSummary {
        matched,
        newly_excluded,
        redundant,
        remaining,
    })
}

/// Include every replicate again.
///
/// When nothing was excluded this is a no-op and ranks are left alone.
/// Returns the number of replicates that changed state.
pub(crate) fn include_all(conn: &Connection) -> Result<usize> {
    let excluded: i64 = conn.query_row(
        "SELECT COUNT(*) FROM replicates WHERE includeRep = FALSE",
        [],
        |row| row.get(0),
    )?;
    if excluded == 0 {
        log::info!("All replicates are already included");
        return Ok(0);
    }

    conn.execute(
        "UPDATE replicates SET includeRep = TRUE WHERE includeRep = FALSE",
        [],
    )?;
    update_acquired_ranks(conn)?;
    log::info!("Included {excluded} previously excluded replicates");
    Ok(excluded as usize)
}
