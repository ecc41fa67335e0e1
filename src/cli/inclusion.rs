use anyhow::{Context, Result};
use std::path::PathBuf;

use diaqc::diagnostics::Diagnostics;

use super::{open_database, print_diagnostics};

/// Exclude replicates and projects
pub fn exclude(db: PathBuf, replicates: Vec<String>, projects: Vec<String>) -> Result<()> {
    if replicates.is_empty() && projects.is_empty() {
        anyhow::bail!("Nothing to exclude: pass --replicate and/or --project");
    }

    let mut diag = Diagnostics::new("exclude");
    let mut database = open_database(&db, &mut diag)?;

    let result = database.exclude(replicates, projects, &mut diag);
    print_diagnostics(&diag);
    let summary = result.context("Exclusion failed; no replicates were changed")?;

    println!(
        "Excluded {} replicates ({} newly); {} remain included",
        summary.matched.len(),
        summary.newly_excluded,
        summary.remaining
    );
    Ok(())
}

/// Include every replicate
pub fn include_all(db: PathBuf) -> Result<()> {
    let mut diag = Diagnostics::new("include-all");
    let mut database = open_database(&db, &mut diag)?;

    match database.include_all()? {
        0 => println!("All replicates were already included"),
        n => println!("Included {n} replicates"),
    }
    Ok(())
}

/// Recompute acquisition ranks
pub fn update_ranks(db: PathBuf) -> Result<()> {
    let mut diag = Diagnostics::new("update-ranks");
    let mut database = open_database(&db, &mut diag)?;

    let ranked = database.update_acquired_ranks()?;
    println!("Ranked {ranked} included replicates");
    Ok(())
}
