use anyhow::Result;
use std::path::PathBuf;

use diaqc::diagnostics::Diagnostics;

use super::open_database;

/// Print one metadata value
pub fn get(db: PathBuf, key: String) -> Result<()> {
    let mut diag = Diagnostics::new("get-meta");
    let database = open_database(&db, &mut diag)?;

    println!("{}", database.get_meta_value(&key)?);
    Ok(())
}

/// Set metadata values from KEY=VALUE pairs
pub fn set(db: PathBuf, pairs: Vec<String>) -> Result<()> {
    let parsed = parse_pairs(&pairs)?;

    let mut diag = Diagnostics::new("set-meta");
    let mut database = open_database(&db, &mut diag)?;

    let written = database.upsert_meta_values(parsed)?;
    println!("Updated {written} metadata keys");
    Ok(())
}

fn parse_pairs(pairs: &[String]) -> Result<Vec<(&str, &str)>> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key, value)),
            _ => anyhow::bail!("Expected KEY=VALUE, got '{pair}'"),
        })
        .collect()
}
