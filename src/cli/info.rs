use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use diaqc::diagnostics::Diagnostics;
use diaqc::metadata::Dtype;
use diaqc::schema::{KEY_SCHEMA_VERSION, SCHEMA_VERSION};
use diaqc::store::{format_acquired_time, DiaDatabase, Replicate};

use super::{open_database, print_diagnostics};

/// Create a new database
pub fn init(db: PathBuf) -> Result<()> {
    if db.exists() {
        anyhow::bail!("Refusing to overwrite existing file: {}", db.display());
    }
    DiaDatabase::create(&db)
        .with_context(|| format!("Failed to create database: {}", db.display()))?;
    info!("Created {} (schema version {SCHEMA_VERSION})", db.display());
    Ok(())
}

/// Run the schema version gate; exits with status 1 on mismatch
pub fn check(db: PathBuf) -> Result<()> {
    let mut diag = Diagnostics::new("check");
    match open_database(&db, &mut diag) {
        Ok(_) => {
            println!("{}: schema version {SCHEMA_VERSION} OK", db.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("{e:#}");
            std::process::exit(1);
        }
    }
}

#[derive(Serialize)]
struct DatabaseInfo {
    schema_version: String,
    is_normalized: bool,
    replicates: Vec<Replicate>,
    annotation_types: BTreeMap<String, Dtype>,
}

/// Display information about a database
pub fn run(db: PathBuf, json: bool) -> Result<()> {
    let mut diag = Diagnostics::new("info");
    let database = open_database(&db, &mut diag)?;

    let summary = DatabaseInfo {
        schema_version: database.get_meta_value(KEY_SCHEMA_VERSION)?,
        is_normalized: database.is_normalized(&mut diag)?,
        replicates: database.replicates()?,
        annotation_types: database.metadata_types()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let included = summary.replicates.iter().filter(|r| r.included).count();

    println!("diaqc Database Information");
    println!("==========================");
    println!("File: {}", db.display());
    println!("Schema version: {}", summary.schema_version);
    println!("Normalized: {}", summary.is_normalized);
    println!(
        "Replicates: {} ({} included, {} excluded)",
        summary.replicates.len(),
        included,
        summary.replicates.len() - included
    );
    println!();

    println!("Replicates:");
    for replicate in &summary.replicates {
        let rank = if replicate.included {
            replicate.acquired_rank.to_string()
        } else {
            "-".to_string()
        };
        println!(
            "  {:>4}  {:<30} {:<20} {}  {}",
            rank,
            replicate.name,
            replicate.project,
            format_acquired_time(&replicate.acquired_time),
            if replicate.included { "" } else { "(excluded)" }
        );
    }
    println!();

    if !summary.annotation_types.is_empty() {
        println!("Annotation types:");
        for (key, dtype) in &summary.annotation_types {
            println!("  {key}: {dtype}");
        }
    }

    print_diagnostics(&diag);
    Ok(())
}
