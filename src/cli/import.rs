use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use diaqc::diagnostics::Diagnostics;
use diaqc::metadata::SampleAnnotations;
use diaqc::store::NewReplicate;

use super::{open_database, print_diagnostics};

/// Import replicates for one project
pub fn replicates(db: PathBuf, project: String, file: PathBuf) -> Result<()> {
    let mut diag = Diagnostics::new("import-replicates");
    let mut database = open_database(&db, &mut diag)?;

    let replicates = NewReplicate::from_file(&file)
        .with_context(|| format!("Failed to read replicate table: {}", file.display()))?;
    let ids = database
        .insert_replicates(&project, &replicates)
        .with_context(|| format!("Failed to insert replicates for project '{project}'"))?;

    info!("Imported {} replicates into '{project}'", ids.len());
    println!("Imported {} replicates", ids.len());
    Ok(())
}

/// Import sample annotations for one project
pub fn annotations(db: PathBuf, project: String, file: PathBuf) -> Result<()> {
    let mut diag = Diagnostics::new("import-annotations");
    let mut database = open_database(&db, &mut diag)?;

    let annotations = SampleAnnotations::from_file(&file)
        .with_context(|| format!("Failed to read annotations: {}", file.display()))?;
    let result = database.insert_sample_metadata(&project, &annotations, &mut diag);
    print_diagnostics(&diag);
    let written = result
        .with_context(|| format!("Failed to store annotations for project '{project}'"))?;

    println!(
        "Stored {written} values for {} replicates",
        annotations.len()
    );
    Ok(())
}
