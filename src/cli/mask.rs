use anyhow::{Context, Result};
use std::path::PathBuf;

use diaqc::report::parse;

use super::config::Config;

/// Decode a report option mask
pub fn run(mask: Option<String>, config: Option<PathBuf>, json: bool) -> Result<()> {
    let config = match config {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };
    let report = &config.report;
    let mask = mask.unwrap_or_else(|| report.default_mask());

    let matrix = parse(&mask, &report.digit_names(), &report.options())
        .with_context(|| format!("Invalid report mask '{mask}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&matrix.to_map())?);
        return Ok(());
    }

    println!("Mask: {mask}");
    for digit in matrix.digits() {
        println!("  {}:", digit.name);
        for (option, set) in &digit.options {
            println!("    [{}] {option}", if *set { "x" } else { " " });
        }
    }
    Ok(())
}
