//! TOML configuration file support.
//!
//! Report masks can be decoded with project-specific names:
//!
//! ```toml
//! # diaqc.toml
//! [report]
//! digit_names = ["tables", "normalization"]
//! options = ["precursors", "proteins", "replicates"]
//! default_mask = "70"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use diaqc::report::{DEFAULT_TABLE_MASK, TABLE_DIGITS, TABLE_OPTIONS};

/// Root configuration structure for diaqc.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Report mask settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Configuration for report mask decoding.
#[derive(Debug, Default, Deserialize)]
pub struct ReportConfig {
    /// Name of each mask digit, in order.
    pub digit_names: Option<Vec<String>>,

    /// Option toggled by each bit, least significant first.
    pub options: Option<Vec<String>>,

    /// Mask used when none is given on the command line.
    pub default_mask: Option<String>,
}

impl ReportConfig {
    pub fn digit_names(&self) -> Vec<String> {
        self.digit_names
            .clone()
            .unwrap_or_else(|| TABLE_DIGITS.iter().map(|s| s.to_string()).collect())
    }

    pub fn options(&self) -> Vec<String> {
        self.options
            .clone()
            .unwrap_or_else(|| TABLE_OPTIONS.iter().map(|s| s.to_string()).collect())
    }

    pub fn default_mask(&self) -> String {
        self.default_mask
            .clone()
            .unwrap_or_else(|| DEFAULT_TABLE_MASK.to_string())
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
