use crate::metadata::MetadataError;

/// Errors that can occur while reading or writing a QC database
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Error from the SQLite engine
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O error reading an input table
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error in an input table
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Annotation typing or parsing error
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Persisted schema version missing or different from the program's
    #[error(
        "Database schema version ({}) does not match program ({expected})",
        found.as_deref().unwrap_or("None")
    )]
    SchemaVersionMismatch {
        /// Version found in the `metadata` table, if any
        found: Option<String>,
        /// Version this build expects
        expected: &'static str,
    },

    /// Requested key is not in the `metadata` table
    #[error("Could not get key '{0}' from metadata table")]
    MissingMetadataKey(String),

    /// More than one row for the same `metadata` key
    #[error("Key '{key}' occurs {count} times in metadata table")]
    DuplicateMetadataKey {
        /// Duplicated key
        key: String,
        /// Number of rows found
        count: usize,
    },

    /// Exclusion request names replicates or projects that do not exist
    #[error("{}", unknown_names_message(unknown_replicates, unknown_projects))]
    UnknownExclusionTargets {
        /// Replicate names not present in the database
        unknown_replicates: Vec<String>,
        /// Project names not present in the database
        unknown_projects: Vec<String>,
    },

    /// Annotation references a replicate that is not in the project
    #[error("Replicate '{replicate}' not found in project '{project}'")]
    UnknownReplicate {
        /// Replicate name
        replicate: String,
        /// Project name
        project: String,
    },

    /// Stored or supplied acquisition time does not match the time format
    #[error("Invalid acquisition time '{value}': {source}")]
    InvalidTimestamp {
        /// Offending text
        value: String,
        /// Parser error
        #[source]
        source: chrono::ParseError,
    },

    /// Input table is structurally invalid
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

fn unknown_names_message(replicates: &[String], projects: &[String]) -> String {
    let mut parts = Vec::new();
    if !replicates.is_empty() {
        parts.push(format!("unknown replicates: {}", replicates.join(", ")));
    }
    if !projects.is_empty() {
        parts.push(format!("unknown projects: {}", projects.join(", ")));
    }
    format!("Exclusion rejected, {}", parts.join("; "))
}

/// Result type for database operations
pub type Result<T> = std::result::Result<T, StoreError>;
