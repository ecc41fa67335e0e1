use super::Dtype;

/// Errors that can occur during annotation typing and parsing
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// I/O error reading an annotation file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Missing required column in an annotation table
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Annotation input is structurally invalid
    #[error("Invalid annotation format: {0}")]
    InvalidFormat(String),

    /// The same replicate appears more than once in one source
    #[error("Replicate '{0}' is annotated more than once")]
    DuplicateReplicate(String),

    /// Name that does not correspond to any annotation type
    #[error("Unknown annotation type: '{0}'")]
    UnknownDtype(String),

    /// Raw value does not conform to the type it is converted with
    #[error("Cannot convert '{value}' to {dtype}")]
    Conversion {
        /// Raw annotation text
        value: String,
        /// Target type
        dtype: Dtype,
    },
}
