use super::bitmask::{parse, BitmaskError, OptionMatrix};

/// Digit positions of a report table mask
pub const TABLE_DIGITS: [&str; 2] = ["tables", "normalization"];

/// Options toggled by each digit of a report table mask
pub const TABLE_OPTIONS: [&str; 3] = ["precursors", "proteins", "replicates"];

/// Mask used when none is given: every table, unnormalized only
pub const DEFAULT_TABLE_MASK: &str = "70";

/// Table generation settings decoded from a two digit mask.
///
/// Digit 0 selects which tables are written, digit 1 which of them also get
/// normalized values. Each digit is octal: bit 0 precursors, bit 1 proteins,
/// bit 2 replicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    matrix: OptionMatrix,
}

impl ReportOptions {
    /// Validate and decode `mask`
    pub fn from_mask(mask: &str) -> Result<Self, BitmaskError> {
        Ok(Self {
            matrix: parse(mask, &TABLE_DIGITS, &TABLE_OPTIONS)?,
        })
    }

    /// Whether the table for `option` is written
    pub fn writes(&self, option: &str) -> bool {
        self.matrix.get(TABLE_DIGITS[0], option).unwrap_or(false)
    }

    /// Whether normalized values are written for `option`
    pub fn normalizes(&self, option: &str) -> bool {
        self.matrix.get(TABLE_DIGITS[1], option).unwrap_or(false)
    }

    /// Decoded option matrix
    pub fn matrix(&self) -> &OptionMatrix {
        &self.matrix
    }
}
