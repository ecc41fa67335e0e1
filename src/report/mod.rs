//! # Report Option Masks
//!
//! Report generation is configured with short digit strings. Each digit is a
//! bitfield whose bits switch named options on or off:
//!
//! ```text
//! mask  "53"
//!        │└── normalization: 3 = 0b011 → precursors, proteins
//!        └─── tables:        5 = 0b101 → precursors, replicates
//! ```
//!
//! Decoding is pure; nothing here touches the database.
//!
//! ```rust
//! use diaqc::report::parse;
//!
//! let matrix = parse("07", &["gen", "norm"], &["a", "b", "c"])?;
//! assert_eq!(matrix.get("norm", "c"), Some(true));
//! assert_eq!(matrix.get("gen", "a"), Some(false));
//! # Ok::<(), diaqc::report::BitmaskError>(())
//! ```

mod bitmask;
mod options;


pub use bitmask::{max_digit, parse, validate, BitmaskError, DigitOptions, OptionMatrix, MAX_OPTIONS};
pub use options::{ReportOptions, DEFAULT_TABLE_MASK, TABLE_DIGITS, TABLE_OPTIONS};
