//! # Sample Annotation Typing
//!
//! Sample annotations arrive as free text (spreadsheets, JSON exports) and are
//! stored untyped in `sampleMetadata`. Each annotation key carries one
//! authoritative type in `sampleMetadataTypes`, inferred from the values and
//! widened when sources disagree.
//!
//! ## Type Lattice
//!
//! ```text
//! NULL < BOOL < INT < FLOAT < STRING
//! ```
//!
//! - [`infer_type`] classifies one token, trying each type in lattice order.
//! - [`Dtype::convert`] turns raw text into a [`TypedValue`] on read.
//! - [`consolidate`] merges the type maps of two sources by taking the lattice
//!   maximum per key.

mod annotations;
mod consolidate;
mod dtype;
mod error;

#[cfg(test)]
mod tests;

pub use annotations::{SampleAnnotations, REPLICATE_COLUMN};
pub use consolidate::{changed_types, consolidate};
pub use dtype::{infer_type, Dtype, TypedValue};
pub use error::MetadataError;
