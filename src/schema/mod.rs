//! # QC Database Schema
//!
//! Table definitions, reserved metadata keys and the schema version gate.
//!
//! ## Tables
//!
//! | Table | Key | Description |
//! |-------|-----|-------------|
//! | replicates | replicateId | One acquisition run; unique on (replicate, project) |
//! | sampleMetadataTypes | annotationKey | Authoritative type of each annotation key |
//! | sampleMetadata | (replicateId, annotationKey) | Raw annotation text |
//! | metadata | key | Program metadata (schema version, flags) |
//!
//! ## Versioning
//!
//! A database is usable only when its `schema_version` metadata value equals
//! [`SCHEMA_VERSION`] exactly. Mismatches are detected, never migrated.

mod constants;
mod tables;
mod validation;


pub use constants::*;
pub use tables::{create_tables, enable_foreign_keys, SCHEMA};
pub use validation::{check_schema_version, require_schema_version};
