//! # diaqc - DIA QC Database Consistency
//!
//! `diaqc` maintains the SQLite database behind DIA mass spectrometry QC
//! reports: which acquisition replicates take part in the analysis, how they
//! rank by acquisition time, and what type each free-text sample annotation
//! has once several projects are merged.
//!
//! ## Key Features
//!
//! - **Schema gating**: a database opens only when its stored schema version
//!   matches the build exactly.
//!
//! - **Annotation typing**: values are classified on the lattice
//!   `NULL < BOOL < INT < FLOAT < STRING`; conflicting sources widen a key's
//!   type, never narrow it.
//!
//! - **Replicate inclusion**: all-or-nothing exclusion by replicate name or
//!   project, followed by dense re-ranking of the included replicates.
//!
//! - **Report masks**: compact digit strings decoded into named option flags.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use diaqc::diagnostics::Diagnostics;
//! use diaqc::store::DiaDatabase;
//!
//! let mut diag = Diagnostics::new("qc");
//! let mut db = DiaDatabase::open("qc_data.db3", &mut diag)?;
//!
//! let summary = db.exclude(["Blank_01"], ["PilotStudy"], &mut diag)?;
//! println!("{} replicates still included", summary.remaining);
//!
//! if diag.count(diaqc::diagnostics::Level::Warning) > 0 {
//!     println!("{}", diag);
//! }
//! # Ok::<(), diaqc::store::StoreError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`]: type lattice, conversion, consolidation and annotation parsing
//! - [`schema`]: table definitions, reserved keys and the schema version gate
//! - [`store`]: database handle; key-value metadata, replicates, annotations
//! - [`inclusion`]: replicate inclusion transitions and rank recomputation
//! - [`report`]: bitmask option decoding for report configuration
//! - [`diagnostics`]: per-call warning and error collection

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod diagnostics;
pub mod inclusion;
pub mod metadata;
pub mod report;
pub mod schema;
pub mod store;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::diagnostics::{Diagnostics, Level};
    pub use crate::inclusion::ExclusionSummary;
    pub use crate::metadata::{consolidate, infer_type, Dtype, SampleAnnotations, TypedValue};
    pub use crate::report::{parse, validate, BitmaskError, OptionMatrix, ReportOptions};
    pub use crate::schema::SCHEMA_VERSION;
    pub use crate::store::{DiaDatabase, NewReplicate, Replicate, StoreError};
}
