//! # QC Database Handle
//!
//! [`DiaDatabase`] owns a SQLite connection and exposes every operation on the
//! store. Each public write is one transaction: it either commits completely or
//! rolls back, so no partial batch is ever visible.
//!
//! Opening an existing database runs the schema version gate first; an
//! incompatible database never yields a handle.
//!
//! ```rust
//! use diaqc::diagnostics::Diagnostics;
//! use diaqc::store::{DiaDatabase, NewReplicate};
//! use chrono::NaiveDate;
//!
//! let mut db = DiaDatabase::in_memory()?;
//! let t0 = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! db.insert_replicates("Study", &[
//!     NewReplicate::new("S1", t0, 1.0e9),
//!     NewReplicate::new("S2", t0 + chrono::Duration::hours(1), 1.2e9),
//! ])?;
//!
//! let mut diag = Diagnostics::new("exclude");
//! db.exclude(["S1"], Vec::<String>::new(), &mut diag)?;
//! assert_eq!(db.included_replicates()?[0].name, "S2");
//! # Ok::<(), diaqc::store::StoreError>(())
//! ```

mod annotations;
mod error;
pub(crate) mod global;
pub(crate) mod replicates;


use rusqlite::{Connection, OpenFlags};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::diagnostics::Diagnostics;
use crate::inclusion::{self, ExclusionSummary};
use crate::metadata::{Dtype, SampleAnnotations, TypedValue};
use crate::schema::{
    self, KEY_IS_NORMALIZED, KEY_SCHEMA_VERSION, META_FALSE, SCHEMA_VERSION,
};

pub use error::{Result, StoreError};
pub use global::parse_meta_bool;
pub use replicates::{format_acquired_time, parse_acquired_time, NewReplicate, Replicate};

/// Handle to a QC database
#[derive(Debug)]
pub struct DiaDatabase {
    conn: Connection,
}

impl DiaDatabase {
    /// Create a new database file with an empty schema.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::initialize(Connection::open(path)?)
    }

    /// Create an in-memory database with an empty schema.
    pub fn in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(mut conn: Connection) -> Result<Self> {
        schema::enable_foreign_keys(&conn)?;
        let tx = conn.transaction()?;
        schema::create_tables(&tx)?;
        global::upsert_meta_values(
            &tx,
            [
                (KEY_SCHEMA_VERSION, SCHEMA_VERSION),
                (KEY_IS_NORMALIZED, META_FALSE),
            ],
        )?;
        tx.commit()?;
        log::debug!("Initialized schema version {SCHEMA_VERSION}");
        Ok(Self { conn })
    }

    /// Open an existing database.
    ///
    /// Fails with [`StoreError::SchemaVersionMismatch`] (also recorded in
    /// `diagnostics`) when the stored schema version is not the one this build
    /// expects.
    ///
    /// The file must already exist; `file:` URIs are accepted.
    pub fn open(path: impl AsRef<Path>, diagnostics: &mut Diagnostics) -> Result<Self> {
        // rusqlite's default flags without SQLITE_OPEN_CREATE
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        schema::enable_foreign_keys(&conn)?;
        if let Err(e) = schema::require_schema_version(&conn) {
            diagnostics.error(e.to_string());
            return Err(e);
        }
        Ok(Self { conn })
    }

    /// Underlying connection, for read-only queries outside this API
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run the schema version gate against this database.
    pub fn check_schema_version(&self, diagnostics: &mut Diagnostics) -> bool {
        schema::check_schema_version(&self.conn, diagnostics)
    }

    // ── Key-value metadata ─────────────────────────────────────────────

    /// Read one value from the `metadata` table.
    pub fn get_meta_value(&self, key: &str) -> Result<String> {
        global::meta_value(&self.conn, key)
    }

    /// Insert or overwrite one metadata value.
    pub fn upsert_meta_value(&mut self, key: &str, value: &str) -> Result<()> {
        global::upsert_meta_value(&self.conn, key, value)
    }

    /// Insert or overwrite several metadata values atomically.
    ///
    /// Either every pair is visible afterwards or, on failure, none is.
    pub fn upsert_meta_values<I, K, V>(&mut self, pairs: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let tx = self.conn.transaction()?;
        let written = global::upsert_meta_values(&tx, pairs)?;
        tx.commit()?;
        Ok(written)
    }

    /// Every metadata key and value
    pub fn metadata_entries(&self) -> Result<BTreeMap<String, String>> {
        global::meta_entries(&self.conn)
    }

    /// Whether `is_normalized` is set to a true value
    pub fn is_normalized(&self, diagnostics: &mut Diagnostics) -> Result<bool> {
        global::is_normalized(&self.conn, diagnostics)
    }

    // ── Replicates ─────────────────────────────────────────────────────

    /// Insert replicates of one project and recompute acquisition ranks.
    pub fn insert_replicates(
        &mut self,
        project: &str,
        replicates: &[NewReplicate],
    ) -> Result<Vec<i64>> {
        let tx = self.conn.transaction()?;
        let ids = replicates::insert_replicates(&tx, project, replicates)?;
        inclusion::update_acquired_ranks(&tx)?;
        tx.commit()?;
        log::info!("Inserted {} replicates into project '{project}'", ids.len());
        Ok(ids)
    }

    /// All replicates ordered by id
    pub fn replicates(&self) -> Result<Vec<Replicate>> {
        replicates::all_replicates(&self.conn)
    }

    /// Included replicates ordered by acquisition rank
    pub fn included_replicates(&self) -> Result<Vec<Replicate>> {
        replicates::included_replicates(&self.conn)
    }

    /// Distinct project names
    pub fn projects(&self) -> Result<Vec<String>> {
        replicates::projects(&self.conn)
    }

    // ── Inclusion state ────────────────────────────────────────────────

    /// Exclude replicates by name and whole projects, then recompute ranks.
    ///
    /// All-or-nothing: an unknown name or project rejects the whole request.
    pub fn exclude<R, P>(
        &mut self,
        replicate_names: R,
        project_names: P,
        diagnostics: &mut Diagnostics,
    ) -> Result<ExclusionSummary>
    where
        R: IntoIterator,
        R::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let replicate_names: BTreeSet<String> =
            replicate_names.into_iter().map(Into::into).collect();
        let project_names: BTreeSet<String> = project_names.into_iter().map(Into::into).collect();

        let tx = self.conn.transaction()?;
        let summary = inclusion::exclude(&tx, &replicate_names, &project_names, diagnostics)?;
        tx.commit()?;
        Ok(summary)
    }

    /// Include every replicate; returns how many changed state.
    pub fn include_all(&mut self) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let changed = inclusion::include_all(&tx)?;
        tx.commit()?;
        Ok(changed)
    }

    /// Recompute acquisition ranks of the included replicates.
    pub fn update_acquired_ranks(&mut self) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let ranked = inclusion::update_acquired_ranks(&tx)?;
        tx.commit()?;
        Ok(ranked)
    }

    // ── Sample annotations ─────────────────────────────────────────────

    /// Stored annotation type of every key
    pub fn metadata_types(&self) -> Result<BTreeMap<String, Dtype>> {
        annotations::metadata_types(&self.conn)
    }

    /// Consolidate per-key type observations into the stored types.
    pub fn update_metadata_dtypes(
        &mut self,
        new_types: &BTreeMap<String, Dtype>,
        diagnostics: &mut Diagnostics,
    ) -> Result<BTreeMap<String, Dtype>> {
        let tx = self.conn.transaction()?;
        let merged = annotations::update_metadata_dtypes(&tx, new_types, diagnostics)?;
        tx.commit()?;
        Ok(merged)
    }

    /// Store one project's sample annotations.
    pub fn insert_sample_metadata(
        &mut self,
        project: &str,
        sample_annotations: &SampleAnnotations,
        diagnostics: &mut Diagnostics,
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let written =
            annotations::insert_sample_metadata(&tx, project, sample_annotations, diagnostics)?;
        tx.commit()?;
        log::info!("Stored {written} annotation values for project '{project}'");
        Ok(written)
    }

    /// Typed annotations of one replicate
    pub fn sample_metadata(&self, replicate_id: i64) -> Result<BTreeMap<String, TypedValue>> {
        annotations::sample_metadata(&self.conn, replicate_id)
    }
}
