use rusqlite::Connection;

use super::constants::{KEY_SCHEMA_VERSION, SCHEMA_VERSION};
use crate::diagnostics::Diagnostics;
use crate::store::{global, Result, StoreError};

/// Check that the database was written with the schema this build expects.
///
/// Returns `false` and records an error when `schema_version` is missing,
/// duplicated or not exactly [`SCHEMA_VERSION`]. There is no partial
/// compatibility: any other version is treated as incompatible.
pub fn check_schema_version(conn: &Connection, diagnostics: &mut Diagnostics) -> bool {
    match require_schema_version(conn) {
        Ok(()) => true,
        Err(e) => {
            diagnostics.error(e.to_string());
            false
        }
    }
}

/// Typed form of [`check_schema_version`] for callers that must abort.
pub fn require_schema_version(conn: &Connection) -> Result<()> {
    let found = match global::meta_value(conn, KEY_SCHEMA_VERSION) {
        Ok(version) => Some(version),
        Err(StoreError::MissingMetadataKey(_)) | Err(StoreError::DuplicateMetadataKey { .. }) => {
            None
        }
        Err(e) => return Err(e),
    };

    if found.as_deref() == Some(SCHEMA_VERSION) {
        Ok(())
    } else {
        Err(StoreError::SchemaVersionMismatch {
            found,
            expected: SCHEMA_VERSION,
        })
    }
}
