use rusqlite::Connection;

/// Table and column names are part of the on-disk compatibility surface;
/// downstream report scripts query them directly.
pub const SCHEMA: [&str; 4] = [
    "CREATE TABLE replicates (
        replicateId INTEGER PRIMARY KEY,
        replicate TEXT NOT NULL,
        project TEXT NOT NULL,
        includeRep BOOL NOT NULL DEFAULT TRUE,
        acquiredTime BLOB NOT NULL,
        acquiredRank INTEGER NOT NULL,
        ticArea REAL NOT NULL,
        UNIQUE(replicate, project) ON CONFLICT FAIL
    )",
    "CREATE TABLE sampleMetadataTypes (
        annotationKey TEXT NOT NULL,
        annotationType VARCHAR(6) CHECK( annotationType IN ('BOOL', 'INT', 'FLOAT', 'STRING')) NOT NULL DEFAULT 'STRING',
        PRIMARY KEY (annotationKey)
    )",
    "CREATE TABLE sampleMetadata (
        replicateId INTEGER NOT NULL,
        annotationKey TEXT NOT NULL,
        annotationValue TEXT,
        PRIMARY KEY (replicateId, annotationKey),
        FOREIGN KEY (replicateId) REFERENCES replicates(replicateId) ON DELETE CASCADE,
        FOREIGN KEY (annotationKey) REFERENCES sampleMetadataTypes(annotationKey) ON DELETE CASCADE
    )",
    "CREATE TABLE metadata (
        key TEXT NOT NULL,
        value TEXT,
        PRIMARY KEY (key)
    )",
];

/// Enable foreign key enforcement for this connection.
///
/// SQLite leaves foreign keys off by default and the setting is per connection,
/// so it is applied on every open.
pub fn enable_foreign_keys(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", true)
}

/// Create every table of the schema.
pub fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    for statement in SCHEMA {
        conn.execute(statement, [])?;
    }
    Ok(())
}
