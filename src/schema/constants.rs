/// Schema version written by this build and required when opening a database
pub const SCHEMA_VERSION: &str = "1.9";

/// Text format of `replicates.acquiredTime`
pub const METADATA_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Metadata key holding the schema version
pub const KEY_SCHEMA_VERSION: &str = "schema_version";

/// Metadata key recording whether normalized values are present
pub const KEY_IS_NORMALIZED: &str = "is_normalized";

/// Metadata key set after acquisition ranks are recomputed
pub const KEY_RANKS_UPDATED: &str = "replicates.acquiredRank updated";

/// Value stored in textual boolean metadata keys
pub const META_TRUE: &str = "True";

/// Value stored in textual boolean metadata keys
pub const META_FALSE: &str = "False";
