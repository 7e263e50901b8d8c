//! Shared primitive aliases.

/// All database primary keys are PostgreSQL BIGSERIAL. External
/// (transport) user ids share the same width.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
