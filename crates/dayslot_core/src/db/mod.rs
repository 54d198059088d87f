//! SQLite storage bootstrap for the slot store.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing the slot store.
//! - Bring the `slots` schema up to date and verify it before use.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Returned connections expose every column the slot repository reads.
//! - Slot rows are scoped by `owner_id`; no query crosses owners.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Slot store bootstrap failure.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A schema step failed; nothing from the pending batch was applied.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The file was written by a newer DaySlot build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// `slots` is missing columns although the schema version is current.
    SlotSchemaMismatch { missing: Vec<&'static str> },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "slot schema step {version} ({name}) failed: {source}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "slot store schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::SlotSchemaMismatch { missing } => {
                write!(f, "slots table is missing columns: {}", missing.join(","))
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::SlotSchemaMismatch { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn migration_error_names_the_failed_step() {
        let err = DbError::Migration {
            version: 2,
            name: "slot_order",
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.to_string().contains("step 2 (slot_order)"));
        assert!(err.source().is_some());
    }

    #[test]
    fn schema_mismatch_lists_missing_columns() {
        let err = DbError::SlotSchemaMismatch {
            missing: vec!["start_at", "status"],
        };
        assert_eq!(
            err.to_string(),
            "slots table is missing columns: start_at,status"
        );
        assert!(err.source().is_none());
    }
}
