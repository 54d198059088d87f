//! Slot schema steps and the post-migration column check.
//!
//! # Invariants
//! - Step versions are strictly increasing; the last one is mirrored to
//!   `PRAGMA user_version`.
//! - Pending steps run in a single transaction.
//! - `verify_slot_schema` agrees with the columns read by
//!   `repo::slot_repo`.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "init_slots",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "slot_order",
        sql: include_str!("0002_slot_order.sql"),
    },
];

/// Columns the slot repository selects and writes.
pub const SLOT_COLUMNS: &[&str] = &[
    "uuid",
    "owner_id",
    "title",
    "slot_date",
    "start_at",
    "end_at",
    "without_time",
    "color",
    "description",
    "subtasks",
    "participants",
    "status",
    "created_at",
    "updated_at",
];

/// Latest schema version known by this binary.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Schema version stored in the connection's `user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Runs every step newer than the stored version.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }
    if from == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in STEPS.iter().filter(|step| step.version > from) {
        let applied = tx
            .execute_batch(step.sql)
            .and_then(|()| tx.execute_batch(&format!("PRAGMA user_version = {};", step.version)));
        if let Err(source) = applied {
            error!(
                "event=db_migrate module=db status=error version={} name={} error={source}",
                step.version, step.name
            );
            return Err(DbError::Migration {
                version: step.version,
                name: step.name,
                source,
            });
        }
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from={from} to={latest}");
    Ok(())
}

/// Checks that `slots` carries every column in [`SLOT_COLUMNS`].
pub fn verify_slot_schema(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('slots');")?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    let missing: Vec<&'static str> = SLOT_COLUMNS
        .iter()
        .copied()
        .filter(|column| !present.iter().any(|name| name == column))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DbError::SlotSchemaMismatch { missing })
    }
}
