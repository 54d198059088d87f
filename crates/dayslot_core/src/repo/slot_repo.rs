//! Slot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped CRUD and schedule APIs over `slots` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Slot::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Every statement filters by `owner_id`.

use crate::db::DbError;
use crate::model::slot::{CompletionStatus, Slot, SlotId, SlotValidationError, SubTask};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const SLOT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    slot_date,
    start_at,
    end_at,
    without_time,
    color,
    description,
    subtasks,
    participants,
    status
FROM slots";

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for slot persistence and remote store operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(SlotValidationError),
    Db(DbError),
    NotFound(SlotId),
    InvalidData(String),
    /// The store could not be reached; the call may be retried.
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "slot not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted slot data: {message}"),
            Self::Unavailable(message) => write!(f, "slot store unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<SlotValidationError> for RepoError {
    fn from(value: SlotValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Date/time fields written by a drag commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulePatch {
    pub id: SlotId,
    pub date: Option<NaiveDate>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub without_time: bool,
}

impl SchedulePatch {
    pub fn from_slot(slot: &Slot) -> Self {
        Self {
            id: slot.id,
            date: slot.date,
            start: slot.start,
            end: slot.end,
            without_time: slot.without_time,
        }
    }

    /// Returns `slot` with the patched schedule fields.
    pub fn apply_to(&self, slot: &Slot) -> Slot {
        let mut patched = slot.clone();
        patched.date = self.date;
        patched.start = self.start;
        patched.end = self.end;
        patched.without_time = self.without_time;
        patched
    }
}

/// Repository interface for owner-scoped slot operations.
pub trait SlotRepository {
    fn create_slot(&self, owner: &str, slot: &Slot) -> RepoResult<SlotId>;
    fn update_slot(&self, owner: &str, slot: &Slot) -> RepoResult<()>;
    fn update_schedule(&self, owner: &str, patch: &SchedulePatch) -> RepoResult<Slot>;
    fn update_status(&self, owner: &str, id: SlotId, status: CompletionStatus) -> RepoResult<()>;
    fn get_slot(&self, owner: &str, id: SlotId) -> RepoResult<Option<Slot>>;
    /// Lists slots scheduled on `date`: date-only slots first, then by start.
    fn list_slots_for_date(&self, owner: &str, date: NaiveDate) -> RepoResult<Vec<Slot>>;
    fn delete_slot(&self, owner: &str, id: SlotId) -> RepoResult<()>;
}

/// SQLite-backed slot repository.
pub struct SqliteSlotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SlotRepository for SqliteSlotRepository<'_> {
    fn create_slot(&self, owner: &str, slot: &Slot) -> RepoResult<SlotId> {
        slot.validate()?;

        self.conn.execute(
            "INSERT INTO slots (
                uuid,
                owner_id,
                title,
                slot_date,
                start_at,
                end_at,
                without_time,
                color,
                description,
                subtasks,
                participants,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                slot.id.to_string(),
                owner,
                slot.title.as_str(),
                slot.date.map(date_to_db),
                slot.start.map(datetime_to_db),
                slot.end.map(datetime_to_db),
                bool_to_int(slot.without_time),
                slot.color.as_str(),
                slot.description.as_deref(),
                json_to_db(&slot.subtasks)?,
                json_to_db(&slot.participants)?,
                status_to_db(slot.status),
            ],
        )?;

        Ok(slot.id)
    }

    fn update_slot(&self, owner: &str, slot: &Slot) -> RepoResult<()> {
        slot.validate()?;

        let changed = self.conn.execute(
            "UPDATE slots
             SET
                title = ?1,
                slot_date = ?2,
                start_at = ?3,
                end_at = ?4,
                without_time = ?5,
                color = ?6,
                description = ?7,
                subtasks = ?8,
                participants = ?9,
                status = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?11 AND owner_id = ?12;",
            params![
                slot.title.as_str(),
                slot.date.map(date_to_db),
                slot.start.map(datetime_to_db),
                slot.end.map(datetime_to_db),
                bool_to_int(slot.without_time),
                slot.color.as_str(),
                slot.description.as_deref(),
                json_to_db(&slot.subtasks)?,
                json_to_db(&slot.participants)?,
                status_to_db(slot.status),
                slot.id.to_string(),
                owner,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(slot.id));
        }

        Ok(())
    }

    fn update_schedule(&self, owner: &str, patch: &SchedulePatch) -> RepoResult<Slot> {
        let current = self
            .get_slot(owner, patch.id)?
            .ok_or(RepoError::NotFound(patch.id))?;
        let patched = patch.apply_to(&current);
        patched.validate()?;

        let changed = self.conn.execute(
            "UPDATE slots
             SET
                slot_date = ?1,
                start_at = ?2,
                end_at = ?3,
                without_time = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?5 AND owner_id = ?6;",
            params![
                patched.date.map(date_to_db),
                patched.start.map(datetime_to_db),
                patched.end.map(datetime_to_db),
                bool_to_int(patched.without_time),
                patched.id.to_string(),
                owner,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(patch.id));
        }

        Ok(patched)
    }

    fn update_status(&self, owner: &str, id: SlotId, status: CompletionStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE slots
             SET
                status = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2 AND owner_id = ?3;",
            params![status_to_db(status), id.to_string(), owner],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_slot(&self, owner: &str, id: SlotId) -> RepoResult<Option<Slot>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SLOT_SELECT_SQL}
             WHERE uuid = ?1 AND owner_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), owner])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_slot_row(row)?));
        }

        Ok(None)
    }

    fn list_slots_for_date(&self, owner: &str, date: NaiveDate) -> RepoResult<Vec<Slot>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SLOT_SELECT_SQL}
             WHERE owner_id = ?1 AND slot_date = ?2
             ORDER BY
                CASE WHEN without_time = 1 OR start_at IS NULL THEN 0 ELSE 1 END ASC,
                start_at ASC,
                uuid ASC;"
        ))?;

        let mut rows = stmt.query(params![owner, date_to_db(date)])?;
        let mut slots = Vec::new();
        while let Some(row) = rows.next()? {
            slots.push(parse_slot_row(row)?);
        }

        Ok(slots)
    }

    fn delete_slot(&self, owner: &str, id: SlotId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM slots WHERE uuid = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

/// Counts slots of `owner`; used by diagnostics and tests.
pub fn count_slots(conn: &Connection, owner: &str) -> RepoResult<u64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM slots WHERE owner_id = ?1;",
        [owner],
        |row| row.get::<_, i64>(0),
    )?;
    u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative slot count {count}")))
}

fn parse_slot_row(row: &Row<'_>) -> RepoResult<Slot> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in slots.uuid"))
    })?;

    let date = match row.get::<_, Option<String>>("slot_date")? {
        Some(value) => Some(NaiveDate::parse_from_str(&value, DATE_FORMAT).map_err(|_| {
            RepoError::InvalidData(format!("invalid date `{value}` in slots.slot_date"))
        })?),
        None => None,
    };
    let start = parse_datetime_column(row, "start_at")?;
    let end = parse_datetime_column(row, "end_at")?;

    let without_time = match row.get::<_, i64>("without_time")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid without_time value `{other}` in slots.without_time"
            )));
        }
    };

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in slots.status"))
    })?;

    let subtasks_text: String = row.get("subtasks")?;
    let subtasks: Vec<SubTask> = serde_json::from_str(&subtasks_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid json in slots.subtasks: {err}"))
    })?;
    let participants_text: String = row.get("participants")?;
    let participants: Vec<String> = serde_json::from_str(&participants_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid json in slots.participants: {err}"))
    })?;

    let slot = Slot {
        id,
        title: row.get("title")?,
        date,
        start,
        end,
        without_time,
        color: row.get("color")?,
        description: row.get("description")?,
        subtasks,
        participants,
        status,
    };
    slot.validate()?;
    Ok(slot)
}

fn parse_datetime_column(row: &Row<'_>, column: &str) -> RepoResult<Option<NaiveDateTime>> {
    match row.get::<_, Option<String>>(column)? {
        Some(value) => NaiveDateTime::parse_from_str(&value, DATETIME_FORMAT)
            .map(Some)
            .map_err(|_| {
                RepoError::InvalidData(format!("invalid timestamp `{value}` in slots.{column}"))
            }),
        None => Ok(None),
    }
}

fn date_to_db(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

fn datetime_to_db(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

fn json_to_db<T: serde::Serialize + ?Sized>(value: &T) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode slot json: {err}")))
}

fn status_to_db(status: CompletionStatus) -> &'static str {
    match status {
        CompletionStatus::Auto => "auto",
        CompletionStatus::Completed => "completed",
        CompletionStatus::Incomplete => "incomplete",
    }
}

fn parse_status(value: &str) -> Option<CompletionStatus> {
    match value {
        "auto" => Some(CompletionStatus::Auto),
        "completed" => Some(CompletionStatus::Completed),
        "incomplete" => Some(CompletionStatus::Incomplete),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
