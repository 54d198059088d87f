//! Remote slot store port and its SQLite-backed implementation.
//!
//! # Responsibility
//! - Define the store contract the commit saga and day loader call.
//! - Serialize access to one SQLite connection across worker threads.
//!
//! # Invariants
//! - Implementations are `Send + Sync`; calls may arrive from commit workers.
//! - A poisoned connection lock surfaces as `RepoError::Unavailable`.

use crate::model::slot::{CompletionStatus, Slot, SlotId};
use crate::repo::slot_repo::{
    RepoError, RepoResult, SchedulePatch, SlotRepository, SqliteSlotRepository,
};
use chrono::NaiveDate;
use log::info;
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

/// Persistent store for slots, addressed per owner.
pub trait RemoteSlotStore: Send + Sync {
    /// Writes the schedule fields of one slot and returns the stored slot.
    fn update_slot_schedule(&self, owner: &str, patch: &SchedulePatch) -> RepoResult<Slot>;
    fn delete_slot(&self, owner: &str, id: SlotId) -> RepoResult<()>;
    fn update_slot_status(
        &self,
        owner: &str,
        id: SlotId,
        status: CompletionStatus,
    ) -> RepoResult<()>;
    fn list_slots_for_date(&self, owner: &str, date: NaiveDate) -> RepoResult<Vec<Slot>>;
}

/// [`RemoteSlotStore`] over a local SQLite database.
pub struct SqliteSlotStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteSlotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSlotStore").finish_non_exhaustive()
    }
}

impl SqliteSlotStore {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Inserts a slot; seeding entry point for tests and the CLI.
    pub fn create_slot(&self, owner: &str, slot: &Slot) -> RepoResult<SlotId> {
        let conn = self.lock()?;
        let id = SqliteSlotRepository::new(&conn).create_slot(owner, slot)?;
        info!("event=slot_create module=repo status=ok slot_id={id}");
        Ok(id)
    }

    pub fn get_slot(&self, owner: &str, id: SlotId) -> RepoResult<Option<Slot>> {
        let conn = self.lock()?;
        SqliteSlotRepository::new(&conn).get_slot(owner, id)
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RepoError::Unavailable("slot store connection lock poisoned".to_owned()))
    }
}

impl RemoteSlotStore for SqliteSlotStore {
    fn update_slot_schedule(&self, owner: &str, patch: &SchedulePatch) -> RepoResult<Slot> {
        let conn = self.lock()?;
        SqliteSlotRepository::new(&conn).update_schedule(owner, patch)
    }

    fn delete_slot(&self, owner: &str, id: SlotId) -> RepoResult<()> {
        let conn = self.lock()?;
        SqliteSlotRepository::new(&conn).delete_slot(owner, id)
    }

    fn update_slot_status(
        &self,
        owner: &str,
        id: SlotId,
        status: CompletionStatus,
    ) -> RepoResult<()> {
        let conn = self.lock()?;
        SqliteSlotRepository::new(&conn).update_status(owner, id, status)
    }

    fn list_slots_for_date(&self, owner: &str, date: NaiveDate) -> RepoResult<Vec<Slot>> {
        let conn = self.lock()?;
        SqliteSlotRepository::new(&conn).list_slots_for_date(owner, date)
    }
}
