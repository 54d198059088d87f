//! Commit and rollback saga for finished drags.
//!
//! # Responsibility
//! - Apply the optimistic cross-day move to the local cache.
//! - Persist the new schedule with bounded retry and exponential backoff.
//! - Compensate from the pre-mutation snapshot when persistence fails.
//!
//! # Invariants
//! - Same-day releases never touch the cache or the store.
//! - The optimistic step always runs on the caller before any I/O.
//! - Both affected days are owned by the saga until it finishes, so fetch
//!   merges cannot overwrite the optimistic state.
//! - The compensating mutation is derived from the snapshot only.

use crate::cache::slot_cache::{lock_cache, CacheMoveSnapshot, SharedSlotCache};
use crate::config::RetryPolicy;
use crate::gesture::controller::DragOutcome;
use crate::model::slot::Slot;
use crate::repo::slot_repo::{RepoError, SchedulePatch};
use crate::repo::slot_store::RemoteSlotStore;
use chrono::NaiveDate;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Blocking wait between retry attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Day move requested by a finished drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub slot: Slot,
    pub source_day: NaiveDate,
    pub target_day: NaiveDate,
}

impl CommitRequest {
    pub fn new(slot: Slot, source_day: NaiveDate, target_day: NaiveDate) -> Self {
        Self {
            slot,
            source_day,
            target_day,
        }
    }

    pub fn from_outcome(outcome: &DragOutcome) -> Self {
        Self::new(outcome.slot.clone(), outcome.source_day, outcome.target_day)
    }

    pub fn is_same_day(&self) -> bool {
        self.source_day == self.target_day
    }
}

/// Error reported by a rolled back commit.
#[derive(Debug)]
pub enum CommitError {
    /// Every attempt failed; carries the last store error.
    Store { attempts: u32, source: RepoError },
    /// The commit worker could not be started.
    Spawn(std::io::Error),
    /// The commit worker panicked before reporting an outcome.
    WorkerPanicked,
}

impl Display for CommitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store { attempts, source } => {
                write!(f, "slot commit failed after {attempts} attempt(s): {source}")
            }
            Self::Spawn(err) => write!(f, "failed to start commit worker: {err}"),
            Self::WorkerPanicked => write!(f, "commit worker panicked"),
        }
    }
}

impl Error for CommitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store { source, .. } => Some(source),
            Self::Spawn(err) => Some(err),
            Self::WorkerPanicked => None,
        }
    }
}

/// Final state of one commit saga.
#[derive(Debug)]
pub enum CommitOutcome {
    /// Same-day release; nothing persisted.
    Skipped,
    Committed { slot: Slot, attempts: u32 },
    /// Persistence failed and the cache was restored.
    RolledBack(CommitError),
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, Self::RolledBack(_))
    }
}

/// Saga whose optimistic step is already applied to the cache.
#[derive(Debug)]
pub struct PendingCommit {
    snapshot: CacheMoveSnapshot,
}

impl PendingCommit {
    pub fn snapshot(&self) -> &CacheMoveSnapshot {
        &self.snapshot
    }
}

/// Handle returned by [`CommitController::spawn`].
#[derive(Debug)]
pub enum CommitTicket {
    Finished(CommitOutcome),
    Running(JoinHandle<CommitOutcome>),
}

impl CommitTicket {
    /// Whether `wait` would return without blocking.
    pub fn is_finished(&self) -> bool {
        match self {
            Self::Finished(_) => true,
            Self::Running(handle) => handle.is_finished(),
        }
    }

    /// Blocks until the saga finishes.
    pub fn wait(self) -> CommitOutcome {
        match self {
            Self::Finished(outcome) => outcome,
            Self::Running(handle) => handle
                .join()
                .unwrap_or(CommitOutcome::RolledBack(CommitError::WorkerPanicked)),
        }
    }
}

/// Commit and rollback controller shared by drag releases.
pub struct CommitController<S: RemoteSlotStore> {
    store: Arc<S>,
    cache: SharedSlotCache,
    owner: String,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl<S: RemoteSlotStore> std::fmt::Debug for CommitController<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitController")
            .field("owner", &self.owner)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl<S: RemoteSlotStore + 'static> CommitController<S> {
    pub fn new(
        store: Arc<S>,
        cache: SharedSlotCache,
        owner: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            cache,
            owner: owner.into(),
            retry,
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Replaces the backoff sleeper; tests use a recording sleeper.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn cache(&self) -> &SharedSlotCache {
        &self.cache
    }

    /// Applies the optimistic move. Returns `None` for same-day releases.
    pub fn begin(&self, request: &CommitRequest) -> Option<PendingCommit> {
        if request.is_same_day() {
            info!(
                "event=slot_commit module=commit status=skip reason=same_day slot_id={}",
                request.slot.id
            );
            return None;
        }

        let mut cache = lock_cache(&self.cache);
        let snapshot = cache.plan_move(&request.slot, request.source_day, request.target_day);
        cache.apply_move(&snapshot);
        cache.claim(&[snapshot.source, snapshot.target]);
        info!(
            "event=slot_commit module=commit status=start slot_id={} source_day={} target_day={}",
            snapshot.slot_id(),
            snapshot.source,
            snapshot.target
        );
        Some(PendingCommit { snapshot })
    }

    /// Persists a pending move, compensating on failure. Blocks on backoff.
    pub fn run(&self, pending: PendingCommit) -> CommitOutcome {
        let snapshot = pending.snapshot;
        let patch = SchedulePatch::from_slot(&snapshot.moved);
        let max_attempts = self.retry.max_attempts.max(1);

        let mut attempt = 1;
        let last_error = loop {
            match self.store.update_slot_schedule(&self.owner, &patch) {
                Ok(slot) => {
                    lock_cache(&self.cache).release(&[snapshot.source, snapshot.target]);
                    info!(
                        "event=slot_commit module=commit status=ok slot_id={} attempts={attempt}",
                        slot.id
                    );
                    return CommitOutcome::Committed {
                        slot,
                        attempts: attempt,
                    };
                }
                Err(err) if attempt < max_attempts => {
                    let backoff = self.retry.backoff_after(attempt);
                    warn!(
                        "event=slot_commit module=commit status=retry slot_id={} attempt={attempt} backoff_ms={} error={err}",
                        snapshot.slot_id(),
                        backoff.as_millis()
                    );
                    self.sleeper.sleep(backoff);
                    attempt += 1;
                }
                Err(err) => break err,
            }
        };

        self.compensate(&snapshot);
        error!(
            "event=slot_commit module=commit status=error slot_id={} attempts={attempt} error_code=commit_rolled_back error={last_error}",
            snapshot.slot_id()
        );
        CommitOutcome::RolledBack(CommitError::Store {
            attempts: attempt,
            source: last_error,
        })
    }

    /// Runs the whole saga on the caller.
    pub fn commit(&self, request: &CommitRequest) -> CommitOutcome {
        match self.begin(request) {
            Some(pending) => self.run(pending),
            None => CommitOutcome::Skipped,
        }
    }

    /// Applies the optimistic move on the caller and persists on a worker.
    pub fn spawn(self: &Arc<Self>, request: &CommitRequest) -> CommitTicket {
        let Some(pending) = self.begin(request) else {
            return CommitTicket::Finished(CommitOutcome::Skipped);
        };
        let snapshot = pending.snapshot.clone();
        let controller = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("dayslot-commit".to_owned())
            .spawn(move || controller.run(pending));
        match spawned {
            Ok(handle) => CommitTicket::Running(handle),
            Err(err) => {
                self.compensate(&snapshot);
                error!(
                    "event=slot_commit module=commit status=error slot_id={} error_code=worker_spawn_failed error={err}",
                    snapshot.slot_id()
                );
                CommitTicket::Finished(CommitOutcome::RolledBack(CommitError::Spawn(err)))
            }
        }
    }

    fn compensate(&self, snapshot: &CacheMoveSnapshot) {
        let mut cache = lock_cache(&self.cache);
        cache.revert_move(snapshot);
        cache.release(&[snapshot.source, snapshot.target]);
    }
}

#[cfg(test)]
mod tests {
    use super::{CommitController, CommitRequest, Sleeper};
    use crate::cache::slot_cache::{lock_cache, SlotCache};
    use crate::config::RetryPolicy;
    use crate::model::slot::{CompletionStatus, Slot, SlotId};
    use crate::repo::slot_repo::{RepoError, RepoResult, SchedulePatch};
    use crate::repo::slot_store::RemoteSlotStore;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct FlakyStore {
        failures_left: Mutex<u32>,
        calls: Mutex<u32>,
    }

    impl FlakyStore {
        fn failing(times: u32) -> Self {
            Self {
                failures_left: Mutex::new(times),
                calls: Mutex::new(0),
            }
        }
    }

    impl RemoteSlotStore for FlakyStore {
        fn update_slot_schedule(&self, _owner: &str, patch: &SchedulePatch) -> RepoResult<Slot> {
            *self.calls.lock().expect("calls lock") += 1;
            let mut failures = self.failures_left.lock().expect("failures lock");
            if *failures > 0 {
                *failures -= 1;
                return Err(RepoError::Unavailable("offline".to_owned()));
            }
            let mut slot = Slot::with_id(patch.id, "stored");
            slot.date = patch.date;
            slot.start = patch.start;
            slot.end = patch.end;
            Ok(slot)
        }

        fn delete_slot(&self, _owner: &str, _id: SlotId) -> RepoResult<()> {
            Ok(())
        }

        fn update_slot_status(
            &self,
            _owner: &str,
            _id: SlotId,
            _status: CompletionStatus,
        ) -> RepoResult<()> {
            Ok(())
        }

        fn list_slots_for_date(&self, _owner: &str, _date: NaiveDate) -> RepoResult<Vec<Slot>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        waits: Mutex<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.waits.lock().expect("waits lock").push(duration);
        }
    }

    fn day(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("fixture date should parse")
    }

    fn slot() -> Slot {
        let at = |time: &str| {
            NaiveDateTime::parse_from_str(&format!("2024-06-01 {time}"), "%Y-%m-%d %H:%M")
                .expect("fixture time should parse")
        };
        Slot::timed("review", at("09:00"), at("10:00"))
    }

    fn controller(
        store: Arc<FlakyStore>,
        slot: &Slot,
    ) -> (CommitController<FlakyStore>, Arc<RecordingSleeper>) {
        let mut cache = SlotCache::new();
        cache.merge_fetched(day("2024-06-01"), vec![slot.clone()]);
        let sleeper = Arc::new(RecordingSleeper::default());
        let controller =
            CommitController::new(store, cache.shared(), "owner-1", RetryPolicy::default())
                .with_sleeper(sleeper.clone());
        (controller, sleeper)
    }

    #[test]
    fn same_day_release_is_skipped() {
        let store = Arc::new(FlakyStore::default());
        let slot = slot();
        let (controller, _) = controller(Arc::clone(&store), &slot);
        let outcome =
            controller.commit(&CommitRequest::new(slot, day("2024-06-01"), day("2024-06-01")));
        assert!(matches!(outcome, super::CommitOutcome::Skipped));
        assert_eq!(*store.calls.lock().expect("calls lock"), 0);
    }

    #[test]
    fn retries_with_exponential_backoff_then_commits() {
        let store = Arc::new(FlakyStore::failing(2));
        let slot = slot();
        let (controller, sleeper) = controller(Arc::clone(&store), &slot);
        let outcome =
            controller.commit(&CommitRequest::new(slot.clone(), day("2024-06-01"), day("2024-06-03")));

        assert!(matches!(outcome, super::CommitOutcome::Committed { attempts: 3, .. }));
        assert_eq!(
            *sleeper.waits.lock().expect("waits lock"),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
        let cache = lock_cache(controller.cache());
        assert_eq!(cache.locate(slot.id).map(|(date, _)| date), Some(day("2024-06-03")));
        assert!(!cache.is_owned(day("2024-06-01")));
        assert!(!cache.is_owned(day("2024-06-03")));
    }

    #[test]
    fn exhausted_retries_roll_back() {
        let store = Arc::new(FlakyStore::failing(3));
        let slot = slot();
        let (controller, _) = controller(Arc::clone(&store), &slot);
        let before = lock_cache(controller.cache()).clone();

        let outcome =
            controller.commit(&CommitRequest::new(slot, day("2024-06-01"), day("2024-05-30")));

        assert!(outcome.is_rolled_back());
        assert_eq!(*store.calls.lock().expect("calls lock"), 3);
        assert_eq!(*lock_cache(controller.cache()), before);
    }

    #[test]
    fn spawn_applies_optimistic_move_before_worker_finishes() {
        let store = Arc::new(FlakyStore::default());
        let slot = slot();
        let (controller, _) = controller(Arc::clone(&store), &slot);
        let controller = Arc::new(controller);

        let ticket = controller.spawn(&CommitRequest::new(
            slot.clone(),
            day("2024-06-01"),
            day("2024-06-02"),
        ));
        assert!(ticket.wait().is_committed());
        assert_eq!(
            lock_cache(controller.cache())
                .locate(slot.id)
                .map(|(date, _)| date),
            Some(day("2024-06-02"))
        );
    }

    #[test]
    fn ticket_reports_finished_once_worker_returns() {
        let store = Arc::new(FlakyStore::default());
        let slot = slot();
        let (controller, _) = controller(Arc::clone(&store), &slot);
        let controller = Arc::new(controller);

        let skipped =
            controller.spawn(&CommitRequest::new(slot.clone(), day("2024-06-01"), day("2024-06-01")));
        assert!(skipped.is_finished());

        let ticket =
            controller.spawn(&CommitRequest::new(slot, day("2024-06-01"), day("2024-06-02")));
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !ticket.is_finished() {
            assert!(std::time::Instant::now() < deadline, "worker did not finish");
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(ticket.wait().is_committed());
    }
}
