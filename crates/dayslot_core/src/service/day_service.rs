//! Day loading into the local slot cache.
//!
//! # Responsibility
//! - Fetch day lists from the slot store and merge them into the cache.
//! - Prefetch neighbouring days around the selected date.
//!
//! # Invariants
//! - The cache lock is never held across a store call.
//! - A fetch never overwrites a day owned by an in-flight commit or mutated
//!   while the fetch was running.

use crate::cache::slot_cache::{lock_cache, MergeOutcome, SharedSlotCache};
use crate::repo::slot_repo::RepoResult;
use crate::repo::slot_store::RemoteSlotStore;
use chrono::{NaiveDate, TimeDelta};
use log::{info, warn};
use std::sync::Arc;

/// Per-day result of a prefetch sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrefetchReport {
    pub merged: Vec<NaiveDate>,
    pub skipped: Vec<NaiveDate>,
    pub failed: Vec<NaiveDate>,
}

/// Use-case service for populating day views.
pub struct DayService<S: RemoteSlotStore> {
    store: Arc<S>,
    cache: SharedSlotCache,
    owner: String,
}

impl<S: RemoteSlotStore> DayService<S> {
    pub fn new(store: Arc<S>, cache: SharedSlotCache, owner: impl Into<String>) -> Self {
        Self {
            store,
            cache,
            owner: owner.into(),
        }
    }

    /// Fetches `date` and merges it into the cache.
    pub fn load_day(&self, date: NaiveDate) -> RepoResult<MergeOutcome> {
        let seen = lock_cache(&self.cache).revision(date);
        let slots = self.store.list_slots_for_date(&self.owner, date)?;
        let count = slots.len();
        let outcome = lock_cache(&self.cache).merge_fetched_since(date, slots, seen);
        info!(
            "event=day_load module=day status=ok date={date} slots={count} merge={outcome:?}"
        );
        Ok(outcome)
    }

    /// Loads `date` only if it was never fetched.
    pub fn ensure_loaded(&self, date: NaiveDate) -> RepoResult<Option<MergeOutcome>> {
        if lock_cache(&self.cache).is_fetched(date) {
            return Ok(None);
        }
        self.load_day(date).map(Some)
    }

    /// Loads `date` and `radius` days on each side of it.
    ///
    /// Failures are collected per day instead of aborting the sweep.
    pub fn prefetch_around(&self, date: NaiveDate, radius: u32) -> PrefetchReport {
        let mut report = PrefetchReport::default();
        let radius = i64::from(radius);
        for offset in -radius..=radius {
            let Some(day) = TimeDelta::try_days(offset).and_then(|delta| date.checked_add_signed(delta))
            else {
                continue;
            };
            match self.load_day(day) {
                Ok(MergeOutcome::Merged) => report.merged.push(day),
                Ok(MergeOutcome::SkippedOwned | MergeOutcome::SkippedStale) => {
                    report.skipped.push(day)
                }
                Err(err) => {
                    warn!(
                        "event=day_prefetch module=day status=error date={day} error={err}"
                    );
                    report.failed.push(day);
                }
            }
        }
        report
    }
}
