//! Day-keyed local slot cache.
//!
//! # Responsibility
//! - Hold ordered slot lists per calendar day for day views.
//! - Distinguish empty days from days that were never fetched.
//! - Apply and revert optimistic drag moves from a pure snapshot.
//!
//! # Invariants
//! - A slot id appears in at most one day's list.
//! - Fetch merges never overwrite days owned by an in-flight commit, nor
//!   days mutated locally after the fetch started.
//! - `revert_move(m)` after `apply_move(m)` restores both days' membership.

use crate::model::slot::{Slot, SlotId};
use chrono::NaiveDate;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cache handle shared between the commit worker and day views.
pub type SharedSlotCache = Arc<Mutex<SlotCache>>;

/// Locks a shared cache, recovering the guard from a poisoned mutex.
///
/// Cache mutations never leave a day list half-written, so the data behind
/// a poisoned lock is still consistent.
pub fn lock_cache(cache: &SharedSlotCache) -> MutexGuard<'_, SlotCache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Result of merging a fetched day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged,
    /// The day is owned by an in-flight commit and was left untouched.
    SkippedOwned,
    /// The day was mutated locally while the fetch was in flight.
    SkippedStale,
}

/// Snapshot of an optimistic cross-day move.
///
/// Both the forward mutation and its compensation are derived from this
/// value only, never recomputed from later cache state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheMoveSnapshot {
    pub original: Slot,
    pub moved: Slot,
    pub source: NaiveDate,
    pub target: NaiveDate,
    /// Position of `original` in the source list before the move.
    pub source_index: Option<usize>,
    /// Whether the target day had a cache entry before the move.
    pub target_existed: bool,
}

impl CacheMoveSnapshot {
    pub fn slot_id(&self) -> SlotId {
        self.original.id
    }
}

/// Local slot cache keyed by calendar day.
///
/// Equality compares cached content and ownership, not revisions.
#[derive(Debug, Clone, Default)]
pub struct SlotCache {
    days: BTreeMap<NaiveDate, Vec<Slot>>,
    fetched: BTreeSet<NaiveDate>,
    owned: BTreeMap<NaiveDate, usize>,
    /// Bumped on every local mutation of a day.
    revisions: BTreeMap<NaiveDate, u64>,
}

impl PartialEq for SlotCache {
    fn eq(&self, other: &Self) -> bool {
        self.days == other.days && self.fetched == other.fetched && self.owned == other.owned
    }
}

impl SlotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedSlotCache {
        Arc::new(Mutex::new(self))
    }

    /// Slots of `date`, or `None` when nothing is cached for it.
    pub fn slots_for_date(&self, date: NaiveDate) -> Option<&[Slot]> {
        self.days.get(&date).map(Vec::as_slice)
    }

    /// Whether `date` was fully fetched from the store.
    pub fn is_fetched(&self, date: NaiveDate) -> bool {
        self.fetched.contains(&date)
    }

    pub fn is_owned(&self, date: NaiveDate) -> bool {
        self.owned.contains_key(&date)
    }

    /// Local mutation counter of `date`; read before starting a fetch.
    pub fn revision(&self, date: NaiveDate) -> u64 {
        self.revisions.get(&date).copied().unwrap_or(0)
    }

    /// Finds the day and index currently holding `slot_id`.
    pub fn locate(&self, slot_id: SlotId) -> Option<(NaiveDate, usize)> {
        self.days.iter().find_map(|(date, slots)| {
            slots
                .iter()
                .position(|slot| slot.id == slot_id)
                .map(|index| (*date, index))
        })
    }

    pub fn get(&self, slot_id: SlotId) -> Option<&Slot> {
        let (date, index) = self.locate(slot_id)?;
        self.days.get(&date).and_then(|slots| slots.get(index))
    }

    /// Inserts `slot` into `date` in day order, removing any other copy.
    pub fn insert(&mut self, date: NaiveDate, slot: Slot) {
        self.remove_everywhere(slot.id);
        self.touch(date);
        insert_ordered(self.days.entry(date).or_default(), slot);
    }

    /// Replaces the cached copy of `slot` in place. Returns `false` if absent.
    pub fn replace(&mut self, slot: Slot) -> bool {
        let Some((date, index)) = self.locate(slot.id) else {
            return false;
        };
        match self.days.get_mut(&date).and_then(|slots| slots.get_mut(index)) {
            Some(existing) => {
                *existing = slot;
                self.touch(date);
                true
            }
            None => false,
        }
    }

    /// Moves or deletes `slot_id` between cached days.
    ///
    /// Removes the slot from `source`; when `updated` is given it is
    /// inserted into `target` in day order. Returns the removed copy.
    pub fn update_slot_cache(
        &mut self,
        slot_id: SlotId,
        source: NaiveDate,
        target: NaiveDate,
        updated: Option<Slot>,
    ) -> Option<Slot> {
        let removed = self.remove_from(source, slot_id);
        self.touch(source);
        if let Some(updated) = updated {
            self.remove_from(target, slot_id);
            self.touch(target);
            insert_ordered(self.days.entry(target).or_default(), updated);
        }
        removed
    }

    /// Builds a move snapshot for `slot` from `source` to `target`.
    ///
    /// The cached copy wins over `slot` when both exist.
    pub fn plan_move(&self, slot: &Slot, source: NaiveDate, target: NaiveDate) -> CacheMoveSnapshot {
        let source_index = self
            .days
            .get(&source)
            .and_then(|slots| slots.iter().position(|cached| cached.id == slot.id));
        let original = source_index
            .and_then(|index| self.days.get(&source).and_then(|slots| slots.get(index)))
            .cloned()
            .unwrap_or_else(|| slot.clone());
        let moved = original.moved_to_day(source, target);
        CacheMoveSnapshot {
            original,
            moved,
            source,
            target,
            source_index,
            target_existed: self.days.contains_key(&target),
        }
    }

    /// Applies the optimistic half of a move.
    pub fn apply_move(&mut self, snapshot: &CacheMoveSnapshot) {
        self.update_slot_cache(
            snapshot.slot_id(),
            snapshot.source,
            snapshot.target,
            Some(snapshot.moved.clone()),
        );
    }

    /// Applies the compensating half of a move.
    pub fn revert_move(&mut self, snapshot: &CacheMoveSnapshot) {
        let slot_id = snapshot.slot_id();
        self.touch(snapshot.source);
        self.touch(snapshot.target);
        self.remove_from(snapshot.target, slot_id);
        if !snapshot.target_existed
            && self
                .days
                .get(&snapshot.target)
                .is_some_and(|slots| slots.is_empty())
        {
            self.days.remove(&snapshot.target);
        }

        let Some(index) = snapshot.source_index else {
            // The slot was never cached on the source day.
            return;
        };
        self.remove_everywhere(slot_id);
        let slots = self.days.entry(snapshot.source).or_default();
        let index = index.min(slots.len());
        slots.insert(index, snapshot.original.clone());
    }

    /// Marks `dates` as owned by an in-flight commit.
    pub fn claim(&mut self, dates: &[NaiveDate]) {
        for date in dates {
            *self.owned.entry(*date).or_insert(0) += 1;
            self.touch(*date);
        }
    }

    /// Releases ownership taken by `claim`.
    pub fn release(&mut self, dates: &[NaiveDate]) {
        for date in dates {
            if let Some(count) = self.owned.get_mut(date) {
                *count -= 1;
                if *count == 0 {
                    self.owned.remove(date);
                }
            }
        }
    }

    /// Merges a fetch that started when `date` was at `seen_revision`.
    pub fn merge_fetched_since(
        &mut self,
        date: NaiveDate,
        slots: Vec<Slot>,
        seen_revision: u64,
    ) -> MergeOutcome {
        if self.revision(date) != seen_revision {
            debug!("event=cache_merge module=cache status=skip reason=stale date={date}");
            return MergeOutcome::SkippedStale;
        }
        self.merge_fetched(date, slots)
    }

    /// Replaces `date` with fetched `slots` unless an in-flight commit owns it.
    ///
    /// Fetched ids are dropped from other non-owned days so the
    /// one-day-per-slot invariant holds after a remote move.
    pub fn merge_fetched(&mut self, date: NaiveDate, slots: Vec<Slot>) -> MergeOutcome {
        if self.is_owned(date) {
            debug!("event=cache_merge module=cache status=skip reason=owned date={date}");
            return MergeOutcome::SkippedOwned;
        }

        let ids: BTreeSet<SlotId> = slots.iter().map(|slot| slot.id).collect();
        let owned = &self.owned;
        let mut owned_conflicts = BTreeSet::new();
        for (other_date, other_slots) in self.days.iter_mut() {
            if *other_date == date {
                continue;
            }
            if owned.contains_key(other_date) {
                owned_conflicts.extend(
                    other_slots
                        .iter()
                        .filter(|slot| ids.contains(&slot.id))
                        .map(|slot| slot.id),
                );
                continue;
            }
            other_slots.retain(|slot| !ids.contains(&slot.id));
        }

        let mut ordered = Vec::with_capacity(slots.len());
        for slot in slots {
            if owned_conflicts.contains(&slot.id) {
                continue;
            }
            insert_ordered(&mut ordered, slot);
        }
        self.days.insert(date, ordered);
        self.fetched.insert(date);
        MergeOutcome::Merged
    }

    fn touch(&mut self, date: NaiveDate) {
        *self.revisions.entry(date).or_insert(0) += 1;
    }

    fn remove_from(&mut self, date: NaiveDate, slot_id: SlotId) -> Option<Slot> {
        let slots = self.days.get_mut(&date)?;
        let index = slots.iter().position(|slot| slot.id == slot_id)?;
        Some(slots.remove(index))
    }

    fn remove_everywhere(&mut self, slot_id: SlotId) {
        for (date, slots) in self.days.iter_mut() {
            let before = slots.len();
            slots.retain(|slot| slot.id != slot_id);
            if slots.len() != before {
                *self.revisions.entry(*date).or_insert(0) += 1;
            }
        }
    }
}

fn insert_ordered(slots: &mut Vec<Slot>, slot: Slot) {
    let key = slot.day_order_key();
    let index = slots
        .iter()
        .position(|existing| existing.day_order_key() > key)
        .unwrap_or(slots.len());
    slots.insert(index, slot);
}
