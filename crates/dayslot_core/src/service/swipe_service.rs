//! Swipe actions revealed by short horizontal drags.
//!
//! Single attempt, no retry. The cache is only updated after the store
//! accepted the change; errors go back to the caller untouched.

use crate::cache::slot_cache::{lock_cache, SharedSlotCache};
use crate::gesture::controller::DragOutcome;
use crate::model::drag::SwipeAction;
use crate::model::slot::{CompletionStatus, Slot, SlotId};
use crate::repo::slot_repo::RepoResult;
use crate::repo::slot_store::RemoteSlotStore;
use log::info;
use std::sync::Arc;

/// Use-case service for complete/delete swipe actions.
pub struct SwipeService<S: RemoteSlotStore> {
    store: Arc<S>,
    cache: SharedSlotCache,
    owner: String,
}

impl<S: RemoteSlotStore> SwipeService<S> {
    pub fn new(store: Arc<S>, cache: SharedSlotCache, owner: impl Into<String>) -> Self {
        Self {
            store,
            cache,
            owner: owner.into(),
        }
    }

    /// Marks a slot completed. Returns the updated cached copy, if cached.
    pub fn complete(&self, slot_id: SlotId) -> RepoResult<Option<Slot>> {
        self.store
            .update_slot_status(&self.owner, slot_id, CompletionStatus::Completed)?;

        let mut cache = lock_cache(&self.cache);
        let updated = cache.get(slot_id).cloned().map(|mut slot| {
            slot.status = CompletionStatus::Completed;
            slot
        });
        if let Some(slot) = &updated {
            cache.replace(slot.clone());
        }
        info!("event=slot_complete module=swipe status=ok slot_id={slot_id}");
        Ok(updated)
    }

    /// Deletes a slot remotely and drops it from the cache.
    pub fn delete(&self, slot_id: SlotId) -> RepoResult<()> {
        self.store.delete_slot(&self.owner, slot_id)?;

        let mut cache = lock_cache(&self.cache);
        if let Some((date, _)) = cache.locate(slot_id) {
            cache.update_slot_cache(slot_id, date, date, None);
        }
        info!("event=slot_delete module=swipe status=ok slot_id={slot_id}");
        Ok(())
    }

    /// Runs the swipe action carried by a finished drag, if any.
    pub fn apply(&self, outcome: &DragOutcome) -> RepoResult<Option<SwipeAction>> {
        match outcome.swipe_action {
            Some(SwipeAction::Complete) => {
                self.complete(outcome.slot.id)?;
                Ok(Some(SwipeAction::Complete))
            }
            Some(SwipeAction::Delete) => {
                self.delete(outcome.slot.id)?;
                Ok(Some(SwipeAction::Delete))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SwipeService;
    use crate::cache::slot_cache::{lock_cache, SlotCache};
    use crate::db::open_db_in_memory;
    use crate::model::slot::{CompletionStatus, Slot};
    use crate::repo::slot_repo::RepoError;
    use crate::repo::slot_store::SqliteSlotStore;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn seeded() -> (SwipeService<SqliteSlotStore>, Arc<SqliteSlotStore>, Slot) {
        let conn = open_db_in_memory().expect("open in-memory db");
        let store = Arc::new(SqliteSlotStore::new(conn));
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        let slot = Slot::all_day("laundry", date);
        store.create_slot("owner-1", &slot).expect("seed slot");

        let mut cache = SlotCache::new();
        cache.merge_fetched(date, vec![slot.clone()]);
        let service = SwipeService::new(Arc::clone(&store), cache.shared(), "owner-1");
        (service, store, slot)
    }

    #[test]
    fn complete_updates_store_and_cache() {
        let (service, store, slot) = seeded();
        let updated = service.complete(slot.id).expect("complete");
        assert_eq!(updated.map(|slot| slot.status), Some(CompletionStatus::Completed));

        let stored = store.get_slot("owner-1", slot.id).expect("get").expect("exists");
        assert_eq!(stored.status, CompletionStatus::Completed);
    }

    #[test]
    fn delete_removes_from_store_and_cache() {
        let (service, store, slot) = seeded();
        service.delete(slot.id).expect("delete");
        assert!(store.get_slot("owner-1", slot.id).expect("get").is_none());
        assert!(lock_cache(&service.cache).get(slot.id).is_none());
    }

    #[test]
    fn unknown_slot_is_reported_and_cache_untouched() {
        let (service, _, slot) = seeded();
        let err = service.delete(uuid::Uuid::new_v4()).expect_err("missing slot");
        assert!(matches!(err, RepoError::NotFound(_)));
        assert!(lock_cache(&service.cache).get(slot.id).is_some());
    }
}
