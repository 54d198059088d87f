//! Day loading racing against in-flight commits.

use chrono::{NaiveDate, NaiveDateTime};
use dayslot_core::db::open_db_in_memory;
use dayslot_core::{
    lock_cache, CommitController, CommitRequest, DayService, MergeOutcome, RemoteSlotStore,
    RetryPolicy, SchedulePatch, SharedSlotCache, Slot, SlotCache, SqliteSlotStore,
};
use std::sync::Arc;

const OWNER: &str = "owner-1";

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn at(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").unwrap()
}

struct Fixture {
    store: Arc<SqliteSlotStore>,
    cache: SharedSlotCache,
    days: DayService<SqliteSlotStore>,
    commits: CommitController<SqliteSlotStore>,
    slot: Slot,
}

fn fixture() -> Fixture {
    let store = Arc::new(SqliteSlotStore::new(open_db_in_memory().unwrap()));
    let slot = Slot::timed("standup", at("2024-06-01 09:00"), at("2024-06-01 10:00"));
    store.create_slot(OWNER, &slot).unwrap();

    let cache = SlotCache::new().shared();
    let days = DayService::new(Arc::clone(&store), Arc::clone(&cache), OWNER);
    let commits = CommitController::new(
        Arc::clone(&store),
        Arc::clone(&cache),
        OWNER,
        RetryPolicy::default(),
    );
    days.load_day(day("2024-06-01")).unwrap();
    Fixture {
        store,
        cache,
        days,
        commits,
        slot,
    }
}

#[test]
fn prefetch_during_commit_keeps_optimistic_state() {
    let fx = fixture();
    let request = CommitRequest::new(fx.slot.clone(), day("2024-06-01"), day("2024-06-02"));
    let pending = fx.commits.begin(&request).unwrap();

    let report = fx.days.prefetch_around(day("2024-06-01"), 1);
    assert_eq!(report.skipped, vec![day("2024-06-01"), day("2024-06-02")]);
    assert_eq!(report.merged, vec![day("2024-05-31")]);
    {
        let cache = lock_cache(&fx.cache);
        assert_eq!(cache.locate(fx.slot.id).map(|(date, _)| date), Some(day("2024-06-02")));
    }

    assert!(fx.commits.run(pending).is_committed());
    assert_eq!(
        fx.days.load_day(day("2024-06-02")).unwrap(),
        MergeOutcome::Merged
    );
    assert_eq!(
        fx.days.load_day(day("2024-06-01")).unwrap(),
        MergeOutcome::Merged
    );

    let cache = lock_cache(&fx.cache);
    assert!(cache.slots_for_date(day("2024-06-01")).unwrap().is_empty());
    let target = cache.slots_for_date(day("2024-06-02")).unwrap();
    assert_eq!(target.len(), 1);
    assert_eq!(target[0].start, Some(at("2024-06-02 09:00")));
}

#[test]
fn fetch_started_before_commit_is_dropped_as_stale() {
    let fx = fixture();
    let seen = lock_cache(&fx.cache).revision(day("2024-06-01"));
    let fetched_before_move = fx
        .store
        .get_slot(OWNER, fx.slot.id)
        .unwrap()
        .into_iter()
        .collect::<Vec<_>>();

    let request = CommitRequest::new(fx.slot.clone(), day("2024-06-01"), day("2024-06-03"));
    assert!(fx.commits.commit(&request).is_committed());

    let outcome = lock_cache(&fx.cache).merge_fetched_since(
        day("2024-06-01"),
        fetched_before_move,
        seen,
    );
    assert_eq!(outcome, MergeOutcome::SkippedStale);

    let cache = lock_cache(&fx.cache);
    assert!(cache.slots_for_date(day("2024-06-01")).unwrap().is_empty());
    assert_eq!(cache.locate(fx.slot.id).map(|(date, _)| date), Some(day("2024-06-03")));
}

#[test]
fn remote_move_observed_by_fetch_drops_stale_local_copy() {
    let fx = fixture();
    let moved = fx.slot.moved_to_day(day("2024-06-01"), day("2024-06-04"));
    // Another client reschedules the slot directly against the store.
    fx.store
        .update_slot_schedule(OWNER, &SchedulePatch::from_slot(&moved))
        .unwrap();

    fx.days.load_day(day("2024-06-04")).unwrap();
    let cache = lock_cache(&fx.cache);
    assert!(cache.slots_for_date(day("2024-06-01")).unwrap().is_empty());
    assert_eq!(cache.get(fx.slot.id).and_then(|slot| slot.date), Some(day("2024-06-04")));
}
