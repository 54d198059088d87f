use chrono::{NaiveDate, NaiveDateTime};
use dayslot_core::db::open_db_in_memory;
use dayslot_core::repo::slot_repo::count_slots;
use dayslot_core::{
    CompletionStatus, RemoteSlotStore, RepoError, SchedulePatch, Slot, SlotRepository,
    SqliteSlotRepository, SqliteSlotStore, SubTask,
};
use rusqlite::params;
use uuid::Uuid;

const OWNER: &str = "owner-1";

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn at(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").unwrap()
}

#[test]
fn create_and_get_roundtrip_preserves_all_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);

    let mut slot = Slot::timed("standup", at("2024-06-01 09:00"), at("2024-06-01 10:00"));
    slot.color = "blue-500".to_string();
    slot.description = Some("daily sync".to_string());
    slot.subtasks = vec![SubTask {
        title: "notes".to_string(),
        done: true,
    }];
    slot.participants = vec!["p-1".to_string(), "p-2".to_string()];
    slot.status = CompletionStatus::Incomplete;
    let id = repo.create_slot(OWNER, &slot).unwrap();

    let loaded = repo.get_slot(OWNER, id).unwrap().unwrap();
    assert_eq!(loaded, slot);
}

#[test]
fn create_rejects_invalid_window() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);

    let slot = Slot::timed("backwards", at("2024-06-01 10:00"), at("2024-06-01 09:00"));
    let err = repo.create_slot(OWNER, &slot).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(count_slots(&conn, OWNER).unwrap(), 0);
}

#[test]
fn rows_are_scoped_by_owner() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);

    let slot = Slot::all_day("trip", day("2024-06-01"));
    repo.create_slot(OWNER, &slot).unwrap();

    assert!(repo.get_slot("someone-else", slot.id).unwrap().is_none());
    assert!(repo
        .list_slots_for_date("someone-else", day("2024-06-01"))
        .unwrap()
        .is_empty());
    let err = repo.delete_slot("someone-else", slot.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == slot.id));
    assert_eq!(count_slots(&conn, OWNER).unwrap(), 1);
}

#[test]
fn list_orders_date_only_slots_first_then_by_start() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);

    let late = Slot::timed("late", at("2024-06-01 15:00"), at("2024-06-01 16:00"));
    let early = Slot::timed("early", at("2024-06-01 08:00"), at("2024-06-01 08:30"));
    let all_day = Slot::all_day("trip", day("2024-06-01"));
    let other_day = Slot::timed("other", at("2024-06-02 08:00"), at("2024-06-02 09:00"));
    for slot in [&late, &early, &all_day, &other_day] {
        repo.create_slot(OWNER, slot).unwrap();
    }

    let titles: Vec<_> = repo
        .list_slots_for_date(OWNER, day("2024-06-01"))
        .unwrap()
        .into_iter()
        .map(|slot| slot.title)
        .collect();
    assert_eq!(titles, vec!["trip", "early", "late"]);
}

#[test]
fn update_schedule_moves_slot_and_returns_patched_copy() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);

    let slot = Slot::timed("standup", at("2024-06-01 09:00"), at("2024-06-01 10:00"));
    repo.create_slot(OWNER, &slot).unwrap();

    let moved = slot.moved_to_day(day("2024-06-01"), day("2024-05-30"));
    let patched = repo
        .update_schedule(OWNER, &SchedulePatch::from_slot(&moved))
        .unwrap();
    assert_eq!(patched, moved);

    assert!(repo
        .list_slots_for_date(OWNER, day("2024-06-01"))
        .unwrap()
        .is_empty());
    let target = repo.list_slots_for_date(OWNER, day("2024-05-30")).unwrap();
    assert_eq!(target.len(), 1);
    assert_eq!(target[0].start, Some(at("2024-05-30 09:00")));
    assert_eq!(target[0].end, Some(at("2024-05-30 10:00")));
}

#[test]
fn update_schedule_of_missing_slot_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);

    let ghost = Slot::all_day("ghost", day("2024-06-01"));
    let err = repo
        .update_schedule(OWNER, &SchedulePatch::from_slot(&ghost))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn update_slot_rewrites_detail_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);

    let mut slot = Slot::all_day("draft", day("2024-06-01"));
    repo.create_slot(OWNER, &slot).unwrap();

    slot.title = "final".to_string();
    slot.participants = vec!["p-9".to_string()];
    repo.update_slot(OWNER, &slot).unwrap();

    let loaded = repo.get_slot(OWNER, slot.id).unwrap().unwrap();
    assert_eq!(loaded.title, "final");
    assert_eq!(loaded.participants, vec!["p-9".to_string()]);
}

#[test]
fn corrupt_status_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);

    let slot = Slot::all_day("broken", day("2024-06-01"));
    repo.create_slot(OWNER, &slot).unwrap();
    conn.execute(
        "UPDATE slots SET subtasks = 'not json' WHERE uuid = ?1;",
        params![slot.id.to_string()],
    )
    .unwrap();

    let err = repo.get_slot(OWNER, slot.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn store_exposes_remote_operations_over_sqlite() {
    let store = SqliteSlotStore::new(open_db_in_memory().unwrap());
    let slot = Slot::timed("review", at("2024-06-01 13:00"), at("2024-06-01 14:00"));
    store.create_slot(OWNER, &slot).unwrap();

    store
        .update_slot_status(OWNER, slot.id, CompletionStatus::Completed)
        .unwrap();
    let listed = store.list_slots_for_date(OWNER, day("2024-06-01")).unwrap();
    assert_eq!(listed[0].status, CompletionStatus::Completed);

    store.delete_slot(OWNER, slot.id).unwrap();
    assert!(store.get_slot(OWNER, slot.id).unwrap().is_none());

    let err = store
        .update_slot_status(OWNER, Uuid::new_v4(), CompletionStatus::Auto)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}
