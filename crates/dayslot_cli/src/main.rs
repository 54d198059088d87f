//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `dayslot_core` linkage.
//! - Replay a scripted left-edge drag against an in-memory store and print
//!   the resulting cache state.
//! - Keep output deterministic for quick local sanity checks.

use chrono::{Days, NaiveDate, NaiveDateTime};
use dayslot_core::db::open_db_in_memory;
use dayslot_core::gesture::reorder::RowLayout;
use dayslot_core::{
    lock_cache, CalendarDateStore, CommitController, CommitOutcome, CommitRequest, DayService,
    DragConfig, DragController, DragOutcome, DragTarget, ItemFrame, NoopHaptics, Point,
    PointerInput, ScreenSize, SharedSlotCache, Slot, SlotCache, SqliteSlotStore,
};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

const OWNER: &str = "cli";
const FRAME_STEP_MS: u64 = 16;

fn main() -> ExitCode {
    println!("dayslot_core ping={}", dayslot_core::ping());
    println!("dayslot_core version={}", dayslot_core::core_version());

    match replay_left_edge_drag() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("replay failed: {message}");
            ExitCode::FAILURE
        }
    }
}

fn replay_left_edge_drag() -> Result<(), String> {
    let source = NaiveDate::from_ymd_opt(2024, 6, 1).ok_or("invalid source date")?;
    let start = at(source, "09:00")?;
    let end = at(source, "10:00")?;
    let slot = Slot::timed("standup", start, end);

    let conn = open_db_in_memory().map_err(|err| err.to_string())?;
    let store = Arc::new(SqliteSlotStore::new(conn));
    store
        .create_slot(OWNER, &slot)
        .map_err(|err| err.to_string())?;

    let cache = SlotCache::new().shared();
    let days = DayService::new(Arc::clone(&store), Arc::clone(&cache), OWNER);
    days.load_day(source).map_err(|err| err.to_string())?;

    let config = DragConfig::default();
    let commits = Arc::new(CommitController::new(
        Arc::clone(&store),
        Arc::clone(&cache),
        OWNER,
        config.retry.clone(),
    ));
    let mut controller = DragController::new(
        config,
        Arc::new(NoopHaptics),
        CalendarDateStore::new(source),
        ScreenSize::new(400.0, 800.0),
    );

    let outcome = drag_to_left_edge(&mut controller, slot, source)?;
    println!(
        "drag source_day={} target_day={} day_changed={}",
        outcome.source_day, outcome.target_day, outcome.day_changed
    );

    match commits.spawn(&CommitRequest::from_outcome(&outcome)).wait() {
        CommitOutcome::Committed { attempts, .. } => println!("commit status=ok attempts={attempts}"),
        CommitOutcome::Skipped => println!("commit status=skip"),
        CommitOutcome::RolledBack(err) => return Err(err.to_string()),
    }

    for offset in 0..=2 {
        if let Some(day) = source.checked_sub_days(Days::new(offset)) {
            print_day(&cache, day);
        }
    }
    Ok(())
}

/// Holds the slot at the left edge for two day-advance intervals, then releases.
fn drag_to_left_edge(
    controller: &mut DragController,
    slot: Slot,
    day: NaiveDate,
) -> Result<DragOutcome, String> {
    let t0 = Instant::now();
    let frame = ItemFrame::new(Point::new(20.0, 370.0), 360.0, 60.0);
    let target = DragTarget {
        rows: vec![RowLayout {
            slot_id: slot.id,
            index: 0,
            frame,
        }],
        slot,
        day,
        frame: Some(frame),
    };

    let long_press = controller.config().long_press_delay;
    let edge_hold = controller.config().day_advance_delay + controller.config().day_advance_interval;

    controller.press(target, Point::new(200.0, 400.0), t0);
    let mut now = t0 + long_press;
    controller.frame(now);
    now += Duration::from_millis(FRAME_STEP_MS);
    controller.handle_pointer(PointerInput::Move(Point::new(10.0, 400.0)), now);

    let release_at = now + edge_hold + Duration::from_millis(FRAME_STEP_MS);
    while now < release_at {
        now += Duration::from_millis(FRAME_STEP_MS);
        controller.frame(now);
    }
    controller.handle_pointer(PointerInput::Up(Point::new(10.0, 400.0)), now);

    let deadline = now + Duration::from_secs(5);
    while now < deadline {
        now += Duration::from_millis(FRAME_STEP_MS);
        if let Some(outcome) = controller.frame(now) {
            return Ok(outcome);
        }
    }
    Err("drag did not settle".to_owned())
}

fn print_day(cache: &SharedSlotCache, day: NaiveDate) {
    let cache = lock_cache(cache);
    match cache.slots_for_date(day) {
        None => println!("cache day={day} state=unfetched"),
        Some(slots) => {
            println!("cache day={day} slots={}", slots.len());
            for slot in slots {
                let window = match (slot.start, slot.end) {
                    (Some(start), Some(end)) => {
                        format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
                    }
                    _ => "all-day".to_owned(),
                };
                println!("  slot id={} window={window}", slot.id);
            }
        }
    }
}

fn at(day: NaiveDate, time: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(&format!("{day} {time}"), "%Y-%m-%d %H:%M")
        .map_err(|err| err.to_string())
}
