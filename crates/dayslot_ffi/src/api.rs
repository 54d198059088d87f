//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own one drag engine per day view behind an opaque handle.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Pointer and frame calls never touch the database.
//! - Dates cross the boundary as `YYYY-MM-DD`, times as `YYYY-MM-DDTHH:MM:SS`.
//! - `now_ms` is a monotonic host clock in milliseconds since engine open.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use dayslot_core::db::{open_db, open_db_in_memory};
use dayslot_core::gesture::overlay::RenderLayer;
use dayslot_core::gesture::reorder::RowLayout;
use dayslot_core::gesture::zone::ScrollMetrics;
use dayslot_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, lock_cache,
    ping as ping_inner, AxisPhase, CalendarDateStore, CommitController, CommitRequest,
    CommitTicket, CompletionStatus, DayService, DragConfig, DragController, DragOutcome,
    DragTarget, GestureEvent, HorizontalZone, ItemFrame, NoopHaptics, Point, PointerInput,
    ScreenSize, SharedSlotCache, Slot, SlotCache, SlotId, SqliteSlotStore, SwipeAction,
    SwipeService, VerticalZone,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::{Duration, Instant};

const DB_FILE_NAME: &str = "dayslot.sqlite3";
const IN_MEMORY_DB: &str = ":memory:";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
static DEFAULT_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Slot the operation applied to, when there is one.
    pub slot_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl EngineActionResponse {
    fn success(message: impl Into<String>, slot_id: Option<SlotId>) -> Self {
        Self {
            ok: true,
            slot_id: slot_id.map(|id| id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            slot_id: None,
            message: message.into(),
        }
    }
}

/// Laid-out frame of one row, reported by the host after layout.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFrame {
    pub slot_id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One row of a day list as the host should render it.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotItem {
    pub slot_id: String,
    pub title: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub without_time: bool,
    /// `auto|completed|incomplete`.
    pub status: String,
    /// Set while the slot is drawn by the overlay; keep a gap this tall.
    pub placeholder_height: Option<f64>,
    /// Animated vertical reposition offset while a sibling is dragged.
    pub sibling_offset: f64,
}

/// Day list response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySlotsResponse {
    pub items: Vec<SlotItem>,
    /// `false` until the day was fully fetched; items may still hold
    /// optimistic moves.
    pub fetched: bool,
    pub message: String,
}

/// Result of feeding one pointer sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureResponse {
    /// `none|tap|drag_start|drag_update|drag_end`.
    pub event: String,
    pub message: String,
}

/// Overlay placement for the dragged slot.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame {
    pub slot_id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
}

/// Summary of a finished drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragOutcomeView {
    pub slot_id: String,
    pub source_day: String,
    pub target_day: String,
    pub day_changed: bool,
    pub needs_commit: bool,
    /// `complete|delete`.
    pub swipe_action: Option<String>,
    pub display_start: Option<String>,
    pub committed_scroll_offset: f64,
}

/// Render state after one application frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub dragging: bool,
    pub slot_id: Option<String>,
    /// `idle|snapped|breaking_horizontal|breaking_vertical|locked_horizontal|locked_vertical|settling|settled`.
    pub phase: String,
    pub offset_x: f64,
    pub offset_y: f64,
    /// `top|middle|bottom`.
    pub vertical_zone: String,
    /// `left|middle|right`.
    pub horizontal_zone: String,
    pub display_start: Option<String>,
    pub scroll_translation: f64,
    pub selected_date: String,
    pub overlay: Option<OverlayFrame>,
    /// Present exactly once per drag, on the frame its settle completes.
    pub finished: Option<DragOutcomeView>,
}

struct EngineState {
    epoch: Instant,
    controller: DragController,
    store: Arc<SqliteSlotStore>,
    cache: SharedSlotCache,
    days: DayService<SqliteSlotStore>,
    swipes: SwipeService<SqliteSlotStore>,
    commits: Arc<CommitController<SqliteSlotStore>>,
    owner: String,
    rows: Option<(NaiveDate, Vec<RowLayout>)>,
    last_outcome: Option<DragOutcome>,
    in_flight: Vec<CommitTicket>,
    /// Commits reaped before `wait_for_commits`: (total, rolled back).
    reaped: (usize, usize),
}

/// Drag engine handle owned by one day view.
#[flutter_rust_bridge::frb(opaque)]
pub struct DragEngine {
    state: Mutex<EngineState>,
}

impl DragEngine {
    /// Opens the slot database and builds an engine for `owner`.
    ///
    /// Input semantics:
    /// - `db_path`: file path, `:memory:` for a throwaway database, or empty
    ///   for `DAYSLOT_DB_PATH` / the temp-dir default.
    /// - `config_json`: optional `DragConfig` overrides; defaults otherwise.
    ///
    /// # FFI contract
    /// - Sync call; opens the database and loads `selected_date`.
    /// - Never panics; returns an error message on failure.
    #[flutter_rust_bridge::frb(sync)]
    pub fn open(
        db_path: String,
        owner: String,
        selected_date: String,
        screen_width: f64,
        screen_height: f64,
        config_json: Option<String>,
    ) -> Result<DragEngine, String> {
        let selected = parse_date(&selected_date)?;
        let config = match config_json.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => {
                DragConfig::from_json_str(json).map_err(|err| err.to_string())?
            }
            _ => DragConfig::default(),
        };
        let conn = match db_path.trim() {
            IN_MEMORY_DB => open_db_in_memory(),
            "" => open_db(resolve_default_db_path()),
            path => open_db(path),
        }
        .map_err(|err| format!("engine DB open failed: {err}"))?;

        let store = Arc::new(SqliteSlotStore::new(conn));
        let cache = SlotCache::new().shared();
        let commits = Arc::new(CommitController::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            owner.clone(),
            config.retry.clone(),
        ));
        let controller = DragController::new(
            config,
            Arc::new(NoopHaptics),
            CalendarDateStore::new(selected),
            ScreenSize::new(screen_width, screen_height),
        );
        let state = EngineState {
            epoch: Instant::now(),
            controller,
            days: DayService::new(Arc::clone(&store), Arc::clone(&cache), owner.clone()),
            swipes: SwipeService::new(Arc::clone(&store), Arc::clone(&cache), owner.clone()),
            store,
            cache,
            commits,
            owner,
            rows: None,
            last_outcome: None,
            in_flight: Vec::new(),
            reaped: (0, 0),
        };
        if let Err(err) = state.days.ensure_loaded(selected) {
            warn!("event=engine_open module=ffi status=error date={selected} error={err}");
        }
        info!("event=engine_open module=ffi status=ok date={selected}");
        Ok(DragEngine {
            state: Mutex::new(state),
        })
    }

    /// Creates a slot on `date`; both `start`/`end` (`HH:MM`) or neither.
    ///
    /// # FFI contract
    /// - Sync call, DB-backed execution.
    /// - Never panics.
    #[flutter_rust_bridge::frb(sync)]
    pub fn create_slot(
        &self,
        title: String,
        date: String,
        start: Option<String>,
        end: Option<String>,
    ) -> EngineActionResponse {
        let state = self.lock_state();
        let slot = match build_slot(title.trim(), &date, start.as_deref(), end.as_deref()) {
            Ok(slot) => slot,
            Err(err) => return EngineActionResponse::failure(format!("create_slot failed: {err}")),
        };
        match state.store.create_slot(&state.owner, &slot) {
            Ok(id) => {
                if let Some(day) = slot.date {
                    let mut cache = lock_cache(&state.cache);
                    if cache.is_fetched(day) {
                        cache.insert(day, slot);
                    }
                }
                EngineActionResponse::success("Slot created.", Some(id))
            }
            Err(err) => EngineActionResponse::failure(format!("create_slot failed: {err}")),
        }
    }

    /// Fetches `date` from the database into the cache.
    ///
    /// # FFI contract
    /// - Sync call, DB-backed execution.
    /// - Never panics.
    #[flutter_rust_bridge::frb(sync)]
    pub fn load_day(&self, date: String) -> EngineActionResponse {
        let state = self.lock_state();
        let result = parse_date(&date).and_then(|day| {
            state.days.load_day(day).map_err(|err| err.to_string())
        });
        match result {
            Ok(outcome) => EngineActionResponse::success(format!("Day loaded ({outcome:?})."), None),
            Err(err) => EngineActionResponse::failure(format!("load_day failed: {err}")),
        }
    }

    /// Returns the cached list of `date` with drag render hints.
    ///
    /// # FFI contract
    /// - Sync call, cache-only.
    /// - Never panics.
    #[flutter_rust_bridge::frb(sync)]
    pub fn day_slots(&self, date: String) -> DaySlotsResponse {
        let state = self.lock_state();
        let day = match parse_date(&date) {
            Ok(day) => day,
            Err(err) => {
                return DaySlotsResponse {
                    items: Vec::new(),
                    fetched: false,
                    message: format!("day_slots failed: {err}"),
                }
            }
        };
        let cache = lock_cache(&state.cache);
        let Some(slots) = cache.slots_for_date(day) else {
            return DaySlotsResponse {
                items: Vec::new(),
                fetched: false,
                message: "Day not loaded.".to_owned(),
            };
        };
        let items = slots
            .iter()
            .map(|slot| to_slot_item(slot, &state.controller))
            .collect::<Vec<_>>();
        DaySlotsResponse {
            message: format!("{} slot(s).", items.len()),
            items,
            fetched: cache.is_fetched(day),
        }
    }

    /// Records the laid-out rows of the visible day list.
    ///
    /// Rows are used as the measured frames of the next press; unknown ids
    /// are rejected.
    #[flutter_rust_bridge::frb(sync)]
    pub fn report_rows(&self, date: String, rows: Vec<RowFrame>) -> EngineActionResponse {
        let mut state = self.lock_state();
        let day = match parse_date(&date) {
            Ok(day) => day,
            Err(err) => return EngineActionResponse::failure(format!("report_rows failed: {err}")),
        };
        let mut layouts = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let slot_id = match parse_slot_id(&row.slot_id) {
                Ok(id) => id,
                Err(err) => {
                    return EngineActionResponse::failure(format!("report_rows failed: {err}"))
                }
            };
            layouts.push(RowLayout {
                slot_id,
                index,
                frame: ItemFrame::new(Point::new(row.x, row.y), row.width, row.height),
            });
        }
        state.rows = Some((day, layouts));
        EngineActionResponse::success(format!("{} row(s) recorded.", rows.len()), None)
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn set_screen_size(&self, width: f64, height: f64) {
        self.lock_state()
            .controller
            .set_screen_size(ScreenSize::new(width, height));
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn set_scroll_metrics(&self, offset: f64, content_height: f64, viewport_height: f64) {
        self.lock_state().controller.set_scroll_metrics(ScrollMetrics {
            offset,
            content_height,
            viewport_height,
        });
    }

    /// Pointer down on a slot row.
    ///
    /// # FFI contract
    /// - Sync call, gesture context; no I/O.
    /// - Never panics; unknown slots report `none`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn pointer_down(&self, slot_id: String, x: f64, y: f64, now_ms: i64) -> GestureResponse {
        let mut state = self.lock_state();
        let id = match parse_slot_id(&slot_id) {
            Ok(id) => id,
            Err(err) => return gesture_response(None, format!("pointer_down failed: {err}")),
        };
        let located = {
            let cache = lock_cache(&state.cache);
            cache
                .locate(id)
                .and_then(|(day, _)| cache.get(id).cloned().map(|slot| (slot, day)))
        };
        let Some((slot, day)) = located else {
            return gesture_response(None, "pointer_down ignored: slot not cached");
        };
        let rows = match &state.rows {
            Some((rows_day, rows)) if *rows_day == day => rows.clone(),
            _ => Vec::new(),
        };
        let frame = rows.iter().find(|row| row.slot_id == id).map(|row| row.frame);
        let target = DragTarget {
            slot,
            day,
            frame,
            rows,
        };
        let now = state.instant_at(now_ms);
        let event = state.controller.press(target, Point::new(x, y), now);
        gesture_response(event, String::new())
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn pointer_move(&self, x: f64, y: f64, now_ms: i64) -> GestureResponse {
        self.feed(PointerInput::Move(Point::new(x, y)), now_ms)
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn pointer_up(&self, x: f64, y: f64, now_ms: i64) -> GestureResponse {
        self.feed(PointerInput::Up(Point::new(x, y)), now_ms)
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn pointer_cancel(&self, now_ms: i64) -> GestureResponse {
        self.feed(PointerInput::Cancel, now_ms)
    }

    /// Overlay content finished loading; reveals the overlay early.
    #[flutter_rust_bridge::frb(sync)]
    pub fn overlay_content_loaded(&self) {
        self.lock_state().controller.overlay_content_loaded();
    }

    /// Application frame pump.
    ///
    /// # FFI contract
    /// - Sync call, no I/O; call once per rendered frame.
    /// - The finished drag is kept for `commit_last_outcome`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn frame(&self, now_ms: i64) -> FrameSnapshot {
        let mut state = self.lock_state();
        let now = state.instant_at(now_ms);
        let finished = state.controller.frame(now);
        let view = finished.as_ref().map(to_outcome_view);
        if let Some(outcome) = finished {
            state.last_outcome = Some(outcome);
        }

        let signals = state.controller.signals();
        let phase = signals.phase.get();
        let offset = signals.offset.get();
        let (vertical, horizontal) = signals.zones.get();
        FrameSnapshot {
            dragging: state.controller.is_dragging(),
            slot_id: signals.active_slot.get().map(|id| id.to_string()),
            phase: phase_label(phase).to_owned(),
            offset_x: offset.x,
            offset_y: offset.y,
            vertical_zone: vertical_zone_label(vertical).to_owned(),
            horizontal_zone: horizontal_zone_label(horizontal).to_owned(),
            display_start: signals.display_start.get().map(format_timestamp),
            scroll_translation: signals.scroll_translation.get(),
            selected_date: state.controller.calendar().selected().format(DATE_FORMAT).to_string(),
            overlay: state.controller.overlay_view().map(|overlay| OverlayFrame {
                slot_id: overlay.slot_id.to_string(),
                x: overlay.position.x,
                y: overlay.position.y,
                width: overlay.width,
                height: overlay.height,
                visible: overlay.visible,
            }),
            finished: view,
        }
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn selected_date(&self) -> String {
        self.lock_state()
            .controller
            .calendar()
            .selected()
            .format(DATE_FORMAT)
            .to_string()
    }

    /// Selects `date` and loads it when it was never fetched.
    #[flutter_rust_bridge::frb(sync)]
    pub fn select_date(&self, date: String) -> EngineActionResponse {
        let state = self.lock_state();
        let day = match parse_date(&date) {
            Ok(day) => day,
            Err(err) => return EngineActionResponse::failure(format!("select_date failed: {err}")),
        };
        state.controller.calendar().set(day);
        match state.days.ensure_loaded(day) {
            Ok(_) => EngineActionResponse::success("Date selected.", None),
            Err(err) => EngineActionResponse::failure(format!("select_date failed: {err}")),
        }
    }

    /// Persists the last finished drag.
    ///
    /// Swipe actions run synchronously with a single attempt. Day moves are
    /// applied to the cache immediately and persisted on a worker thread.
    ///
    /// # FFI contract
    /// - Sync call; the cache move happens before return.
    /// - Never panics.
    #[flutter_rust_bridge::frb(sync)]
    pub fn commit_last_outcome(&self) -> EngineActionResponse {
        let mut state = self.lock_state();
        state.reap_finished();
        let Some(outcome) = state.last_outcome.take() else {
            return EngineActionResponse::failure("No finished drag to commit.");
        };
        let slot_id = outcome.slot.id;

        if outcome.swipe_action.is_some() {
            return match state.swipes.apply(&outcome) {
                Ok(Some(action)) => EngineActionResponse::success(
                    format!("Swipe action {} applied.", swipe_action_label(action)),
                    Some(slot_id),
                ),
                Ok(None) => EngineActionResponse::success("Nothing to apply.", Some(slot_id)),
                Err(err) => {
                    EngineActionResponse::failure(format!("commit_last_outcome failed: {err}"))
                }
            };
        }
        if !outcome.needs_commit() {
            return EngineActionResponse::success("Same-day drop; nothing to persist.", Some(slot_id));
        }

        let ticket = state.commits.spawn(&CommitRequest::from_outcome(&outcome));
        state.in_flight.push(ticket);
        EngineActionResponse::success("Commit started.", Some(slot_id))
    }

    /// Blocks until every started commit finished.
    ///
    /// # FFI contract
    /// - Sync call; may block for the whole retry window. Call off the UI thread.
    /// - Never panics; `ok` is false when any commit rolled back.
    #[flutter_rust_bridge::frb(sync)]
    pub fn wait_for_commits(&self) -> EngineActionResponse {
        let (tickets, (reaped, reaped_rollbacks)) = {
            let mut state = self.lock_state();
            let reaped = std::mem::take(&mut state.reaped);
            (std::mem::take(&mut state.in_flight), reaped)
        };
        let total = reaped + tickets.len();
        let rolled_back = reaped_rollbacks
            + tickets
                .into_iter()
                .map(CommitTicket::wait)
                .filter(|outcome| outcome.is_rolled_back())
                .count();
        if rolled_back == 0 {
            EngineActionResponse::success(format!("{total} commit(s) finished."), None)
        } else {
            EngineActionResponse::failure(format!(
                "{rolled_back} of {total} commit(s) rolled back."
            ))
        }
    }

    fn feed(&self, input: PointerInput, now_ms: i64) -> GestureResponse {
        let mut state = self.lock_state();
        let now = state.instant_at(now_ms);
        let event = state.controller.handle_pointer(input, now);
        gesture_response(event, String::new())
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EngineState {
    fn instant_at(&self, now_ms: i64) -> Instant {
        let millis = u64::try_from(now_ms).unwrap_or(0);
        self.epoch + Duration::from_millis(millis)
    }

    /// Joins finished commit workers, keeping only their tallies.
    fn reap_finished(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.in_flight)
            .into_iter()
            .partition(CommitTicket::is_finished);
        self.in_flight = running;
        for ticket in finished {
            self.reaped.0 += 1;
            if ticket.wait().is_rolled_back() {
                self.reaped.1 += 1;
            }
        }
    }
}

fn resolve_default_db_path() -> PathBuf {
    DEFAULT_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("DAYSLOT_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|err| format!("invalid date `{}`: {err}", value.trim()))
}

fn parse_slot_id(value: &str) -> Result<SlotId, String> {
    SlotId::parse_str(value.trim()).map_err(|err| format!("invalid slot id: {err}"))
}

fn build_slot(
    title: &str,
    date: &str,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Slot, String> {
    let day = parse_date(date)?;
    let slot = match (start, end) {
        (None, None) => Slot::all_day(title, day),
        (Some(start), Some(end)) => {
            Slot::timed(title, day.and_time(parse_time(start)?), day.and_time(parse_time(end)?))
        }
        _ => return Err("start and end must be given together".to_owned()),
    };
    slot.validate().map_err(|err| err.to_string())?;
    Ok(slot)
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|err| format!("invalid time `{}`: {err}", value.trim()))
}

fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

fn gesture_response(event: Option<GestureEvent>, message: impl Into<String>) -> GestureResponse {
    let label = match event {
        None => "none",
        Some(GestureEvent::Tap { .. }) => "tap",
        Some(GestureEvent::DragStart { .. }) => "drag_start",
        Some(GestureEvent::DragUpdate { .. }) => "drag_update",
        Some(GestureEvent::DragEnd { .. }) => "drag_end",
    };
    GestureResponse {
        event: label.to_owned(),
        message: message.into(),
    }
}

fn to_slot_item(slot: &Slot, controller: &DragController) -> SlotItem {
    let placeholder_height = match controller.layer_for(slot.id) {
        RenderLayer::Overlay { placeholder_height } => Some(placeholder_height),
        RenderLayer::List => None,
    };
    SlotItem {
        slot_id: slot.id.to_string(),
        title: slot.title.clone(),
        start: slot.start.map(format_timestamp),
        end: slot.end.map(format_timestamp),
        without_time: slot.without_time,
        status: status_label(slot.status).to_owned(),
        placeholder_height,
        sibling_offset: controller.sibling_offset(slot.id),
    }
}

fn to_outcome_view(outcome: &DragOutcome) -> DragOutcomeView {
    DragOutcomeView {
        slot_id: outcome.slot.id.to_string(),
        source_day: outcome.source_day.format(DATE_FORMAT).to_string(),
        target_day: outcome.target_day.format(DATE_FORMAT).to_string(),
        day_changed: outcome.day_changed,
        needs_commit: outcome.needs_commit(),
        swipe_action: outcome
            .swipe_action
            .map(|action| swipe_action_label(action).to_owned()),
        display_start: outcome.display_start.map(format_timestamp),
        committed_scroll_offset: outcome.committed_scroll_offset,
    }
}

fn phase_label(phase: Option<AxisPhase>) -> &'static str {
    use dayslot_core::Axis::{Horizontal, Vertical};
    match phase {
        None => "idle",
        Some(AxisPhase::Snapped) => "snapped",
        Some(AxisPhase::Breaking(Horizontal)) => "breaking_horizontal",
        Some(AxisPhase::Breaking(Vertical)) => "breaking_vertical",
        Some(AxisPhase::Locked(Horizontal)) => "locked_horizontal",
        Some(AxisPhase::Locked(Vertical)) => "locked_vertical",
        Some(AxisPhase::Settling) => "settling",
        Some(AxisPhase::Settled) => "settled",
    }
}

fn vertical_zone_label(zone: VerticalZone) -> &'static str {
    match zone {
        VerticalZone::Top => "top",
        VerticalZone::Middle => "middle",
        VerticalZone::Bottom => "bottom",
    }
}

fn horizontal_zone_label(zone: HorizontalZone) -> &'static str {
    match zone {
        HorizontalZone::Left => "left",
        HorizontalZone::Middle => "middle",
        HorizontalZone::Right => "right",
    }
}

fn swipe_action_label(action: SwipeAction) -> &'static str {
    match action {
        SwipeAction::Complete => "complete",
        SwipeAction::Delete => "delete",
    }
}

fn status_label(status: CompletionStatus) -> &'static str {
    match status {
        CompletionStatus::Auto => "auto",
        CompletionStatus::Completed => "completed",
        CompletionStatus::Incomplete => "incomplete",
    }
}
