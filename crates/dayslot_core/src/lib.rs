//! Core domain logic for DaySlot.
//! This crate owns the drag-to-reschedule engine, the local slot cache and
//! the persistence saga behind it.

pub mod cache;
pub mod calendar;
pub mod config;
pub mod db;
pub mod gesture;
pub mod haptics;
pub mod logging;
pub mod model;
pub mod observable;
pub mod repo;
pub mod service;

pub use cache::slot_cache::{lock_cache, CacheMoveSnapshot, MergeOutcome, SharedSlotCache, SlotCache};
pub use calendar::CalendarDateStore;
pub use config::{ConfigError, DragConfig, GridBand, RetryPolicy};
pub use gesture::controller::{DragController, DragOutcome, DragSignals, DragTarget};
pub use gesture::tracker::{GestureEvent, PointerInput};
pub use haptics::{HapticFeedback, HapticIntensity, NoopHaptics};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::drag::{
    Axis, AxisPhase, HorizontalZone, ItemFrame, Point, ScreenSize, SwipeAction, VerticalZone,
};
pub use model::slot::{CompletionStatus, Slot, SlotId, SlotValidationError, SubTask};
pub use repo::slot_repo::{
    RepoError, RepoResult, SchedulePatch, SlotRepository, SqliteSlotRepository,
};
pub use repo::slot_store::{RemoteSlotStore, SqliteSlotStore};
pub use service::commit_service::{
    CommitController, CommitError, CommitOutcome, CommitRequest, CommitTicket, Sleeper,
    ThreadSleeper,
};
pub use service::day_service::{DayService, PrefetchReport};
pub use service::swipe_service::SwipeService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
