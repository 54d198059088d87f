//! Slot domain model.
//!
//! # Responsibility
//! - Define the canonical schedulable record rendered by day lists.
//! - Provide day-move helpers used by drag commits.
//!
//! # Invariants
//! - `id` is stable and never reused for another slot.
//! - `end` is never earlier than `start` when both are set.
//! - When `start` is set, `date` equals the calendar day of `start`.
//! - When `without_time` is set, timestamps are midnight date boundaries.
//!
//! # See also
//! - `crate::cache::slot_cache` for the day-keyed slot cache

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every slot.
pub type SlotId = Uuid;

/// Completion state shown by the day list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    /// Derived from the slot's time window by the UI.
    Auto,
    /// Explicitly marked done.
    Completed,
    /// Explicitly marked not done.
    Incomplete,
}

/// Checklist entry nested under a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    pub title: String,
    pub done: bool,
}

/// Validation errors for slot invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValidationError {
    NilId,
    BlankTitle,
    InvalidWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    DateMismatch {
        date: Option<NaiveDate>,
        start: NaiveDateTime,
    },
    TimeOnDateOnlySlot(NaiveDateTime),
}

impl Display for SlotValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "slot id must not be nil"),
            Self::BlankTitle => write!(f, "slot title must not be blank"),
            Self::InvalidWindow { start, end } => {
                write!(f, "slot end ({end}) must be >= start ({start})")
            }
            Self::DateMismatch { date, start } => match date {
                Some(date) => write!(f, "slot date ({date}) does not match start ({start})"),
                None => write!(f, "slot with start ({start}) must carry a date"),
            },
            Self::TimeOnDateOnlySlot(value) => write!(
                f,
                "slot without time must use midnight boundaries, got {value}"
            ),
        }
    }
}

impl Error for SlotValidationError {}

/// Canonical schedulable unit shown in the day view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SlotRecord")]
pub struct Slot {
    pub id: SlotId,
    pub title: String,
    /// Calendar day the slot is scheduled on. `None` means unscheduled.
    pub date: Option<NaiveDate>,
    /// Local wall-clock start.
    pub start: Option<NaiveDateTime>,
    /// Local wall-clock end. Should be >= `start` when set.
    pub end: Option<NaiveDateTime>,
    /// Timestamps mark date boundaries only.
    pub without_time: bool,
    /// Opaque theme color token.
    pub color: String,
    pub description: Option<String>,
    pub subtasks: Vec<SubTask>,
    /// Opaque participant ids.
    pub participants: Vec<String>,
    pub status: CompletionStatus,
}

/// Serde shadow used to validate deserialized slots.
#[derive(Deserialize)]
struct SlotRecord {
    id: SlotId,
    title: String,
    date: Option<NaiveDate>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    #[serde(default)]
    without_time: bool,
    #[serde(default)]
    color: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    subtasks: Vec<SubTask>,
    #[serde(default)]
    participants: Vec<String>,
    status: CompletionStatus,
}

impl TryFrom<SlotRecord> for Slot {
    type Error = SlotValidationError;

    fn try_from(record: SlotRecord) -> Result<Self, Self::Error> {
        let slot = Slot {
            id: record.id,
            title: record.title,
            date: record.date,
            start: record.start,
            end: record.end,
            without_time: record.without_time,
            color: record.color,
            description: record.description,
            subtasks: record.subtasks,
            participants: record.participants,
            status: record.status,
        };
        slot.validate()?;
        Ok(slot)
    }
}

impl Slot {
    /// Creates an unscheduled slot with a generated stable ID.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title)
    }

    /// Creates an unscheduled slot with a caller-provided stable ID.
    pub fn with_id(id: SlotId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            date: None,
            start: None,
            end: None,
            without_time: false,
            color: String::new(),
            description: None,
            subtasks: Vec::new(),
            participants: Vec::new(),
            status: CompletionStatus::Auto,
        }
    }

    /// Creates a slot with a time-of-day window.
    pub fn timed(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let mut slot = Self::new(title);
        slot.date = Some(start.date());
        slot.start = Some(start);
        slot.end = Some(end);
        slot
    }

    /// Creates a slot that spans a calendar day without a time-of-day.
    pub fn all_day(title: impl Into<String>, date: NaiveDate) -> Self {
        let mut slot = Self::new(title);
        slot.date = Some(date);
        slot.start = Some(date.and_time(NaiveTime::MIN));
        slot.end = Some(date.and_time(NaiveTime::MIN));
        slot.without_time = true;
        slot
    }

    /// Validates domain invariants.
    pub fn validate(&self) -> Result<(), SlotValidationError> {
        if self.id.is_nil() {
            return Err(SlotValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(SlotValidationError::BlankTitle);
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end < start {
                return Err(SlotValidationError::InvalidWindow { start, end });
            }
        }
        if let Some(start) = self.start {
            if self.date != Some(start.date()) {
                return Err(SlotValidationError::DateMismatch {
                    date: self.date,
                    start,
                });
            }
        }
        if self.without_time {
            for value in [self.start, self.end].into_iter().flatten() {
                if value.time() != NaiveTime::MIN {
                    return Err(SlotValidationError::TimeOnDateOnlySlot(value));
                }
            }
        }
        Ok(())
    }

    /// Whether the slot carries a real time-of-day that drags may adjust.
    pub fn has_time_of_day(&self) -> bool {
        self.start.is_some() && !self.without_time
    }

    /// Length of the time window, zero when either bound is missing.
    pub fn duration(&self) -> TimeDelta {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end - start,
            _ => TimeDelta::zero(),
        }
    }

    /// Returns a copy moved from `source` to `target` day.
    ///
    /// Only the date portion changes; time-of-day is preserved.
    pub fn moved_to_day(&self, source: NaiveDate, target: NaiveDate) -> Slot {
        let delta = target.signed_duration_since(source);
        let shift = |value: NaiveDateTime| value.checked_add_signed(delta).unwrap_or(value);

        let mut moved = self.clone();
        moved.date = Some(
            self.date
                .and_then(|date| date.checked_add_signed(delta))
                .unwrap_or(target),
        );
        moved.start = self.start.map(shift);
        moved.end = self.end.map(shift);
        moved
    }

    /// Ordering key used by day lists: date-only slots first, then by start.
    pub fn day_order_key(&self) -> (bool, u32) {
        match self.start {
            Some(start) if !self.without_time => (true, start.num_seconds_from_midnight()),
            _ => (false, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CompletionStatus, Slot, SlotValidationError};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M")
            .expect("fixture datetime should parse")
    }

    fn day(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("fixture date should parse")
    }

    #[test]
    fn timed_slot_derives_date_from_start() {
        let slot = Slot::timed("standup", at("2024-06-01", "09:00"), at("2024-06-01", "10:00"));
        assert_eq!(slot.date, Some(day("2024-06-01")));
        assert_eq!(slot.status, CompletionStatus::Auto);
        assert!(slot.validate().is_ok());
        assert!(slot.has_time_of_day());
    }

    #[test]
    fn validate_rejects_reversed_window() {
        let slot = Slot::timed("bad", at("2024-06-01", "10:00"), at("2024-06-01", "09:00"));
        assert!(matches!(
            slot.validate(),
            Err(SlotValidationError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn validate_rejects_time_on_date_only_slot() {
        let mut slot = Slot::all_day("holiday", day("2024-06-01"));
        slot.end = Some(at("2024-06-01", "12:30"));
        assert_eq!(
            slot.validate(),
            Err(SlotValidationError::TimeOnDateOnlySlot(at(
                "2024-06-01",
                "12:30"
            )))
        );
    }

    #[test]
    fn moved_to_day_preserves_time_of_day() {
        let slot = Slot::timed("standup", at("2024-06-01", "09:00"), at("2024-06-01", "10:00"));
        let moved = slot.moved_to_day(day("2024-06-01"), day("2024-05-30"));

        assert_eq!(moved.id, slot.id);
        assert_eq!(moved.date, Some(day("2024-05-30")));
        assert_eq!(moved.start, Some(at("2024-05-30", "09:00")));
        assert_eq!(moved.end, Some(at("2024-05-30", "10:00")));
        assert!(moved.validate().is_ok());
    }

    #[test]
    fn deserialize_rejects_date_mismatch() {
        let value = serde_json::json!({
            "id": "11111111-2222-4333-8444-555555555555",
            "title": "bad date",
            "date": "2024-06-02",
            "start": "2024-06-01T09:00:00",
            "end": "2024-06-01T10:00:00",
            "status": "auto"
        });

        let err = serde_json::from_value::<Slot>(value).unwrap_err();
        assert!(
            err.to_string().contains("does not match start"),
            "unexpected error: {err}"
        );
    }
}
