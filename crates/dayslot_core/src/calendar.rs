//! Calendar date store.
//!
//! # Responsibility
//! - Hold the globally observed "currently selected date".
//! - Let the zone driver advance days and day views react to it.

use crate::observable::ObservableCell;
use chrono::{NaiveDate, TimeDelta};
use log::debug;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

/// Observable selected calendar date.
#[derive(Debug, Clone)]
pub struct CalendarDateStore {
    selected: Arc<ObservableCell<NaiveDate>>,
}

impl CalendarDateStore {
    pub fn new(initial: NaiveDate) -> Self {
        Self {
            selected: Arc::new(ObservableCell::new(initial)),
        }
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected.get()
    }

    pub fn set(&self, date: NaiveDate) {
        self.selected.set(date);
    }

    /// Moves the selection by `days` and returns the new date.
    ///
    /// Out-of-range results leave the selection unchanged.
    pub fn shift_days(&self, days: i64) -> NaiveDate {
        let current = self.selected.get();
        let Some(next) = TimeDelta::try_days(days).and_then(|delta| current.checked_add_signed(delta))
        else {
            debug!("event=calendar_shift module=calendar status=skip reason=out_of_range days={days}");
            return current;
        };
        self.selected.set(next);
        next
    }

    pub fn subscribe(&self) -> Receiver<NaiveDate> {
        self.selected.subscribe()
    }
}
