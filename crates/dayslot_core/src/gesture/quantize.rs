//! Time quantization for vertical drags.
//!
//! # Responsibility
//! - Step the dragged slot's display start time while the drag is held
//!   outside the vertical snap band.
//! - Coarsen the step grid as the vertical offset grows.
//!
//! # Invariants
//! - Only slots with a time-of-day are quantized.
//! - Every tick re-reads the current vertical offset; first activation and
//!   every grid change step immediately, otherwise steps happen once per
//!   `quantize_interval`.
//! - The display time never leaves the slot's day; the end keeps the
//!   original duration.
//! - Output is display-only; nothing here persists.

use crate::config::DragConfig;
use crate::model::slot::Slot;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use std::time::{Duration, Instant};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Direction the display time moves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeDirection {
    Earlier,
    Later,
}

impl TimeDirection {
    fn from_offset(offset_y: f64) -> Self {
        if offset_y < 0.0 {
            Self::Earlier
        } else {
            Self::Later
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveGrid {
    direction: TimeDirection,
    grid_minutes: u32,
    display: NaiveDateTime,
    next_step_at: Instant,
}

/// Periodic time stepper for one drag session.
#[derive(Debug, Clone)]
pub struct TimeQuantizer {
    config: DragConfig,
    original: Option<NaiveDateTime>,
    duration: TimeDelta,
    active: Option<ActiveGrid>,
}

impl TimeQuantizer {
    pub fn new(config: &DragConfig, slot: &Slot) -> Self {
        Self {
            config: config.clone(),
            original: slot.has_time_of_day().then_some(slot.start).flatten(),
            duration: slot.duration(),
            active: None,
        }
    }

    /// Current display start, `None` while inactive.
    pub fn display_start(&self) -> Option<NaiveDateTime> {
        self.active.map(|active| active.display)
    }

    /// Current display end derived from the original duration.
    pub fn display_end(&self) -> Option<NaiveDateTime> {
        self.display_start().map(|start| start + self.duration)
    }

    pub fn grid_minutes(&self) -> Option<u32> {
        self.active.map(|active| active.grid_minutes)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Feeds the current vertical offset.
    ///
    /// `free` is true while the drag is captured vertically and outside the
    /// snap band. Returns the new display start when it changed.
    pub fn update(&mut self, offset_y: f64, free: bool, now: Instant) -> Option<NaiveDateTime> {
        let original = self.original?;
        if !free {
            self.active = None;
            return None;
        }

        let direction = TimeDirection::from_offset(offset_y);
        let grid_minutes = self.config.grid_minutes_for(offset_y);

        match self.active {
            None => {
                let mut seed = original;
                if grid_minutes > 1 {
                    seed = snap_to_grid(seed, grid_minutes, direction);
                }
                Some(self.step_from(seed, direction, grid_minutes, now))
            }
            Some(active)
                if active.grid_minutes != grid_minutes || active.direction != direction =>
            {
                let snapped = snap_to_grid(active.display, grid_minutes, direction);
                Some(self.step_from(snapped, direction, grid_minutes, now))
            }
            Some(_) => None,
        }
    }

    /// Timer tick from the application context.
    ///
    /// Re-bands against the current offset first, so a grid change that
    /// happens without pointer movement (a settling break, a held flick)
    /// re-snaps on this tick.
    pub fn tick(&mut self, offset_y: f64, free: bool, now: Instant) -> Option<NaiveDateTime> {
        if let Some(display) = self.update(offset_y, free, now) {
            return Some(display);
        }
        let active = self.active?;
        if now < active.next_step_at {
            return None;
        }
        let before = active.display;
        let display = self.step_from(before, active.direction, active.grid_minutes, now);
        (display != before).then_some(display)
    }

    fn step_from(
        &mut self,
        from: NaiveDateTime,
        direction: TimeDirection,
        grid_minutes: u32,
        now: Instant,
    ) -> NaiveDateTime {
        let step = TimeDelta::minutes(i64::from(grid_minutes));
        let stepped = match direction {
            TimeDirection::Earlier => from - step,
            TimeDirection::Later => from + step,
        };
        let display = self.clamp_to_day(stepped, from.date());
        self.active = Some(ActiveGrid {
            direction,
            grid_minutes,
            display,
            next_step_at: now + self.config.quantize_interval,
        });
        display
    }

    fn clamp_to_day(&self, value: NaiveDateTime, day: NaiveDate) -> NaiveDateTime {
        let day_start = day.and_time(NaiveTime::MIN);
        let latest = (day_start + TimeDelta::days(1) - self.duration).max(day_start);
        value.clamp(day_start, latest)
    }
}

/// Snaps `value` onto the grid, rounding against `direction` so that the
/// following step lands on the nearest grid line in `direction`.
pub fn snap_to_grid(value: NaiveDateTime, grid_minutes: u32, direction: TimeDirection) -> NaiveDateTime {
    let grid = i64::from(grid_minutes.max(1));
    let seconds = i64::from(value.num_seconds_from_midnight());
    let minutes = seconds / 60;
    let exact = seconds % 60 == 0 && minutes % grid == 0;
    let snapped_minutes = match direction {
        TimeDirection::Later => minutes - minutes % grid,
        TimeDirection::Earlier if exact => minutes,
        TimeDirection::Earlier => (minutes / grid + 1) * grid,
    };
    let day_start = value.date().and_time(NaiveTime::MIN);
    day_start + TimeDelta::minutes(snapped_minutes.min(MINUTES_PER_DAY))
}
