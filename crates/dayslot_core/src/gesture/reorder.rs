//! Sibling repositioning while a slot is dragged vertically.
//!
//! Each sibling remembers whether the dragged midpoint was last seen above
//! or below its own midpoint. Only a flip of that relation changes the
//! sibling's target offset, so the underlying list is never re-sorted
//! during the drag. Comparisons happen in content coordinates: sibling
//! midpoints are measured at drag start and the dragged midpoint is shifted
//! by the auto-scroll translation.
//!
//! # Invariants
//! - The dragged slot never receives an offset.
//! - Updates for a day other than the tracked day are ignored.
//! - Without an active drag every call is a no-op.

use crate::config::DragConfig;
use crate::gesture::spring::Spring;
use crate::model::drag::ItemFrame;
use crate::model::slot::SlotId;
use chrono::NaiveDate;
use log::debug;
use std::time::{Duration, Instant};

/// Measured position of one list row at drag start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLayout {
    pub slot_id: SlotId,
    pub index: usize,
    pub frame: ItemFrame,
}

#[derive(Debug, Clone)]
struct SiblingState {
    slot_id: SlotId,
    index: usize,
    mid_y: f64,
    dragged_above: bool,
    spring: Spring,
}

#[derive(Debug, Clone, Copy)]
struct DraggedRow {
    slot_id: SlotId,
    index: usize,
    height: f64,
}

/// Gap-opening offsets for the siblings of the dragged row.
#[derive(Debug, Clone)]
pub struct ReorderCalculator {
    stiffness: f64,
    damping: f64,
    day: Option<NaiveDate>,
    dragged: Option<DraggedRow>,
    siblings: Vec<SiblingState>,
    last_tick: Option<Instant>,
}

impl ReorderCalculator {
    pub fn new(config: &DragConfig) -> Self {
        Self {
            stiffness: config.spring_stiffness,
            damping: config.spring_damping,
            day: None,
            dragged: None,
            siblings: Vec::new(),
            last_tick: None,
        }
    }

    /// Starts tracking `rows` of `day`; `dragged_id` must be one of them.
    pub fn begin(&mut self, day: NaiveDate, dragged_id: SlotId, rows: &[RowLayout], now: Instant) {
        self.clear();
        let Some(dragged) = rows.iter().find(|row| row.slot_id == dragged_id) else {
            debug!(
                "event=reorder_begin module=reorder status=skip reason=dragged_row_missing slot_id={dragged_id}"
            );
            return;
        };
        self.day = Some(day);
        self.dragged = Some(DraggedRow {
            slot_id: dragged.slot_id,
            index: dragged.index,
            height: dragged.frame.height,
        });
        self.siblings = rows
            .iter()
            .filter(|row| row.slot_id != dragged_id)
            .map(|row| SiblingState {
                slot_id: row.slot_id,
                index: row.index,
                mid_y: row.frame.mid_y(),
                dragged_above: row.index > dragged.index,
                spring: Spring::at(0.0, self.stiffness, self.damping),
            })
            .collect();
        self.last_tick = Some(now);
    }

    /// Re-evaluates siblings against the dragged midpoint.
    ///
    /// `dragged_mid_y` is in screen coordinates; `scroll_translation` is the
    /// auto-scroll distance accumulated since drag start.
    pub fn update(&mut self, day: NaiveDate, dragged_mid_y: f64, scroll_translation: f64) {
        let Some(dragged) = self.dragged else {
            return;
        };
        if self.day != Some(day) {
            return;
        }
        let content_mid_y = dragged_mid_y + scroll_translation;
        for sibling in &mut self.siblings {
            let now_above = content_mid_y < sibling.mid_y;
            if now_above == sibling.dragged_above {
                continue;
            }
            sibling.dragged_above = now_above;
            let target = if sibling.index < dragged.index {
                if now_above {
                    dragged.height
                } else {
                    0.0
                }
            } else if now_above {
                0.0
            } else {
                -dragged.height
            };
            sibling.spring.set_target(target);
        }
    }

    /// Animates every sibling spring toward its target.
    pub fn advance(&mut self, now: Instant) {
        let dt = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);
        for sibling in &mut self.siblings {
            sibling.spring.advance(dt);
        }
    }

    /// Closes every gap; used when the dragged row settles back.
    pub fn release(&mut self) {
        for sibling in &mut self.siblings {
            sibling.spring.set_target(0.0);
        }
    }

    pub fn clear(&mut self) {
        self.day = None;
        self.dragged = None;
        self.siblings.clear();
        self.last_tick = None;
    }

    /// Current animated offset of `slot_id`; zero for unknown or dragged rows.
    pub fn offset_for(&self, slot_id: SlotId) -> f64 {
        if self.dragged.is_some_and(|dragged| dragged.slot_id == slot_id) {
            return 0.0;
        }
        self.siblings
            .iter()
            .find(|sibling| sibling.slot_id == slot_id)
            .map_or(0.0, |sibling| sibling.spring.position())
    }

    /// Target offset `slot_id` is animating toward.
    pub fn target_for(&self, slot_id: SlotId) -> f64 {
        self.siblings
            .iter()
            .find(|sibling| sibling.slot_id == slot_id)
            .map_or(0.0, |sibling| sibling.spring.target())
    }

    pub fn is_settled(&self) -> bool {
        self.siblings.iter().all(|sibling| sibling.spring.is_at_rest())
    }
}
