//! Drag session value types.
//!
//! # Responsibility
//! - Describe the ephemeral state of one pointer-driven drag.
//! - Provide geometry and zone enums shared by gesture components.
//!
//! # Invariants
//! - A `DragSession` is never persisted.
//! - At most one session exists at a time; `DragController` owns it.

use crate::model::slot::Slot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use std::time::Instant;

/// 2D position or translation in screen points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Sum of absolute axis components.
    pub fn manhattan(self) -> f64 {
        self.x.abs() + self.y.abs()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Screen dimensions used for zone classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Measured on-screen frame of a draggable item.
///
/// Defaults to a zero frame when measurement fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFrame {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl ItemFrame {
    pub const fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Vertical midpoint in screen coordinates.
    pub fn mid_y(&self) -> f64 {
        self.origin.y + self.height / 2.0
    }
}

/// Vertical screen-edge zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalZone {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Horizontal screen-edge zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalZone {
    Left,
    #[default]
    Middle,
    Right,
}

impl HorizontalZone {
    /// Calendar day step for an auto day-advance in this zone.
    pub fn day_step(self) -> i64 {
        match self {
            Self::Left => -1,
            Self::Middle => 0,
            Self::Right => 1,
        }
    }
}

/// Gesture axis a drag is committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Axis-lock and snap phase of a drag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisPhase {
    /// Clamped near origin, not yet committed to an axis.
    #[default]
    Snapped,
    /// Animating away from origin toward the pointer.
    Breaking(Axis),
    /// Following the pointer on one axis; the other is forced to zero.
    Locked(Axis),
    /// Released; offsets spring back to zero.
    Settling,
    /// Settle finished; the session is ready for teardown.
    Settled,
}

impl AxisPhase {
    /// Axis currently capturing movement, if any.
    pub fn axis(self) -> Option<Axis> {
        match self {
            Self::Breaking(axis) | Self::Locked(axis) => Some(axis),
            _ => None,
        }
    }

    pub fn is_released(self) -> bool {
        matches!(self, Self::Settling | Self::Settled)
    }
}

/// Swipe action revealed by a short horizontal drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeAction {
    Complete,
    Delete,
}

/// Ephemeral state of the active drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// Snapshot of the dragged slot at activation.
    pub slot: Slot,
    /// Day the drag started on.
    pub source_day: NaiveDate,
    /// Day currently shown; advanced by edge zones.
    pub current_day: NaiveDate,
    /// Item frame measured at activation.
    pub frame: ItemFrame,
    /// Pointer position relative to `frame.origin` at activation.
    pub grab_point: Point,
    /// Absolute pointer position at activation.
    pub start_pointer: Point,
    /// Latest absolute pointer position.
    pub pointer: Point,
    /// Translation applied to the item after axis locking.
    pub offset: Point,
    pub vertical_zone: VerticalZone,
    pub horizontal_zone: HorizontalZone,
    pub phase: AxisPhase,
    /// Set once any auto day-advance happened during this session.
    pub day_changed: bool,
    pub started_at: Instant,
}

impl DragSession {
    pub fn new(
        slot: Slot,
        source_day: NaiveDate,
        frame: ItemFrame,
        start_pointer: Point,
        started_at: Instant,
    ) -> Self {
        Self {
            slot,
            source_day,
            current_day: source_day,
            frame,
            grab_point: start_pointer - frame.origin,
            start_pointer,
            pointer: start_pointer,
            offset: Point::ZERO,
            vertical_zone: VerticalZone::Middle,
            horizontal_zone: HorizontalZone::Middle,
            phase: AxisPhase::Snapped,
            day_changed: false,
            started_at,
        }
    }

    /// Raw pointer displacement since activation.
    pub fn delta(&self) -> Point {
        self.pointer - self.start_pointer
    }

    /// Midpoint of the dragged item including its vertical offset.
    pub fn dragged_mid_y(&self) -> f64 {
        self.frame.mid_y() + self.offset.y
    }
}
