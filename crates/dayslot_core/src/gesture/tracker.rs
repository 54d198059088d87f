//! Pointer gesture tracker: tap vs. long-press-then-pan.
//!
//! # Invariants
//! - Tap and drag never both emit for one press → release interaction.
//! - A drag activates only after `long_press_delay`; travel before that
//!   does not cancel it.
//! - While activation is blocked (another session alive) a held press never
//!   turns into a drag; it can still complete as a tap.
//! - After `reset()` the tracker is idle.

use crate::config::DragConfig;
use crate::model::drag::Point;
use std::time::{Duration, Instant};

/// Raw pointer input delivered by the host at pointer sampling rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(Point),
    Move(Point),
    Up(Point),
    /// System interruption; ends an active drag like a release.
    Cancel,
}

/// Recognized gesture produced from pointer input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Tap {
        position: Point,
    },
    /// Long-press recognized. `origin` is where the press started.
    DragStart {
        origin: Point,
        position: Point,
    },
    DragUpdate {
        position: Point,
        delta: Point,
    },
    /// Release (or cancel) of an active drag; requests a settle.
    DragEnd {
        position: Point,
        delta: Point,
    },
}

#[derive(Debug, Clone, Copy)]
struct Press {
    start: Point,
    last: Point,
    pressed_at: Instant,
    max_travel: f64,
    dragging: bool,
}

/// Thresholds copied out of [`DragConfig`].
#[derive(Debug, Clone, Copy)]
struct TrackerLimits {
    long_press_delay: Duration,
    tap_max_duration: Duration,
    tap_max_travel: f64,
}

/// Stateful recognizer for one draggable surface.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    limits: TrackerLimits,
    press: Option<Press>,
    activation_blocked: bool,
}

impl PointerTracker {
    pub fn new(config: &DragConfig) -> Self {
        Self {
            limits: TrackerLimits {
                long_press_delay: config.long_press_delay,
                tap_max_duration: config.tap_max_duration,
                tap_max_travel: config.tap_max_travel,
            },
            press: None,
            activation_blocked: false,
        }
    }

    /// Blocks or re-allows drag activation.
    pub fn set_activation_blocked(&mut self, blocked: bool) {
        self.activation_blocked = blocked;
    }

    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|press| press.dragging)
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn reset(&mut self) {
        self.press = None;
    }

    /// Processes one pointer sample.
    pub fn process(&mut self, input: PointerInput, now: Instant) -> Option<GestureEvent> {
        match input {
            PointerInput::Down(position) => {
                if self.press.is_none() {
                    self.press = Some(Press {
                        start: position,
                        last: position,
                        pressed_at: now,
                        max_travel: 0.0,
                        dragging: false,
                    });
                }
                None
            }
            PointerInput::Move(position) => {
                let press = self.press.as_mut()?;
                press.last = position;
                press.max_travel = press.max_travel.max((position - press.start).manhattan());
                if press.dragging {
                    return Some(GestureEvent::DragUpdate {
                        position,
                        delta: position - press.start,
                    });
                }
                self.try_activate(now)
            }
            PointerInput::Up(position) => {
                let press = self.press.take()?;
                let delta = position - press.start;
                if press.dragging {
                    return Some(GestureEvent::DragEnd { position, delta });
                }
                let held = now.saturating_duration_since(press.pressed_at);
                let travel = press.max_travel.max(delta.manhattan());
                if held <= self.limits.tap_max_duration && travel <= self.limits.tap_max_travel {
                    return Some(GestureEvent::Tap { position });
                }
                None
            }
            PointerInput::Cancel => {
                let press = self.press.take()?;
                press.dragging.then(|| GestureEvent::DragEnd {
                    position: press.last,
                    delta: press.last - press.start,
                })
            }
        }
    }

    /// Activates a held press once the long-press delay has elapsed.
    ///
    /// Called from the frame pump so a stationary press still activates.
    pub fn check_long_press(&mut self, now: Instant) -> Option<GestureEvent> {
        match self.press {
            Some(press) if !press.dragging => self.try_activate(now),
            _ => None,
        }
    }

    fn try_activate(&mut self, now: Instant) -> Option<GestureEvent> {
        if self.activation_blocked {
            return None;
        }
        let limits = self.limits;
        let press = self.press.as_mut()?;
        if now.saturating_duration_since(press.pressed_at) < limits.long_press_delay {
            return None;
        }
        press.dragging = true;
        Some(GestureEvent::DragStart {
            origin: press.start,
            position: press.last,
        })
    }
}
