//! Drag overlay coordination via render-target selection.
//!
//! The dragged slot is not moved between view trees. Instead renderers ask
//! [`OverlayCoordinator::layer_for`] which layer owns a slot's presentation:
//! the dragged slot renders in the top-level overlay, and its list position
//! renders a placeholder of the measured height.
//!
//! # Invariants
//! - At most one slot is owned by the overlay.
//! - The overlay starts hidden and becomes visible on content load or after
//!   `overlay_reveal_timeout`, whichever comes first.
//! - `finish()` hides the overlay and releases the slot.

use crate::config::DragConfig;
use crate::model::drag::{ItemFrame, Point};
use crate::model::slot::SlotId;
use std::time::{Duration, Instant};

/// Layer that presents a slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderLayer {
    /// Normal list rendering.
    List,
    /// Drawn in the top-level overlay; the list keeps a gap of
    /// `placeholder_height` at the slot's position.
    Overlay { placeholder_height: f64 },
}

/// Snapshot consumed by the overlay renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayView {
    pub slot_id: SlotId,
    /// Top-left corner in screen coordinates.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy)]
struct OverlayState {
    slot_id: SlotId,
    frame: ItemFrame,
    offset: Point,
    visible: bool,
    reveal_deadline: Option<Instant>,
}

/// Owner of the overlay layer.
#[derive(Debug, Clone)]
pub struct OverlayCoordinator {
    reveal_timeout: Duration,
    state: Option<OverlayState>,
}

impl OverlayCoordinator {
    pub fn new(config: &DragConfig) -> Self {
        Self {
            reveal_timeout: config.overlay_reveal_timeout,
            state: None,
        }
    }

    /// Moves `slot_id` into the overlay, hidden until revealed.
    pub fn begin(&mut self, slot_id: SlotId, frame: ItemFrame, now: Instant) {
        self.state = Some(OverlayState {
            slot_id,
            frame,
            offset: Point::ZERO,
            visible: false,
            reveal_deadline: Some(now + self.reveal_timeout),
        });
    }

    /// Tracks the axis-locked translation of the dragged item.
    pub fn track(&mut self, offset: Point) {
        if let Some(state) = self.state.as_mut() {
            state.offset = offset;
        }
    }

    /// Overlay content finished loading; reveal immediately.
    pub fn content_loaded(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.visible = true;
            state.reveal_deadline = None;
        }
    }

    /// Reveals the overlay once the grace period has elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        match state.reveal_deadline {
            Some(deadline) if now >= deadline => {
                state.visible = true;
                state.reveal_deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Hides the overlay and hands the slot back to the list.
    pub fn finish(&mut self) {
        self.state = None;
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn layer_for(&self, slot_id: SlotId) -> RenderLayer {
        match self.state {
            Some(state) if state.slot_id == slot_id => RenderLayer::Overlay {
                placeholder_height: state.frame.height,
            },
            _ => RenderLayer::List,
        }
    }

    pub fn view(&self) -> Option<OverlayView> {
        self.state.map(|state| OverlayView {
            slot_id: state.slot_id,
            position: state.frame.origin + state.offset,
            width: state.frame.width,
            height: state.frame.height,
            visible: state.visible,
        })
    }
}
