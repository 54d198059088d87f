//! Continuous drag-to-reschedule engine.
//!
//! # Responsibility
//! - Recognize taps and long-press drags on slot items.
//! - Lock drags to an axis, quantize display times, drive edge zones,
//!   coordinate the overlay and sibling reposition springs.
//!
//! # Invariants
//! - Every time-dependent call takes an explicit `now`.
//! - Nothing in this module performs I/O.
//!
//! # See also
//! - `controller::DragController` for the wiring of all components

pub mod axis_lock;
pub mod controller;
pub mod overlay;
pub mod quantize;
pub mod reorder;
pub mod spring;
pub mod tracker;
pub mod zone;
