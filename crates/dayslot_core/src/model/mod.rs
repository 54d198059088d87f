//! Domain model for day scheduling and drag sessions.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep gesture value types free of rendering concerns.
//!
//! # Invariants
//! - Every slot is identified by a stable `SlotId`.
//! - Drag sessions are ephemeral and never persisted.
//!
//! # See also
//! - `crate::cache::slot_cache` for the day-keyed slot cache

pub mod drag;
pub mod slot;
