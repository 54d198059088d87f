//! Flutter-facing bindings for DaySlot.

pub mod api;
