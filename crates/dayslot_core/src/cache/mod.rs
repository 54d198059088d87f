//! Local slot cache shared by day views and commit sagas.
//!
//! # Responsibility
//! - Keep fetched day lists in memory for rendering.
//! - Own the optimistic move/compensation primitives.
//!
//! # See also
//! - `crate::service::commit_service` for the move saga

pub mod slot_cache;
