//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and cache calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod commit_service;
pub mod day_service;
pub mod swipe_service;
