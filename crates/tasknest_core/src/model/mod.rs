//! Domain model for the task tracker.
//!
//! # Responsibility
//! - Define the canonical task record used by core business logic.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - `completed_at` mirrors `is_completed` at all times.

pub mod task;
