//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable-store contract the task store depends on.
//! - Isolate SQLite query details from store orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Task::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod task_repo;
