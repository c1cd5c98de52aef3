//! Task-list domain model.
//!
//! # Responsibility
//! - Define the list/task/reminder records owned by the task store.
//! - Keep the persisted JSON field names in one place.
//!
//! # Invariants
//! - Every list and task is identified by a stable numeric id.
//! - Reminders are complete (date and time) or absent.

pub mod reminder;
pub mod task;
