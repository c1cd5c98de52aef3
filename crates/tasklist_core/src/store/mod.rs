//! Session-scoped task store.
//!
//! # Responsibility
//! - Hold the authoritative list/task model in memory.
//! - Publish reconciliation signals for the reminder scheduler.
//!
//! The store performs no I/O; persistence and timers react to it.

pub mod task_store;
