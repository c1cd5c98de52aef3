//! Reminder scheduling.
//!
//! # Responsibility
//! - Map tasks with future reminders to cancellable timers.
//! - Isolate wall-clock reads behind `Clock` so arming is testable.
//!
//! # Invariants
//! - At most one armed timer per task id.
//! - Timer deliveries are handled on the thread that owns the scheduler.

pub mod clock;
pub mod reminder;
