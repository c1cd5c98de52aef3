//! Core engine of the task-list app.
//!
//! Owns the task/list model, its best-effort persistence, and the reminder
//! timers that turn due tasks into notifications. Presentation code drives
//! everything through `TaskSession`.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod persist;
pub mod scheduler;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig, DEFAULT_LIST_NAME, DEFAULT_STORAGE_KEY};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::reminder::{Reminder, ReminderDraft};
pub use model::task::{ListId, Task, TaskId, TaskList, ValidationError};
pub use notify::sink::{
    LogNotificationPlatform, Notification, NotificationError, NotificationPlatform,
    NotificationSink, Permission, ShowOutcome, NOTIFICATION_TITLE,
};
pub use persist::adapter::{LoadedSnapshot, PersistenceAdapter, SeedReason, SnapshotOrigin};
pub use persist::slot::{FileSlot, KvSlot, MemorySlot, SqliteSlot, StorageError, StorageResult};
pub use scheduler::clock::{Clock, ManualClock, SystemClock};
pub use scheduler::reminder::{
    ArmedTimerInfo, FireOutcome, ReminderScheduler, SchedulerError, TimerChange, TimerFired,
};
pub use service::task_session::{SessionError, SessionResult, TaskSession};
pub use store::task_store::{ReconcileSignal, TaskStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
