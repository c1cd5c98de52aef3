//! Task session: the use-case surface presentation code calls into.
//!
//! # Responsibility
//! - Own the store, persistence adapter, reminder scheduler and sink for
//!   one application session.
//! - After every mutation, persist the snapshot and route reconciliation
//!   signals to the scheduler.
//! - Track which list task-level calls operate on.
//!
//! # Invariants
//! - Only `ValidationError` crosses this boundary from user intents.
//! - The scheduler is reconciled before any mutator returns.
//! - Startup re-arms future reminders found in persisted data.

use crate::config::{ConfigError, CoreConfig};
use crate::model::reminder::Reminder;
use crate::model::task::{ListId, Task, TaskId, TaskList, ValidationError};
use crate::notify::sink::{NotificationSink, Permission};
use crate::persist::adapter::{PersistenceAdapter, SeedReason, SnapshotOrigin};
use crate::persist::slot::KvSlot;
use crate::scheduler::clock::Clock;
use crate::scheduler::reminder::{FireOutcome, ReminderScheduler, SchedulerError};
use crate::store::task_store::TaskStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type SessionResult<T> = Result<T, SessionError>;

/// Start-up failure of a session.
#[derive(Debug)]
pub enum SessionError {
    Config(ConfigError),
    Scheduler(SchedulerError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Scheduler(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Scheduler(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<SchedulerError> for SessionError {
    fn from(value: SchedulerError) -> Self {
        Self::Scheduler(value)
    }
}

/// Explicit context object for one session of the task-list app.
pub struct TaskSession<S: KvSlot> {
    store: TaskStore,
    persistence: PersistenceAdapter<S>,
    scheduler: ReminderScheduler,
    sink: NotificationSink,
    current_list_id: Option<ListId>,
}

impl<S: KvSlot> TaskSession<S> {
    /// Opens a session with default configuration.
    pub fn open(slot: S, sink: NotificationSink, clock: Arc<dyn Clock>) -> SessionResult<Self> {
        Self::open_with_config(slot, sink, clock, &CoreConfig::default())
    }

    /// Loads persisted lists, rebuilds the store and arms due reminders.
    ///
    /// The seeded default list is written back only when the slot held
    /// nothing. Unreadable or corrupt stored data is left in place.
    ///
    /// # Errors
    /// - `Config` when `config` fails validation.
    /// - `Scheduler` when no tokio runtime is available.
    pub fn open_with_config(
        slot: S,
        sink: NotificationSink,
        clock: Arc<dyn Clock>,
        config: &CoreConfig,
    ) -> SessionResult<Self> {
        config.validate()?;
        let mut scheduler = ReminderScheduler::new(clock)?;
        let mut persistence = PersistenceAdapter::with_config(slot, config);

        let loaded = persistence.load_snapshot();
        let seeded = loaded.is_seeded();
        let store = TaskStore::from_lists(loaded.lists);
        if loaded.origin == SnapshotOrigin::Seeded(SeedReason::Missing) {
            persistence.save(store.lists());
        }

        let armed = scheduler.reconcile_all(&store);
        let current_list_id = store.lists().first().map(|list| list.id);
        info!(
            "event=session_open module=service status=ok lists={} armed={} seeded={}",
            store.lists().len(),
            armed,
            seeded
        );

        Ok(Self {
            store,
            persistence,
            scheduler,
            sink,
            current_list_id,
        })
    }

    /// Read-only view of the task store.
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Read-only view of the reminder scheduler.
    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    /// Notification sink used for due reminders.
    pub fn sink(&self) -> &NotificationSink {
        &self.sink
    }

    /// Persistence adapter backing this session.
    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    /// All lists in display order.
    pub fn lists(&self) -> &[TaskList] {
        self.store.lists()
    }

    /// Id of the selected list, if any.
    pub fn current_list_id(&self) -> Option<ListId> {
        self.current_list_id
    }

    /// The selected list, if any.
    pub fn current_list(&self) -> Option<&TaskList> {
        self.current_list_id.and_then(|id| self.store.list(id))
    }

    /// Switches the list task-level calls operate on. Timers are unaffected.
    pub fn select_list(&mut self, list_id: ListId) -> Result<&TaskList, ValidationError> {
        let list = self
            .store
            .list(list_id)
            .ok_or(ValidationError::ListNotFound(list_id))?;
        self.current_list_id = Some(list_id);
        Ok(list)
    }

    /// Creates a list and selects it.
    pub fn add_list(&mut self, name: &str) -> Result<ListId, ValidationError> {
        let list_id = self.store.add_list(name)?.id;
        self.current_list_id = Some(list_id);
        self.commit();
        Ok(list_id)
    }

    /// Renames a list. Timers are unaffected.
    pub fn rename_list(&mut self, list_id: ListId, name: &str) -> Result<(), ValidationError> {
        self.store.rename_list(list_id, name)?;
        self.commit();
        Ok(())
    }

    /// Removes a list, its tasks and their timers.
    ///
    /// When the selected list is removed, the first remaining list becomes
    /// selected.
    pub fn remove_list(&mut self, list_id: ListId) -> Option<TaskList> {
        let removed = self.store.remove_list(list_id)?;
        if self.current_list_id == Some(list_id) {
            self.current_list_id = self.store.lists().first().map(|list| list.id);
        }
        self.commit();
        Some(removed)
    }

    /// Adds a task to the selected list.
    pub fn add_task(
        &mut self,
        text: &str,
        reminder: Option<Reminder>,
    ) -> Result<TaskId, ValidationError> {
        let list_id = self.require_current()?;
        let task_id = self.store.add_task(list_id, text, reminder)?.id;
        self.commit();
        Ok(task_id)
    }

    /// Removes a task from the selected list. A missing task is a no-op.
    pub fn remove_task(&mut self, task_id: TaskId) -> bool {
        let Some(list_id) = self.current_list_id else {
            return false;
        };
        let removed = self.store.remove_task(list_id, task_id);
        if removed {
            self.commit();
        }
        removed
    }

    /// Flips completion of a task in the selected list.
    pub fn toggle_task(&mut self, task_id: TaskId) -> Result<bool, ValidationError> {
        let list_id = self.require_current()?;
        let completed = self.store.toggle_completed(list_id, task_id)?;
        self.commit();
        Ok(completed)
    }

    /// Sets or (with `None`) clears a task's reminder.
    pub fn set_or_clear_reminder(
        &mut self,
        task_id: TaskId,
        reminder: Option<Reminder>,
    ) -> Result<(), ValidationError> {
        let list_id = self.require_current()?;
        self.store.set_reminder(list_id, task_id, reminder)?;
        self.commit();
        Ok(())
    }

    /// Replaces the text of a task in the selected list.
    pub fn edit_task_text(&mut self, task_id: TaskId, text: &str) -> Result<(), ValidationError> {
        let list_id = self.require_current()?;
        self.store.edit_task_text(list_id, task_id, text)?;
        self.commit();
        Ok(())
    }

    /// Looks up a task in the selected list.
    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.current_list()?.task(task_id)
    }

    /// Asks the platform for notification permission once.
    pub fn request_notification_permission(&mut self) -> Permission {
        self.sink.request_permission()
    }

    /// Waits for the next due reminder and handles it.
    ///
    /// Returns `None` when no timer is armed.
    pub async fn next_fire(&mut self) -> Option<FireOutcome> {
        let fired = self.scheduler.next_fired().await?;
        Some(self.scheduler.fire(&self.store, &self.sink, fired))
    }

    /// Handles every delivery already waiting, without blocking.
    pub fn process_due(&mut self) -> Vec<FireOutcome> {
        let mut outcomes = Vec::new();
        while let Some(fired) = self.scheduler.try_next_fired() {
            outcomes.push(self.scheduler.fire(&self.store, &self.sink, fired));
        }
        outcomes
    }

    /// Disarms every timer. Persisted data is left as is.
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
        info!("event=session_shutdown module=service status=ok");
    }

    fn require_current(&self) -> Result<ListId, ValidationError> {
        self.current_list_id.ok_or(ValidationError::NoListSelected)
    }

    fn commit(&mut self) {
        self.persistence.save(self.store.lists());
        for signal in self.store.take_signals() {
            self.scheduler.apply(&self.store, &signal);
        }
    }
}
