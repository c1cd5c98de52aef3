//! Task and task-list domain model.
//!
//! # Responsibility
//! - Define the canonical records persisted in the task-list snapshot.
//! - Provide small helpers for armability checks and view filtering.
//!
//! # Invariants
//! - `TaskList::id` is unique within a store.
//! - `Task::id` is unique within a store (and therefore within its list).
//! - `Task::text` is non-blank for tasks created through the store.
//!
//! # See also
//! - `store::task_store` for the mutation rules.

use crate::model::reminder::{deserialize_optional_reminder, Reminder};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a task list.
pub type ListId = u64;

/// Stable identifier for a task.
pub type TaskId = u64;

/// One actionable entry in a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Serialized as `task` for storage compatibility.
    #[serde(rename = "task")]
    pub text: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, deserialize_with = "deserialize_optional_reminder")]
    pub reminder: Option<Reminder>,
}

impl Task {
    /// Creates an incomplete task without reminder.
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            is_completed: false,
            reminder: None,
        }
    }

    /// Attaches (or clears) a reminder.
    pub fn with_reminder(mut self, reminder: Option<Reminder>) -> Self {
        self.reminder = reminder;
        self
    }

    /// Absolute instant of the attached reminder, if any and resolvable.
    pub fn reminder_instant(&self) -> Option<DateTime<Local>> {
        self.reminder.as_ref().and_then(Reminder::instant)
    }

    /// Returns the instant a timer should fire at, evaluated against `now`.
    ///
    /// `None` when the task is completed, has no resolvable reminder, or the
    /// reminder is not strictly after `now`.
    pub fn armable_instant(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        if self.is_completed {
            return None;
        }
        self.reminder_instant().filter(|fires_at| *fires_at > now)
    }
}

/// Named, ordered collection of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: ListId,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TaskList {
    /// Creates an empty list.
    pub fn new(id: ListId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    /// Looks up a task in this list.
    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub(crate) fn task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == task_id)
    }

    /// Tasks shown when the "show completed" toggle is in the given state.
    pub fn visible_tasks(&self, show_completed: bool) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(move |task| show_completed || !task.is_completed)
    }

    /// Number of tasks not yet completed.
    pub fn open_count(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_completed).count()
    }
}

/// Input rejected by a store or session mutator. No state changes on error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    BlankListName,
    BlankTaskText,
    ListNotFound(ListId),
    TaskNotFound { list_id: ListId, task_id: TaskId },
    NoListSelected,
    /// The store has handed out every id of the required kind.
    IdsExhausted,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankListName => write!(f, "list name must not be blank"),
            Self::BlankTaskText => write!(f, "task text must not be blank"),
            Self::ListNotFound(id) => write!(f, "task list not found: {id}"),
            Self::TaskNotFound { list_id, task_id } => {
                write!(f, "task {task_id} not found in list {list_id}")
            }
            Self::NoListSelected => write!(f, "no task list is selected"),
            Self::IdsExhausted => write!(f, "no unused id is left in this store"),
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects blank input with `error`.
pub(crate) fn require_text(value: &str, error: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(error);
    }
    Ok(trimmed.to_string())
}
