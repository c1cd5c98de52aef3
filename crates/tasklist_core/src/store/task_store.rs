//! In-memory task store and reconciliation signals.
//!
//! # Responsibility
//! - Own the canonical list-of-lists model for one session.
//! - Apply user mutations synchronously and record which tasks they touched.
//!
//! # Invariants
//! - List ids and task ids are unique across the store and never reused
//!   within a session (monotonic counters).
//! - Every mutation that can change whether a task should have an armed
//!   reminder queues exactly one `ReconcileSignal`.
//! - Rejected input leaves the store untouched.

use crate::model::reminder::Reminder;
use crate::model::task::{require_text, ListId, Task, TaskId, TaskList, ValidationError};
use log::{debug, warn};
use std::collections::HashSet;

/// Notification that a task's armable state may have changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileSignal {
    /// One task was added, removed, toggled or had its reminder replaced.
    Task { list_id: ListId, task_id: TaskId },
    /// A whole list (and every task in it) was removed.
    ListRemoved {
        list_id: ListId,
        task_ids: Vec<TaskId>,
    },
}

impl ReconcileSignal {
    /// Task ids named by this signal.
    pub fn task_ids(&self) -> Vec<TaskId> {
        match self {
            Self::Task { task_id, .. } => vec![*task_id],
            Self::ListRemoved { task_ids, .. } => task_ids.clone(),
        }
    }
}

/// Canonical task/list model with queued reconciliation signals.
#[derive(Debug, Clone)]
pub struct TaskStore {
    lists: Vec<TaskList>,
    /// `None` once every list id has been handed out.
    next_list_id: Option<ListId>,
    /// `None` once every task id has been handed out.
    next_task_id: Option<TaskId>,
    signals: Vec<ReconcileSignal>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::from_lists(Vec::new())
    }

    /// Builds a store from a loaded snapshot.
    ///
    /// Id counters resume after the highest id present. A list or task id
    /// that repeats an earlier one is reassigned a fresh id so the
    /// uniqueness invariant holds for legacy data. When the snapshot leaves
    /// no room above its highest id, every id is renumbered from 1.
    pub fn from_lists(mut lists: Vec<TaskList>) -> Self {
        let mut store = Self {
            lists: Vec::new(),
            next_list_id: Some(1),
            next_task_id: Some(1),
            signals: Vec::new(),
        };

        let mut normalized = store.resume_counters(&lists);
        if normalized.is_ok() {
            normalized = store.renumber_duplicates(&mut lists);
        }
        if normalized.is_err() {
            store.compact_ids(&mut lists);
        }

        store.lists = lists;
        store
    }

    /// All lists in creation order.
    pub fn lists(&self) -> &[TaskList] {
        &self.lists
    }

    /// Looks up a list by id.
    pub fn list(&self, list_id: ListId) -> Option<&TaskList> {
        self.lists.iter().find(|list| list.id == list_id)
    }

    /// Looks up a task within one list.
    pub fn task(&self, list_id: ListId, task_id: TaskId) -> Option<&Task> {
        self.list(list_id).and_then(|list| list.task(task_id))
    }

    /// Finds a task in any list.
    pub fn find_task(&self, task_id: TaskId) -> Option<(ListId, &Task)> {
        self.all_tasks().find(|(_, task)| task.id == task_id)
    }

    /// Every task in the store paired with its owning list id.
    pub fn all_tasks(&self) -> impl Iterator<Item = (ListId, &Task)> {
        self.lists
            .iter()
            .flat_map(|list| list.tasks.iter().map(move |task| (list.id, task)))
    }

    /// Owned copy of the current lists, suitable for persistence.
    pub fn snapshot(&self) -> Vec<TaskList> {
        self.lists.clone()
    }

    /// Drains queued reconciliation signals in emission order.
    pub fn take_signals(&mut self) -> Vec<ReconcileSignal> {
        std::mem::take(&mut self.signals)
    }

    /// Whether signals are waiting to be drained.
    pub fn has_pending_signals(&self) -> bool {
        !self.signals.is_empty()
    }

    /// Creates an empty list with a fresh id.
    ///
    /// # Errors
    /// - `BlankListName` when `name` is blank after trimming.
    /// - `IdsExhausted` when no list id is left to hand out.
    pub fn add_list(&mut self, name: &str) -> Result<&TaskList, ValidationError> {
        let name = require_text(name, ValidationError::BlankListName)?;
        let id = self.allocate_list_id()?;
        self.lists.push(TaskList::new(id, name));
        debug!("event=list_add module=store status=ok list_id={id}");
        Ok(&self.lists[self.lists.len() - 1])
    }

    /// Renames a list.
    pub fn rename_list(&mut self, list_id: ListId, name: &str) -> Result<(), ValidationError> {
        let name = require_text(name, ValidationError::BlankListName)?;
        let list = self.list_mut(list_id)?;
        list.name = name;
        debug!("event=list_rename module=store status=ok list_id={list_id}");
        Ok(())
    }

    /// Removes a list and every task in it.
    ///
    /// Returns the removed list, or `None` (and emits nothing) when absent.
    pub fn remove_list(&mut self, list_id: ListId) -> Option<TaskList> {
        let index = self.lists.iter().position(|list| list.id == list_id)?;
        let removed = self.lists.remove(index);
        let task_ids: Vec<TaskId> = removed.tasks.iter().map(|task| task.id).collect();
        debug!(
            "event=list_remove module=store status=ok list_id={} task_count={}",
            list_id,
            task_ids.len()
        );
        self.signals
            .push(ReconcileSignal::ListRemoved { list_id, task_ids });
        Some(removed)
    }

    /// Appends a new incomplete task to a list.
    ///
    /// A reminder is stored as given; partial reminders never reach this
    /// point because `Reminder` is complete by construction.
    ///
    /// # Errors
    /// - `BlankTaskText` when `text` is blank after trimming.
    /// - `ListNotFound` when `list_id` is unknown.
    /// - `IdsExhausted` when no task id is left to hand out.
    pub fn add_task(
        &mut self,
        list_id: ListId,
        text: &str,
        reminder: Option<Reminder>,
    ) -> Result<&Task, ValidationError> {
        let text = require_text(text, ValidationError::BlankTaskText)?;
        let index = self.list_index(list_id)?;
        let task_id = self.allocate_task_id()?;
        let has_reminder = reminder.is_some();

        let list = &mut self.lists[index];
        list.tasks.push(Task::new(task_id, text).with_reminder(reminder));
        debug!(
            "event=task_add module=store status=ok list_id={list_id} task_id={task_id} has_reminder={has_reminder}"
        );
        self.signals
            .push(ReconcileSignal::Task { list_id, task_id });

        let list = &self.lists[index];
        Ok(&list.tasks[list.tasks.len() - 1])
    }

    /// Removes a task. Idempotent: a missing task is a silent no-op.
    ///
    /// Returns whether a task was removed.
    pub fn remove_task(&mut self, list_id: ListId, task_id: TaskId) -> bool {
        let Ok(list) = self.list_mut(list_id) else {
            return false;
        };
        let Some(index) = list.tasks.iter().position(|task| task.id == task_id) else {
            return false;
        };
        list.tasks.remove(index);
        debug!("event=task_remove module=store status=ok list_id={list_id} task_id={task_id}");
        self.signals
            .push(ReconcileSignal::Task { list_id, task_id });
        true
    }

    /// Flips completion state and returns the new value.
    pub fn toggle_completed(
        &mut self,
        list_id: ListId,
        task_id: TaskId,
    ) -> Result<bool, ValidationError> {
        let task = self.task_mut(list_id, task_id)?;
        task.is_completed = !task.is_completed;
        let completed = task.is_completed;
        debug!(
            "event=task_toggle module=store status=ok list_id={list_id} task_id={task_id} completed={completed}"
        );
        self.signals
            .push(ReconcileSignal::Task { list_id, task_id });
        Ok(completed)
    }

    /// Replaces the reminder, or clears it with `None`.
    pub fn set_reminder(
        &mut self,
        list_id: ListId,
        task_id: TaskId,
        reminder: Option<Reminder>,
    ) -> Result<(), ValidationError> {
        let task = self.task_mut(list_id, task_id)?;
        let has_reminder = reminder.is_some();
        task.reminder = reminder;
        debug!(
            "event=task_reminder module=store status=ok list_id={list_id} task_id={task_id} has_reminder={has_reminder}"
        );
        self.signals
            .push(ReconcileSignal::Task { list_id, task_id });
        Ok(())
    }

    /// Replaces task text. Does not affect reminder armability.
    pub fn edit_task_text(
        &mut self,
        list_id: ListId,
        task_id: TaskId,
        text: &str,
    ) -> Result<(), ValidationError> {
        let text = require_text(text, ValidationError::BlankTaskText)?;
        let task = self.task_mut(list_id, task_id)?;
        task.text = text;
        debug!("event=task_edit module=store status=ok list_id={list_id} task_id={task_id}");
        Ok(())
    }

    fn list_index(&self, list_id: ListId) -> Result<usize, ValidationError> {
        self.lists
            .iter()
            .position(|list| list.id == list_id)
            .ok_or(ValidationError::ListNotFound(list_id))
    }

    fn list_mut(&mut self, list_id: ListId) -> Result<&mut TaskList, ValidationError> {
        let index = self.list_index(list_id)?;
        Ok(&mut self.lists[index])
    }

    fn task_mut(&mut self, list_id: ListId, task_id: TaskId) -> Result<&mut Task, ValidationError> {
        self.list_mut(list_id)?
            .task_mut(task_id)
            .ok_or(ValidationError::TaskNotFound { list_id, task_id })
    }

    fn resume_counters(&mut self, lists: &[TaskList]) -> Result<(), ValidationError> {
        let max_list_id = lists.iter().map(|list| list.id).max().unwrap_or(0);
        let max_task_id = lists
            .iter()
            .flat_map(|list| list.tasks.iter().map(|task| task.id))
            .max()
            .unwrap_or(0);
        self.next_list_id = Some(
            max_list_id
                .checked_add(1)
                .ok_or(ValidationError::IdsExhausted)?,
        );
        self.next_task_id = Some(
            max_task_id
                .checked_add(1)
                .ok_or(ValidationError::IdsExhausted)?,
        );
        Ok(())
    }

    fn renumber_duplicates(&mut self, lists: &mut [TaskList]) -> Result<(), ValidationError> {
        let mut seen_lists = HashSet::new();
        let mut seen_tasks = HashSet::new();
        for list in lists.iter_mut() {
            if !seen_lists.insert(list.id) {
                let fresh = self.allocate_list_id()?;
                warn!(
                    "event=store_normalize module=store status=ok kind=list old_id={} new_id={}",
                    list.id, fresh
                );
                list.id = fresh;
                seen_lists.insert(fresh);
            }
            for task in &mut list.tasks {
                if !seen_tasks.insert(task.id) {
                    let fresh = self.allocate_task_id()?;
                    warn!(
                        "event=store_normalize module=store status=ok kind=task list_id={} old_id={} new_id={}",
                        list.id, task.id, fresh
                    );
                    task.id = fresh;
                    seen_tasks.insert(fresh);
                }
            }
        }
        Ok(())
    }

    /// Renumbers lists and tasks from 1 in snapshot order.
    fn compact_ids(&mut self, lists: &mut [TaskList]) {
        let mut next_list_id: ListId = 1;
        let mut next_task_id: TaskId = 1;
        for list in lists.iter_mut() {
            list.id = next_list_id;
            next_list_id += 1;
            for task in &mut list.tasks {
                task.id = next_task_id;
                next_task_id += 1;
            }
        }
        warn!(
            "event=store_normalize module=store status=ok kind=compact list_count={} task_count={}",
            next_list_id - 1,
            next_task_id - 1
        );
        self.next_list_id = Some(next_list_id);
        self.next_task_id = Some(next_task_id);
    }

    fn allocate_list_id(&mut self) -> Result<ListId, ValidationError> {
        let id = self.next_list_id.ok_or(ValidationError::IdsExhausted)?;
        self.next_list_id = id.checked_add(1);
        Ok(id)
    }

    fn allocate_task_id(&mut self) -> Result<TaskId, ValidationError> {
        let id = self.next_task_id.ok_or(ValidationError::IdsExhausted)?;
        self.next_task_id = id.checked_add(1);
        Ok(id)
    }
}
