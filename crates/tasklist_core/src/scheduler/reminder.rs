//! Reminder timers keyed by task id.
//!
//! # Responsibility
//! - Keep exactly one armed timer per task that currently deserves one.
//! - Deliver due timers back to the owning thread and show notifications.
//!
//! # Invariants
//! - After any reconcile call, the armed ids are exactly the tasks that
//!   have a resolvable reminder, are incomplete, fire strictly after
//!   `clock.now()`, and live in a list the store still holds.
//! - Re-arming a task replaces its timer in one step; the old timer's
//!   delivery carries a stale generation and is dropped on receipt.
//! - A disarmed timer never produces a notification.
//! - Timers are one-shot and never mutate the store.
//!
//! # See also
//! - `store::task_store::ReconcileSignal`

use crate::model::task::{ListId, TaskId};
use crate::notify::sink::{NotificationSink, ShowOutcome};
use crate::scheduler::clock::Clock;
use crate::store::task_store::{ReconcileSignal, TaskStore};
use chrono::{DateTime, Local};
use log::{debug, info};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Longest single sleep; longer delays are slept in slices.
const MAX_SLEEP_SLICE: Duration = Duration::from_secs(24 * 60 * 60);

/// Delivery from a timer task that reached its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub task_id: TaskId,
    /// Arm generation the delivery belongs to.
    pub generation: u64,
}

/// Read-only view of one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimerInfo {
    pub task_id: TaskId,
    pub list_id: ListId,
    pub fires_at: DateTime<Local>,
    pub generation: u64,
}

/// Effect of a reconcile call on one task's timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerChange {
    Armed { fires_at: DateTime<Local> },
    Rearmed { fires_at: DateTime<Local> },
    Disarmed,
    Unchanged,
}

/// Result of handling one `TimerFired` delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// The task was still due; the sink was asked to show it.
    Notified { task_id: TaskId, shown: ShowOutcome },
    /// The timer was current but the task no longer qualified.
    Invalidated { task_id: TaskId },
    /// The delivery belongs to a timer that was already disarmed or replaced.
    Stale { task_id: TaskId },
}

#[derive(Debug)]
pub enum SchedulerError {
    /// Timers need a tokio runtime; none was running on this thread.
    NoRuntime(TryCurrentError),
}

impl Display for SchedulerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRuntime(err) => write!(f, "reminder scheduler needs a tokio runtime: {err}"),
        }
    }
}

impl Error for SchedulerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoRuntime(err) => Some(err),
        }
    }
}

struct ArmedTimer {
    list_id: ListId,
    fires_at: DateTime<Local>,
    generation: u64,
    handle: JoinHandle<()>,
}

/// Owner of the task-id → timer mapping.
pub struct ReminderScheduler {
    clock: Arc<dyn Clock>,
    runtime: Handle,
    timers: HashMap<TaskId, ArmedTimer>,
    fired_tx: UnboundedSender<TimerFired>,
    fired_rx: UnboundedReceiver<TimerFired>,
    last_generation: u64,
}

impl ReminderScheduler {
    /// Creates a scheduler bound to the current tokio runtime.
    ///
    /// # Errors
    /// - `NoRuntime` when called outside a tokio runtime context.
    pub fn new(clock: Arc<dyn Clock>) -> Result<Self, SchedulerError> {
        let runtime = Handle::try_current().map_err(SchedulerError::NoRuntime)?;
        Ok(Self::with_runtime(clock, runtime))
    }

    /// Creates a scheduler that spawns timers on `runtime`.
    pub fn with_runtime(clock: Arc<dyn Clock>, runtime: Handle) -> Self {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        Self {
            clock,
            runtime,
            timers: HashMap::new(),
            fired_tx,
            fired_rx,
            last_generation: 0,
        }
    }

    /// Current wall-clock time as seen by the scheduler.
    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// Whether `task_id` has an armed timer.
    pub fn is_armed(&self, task_id: TaskId) -> bool {
        self.timers.contains_key(&task_id)
    }

    /// Number of armed timers.
    pub fn armed_count(&self) -> usize {
        self.timers.len()
    }

    /// Armed task ids in ascending order.
    pub fn armed_task_ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self.timers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Details of the timer armed for `task_id`.
    pub fn armed(&self, task_id: TaskId) -> Option<ArmedTimerInfo> {
        self.timers.get(&task_id).map(|timer| ArmedTimerInfo {
            task_id,
            list_id: timer.list_id,
            fires_at: timer.fires_at,
            generation: timer.generation,
        })
    }

    /// Brings one task's timer in line with the store.
    pub fn reconcile(&mut self, store: &TaskStore, list_id: ListId, task_id: TaskId) -> TimerChange {
        let now = self.clock.now();
        let target = store
            .task(list_id, task_id)
            .and_then(|task| task.armable_instant(now));

        let Some(fires_at) = target else {
            return if self.disarm(task_id) {
                TimerChange::Disarmed
            } else {
                TimerChange::Unchanged
            };
        };

        if let Some(existing) = self.timers.get(&task_id) {
            if existing.list_id == list_id && existing.fires_at == fires_at {
                return TimerChange::Unchanged;
            }
        }

        let replaced = self.disarm(task_id);
        self.arm(list_id, task_id, fires_at, now);
        if replaced {
            TimerChange::Rearmed { fires_at }
        } else {
            TimerChange::Armed { fires_at }
        }
    }

    /// Disarms every listed task. Unknown ids are ignored.
    pub fn disarm_all(&mut self, task_ids: &[TaskId]) -> usize {
        task_ids
            .iter()
            .filter(|task_id| self.disarm(**task_id))
            .count()
    }

    /// Drops all timers and arms every qualifying task in `store`.
    ///
    /// Returns the number of timers armed.
    pub fn reconcile_all(&mut self, store: &TaskStore) -> usize {
        self.shutdown();
        let now = self.clock.now();
        let due: Vec<(ListId, TaskId, DateTime<Local>)> = store
            .all_tasks()
            .filter_map(|(list_id, task)| {
                task.armable_instant(now)
                    .map(|fires_at| (list_id, task.id, fires_at))
            })
            .collect();

        for (list_id, task_id, fires_at) in &due {
            self.arm(*list_id, *task_id, *fires_at, now);
        }
        info!(
            "event=timer_rebuild module=scheduler status=ok armed={}",
            due.len()
        );
        due.len()
    }

    /// Routes a store signal to `reconcile` or `disarm_all`.
    pub fn apply(&mut self, store: &TaskStore, signal: &ReconcileSignal) {
        match signal {
            ReconcileSignal::Task { list_id, task_id } => {
                self.reconcile(store, *list_id, *task_id);
            }
            ReconcileSignal::ListRemoved { task_ids, .. } => {
                self.disarm_all(task_ids);
            }
        }
    }

    /// Waits for the next timer delivery.
    ///
    /// Returns `None` immediately when nothing is armed.
    pub async fn next_fired(&mut self) -> Option<TimerFired> {
        if self.timers.is_empty() {
            return None;
        }
        self.fired_rx.recv().await
    }

    /// Returns a delivery that is already waiting, without blocking.
    pub fn try_next_fired(&mut self) -> Option<TimerFired> {
        self.fired_rx.try_recv().ok()
    }

    /// Handles one delivery: re-validates the task, then notifies and disarms.
    pub fn fire(
        &mut self,
        store: &TaskStore,
        sink: &NotificationSink,
        fired: TimerFired,
    ) -> FireOutcome {
        let task_id = fired.task_id;
        let is_current = self
            .timers
            .get(&task_id)
            .is_some_and(|timer| timer.generation == fired.generation);
        if !is_current {
            debug!(
                "event=timer_fire module=scheduler status=stale task_id={} generation={}",
                task_id, fired.generation
            );
            return FireOutcome::Stale { task_id };
        }

        let Some(timer) = self.timers.remove(&task_id) else {
            return FireOutcome::Stale { task_id };
        };
        timer.handle.abort();

        let due_task = store.task(timer.list_id, task_id).filter(|task| {
            !task.is_completed && task.reminder_instant() == Some(timer.fires_at)
        });
        match due_task {
            Some(task) => {
                let shown = sink.show(task);
                info!(
                    "event=timer_fire module=scheduler status=ok task_id={} list_id={}",
                    task_id, timer.list_id
                );
                FireOutcome::Notified { task_id, shown }
            }
            None => {
                debug!(
                    "event=timer_fire module=scheduler status=invalidated task_id={}",
                    task_id
                );
                FireOutcome::Invalidated { task_id }
            }
        }
    }

    /// Disarms every timer.
    pub fn shutdown(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.handle.abort();
        }
    }

    fn disarm(&mut self, task_id: TaskId) -> bool {
        match self.timers.remove(&task_id) {
            Some(timer) => {
                timer.handle.abort();
                debug!(
                    "event=timer_disarm module=scheduler status=ok task_id={} generation={}",
                    task_id, timer.generation
                );
                true
            }
            None => false,
        }
    }

    fn arm(
        &mut self,
        list_id: ListId,
        task_id: TaskId,
        fires_at: DateTime<Local>,
        now: DateTime<Local>,
    ) {
        self.last_generation += 1;
        let generation = self.last_generation;
        let delay = (fires_at - now).to_std().unwrap_or(Duration::ZERO);
        let sender = self.fired_tx.clone();

        let handle = self.runtime.spawn(async move {
            let mut remaining = delay;
            while !remaining.is_zero() {
                let slice = remaining.min(MAX_SLEEP_SLICE);
                tokio::time::sleep(slice).await;
                remaining -= slice;
            }
            // Receiver gone means the scheduler was dropped; nothing to do.
            let _ = sender.send(TimerFired {
                task_id,
                generation,
            });
        });

        debug!(
            "event=timer_arm module=scheduler status=ok task_id={} list_id={} generation={} delay_ms={}",
            task_id,
            list_id,
            generation,
            delay.as_millis()
        );
        self.timers.insert(
            task_id,
            ArmedTimer {
                list_id,
                fires_at,
                generation,
                handle,
            },
        );
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
