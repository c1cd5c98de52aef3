//! Notification permission cache and display wrapper.
//!
//! # Responsibility
//! - Ask the platform for notification permission at most once.
//! - Turn a due task into a titled, tagged notification.
//!
//! # Invariants
//! - Nothing is displayed unless the cached permission is `Granted`.
//! - Suppressed or failed notifications are never queued or retried.
//! - `show` never returns an error to its caller.

use crate::model::task::{Task, TaskId};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Title used for every reminder notification.
pub const NOTIFICATION_TITLE: &str = "Task Reminder";

/// Platform notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Granted,
    Denied,
    /// The user has not decided yet.
    Default,
}

impl Permission {
    /// Stable lowercase name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Default => "default",
        }
    }
}

/// Notification payload handed to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Same-tag notifications replace each other instead of stacking.
    pub tag: String,
    pub require_interaction: bool,
}

impl Notification {
    /// Builds the reminder notification for `task`.
    pub fn for_task(task: &Task) -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            body: task.text.clone(),
            tag: task_tag(task.id),
            require_interaction: true,
        }
    }
}

/// Coalescing tag for a task's notifications.
pub fn task_tag(task_id: TaskId) -> String {
    format!("task-{task_id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    Platform(String),
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Platform(message) => write!(f, "notification platform error: {message}"),
        }
    }
}

impl Error for NotificationError {}

/// Host notification capability.
pub trait NotificationPlatform {
    /// Current permission without prompting.
    fn permission(&self) -> Permission;
    /// Prompts the user (where supported) and returns the decision.
    fn request_permission(&self) -> Permission;
    fn display(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Headless platform that writes notifications to the log.
#[derive(Debug, Clone, Copy)]
pub struct LogNotificationPlatform {
    permission: Permission,
}

impl LogNotificationPlatform {
    /// Creates a platform that always reports `permission`.
    pub fn new(permission: Permission) -> Self {
        Self { permission }
    }
}

impl Default for LogNotificationPlatform {
    fn default() -> Self {
        Self::new(Permission::Granted)
    }
}

impl NotificationPlatform for LogNotificationPlatform {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&self) -> Permission {
        self.permission
    }

    fn display(&self, notification: &Notification) -> Result<(), NotificationError> {
        info!(
            "event=notification_display module=notify status=ok tag={} title={}",
            notification.tag, notification.title
        );
        Ok(())
    }
}

/// What `NotificationSink::show` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    Displayed,
    /// Not shown because permission is not granted.
    Suppressed(Permission),
    /// The platform rejected the notification.
    Failed,
}

/// Permission-aware front for a `NotificationPlatform`.
pub struct NotificationSink {
    platform: Box<dyn NotificationPlatform>,
    permission: Permission,
    requested: bool,
}

impl NotificationSink {
    /// Wraps `platform`, caching its current permission without prompting.
    pub fn new(platform: Box<dyn NotificationPlatform>) -> Self {
        let permission = platform.permission();
        Self {
            platform,
            permission,
            requested: false,
        }
    }

    /// Cached permission decision.
    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Prompts once while the decision is still `Default`.
    ///
    /// Later calls return the cached value without touching the platform.
    pub fn request_permission(&mut self) -> Permission {
        if self.requested || self.permission != Permission::Default {
            return self.permission;
        }
        self.requested = true;
        self.permission = self.platform.request_permission();
        info!(
            "event=notification_permission module=notify status=ok permission={}",
            self.permission.as_str()
        );
        self.permission
    }

    /// Displays a reminder for `task` if permitted.
    pub fn show(&self, task: &Task) -> ShowOutcome {
        if self.permission != Permission::Granted {
            debug!(
                "event=notification_show module=notify status=suppressed task_id={} permission={}",
                task.id,
                self.permission.as_str()
            );
            return ShowOutcome::Suppressed(self.permission);
        }

        match self.platform.display(&Notification::for_task(task)) {
            Ok(()) => {
                debug!(
                    "event=notification_show module=notify status=ok task_id={}",
                    task.id
                );
                ShowOutcome::Displayed
            }
            Err(err) => {
                warn!(
                    "event=notification_show module=notify status=error task_id={} error={}",
                    task.id, err
                );
                ShowOutcome::Failed
            }
        }
    }
}
