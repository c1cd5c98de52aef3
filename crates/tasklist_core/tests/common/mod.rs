#![allow(dead_code)]

use chrono::{DateTime, Local};
use std::cell::Cell;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tasklist_core::{
    KvSlot, ManualClock, MemorySlot, Notification, NotificationError, NotificationPlatform, NotificationSink,
    Permission, Reminder, StorageError, StorageResult,
};

/// Local instant for a `YYYY-MM-DD` / `HH:MM` pair.
pub fn local(date: &str, time: &str) -> DateTime<Local> {
    Reminder::new(date, time)
        .and_then(|reminder| reminder.instant())
        .expect("test instant should resolve")
}

pub fn reminder(date: &str, time: &str) -> Option<Reminder> {
    Some(Reminder::new(date, time).expect("complete reminder"))
}

/// Clock frozen at 2026-10-16 09:00 local time.
pub fn frozen_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(local("2026-10-16", "09:00")))
}

/// Notification platform that records every call.
#[derive(Clone)]
pub struct RecordingPlatform {
    permission: Permission,
    answer: Permission,
    fail_display: bool,
    requests: Arc<AtomicUsize>,
    shown: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingPlatform {
    pub fn with_permission(permission: Permission) -> Self {
        Self {
            permission,
            answer: permission,
            fail_display: false,
            requests: Arc::new(AtomicUsize::new(0)),
            shown: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn granted() -> Self {
        Self::with_permission(Permission::Granted)
    }

    /// Starts undecided and answers `answer` when prompted.
    pub fn undecided(answer: Permission) -> Self {
        Self {
            answer,
            ..Self::with_permission(Permission::Default)
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_display: true,
            ..Self::granted()
        }
    }

    pub fn sink(&self) -> NotificationSink {
        NotificationSink::new(Box::new(self.clone()))
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl NotificationPlatform for RecordingPlatform {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&self) -> Permission {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.answer
    }

    fn display(&self, notification: &Notification) -> Result<(), NotificationError> {
        if self.fail_display {
            return Err(NotificationError::Platform("display refused".to_string()));
        }
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Slot whose every operation fails.
pub struct BrokenSlot;

impl KvSlot for BrokenSlot {
    fn read(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "slot unavailable",
        )))
    }

    fn write(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "slot unavailable",
        )))
    }
}

/// Memory slot whose first `failures` reads fail.
pub struct FlakySlot {
    inner: MemorySlot,
    failures: Cell<usize>,
}

impl FlakySlot {
    pub fn new(inner: MemorySlot, failures: usize) -> Self {
        Self {
            inner,
            failures: Cell::new(failures),
        }
    }

    pub fn inner(&self) -> &MemorySlot {
        &self.inner
    }
}

impl KvSlot for FlakySlot {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let remaining = self.failures.get();
        if remaining > 0 {
            self.failures.set(remaining - 1);
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::Interrupted,
                "transient read failure",
            )));
        }
        self.inner.read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.inner.write(key, value)
    }
}
