//! Snapshot persistence for the task store.
//!
//! # Responsibility
//! - Encode the full list-of-lists snapshot as JSON under one fixed key.
//! - Load it back, seeding a default list when nothing usable is stored.
//!
//! # Invariants
//! - `load` never fails; storage and parse errors degrade to the seed.
//! - `save` rewrites the whole document; failures are logged, never raised.
//! - `load` after `save(lists)` yields `lists` unchanged (order included).

use crate::config::{CoreConfig, DEFAULT_LIST_NAME, DEFAULT_STORAGE_KEY};
use crate::model::task::{ListId, TaskList};
use crate::persist::slot::{KvSlot, StorageResult};
use log::{info, warn};

const SEED_LIST_ID: ListId = 1;

/// Why a seeded default was returned instead of stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedReason {
    /// The slot held no value for the key.
    Missing,
    /// The slot itself failed to read.
    Unreadable,
    /// The stored value was not a valid snapshot.
    Corrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    Stored,
    Seeded(SeedReason),
}

/// Result of `PersistenceAdapter::load_snapshot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSnapshot {
    pub lists: Vec<TaskList>,
    pub origin: SnapshotOrigin,
}

impl LoadedSnapshot {
    /// Whether the lists are the seeded default rather than stored data.
    pub fn is_seeded(&self) -> bool {
        matches!(self.origin, SnapshotOrigin::Seeded(_))
    }
}

/// Reads and writes task-list snapshots through a `KvSlot`.
pub struct PersistenceAdapter<S: KvSlot> {
    slot: S,
    storage_key: String,
    default_list_name: String,
}

impl<S: KvSlot> PersistenceAdapter<S> {
    /// Creates an adapter with the default key and seed list name.
    pub fn new(slot: S) -> Self {
        Self {
            slot,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_list_name: DEFAULT_LIST_NAME.to_string(),
        }
    }

    /// Creates an adapter using the key and seed name from `config`.
    pub fn with_config(slot: S, config: &CoreConfig) -> Self {
        Self {
            slot,
            storage_key: config.storage_key.trim().to_string(),
            default_list_name: config.default_list_name.trim().to_string(),
        }
    }

    /// Key the snapshot is stored under.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Backing slot.
    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Mutable backing slot.
    pub fn slot_mut(&mut self) -> &mut S {
        &mut self.slot
    }

    /// Loads stored lists, or the seeded default.
    pub fn load(&self) -> Vec<TaskList> {
        self.load_snapshot().lists
    }

    /// Loads stored lists and reports where they came from.
    pub fn load_snapshot(&self) -> LoadedSnapshot {
        let raw = match self.slot.read(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(
                    "event=snapshot_load module=persist status=seeded reason=missing key={}",
                    self.storage_key
                );
                return self.seeded(SeedReason::Missing);
            }
            Err(err) => {
                warn!(
                    "event=snapshot_load module=persist status=seeded reason=unreadable key={} error={}",
                    self.storage_key, err
                );
                return self.seeded(SeedReason::Unreadable);
            }
        };

        match decode_lists(&raw) {
            Ok(lists) => {
                info!(
                    "event=snapshot_load module=persist status=ok key={} list_count={}",
                    self.storage_key,
                    lists.len()
                );
                LoadedSnapshot {
                    lists,
                    origin: SnapshotOrigin::Stored,
                }
            }
            Err(err) => {
                warn!(
                    "event=snapshot_load module=persist status=seeded reason=corrupt key={} error={}",
                    self.storage_key, err
                );
                self.seeded(SeedReason::Corrupt)
            }
        }
    }

    /// Best-effort whole-document write. Errors are logged and dropped.
    pub fn save(&mut self, lists: &[TaskList]) {
        if let Err(err) = self.try_save(lists) {
            warn!(
                "event=snapshot_save module=persist status=error key={} error={}",
                self.storage_key, err
            );
        }
    }

    /// Whole-document write that reports failures.
    pub fn try_save(&mut self, lists: &[TaskList]) -> StorageResult<()> {
        let encoded = encode_lists(lists)?;
        self.slot.write(&self.storage_key, &encoded)
    }

    /// The default state used when nothing usable is stored.
    pub fn seed(&self) -> Vec<TaskList> {
        vec![TaskList::new(SEED_LIST_ID, self.default_list_name.clone())]
    }

    fn seeded(&self, reason: SeedReason) -> LoadedSnapshot {
        LoadedSnapshot {
            lists: self.seed(),
            origin: SnapshotOrigin::Seeded(reason),
        }
    }
}

/// Encodes lists in the persisted JSON format.
pub fn encode_lists(lists: &[TaskList]) -> serde_json::Result<String> {
    serde_json::to_string(lists)
}

/// Decodes lists from the persisted JSON format.
pub fn decode_lists(raw: &str) -> serde_json::Result<Vec<TaskList>> {
    serde_json::from_str(raw)
}
