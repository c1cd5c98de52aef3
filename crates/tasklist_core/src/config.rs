//! Core configuration.
//!
//! # Responsibility
//! - Collect the few knobs the core needs: storage key, seed list name and
//!   logging setup.
//! - Validate them once, at session start.
//!
//! # Invariants
//! - Defaults keep the persisted format compatible with existing data
//!   (`taskLists` key, `My Tasks` seed list).

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Key the task-list snapshot is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "taskLists";
/// Name of the list seeded when no usable snapshot exists.
pub const DEFAULT_LIST_NAME: &str = "My Tasks";

/// Settings consumed by `TaskSession` and `PersistenceAdapter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub storage_key: String,
    pub default_list_name: String,
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` leaves logging to
    /// the embedding application.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_list_name: DEFAULT_LIST_NAME.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Checks every field and returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::BlankStorageKey);
        }
        if self.default_list_name.trim().is_empty() {
            return Err(ConfigError::BlankDefaultListName);
        }
        normalize_level(&self.log_level).map_err(ConfigError::InvalidLogLevel)?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    BlankStorageKey,
    BlankDefaultListName,
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankStorageKey => write!(f, "storage_key must not be blank"),
            Self::BlankDefaultListName => write!(f, "default_list_name must not be blank"),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::RelativeLogDir(dir) => {
                write!(f, "log_dir must be absolute, got `{}`", dir.display())
            }
        }
    }
}

impl Error for ConfigError {}
