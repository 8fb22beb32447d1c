//! Runtime configuration for embedding binaries.
//!
//! # Responsibility
//! - Resolve database location and logging settings from the environment.
//!
//! # Invariants
//! - Resolution never panics; malformed values are reported as errors.
//! - Absent `TODO_CORE_DB_PATH` selects an in-memory database.

use crate::logging::{default_log_level, normalize_level};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TODO_CORE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TODO_CORE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TODO_CORE_LOG_DIR";

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file; `None` means in-memory.
    pub db_path: Option<PathBuf>,
    /// Normalized level (`trace|debug|info|warn|error`).
    pub log_level: &'static str,
    /// Directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, so callers and tests can supply
    /// values without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let log_level = match read(ENV_LOG_LEVEL) {
            Some(level) => {
                normalize_level(&level).map_err(|err| format!("{ENV_LOG_LEVEL}: {err}"))?
            }
            None => default_log_level(),
        };

        let log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        if let Some(dir) = log_dir.as_ref() {
            if !dir.is_absolute() {
                return Err(format!(
                    "{ENV_LOG_DIR} must be an absolute path, got `{}`",
                    dir.display()
                ));
            }
        }

        Ok(Self {
            db_path: read(ENV_DB_PATH).map(PathBuf::from),
            log_level,
            log_dir,
        })
    }
}
