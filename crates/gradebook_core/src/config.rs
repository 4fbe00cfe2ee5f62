//! Runtime configuration.
//!
//! Values resolve in three layers: built-in defaults, then `GRADEBOOK_*`
//! environment variables, then whatever the caller (CLI flags) overrides.

use crate::logging::{default_log_level, parse_log_level, LogTarget};
use crate::service::student_service::EditPolicy;
use std::path::PathBuf;

/// Default record store file name, relative to the working directory.
pub const DEFAULT_DB_FILE_NAME: &str = "gradebook.sqlite3";

/// Level for stderr logging when no level was requested, so interactive
/// sessions only show problems.
pub const STDERR_DEFAULT_LOG_LEVEL: &str = "warn";

pub const ENV_DB_PATH: &str = "GRADEBOOK_DB";
pub const ENV_LOG_LEVEL: &str = "GRADEBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "GRADEBOOK_LOG_DIR";
pub const ENV_REACTIVATE_ON_EDIT: &str = "GRADEBOOK_REACTIVATE_ON_EDIT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Requested level, already validated. `None` picks a per-target default.
    pub log_level: Option<&'static str>,
    /// File logging is disabled when `None`.
    pub log_dir: Option<PathBuf>,
    pub reactivate_on_edit: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: None,
            log_dir: None,
            reactivate_on_edit: EditPolicy::default().reactivate_on_edit,
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with process environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            config
                .set_log_level(&level)
                .map_err(|err| format!("{ENV_LOG_LEVEL}: {err}"))?;
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(flag) = get(ENV_REACTIVATE_ON_EDIT) {
            config.reactivate_on_edit = parse_bool(&flag).ok_or_else(|| {
                format!("{ENV_REACTIVATE_ON_EDIT} must be a boolean, got `{flag}`")
            })?;
        }
        Ok(config)
    }

    /// Validates and records an explicitly requested log level.
    pub fn set_log_level(&mut self, level: &str) -> Result<(), String> {
        self.log_level = Some(parse_log_level(level)?);
        Ok(())
    }

    /// Level and target to hand to `init_logging`.
    ///
    /// A requested level always wins. Otherwise files get the build default
    /// and stderr stays at warnings.
    pub fn logging_plan(&self) -> (&'static str, LogTarget) {
        match &self.log_dir {
            Some(dir) => (
                self.log_level.unwrap_or_else(default_log_level),
                LogTarget::Dir(dir.clone()),
            ),
            None => (
                self.log_level.unwrap_or(STDERR_DEFAULT_LOG_LEVEL),
                LogTarget::Stderr,
            ),
        }
    }

    pub fn edit_policy(&self) -> EditPolicy {
        EditPolicy {
            reactivate_on_edit: self.reactivate_on_edit,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
