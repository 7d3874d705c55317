//! Configuration management for the milelog application.
//!
//! Settings come from three places, highest precedence first:
//!
//! 1. command-line flags (`-u/--user`), applied by the caller through
//!    [`Config::with_user_override`]
//! 2. environment variables
//! 3. the settings file `<work dir>/config.json`, which only stores the
//!    default user and is written by `milelog user <name>`
//!
//! # Environment Variables
//!
//! - `MILELOG_DIR`: working directory (defaults to ~/.milelog)
//! - `MILELOG_USER`: user to sync and search, overriding the settings file
//! - `MILELOG_API_URL`: base URL of the entries API
//! - `MILELOG_HTTP_TIMEOUT_SECS`: per-request timeout for the API
//! - `HOME`: used for the default working directory

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_WORK_SUBDIR, ENV_VAR_HOME,
    ENV_VAR_MILELOG_API_URL, ENV_VAR_MILELOG_DIR, ENV_VAR_MILELOG_HTTP_TIMEOUT,
    ENV_VAR_MILELOG_USER, SETTINGS_FILE_NAME,
};
use crate::errors::{AppError, AppResult};
use crate::store;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Values persisted in the settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Settings {
    /// Reads the settings file, returning defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file exists but is not valid JSON,
    /// or `AppError::Io` if it cannot be read.
    pub fn load(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                AppError::Config(format!("Invalid settings file {}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the settings file, replacing its content.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to encode settings: {}", e)))?;
        json.push('\n');
        fs::write(path, json)?;
        Ok(())
    }
}

/// Configuration for one milelog invocation.
///
/// Built once in `main` and passed by reference into every operation.
///
/// # Examples
///
/// ```
/// use milelog::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     work_dir: PathBuf::from("/tmp/milelog"),
///     user: Some("runner".to_string()),
///     ..Config::default()
/// };
/// assert_eq!(config.require_user().unwrap(), "runner");
/// assert_eq!(config.user_dir().unwrap(), PathBuf::from("/tmp/milelog/runner"));
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the settings file and one sub-directory per user.
    pub work_dir: PathBuf,
    /// The user whose log is synced and searched.
    pub user: Option<String>,
    /// Base URL of the entries API.
    pub api_url: String,
    /// Upper bound for each API request.
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            work_dir: PathBuf::from(""),
            user: None,
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Loads configuration from the environment and the settings file.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - the working directory path cannot be expanded or is empty
    /// - the timeout is not a positive whole number of seconds
    /// - the settings file is malformed
    pub fn load() -> AppResult<Self> {
        let work_dir_raw = env::var(ENV_VAR_MILELOG_DIR).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_WORK_SUBDIR)
        });

        let expanded = shellexpand::full(&work_dir_raw)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        let work_dir = PathBuf::from(expanded.into_owned());
        if work_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Working directory path is empty".to_string()));
        }

        let api_url = env::var(ENV_VAR_MILELOG_API_URL)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let http_timeout = match env::var(ENV_VAR_MILELOG_HTTP_TIMEOUT) {
            Ok(raw) => Duration::from_secs(parse_timeout(&raw)?),
            Err(_) => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let settings = Settings::load(&work_dir.join(SETTINGS_FILE_NAME))?;
        let user = env::var(ENV_VAR_MILELOG_USER)
            .ok()
            .filter(|u| !u.trim().is_empty())
            .or(settings.user);

        debug!("Working directory: {}", work_dir.display());
        Ok(Config {
            work_dir,
            user,
            api_url,
            http_timeout,
        })
    }

    /// Replaces the user when `user` is given (the `-u` flag).
    pub fn with_user_override(mut self, user: Option<String>) -> Self {
        if let Some(user) = user {
            self.user = Some(user);
        }
        self
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the working directory is empty or
    /// relative, the API URL is not http(s), or the user name is invalid.
    pub fn validate(&self) -> AppResult<()> {
        if self.work_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Working directory path is empty".to_string()));
        }

        if !self.work_dir.is_absolute() {
            return Err(AppError::Config(
                "Working directory must be an absolute path".to_string(),
            ));
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "API URL must start with http:// or https://: {}",
                self.api_url
            )));
        }

        if let Some(user) = &self.user {
            validate_user_name(user)?;
        }
        Ok(())
    }

    /// Returns the configured user or explains how to set one.
    pub fn require_user(&self) -> AppResult<&str> {
        self.user.as_deref().ok_or_else(|| {
            AppError::Config(
                "No user set. Either use the 'milelog user <user name>' command or the '-u <user name>' argument.".to_string(),
            )
        })
    }

    /// The directory holding the configured user's store.
    pub fn user_dir(&self) -> AppResult<PathBuf> {
        let user = self.require_user()?;
        validate_user_name(user)?;
        Ok(store::user_dir(&self.work_dir, user))
    }

    /// Path of the configured user's store file.
    pub fn entries_path(&self) -> AppResult<PathBuf> {
        Ok(store::entries_path(&self.user_dir()?))
    }

    pub fn settings_path(&self) -> PathBuf {
        self.work_dir.join(SETTINGS_FILE_NAME)
    }
}

/// Validates a user name before it becomes part of a path.
///
/// Rejects empty names, `.` and `..`, and names containing path separators
/// or whitespace.
pub fn validate_user_name(user: &str) -> AppResult<&str> {
    if user.is_empty() {
        return Err(AppError::Config("User name cannot be empty".to_string()));
    }

    if user == "." || user == ".." {
        return Err(AppError::Config(format!("Invalid user name: '{}'", user)));
    }

    if let Some(ch) = user
        .chars()
        .find(|c| *c == '/' || *c == '\\' || c.is_whitespace() || c.is_control())
    {
        return Err(AppError::Config(format!(
            "User name cannot contain '{}': '{}'",
            ch.escape_default(),
            user
        )));
    }

    Ok(user)
}

fn parse_timeout(raw: &str) -> AppResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(AppError::Config(format!(
            "{} must be a positive number of seconds, got '{}'",
            ENV_VAR_MILELOG_HTTP_TIMEOUT, raw
        ))),
    }
}
