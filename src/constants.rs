//! Constants used throughout the application.
//!
//! This module contains all constants used in the milelog application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "milelog";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "Mirror your dailymile training log locally and search it offline";

// Logging
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "milelog";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";

// Configuration Keys & Environment Variables
/// Environment variable for the working directory holding settings and stores.
pub const ENV_VAR_MILELOG_DIR: &str = "MILELOG_DIR";
/// Environment variable overriding the default user.
pub const ENV_VAR_MILELOG_USER: &str = "MILELOG_USER";
/// Environment variable overriding the remote API base URL.
pub const ENV_VAR_MILELOG_API_URL: &str = "MILELOG_API_URL";
/// Environment variable for the HTTP timeout in seconds.
pub const ENV_VAR_MILELOG_HTTP_TIMEOUT: &str = "MILELOG_HTTP_TIMEOUT_SECS";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default working directory, relative to the home directory.
pub const DEFAULT_WORK_SUBDIR: &str = ".milelog";
/// Default base URL of the entries API.
pub const DEFAULT_API_URL: &str = "https://api.dailymile.com";
/// Default HTTP timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// File System Layout
/// Settings file name inside the working directory.
pub const SETTINGS_FILE_NAME: &str = "config.json";
/// Store file name inside a user's directory.
pub const ENTRIES_FILE_NAME: &str = "entries.json";
/// Advisory lock file name inside a user's directory.
pub const LOCK_FILE_NAME: &str = "entries.lock";
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Default POSIX permissions for newly created files (owner read/write).
#[cfg(unix)]
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;

// Queries
/// The literal pattern that matches every entry.
pub const MATCH_ALL_PATTERN: &str = "*";
/// Keyword selecting the most recent entry for removal.
pub const REMOVE_LAST_KEYWORD: &str = "last";

// Date/Time Logic
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";
/// Date format string for compact date format (YYYYMMDD).
pub const DATE_FORMAT_COMPACT: &str = "%Y%m%d";
/// Date format string for short slashed dates (yy/m/d).
pub const DATE_FORMAT_SHORT: &str = "%y/%m/%d";
/// Date format used in rendered output.
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
