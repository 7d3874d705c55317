//! Error handling utilities for the milelog application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! Every failure aborts the current operation. Nothing here retries or
//! recovers; errors travel to `main`, which reports them once.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, writing or editing the local entry store.
///
/// # Examples
///
/// ```
/// use milelog::errors::StoreError;
/// use std::path::PathBuf;
///
/// let error = StoreError::NotFound {
///     path: PathBuf::from("/home/me/.milelog/runner/entries.json"),
/// };
/// assert!(format!("{}", error).contains("milelog sync"));
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file does not exist (the user never synced).
    #[error("No entries to search at {path}. Need to run 'milelog sync'?")]
    NotFound {
        /// Path of the missing store file
        path: PathBuf,
    },

    /// The store file exists but holds no entries.
    #[error("No entries to search at {path}. Need to run 'milelog sync'?")]
    Empty {
        /// Path of the empty store file
        path: PathBuf,
    },

    /// The store file exists but could not be decoded.
    #[error("Failed to decode entry store {path}: {source}. The file may have been corrupted or hand-edited incorrectly.")]
    Decode {
        /// Path of the malformed store file
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The store file could not be written.
    #[error("Failed to write entry store {path}: {source}. The store may be incomplete; run 'milelog sync' again once the problem is fixed.")]
    Write {
        /// Path of the store file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// An entry carries a timestamp that is not valid RFC 3339.
    #[error("Entry {id} has an invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        /// Identifier of the offending entry
        id: i64,
        /// The raw timestamp text
        value: String,
        /// The underlying parse error
        #[source]
        source: chrono::ParseError,
    },

    /// No entry matched the requested removal target.
    #[error("Entry not found: {0}")]
    EntryNotFound(String),
}

/// Errors raised by the remote entries API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the connection failed.
    #[error("Request to {url} failed: {source}. Check your network connection.")]
    Request {
        /// The requested URL
        url: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("Request to {url} returned HTTP {status}: {body}")]
    Status {
        /// The requested URL
        url: String,
        /// The HTTP status code
        status: u16,
        /// The response body, possibly empty
        body: String,
    },

    /// The response body was not a valid entries document.
    #[error("Invalid response from {url}: {message}")]
    InvalidResponse {
        /// The requested URL
        url: String,
        /// A description of the problem
        message: String,
    },
}

/// A filter pattern that failed to compile as a regular expression.
///
/// # Examples
///
/// ```
/// use milelog::query::Pattern;
///
/// let error = Pattern::parse(Some("(run")).unwrap_err();
/// assert!(format!("{}", error).contains("(run"));
/// ```
#[derive(Debug, Error)]
#[error("Invalid pattern '{pattern}': {source}. Use \"*\" to match every entry.")]
pub struct PatternError {
    /// The pattern exactly as supplied
    pub pattern: String,
    /// The underlying regex error
    #[source]
    pub source: regex::Error,
}

/// Errors that can occur when locking a user's store for writing.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process holds the store lock.
    #[error("Entry store {path} is being updated by another milelog process. Wait for it to finish and try again.")]
    StoreBusy {
        /// The path of the lock file
        path: PathBuf,
    },

    /// The lock file could not be opened or locked.
    #[error("Failed to acquire lock {path}: {source}. Please check file permissions and ensure the directory is accessible.")]
    AcquisitionFailed {
        /// The path of the lock file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Represents all possible errors that can occur in the milelog application.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use milelog::errors::AppError;
///
/// let error = AppError::Config("No user set".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: No user set");
/// ```
///
/// Converting from an IO error:
/// ```
/// use milelog::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading, validation or persistence.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Date or date range arguments that could not be understood.
    #[error("Invalid date: {0}")]
    Date(String),

    /// Errors from the local entry store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Errors from the remote entries API.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Malformed filter expressions.
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// Errors related to store locking.
    #[error("File locking error: {0}")]
    Lock(#[from] LockError),

    /// Errors while producing output.
    #[error("Render error: {0}")]
    Render(String),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Returns true when the error means the user has no local store yet.
    pub fn is_store_not_found(&self) -> bool {
        matches!(self, AppError::Store(StoreError::NotFound { .. }))
    }
}
