//! File-backed entry store.
//!
//! Each user owns one directory under the working directory:
//!
//! ```text
//! <work_dir>/
//! ├─ config.json          # settings (default user)
//! └─ <user>/
//!    ├─ entries.json      # the serialized EntryCollection, newest first
//!    └─ entries.lock      # advisory lock held while the store is rewritten
//! ```
//!
//! The store is pretty-printed JSON so it stays diffable and hand-editable.
//! Every save rewrites the whole file. That makes a save all-or-nothing from
//! the application's point of view, but a crash or a full disk in the middle
//! of the write can still leave a truncated file behind.

use crate::constants::{ENTRIES_FILE_NAME, LOCK_FILE_NAME};
use crate::entries::EntryCollection;
use crate::errors::{AppError, AppResult, LockError, StoreError};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Returns the directory holding `user`'s store.
pub fn user_dir(work_dir: &Path, user: &str) -> PathBuf {
    work_dir.join(user)
}

/// Returns the store file path inside a user directory.
pub fn entries_path(user_dir: &Path) -> PathBuf {
    user_dir.join(ENTRIES_FILE_NAME)
}

/// Ensures a directory exists, creating it (and its parents) if necessary.
///
/// New directories get 0o700 permissions on unix.
///
/// # Errors
///
/// Returns `AppError::Io` if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> AppResult<()> {
    if dir.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| {
        AppError::Io(io::Error::new(
            e.kind(),
            format!("Failed to create directory {}: {}", dir.display(), e),
        ))
    })?;

    #[cfg(unix)]
    {
        let permissions =
            fs::Permissions::from_mode(crate::constants::DEFAULT_DIR_PERMISSIONS);
        fs::set_permissions(dir, permissions)?;
        debug!("Set 0o700 permissions on {}", dir.display());
    }
    Ok(())
}

/// Loads the entry collection stored at `path`.
///
/// A file that exists but holds only whitespace loads as an empty collection.
///
/// # Errors
///
/// - `StoreError::NotFound` if the file does not exist
/// - `StoreError::Decode` if the content is not a valid entries document
/// - `AppError::Io` for any other read failure
pub fn load(path: &Path) -> AppResult<EntryCollection> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    if content.trim().is_empty() {
        warn!("Store file {} is empty", path.display());
        return Ok(EntryCollection::new());
    }

    let collection: EntryCollection =
        serde_json::from_str(&content).map_err(|source| StoreError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Loaded {} entries from {}", collection.len(), path.display());
    Ok(collection)
}

/// Loads a store that must hold at least one entry.
///
/// # Errors
///
/// As [`load`], plus `StoreError::Empty` when the store has no entries.
pub fn load_populated(path: &Path) -> AppResult<EntryCollection> {
    let collection = load(path)?;
    if collection.is_empty() {
        return Err(StoreError::Empty {
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(collection)
}

/// Writes `collection` to `path`, replacing any previous content.
///
/// # Errors
///
/// Returns `StoreError::Write` if the file cannot be opened or written.
pub fn save(path: &Path, collection: &EntryCollection) -> AppResult<()> {
    let write_error = |source: io::Error| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut json = serde_json::to_string_pretty(collection)
        .map_err(|e| write_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;
    json.push('\n');

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(crate::constants::DEFAULT_FILE_PERMISSIONS);

    let mut file = options.open(path).map_err(write_error)?;
    file.write_all(json.as_bytes()).map_err(write_error)?;
    file.sync_all().map_err(write_error)?;

    debug!("Saved {} entries to {}", collection.len(), path.display());
    Ok(())
}

/// Exclusive advisory lock on a user's store.
///
/// The lock is released when the guard is dropped.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
    file: File,
}

impl StoreLock {
    /// Takes the lock for the store in `user_dir` without waiting.
    ///
    /// # Errors
    ///
    /// - `LockError::StoreBusy` if another process holds the lock
    /// - `LockError::AcquisitionFailed` if the lock file cannot be opened
    pub fn acquire(user_dir: &Path) -> AppResult<Self> {
        let path = user_dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::AcquisitionFailed {
                path: path.clone(),
                source,
            })?;

        if file.try_lock_exclusive().is_err() {
            return Err(LockError::StoreBusy { path }.into());
        }

        debug!("Acquired store lock {}", path.display());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            warn!("Failed to release store lock {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::{Distance, Entry, Workout};
    use tempfile::tempdir;

    fn sample() -> EntryCollection {
        let mut newest = Entry::new(30, "2024-03-02T06:45:00Z");
        newest.message = Some("long run by the river".to_string());
        newest.workout = Some(Workout {
            activity_type: Some("Running".to_string()),
            distance: Some(Distance {
                value: 12.5,
                units: "kilometers".to_string(),
            }),
            duration: Some(3900.0),
            ..Workout::default()
        });
        EntryCollection::from(vec![
            newest,
            Entry::new(20, "2024-03-01T18:00:00Z"),
            Entry::new(10, "2024-02-28T07:10:00Z"),
        ])
    }

    #[test]
    fn test_save_then_load_reproduces_collection() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let path = temp_dir.path().join("entries.json");

        let collection = sample();
        save(&path, &collection).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, collection);
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let path = temp_dir.path().join("entries.json");

        let err = load(&path).unwrap_err();
        assert!(err.is_store_not_found());
    }

    #[test]
    fn test_load_malformed_file_is_decode_error() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let path = temp_dir.path().join("entries.json");
        fs::write(&path, "{\"entries\": [ {\"id\": ").unwrap();

        match load(&path) {
            Err(AppError::Store(StoreError::Decode { path: p, .. })) => assert_eq!(p, path),
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_blank_file_is_empty_collection() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let path = temp_dir.path().join("entries.json");
        fs::write(&path, "\n").unwrap();

        assert!(load(&path).unwrap().is_empty());
        assert!(matches!(
            load_populated(&path),
            Err(AppError::Store(StoreError::Empty { .. }))
        ));
    }

    #[test]
    fn test_load_accepts_hand_written_entries() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let path = temp_dir.path().join("entries.json");
        fs::write(
            &path,
            r#"{"entries": [{"created_at": "2024-01-01T10:00:00Z", "id": 1, "message": "added by hand"}]}"#,
        )
        .unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.entries[0].message.as_deref(), Some("added by hand"));
    }

    #[test]
    fn test_save_rewrites_whole_file() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let path = temp_dir.path().join("entries.json");

        save(&path, &sample()).unwrap();
        let smaller = EntryCollection::from(vec![Entry::new(1, "2024-01-01T00:00:00Z")]);
        save(&path, &smaller).unwrap();

        assert_eq!(load(&path).unwrap(), smaller);
    }

    #[test]
    fn test_save_into_missing_directory_is_write_error() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let path = temp_dir.path().join("nope").join("entries.json");

        assert!(matches!(
            save(&path, &sample()),
            Err(AppError::Store(StoreError::Write { .. }))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_sets_owner_only_permissions() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let path = temp_dir.path().join("entries.json");
        save(&path, &sample()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let dir = user_dir(&temp_dir.path().join("work"), "runner");

        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(entries_path(&dir), dir.join("entries.json"));

        #[cfg(unix)]
        {
            let mode = fs::metadata(&dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }

    #[test]
    fn test_store_lock_is_exclusive() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");

        let held = StoreLock::acquire(temp_dir.path()).unwrap();
        match StoreLock::acquire(temp_dir.path()) {
            Err(AppError::Lock(LockError::StoreBusy { path })) => {
                assert_eq!(path, held.path());
            }
            other => panic!("Expected StoreBusy, got {:?}", other),
        }

        drop(held);
        assert!(StoreLock::acquire(temp_dir.path()).is_ok());
    }
}
