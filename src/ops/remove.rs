//! The `rm` command.
//!
//! Removal only edits the local store. The remote copy is never touched, so
//! a removed entry comes back on the next full sync.

use crate::config::Config;
use crate::entries::{Entry, RemoveTarget};
use crate::errors::{AppResult, StoreError};
use crate::store::{self, StoreLock};
use tracing::info;

/// Removes one entry from the configured user's store and saves it.
///
/// # Errors
///
/// Returns an error if the store is missing or empty, if no entry matches
/// `target` (the store is left unmodified), or if the store cannot be written.
pub fn remove_entry(config: &Config, target: RemoveTarget) -> AppResult<Entry> {
    let user_dir = config.user_dir()?;
    let path = store::entries_path(&user_dir);
    if !path.is_file() {
        return Err(StoreError::NotFound { path }.into());
    }

    let _lock = StoreLock::acquire(&user_dir)?;
    let mut entries = store::load_populated(&path)?;
    let removed = entries.remove(target)?;
    store::save(&path, &entries)?;

    info!(id = removed.id, "Entry removed");
    Ok(removed)
}
