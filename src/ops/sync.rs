//! The `sync` command.

use crate::config::Config;
use crate::errors::AppResult;
use crate::remote::EntrySource;
use crate::store::{self, StoreLock};
use crate::sync::{sync_store, SyncOutcome};
use tracing::info;

/// Brings the configured user's store up to date with the remote.
///
/// Creates the user directory on first use and holds the store lock for
/// the whole load-merge-save sequence.
///
/// # Errors
///
/// Returns an error if:
/// - No user is configured
/// - Another process is writing the same store
/// - The remote fetch fails (the store is left as it was)
/// - The store cannot be decoded or written
pub fn sync_entries(config: &Config, source: &dyn EntrySource) -> AppResult<SyncOutcome> {
    let user = config.require_user()?;
    let user_dir = config.user_dir()?;
    store::ensure_dir(&config.work_dir)?;
    store::ensure_dir(&user_dir)?;

    let _lock = StoreLock::acquire(&user_dir)?;
    let path = store::entries_path(&user_dir);

    info!(user = user, "Syncing entries");
    let outcome = sync_store(source, user, &path)?;
    info!("{}", outcome);
    Ok(outcome)
}
