//! Reconciles the local store with the remote feed.
//!
//! The path taken depends only on what is on disk: no store, or a store with
//! no entries, means a full sync; anything else is an incremental sync from
//! the head entry's timestamp. Fetching always completes into a separate
//! collection before the existing one is touched, so a failed fetch never
//! reaches the disk.
//!
//! The remote's `since` boundary may be inclusive. Fetched entries whose id
//! is already stored are therefore dropped before merging, which keeps ids
//! unique and makes a repeated sync a no-op.

use crate::entries::EntryCollection;
use crate::errors::AppResult;
use crate::remote::EntrySource;
use crate::store;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// What the store looks like before a sync.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncState {
    /// No store file, or a store file without entries.
    Empty,
    /// A store holding at least one entry.
    Populated(EntryCollection),
}

impl SyncState {
    /// Inspects the store at `path`.
    ///
    /// # Errors
    ///
    /// Propagates decode and I/O errors; a missing file is not an error.
    pub fn detect(path: &Path) -> AppResult<Self> {
        match store::load(path) {
            Ok(collection) => Ok(Self::from(collection)),
            Err(e) if e.is_store_not_found() => Ok(SyncState::Empty),
            Err(e) => Err(e),
        }
    }
}

impl From<EntryCollection> for SyncState {
    fn from(collection: EntryCollection) -> Self {
        if collection.is_empty() {
            SyncState::Empty
        } else {
            SyncState::Populated(collection)
        }
    }
}

/// Result of a sync, as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The store was rebuilt from the full remote history.
    Full { total: usize },
    /// New entries were placed in front of the existing ones.
    Updated { added: usize },
    /// Nothing new; the store was not written.
    UpToDate,
}

impl SyncOutcome {
    /// Whether the store has to be written for this outcome.
    pub fn needs_write(&self) -> bool {
        !matches!(self, SyncOutcome::UpToDate)
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Full { total: 1 } => write!(f, "Synced 1 entry (full sync)."),
            SyncOutcome::Full { total } => write!(f, "Synced {} entries (full sync).", total),
            SyncOutcome::Updated { added: 1 } => write!(f, "Synced 1 new entry."),
            SyncOutcome::Updated { added } => write!(f, "Synced {} new entries.", added),
            SyncOutcome::UpToDate => write!(f, "Already up-to-date."),
        }
    }
}

/// Pages through the user's whole history.
///
/// Pages are requested from 1 upwards until one comes back empty, and are
/// concatenated in the order fetched.
pub fn full_sync(source: &dyn EntrySource, user: &str) -> AppResult<EntryCollection> {
    let mut collection = EntryCollection::new();
    for page in 1.. {
        let batch = source.fetch_page(user, page)?;
        if batch.is_empty() {
            debug!("Page {} is empty, history complete", page);
            break;
        }
        let fetched = batch.len();
        let added = collection.append_unique(batch.entries);
        debug!("Page {}: {} entries, {} new", page, fetched, added);
    }
    Ok(collection)
}

/// Fetches entries newer than the head of `existing` and merges them in.
///
/// Returns the merged collection and the number of entries added.
pub fn incremental_sync(
    source: &dyn EntrySource,
    user: &str,
    mut existing: EntryCollection,
) -> AppResult<(EntryCollection, usize)> {
    let since = match existing.head() {
        Some(head) => head.time()?.timestamp(),
        None => return Ok((existing, 0)),
    };

    debug!("Fetching entries since {}", since);
    let fresh = source.fetch_since(user, since)?;
    let added = existing.prepend_unique(fresh.entries);
    Ok((existing, added))
}

/// Runs the sync that `state` calls for.
///
/// This is pure with respect to the disk; [`sync_store`] does the I/O.
pub fn reconcile(
    state: SyncState,
    source: &dyn EntrySource,
    user: &str,
) -> AppResult<(EntryCollection, SyncOutcome)> {
    match state {
        SyncState::Empty => {
            info!("Performing initial (full) sync");
            let collection = full_sync(source, user)?;
            let total = collection.len();
            Ok((collection, SyncOutcome::Full { total }))
        }
        SyncState::Populated(existing) => {
            let (collection, added) = incremental_sync(source, user, existing)?;
            let outcome = if added == 0 {
                SyncOutcome::UpToDate
            } else {
                SyncOutcome::Updated { added }
            };
            Ok((collection, outcome))
        }
    }
}

/// Synchronizes the store at `path` and persists the result.
///
/// A full sync always writes the store, even when the remote is empty. An
/// incremental sync writes only when something new arrived.
pub fn sync_store(source: &dyn EntrySource, user: &str, path: &Path) -> AppResult<SyncOutcome> {
    let state = SyncState::detect(path)?;
    let (collection, outcome) = reconcile(state, source, user)?;

    if outcome.needs_write() {
        store::save(path, &collection)?;
        info!(entries = collection.len(), "Store written");
    } else {
        debug!("No new entries, store left untouched");
    }
    Ok(outcome)
}
