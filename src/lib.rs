/*!
# milelog

milelog mirrors a user's dailymile training log into a local JSON store and
searches it offline.

## Core Features

- Full sync on first use, incremental sync afterwards (only entries newer
  than the newest stored one are fetched)
- Date range and regex filtering over the local store
- Removal of single entries from the local store
- A saved default user

## Architecture

- `cli`: command-line parsing using clap
- `config`: environment, settings file and validation
- `entries`: the entry model and ordered collection
- `store`: JSON store files and the per-user lock
- `remote`: the entries API client
- `sync`: full and incremental reconciliation
- `query`: date bounds, range phrases and pattern filtering
- `render`: TSV and JSON output
- `ops`: one function per command
- `errors`: error types

## Usage Example

```rust,no_run
use milelog::ops::{self, FindOptions};
use milelog::remote::HttpEntrySource;
use milelog::Config;

fn main() -> milelog::AppResult<()> {
    let config = Config::load()?;
    config.validate()?;

    let source = HttpEntrySource::new(config.api_url.clone(), config.http_timeout)?;
    println!("{}", ops::sync_entries(&config, &source)?);

    let options = FindOptions {
        range: Some("last week".to_string()),
        ..FindOptions::default()
    };
    let today = chrono::Local::now().date_naive();
    let found = ops::find_entries(&config, &options, today)?;
    println!("{} entries last week", found.len());
    Ok(())
}
```
*/

/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// Entry model and ordered collections
pub mod entries;
/// Error types and utilities for error handling
pub mod errors;
/// Per-command operations
pub mod ops;
/// Filtering entries by date and pattern
pub mod query;
/// Remote entries API
pub mod remote;
/// Output formats
pub mod render;
/// Local entry store
pub mod store;
/// Reconciling the local store with the remote log
pub mod sync;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use entries::{Entry, EntryCollection, RemoveTarget};
pub use errors::{AppError, AppResult};
pub use query::{Pattern, QuerySpec};
pub use sync::SyncOutcome;
