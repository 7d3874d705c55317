//! High-level operations behind each command.
//!
//! Every operation receives the invocation's [`Config`](crate::Config) and
//! its own options explicitly; nothing is shared between commands.

pub mod find;
pub mod remove;
pub mod sync;
pub mod user;

pub use find::{find_entries, FindOptions};
pub use remove::remove_entry;
pub use sync::sync_entries;
pub use user::{set_default_user, show_user};
