//! The `find` command.

use crate::config::Config;
use crate::entries::EntryCollection;
use crate::errors::AppResult;
use crate::query::{self, parse_date_bound, BoundSide, DateRange, Pattern, QuerySpec};
use crate::store;
use chrono::NaiveDate;
use tracing::debug;

/// Options of one `find` invocation, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Relative range phrase such as "last week".
    pub range: Option<String>,
    /// Start date; overrides the start of `range`.
    pub start: Option<String>,
    /// End date; overrides the end of `range`.
    pub end: Option<String>,
    /// Regex, or "*" for everything.
    pub pattern: Option<String>,
}

impl FindOptions {
    /// Resolves the options into a query, with `today` anchoring any range phrase.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Date` for unreadable dates or phrases and
    /// `AppError::Pattern` for a pattern that does not compile.
    pub fn to_query(&self, today: NaiveDate) -> AppResult<QuerySpec> {
        let (mut start, mut end) = match self.range.as_deref() {
            Some(phrase) => {
                let (start, end) = DateRange::parse(phrase, today)?.bounds();
                (Some(start), Some(end))
            }
            None => (None, None),
        };

        if let Some(text) = self.start.as_deref() {
            start = Some(parse_date_bound(text, BoundSide::Start)?);
        }
        if let Some(text) = self.end.as_deref() {
            end = Some(parse_date_bound(text, BoundSide::End)?);
        }

        let pattern = Pattern::parse(self.pattern.as_deref())?;
        Ok(QuerySpec {
            start,
            end,
            pattern,
        })
    }
}

/// Searches the configured user's store.
///
/// The query is built before the store is read, so bad arguments fail
/// without touching the disk.
///
/// # Errors
///
/// Returns an error if the arguments are invalid, the store is missing,
/// empty or malformed, or an entry's timestamp cannot be read while a date
/// bound is in effect.
pub fn find_entries(
    config: &Config,
    options: &FindOptions,
    today: NaiveDate,
) -> AppResult<EntryCollection> {
    let spec = options.to_query(today)?;
    debug!("Query: {:?}", spec);

    let path = config.entries_path()?;
    let entries = store::load_populated(&path)?;
    query::find(&entries, &spec)
}
