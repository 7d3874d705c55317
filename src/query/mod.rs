//! Entry query/filter engine.
//!
//! A query is a [`QuerySpec`]: optional inclusive date bounds and a
//! [`Pattern`]. [`find`] is a stable filter; it never reorders entries and
//! never modifies its input.

pub mod range;

pub use range::{parse_date_bound, BoundSide, DateRange};

use crate::constants::MATCH_ALL_PATTERN;
use crate::entries::{Entry, EntryCollection};
use crate::errors::{AppResult, PatternError};
use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

/// How entry text is matched.
#[derive(Debug, Clone, Default)]
pub enum Pattern {
    /// Every entry matches, whatever its text.
    #[default]
    MatchAll,
    /// Entries whose message, workout title or felt text matches the regex.
    Regex(Regex),
}

impl Pattern {
    /// Builds a pattern from user input.
    ///
    /// `None`, an empty string and the literal `"*"` all mean [`Pattern::MatchAll`];
    /// anything else is compiled as a regular expression.
    ///
    /// # Errors
    ///
    /// Returns `PatternError` naming the original text if it does not compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use milelog::query::Pattern;
    ///
    /// assert!(matches!(Pattern::parse(Some("*")).unwrap(), Pattern::MatchAll));
    /// assert!(matches!(Pattern::parse(None).unwrap(), Pattern::MatchAll));
    /// assert!(matches!(Pattern::parse(Some("tempo|interval")).unwrap(), Pattern::Regex(_)));
    /// ```
    pub fn parse(raw: Option<&str>) -> Result<Self, PatternError> {
        match raw {
            None => Ok(Pattern::MatchAll),
            Some(p) if p.is_empty() || p == MATCH_ALL_PATTERN => Ok(Pattern::MatchAll),
            Some(p) => Regex::new(p)
                .map(Pattern::Regex)
                .map_err(|source| PatternError {
                    pattern: p.to_string(),
                    source,
                }),
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Pattern::MatchAll => true,
            Pattern::Regex(re) => entry.text_fields().any(|text| re.is_match(text)),
        }
    }
}

/// A single query over a collection.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    /// Inclusive lower bound; no lower bound when `None`.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound; no upper bound when `None`.
    pub end: Option<DateTime<Utc>>,
    pub pattern: Pattern,
}

impl QuerySpec {
    fn has_bounds(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    fn within_bounds(&self, t: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| start <= t) && self.end.map_or(true, |end| t <= end)
    }
}

/// Returns the entries of `collection` selected by `spec`, in their original order.
///
/// The result is a new collection, empty when nothing matches.
///
/// # Errors
///
/// When a date bound is present, an entry whose timestamp cannot be parsed
/// fails the whole query with `StoreError::InvalidTimestamp`.
pub fn find(collection: &EntryCollection, spec: &QuerySpec) -> AppResult<EntryCollection> {
    let check_dates = spec.has_bounds();
    let mut matches = Vec::new();

    for entry in collection {
        if check_dates && !spec.within_bounds(entry.time()?) {
            continue;
        }
        if spec.pattern.matches(entry) {
            matches.push(entry.clone());
        }
    }

    debug!("{} of {} entries matched", matches.len(), collection.len());
    Ok(EntryCollection::from(matches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::Workout;
    use crate::errors::{AppError, StoreError};
    use chrono::TimeZone;

    fn entry(id: i64, created_at: &str, message: &str) -> Entry {
        let mut e = Entry::new(id, created_at);
        e.message = Some(message.to_string());
        e
    }

    fn sample() -> EntryCollection {
        EntryCollection::from(vec![
            entry(5, "2024-03-05T07:00:00Z", "tempo run"),
            entry(4, "2024-03-04T07:00:00Z", "easy swim"),
            entry(3, "2024-03-03T07:00:00Z", "Long Run"),
            entry(2, "2024-03-02T07:00:00Z", "rest day walk"),
            entry(1, "2024-03-01T07:00:00Z", "intervals (track)"),
        ])
    }

    fn ids(collection: &EntryCollection) -> Vec<i64> {
        collection.iter().map(|e| e.id).collect()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_match_all_without_bounds_returns_everything() {
        let c = sample();
        let result = find(&c, &QuerySpec::default()).unwrap();
        assert_eq!(result, c);

        let spec = QuerySpec {
            pattern: Pattern::parse(Some("*")).unwrap(),
            ..QuerySpec::default()
        };
        assert_eq!(find(&c, &spec).unwrap(), c);
    }

    #[test]
    fn test_start_bound_is_inclusive() {
        let spec = QuerySpec {
            start: Some(at(3, 7)),
            ..QuerySpec::default()
        };
        assert_eq!(ids(&find(&sample(), &spec).unwrap()), vec![5, 4, 3]);
    }

    #[test]
    fn test_end_bound_is_inclusive() {
        let spec = QuerySpec {
            end: Some(at(2, 7)),
            ..QuerySpec::default()
        };
        assert_eq!(ids(&find(&sample(), &spec).unwrap()), vec![2, 1]);
    }

    #[test]
    fn test_both_bounds() {
        let spec = QuerySpec {
            start: Some(at(2, 0)),
            end: Some(at(4, 12)),
            ..QuerySpec::default()
        };
        assert_eq!(ids(&find(&sample(), &spec).unwrap()), vec![4, 3, 2]);
    }

    #[test]
    fn test_regex_pattern_keeps_order() {
        let spec = QuerySpec {
            pattern: Pattern::parse(Some("(?i)run")).unwrap(),
            ..QuerySpec::default()
        };
        assert_eq!(ids(&find(&sample(), &spec).unwrap()), vec![5, 3]);
    }

    #[test]
    fn test_pattern_matches_workout_title() {
        let mut e = Entry::new(8, "2024-03-08T07:00:00Z");
        e.workout = Some(Workout {
            title: Some("Parkrun PB".to_string()),
            ..Workout::default()
        });
        let c = EntryCollection::from(vec![e]);
        let spec = QuerySpec {
            pattern: Pattern::parse(Some("PB$")).unwrap(),
            ..QuerySpec::default()
        };
        assert_eq!(find(&c, &spec).unwrap().len(), 1);
    }

    #[test]
    fn test_no_matches_gives_empty_collection() {
        let spec = QuerySpec {
            pattern: Pattern::parse(Some("marathon")).unwrap(),
            ..QuerySpec::default()
        };
        let result = find(&sample(), &spec).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_invalid_pattern_names_original_text() {
        let err = Pattern::parse(Some("intervals (track")).unwrap_err();
        assert_eq!(err.pattern, "intervals (track");
        assert!(err.to_string().contains("intervals (track"));
    }

    #[test]
    fn test_empty_pattern_is_match_all() {
        assert!(matches!(Pattern::parse(Some("")).unwrap(), Pattern::MatchAll));
    }

    #[test]
    fn test_find_does_not_modify_source() {
        let c = sample();
        let before = c.clone();
        let spec = QuerySpec {
            pattern: Pattern::parse(Some("swim")).unwrap(),
            ..QuerySpec::default()
        };
        let _ = find(&c, &spec).unwrap();
        assert_eq!(c, before);
    }

    #[test]
    fn test_bad_timestamp_fails_bounded_query() {
        let c = EntryCollection::from(vec![
            entry(2, "2024-03-02T07:00:00Z", "ok"),
            entry(1, "03/01/2024", "broken"),
        ]);
        let spec = QuerySpec {
            start: Some(at(1, 0)),
            ..QuerySpec::default()
        };
        match find(&c, &spec) {
            Err(AppError::Store(StoreError::InvalidTimestamp { id, .. })) => assert_eq!(id, 1),
            other => panic!("Expected InvalidTimestamp, got {:?}", other),
        }

        // Without bounds the timestamp is never looked at.
        assert_eq!(find(&c, &QuerySpec::default()).unwrap().len(), 2);
    }
}
