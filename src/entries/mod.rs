//! Entry model shared by the store, the reconciler and the query engine.
//!
//! An [`EntryCollection`] is kept newest first. It is the unit written to and
//! read from the store, and the unit returned by the remote API. Fields the
//! remote sends that are not modelled here are kept in [`Entry::extra`] so
//! nothing is lost on a load/save cycle.

use crate::constants::REMOVE_LAST_KEYWORD;
use crate::errors::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Distance covered in a workout, with the unit the user logged it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    pub units: String,
}

/// Workout details attached to an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub felt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Distance>,
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One logged activity.
///
/// # Examples
///
/// ```
/// use milelog::entries::Entry;
///
/// let entry: Entry = serde_json::from_str(
///     r#"{"id": 7, "created_at": "2013-02-10T14:44:12Z", "message": "easy 5k"}"#,
/// ).unwrap();
/// assert_eq!(entry.time().unwrap().timestamp(), 1360507452);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Identifier assigned by the remote service.
    pub id: i64,
    /// RFC 3339 creation time, as sent by the remote.
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout: Option<Workout>,
    /// Fields not modelled above, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    /// Creates an entry with only the required fields set.
    pub fn new(id: i64, created_at: impl Into<String>) -> Self {
        Self {
            id,
            created_at: created_at.into(),
            url: None,
            message: None,
            workout: None,
            extra: Map::new(),
        }
    }

    /// Parses `created_at` into an absolute instant.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidTimestamp` if the text is not RFC 3339.
    pub fn time(&self) -> Result<DateTime<Utc>, StoreError> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|source| StoreError::InvalidTimestamp {
                id: self.id,
                value: self.created_at.clone(),
                source,
            })
    }

    /// The free-text fields a pattern is matched against.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        let workout = self.workout.as_ref();
        self.message
            .as_deref()
            .into_iter()
            .chain(workout.and_then(|w| w.title.as_deref()))
            .chain(workout.and_then(|w| w.felt.as_deref()))
    }
}

/// Selects the entry a removal applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveTarget {
    /// The most recent entry (the head of the collection).
    Last,
    /// The entry with this identifier.
    Id(i64),
}

impl FromStr for RemoveTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == REMOVE_LAST_KEYWORD {
            return Ok(RemoveTarget::Last);
        }
        s.parse::<i64>().map(RemoveTarget::Id).map_err(|_| {
            format!(
                "'{}' is neither an entry id nor '{}'",
                s, REMOVE_LAST_KEYWORD
            )
        })
    }
}

impl fmt::Display for RemoveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoveTarget::Last => write!(f, "{}", REMOVE_LAST_KEYWORD),
            RemoveTarget::Id(id) => write!(f, "id {}", id),
        }
    }
}

/// An ordered sequence of entries, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryCollection {
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl From<Vec<Entry>> for EntryCollection {
    fn from(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}

impl EntryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// The most recent entry.
    pub fn head(&self) -> Option<&Entry> {
        self.entries.first()
    }

    pub fn contains_id(&self, id: i64) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Appends `batch` at the tail, skipping ids already present.
    ///
    /// Returns the number of entries actually added.
    pub fn append_unique(&mut self, batch: Vec<Entry>) -> usize {
        let mut seen: HashSet<i64> = self.entries.iter().map(|e| e.id).collect();
        let before = self.entries.len();
        self.entries
            .extend(batch.into_iter().filter(|e| seen.insert(e.id)));
        self.entries.len() - before
    }

    /// Places `batch` in front of the current entries, keeping the batch's
    /// own order and skipping ids already present.
    ///
    /// Returns the number of entries actually added.
    pub fn prepend_unique(&mut self, batch: Vec<Entry>) -> usize {
        let mut seen: HashSet<i64> = self.entries.iter().map(|e| e.id).collect();
        let mut merged: Vec<Entry> = batch.into_iter().filter(|e| seen.insert(e.id)).collect();
        let added = merged.len();
        if added > 0 {
            merged.append(&mut self.entries);
            self.entries = merged;
        }
        added
    }

    /// Removes and returns the entry selected by `target`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::EntryNotFound` when nothing matches; the
    /// collection is left untouched in that case.
    pub fn remove(&mut self, target: RemoveTarget) -> Result<Entry, StoreError> {
        let index = match target {
            RemoveTarget::Last => (!self.entries.is_empty()).then_some(0),
            RemoveTarget::Id(id) => self.entries.iter().position(|e| e.id == id),
        };
        index
            .map(|i| self.entries.remove(i))
            .ok_or_else(|| StoreError::EntryNotFound(target.to_string()))
    }
}

impl<'a> IntoIterator for &'a EntryCollection {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
