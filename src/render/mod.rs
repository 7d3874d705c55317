//! Output formats for query results.

use crate::constants::OUTPUT_DATE_FORMAT;
use crate::entries::{Entry, EntryCollection};
use crate::errors::{AppError, AppResult};
use chrono::Local;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// How `find` results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Tab-separated table with a header row.
    #[default]
    Tsv,
    /// The `{"entries": [...]}` document, as stored.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}' (use tsv or json)", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tsv => write!(f, "tsv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

const TSV_HEADER: &str = "id\tdate\tactivity\tdistance\tunits\tduration\tmessage";

/// Writes `entries` to `out` in `format`.
///
/// # Errors
///
/// Returns `AppError::Render` if serialization or writing fails.
pub fn write_entries<W: Write>(
    out: &mut W,
    entries: &EntryCollection,
    format: OutputFormat,
) -> AppResult<()> {
    let result = match format {
        OutputFormat::Json => serde_json::to_writer(&mut *out, entries)
            .map_err(|e| e.to_string())
            .and_then(|_| writeln!(out).map_err(|e| e.to_string())),
        OutputFormat::Tsv => write_tsv(out, entries).map_err(|e| e.to_string()),
    };
    result.map_err(AppError::Render)
}

fn write_tsv<W: Write>(out: &mut W, entries: &EntryCollection) -> std::io::Result<()> {
    writeln!(out, "{}", TSV_HEADER)?;
    for entry in entries {
        writeln!(out, "{}", tsv_row(entry))?;
    }
    Ok(())
}

fn tsv_row(entry: &Entry) -> String {
    let date = entry
        .time()
        .map(|t| t.with_timezone(&Local).format(OUTPUT_DATE_FORMAT).to_string())
        .unwrap_or_else(|_| entry.created_at.clone());
    let workout = entry.workout.as_ref();
    let activity = workout
        .and_then(|w| w.activity_type.as_deref())
        .unwrap_or("");
    let (distance, units) = workout
        .and_then(|w| w.distance.as_ref())
        .map(|d| (format!("{:.2}", d.value), d.units.clone()))
        .unwrap_or_default();
    let duration = workout
        .and_then(|w| w.duration)
        .map(format_duration)
        .unwrap_or_default();
    let message = entry.message.as_deref().map(flatten).unwrap_or_default();

    [
        entry.id.to_string(),
        date,
        flatten(activity),
        distance,
        flatten(&units),
        duration,
        message,
    ]
    .join("\t")
}

/// Collapses tabs and line breaks so a value stays in its column.
fn flatten(text: &str) -> String {
    text.split(['\t', '\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats seconds as `h:mm:ss`.
fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
