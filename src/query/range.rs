//! Turning the user's date arguments into query bounds.
//!
//! Dates are read in the local time zone. A start date covers its day from
//! midnight; an end date covers its day up to the last nanosecond, so
//! `--start 2024-03-01 --end 2024-03-01` selects everything logged that day.

use crate::constants::{DATE_FORMAT_COMPACT, DATE_FORMAT_ISO, DATE_FORMAT_SHORT};
use crate::errors::{AppError, AppResult};
use chrono::{
    DateTime, Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, TimeZone, Utc,
};

/// Which side of a range a date is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    Start,
    End,
}

/// Parses a calendar date in `YYYY-MM-DD`, `YYYYMMDD` or `yy/m/d` form.
pub fn parse_date(text: &str) -> AppResult<NaiveDate> {
    let text = text.trim();
    [DATE_FORMAT_ISO, DATE_FORMAT_COMPACT, DATE_FORMAT_SHORT]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .ok_or_else(|| {
            AppError::Date(format!(
                "'{}' is not a date (use YYYY-MM-DD, YYYYMMDD or yy/m/d)",
                text
            ))
        })
}

/// Parses a date argument into an inclusive bound for `side`.
///
/// # Examples
///
/// ```
/// use milelog::query::{parse_date_bound, BoundSide};
///
/// let start = parse_date_bound("2024-03-01", BoundSide::Start).unwrap();
/// let end = parse_date_bound("2024-03-01", BoundSide::End).unwrap();
/// assert!(start < end);
/// ```
pub fn parse_date_bound(text: &str, side: BoundSide) -> AppResult<DateTime<Utc>> {
    Ok(day_bound(parse_date(text)?, side))
}

/// The first or last instant of `date` in local time, as UTC.
pub fn day_bound(date: NaiveDate, side: BoundSide) -> DateTime<Utc> {
    let naive = match side {
        BoundSide::Start => date.and_time(chrono::NaiveTime::MIN),
        BoundSide::End => date.and_time(chrono::NaiveTime::MIN) + Duration::days(1)
            - Duration::nanoseconds(1),
    };
    local_to_utc(naive)
}

fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    // Times skipped by a DST jump have no local meaning; read them as UTC.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Resolves a relative phrase such as `"last week"` against `today`.
    ///
    /// Recognised phrases: `today`, `yesterday`, `this week`, `last week`,
    /// `this month`, `last month`, `this year`, `last year`. Weeks start on
    /// Monday.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Date` for any other phrase.
    ///
    /// # Examples
    ///
    /// ```
    /// use milelog::query::DateRange;
    /// use chrono::NaiveDate;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap(); // a Wednesday
    /// let range = DateRange::parse("last week", today).unwrap();
    /// assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    /// assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    /// ```
    pub fn parse(phrase: &str, today: NaiveDate) -> AppResult<Self> {
        let normalized = phrase
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let range = match normalized.as_str() {
            "today" => Self::day(today),
            "yesterday" => Self::day(today - Duration::days(1)),
            "this week" => Self::week_of(today),
            "last week" => Self::week_of(today - Duration::days(7)),
            "this month" => Self::month_of(today)?,
            "last month" => Self::month_of(shift_months_back(today, 1)?)?,
            "this year" => Self::year_of(today.year())?,
            "last year" => Self::year_of(today.year() - 1)?,
            _ => {
                return Err(AppError::Date(format!(
                    "unrecognised date range '{}'",
                    phrase.trim()
                )))
            }
        };
        Ok(range)
    }

    fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    fn week_of(date: NaiveDate) -> Self {
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        Self {
            start: monday,
            end: monday + Duration::days(6),
        }
    }

    fn month_of(date: NaiveDate) -> AppResult<Self> {
        let first = date
            .with_day(1)
            .ok_or_else(|| AppError::Date(format!("no first day for {}", date)))?;
        let next = first
            .checked_add_months(Months::new(1))
            .ok_or_else(|| AppError::Date(format!("month after {} out of range", first)))?;
        Ok(Self {
            start: first,
            end: next - Duration::days(1),
        })
    }

    fn year_of(year: i32) -> AppResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1);
        let end = NaiveDate::from_ymd_opt(year, 12, 31);
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(AppError::Date(format!("year {} out of range", year))),
        }
    }

    /// The range as inclusive query bounds.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            day_bound(self.start, BoundSide::Start),
            day_bound(self.end, BoundSide::End),
        )
    }
}

fn shift_months_back(date: NaiveDate, months: u32) -> AppResult<NaiveDate> {
    date.checked_sub_months(Months::new(months))
        .ok_or_else(|| AppError::Date(format!("{} months before {} out of range", months, date)))
}
