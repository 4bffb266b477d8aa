use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Monday of the calendar week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Sunday of the calendar week containing `date`.
pub fn end_of_week(date: NaiveDate) -> NaiveDate {
    start_of_week(date) + Duration::days(6)
}

pub fn sub_weeks(date: NaiveDate, weeks: u32) -> NaiveDate {
    date - Duration::weeks(i64::from(weeks))
}

/// Renders a timestamp as `YYYY-MM-DD` (UTC), the format the search API expects.
pub fn format_date_iso(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// ISO-8601 week key for a timestamp, e.g. `2026-W35`.
///
/// Uses the ISO week-numbering year, so dates around New Year land in the
/// week they belong to. Zero-padding keeps string ordering chronological.
pub fn iso_week_key(timestamp: DateTime<Utc>) -> String {
    let week = timestamp.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}
