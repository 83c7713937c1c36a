//! Date and time formats used by the timetable exports.
//!
//! All values are naive (no time zone): a timetable row describes local
//! wall-clock times on a calendar date.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Calendar date, e.g. `10/03/2025`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";
/// Clock time with seconds, e.g. `09:00:00`.
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Duration column, e.g. `02:00`.
pub const DURATION_FORMAT: &str = "%H:%M";
/// Combined instant used by `Date_Time` queries.
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Weekday names indexed by days from Monday.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT)
}

/// Durations are stored as a time of day so they keep their `HH:MM` shape.
pub fn parse_duration(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(raw.trim(), DURATION_FORMAT)
}

pub fn parse_date_time(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), DATE_TIME_FORMAT)
}

/// Parse the "Scheduled Day" column.
///
/// Accepts a weekday name (`Monday`, `mon`, any case) or a date in one of
/// the formats the source files use, in which case the weekday of that date
/// is returned. The result is independent of the row's activity date.
pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    let trimmed = raw.trim();
    if let Ok(day) = trimmed.parse::<Weekday>() {
        return Some(day);
    }
    ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(|date| date.weekday())
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Number of calendar weeks touched by the closed range `[first, last]`.
pub fn weeks_spanned(first: NaiveDate, last: NaiveDate) -> usize {
    let days = (week_start(last) - week_start(first)).num_days();
    (days.max(0) / 7) as usize + 1
}

pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAY_NAMES[day.num_days_from_monday() as usize]
}
