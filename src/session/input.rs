use chrono::{NaiveDateTime, TimeZone, Utc};
use chrono_english::{parse_date_string, Dialect};

use crate::storage::entities::{Day, ParseError, TimeLabel};

/// Interprets what the user typed as a day. Blank input means today. Besides weekdays and ISO
/// dates, phrases like "yesterday" or "last friday" are understood relative to `now`.
pub fn parse_day_input(
    input: &str,
    now: NaiveDateTime,
    dialect: Dialect,
) -> Result<Day, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Day::Date(now.date()));
    }

    input.parse::<Day>().or_else(|e| {
        // Times are kept as naive wall clock values, UTC only serves as a carrier here.
        parse_date_string(input, Utc.from_utc_datetime(&now), dialect)
            .map(|v| Day::Date(v.date_naive()))
            .map_err(|_| e)
    })
}

/// Blank input falls back to `default`.
pub fn parse_time_input(input: &str, default: TimeLabel) -> Result<TimeLabel, ParseError> {
    match input.trim() {
        "" => Ok(default),
        v => v.parse(),
    }
}

/// Blank input means the end wasn't known.
pub fn parse_optional_time_input(input: &str) -> Result<Option<TimeLabel>, ParseError> {
    match input.trim() {
        "" => Ok(None),
        v => v.parse().map(Some),
    }
}

pub fn is_confirmation(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
