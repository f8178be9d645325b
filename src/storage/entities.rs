use std::{cmp::Ordering, fmt::Display, str::FromStr};

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::utils::time::Moment;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid time \"{input}\" (expected HH:MM)")]
    InvalidTime { input: String },

    #[error("Invalid day \"{input}\" (expected a weekday like Mon or a date like 2025-03-17)")]
    InvalidDay { input: String },
}

/// Time of day with minute precision. Always rendered as zero-padded `HH:MM`, so the textual and
/// the chronological order agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeLabel(NaiveTime);

impl TimeLabel {
    pub fn new_opt(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }
}

impl From<NaiveTime> for TimeLabel {
    fn from(value: NaiveTime) -> Self {
        // Seconds are dropped so that a label read back from disk compares equal.
        Self(NaiveTime::from_hms_opt(value.hour(), value.minute(), 0).unwrap_or(NaiveTime::MIN))
    }
}

impl FromStr for TimeLabel {
    type Err = ParseError;

    /// Accepts `HH:MM` and the unpadded `H:MM`. Minutes are always two digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidTime {
            input: s.to_string(),
        };
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;

        let all_digits = |v: &str| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(hour) || hour.len() > 2 || !all_digits(minute) || minute.len() != 2 {
            return Err(invalid());
        }

        let hour = hour.parse::<u32>().map_err(|_| invalid())?;
        let minute = minute.parse::<u32>().map_err(|_| invalid())?;
        TimeLabel::new_opt(hour, minute).ok_or_else(invalid)
    }
}

impl Display for TimeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The day an activity happened on. Older files mostly contain weekday abbreviations, records
/// created by this application carry a full date. Both kinds expose a weekday, which is what the
/// predictor matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Day {
    Weekday(Weekday),
    Date(NaiveDate),
}

impl Day {
    pub fn weekday(&self) -> Weekday {
        match self {
            Day::Weekday(weekday) => *weekday,
            Day::Date(date) => date.weekday(),
        }
    }
}

impl Ord for Day {
    /// Plain weekdays go first (Monday to Sunday), dates follow chronologically.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Day::Weekday(a), Day::Weekday(b)) => a
                .num_days_from_monday()
                .cmp(&b.num_days_from_monday()),
            (Day::Weekday(_), Day::Date(_)) => Ordering::Less,
            (Day::Date(_), Day::Weekday(_)) => Ordering::Greater,
            (Day::Date(a), Day::Date(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Day {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Day {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(weekday) = s.parse::<Weekday>() {
            return Ok(Day::Weekday(weekday));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Day::Date)
            .map_err(|_| ParseError::InvalidDay {
                input: s.to_string(),
            })
    }
}

impl Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Day::Weekday(weekday) => write!(f, "{weekday}"),
            Day::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for Day {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single row of the activity file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntity {
    pub day: Day,
    pub start: TimeLabel,
    /// Missing end means the activity lasts until whatever was recorded next.
    pub end: Option<TimeLabel>,
    pub description: String,
}

impl ActivityEntity {
    /// Builds an entity out of raw positional fields. Missing trailing fields are treated as
    /// empty. Day and start time are mandatory.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, ParseError> {
        let field = |index: usize| fields.get(index).map(|v| v.as_ref()).unwrap_or("");

        let day = field(0).parse::<Day>()?;
        let start = field(1).parse::<TimeLabel>()?;
        let end = match field(2).trim() {
            "" => None,
            v => Some(v.parse::<TimeLabel>()?),
        };

        Ok(Self {
            day,
            start,
            end,
            description: field(3).to_string(),
        })
    }

    /// Fields in the order they are stored on disk.
    pub fn to_fields(&self) -> [String; 4] {
        [
            self.day.to_string(),
            self.start.to_string(),
            self.end.map(|v| v.to_string()).unwrap_or_default(),
            self.description.clone(),
        ]
    }

    /// An accepted prediction is stored as a zero-length activity at the moment of
    /// confirmation.
    pub fn confirmed(description: impl Into<String>, moment: Moment) -> Self {
        Self {
            day: moment.day(),
            start: moment.time,
            end: Some(moment.time),
            description: description.into(),
        }
    }
}
