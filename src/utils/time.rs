use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

use crate::storage::entities::{Day, TimeLabel};

/// Wall clock reading split into the parts activities are recorded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub date: NaiveDate,
    pub time: TimeLabel,
}

impl Moment {
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn day(&self) -> Day {
        Day::Date(self.date)
    }
}

impl From<NaiveDateTime> for Moment {
    fn from(value: NaiveDateTime) -> Self {
        Self {
            date: value.date(),
            time: value.time().into(),
        }
    }
}
