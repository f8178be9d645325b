//! Guesses the current activity by majority vote over past activities recorded on the same weekday.

use std::{collections::BTreeMap, fmt::Display};

use chrono::Weekday;
use clap::ValueEnum;
use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::storage::entities::{ActivityEntity, TimeLabel};

pub const NO_MATCH: &str = "No matching activity found.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "activity", rename_all = "snake_case")]
pub enum Prediction {
    Activity(String),
    NoMatch,
}

impl Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prediction::Activity(v) => write!(f, "{v}"),
            Prediction::NoMatch => write!(f, "{NO_MATCH}"),
        }
    }
}

/// Decides which past activities are allowed to vote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MatchWindow {
    /// Everything that started at or before the current time on the same weekday.
    #[default]
    Started,
    /// Like [MatchWindow::Started], but activities that already ended are left out. Activities
    /// without an end last until the next activity of that weekday starts.
    Ongoing,
}

impl Display for MatchWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchWindow::Started => write!(f, "started"),
            MatchWindow::Ongoing => write!(f, "ongoing"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Predictor {
    window: MatchWindow,
}

impl Predictor {
    pub fn new(window: MatchWindow) -> Self {
        Self { window }
    }

    #[instrument(skip(self, activities), fields(window = %self.window, total = activities.len()))]
    pub fn predict(
        &self,
        activities: &[ActivityEntity],
        weekday: Weekday,
        now: TimeLabel,
    ) -> Prediction {
        let mut counts = BTreeMap::<&str, usize>::new();

        let candidates = activities
            .iter()
            .filter(|v| v.day.weekday() == weekday && v.start <= now);

        for activity in candidates {
            if self.window == MatchWindow::Ongoing {
                if let Some(end) = resolve_end(activities, activity) {
                    if end < now {
                        trace!("Activity {activity:?} ended at {end}");
                        continue;
                    }
                }
            }
            *counts.entry(activity.description.as_str()).or_default() += 1;
        }

        debug!("Votes {counts:?}");
        select_majority(&counts)
    }
}

/// Predicts with the default [MatchWindow].
pub fn predict(activities: &[ActivityEntity], weekday: Weekday, now: TimeLabel) -> Prediction {
    Predictor::default().predict(activities, weekday, now)
}

/// End of an activity. When it wasn't recorded, the closest later start on the same weekday is
/// used. `None` means the activity is open ended.
pub fn resolve_end(activities: &[ActivityEntity], activity: &ActivityEntity) -> Option<TimeLabel> {
    activity.end.or_else(|| {
        let weekday = activity.day.weekday();
        activities
            .iter()
            .filter(|v| v.day.weekday() == weekday && v.start > activity.start)
            .map(|v| v.start)
            .min()
    })
}

/// Ascending key order with a strict comparison means ties go to the smallest description.
fn select_majority(counts: &BTreeMap<&str, usize>) -> Prediction {
    let mut best: Option<(&str, usize)> = None;
    for (description, count) in counts {
        match best {
            Some((_, max)) if *count <= max => {}
            _ => best = Some((*description, *count)),
        }
    }

    match best {
        Some((description, _)) => Prediction::Activity(description.to_string()),
        None => Prediction::NoMatch,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use crate::storage::entities::{ActivityEntity, TimeLabel};

    use super::{predict, resolve_end, MatchWindow, Prediction, Predictor, NO_MATCH};

    fn activity(day: &str, start: &str, end: &str, description: &str) -> ActivityEntity {
        ActivityEntity::from_fields(&[day, start, end, description]).unwrap()
    }

    fn time(value: &str) -> TimeLabel {
        value.parse().unwrap()
    }

    #[test]
    fn test_predict_empty() {
        let prediction = predict(&[], Weekday::Mon, time("10:00"));
        assert_eq!(prediction, Prediction::NoMatch);
        assert_eq!(prediction.to_string(), NO_MATCH);
    }

    #[test]
    fn test_predict_filters_day_and_start() {
        let activities = [
            activity("Mon", "09:00", "10:00", "Work"),
            activity("Mon", "11:00", "12:00", "Lunch"),
            activity("Tue", "09:00", "10:00", "Work"),
        ];

        assert_eq!(
            predict(&activities, Weekday::Mon, time("11:30")),
            Prediction::Activity("Lunch".into())
        );
    }

    #[test]
    fn test_predict_ignores_later_starts() {
        let activities = [activity("Mon", "11:00", "12:00", "Lunch")];

        assert_eq!(
            predict(&activities, Weekday::Mon, time("10:59")),
            Prediction::NoMatch
        );
        assert_eq!(
            predict(&activities, Weekday::Mon, time("11:00")),
            Prediction::Activity("Lunch".into())
        );
    }

    #[test]
    fn test_predict_majority() {
        let activities = [
            activity("Mon", "08:00", "09:00", "Gym"),
            activity("Mon", "09:00", "", "Work"),
            activity("Mon", "10:00", "11:00", "Gym"),
        ];

        assert_eq!(
            predict(&activities, Weekday::Mon, time("10:30")),
            Prediction::Activity("Gym".into())
        );
    }

    #[test]
    fn test_predict_tie_goes_to_smallest() {
        let activities = [
            activity("Mon", "09:00", "", "Work"),
            activity("Mon", "08:00", "", "Breakfast"),
        ];

        assert_eq!(
            predict(&activities, Weekday::Mon, time("10:00")),
            Prediction::Activity("Breakfast".into())
        );
    }

    #[test]
    fn test_predict_matches_dates_by_weekday() {
        let activities = [
            activity("2025-03-17", "09:00", "", "Standup"),
            activity("2025-03-18", "09:00", "", "Reading"),
        ];

        assert_eq!(
            predict(&activities, Weekday::Mon, time("09:15")),
            Prediction::Activity("Standup".into())
        );
    }

    #[test]
    fn test_started_window_ignores_end() {
        let activities = [
            activity("Mon", "07:00", "07:30", "Run"),
            activity("Mon", "07:00", "07:30", "Run"),
            activity("Mon", "09:00", "17:00", "Work"),
        ];

        assert_eq!(
            Predictor::new(MatchWindow::Started).predict(&activities, Weekday::Mon, time("10:00")),
            Prediction::Activity("Run".into())
        );
    }

    #[test]
    fn test_ongoing_window_drops_finished() {
        let activities = [
            activity("Mon", "07:00", "07:30", "Run"),
            activity("Mon", "07:00", "07:30", "Run"),
            activity("Mon", "09:00", "17:00", "Work"),
        ];

        assert_eq!(
            Predictor::new(MatchWindow::Ongoing).predict(&activities, Weekday::Mon, time("10:00")),
            Prediction::Activity("Work".into())
        );
    }

    #[test]
    fn test_ongoing_window_uses_next_start() {
        let activities = [
            activity("Mon", "08:00", "", "Commute"),
            activity("Mon", "09:00", "", "Work"),
        ];
        let predictor = Predictor::new(MatchWindow::Ongoing);

        assert_eq!(
            predictor.predict(&activities, Weekday::Mon, time("08:30")),
            Prediction::Activity("Commute".into())
        );
        // Commute is over once work starts, so only work votes.
        assert_eq!(
            predictor.predict(&activities, Weekday::Mon, time("09:30")),
            Prediction::Activity("Work".into())
        );
    }

    #[test]
    fn test_ongoing_window_keeps_confirmations() {
        let activities = [activity("Mon", "12:15", "12:15", "Lunch")];

        assert_eq!(
            Predictor::new(MatchWindow::Ongoing).predict(&activities, Weekday::Mon, time("12:15")),
            Prediction::Activity("Lunch".into())
        );
    }

    #[test]
    fn test_resolve_end() {
        let activities = [
            activity("Mon", "08:00", "", "Commute"),
            activity("Tue", "08:30", "", "Other day"),
            activity("Mon", "12:00", "", "Lunch"),
            activity("Mon", "09:00", "", "Work"),
            activity("Mon", "10:00", "10:15", "Break"),
        ];

        assert_eq!(resolve_end(&activities, &activities[0]), Some(time("09:00")));
        assert_eq!(resolve_end(&activities, &activities[2]), None);
        assert_eq!(resolve_end(&activities, &activities[4]), Some(time("10:15")));
    }
}
