use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
};

use serde::Serialize;

use crate::{
    storage::entities::{ActivityEntity, Day},
    utils::percentage::{count_percentage, Percentage},
};

/// Broad bucket an activity description falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    Exercise,
    Work,
    Reading,
    Other,
}

impl Category {
    /// Keyword based guess. The first matching keyword wins.
    pub fn of(description: &str) -> Self {
        let description = description.to_lowercase();
        if description.contains("exercise") {
            Category::Exercise
        } else if description.contains("work") {
            Category::Work
        } else if description.contains("read") {
            Category::Reading
        } else {
            Category::Other
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Exercise => write!(f, "Exercise"),
            Category::Work => write!(f, "Work"),
            Category::Reading => write!(f, "Reading"),
            Category::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ActivityUsage {
    pub name: String,
    pub count: usize,
    pub share: Percentage,
}

/// Returns how often every activity was recorded, most frequent first. Entries below
/// `min_percentage` are left out.
pub fn activity_distribution(
    activities: &[ActivityEntity],
    min_percentage: Percentage,
    by_category: bool,
) -> Vec<ActivityUsage> {
    let mut map = HashMap::<String, usize>::new();
    for activity in activities {
        let name = if by_category {
            Category::of(&activity.description).to_string()
        } else {
            activity.description.clone()
        };
        *map.entry(name).or_default() += 1;
    }

    let total = activities.len();
    let mut usages = map
        .into_iter()
        .map(|(name, count)| ActivityUsage {
            name,
            count,
            share: count_percentage(count, total),
        })
        .filter(|v| v.share >= min_percentage)
        .collect::<Vec<_>>();
    usages.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    usages
}

#[derive(Debug, PartialEq, Serialize)]
pub struct DayUsage {
    pub day: Day,
    pub count: usize,
}

/// Number of activities recorded for every day.
pub fn daily_trend(activities: &[ActivityEntity]) -> Vec<DayUsage> {
    let mut map = BTreeMap::<Day, usize>::new();
    for activity in activities {
        *map.entry(activity.day).or_default() += 1;
    }
    map.into_iter()
        .map(|(day, count)| DayUsage { day, count })
        .collect()
}

/// The activity that was done the least. Something worth trying again. Ties go to the
/// alphabetically first one.
pub fn suggest_activity(activities: &[ActivityEntity]) -> Option<&str> {
    let mut counts = BTreeMap::<&str, usize>::new();
    for activity in activities {
        *counts.entry(activity.description.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .min_by_key(|(_, count)| *count)
        .map(|(description, _)| description)
}
