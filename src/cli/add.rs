use anyhow::Result;
use chrono_english::Dialect;
use tracing::info;

use crate::{
    session::input::{parse_day_input, parse_optional_time_input, parse_time_input},
    storage::{activity_store::ActivityStore, entities::ActivityEntity},
    utils::{clock::Clock, time::Moment},
};

use super::{load_existing, validation_error};

#[derive(Debug, clap::Args)]
pub struct AddCommand {
    #[arg(
        long,
        help = "Day of the activity. Examples are \"Mon\", \"2025-03-17\", \"yesterday\". Defaults to today"
    )]
    day: Option<String>,
    #[arg(long, help = "Start of the activity as HH:MM. Defaults to current time")]
    start: Option<String>,
    #[arg(long, help = "End of the activity as HH:MM. Leave out if unknown")]
    end: Option<String>,
    #[arg(required = true, num_args = 1.., help = "What you were doing")]
    description: Vec<String>,
}

impl AddCommand {
    pub fn description(&self) -> String {
        self.description.join(" ")
    }

    /// Turns raw arguments into an activity, filling in `now` where something was left out.
    fn into_activity(self, now: chrono::NaiveDateTime, dialect: Dialect) -> Result<ActivityEntity> {
        let moment = Moment::from(now);
        let description = self.description();
        if description.trim().is_empty() {
            return Err(validation_error("Description can't be empty"));
        }

        let day = parse_day_input(self.day.as_deref().unwrap_or_default(), now, dialect)
            .map_err(validation_error)?;
        let start = parse_time_input(self.start.as_deref().unwrap_or_default(), moment.time)
            .map_err(validation_error)?;
        let end = parse_optional_time_input(self.end.as_deref().unwrap_or_default())
            .map_err(validation_error)?;

        Ok(ActivityEntity {
            day,
            start,
            end,
            description: description.trim().to_string(),
        })
    }
}

/// Appends one activity to the file.
pub async fn process_add_command(
    command: AddCommand,
    store: &impl ActivityStore,
    clock: &impl Clock,
    dialect: Dialect,
) -> Result<()> {
    let activity = command.into_activity(clock.time(), dialect)?;

    let mut activities = load_existing(store).await?;
    activities.push(activity.clone());
    store.save(&activities).await?;

    info!("Added {activity:?}");
    println!(
        "Added {} {}-{} {}",
        activity.day,
        activity.start,
        activity.end.map(|v| v.to_string()).unwrap_or_default(),
        activity.description
    );
    Ok(())
}
