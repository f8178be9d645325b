use ansi_term::Colour::Green;
use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::{
    prediction::{MatchWindow, Prediction, Predictor},
    storage::{
        activity_store::ActivityStore,
        entities::{ActivityEntity, Day, TimeLabel},
    },
    utils::clock::Clock,
};

use super::{load_existing, validation_error};

#[derive(Debug, clap::Args)]
pub struct PredictCommand {
    #[arg(long, help = "Record the prediction as an activity happening right now")]
    confirm: bool,
    #[arg(long, help = "Predict for this time (HH:MM) instead of the current one")]
    at: Option<String>,
    #[arg(long, help = "Predict for this weekday instead of today")]
    on: Option<String>,
    #[arg(long, help = "Print the result as json")]
    json: bool,
}

#[derive(Debug, Serialize)]
struct PredictionReport {
    day: Day,
    time: TimeLabel,
    prediction: Prediction,
    recorded: bool,
}

pub async fn process_predict_command(
    PredictCommand {
        confirm,
        at,
        on,
        json,
    }: PredictCommand,
    store: &impl ActivityStore,
    clock: &impl Clock,
    window: MatchWindow,
) -> Result<()> {
    let moment = clock.moment();
    let weekday = match on {
        Some(v) => v.parse::<Day>().map_err(validation_error)?.weekday(),
        None => moment.weekday(),
    };
    let time = match at {
        Some(v) => v.parse::<TimeLabel>().map_err(validation_error)?,
        None => moment.time,
    };

    let mut activities = load_existing(store).await?;
    let prediction = Predictor::new(window).predict(&activities, weekday, time);
    info!("Predicted {prediction:?} for {weekday} {time}");

    let recorded = match (&prediction, confirm) {
        (Prediction::Activity(description), true) => {
            // Recorded at the actual moment even when another time was asked about.
            let moment = clock.moment();
            activities.push(ActivityEntity::confirmed(description.as_str(), moment));
            store.save(&activities).await?;
            true
        }
        _ => false,
    };

    if json {
        let report = PredictionReport {
            day: Day::Weekday(weekday),
            time,
            prediction,
            recorded,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match &prediction {
        Prediction::Activity(v) => {
            println!("Predicted activity: {}", Green.bold().paint(v.as_str()))
        }
        Prediction::NoMatch => println!("Predicted activity: {prediction}"),
    }
    if recorded {
        println!("Activity added to CSV file successfully!");
    } else if confirm {
        println!("Nothing to record");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        prediction::MatchWindow,
        storage::{
            activity_store::{ActivityStore, CsvActivityStore},
            entities::ActivityEntity,
        },
        utils::clock::FixedClock,
    };

    use super::{process_predict_command, PredictCommand};

    fn clock() -> FixedClock {
        // Monday
        FixedClock(
            NaiveDate::from_ymd_opt(2025, 3, 17)
                .unwrap()
                .and_hms_opt(11, 30, 0)
                .unwrap(),
        )
    }

    fn command(confirm: bool, at: Option<&str>, on: Option<&str>) -> PredictCommand {
        PredictCommand {
            confirm,
            at: at.map(String::from),
            on: on.map(String::from),
            json: false,
        }
    }

    async fn seeded_store(dir: &std::path::Path) -> Result<CsvActivityStore> {
        let store = CsvActivityStore::new(dir.join("routine.csv"));
        store
            .save(&[
                ActivityEntity::from_fields(&["Mon", "09:00", "10:00", "Work"])?,
                ActivityEntity::from_fields(&["Mon", "11:00", "12:00", "Lunch"])?,
                ActivityEntity::from_fields(&["Tue", "09:00", "10:00", "Gym"])?,
            ])
            .await?;
        Ok(store)
    }

    #[tokio::test]
    async fn test_confirm_records_now() -> Result<()> {
        let dir = tempdir()?;
        let store = seeded_store(dir.path()).await?;

        process_predict_command(command(true, None, None), &store, &clock(), MatchWindow::Started)
            .await?;

        let activities = store.load().await?;
        assert_eq!(activities.len(), 4);
        assert_eq!(
            activities[3],
            ActivityEntity::from_fields(&["2025-03-17", "11:30", "11:30", "Lunch"])?
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_without_confirm_nothing_changes() -> Result<()> {
        let dir = tempdir()?;
        let store = seeded_store(dir.path()).await?;

        process_predict_command(
            command(false, Some("9:30"), Some("Tue")),
            &store,
            &clock(),
            MatchWindow::Started,
        )
        .await?;

        assert_eq!(store.load().await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_without_match_records_nothing() -> Result<()> {
        let dir = tempdir()?;
        let store = seeded_store(dir.path()).await?;

        process_predict_command(
            command(true, Some("06:00"), None),
            &store,
            &clock(),
            MatchWindow::Started,
        )
        .await?;

        assert_eq!(store.load().await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_rejects_bad_time() -> Result<()> {
        let dir = tempdir()?;
        let store = seeded_store(dir.path()).await?;

        let result = process_predict_command(
            command(false, Some("noon"), None),
            &store,
            &clock(),
            MatchWindow::Started,
        )
        .await;

        assert!(result.is_err());
        Ok(())
    }
}
