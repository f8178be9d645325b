use anyhow::Result;

use crate::{
    analysis::{activity_distribution, daily_trend, suggest_activity},
    storage::activity_store::ActivityStore,
    utils::percentage::Percentage,
};

use super::load_existing;

#[derive(Debug, clap::Args)]
pub struct StatsCommand {
    #[arg(
        short = 'p',
        long = "percentage",
        help = "Only show activities with at least specified share",
        default_value = "0"
    )]
    min_percentage: Percentage,
    #[arg(
        short,
        long,
        help = "Group activities into Exercise, Work, Reading and Other by keywords"
    )]
    categories: bool,
    #[arg(long, help = "Print the result as json")]
    json: bool,
}

/// Prints how often every activity was recorded.
pub async fn process_stats_command(
    StatsCommand {
        min_percentage,
        categories,
        json,
    }: StatsCommand,
    store: &impl ActivityStore,
) -> Result<()> {
    let activities = load_existing(store).await?;
    let usages = activity_distribution(&activities, min_percentage, categories);

    if json {
        println!("{}", serde_json::to_string_pretty(&usages)?);
        return Ok(());
    }

    if usages.is_empty() {
        println!("No activities recorded yet");
    }
    for usage in usages {
        println!("{}\t{}\t{}", usage.share, usage.count, usage.name);
    }
    Ok(())
}

/// Prints the number of activities for every recorded day.
pub async fn process_trend_command(json: bool, store: &impl ActivityStore) -> Result<()> {
    let activities = load_existing(store).await?;
    let trend = daily_trend(&activities);

    if json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
        return Ok(());
    }

    if trend.is_empty() {
        println!("No activities recorded yet");
    }
    for entry in trend {
        println!("{}\t{}", entry.day, entry.count);
    }
    Ok(())
}

pub async fn process_suggest_command(store: &impl ActivityStore) -> Result<()> {
    let activities = load_existing(store).await?;
    match suggest_activity(&activities) {
        Some(v) => println!("Try something new today! How about {v}?"),
        None => println!("No activities recorded yet"),
    }
    Ok(())
}
