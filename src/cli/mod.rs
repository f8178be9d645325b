pub mod add;
pub mod predict;
pub mod report;

use std::{fmt::Display, path::PathBuf};

use add::{process_add_command, AddCommand};
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use predict::{process_predict_command, PredictCommand};
use report::{
    process_stats_command, process_suggest_command, process_trend_command, StatsCommand,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter, warn};

use crate::{
    prediction::MatchWindow,
    session::{console::StdConsole, shutdown::detect_shutdown, Session, SessionOptions},
    storage::{
        activity_store::{ActivityStore, CsvActivityStore, StoreError},
        entities::ActivityEntity,
    },
    utils::{
        clock::DefaultClock,
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

pub const DEFAULT_FILE: &str = "mydailyroutine.csv";

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "routine-predictor", version, long_about = None)]
#[command(
    about = "Records daily activities and guesses what you are doing right now",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(long, global = true, default_value = DEFAULT_FILE, help = "File activities are kept in")]
    file: PathBuf,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        default_value_t = MatchWindow::Started,
        help = "Which past activities vote. \"started\" counts everything that started before now, \"ongoing\" also drops activities that already ended"
    )]
    window: MatchWindow,
    #[arg(
        long,
        global = true,
        default_value_t = DateStyle::Uk,
        help = "Style of dates used when parsing days. For Uk it's day/month/year. For Us it's month/day/year"
    )]
    date_style: DateStyle,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Record an activity")]
    Add {
        #[command(flatten)]
        command: AddCommand,
    },
    #[command(about = "Guess the current activity from past ones")]
    Predict {
        #[command(flatten)]
        command: PredictCommand,
    },
    #[command(about = "Show how often every activity was recorded")]
    Stats {
        #[command(flatten)]
        command: StatsCommand,
    },
    #[command(about = "Show how many activities were recorded per day")]
    Trend {
        #[arg(long, help = "Print the result as json")]
        json: bool,
    },
    #[command(about = "Suggest the activity that was done the least")]
    Suggest {},
}

/// Without a subcommand the interactive menu is started.
pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(
        CLI_PREFIX,
        &create_application_default_path()?,
        logging_level,
        args.log,
    )?;

    let store = CsvActivityStore::new(args.file);
    let options = SessionOptions {
        window: args.window,
        dialect: args.date_style.into(),
    };

    match args.commands {
        None => run_session(store, options).await,
        Some(Commands::Add { command }) => {
            process_add_command(command, &store, &DefaultClock, options.dialect).await
        }
        Some(Commands::Predict { command }) => {
            process_predict_command(command, &store, &DefaultClock, options.window).await
        }
        Some(Commands::Stats { command }) => process_stats_command(command, &store).await,
        Some(Commands::Trend { json }) => process_trend_command(json, &store).await,
        Some(Commands::Suggest {}) => process_suggest_command(&store).await,
    }
}

async fn run_session(store: CsvActivityStore, options: SessionOptions) -> Result<()> {
    info!("Starting interactive session on {:?}", store.path());
    let shutdown_token = CancellationToken::new();
    let session = Session::open(store, StdConsole::new(), Box::new(DefaultClock), options).await;

    let (_, session_result) = tokio::join!(
        detect_shutdown(shutdown_token.clone()),
        session.run(shutdown_token.clone()),
    );
    session_result
}

/// Loads everything recorded so far. A missing file simply means nothing was recorded yet, any
/// other failure stops the command so that the file doesn't get overwritten.
async fn load_existing(store: &impl ActivityStore) -> Result<Vec<ActivityEntity>> {
    match store.load().await {
        Ok(v) => {
            let unreadable = store.unreadable_rows();
            if unreadable > 0 {
                warn!("{unreadable} rows couldn't be read, they are kept in the file as they are");
            }
            Ok(v)
        }
        Err(StoreError::NotFound { path }) => {
            info!("{path:?} doesn't exist yet");
            Ok(vec![])
        }
        Err(e) => Err(e.into()),
    }
}

/// Reports a bad argument value the same way clap does.
fn validation_error(message: impl Display) -> anyhow::Error {
    Args::command()
        .error(clap::error::ErrorKind::ValueValidation, message.to_string())
        .into()
}
