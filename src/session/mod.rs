//! Interactive menu loop. The user can record activities by hand or ask for a prediction and
//! record it once it's confirmed.

pub mod console;
pub mod input;
pub mod shutdown;

use std::fmt::Display;

use ansi_term::Colour::{Green, Red, Yellow};
use anyhow::Result;
use chrono_english::Dialect;
use console::Console;
use input::{is_confirmation, parse_day_input, parse_optional_time_input, parse_time_input};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    prediction::{MatchWindow, Prediction, Predictor},
    storage::{
        activity_store::{ActivityStore, StoreError},
        entities::ActivityEntity,
    },
    utils::{clock::Clock, time::Moment},
};

const MENU: &str = "\nChoose an option:\n\
                    1. Add activity\n\
                    2. Predict current activity\n\
                    3. Exit\n\
                    Enter your choice: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    AwaitingChoice,
    Adding,
    Predicting,
    /// Waiting for the user to accept the predicted description.
    Confirming(String),
    Terminated,
}

#[derive(Clone, Copy)]
pub struct SessionOptions {
    pub window: MatchWindow,
    pub dialect: Dialect,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            window: MatchWindow::default(),
            dialect: Dialect::Uk,
        }
    }
}

pub struct Session<S: ActivityStore, C: Console> {
    store: S,
    console: C,
    clock: Box<dyn Clock>,
    predictor: Predictor,
    dialect: Dialect,
    activities: Vec<ActivityEntity>,
    /// Set when existing activities couldn't be read. Saving would overwrite them.
    load_error: Option<StoreError>,
}

impl<S: ActivityStore, C: Console> Session<S, C> {
    /// Loads existing activities. A file that can't be read is reported and the session starts
    /// empty, without ever writing to it.
    pub async fn open(
        store: S,
        mut console: C,
        clock: Box<dyn Clock>,
        options: SessionOptions,
    ) -> Self {
        let (activities, load_error) = match load_or_warn(&store, &mut console).await {
            Ok(v) => (v, None),
            Err(e) => (vec![], Some(e)),
        };
        Self {
            store,
            console,
            clock,
            predictor: Predictor::new(options.window),
            dialect: options.dialect,
            activities,
            load_error,
        }
    }

    /// Executes the menu loop until the user exits, input ends or `shutdown` is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
        let mut state = SessionState::AwaitingChoice;
        while state != SessionState::Terminated {
            state = tokio::select! {
                biased;
                _ = shutdown.cancelled() => SessionState::Terminated,
                next = self.step(state) => next?,
            };
        }
        info!("Session finished with {} activities", self.activities.len());
        shutdown.cancel();
        Ok(())
    }

    async fn step(&mut self, state: SessionState) -> Result<SessionState> {
        debug!("Entering {state:?}");
        match state {
            SessionState::AwaitingChoice => self.await_choice().await,
            SessionState::Adding => self.add_activity().await,
            SessionState::Predicting => Ok(self.predict()),
            SessionState::Confirming(description) => self.confirm(description).await,
            SessionState::Terminated => Ok(SessionState::Terminated),
        }
    }

    async fn await_choice(&mut self) -> Result<SessionState> {
        let Some(choice) = self.prompt(MENU).await? else {
            return Ok(SessionState::Terminated);
        };
        Ok(match choice.trim() {
            "1" => SessionState::Adding,
            "2" => SessionState::Predicting,
            "3" => SessionState::Terminated,
            other => {
                debug!("Invalid menu choice {other:?}");
                self.console.print("Invalid choice. Please try again.\n");
                SessionState::AwaitingChoice
            }
        })
    }

    async fn add_activity(&mut self) -> Result<SessionState> {
        let now = self.clock.time();
        let moment = Moment::from(now);
        let dialect = self.dialect;

        let Some(day) = self
            .prompt_parsed(
                "Enter the day (YYYY-MM-DD or Mon-Sun) (leave blank for today): ",
                |v| parse_day_input(v, now, dialect),
            )
            .await?
        else {
            return Ok(SessionState::Terminated);
        };
        let Some(start) = self
            .prompt_parsed(
                "Enter the start time (HH:MM) (leave blank for current time): ",
                |v| parse_time_input(v, moment.time),
            )
            .await?
        else {
            return Ok(SessionState::Terminated);
        };
        let Some(end) = self
            .prompt_parsed(
                "Enter the end time (HH:MM) (leave blank if unknown): ",
                parse_optional_time_input,
            )
            .await?
        else {
            return Ok(SessionState::Terminated);
        };
        let Some(description) = self
            .prompt_parsed("Enter the activity description: ", |v| match v.trim() {
                "" => Err("Description can't be empty"),
                v => Ok(v.to_string()),
            })
            .await?
        else {
            return Ok(SessionState::Terminated);
        };

        self.record(ActivityEntity {
            day,
            start,
            end,
            description,
        })
        .await;
        Ok(SessionState::AwaitingChoice)
    }

    fn predict(&mut self) -> SessionState {
        let moment = self.clock.moment();
        let prediction = self
            .predictor
            .predict(&self.activities, moment.weekday(), moment.time);
        info!("Predicted {prediction:?} for {moment:?}");

        match prediction {
            Prediction::Activity(description) => {
                self.console.print(&format!(
                    "Predicted activity: {}\n",
                    Green.bold().paint(description.as_str())
                ));
                SessionState::Confirming(description)
            }
            Prediction::NoMatch => {
                self.console
                    .print(&format!("Predicted activity: {}\n", Prediction::NoMatch));
                SessionState::AwaitingChoice
            }
        }
    }

    async fn confirm(&mut self, description: String) -> Result<SessionState> {
        let Some(answer) = self
            .prompt("Are you satisfied with this prediction? (y/n): ")
            .await?
        else {
            return Ok(SessionState::Terminated);
        };

        if is_confirmation(&answer) {
            // The moment of confirmation, not the moment of prediction, is what gets recorded.
            let moment = self.clock.moment();
            self.record(ActivityEntity::confirmed(description, moment))
                .await;
        }
        Ok(SessionState::AwaitingChoice)
    }

    /// Appends the activity and rewrites the file. When saving fails the activity is kept in
    /// memory and goes to disk with the next successful save.
    #[instrument(skip(self))]
    async fn record(&mut self, activity: ActivityEntity) {
        self.activities.push(activity);
        if let Some(e) = &self.load_error {
            warn!("Not saving activities, the file wasn't loaded: {e:?}");
            self.console.print(&format!(
                "{} {e}. The activity is kept for this session only.\n",
                Red.paint("Activity file is not written because it couldn't be read:")
            ));
            return;
        }
        match self.store.save(&self.activities).await {
            Ok(()) => self
                .console
                .print("Activity added to CSV file successfully!\n"),
            Err(e) => {
                error!("Failed to save activities {e:?}");
                self.console.print(&format!(
                    "{} {e}. The activity is kept until the next successful save.\n",
                    Red.paint("Failed to save activities:")
                ));
            }
        }
    }

    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        self.console.print(text);
        self.console.read_line().await
    }

    /// Repeats the prompt until `parse` accepts the input. `None` means input ended.
    async fn prompt_parsed<T, E: Display>(
        &mut self,
        text: &str,
        parse: impl Fn(&str) -> Result<T, E>,
    ) -> Result<Option<T>> {
        loop {
            let Some(input) = self.prompt(text).await? else {
                return Ok(None);
            };
            match parse(&input) {
                Ok(v) => return Ok(Some(v)),
                Err(e) => self.console.print(&format!("{e}. Please try again.\n")),
            }
        }
    }
}

/// Loads activities from `store`, reporting problems on `console`. A missing file is the same as
/// an empty one. Any other failure is returned after being shown.
pub async fn load_or_warn(
    store: &impl ActivityStore,
    console: &mut impl Console,
) -> Result<Vec<ActivityEntity>, StoreError> {
    match store.load().await {
        Ok(v) => {
            let unreadable = store.unreadable_rows();
            if unreadable > 0 {
                console.print(&format!(
                    "{} {unreadable} rows of the activity file couldn't be read. They are ignored \
                     but stay in the file.\n",
                    Yellow.paint("Warning:")
                ));
            }
            Ok(v)
        }
        Err(e @ StoreError::NotFound { .. }) => {
            info!("{e}");
            console.print(&format!(
                "{} {e}. Starting with no activities.\n",
                Yellow.paint("Warning:")
            ));
            Ok(vec![])
        }
        Err(e) => {
            warn!("Failed to load activities {e:?}");
            console.print(&format!(
                "{} {e}. Starting with no activities, new ones won't be saved.\n",
                Yellow.paint("Warning:")
            ));
            Err(e)
        }
    }
}
