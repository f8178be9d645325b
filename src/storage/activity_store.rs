use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

use crate::fs::operations::{read_locked, write_atomically};

use super::{
    csv::{join_fields, split_line, HEADER},
    entities::ActivityEntity,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Activity file {path:?} doesn't exist")]
    NotFound { path: PathBuf },

    #[error("Could not open activity file {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not write activity file {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Interface for abstracting storage of activities. The whole history is always read and written
/// at once.
pub trait ActivityStore {
    fn load(&self) -> impl Future<Output = Result<Vec<ActivityEntity>, StoreError>>;

    /// Replaces everything that was stored before with `activities`.
    fn save(&self, activities: &[ActivityEntity]) -> impl Future<Output = Result<(), StoreError>>;

    /// Number of stored rows the last [ActivityStore::load] couldn't understand. They aren't part
    /// of the loaded activities, but are written back untouched by [ActivityStore::save].
    fn unreadable_rows(&self) -> usize;
}

impl<T: Deref> ActivityStore for T
where
    T::Target: ActivityStore,
{
    fn load(&self) -> impl Future<Output = Result<Vec<ActivityEntity>, StoreError>> {
        self.deref().load()
    }

    fn save(&self, activities: &[ActivityEntity]) -> impl Future<Output = Result<(), StoreError>> {
        self.deref().save(activities)
    }

    fn unreadable_rows(&self) -> usize {
        self.deref().unreadable_rows()
    }
}

/// A raw line that couldn't be parsed, together with the number of activities that preceded it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UnreadableRow {
    position: usize,
    line: String,
}

/// The main realization of [ActivityStore]. Keeps activities in a comma separated file with a
/// header line.
pub struct CsvActivityStore {
    path: PathBuf,
    unreadable: Mutex<Vec<UnreadableRow>>,
}

impl CsvActivityStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            unreadable: Mutex::new(vec![]),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActivityStore for CsvActivityStore {
    #[instrument(skip(self), fields(path = ?self.path))]
    async fn load(&self) -> Result<Vec<ActivityEntity>, StoreError> {
        let content = read_locked(&self.path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                StoreError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                StoreError::Open {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let (activities, unreadable) = parse_activities(&self.path, &content);
        debug!(
            "Loaded {} activities, {} unreadable rows",
            activities.len(),
            unreadable.len()
        );
        *self.unreadable.lock().unwrap_or_else(PoisonError::into_inner) = unreadable;
        Ok(activities)
    }

    #[instrument(skip(self, activities), fields(path = ?self.path, count = activities.len()))]
    async fn save(&self, activities: &[ActivityEntity]) -> Result<(), StoreError> {
        let content = {
            let unreadable = self.unreadable.lock().unwrap_or_else(PoisonError::into_inner);
            render_activities(activities, &unreadable)
        };
        write_atomically(&self.path, content.as_bytes())
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        debug!("Saved activities");
        Ok(())
    }

    fn unreadable_rows(&self) -> usize {
        self.unreadable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Lines that aren't valid UTF-8 are read as Latin-1, so no byte of the file gets lost.
fn decode_line(line: &[u8]) -> String {
    match std::str::from_utf8(line) {
        Ok(v) => v.to_string(),
        Err(_) => line.iter().map(|&b| b as char).collect(),
    }
}

/// The first line is always treated as a header. Rows that can't be understood are kept aside
/// as they are.
fn parse_activities(path: &Path, content: &[u8]) -> (Vec<ActivityEntity>, Vec<UnreadableRow>) {
    let mut activities = vec![];
    let mut unreadable = vec![];
    for (index, line) in content.split(|&b| b == b'\n').enumerate().skip(1) {
        let line = decode_line(line);
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            trace!("Skipping blank line {}", index + 1);
            continue;
        }

        match ActivityEntity::from_fields(&split_line(line)) {
            Ok(v) => activities.push(v),
            Err(e) => {
                warn!(
                    "Can't read line {} in {:?} \"{}\", keeping it as is: {e}",
                    index + 1,
                    path,
                    line
                );
                unreadable.push(UnreadableRow {
                    position: activities.len(),
                    line: line.to_string(),
                });
            }
        }
    }
    (activities, unreadable)
}

/// Unreadable rows go back to where they were found relative to the activities around them.
fn render_activities(activities: &[ActivityEntity], unreadable: &[UnreadableRow]) -> String {
    let mut buffer = String::with_capacity(HEADER.len() + 1 + activities.len() * 32);
    buffer.push_str(HEADER);
    buffer.push('\n');

    let mut unreadable = unreadable.iter().peekable();
    for (index, activity) in activities.iter().enumerate() {
        while let Some(row) = unreadable.next_if(|v| v.position <= index) {
            buffer.push_str(&row.line);
            buffer.push('\n');
        }
        buffer.push_str(&join_fields(&activity.to_fields()));
        buffer.push('\n');
    }
    for row in unreadable {
        buffer.push_str(&row.line);
        buffer.push('\n');
    }
    buffer
}
