use chrono::{Local, NaiveDateTime};

use super::time::Moment;

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing.
pub trait Clock: Sync + Send + 'static {
    /// Local wall time. Time zones are not tracked anywhere else in the application.
    fn time(&self) -> NaiveDateTime;

    fn moment(&self) -> Moment {
        self.time().into()
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a single point in time.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

#[cfg(test)]
impl Clock for FixedClock {
    fn time(&self) -> NaiveDateTime {
        self.0
    }
}
