//!  Storage is organized through [activity_store::CsvActivityStore].
//!  The basic idea is:
//!   - There is a single comma separated file with a header line.
//!   - Every activity is one row: day, start time, optional end time and description.
//!   - The file is always rewritten as a whole.

pub mod activity_store;
pub mod csv;
pub mod entities;
