//! Keeps a history of daily activities in a small csv file and guesses what you are doing right
//! now by looking at what you usually did on the same weekday around the same time.
//!

pub mod analysis;
pub mod cli;
pub mod fs;
pub mod prediction;
pub mod session;
pub mod storage;
pub mod utils;
