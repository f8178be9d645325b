use std::io::Write;

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Text surface the interactive session talks through. Abstracted so that the session can be
/// driven by scripted input.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Console: Send {
    /// Next line of input without the line break. `None` once input is exhausted.
    async fn read_line(&mut self) -> Result<Option<String>>;

    fn print(&mut self, text: &str);
}

pub struct StdConsole {
    lines: Lines<BufReader<Stdin>>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdConsole {
    async fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?)
    }

    fn print(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        // Prompts don't end with a new line, so they have to be flushed by hand.
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}
