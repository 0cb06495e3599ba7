//! Console command ingestion for the summarizer runtime.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;
use shared_logging::LogLevel;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::mpsc::UnboundedSender,
};

use crate::telemetry::SummarizerTelemetry;

/// Commands accepted from the console.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsoleCommand {
    /// Summarize an article.
    Summarize {
        /// Article title.
        title: String,
        /// Article body text.
        body: String,
        /// Generated-token cap; the runtime default applies when unset.
        #[serde(default)]
        max_new_tokens: Option<usize>,
    },
    /// Exit the loop.
    Quit,
}

/// Receives JSON line commands from stdin, dispatching to the runtime.
///
/// Malformed lines are logged and skipped; a long-running feed must not
/// die on one bad line.
pub struct ConsoleCommandReceiver {
    sender: UnboundedSender<ConsoleCommand>,
    telemetry: Option<SummarizerTelemetry>,
}

impl ConsoleCommandReceiver {
    /// Creates a new receiver.
    #[must_use]
    pub fn new(
        sender: UnboundedSender<ConsoleCommand>,
        telemetry: Option<SummarizerTelemetry>,
    ) -> Self {
        Self { sender, telemetry }
    }

    /// Runs the loop over stdin until `Quit` or end of input.
    pub async fn run(&self) -> Result<()> {
        self.pump(BufReader::new(tokio::io::stdin())).await
    }

    async fn pump<R: AsyncBufRead + Unpin>(&self, reader: R) -> Result<()> {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<ConsoleCommand>(line) {
                Ok(ConsoleCommand::Quit) => break,
                Ok(cmd) => self.sender.send(cmd)?,
                Err(err) => {
                    if let Some(tel) = &self.telemetry {
                        let _ = tel.log(
                            LogLevel::Warn,
                            "summarizer.console.rejected_line",
                            json!({ "error": err.to_string() }),
                        );
                    }
                }
            }
        }
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(
                LogLevel::Info,
                "summarizer.console.receiver_shutdown",
                json!({}),
            );
        }
        Ok(())
    }
}
