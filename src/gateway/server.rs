//! Gateway server loop.

use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::bot::Bot;
use crate::{BotError, BotResult};

use super::transport::LineTransport;

/// Counters for one server run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    /// Events read and dispatched.
    pub events: usize,
    /// Replies written.
    pub replies: usize,
    /// Lines skipped because they were not valid events.
    pub malformed: usize,
}

/// Feeds transport events to a [`Bot`] and writes its replies back.
pub struct BotServer<R, W> {
    transport: LineTransport<R, W>,
    bot: Arc<Bot>,
}

impl<R: BufRead, W: Write> BotServer<R, W> {
    pub fn new(transport: LineTransport<R, W>, bot: Arc<Bot>) -> Self {
        Self { transport, bot }
    }

    /// Runs until the input closes.
    ///
    /// Malformed lines (bad JSON or bad UTF-8) are logged and skipped; an
    /// I/O error from the underlying reader ends the loop with that error.
    pub async fn run(&mut self) -> BotResult<ServeSummary> {
        tracing::info!(store = self.bot.store().name(), "Gateway starting");
        let mut summary = ServeSummary::default();

        loop {
            let event = match self.transport.read_event() {
                Ok(event) => event,
                Err(BotError::TransportClosed) => {
                    tracing::info!("Input closed");
                    break;
                }
                Err(e @ (BotError::Json(_) | BotError::MalformedLine(_))) => {
                    summary.malformed += 1;
                    tracing::warn!(error = %e, "Skipping malformed event");
                    continue;
                }
                Err(e) => return Err(e),
            };

            summary.events += 1;

            if let Some(reply) = self.bot.handle(event).await {
                match self.transport.write_reply(&reply) {
                    Ok(()) => summary.replies += 1,
                    Err(e) => tracing::error!(error = %e, "Failed to write reply"),
                }
            }
        }

        tracing::info!(
            events = summary.events,
            replies = summary.replies,
            malformed = summary.malformed,
            "Gateway stopped"
        );
        Ok(summary)
    }

    /// Consumes the server, returning its transport.
    pub fn into_transport(self) -> LineTransport<R, W> {
        self.transport
    }
}
