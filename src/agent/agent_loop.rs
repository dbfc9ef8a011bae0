//! Main intake loop — reads channel messages, runs the dialogue, replies,
//! and dispatches finished leads.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::{FutureExt, StreamExt};

use crate::agent::dispatch::{DispatchReport, IntakeDeps, dispatch_completion};
use crate::channels::{ChannelManager, IncomingMessage, OutgoingResponse};
use crate::error::Error;
use crate::intake::{DialogueEngine, ProcessResult};

/// Reply sent when a turn cannot be processed.
pub const APOLOGY: &str = "Desculpe, ocorreu um erro. Tente novamente em alguns instantes.";

/// Drives the dialogue engine from the configured channels.
pub struct IntakeAgent {
    engine: Arc<DialogueEngine>,
    deps: IntakeDeps,
    channels: Arc<ChannelManager>,
}

impl IntakeAgent {
    pub fn new(engine: Arc<DialogueEngine>, deps: IntakeDeps, channels: ChannelManager) -> Self {
        Self {
            engine,
            deps,
            channels: Arc::new(channels),
        }
    }

    /// Run until Ctrl+C or until every channel stream ends.
    pub async fn run(self) -> Result<(), Error> {
        let mut message_stream = self.channels.start_all().await?;

        tracing::info!(channels = ?self.channels.names(), "Intake agent ready and listening");

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            self.handle_message(&message).await;
        }

        tracing::info!("Intake agent shutting down...");
        self.channels.shutdown_all().await?;

        Ok(())
    }

    /// Handle one inbound message: reply first, then dispatch any lead.
    ///
    /// Returns the dispatch report when the message finished an intake.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Option<DispatchReport> {
        let result = match self.process(message).await {
            Some(result) => result,
            None => {
                self.reply(message, APOLOGY).await;
                return None;
            }
        };

        self.reply(message, &result.reply).await;

        let completion = result.completion?;
        Some(dispatch_completion(&self.deps, &self.channels, &message.channel, &completion).await)
    }

    /// Run the dialogue turn; `None` if it panicked.
    async fn process(&self, message: &IncomingMessage) -> Option<ProcessResult> {
        let turn = self.engine.process_message(
            &message.conversation_id,
            &message.content,
            &message.sender,
        );

        match AssertUnwindSafe(turn).catch_unwind().await {
            Ok(result) => Some(result),
            Err(_) => {
                tracing::error!(
                    channel = %message.channel,
                    conversation_id = %message.conversation_id,
                    "Dialogue turn panicked"
                );
                None
            }
        }
    }

    async fn reply(&self, message: &IncomingMessage, text: &str) {
        if let Err(e) = self
            .channels
            .respond(message, OutgoingResponse::text(text))
            .await
        {
            tracing::warn!(
                channel = %message.channel,
                conversation_id = %message.conversation_id,
                error = %e,
                "Failed to send reply"
            );
        }
    }
}
