//! CLI channel — stdin/stdout chat for trying the intake flow locally.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse};
use crate::error::ChannelError;
use crate::intake::Sender;

/// Conversation id every CLI line is filed under.
pub const CLI_CONVERSATION_ID: &str = "cli:local";

/// Reads one message per stdin line and prints replies to stdout.
pub struct CliChannel {
    sender: Sender,
}

impl CliChannel {
    /// `local_phone` is reported as the sender's channel phone.
    pub fn new(local_phone: impl Into<String>) -> Self {
        Self {
            sender: Sender::new("Local", local_phone),
        }
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            eprint!("> ");
                            continue;
                        }
                        let msg = IncomingMessage::new("cli", CLI_CONVERSATION_ID, line)
                            .with_sender(sender.clone());
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!(error = %e, "Error reading stdin");
                        break;
                    }
                }
            }
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        println!("\n{}\n", response.content);
        eprint!("> ");
        Ok(())
    }

    /// Unit forwards have nowhere to go locally, so they are echoed to stderr.
    async fn send_to(&self, recipient: &str, text: &str) -> Result<(), ChannelError> {
        eprintln!("\n📤 [{recipient}]\n{text}\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_channel_name() {
        assert_eq!(CliChannel::new("").name(), "cli");
    }

    #[test]
    fn cli_sender_carries_local_phone() {
        let ch = CliChannel::new("+55 55 98888-0000");
        assert_eq!(ch.sender.phone_number, "+55 55 98888-0000");
    }

    #[tokio::test]
    async fn cli_send_to_echoes() {
        let ch = CliChannel::new("");
        assert!(ch.send_to("5555911112222", "NOVO LEAD").await.is_ok());
    }
}
