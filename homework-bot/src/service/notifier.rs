//! Notifier service
//!
//! Delivers text messages to the configured chat. Delivery is best-effort:
//! failures are logged here and never reach the caller as errors.

use async_trait::async_trait;
use homework_client::TelegramClient;
use tracing::{debug, error};

/// Best-effort message delivery
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `message` to the recipient
    ///
    /// Returns whether the message was delivered. Callers must not treat a
    /// `false` as a failure of their own work.
    async fn notify(&self, message: &str) -> bool;
}

/// Notifier backed by the Telegram Bot API
pub struct TelegramNotifier {
    client: TelegramClient,
    chat_id: String,
}

impl TelegramNotifier {
    /// Creates a notifier that writes to `chat_id`
    pub fn new(client: TelegramClient, chat_id: String) -> Self {
        Self { client, chat_id }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> bool {
        match self.client.send_message(&self.chat_id, message).await {
            Ok(()) => {
                debug!("Message sent: {}", message);
                true
            }
            Err(e) => {
                error!("Failed to send Telegram message: {}", e);
                false
            }
        }
    }
}
