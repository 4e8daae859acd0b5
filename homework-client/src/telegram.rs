//! Telegram Bot API
//!
//! Only `sendMessage` is needed. The bot token is part of the request path, so
//! transport errors are stripped of their URL before being returned.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Default Telegram Bot API base URL
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// HTTP client for the Telegram Bot API
#[derive(Clone)]
pub struct TelegramClient {
    /// Base URL of the Bot API (e.g., "https://api.telegram.org")
    base_url: String,
    /// Bot token
    token: String,
    /// HTTP client instance
    client: Client,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramClient {
    /// Create a new client against the public Bot API
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_client(TELEGRAM_API_URL, token, Client::new())
    }

    /// Create a new client with a custom base URL and HTTP client
    pub fn with_client(base_url: impl Into<String>, token: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        }
    }

    /// Send a text message to a chat
    ///
    /// # Arguments
    /// * `chat_id` - Target chat identifier
    /// * `text` - Message text
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);

        let response = self
            .client
            .post(&url)
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.without_url()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.without_url()))?;
        let parsed = serde_json::from_slice::<BotApiResponse>(&body);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|r| r.description)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), message));
        }

        let parsed = parsed
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        if !parsed.ok {
            return Err(ClientError::Rejected(
                parsed.description.unwrap_or_else(|| "no description".to_string()),
            ));
        }

        debug!("Message delivered to chat {}", chat_id);
        Ok(())
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}
