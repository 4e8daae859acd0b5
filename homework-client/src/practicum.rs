//! Homework status API

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::debug;

use crate::error::{ClientError, Result};

/// Default homework status endpoint
pub const PRACTICUM_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// HTTP client for the homework status endpoint
#[derive(Clone)]
pub struct PracticumClient {
    /// Full URL of the status endpoint
    endpoint: String,
    /// OAuth token sent with every request
    token: String,
    /// HTTP client instance
    client: Client,
}

impl PracticumClient {
    /// Create a new client with a default HTTP client
    ///
    /// # Arguments
    /// * `endpoint` - URL of the homework status endpoint
    /// * `token` - OAuth token of the student
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(endpoint, token, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        }
    }

    /// Fetch homework statuses changed since `from_date`
    ///
    /// The body is returned as decoded but unchecked JSON; validating its shape
    /// is up to the caller.
    ///
    /// # Arguments
    /// * `from_date` - Unix timestamp (seconds) to report changes from
    ///
    /// # Errors
    /// * [`ClientError::Transport`] if no response was received
    /// * [`ClientError::Api`] on a non-success status code; the reason text is
    ///   bounded so it can be forwarded to a chat
    /// * [`ClientError::Parse`] if the body is not valid JSON
    pub async fn get_homework_statuses(&self, from_date: i64) -> Result<Value> {
        debug!("Requesting homework statuses from_date={}", from_date);

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = crate::error_message(response).await;
            return Err(ClientError::api_error(status.as_u16(), message));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}

impl std::fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish()
    }
}
