//! Bot configuration
//!
//! Credentials come from the environment (optionally via a `.env` file). All
//! three secrets are required; the bot refuses to start without any of them.

use std::fmt;
use std::time::Duration;

use homework_client::{PRACTICUM_ENDPOINT, TELEGRAM_API_URL};

/// Delay between the starts of two poll cycles
pub const RETRY_PERIOD: Duration = Duration::from_secs(600);

/// Upper bound for a single HTTP request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const REQUIRED_VARS: [&str; 3] = ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"];

/// Bot configuration
#[derive(Clone)]
pub struct Config {
    /// OAuth token for the homework status API
    pub practicum_token: String,

    /// Telegram bot token
    pub telegram_token: String,

    /// Chat that receives notifications
    pub telegram_chat_id: String,

    /// Homework status endpoint
    pub practicum_endpoint: String,

    /// Telegram Bot API base URL
    pub telegram_api_url: String,

    /// How often to poll the status API
    pub retry_period: Duration,
}

impl Config {
    /// Creates a configuration with default endpoints
    pub fn new(practicum_token: String, telegram_token: String, telegram_chat_id: String) -> Self {
        Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            practicum_endpoint: PRACTICUM_ENDPOINT.to_string(),
            telegram_api_url: TELEGRAM_API_URL.to_string(),
            retry_period: RETRY_PERIOD,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - PRACTICUM_TOKEN (required)
    /// - TELEGRAM_TOKEN (required)
    /// - TELEGRAM_CHAT_ID (required)
    /// - PRACTICUM_ENDPOINT (optional)
    /// - TELEGRAM_API_URL (optional)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .into_iter()
            .filter(|&key| value(key).is_none())
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required environment variables: {}",
                missing.join(", ")
            );
        }

        let [practicum_token, telegram_token, telegram_chat_id] =
            REQUIRED_VARS.map(|key| value(key).unwrap_or_default());

        let mut config = Self::new(practicum_token, telegram_token, telegram_chat_id);
        if let Some(endpoint) = value("PRACTICUM_ENDPOINT") {
            config.practicum_endpoint = endpoint;
        }
        if let Some(url) = value("TELEGRAM_API_URL") {
            config.telegram_api_url = url;
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [
            ("practicum_endpoint", &self.practicum_endpoint),
            ("telegram_api_url", &self.telegram_api_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.retry_period.is_zero() {
            anyhow::bail!("retry_period must be greater than 0");
        }

        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("practicum_endpoint", &self.practicum_endpoint)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("retry_period", &self.retry_period)
            .finish()
    }
}
