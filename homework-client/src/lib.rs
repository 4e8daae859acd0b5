//! Homework HTTP Clients
//!
//! Thin, typed wrappers around the two remote services the bot talks to:
//! - [`PracticumClient`]: the homework status API
//! - [`TelegramClient`]: the Telegram Bot API, used to deliver notifications
//!
//! Both clients make exactly one attempt per call. Retrying is left to the
//! caller's polling cadence.
//!
//! # Example
//!
//! ```no_run
//! use homework_client::PracticumClient;
//!
//! # async fn example() -> homework_client::Result<()> {
//! let client = PracticumClient::new(
//!     "https://practicum.yandex.ru/api/user_api/homework_statuses/",
//!     "token",
//! );
//! let body = client.get_homework_statuses(0).await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

pub mod error;
mod practicum;
mod telegram;

pub use error::{ClientError, Result};
pub use practicum::{PRACTICUM_ENDPOINT, PracticumClient};
pub use telegram::{TELEGRAM_API_URL, TelegramClient};

/// Longest reason text kept from an error body, in characters
const MAX_REASON_CHARS: usize = 300;

/// Reads the reason text of a failed response
///
/// Only JSON bodies are kept, cut to [`MAX_REASON_CHARS`]. Empty, unreadable or
/// non-JSON bodies (e.g. a proxy's HTML error page) fall back to the canonical
/// reason phrase.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    if serde_json::from_str::<serde_json::Value>(&text).is_err() {
        return status.canonical_reason().unwrap_or("Unknown error").to_string();
    }
    truncate_reason(text.trim())
}

/// Cuts `text` to [`MAX_REASON_CHARS`] on a char boundary, marking the cut with `…`
fn truncate_reason(text: &str) -> String {
    match text.char_indices().nth(MAX_REASON_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
