//! Error types for the homework clients

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the grading API or Telegram
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connection, DNS, timeout)
    #[error("Ошибка при запросе к API: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status code
    #[error("Эндпоинт недоступен. Код ответа API: {status} ({message})")]
    Api {
        /// HTTP status code
        status: u16,
        /// Reason text from the service
        message: String,
    },

    /// The body could not be decoded
    #[error("Некорректный ответ API: {0}")]
    Parse(String),

    /// Telegram accepted the request but refused to deliver it
    #[error("Сообщение не доставлено: {0}")]
    Rejected(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}
