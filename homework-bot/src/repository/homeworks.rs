//! Homeworks repository
//!
//! Fetches raw homework status payloads. No validation happens here.

use async_trait::async_trait;
use homework_client::{ClientError, PracticumClient};
use serde_json::Value;

/// Parameters of a single status request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollRequest {
    /// Unix timestamp (seconds) to report changes from
    pub from_timestamp: i64,
}

/// Source of homework status payloads
#[async_trait]
pub trait HomeworkRepository: Send + Sync {
    /// Fetches statuses changed since `request.from_timestamp`
    ///
    /// Makes a single attempt and returns the decoded body verbatim.
    async fn fetch(&self, request: PollRequest) -> Result<Value, ClientError>;
}

#[async_trait]
impl HomeworkRepository for PracticumClient {
    async fn fetch(&self, request: PollRequest) -> Result<Value, ClientError> {
        self.get_homework_statuses(request.from_timestamp).await
    }
}
