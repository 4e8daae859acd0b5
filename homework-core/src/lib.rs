//! Homework Core
//!
//! Domain types and pure logic for the homework status bot.
//!
//! This crate contains:
//! - Status: the fixed set of review statuses and their verdicts
//! - Response validation: structural checks on the decoded API payload
//! - Translation: turning a homework record into a notification message
//!
//! Nothing in here performs I/O; the HTTP side lives in `homework-client`.

pub mod error;
pub mod homework;
pub mod response;
pub mod status;

// Re-export commonly used types
pub use error::{SchemaError, TranslateError};
pub use homework::{HomeworkRecord, translate};
pub use response::{RawHomework, ValidatedResponse, validate};
pub use status::HomeworkStatus;
