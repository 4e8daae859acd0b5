//! Repository layer for the bot
//!
//! Repositories wrap the remote status API behind a trait so the poller can be
//! driven by an in-memory source in tests.

pub mod homeworks;

pub use homeworks::{HomeworkRepository, PollRequest};
