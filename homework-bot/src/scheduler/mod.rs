//! Scheduler layer for the bot
//!
//! Drives the fetch, validate, translate, notify cycle on a fixed cadence and
//! keeps the state needed to avoid repeating notifications.

pub mod poller;

pub use poller::StatusPoller;
