//! Service layer
//!
//! Outbound side effects of the bot. Services are trait-based so the poller
//! can be tested without a network.

mod notifier;

pub use notifier::{Notifier, TelegramNotifier};
