//! Homework Bot
//!
//! Watches the review status of a student's homework and reports changes to a
//! Telegram chat.
//!
//! Architecture:
//! - Configuration: credentials from the environment, checked before anything starts
//! - Repository: HTTP access to the homework status API
//! - Services: best-effort Telegram notifications
//! - Scheduler: the polling loop and its deduplication state

mod config;
mod repository;
mod scheduler;
mod service;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, REQUEST_TIMEOUT};
use crate::repository::HomeworkRepository;
use crate::scheduler::StatusPoller;
use crate::service::{Notifier, TelegramNotifier};
use homework_client::{PracticumClient, TelegramClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homework_bot=debug,homework_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting homework bot");

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Refusing to start: {:#}", e);
            return Err(e);
        }
    };
    info!("Loaded configuration: {:?}", config);

    let http = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let repository: Arc<dyn HomeworkRepository> = Arc::new(PracticumClient::with_client(
        config.practicum_endpoint.clone(),
        config.practicum_token.clone(),
        http.clone(),
    ));
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(
        TelegramClient::with_client(
            config.telegram_api_url.clone(),
            config.telegram_token.clone(),
            http,
        ),
        config.telegram_chat_id.clone(),
    ));

    let poller = StatusPoller::new(repository, notifier, config.retry_period);

    tokio::select! {
        _ = poller.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            info!("Shutdown signal received, stopping");
        }
    }

    Ok(())
}

/// Loads and validates configuration from the environment
fn load_config() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
