//! Reviewbot
//!
//! Watches the homework review API and forwards every new verdict to a
//! Telegram chat.
//!
//! Architecture:
//! - Configuration: credentials and intervals from environment variables
//! - Repositories: review API and bot API behind small traits
//! - Scheduler: the poll loop with its failure backoff
//!
//! The loop runs on a single thread until Ctrl-C or SIGTERM.

mod config;
mod error;
mod repository;
mod scheduler;
mod shutdown;

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repository::{Notifier, StatusFetcher};
use crate::scheduler::PollLoop;
use reviewbot_client::{ReviewApiClient, TelegramClient, http_client};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = load_config()?;

    init_tracing(config.log_file.as_deref())?;

    info!("Starting reviewbot");
    info!("Loaded configuration: {:?}", config);

    let http = http_client(config.request_timeout).context("Failed to build HTTP client")?;

    let fetcher: Arc<dyn StatusFetcher> = Arc::new(ReviewApiClient::with_client(
        config.review_api_url.clone(),
        config.review_api_token.clone(),
        http.clone(),
    ));
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramClient::with_client(
        config.telegram_api_url.clone(),
        config.telegram_token.clone(),
        config.telegram_chat_id.clone(),
        http,
    ));

    let mut poll_loop = PollLoop::new(&config, fetcher, notifier);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown::shutdown_signal().await;
        info!("Shutdown signal received, finishing current cycle");
        let _ = shutdown_tx.send(true);
    });

    poll_loop.run(shutdown_rx).await;

    info!("Reviewbot stopped");
    Ok(())
}

/// Loads configuration from environment variables and validates it
fn load_config() -> Result<Config> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Logs to stdout, plus an append-only copy in `log_file` when given
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reviewbot=info,reviewbot_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}
