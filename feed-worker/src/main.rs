//! FeedMe Worker - polls a forum feed and posts new entries to a webhook.
//!
//! Runs one poll cycle at startup and then every `POLL_INTERVAL_MINUTES`
//! until the process receives SIGINT or SIGTERM.

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use feedme::{Config, Dispatcher, HttpFeedSource, PollCycle, Scheduler, SeenStore, WebhookNotifier};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("worker_starting");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        feed_url = %config.feed_url,
        webhook_host = config.webhook_url.host_str().unwrap_or(""),
        poll_interval_minutes = config.poll_interval_minutes,
        seen_store_path = %config.seen_store_path.display(),
        request_timeout_ms = config.request_timeout_ms,
        "config_loaded"
    );

    // One client for the feed and the webhook; decoders cover gzip, deflate and br.
    let client = Client::builder()
        .build()
        .context("Failed to create HTTP client")?;

    let source = HttpFeedSource::new(
        client.clone(),
        config.feed_url.clone(),
        config.request_timeout(),
        config.user_agent_pool.clone(),
    );
    let notifier = WebhookNotifier::new(
        client,
        config.webhook_url.clone(),
        config.request_timeout(),
    );
    let cycle = PollCycle::new(
        source,
        SeenStore::new(config.seen_store_path.clone()),
        Dispatcher::new(notifier),
    );

    let handle = Scheduler::new(cycle, config.poll_interval()).spawn();
    info!("worker_ready");

    wait_for_shutdown().await;

    info!("worker_stopping");
    handle.shutdown().await;
    info!("worker_shutdown_complete");

    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
