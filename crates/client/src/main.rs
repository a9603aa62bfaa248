//! `restore-dashboard` -- headless System Restore Toolkit status watcher.
//!
//! Polls a running toolkit web interface on the dashboard's schedule and
//! logs the initial health of every check, then each check that flips.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                 | Description                       |
//! |------------------------|----------|-------------------------|-----------------------------------|
//! | `TOOLKIT_URL`          | no       | `http://localhost:5000` | Toolkit web interface base URL    |
//! | `POLL_INTERVAL_SECS`   | no       | `30`                    | Seconds between status polls      |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`                    | Per-request timeout, `0` disables |
//! | `TASK_ID`              | no       | --                      | Task to report on at startup      |

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use restore_client::api::ToolkitApi;
use restore_client::config::ClientConfig;
use restore_client::{StatusChange, StatusWatcher};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "restore_client=info,restore_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        toolkit_url = %config.base_url,
        poll_interval_secs = config.poll_interval.as_secs(),
        "Starting restore-dashboard",
    );

    let api = ToolkitApi::new(config.base_url.clone(), config.request_timeout).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client");
        std::process::exit(1);
    });

    let watcher = StatusWatcher::new(Arc::new(api), config);
    let mut changes = watcher.subscribe();

    // Baseline before the first poll, as a freshly loaded page shows it.
    watcher.update_system_status().await;
    watcher.start_polling().await;

    if let Ok(task_id) = std::env::var("TASK_ID") {
        match watcher.check_task_status(&task_id).await {
            Some(task) => tracing::info!(task_id = %task_id, task = %task.as_value(), "Task status"),
            None => tracing::warn!(task_id = %task_id, "Task status unavailable"),
        }
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl-C, shutting down");
                break;
            }
            change = changes.recv() => match change {
                Ok(change) => report(&change),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Status change observer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    watcher.shutdown().await;
}

fn report(change: &StatusChange) {
    let key = &change.key;
    let status = &change.current;

    if change.is_initial() {
        tracing::info!(key = %key, success = status.success, "Initial status");
    } else if status.success {
        tracing::info!(key = %key, "{key} check is healthy again");
    } else if status.error.trim().is_empty() {
        tracing::warn!(key = %key, "{key} check failed");
    } else {
        tracing::warn!(key = %key, error = %status.error.trim(), "{key} check failed");
    }
}
