//! `kanbox` - headless triage board runner
//!
//! Loads the configuration, fetches the mailbox list, the first inbox page
//! and the kanban board, and keeps snooze timers running until interrupted.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use kanbox_core::{Coordinator, EngineConfig, Notification, SnoozeService};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kanbox=debug,kanbox_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting kanbox");

    let path = std::env::args_os()
        .nth(1)
        .map_or_else(EngineConfig::default_path, PathBuf::from);
    let config = EngineConfig::load(&path)
        .await
        .with_context(|| format!("failed to load {}", path.display()))?;
    let coordinator = Coordinator::new(config.http_api()?);

    let mailboxes = coordinator
        .load_mailboxes()
        .await
        .context("failed to load mailboxes")?;
    for mailbox in &mailboxes {
        info!("{}: {}", mailbox.name, mailbox.display_count());
    }

    let inbox = coordinator
        .load_emails(config.list_query("INBOX"))
        .await
        .context("failed to load inbox")?;
    info!(
        "Inbox page {}/{}: {} emails",
        inbox.page,
        inbox.total_pages,
        inbox.emails.len()
    );

    let board = coordinator
        .load_board(config.board.clone())
        .await
        .context("failed to load board")?;
    for column in &board.columns {
        info!("[{}] {} ({})", column.key, column.name, column.email_count);
    }
    let now = coordinator.now();
    for entry in coordinator.timers().list() {
        info!("\"{}\" returns in {}", entry.subject, entry.countdown(now));
    }

    let mut notifications = coordinator.subscribe_notifications();
    let reporter = tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(Notification::ActionFailed { message, .. }) => warn!("{}", message),
                Ok(Notification::SnoozeExpired { email }) => info!("{} is back from Frozen", email),
                Err(RecvError::Lagged(skipped)) => warn!("Missed {} notifications", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let snooze = SnoozeService::new(coordinator.clone(), config.snooze_tick()).spawn();

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("Shutting down");

    snooze.stop().await;
    reporter.abort();
    Ok(())
}
