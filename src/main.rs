// nybot-admin - live operator dashboard for the greeting bot
//
// Reads users, greetings and messages from the admin backend and keeps the
// views current from server push notifications.
//
// Architecture:
// - Transport (reqwest): JSON request/response with a cookie-backed session
// - Live channel (tokio-tungstenite): reconnecting push connection whose
//   notifications are routed to view reloads
// - Dashboard: per-view controllers with filters, paging and
//   latest-issued-wins reload ordering
// - TUI (ratatui) or headless logging on top of the dashboard
// - Event system: mpsc channels connect background tasks to the UI loop

mod cli;
mod config;
mod dashboard;
mod headless;
mod live;
mod logging;
mod models;
mod session;
mod startup;
mod transport;
mod tui;

use anyhow::{Context, Result};
use config::Config;
use logging::LogBuffer;
use std::sync::Arc;
use transport::{HttpTransport, SharedTransport};

#[tokio::main]
async fn main() -> Result<()> {
    // Config subcommands exit here
    let Some(cli) = cli::handle_cli() else {
        return Ok(());
    };

    Config::ensure_config_exists();
    let mut config = Config::from_env();
    if cli.headless {
        config.enable_tui = false;
    }

    // In TUI mode logs go to the in-memory buffer shown by the logs panel;
    // in headless mode they go to stdout. Keep the guard so files flush.
    let log_buffer = LogBuffer::new();
    let _file_guard = logging::init(
        &config.logging,
        config.enable_tui.then(|| log_buffer.clone()),
    );

    startup::print_startup(&config);
    startup::log_startup(&config);

    let transport: SharedTransport = Arc::new(
        HttpTransport::new(&config.api_url, config.sync.request_timeout())
            .with_context(|| format!("Invalid api_url {:?}", config.api_url))?,
    );

    if config.enable_tui {
        tracing::info!("Starting TUI");
        if let Err(e) = tui::run_tui(config, transport, log_buffer).await {
            tracing::error!("TUI error: {:?}", e);
            return Err(e);
        }
    } else {
        tracing::info!("TUI disabled, running in headless mode");
        headless::run(config, transport).await?;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
