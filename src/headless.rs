// Headless mode - dashboard without a terminal UI
//
// Establishes a session (existing cookie or configured credentials), loads
// every view, then logs each applied update until Ctrl+C.

use crate::config::Config;
use crate::dashboard::{Dashboard, FetchTarget, Update, ViewKind};
use crate::session::{login_error_message, SessionGate};
use crate::transport::SharedTransport;
use anyhow::{anyhow, Context, Result};

pub async fn run(config: Config, transport: SharedTransport) -> Result<()> {
    let gate = SessionGate::new(transport.clone());

    let session = match gate.probe().await {
        Some(info) => info,
        None => {
            let password = config
                .password
                .as_deref()
                .context("No active session and NYBOT_PASSWORD is not set")?;
            gate.login(&config.login, password)
                .await
                .map_err(|e| anyhow!(login_error_message(&e)))?
        }
    };
    tracing::info!("Session active for {}", session.login);

    let (mut dashboard, mut events) = Dashboard::new(transport, config.page_size);
    match config.live_config() {
        Some(live) => dashboard.start_live(live),
        None => tracing::warn!(
            "Cannot derive a live channel URL from {}; push updates disabled",
            config.api_url
        ),
    }

    for view in ViewKind::ALL {
        dashboard.reload(view);
    }
    dashboard.refresh_stats();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(event) = events.recv() => {
                let update = dashboard.handle(event);
                log_update(&dashboard, &update);
            }
        }
    }

    tracing::info!("Shutting down...");
    dashboard.shutdown().await;
    Ok(())
}

fn log_update(dashboard: &Dashboard, update: &Update) {
    match update {
        Update::Applied { view, rows } => {
            tracing::info!("{}: {} row(s)", view.title(), rows);
        }
        Update::StatsLoaded => {
            if let Some(stats) = dashboard.stats() {
                tracing::info!(
                    "Stats: {} users, {} greetings, {} messages",
                    stats.total_users,
                    stats.total_greetings,
                    stats.total_messages
                );
                let top: Vec<String> = stats
                    .top_users
                    .iter()
                    .map(|u| format!("{} ({})", u.tg_user_id, u.greetings_count))
                    .collect();
                if !top.is_empty() {
                    tracing::info!("Top users: {}", top.join(", "));
                }
            }
        }
        Update::Failed { target, error } => {
            if let FetchTarget::View(view) = target {
                tracing::warn!("{} not updated: {}", view.title(), error);
            }
        }
        Update::Reloading(view) => tracing::debug!("{} changed upstream", view.title()),
        Update::Connection(state) => tracing::info!("Live channel {}", state),
        Update::DetailLoaded(_) | Update::Ignored => {}
    }
}
