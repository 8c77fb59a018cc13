// Startup module - banner and effective settings
//
// Printed before the TUI takes over the screen (or at the top of headless
// output). `log_startup` writes the same summary into the logs panel.

use crate::config::{Config, VERSION};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// One line of the startup summary
pub struct SettingLine {
    pub name: &'static str,
    pub value: String,
    pub ok: bool,
}

pub fn print_startup(config: &Config) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}nybot-admin{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Live operator dashboard{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    println!();

    for line in settings(config) {
        let icon = if line.ok {
            format!("{GREEN}✓{RESET}")
        } else {
            format!("{YELLOW}!{RESET}")
        };
        println!("    {icon} {:<10} {DIM}{}{RESET}", line.name, line.value);
    }
    println!();

    let mode = if config.enable_tui { "TUI" } else { "headless" };
    println!("  {MAGENTA}▸{RESET} Starting in {BOLD}{mode}{RESET} mode");
    println!();
}

fn settings(config: &Config) -> Vec<SettingLine> {
    let live = config.live_endpoint();
    vec![
        SettingLine {
            name: "api",
            value: config.api_url.clone(),
            ok: true,
        },
        SettingLine {
            name: "live",
            ok: live.is_some(),
            value: live.unwrap_or_else(|| "unavailable (bad api_url)".to_string()),
        },
        SettingLine {
            name: "login",
            value: config.login.clone(),
            ok: true,
        },
        SettingLine {
            name: "page",
            value: config
                .page_size
                .map(|n| format!("{} rows", n))
                .unwrap_or_else(|| "server default".to_string()),
            ok: true,
        },
        SettingLine {
            name: "reconnect",
            value: format!(
                "+{}ms per attempt, max {}ms",
                config.sync.backoff_step_ms, config.sync.backoff_cap_ms
            ),
            ok: true,
        },
    ]
}

/// Startup summary for the logs panel
pub fn log_startup(config: &Config) {
    tracing::info!("nybot-admin v{}", VERSION);
    for line in settings(config) {
        if line.ok {
            tracing::info!("  {} - {}", line.name, line.value);
        } else {
            tracing::warn!("  {} - {}", line.name, line.value);
        }
    }
}
