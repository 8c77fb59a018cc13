// CLI module - command-line argument parsing and handlers
//
// Provides subcommands for configuration management:
// - config --show: Display effective configuration
// - config --path: Show the config file location
// - config --reset: Regenerate config file with defaults

use crate::config::{Config, VERSION};
use clap::{Parser, Subcommand};
use std::io::Write;

/// Operator dashboard for the New Year greeting bot
#[derive(Parser)]
#[command(name = "nybot-admin")]
#[command(version = VERSION)]
#[command(about = "Live operator dashboard for the greeting bot", long_about = None)]
pub struct Cli {
    /// Run without the TUI, logging every update to stdout
    #[arg(long)]
    pub headless: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Parse arguments and run any config subcommand
///
/// Returns `None` when a subcommand was handled and the process should exit.
pub fn handle_cli() -> Option<Cli> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { show, reset, path }) => {
            if path {
                handle_config_path();
            } else if show {
                handle_config_show();
            } else if reset {
                handle_config_reset();
            } else {
                println!("Usage: nybot-admin config [--show|--reset|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --path    Show config file path");
            }
            None
        }
        None => Some(cli),
    }
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!("api_url = {:?}", config.api_url);
    match config.live_endpoint() {
        Some(url) if config.live_url.is_some() => println!("live_url = {:?}", url),
        Some(url) => println!("live_url = {:?}  # derived", url),
        None => println!("# live_url: cannot derive from api_url"),
    }
    println!("login = {:?}", config.login);
    println!(
        "# password: {}",
        if config.password.is_some() {
            "set via NYBOT_PASSWORD"
        } else {
            "not set"
        }
    );
    match config.page_size {
        Some(n) => println!("page_size = {}", n),
        None => println!("# page_size: server default"),
    }
    println!();
    println!("[sync]");
    println!("request_timeout_secs = {}", config.sync.request_timeout_secs);
    println!("connect_timeout_secs = {}", config.sync.connect_timeout_secs);
    println!("backoff_step_ms = {}", config.sync.backoff_step_ms);
    println!("backoff_cap_ms = {}", config.sync.backoff_cap_ms);
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!("file_enabled = {}", config.logging.file_enabled);
    println!("file_rotation = {:?}", config.logging.file_rotation.as_str());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        let _ = std::io::stderr().flush();

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err()
            || !input.trim().eq_ignore_ascii_case("y")
        {
            println!("Aborted.");
            return;
        }
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}
