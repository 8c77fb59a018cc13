//! Configuration for the admin client
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/nybot-admin/config.toml)
//! 3. Built-in defaults (lowest priority)

use crate::live::LiveConfig;
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod observability;
mod serialization;
mod sync;


// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use observability::{FileLogging, LogRotation, LoggingConfig};
pub use sync::{FileSync, SyncConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_API_URL: &str = "http://localhost:8011";
const DEFAULT_LOGIN: &str = "admin";

/// Largest `limit` the list endpoints accept
pub const MAX_PAGE_SIZE: u32 = 200;

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the admin backend
    pub api_url: String,

    /// Live channel endpoint; derived from `api_url` unless set
    pub live_url: Option<String>,

    /// Login name, prefilled on the login screen
    pub login: String,

    /// Password for unattended login (env only, never written to disk)
    pub password: Option<String>,

    /// Rows per page; `None` leaves it to the server
    pub page_size: Option<u32>,

    /// Whether to enable the TUI (disabled for headless mode)
    pub enable_tui: bool,

    /// Request timeouts and reconnect policy
    pub sync: SyncConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            live_url: None,
            login: DEFAULT_LOGIN.to_string(),
            password: None,
            page_size: None,
            enable_tui: true,
            sync: SyncConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub api_url: Option<String>,
    pub live_url: Option<String>,
    pub login: Option<String>,
    pub page_size: Option<u32>,

    /// Optional [sync] section
    pub sync: Option<FileSync>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/nybot-admin/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("nybot-admin").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        // Config::default().to_toml() is the single source of truth
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// A config file that exists but cannot be read or parsed is fatal.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                    eprintln!("║  CONFIG ERROR - Failed to parse configuration file          ║");
                    eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for:\n");
                    eprintln!("    - Missing quotes around string values");
                    eprintln!("    - Numbers written as strings (page_size = 50, not \"50\")");
                    eprintln!("    - Typos in section names ([sync], [logging])\n");
                    eprintln!("  To reset, run: nybot-admin config --reset\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Cannot read configuration file              ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn from_env() -> Self {
        Self::resolve(Self::load_file_config(), |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with environment lookups
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = env("NYBOT_API_URL")
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let live_url = env("NYBOT_LIVE_URL").or(file.live_url);

        let login = env("NYBOT_LOGIN")
            .or(file.login)
            .unwrap_or_else(|| DEFAULT_LOGIN.to_string());

        // Password: env only
        let password = env("NYBOT_PASSWORD").filter(|p| !p.is_empty());

        // Page size: env > file; zero means "server default"
        let page_size = env("NYBOT_PAGE_SIZE")
            .and_then(|v| v.trim().parse().ok())
            .or(file.page_size)
            .filter(|&n: &u32| n > 0)
            .map(|n| {
                if n > MAX_PAGE_SIZE {
                    eprintln!(
                        "Warning: page_size {} exceeds the server limit, using {}",
                        n, MAX_PAGE_SIZE
                    );
                }
                n.min(MAX_PAGE_SIZE)
            });

        // TUI toggle: env only (runtime flag)
        let enable_tui = env("NYBOT_NO_TUI")
            .map(|v| v != "1" && v.to_lowercase() != "true")
            .unwrap_or(true);

        Self {
            api_url,
            live_url,
            login,
            password,
            page_size,
            enable_tui,
            sync: SyncConfig::from_file(file.sync),
            logging: LoggingConfig::from_file(file.logging),
        }
    }

    /// Live channel URL: explicit setting, or `api_url` with a ws scheme + `/ws`
    pub fn live_endpoint(&self) -> Option<String> {
        match &self.live_url {
            Some(url) => Some(url.clone()),
            None => derive_live_url(&self.api_url),
        }
    }

    /// Settings for the live channel manager
    pub fn live_config(&self) -> Option<LiveConfig> {
        Some(LiveConfig {
            url: self.live_endpoint()?,
            backoff: self.sync.backoff(),
            connect_timeout: self.sync.connect_timeout(),
        })
    }
}

/// http://host:port/prefix -> ws://host:port/prefix/ws
pub fn derive_live_url(api_url: &str) -> Option<String> {
    let mut url = Url::parse(api_url).ok()?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        _ => return None,
    };
    url.set_scheme(scheme).ok()?;
    let path = format!("{}/ws", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_query(None);
    Some(url.to_string())
}
