//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render as a commented TOML file
    ///
    /// Optional keys are written commented out when unset so the file still
    /// documents them. The password is never written.
    pub fn to_toml(&self) -> String {
        let live_url = match &self.live_url {
            Some(url) => format!("live_url = \"{}\"", url),
            None => "# live_url = \"ws://localhost:8011/ws\"".to_string(),
        };
        let page_size = match self.page_size {
            Some(n) => format!("page_size = {}", n),
            None => "# page_size = 50".to_string(),
        };

        format!(
            r#"# nybot-admin configuration
#
# Environment variables override this file:
#   NYBOT_API_URL, NYBOT_LIVE_URL, NYBOT_LOGIN, NYBOT_PAGE_SIZE
#   NYBOT_PASSWORD (env only), NYBOT_NO_TUI=1 (headless)

# Admin backend base URL
api_url = "{api_url}"

# Live channel endpoint (default: api_url with ws scheme + /ws)
{live_url}

# Login prefilled on the login screen
login = "{login}"

# Rows per page (default: server decides)
{page_size}

# Requests and live channel
[sync]
request_timeout_secs = {request_timeout}
connect_timeout_secs = {connect_timeout}
# Reconnect delay: min(backoff_cap_ms, backoff_step_ms * attempt)
backoff_step_ms = {backoff_step}
backoff_cap_ms = {backoff_cap}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# JSON file logging (in addition to TUI buffer or stdout)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            api_url = self.api_url,
            live_url = live_url,
            login = self.login,
            page_size = page_size,
            request_timeout = self.sync.request_timeout_secs,
            connect_timeout = self.sync.connect_timeout_secs,
            backoff_step = self.sync.backoff_step_ms,
            backoff_cap = self.sync.backoff_cap_ms,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display(),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
