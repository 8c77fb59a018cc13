//! Sync configuration: request timeout, live channel handshake and backoff

use crate::live::BackoffPolicy;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Per-request timeout for REST calls
    pub request_timeout_secs: u64,
    /// Live channel handshake timeout
    pub connect_timeout_secs: u64,
    /// Reconnect delay grows by this much per failed attempt
    pub backoff_step_ms: u64,
    /// Reconnect delay ceiling
    pub backoff_cap_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            connect_timeout_secs: 10,
            backoff_step_ms: 500,
            backoff_cap_ms: 5000,
        }
    }
}

/// Sync settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileSync {
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub backoff_step_ms: Option<u64>,
    pub backoff_cap_ms: Option<u64>,
}

impl SyncConfig {
    pub fn from_file(file: Option<FileSync>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            connect_timeout_secs: file
                .connect_timeout_secs
                .unwrap_or(defaults.connect_timeout_secs),
            backoff_step_ms: file.backoff_step_ms.unwrap_or(defaults.backoff_step_ms),
            backoff_cap_ms: file.backoff_cap_ms.unwrap_or(defaults.backoff_cap_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    /// A zero step falls back to the default; a cap below the step is raised
    /// to the step
    pub fn backoff(&self) -> BackoffPolicy {
        let step_ms = match self.backoff_step_ms {
            0 => Self::default().backoff_step_ms,
            n => n,
        };
        let step = Duration::from_millis(step_ms);
        let cap = Duration::from_millis(self.backoff_cap_ms).max(step);
        BackoffPolicy { step, cap }
    }
}
