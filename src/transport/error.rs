//! Transport error types

use std::fmt;

/// Errors returned by a backend call
///
/// Callers only distinguish success from failure; the variants exist for
/// logging and for the user-visible message.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The backend answered with a non-success status
    Status { status: u16, body: String },
    /// The request never produced a response (DNS, refused, reset, ...)
    Network(String),
    /// The request exceeded the configured timeout
    Timeout,
    /// A success response whose body could not be decoded
    Body(String),
    /// The configured base URL or request path is unusable
    InvalidUrl(String),
}

impl TransportError {
    /// Classify a reqwest failure
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, body } => {
                if body.is_empty() {
                    write!(f, "HTTP {}", status)
                } else {
                    write!(f, "HTTP {}: {}", status, body)
                }
            }
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::Timeout => write!(f, "Request timed out"),
            Self::Body(msg) => write!(f, "Invalid response body: {}", msg),
            Self::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}
