//! Live channel error types

use std::fmt;
use std::time::Duration;

/// Why a live connection ended or never opened
///
/// Never fatal: every variant leads back to the reconnect path and is only
/// visible to the operator as connection state.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelError {
    /// The endpoint URL or handshake headers are malformed
    InvalidEndpoint(String),
    /// Handshake failed (refused, rejected, HTTP error)
    Connect(String),
    /// Handshake did not finish in time
    ConnectTimeout(Duration),
    /// Read error on an open connection
    Stream(String),
    /// The server sent a close frame (code and reason, if any)
    ClosedByServer(Option<String>),
    /// The stream ended without a close frame
    EndOfStream,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEndpoint(msg) => write!(f, "invalid live endpoint: {}", msg),
            Self::Connect(msg) => write!(f, "connect failed: {}", msg),
            Self::ConnectTimeout(timeout) => write!(f, "connect timed out after {:?}", timeout),
            Self::Stream(msg) => write!(f, "stream error: {}", msg),
            Self::ClosedByServer(Some(reason)) => write!(f, "closed by server ({})", reason),
            Self::ClosedByServer(None) => write!(f, "closed by server"),
            Self::EndOfStream => write!(f, "connection dropped"),
        }
    }
}

impl std::error::Error for ChannelError {}

/// An inbound frame that is not a notification
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Not valid JSON
    Json(String),
    /// Valid JSON but not an object
    NotAnObject,
    /// Object without a string `type` field
    MissingType,
    /// Binary frame that is not UTF-8
    NotUtf8,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "malformed notification: {}", msg),
            Self::NotAnObject => write!(f, "notification is not a JSON object"),
            Self::MissingType => write!(f, "notification has no string 'type'"),
            Self::NotUtf8 => write!(f, "binary frame is not UTF-8"),
        }
    }
}

impl std::error::Error for DecodeError {}
