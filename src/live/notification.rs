//! Push notifications received over the live channel

use super::DecodeError;
use serde_json::{Map, Value};

/// Notification kinds the dashboard reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    UserUpserted,
    GreetingSent,
    MessageReceived,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 3] = [
        NotificationKind::UserUpserted,
        NotificationKind::GreetingSent,
        NotificationKind::MessageReceived,
    ];

    /// Wire name in the frame's `type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserUpserted => "user_upserted",
            Self::GreetingSent => "greeting_sent",
            Self::MessageReceived => "message_received",
        }
    }

    pub fn parse(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == kind)
    }
}

/// A decoded `{ "type": ..., ...payload }` frame
///
/// `kind` is kept as a string: unknown kinds are valid and simply have no
/// dispatch target.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: String,
    /// Every field except `type`
    pub payload: Map<String, Value>,
}

impl Notification {
    /// Decode one text frame
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| DecodeError::Json(e.to_string()))?;
        let Value::Object(mut payload) = value else {
            return Err(DecodeError::NotAnObject);
        };
        let kind = match payload.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(DecodeError::MissingType),
        };
        Ok(Self { kind, payload })
    }
}
