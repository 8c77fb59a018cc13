// Wire models for the admin backend
//
// These mirror the JSON shapes returned by the REST endpoints. Timestamps are
// kept as the server's strings; the dashboard only displays them.

use serde::{Deserialize, Serialize};

/// Envelope returned by every list endpoint: `{"items": [...], "limit", "offset"}`
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    #[allow(dead_code)] // Echoed by the server, only items are displayed
    pub limit: Option<u32>,
    #[serde(default)]
    #[allow(dead_code)]
    pub offset: Option<u32>,
}

/// A Telegram user known to the bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub tg_user_id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    pub first_seen_at: String,
    pub last_seen_at: String,
    #[serde(default)]
    pub greetings_count: i64,
}

impl User {
    /// "First Last", whichever parts are present, or None
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// A greeting the bot sent to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Greeting {
    pub sent_at: String,
    pub tg_user_id: i64,
    pub greeting_text: String,
}

/// An inbound message the bot received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub received_at: String,
    pub tg_user_id: i64,
    pub message_type: String,
    #[serde(default)]
    pub message_text: Option<String>,
}

/// Aggregate counters from `/api/stats`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Stats {
    pub total_users: u64,
    pub total_greetings: u64,
    pub total_messages: u64,
    #[serde(default)]
    pub top_users: Vec<TopUser>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopUser {
    pub tg_user_id: i64,
    pub greetings_count: u64,
}

/// A single user with their recent activity, from `/api/users/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    pub user: User,
    #[serde(default)]
    pub greetings: Vec<Greeting>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Response of `/api/auth/me` and `/api/auth/login`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionInfo {
    pub login: String,
}
