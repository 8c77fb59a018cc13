// Transport module - authenticated request/response calls to the backend
//
// Every REST call in the dashboard goes through the `Transport` trait:
// - `HttpTransport` talks to the real backend over reqwest with a cookie jar
// - Tests substitute in-memory implementations
//
// The transport never retries. Retry policy belongs to callers, and only the
// live channel retries.

mod error;
mod http;

#[cfg(test)]
pub mod mock;

pub use error::TransportError;
pub use http::HttpTransport;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// HTTP method subset used by the admin API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A single backend call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, e.g. `/api/users`
    pub path: String,
    /// Query parameters in send order
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// URL-encoded query string without the leading `?`
    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish()
    }

    /// `path?query` form, used as a log label and a test key
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string())
        }
    }
}

/// Backend client contract
///
/// Implementations attach whatever credentials keep the session alive and
/// map any non-success status to `TransportError::Status`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one call and return the decoded JSON body (`Null` when empty)
    async fn call(&self, request: ApiRequest) -> Result<Value, TransportError>;

    /// `Cookie` header value for the current session, if any
    ///
    /// The live channel handshake reuses it so the push connection is
    /// authenticated by the same session as the REST calls.
    fn session_cookie(&self) -> Option<String> {
        None
    }
}

/// Shared handle passed to fetch tasks
pub type SharedTransport = Arc<dyn Transport>;

/// Decode a JSON body into a typed model
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, TransportError> {
    serde_json::from_value(value).map_err(|e| TransportError::Body(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_encodes_pairs_in_order() {
        let request = ApiRequest::get("/api/messages").with_query(vec![
            ("tg_user_id".to_string(), "123".to_string()),
            ("message_type".to_string(), "text & more".to_string()),
        ]);
        assert_eq!(
            request.query_string(),
            "tg_user_id=123&message_type=text+%26+more"
        );
        assert_eq!(
            request.target(),
            "/api/messages?tg_user_id=123&message_type=text+%26+more"
        );
    }

    #[test]
    fn test_target_without_query_is_bare_path() {
        assert_eq!(ApiRequest::get("/api/users").target(), "/api/users");
    }

    #[test]
    fn test_decode_reports_body_error() {
        let err = decode::<crate::models::SessionInfo>(serde_json::json!({"nope": 1}))
            .unwrap_err();
        assert!(matches!(err, TransportError::Body(_)));
    }
}
