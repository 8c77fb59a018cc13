//! reqwest-backed transport

use super::{ApiRequest, Method, Transport, TransportError};
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Transport for the admin backend
///
/// The cookie jar is shared with the client so the `session_token` set by
/// `/api/auth/login` is replayed on every later call, and can be read back
/// for the live channel handshake.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    jar: Arc<Jar>,
}

impl HttpTransport {
    /// Create a transport for `base_url` with a per-request timeout
    ///
    /// # Errors
    /// Returns an error if the URL is not absolute http(s) or the client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                base_url.scheme()
            )));
        }

        // Joining relative paths needs a trailing slash, otherwise the last
        // segment of a prefixed base (http://host/admin) is dropped
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!("HTTP transport ready for {} (timeout {:?})", base_url, timeout);

        Ok(Self {
            client,
            base_url,
            jar,
        })
    }

    /// Resolve a request against the base URL, query included
    fn endpoint(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let mut url = self
            .base_url
            .join(request.path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let url = self.endpoint(&request)?;
        tracing::trace!("{:?} {}", request.method, url);

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        builder = builder.header(CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(TransportError::from_reqwest)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(TransportError::from_reqwest)?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Body(e.to_string()))
    }

    fn session_cookie(&self) -> Option<String> {
        self.jar
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }
}
