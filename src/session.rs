// Session gate - login, logout and the startup session probe
//
// The server keeps the session in an HttpOnly cookie, so the gate never sees
// a token; it only reports who is logged in.

use crate::models::SessionInfo;
use crate::transport::{decode, ApiRequest, SharedTransport, TransportError};
use serde_json::json;

pub struct SessionGate {
    transport: SharedTransport,
}

impl SessionGate {
    pub fn new(transport: SharedTransport) -> Self {
        Self { transport }
    }

    /// Check for an existing session
    ///
    /// Any failure, including an unreachable server, means "not logged in".
    pub async fn probe(&self) -> Option<SessionInfo> {
        match self.transport.call(ApiRequest::get("/api/auth/me")).await {
            Ok(body) => match decode::<SessionInfo>(body) {
                Ok(info) => Some(info),
                Err(e) => {
                    tracing::warn!("Unexpected /api/auth/me response: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::debug!("No active session: {}", e);
                None
            }
        }
    }

    /// Log in with `login` / `password`
    ///
    /// # Errors
    /// `TransportError::Status` with 401 for bad credentials; any other
    /// transport failure otherwise.
    pub async fn login(&self, login: &str, password: &str) -> Result<SessionInfo, TransportError> {
        let request = ApiRequest::post(
            "/api/auth/login",
            Some(json!({ "login": login, "password": password })),
        );
        let body = self.transport.call(request).await?;
        let info = decode::<SessionInfo>(body)?;
        tracing::info!("Logged in as {}", info.login);
        Ok(info)
    }

    pub async fn logout(&self) -> Result<(), TransportError> {
        self.transport
            .call(ApiRequest::post("/api/auth/logout", None))
            .await?;
        tracing::info!("Logged out");
        Ok(())
    }
}

/// Short message for a failed login attempt
pub fn login_error_message(err: &TransportError) -> String {
    match err {
        TransportError::Status { status: 401, .. } => "Invalid login or password".to_string(),
        TransportError::Status { status, .. } => format!("Login failed (HTTP {})", status),
        TransportError::Timeout => "Login timed out".to_string(),
        other => format!("Login failed: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use std::sync::Arc;

    fn gate() -> (Arc<MockTransport>, SessionGate) {
        let mock = Arc::new(MockTransport::new());
        let gate = SessionGate::new(mock.clone());
        (mock, gate)
    }

    #[tokio::test]
    async fn test_probe_reports_existing_session() {
        let (mock, gate) = gate();
        mock.reply("/api/auth/me", json!({ "login": "admin" }));
        let info = gate.probe().await.unwrap();
        assert_eq!(info.login, "admin");
    }

    #[tokio::test]
    async fn test_probe_failure_means_logged_out() {
        let (mock, gate) = gate();
        mock.fail(
            "/api/auth/me",
            TransportError::Status {
                status: 401,
                body: String::new(),
            },
        );
        assert!(gate.probe().await.is_none());

        mock.fail("/api/auth/me", TransportError::Network("refused".to_string()));
        assert!(gate.probe().await.is_none());
    }

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let (mock, gate) = gate();
        mock.reply("/api/auth/login", json!({ "ok": true, "login": "admin" }));

        let info = gate.login("admin", "secret").await.unwrap();
        assert_eq!(info.login, "admin");
        assert_eq!(mock.count("/api/auth/login"), 1);
    }

    #[tokio::test]
    async fn test_rejected_login() {
        let (mock, gate) = gate();
        let err = TransportError::Status {
            status: 401,
            body: r#"{"detail":"Invalid credentials"}"#.to_string(),
        };
        mock.fail("/api/auth/login", err.clone());

        let result = gate.login("admin", "wrong").await;
        assert_eq!(result, Err(err.clone()));
        assert_eq!(login_error_message(&err), "Invalid login or password");
    }

    #[tokio::test]
    async fn test_logout_calls_endpoint() {
        let (mock, gate) = gate();
        mock.reply("/api/auth/logout", json!({ "ok": true }));
        gate.logout().await.unwrap();
        assert_eq!(mock.targets(), vec!["/api/auth/logout"]);
    }
}
