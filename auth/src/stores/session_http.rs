//! Backend session over HTTP.
//!
//! The backend keeps its session in a cookie; this client carries a cookie
//! store so the cookie set at sign-in is sent on every request.

use crate::config::SessionConfig;
use crate::constants::session_defaults::{LOGOUT_PATH, SESSION_PATH};
use crate::error::{AuthError, Result};
use crate::providers::session::SessionBackend;
use crate::state::BackendSession;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Body of a successful `GET /auth/session`.
#[derive(Debug, Deserialize)]
struct SessionPayload {
    subject_id: String,
    expires_at: DateTime<Utc>,
}

/// [`SessionBackend`] talking to the application backend.
///
/// - `GET {base}/auth/session`: 200 with `{subject_id, expires_at}`, or 401
///   when there is no session
/// - `POST {base}/auth/logout`: 401 counts as already signed out
#[derive(Clone, Debug)]
pub struct HttpSessionBackend {
    base_url: String,
    http_client: Client,
}

impl HttpSessionBackend {
    /// Create a backend client for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if the HTTP client cannot be built.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let http_client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| AuthError::InternalError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(config, http_client))
    }

    /// Create a backend client with a preconfigured HTTP client.
    #[must_use]
    pub fn with_client(config: &SessionConfig, http_client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl SessionBackend for HttpSessionBackend {
    async fn fetch_session(&self) -> Result<Option<BackendSession>> {
        let read_failed = |reason: String| AuthError::SessionReadFailed { reason };

        let response = self
            .http_client
            .get(self.url(SESSION_PATH))
            .send()
            .await
            .map_err(|e| read_failed(format!("request failed: {e}")))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::NO_CONTENT => Ok(None),
            status if status.is_success() => {
                let payload: SessionPayload = response
                    .json()
                    .await
                    .map_err(|e| read_failed(format!("invalid session payload: {e}")))?;
                Ok(Some(BackendSession::new(payload.subject_id, payload.expires_at)))
            },
            status => Err(read_failed(format!("unexpected status {status}"))),
        }
    }

    async fn revoke(&self) -> Result<()> {
        let response = self
            .http_client
            .post(self.url(LOGOUT_PATH))
            .send()
            .await
            .map_err(|e| AuthError::SignOutFailed {
                reason: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(AuthError::SignOutFailed {
                reason: format!("unexpected status {status}"),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn backend_with(verb: &str, route: &str, response: ResponseTemplate) -> (MockServer, HttpSessionBackend) {
        let server = MockServer::start().await;
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(response)
            .mount(&server)
            .await;
        let backend = HttpSessionBackend::new(&SessionConfig::new(server.uri())).unwrap();
        (server, backend)
    }

    #[tokio::test]
    async fn test_session_payload_is_parsed() {
        let (_server, backend) = backend_with(
            "GET",
            "/auth/session",
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "subject_id": "user-42",
                "expires_at": "2025-01-01T01:00:00Z"
            })),
        )
        .await;

        let session = backend.fetch_session().await.unwrap().unwrap();

        assert_eq!(session.subject_id, "user-42");
        assert!(session.is_present);
        assert_eq!(session.expires_at.to_rfc3339(), "2025-01-01T01:00:00+00:00");
    }

    #[tokio::test]
    async fn test_unauthorized_means_no_session() {
        let (_server, backend) =
            backend_with("GET", "/auth/session", ResponseTemplate::new(401)).await;
        assert_eq!(backend.fetch_session().await, Ok(None));
    }

    #[tokio::test]
    async fn test_server_error_is_a_read_failure() {
        let (_server, backend) =
            backend_with("GET", "/auth/session", ResponseTemplate::new(503)).await;

        let error = backend.fetch_session().await.unwrap_err();

        assert!(matches!(error, AuthError::SessionReadFailed { .. }));
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn test_logout_accepts_unauthorized() {
        let (_server, backend) =
            backend_with("POST", "/auth/logout", ResponseTemplate::new(401)).await;
        assert_eq!(backend.revoke().await, Ok(()));
    }

    #[tokio::test]
    async fn test_logout_failure_is_reported() {
        let (_server, backend) =
            backend_with("POST", "/auth/logout", ResponseTemplate::new(500)).await;
        assert!(matches!(backend.revoke().await, Err(AuthError::SignOutFailed { .. })));
    }
}
