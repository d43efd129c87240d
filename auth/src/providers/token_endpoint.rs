//! OAuth token endpoint.

use crate::error::{AuthError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Who is asking for tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClient {
    /// Application (client) id.
    pub client_id: String,
    /// Tenant the application lives in.
    pub tenant_id: String,
    /// Redirect URI registered with the provider.
    pub redirect_uri: String,
    /// Space-separated scopes.
    pub scopes: String,
}

/// Authorization-code grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeExchange {
    /// Requesting client.
    pub client: TokenClient,
    /// Code returned on the redirect.
    pub code: String,
    /// PKCE verifier matching the challenge sent at authorize time.
    pub code_verifier: String,
}

/// Token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,

    /// ID token (JWT), present when `openid` was requested.
    #[serde(default)]
    pub id_token: Option<String>,

    /// Refresh token, present when `offline_access` was requested.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds.
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

const fn default_expires_in() -> i64 {
    3600
}

/// Error body returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth token endpoint.
///
/// # Implementation Notes
///
/// - Code exchange failures map to `AuthError::RedirectCompletionFailed`
/// - Refresh failures map to `AuthError::SilentRefreshFailed`
pub trait TokenEndpoint: Send + Sync {
    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RedirectCompletionFailed` if the request fails or
    /// the provider rejects the code.
    fn exchange_code(
        &self,
        request: &CodeExchange,
    ) -> impl std::future::Future<Output = Result<TokenResponse>> + Send;

    /// Redeem a refresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SilentRefreshFailed` if the request fails or the
    /// provider rejects the token.
    fn refresh(
        &self,
        client: &TokenClient,
        refresh_token: &str,
    ) -> impl std::future::Future<Output = Result<TokenResponse>> + Send;
}

/// Token endpoint reached over HTTP.
///
/// Posts form-encoded grants to `{authority}/{tenant}/oauth2/v2.0/token`.
///
/// # Example
///
/// ```no_run
/// use authgate::providers::HttpTokenEndpoint;
///
/// let endpoint = HttpTokenEndpoint::new("https://login.microsoftonline.com");
/// ```
#[derive(Clone, Debug)]
pub struct HttpTokenEndpoint {
    /// Login authority, without trailing slash.
    authority: String,

    /// HTTP client for making requests.
    http_client: Client,
}

impl HttpTokenEndpoint {
    /// Create an endpoint for `authority`.
    #[must_use]
    pub fn new(authority: impl Into<String>) -> Self {
        Self::with_client(authority, Client::new())
    }

    /// Create an endpoint with a preconfigured HTTP client.
    #[must_use]
    pub fn with_client(authority: impl Into<String>, http_client: Client) -> Self {
        let authority = authority.into().trim_end_matches('/').to_string();
        Self {
            authority,
            http_client,
        }
    }

    /// Token URL for `tenant_id`.
    #[must_use]
    pub fn token_url(&self, tenant_id: &str) -> String {
        format!("{}/{tenant_id}/oauth2/v2.0/token", self.authority)
    }

    async fn post_grant(&self, tenant_id: &str, params: &[(&str, &str)]) -> std::result::Result<TokenResponse, String> {
        let response = self
            .http_client
            .post(self.token_url(tenant_id))
            .form(params)
            .send()
            .await
            .map_err(|e| format!("token request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(error) => match error.error_description {
                    Some(description) => format!("{}: {description}", error.error),
                    None => error.error,
                },
                Err(_) => format!("token endpoint returned {status}"),
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| format!("invalid token response: {e}"))
    }
}

impl TokenEndpoint for HttpTokenEndpoint {
    async fn exchange_code(&self, request: &CodeExchange) -> Result<TokenResponse> {
        let params = [
            ("client_id", request.client.client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("code", request.code.as_str()),
            ("redirect_uri", request.client.redirect_uri.as_str()),
            ("code_verifier", request.code_verifier.as_str()),
            ("scope", request.client.scopes.as_str()),
        ];

        self.post_grant(&request.client.tenant_id, &params)
            .await
            .map_err(|reason| AuthError::RedirectCompletionFailed { reason })
    }

    async fn refresh(&self, client: &TokenClient, refresh_token: &str) -> Result<TokenResponse> {
        let params = [
            ("client_id", client.client_id.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("scope", client.scopes.as_str()),
        ];

        self.post_grant(&client.tenant_id, &params)
            .await
            .map_err(|reason| AuthError::SilentRefreshFailed { reason })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> TokenClient {
        TokenClient {
            client_id: "client-1".to_string(),
            tenant_id: "tenant-1".to_string(),
            redirect_uri: "http://localhost:3000".to_string(),
            scopes: "openid offline_access".to_string(),
        }
    }

    #[test]
    fn test_token_url_trims_trailing_slash() {
        let endpoint = HttpTokenEndpoint::new("https://login.example.com/");
        assert_eq!(
            endpoint.token_url("tenant-1"),
            "https://login.example.com/tenant-1/oauth2/v2.0/token"
        );
    }

    #[tokio::test]
    async fn test_exchange_code_posts_pkce_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code_verifier=verifier-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at",
                "id_token": "header.payload.sig",
                "refresh_token": "rt",
                "expires_in": 1800
            })))
            .mount(&server)
            .await;

        let endpoint = HttpTokenEndpoint::new(server.uri());
        let tokens = endpoint
            .exchange_code(&CodeExchange {
                client: client(),
                code: "code-1".to_string(),
                code_verifier: "verifier-1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(tokens.access_token, "at");
        assert_eq!(tokens.refresh_token.as_deref(), Some("rt"));
        assert_eq!(tokens.expires_in, 1800);
    }

    #[tokio::test]
    async fn test_provider_rejection_maps_to_silent_refresh_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "refresh token expired"
            })))
            .mount(&server)
            .await;

        let endpoint = HttpTokenEndpoint::new(server.uri());
        let error = endpoint.refresh(&client(), "stale").await.unwrap_err();

        assert_eq!(
            error,
            AuthError::SilentRefreshFailed {
                reason: "invalid_grant: refresh token expired".to_string()
            }
        );
    }
}
