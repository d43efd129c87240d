//! Mock token endpoint for testing.

use crate::error::{AuthError, Result};
use crate::providers::token_endpoint::{CodeExchange, TokenClient, TokenEndpoint, TokenResponse};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct Script {
    exchanges: VecDeque<Result<TokenResponse>>,
    refreshes: VecDeque<Result<TokenResponse>>,
    exchange_requests: Vec<CodeExchange>,
    refresh_requests: Vec<String>,
}

/// Mock token endpoint.
///
/// Answers with scripted responses, oldest first, and records every
/// request. An unscripted call fails.
#[derive(Debug, Clone, Default)]
pub struct MockTokenEndpoint {
    script: Arc<Mutex<Script>>,
}

impl MockTokenEndpoint {
    /// Create a mock with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Token response whose ID token names account `oid` in tenant `tid`.
    ///
    /// Lifetime one hour, with a refresh token.
    #[must_use]
    pub fn tokens_for(oid: &str, tid: &str) -> TokenResponse {
        let claims = serde_json::json!({
            "oid": oid,
            "tid": tid,
            "sub": format!("sub-{oid}"),
            "preferred_username": format!("{oid}@example.com"),
        });
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());

        TokenResponse {
            access_token: format!("access-{oid}"),
            id_token: Some(format!("e30.{payload}.signature")),
            refresh_token: Some(format!("refresh-{oid}")),
            expires_in: 3600,
        }
    }

    /// Queue the answer to the next code exchange.
    pub fn push_exchange(&self, response: Result<TokenResponse>) {
        self.lock().exchanges.push_back(response);
    }

    /// Queue the answer to the next refresh.
    pub fn push_refresh(&self, response: Result<TokenResponse>) {
        self.lock().refreshes.push_back(response);
    }

    /// Code exchanges received so far.
    #[must_use]
    pub fn exchanges(&self) -> Vec<CodeExchange> {
        self.lock().exchange_requests.clone()
    }

    /// Number of code exchanges received.
    #[must_use]
    pub fn exchange_count(&self) -> usize {
        self.lock().exchange_requests.len()
    }

    /// Number of refreshes received.
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.lock().refresh_requests.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenEndpoint for MockTokenEndpoint {
    async fn exchange_code(&self, request: &CodeExchange) -> Result<TokenResponse> {
        let mut script = self.lock();
        script.exchange_requests.push(request.clone());
        script.exchanges.pop_front().unwrap_or_else(|| {
            Err(AuthError::RedirectCompletionFailed {
                reason: "no scripted token response".to_string(),
            })
        })
    }

    async fn refresh(&self, _client: &TokenClient, refresh_token: &str) -> Result<TokenResponse> {
        let mut script = self.lock();
        script.refresh_requests.push(refresh_token.to_string());
        script.refreshes.pop_front().unwrap_or_else(|| {
            Err(AuthError::SilentRefreshFailed {
                reason: "no scripted token response".to_string(),
            })
        })
    }
}
