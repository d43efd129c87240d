//! Redirect-based identity client.
//!
//! # Flow
//!
//! ```text
//! 1. begin_login_redirect → store pending request (state + PKCE verifier) → navigate to provider
//! 2. User signs in at the provider, which navigates back with #code=…&state=…
//! 3. complete_redirect_if_present → strip params, consume pending request,
//!    check state, exchange code → IdentitySession
//! ```
//!
//! Step 3 runs on every page load; a location without a response is the
//! common case and resolves to `NoRedirectPending`.

use crate::config::{IdentityConfig, ProviderIdentifiers};
use crate::constants::{PENDING_REQUEST_KEY, TOKEN_EXPIRY_SKEW};
use crate::error::{AuthError, ErrorDescriptor, Result};
use crate::providers::identity::IdentityClient;
use crate::providers::navigation::Navigation;
use crate::providers::token_endpoint::{CodeExchange, TokenClient, TokenEndpoint, TokenResponse};
use crate::state::{IdentitySession, RedirectOutcome};
use crate::utils::{self, decode_id_token_claims, RedirectParams};
use authgate_core::environment::{Clock, SystemClock};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Request stored in navigation-scoped storage while the user is at the
/// provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PendingRequest {
    state: String,
    code_verifier: String,
}

/// Tokens and session of the signed-in account.
#[derive(Debug, Clone)]
struct CachedAccount {
    session: IdentitySession,
    refresh_token: Option<String>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClientMode {
    Uninitialized,
    Degraded,
    Ready(ProviderIdentifiers),
}

#[derive(Debug)]
struct ClientInner {
    mode: ClientMode,
    account: Option<CachedAccount>,
}

/// Identity client for redirect-based OAuth with PKCE.
///
/// Clones share configuration and the cached account.
///
/// # Example
///
/// ```no_run
/// use authgate::config::IdentityConfig;
/// use authgate::providers::{HttpTokenEndpoint, InMemoryNavigation, RedirectIdentityClient};
///
/// let config = IdentityConfig::from_env();
/// let client = RedirectIdentityClient::new(
///     &config,
///     InMemoryNavigation::at("http://localhost:3000/"),
///     HttpTokenEndpoint::new(config.authority.clone()),
/// );
/// ```
pub struct RedirectIdentityClient<N, T> {
    navigation: N,
    endpoint: T,
    authority: String,
    redirect_uri: String,
    scopes: String,
    clock: Arc<dyn Clock>,
    inner: Arc<Mutex<ClientInner>>,
}

impl<N, T> RedirectIdentityClient<N, T>
where
    N: Navigation,
    T: TokenEndpoint,
{
    /// Create an uninitialized client.
    #[must_use]
    pub fn new(config: &IdentityConfig, navigation: N, endpoint: T) -> Self {
        Self {
            navigation,
            endpoint,
            authority: config.authority.trim_end_matches('/').to_string(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
            clock: Arc::new(SystemClock),
            inner: Arc::new(Mutex::new(ClientInner {
                mode: ClientMode::Uninitialized,
                account: None,
            })),
        }
    }

    /// Use `clock` for token expiry.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Whether the client initialized with usable identifiers.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.lock().mode, ClientMode::Ready(_))
    }

    /// Whether the client initialized with missing identifiers.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.lock().mode == ClientMode::Degraded
    }

    fn lock(&self) -> MutexGuard<'_, ClientInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn token_client(&self, ids: &ProviderIdentifiers) -> TokenClient {
        TokenClient {
            client_id: ids.client_id.clone(),
            tenant_id: ids.tenant_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scopes: self.scopes.clone(),
        }
    }

    fn authorize_url(&self, ids: &ProviderIdentifiers, request: &PendingRequest) -> Result<String> {
        let challenge = utils::pkce_challenge(&request.code_verifier);
        let params = [
            ("client_id", ids.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_mode", "fragment"),
            ("scope", self.scopes.as_str()),
            ("state", request.state.as_str()),
            ("code_challenge", challenge.as_str()),
            ("code_challenge_method", "S256"),
        ];

        let query = serde_urlencoded::to_string(params)
            .map_err(|e| AuthError::InternalError(format!("Failed to build URL: {e}")))?;

        Ok(format!(
            "{}/{}/oauth2/v2.0/authorize?{query}",
            self.authority, ids.tenant_id
        ))
    }

    /// Turn a token response into a cached account.
    ///
    /// `previous` supplies the identity when a refresh response carries no
    /// ID token.
    fn account_from_tokens(
        &self,
        tokens: TokenResponse,
        previous: Option<&IdentitySession>,
    ) -> std::result::Result<CachedAccount, String> {
        let now = self.clock.now();

        let session = match tokens.id_token.as_deref() {
            Some(id_token) => {
                let claims = decode_id_token_claims(id_token)?;
                let account = claims
                    .account_identifier()
                    .ok_or_else(|| "id token has no account identifier".to_string())?;
                let session = IdentitySession::new(account, now);
                match claims.preferred_username {
                    Some(username) => session.with_username(username),
                    None => session,
                }
            },
            None => match previous {
                Some(previous) => IdentitySession {
                    acquired_at: now,
                    ..previous.clone()
                },
                None => return Err("token response has no id token".to_string()),
            },
        };

        let expires_at = Duration::try_seconds(tokens.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| format!("token lifetime out of range: {}s", tokens.expires_in))?;

        Ok(CachedAccount {
            session,
            refresh_token: tokens.refresh_token,
            expires_at,
        })
    }

    /// Validate the redirect against the pending request and redeem the code.
    async fn redeem(
        &self,
        ids: &ProviderIdentifiers,
        params: RedirectParams,
        pending: Option<String>,
    ) -> std::result::Result<IdentitySession, ErrorDescriptor> {
        if let Some(error) = params.error {
            let reason = match params.error_description {
                Some(description) => format!("{error}: {description}"),
                None => error,
            };
            return Err(ErrorDescriptor::redirect_failed(reason));
        }

        let pending: PendingRequest = pending
            .ok_or_else(|| ErrorDescriptor::redirect_failed("no pending sign-in request"))
            .and_then(|raw| {
                serde_json::from_str(&raw)
                    .map_err(|_| ErrorDescriptor::redirect_failed("pending sign-in request is corrupt"))
            })?;

        let state_matches = params.state.as_deref().is_some_and(|returned| {
            constant_time_eq::constant_time_eq(returned.as_bytes(), pending.state.as_bytes())
        });
        if !state_matches {
            return Err(ErrorDescriptor::redirect_failed("state mismatch"));
        }

        let code = params
            .code
            .ok_or_else(|| ErrorDescriptor::redirect_failed("missing authorization code"))?;

        let tokens = self
            .endpoint
            .exchange_code(&CodeExchange {
                client: self.token_client(ids),
                code,
                code_verifier: pending.code_verifier,
            })
            .await
            .map_err(|e| e.descriptor())?;

        let account = self
            .account_from_tokens(tokens, None)
            .map_err(ErrorDescriptor::redirect_failed)?;
        let session = account.session.clone();
        self.lock().account = Some(account);
        Ok(session)
    }
}

impl<N, T> Clone for RedirectIdentityClient<N, T>
where
    N: Clone,
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            navigation: self.navigation.clone(),
            endpoint: self.endpoint.clone(),
            authority: self.authority.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scopes: self.scopes.clone(),
            clock: Arc::clone(&self.clock),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N, T> std::fmt::Debug for RedirectIdentityClient<N, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectIdentityClient")
            .field("authority", &self.authority)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

impl<N, T> IdentityClient for RedirectIdentityClient<N, T>
where
    N: Navigation,
    T: TokenEndpoint,
{
    async fn initialize(&self, client_id: &str, tenant_id: &str) -> Result<()> {
        let config = IdentityConfig {
            client_id: Some(client_id.to_string()),
            tenant_id: Some(tenant_id.to_string()),
            ..IdentityConfig::default()
        };

        let mut inner = self.lock();
        let Some(ids) = config.provider_identifiers() else {
            tracing::warn!("Identity client initialized without identifiers; running degraded");
            inner.mode = ClientMode::Degraded;
            inner.account = None;
            return Err(AuthError::Misconfigured {
                reason: "client id and tenant id are required".to_string(),
            });
        };

        if inner.mode == ClientMode::Ready(ids.clone()) {
            tracing::debug!("Identity client already initialized");
            return Ok(());
        }

        tracing::info!(tenant_id = %ids.tenant_id, "Identity client initialized");
        inner.mode = ClientMode::Ready(ids);
        inner.account = None;
        Ok(())
    }

    async fn complete_redirect_if_present(&self) -> Result<RedirectOutcome> {
        let mode = self.lock().mode.clone();
        let ids = match mode {
            ClientMode::Uninitialized => {
                tracing::error!("Redirect completion attempted before initialization");
                return Err(AuthError::NotInitialized);
            },
            ClientMode::Degraded => return Ok(RedirectOutcome::NoRedirectPending),
            ClientMode::Ready(ids) => ids,
        };

        let location = self.navigation.location();
        let Some((params, at)) = utils::parse_redirect(&location) else {
            tracing::trace!("No redirect response in location");
            return Ok(RedirectOutcome::NoRedirectPending);
        };

        // Consume the response before doing anything that can fail.
        self.navigation
            .replace_location(&utils::strip_redirect(&location, at));
        let pending = self.navigation.take_marker(PENDING_REQUEST_KEY);

        match self.redeem(&ids, params, pending).await {
            Ok(session) => {
                tracing::info!(account = %session.account_identifier, "Redirect completed");
                Ok(RedirectOutcome::Completed(session))
            },
            Err(error) => {
                tracing::warn!(error = %error, "Redirect completion failed");
                Ok(RedirectOutcome::Failed(error))
            },
        }
    }

    async fn acquire_token_silent(&self) -> Result<Option<IdentitySession>> {
        let (ids, account) = {
            let inner = self.lock();
            match &inner.mode {
                ClientMode::Uninitialized => return Err(AuthError::NotInitialized),
                ClientMode::Degraded => return Ok(None),
                ClientMode::Ready(ids) => (ids.clone(), inner.account.clone()),
            }
        };

        let Some(account) = account else {
            return Ok(None);
        };

        if self.clock.now() + TOKEN_EXPIRY_SKEW < account.expires_at {
            return Ok(Some(account.session));
        }

        let Some(refresh_token) = account.refresh_token.as_deref() else {
            tracing::debug!("Cached tokens expired and no refresh token; dropping account");
            self.lock().account = None;
            return Ok(None);
        };

        let tokens = self
            .endpoint
            .refresh(&self.token_client(&ids), refresh_token)
            .await?;

        let mut refreshed = self
            .account_from_tokens(tokens, Some(&account.session))
            .map_err(|reason| AuthError::SilentRefreshFailed { reason })?;
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = account.refresh_token;
        }

        let session = refreshed.session.clone();
        self.lock().account = Some(refreshed);
        tracing::debug!(account = %session.account_identifier, "Tokens refreshed silently");
        Ok(Some(session))
    }

    async fn begin_login_redirect(&self) -> Result<String> {
        let mode = self.lock().mode.clone();
        let ids = match mode {
            ClientMode::Uninitialized => return Err(AuthError::NotInitialized),
            ClientMode::Degraded => {
                return Err(AuthError::Misconfigured {
                    reason: "identity provider is not configured".to_string(),
                });
            },
            ClientMode::Ready(ids) => ids,
        };

        let request = PendingRequest {
            state: utils::random_token(),
            code_verifier: utils::random_token(),
        };
        let url = self.authorize_url(&ids, &request)?;
        let marker = serde_json::to_string(&request)
            .map_err(|e| AuthError::InternalError(format!("Failed to store request: {e}")))?;

        self.navigation.set_marker(PENDING_REQUEST_KEY, marker);
        self.navigation.assign(&url);
        tracing::info!("Navigating to identity provider");
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mocks::MockTokenEndpoint;
    use crate::providers::navigation::InMemoryNavigation;
    use authgate_testing::{epoch, ManualClock};

    const APP: &str = "http://localhost:3000/";

    struct Fixture {
        client: RedirectIdentityClient<InMemoryNavigation, MockTokenEndpoint>,
        navigation: InMemoryNavigation,
        endpoint: MockTokenEndpoint,
        clock: ManualClock,
    }

    fn fixture() -> Fixture {
        let navigation = InMemoryNavigation::at(APP);
        let endpoint = MockTokenEndpoint::new();
        let clock = ManualClock::starting_at(epoch());
        let config = IdentityConfig::new("client-1", "tenant-1")
            .with_authority("https://login.example.com/");
        let client = RedirectIdentityClient::new(&config, navigation.clone(), endpoint.clone())
            .with_clock(Arc::new(clock.clone()));

        Fixture {
            client,
            navigation,
            endpoint,
            clock,
        }
    }

    /// Start a login, then come back from the provider with `code`.
    async fn return_from_provider(f: &Fixture, code: &str) -> String {
        f.client.begin_login_redirect().await.unwrap();
        let request: PendingRequest =
            serde_json::from_str(&f.navigation.marker(PENDING_REQUEST_KEY).unwrap()).unwrap();
        f.navigation
            .navigate(format!("{APP}#code={code}&state={}&session_state=x", request.state));
        request.state
    }

    #[tokio::test]
    async fn test_calls_before_initialize_fail() {
        let f = fixture();

        assert_eq!(
            f.client.complete_redirect_if_present().await,
            Err(AuthError::NotInitialized)
        );
        assert_eq!(f.client.acquire_token_silent().await, Err(AuthError::NotInitialized));
        assert_eq!(f.client.begin_login_redirect().await, Err(AuthError::NotInitialized));
    }

    #[tokio::test]
    async fn test_empty_identifiers_degrade_to_no_ops() {
        let f = fixture();
        f.navigation.navigate(format!("{APP}#code=abc&state=s"));

        let result = f.client.initialize("", "tenant-1").await;
        assert!(matches!(result, Err(AuthError::Misconfigured { .. })));
        assert!(f.client.is_degraded());

        assert_eq!(
            f.client.complete_redirect_if_present().await,
            Ok(RedirectOutcome::NoRedirectPending)
        );
        assert_eq!(f.client.acquire_token_silent().await, Ok(None));
        assert_eq!(f.endpoint.exchange_count(), 0);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let f = fixture();
        f.client.initialize("client-1", "tenant-1").await.unwrap();
        f.client.initialize("client-1", "tenant-1").await.unwrap();
        assert!(f.client.is_ready());
    }

    #[tokio::test]
    async fn test_no_redirect_is_a_no_op() {
        let f = fixture();
        f.client.initialize("client-1", "tenant-1").await.unwrap();

        for _ in 0..3 {
            assert_eq!(
                f.client.complete_redirect_if_present().await,
                Ok(RedirectOutcome::NoRedirectPending)
            );
        }
        assert_eq!(f.navigation.location(), APP);
        assert_eq!(f.endpoint.exchange_count(), 0);
    }

    #[tokio::test]
    async fn test_begin_login_builds_pkce_authorize_url() {
        let f = fixture();
        f.client.initialize("client-1", "tenant-1").await.unwrap();

        let url = f.client.begin_login_redirect().await.unwrap();
        let request: PendingRequest =
            serde_json::from_str(&f.navigation.marker(PENDING_REQUEST_KEY).unwrap()).unwrap();

        assert!(url.starts_with("https://login.example.com/tenant-1/oauth2/v2.0/authorize?"));
        assert!(url.contains("response_mode=fragment"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains(&format!("state={}", request.state)));
        assert!(url.contains(&format!(
            "code_challenge={}",
            utils::pkce_challenge(&request.code_verifier)
        )));
        assert_eq!(f.navigation.visited(), vec![url]);
    }

    #[tokio::test]
    async fn test_valid_redirect_completes_once() {
        let f = fixture();
        f.client.initialize("client-1", "tenant-1").await.unwrap();
        f.endpoint.push_exchange(Ok(MockTokenEndpoint::tokens_for("oid-1", "tid-1")));
        return_from_provider(&f, "code-1").await;

        let outcome = f.client.complete_redirect_if_present().await.unwrap();
        let RedirectOutcome::Completed(session) = outcome else {
            panic!("expected Completed, got {outcome:?}");
        };
        assert_eq!(session.account_identifier, "oid-1.tid-1");
        assert!(session.is_present);
        assert_eq!(session.acquired_at, epoch());

        assert_eq!(f.navigation.location(), APP);
        assert_eq!(f.navigation.marker(PENDING_REQUEST_KEY), None);
        let exchange = f.endpoint.exchanges().pop().unwrap();
        assert_eq!(exchange.code, "code-1");
        assert_eq!(exchange.client.tenant_id, "tenant-1");

        assert_eq!(
            f.client.complete_redirect_if_present().await,
            Ok(RedirectOutcome::NoRedirectPending)
        );
        assert_eq!(f.endpoint.exchange_count(), 1);
    }

    #[tokio::test]
    async fn test_state_mismatch_fails_without_exchange() {
        let f = fixture();
        f.client.initialize("client-1", "tenant-1").await.unwrap();
        f.client.begin_login_redirect().await.unwrap();
        f.navigation.navigate(format!("{APP}#code=abc&state=forged"));

        let outcome = f.client.complete_redirect_if_present().await.unwrap();

        assert_eq!(
            outcome,
            RedirectOutcome::Failed(ErrorDescriptor::redirect_failed("state mismatch"))
        );
        assert_eq!(f.endpoint.exchange_count(), 0);
        assert_eq!(f.navigation.location(), APP);
    }

    #[tokio::test]
    async fn test_unsolicited_redirect_is_malformed() {
        let f = fixture();
        f.client.initialize("client-1", "tenant-1").await.unwrap();
        f.navigation.navigate(format!("{APP}?tab=2#code=abc&state=s"));

        let outcome = f.client.complete_redirect_if_present().await.unwrap();

        assert_eq!(
            outcome,
            RedirectOutcome::Failed(ErrorDescriptor::redirect_failed("no pending sign-in request"))
        );
        assert_eq!(f.navigation.location(), format!("{APP}?tab=2"));
    }

    #[tokio::test]
    async fn test_provider_error_is_reported() {
        let f = fixture();
        f.client.initialize("client-1", "tenant-1").await.unwrap();
        f.client.begin_login_redirect().await.unwrap();
        f.navigation
            .navigate(format!("{APP}#error=access_denied&error_description=cancelled"));

        let outcome = f.client.complete_redirect_if_present().await.unwrap();

        let RedirectOutcome::Failed(error) = outcome else {
            panic!("expected Failed");
        };
        assert_eq!(error.kind, ErrorKind::RedirectCompletionFailed);
        assert!(error.message.contains("access_denied: cancelled"));
    }

    #[tokio::test]
    async fn test_exchange_failure_is_reported() {
        let f = fixture();
        f.client.initialize("client-1", "tenant-1").await.unwrap();
        f.endpoint.push_exchange(Err(AuthError::RedirectCompletionFailed {
            reason: "invalid_grant".to_string(),
        }));
        return_from_provider(&f, "code-1").await;

        let outcome = f.client.complete_redirect_if_present().await.unwrap();

        assert!(matches!(outcome, RedirectOutcome::Failed(ref e) if e.message.contains("invalid_grant")));
        assert_eq!(f.client.acquire_token_silent().await, Ok(None));
    }

    #[tokio::test]
    async fn test_silent_acquisition_uses_cache_then_refreshes() {
        let f = fixture();
        f.client.initialize("client-1", "tenant-1").await.unwrap();
        f.endpoint.push_exchange(Ok(MockTokenEndpoint::tokens_for("oid-1", "tid-1")));
        return_from_provider(&f, "code-1").await;
        f.client.complete_redirect_if_present().await.unwrap();

        let cached = f.client.acquire_token_silent().await.unwrap().unwrap();
        assert_eq!(cached.acquired_at, epoch());
        assert_eq!(f.endpoint.refresh_count(), 0);

        f.clock.advance(Duration::hours(2));
        f.endpoint.push_refresh(Ok(TokenResponse {
            id_token: None,
            refresh_token: None,
            ..MockTokenEndpoint::tokens_for("oid-1", "tid-1")
        }));

        let refreshed = f.client.acquire_token_silent().await.unwrap().unwrap();
        assert_eq!(refreshed.account_identifier, "oid-1.tid-1");
        assert_eq!(refreshed.acquired_at, epoch() + Duration::hours(2));
        assert_ne!(refreshed, cached);
        assert_eq!(f.endpoint.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_silent_refresh_failure_propagates() {
        let f = fixture();
        f.client.initialize("client-1", "tenant-1").await.unwrap();
        f.endpoint.push_exchange(Ok(MockTokenEndpoint::tokens_for("oid-1", "tid-1")));
        return_from_provider(&f, "code-1").await;
        f.client.complete_redirect_if_present().await.unwrap();

        f.clock.advance(Duration::hours(2));
        f.endpoint.push_refresh(Err(AuthError::SilentRefreshFailed {
            reason: "invalid_grant".to_string(),
        }));

        let error = f.client.acquire_token_silent().await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::SilentRefreshFailed);
    }

    #[tokio::test]
    async fn test_out_of_range_lifetime_fails_redirect() {
        let f = fixture();
        f.client.initialize("client-1", "tenant-1").await.unwrap();
        let mut tokens = MockTokenEndpoint::tokens_for("oid-1", "tid-1");
        tokens.expires_in = i64::MAX;
        f.endpoint.push_exchange(Ok(tokens));
        return_from_provider(&f, "code-1").await;

        let outcome = f.client.complete_redirect_if_present().await.unwrap();

        let RedirectOutcome::Failed(error) = outcome else {
            panic!("expected Failed, got {outcome:?}");
        };
        assert_eq!(error.kind, ErrorKind::RedirectCompletionFailed);
        assert!(error.message.contains("out of range"));
        assert_eq!(f.client.acquire_token_silent().await, Ok(None));
    }

    #[tokio::test]
    async fn test_out_of_range_lifetime_fails_silent_refresh() {
        let f = fixture();
        f.client.initialize("client-1", "tenant-1").await.unwrap();
        f.endpoint.push_exchange(Ok(MockTokenEndpoint::tokens_for("oid-1", "tid-1")));
        return_from_provider(&f, "code-1").await;
        f.client.complete_redirect_if_present().await.unwrap();

        f.clock.advance(Duration::hours(2));
        let mut tokens = MockTokenEndpoint::tokens_for("oid-1", "tid-1");
        tokens.expires_in = i64::MIN;
        f.endpoint.push_refresh(Ok(tokens));

        let error = f.client.acquire_token_silent().await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::SilentRefreshFailed);
    }

    #[tokio::test]
    async fn test_reinitializing_with_other_ids_drops_account() {
        let f = fixture();
        f.client.initialize("client-1", "tenant-1").await.unwrap();
        f.endpoint.push_exchange(Ok(MockTokenEndpoint::tokens_for("oid-1", "tid-1")));
        return_from_provider(&f, "code-1").await;
        f.client.complete_redirect_if_present().await.unwrap();

        f.client.initialize("client-2", "tenant-1").await.unwrap();

        assert_eq!(f.client.acquire_token_silent().await, Ok(None));
    }
}
