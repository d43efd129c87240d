//! Mock identity client for testing.

use crate::error::{AuthError, Result};
use crate::providers::identity::IdentityClient;
use crate::state::{IdentitySession, RedirectOutcome};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A call received by [`MockIdentityClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityCall {
    /// `initialize(client_id, tenant_id)`
    Initialize {
        /// Client id passed
        client_id: String,
        /// Tenant id passed
        tenant_id: String,
    },
    /// `complete_redirect_if_present()`
    CompleteRedirect,
    /// `acquire_token_silent()`
    AcquireTokenSilent,
    /// `begin_login_redirect()`
    BeginLogin,
}

#[derive(Debug, Default)]
struct MockIdentity {
    initialized: bool,
    init_error: Option<AuthError>,
    redirect: Option<RedirectOutcome>,
    redirect_delay: Option<Duration>,
    silent: VecDeque<Result<Option<IdentitySession>>>,
    account: Option<IdentitySession>,
    calls: Vec<IdentityCall>,
}

/// Mock identity client.
///
/// Behaves like a real client as far as ordering goes: calls before a
/// successful `initialize` fail with `NotInitialized`, and a scripted
/// redirect is consumed by the first completion.
#[derive(Debug, Clone, Default)]
pub struct MockIdentityClient {
    inner: Arc<Mutex<MockIdentity>>,
}

impl MockIdentityClient {
    /// Create a mock with no redirect pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome of the next redirect completion.
    #[must_use]
    pub fn with_redirect(self, outcome: RedirectOutcome) -> Self {
        self.set_redirect(outcome);
        self
    }

    /// Make redirect completion take `delay` before resolving.
    #[must_use]
    pub fn with_redirect_delay(self, delay: Duration) -> Self {
        self.lock().redirect_delay = Some(delay);
        self
    }

    /// Make `initialize` fail with `error`.
    #[must_use]
    pub fn failing_initialize(self, error: AuthError) -> Self {
        self.lock().init_error = Some(error);
        self
    }

    /// Script the outcome of the next redirect completion (e.g. for the next
    /// page load).
    pub fn set_redirect(&self, outcome: RedirectOutcome) {
        self.lock().redirect = Some(outcome);
    }

    /// Queue a result for the next silent acquisition.
    ///
    /// Unscripted acquisitions return the account from the last completed
    /// redirect.
    pub fn push_silent(&self, result: Result<Option<IdentitySession>>) {
        self.lock().silent.push_back(result);
    }

    /// Every call received, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<IdentityCall> {
        self.lock().calls.clone()
    }

    /// Number of redirect completions received.
    #[must_use]
    pub fn redirect_completions(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| **call == IdentityCall::CompleteRedirect)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockIdentity> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityClient for MockIdentityClient {
    async fn initialize(&self, client_id: &str, tenant_id: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.push(IdentityCall::Initialize {
            client_id: client_id.to_string(),
            tenant_id: tenant_id.to_string(),
        });

        if let Some(error) = inner.init_error.clone() {
            return Err(error);
        }
        if client_id.is_empty() || tenant_id.is_empty() {
            return Err(AuthError::Misconfigured {
                reason: "client id and tenant id are required".to_string(),
            });
        }

        inner.initialized = true;
        Ok(())
    }

    async fn complete_redirect_if_present(&self) -> Result<RedirectOutcome> {
        let delay = {
            let mut inner = self.lock();
            inner.calls.push(IdentityCall::CompleteRedirect);
            if !inner.initialized {
                return Err(AuthError::NotInitialized);
            }
            inner.redirect_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.lock();
        let outcome = inner.redirect.take().unwrap_or(RedirectOutcome::NoRedirectPending);
        if let RedirectOutcome::Completed(session) = &outcome {
            inner.account = Some(session.clone());
        }
        Ok(outcome)
    }

    async fn acquire_token_silent(&self) -> Result<Option<IdentitySession>> {
        let mut inner = self.lock();
        inner.calls.push(IdentityCall::AcquireTokenSilent);
        if !inner.initialized {
            return Err(AuthError::NotInitialized);
        }

        let account = inner.account.clone();
        let result = inner.silent.pop_front().unwrap_or(Ok(account));
        if let Ok(session) = &result {
            inner.account.clone_from(session);
        }
        result
    }

    async fn begin_login_redirect(&self) -> Result<String> {
        let mut inner = self.lock();
        inner.calls.push(IdentityCall::BeginLogin);
        if !inner.initialized {
            return Err(AuthError::NotInitialized);
        }
        Ok("https://login.example.com/mock/oauth2/v2.0/authorize".to_string())
    }
}
