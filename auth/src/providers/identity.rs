//! Identity client trait.

use crate::error::Result;
use crate::state::{IdentitySession, RedirectOutcome};

/// Redirect-based identity provider client.
///
/// Wraps an OAuth handshake where the user is navigated to the provider and
/// back. The orchestrator calls `initialize` once per load and then
/// `complete_redirect_if_present`, in that order and never concurrently.
///
/// # Implementation Notes
///
/// - Empty identifiers put the client in a degraded mode where every later
///   call is a no-op; this is a supported configuration, not a crash
/// - `complete_redirect_if_present` runs on every page load and must treat
///   "no redirect in flight" as a normal, successful outcome
pub trait IdentityClient: Send + Sync {
    /// Configure the client.
    ///
    /// Idempotent for identical identifiers.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Misconfigured` if either identifier is empty.
    /// The client then stays in degraded mode.
    fn initialize(
        &self,
        client_id: &str,
        tenant_id: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Consume a pending redirect response, if the current location holds one.
    ///
    /// Provider, validation and token-exchange failures are reported as
    /// [`RedirectOutcome::Failed`], not as `Err`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotInitialized` if called before `initialize`.
    fn complete_redirect_if_present(
        &self,
    ) -> impl std::future::Future<Output = Result<RedirectOutcome>> + Send;

    /// Return the cached account's session, refreshing tokens if needed.
    ///
    /// # Returns
    ///
    /// `None` when there is no cached account (or in degraded mode).
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Called before `initialize` → `AuthError::NotInitialized`
    /// - The refresh grant fails → `AuthError::SilentRefreshFailed`
    fn acquire_token_silent(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<IdentitySession>>> + Send;

    /// Start an interactive sign-in by navigating to the provider.
    ///
    /// # Returns
    ///
    /// The authorize URL the user was sent to.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Called before `initialize` → `AuthError::NotInitialized`
    /// - The client is degraded → `AuthError::Misconfigured`
    fn begin_login_redirect(&self) -> impl std::future::Future<Output = Result<String>> + Send;
}
