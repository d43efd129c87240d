//! Session store and session backend traits.

use crate::error::{ErrorDescriptor, Result};
use crate::state::BackendSession;
use crate::stores::Subscription;

/// A change of the backend session, delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session appeared, or a different subject signed in.
    SignedIn(BackendSession),
    /// The session is gone.
    SignedOut,
    /// Same subject, renewed session.
    TokenRefreshed(BackendSession),
    /// Reads have kept failing; reported once until a read succeeds.
    Failed(ErrorDescriptor),
}

impl SessionEvent {
    /// The session carried by this event, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&BackendSession> {
        match self {
            Self::SignedIn(session) | Self::TokenRefreshed(session) => Some(session),
            Self::SignedOut | Self::Failed(_) => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SignedIn(_) => "signed_in",
            Self::SignedOut => "signed_out",
            Self::TokenRefreshed(_) => "token_refreshed",
            Self::Failed(_) => "failed",
        }
    }
}

/// Backend session store.
///
/// This trait abstracts over the application's own session, independent of
/// the identity provider.
///
/// # Implementation Notes
///
/// - `current_session` resolves from a local cache with at most one network
///   round-trip and never blocks indefinitely
/// - Read failures return `None`; persistent failures are reported once via
///   [`SessionEvent::Failed`]
pub trait SessionStore: Send + Sync {
    /// Current session, or `None` if absent or unreadable.
    fn current_session(
        &self,
    ) -> impl std::future::Future<Output = Option<BackendSession>> + Send;

    /// Register a listener for session transitions.
    ///
    /// The listener is called synchronously from whichever task observes the
    /// change and must not block.
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static;

    /// Invalidate the session and notify subscribers.
    ///
    /// Idempotent: signing out while signed out notifies nobody.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SignOutFailed` if remote revocation failed. The
    /// local session is cleared regardless.
    fn sign_out(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Remote side of the backend session.
///
/// One call is one network round-trip; caching and retries belong to the
/// [`SessionStore`] built on top.
pub trait SessionBackend: Send + Sync {
    /// Validate the session cookie and return the session.
    ///
    /// # Returns
    ///
    /// `None` if the backend reports no session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionReadFailed` if the backend is unreachable
    /// or answers unexpectedly.
    fn fetch_session(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<BackendSession>>> + Send;

    /// Revoke the session remotely.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SignOutFailed` if the backend refused.
    fn revoke(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}
