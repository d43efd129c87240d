//! Error types for the authentication orchestrator.
//!
//! [`AuthError`] is what collaborators return. Errors never leave the
//! orchestrator as `Err`: they are converted to an [`ErrorDescriptor`] and
//! stored in the reconciled state, or degrade to an absent session.

use authgate_runtime::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy for the identity client, session store and orchestrator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Identity Provider
    // ═══════════════════════════════════════════════════════════

    /// Identity client used before `initialize` completed.
    ///
    /// Indicates a sequencing bug; logged loudly, never shown to users.
    #[error("Identity client used before initialization")]
    NotInitialized,

    /// Completing the redirect round-trip failed (provider error, malformed
    /// response, or token exchange failure).
    #[error("Redirect completion failed: {reason}")]
    RedirectCompletionFailed {
        /// Reason for failure
        reason: String,
    },

    /// Identity provider identifiers are absent.
    ///
    /// A valid degraded mode: the application runs without the provider.
    #[error("Identity provider misconfigured: {reason}")]
    Misconfigured {
        /// What is missing
        reason: String,
    },

    /// Silent token acquisition failed.
    #[error("Silent token refresh failed: {reason}")]
    SilentRefreshFailed {
        /// Reason for failure
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Backend Session
    // ═══════════════════════════════════════════════════════════

    /// Backend session could not be read.
    ///
    /// Treated as an absent session by the session store.
    #[error("Session read failed: {reason}")]
    SessionReadFailed {
        /// Reason for failure
        reason: String,
    },

    /// Backend session could not be revoked remotely.
    #[error("Sign-out failed: {reason}")]
    SignOutFailed {
        /// Reason for failure
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Returns `true` if the UI may show this error as a transient banner.
    ///
    /// # Examples
    ///
    /// ```
    /// # use authgate::AuthError;
    /// let failed = AuthError::RedirectCompletionFailed { reason: "access_denied".into() };
    /// assert!(failed.is_user_visible());
    /// assert!(!AuthError::NotInitialized.is_user_visible());
    /// ```
    #[must_use]
    pub const fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Self::RedirectCompletionFailed { .. }
                | Self::SilentRefreshFailed { .. }
                | Self::SignOutFailed { .. }
        )
    }

    /// Returns `true` if retrying the same call may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::SessionReadFailed { .. })
    }

    /// The kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::RedirectCompletionFailed { .. } => ErrorKind::RedirectCompletionFailed,
            Self::Misconfigured { .. } => ErrorKind::Misconfigured,
            Self::SilentRefreshFailed { .. } => ErrorKind::SilentRefreshFailed,
            Self::SessionReadFailed { .. } => ErrorKind::SessionReadFailed,
            Self::SignOutFailed { .. } => ErrorKind::SignOutFailed,
            Self::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Convert to the serializable descriptor stored in state.
    #[must_use]
    pub fn descriptor(&self) -> ErrorDescriptor {
        let kind = self.kind();
        ErrorDescriptor {
            kind,
            code: kind.code().to_string(),
            message: self.to_string(),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        Self::InternalError(error.to_string())
    }
}

/// Category of an [`ErrorDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`AuthError::NotInitialized`]
    NotInitialized,
    /// See [`AuthError::RedirectCompletionFailed`]
    RedirectCompletionFailed,
    /// See [`AuthError::SessionReadFailed`]
    SessionReadFailed,
    /// See [`AuthError::Misconfigured`]
    Misconfigured,
    /// See [`AuthError::SilentRefreshFailed`]
    SilentRefreshFailed,
    /// See [`AuthError::SignOutFailed`]
    SignOutFailed,
    /// See [`AuthError::InternalError`]
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::RedirectCompletionFailed => "redirect_completion_failed",
            Self::SessionReadFailed => "session_read_failed",
            Self::Misconfigured => "misconfigured",
            Self::SilentRefreshFailed => "silent_refresh_failed",
            Self::SignOutFailed => "sign_out_failed",
            Self::Internal => "internal",
        }
    }
}

/// Serializable description of a failure, as stored in
/// [`ReconciledAuthState::error`](crate::state::ReconciledAuthState::error).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    /// Error category
    pub kind: ErrorKind,
    /// Stable code (see [`ErrorKind::code`])
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl ErrorDescriptor {
    /// Build a descriptor for a redirect that could not be completed.
    #[must_use]
    pub fn redirect_failed(reason: impl Into<String>) -> Self {
        AuthError::RedirectCompletionFailed {
            reason: reason.into(),
        }
        .descriptor()
    }
}

impl std::fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
