//! Authentication constants.
//!
//! This module contains constant values used throughout the orchestrator and
//! its collaborators.

use std::time::Duration;

/// How long the orchestrator stays in `Error` before settling on its own.
pub const DEFAULT_RECOVERY_DELAY: Duration = Duration::from_secs(5);

/// Maximum number of phase transitions kept for diagnostics.
pub const PHASE_HISTORY_LIMIT: usize = 64;

/// Consecutive failed session reads before a `Failed` event is emitted.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Access tokens this close to expiry are refreshed instead of reused.
pub const TOKEN_EXPIRY_SKEW: chrono::Duration = chrono::Duration::seconds(60);

/// Navigation-scoped key holding the pending sign-in request.
pub const PENDING_REQUEST_KEY: &str = "authgate.pending_request";

/// Identity platform defaults.
pub mod identity_defaults {
    /// Login authority.
    pub const AUTHORITY: &str = "https://login.microsoftonline.com";

    /// Where the provider sends the user back to.
    pub const REDIRECT_URI: &str = "http://localhost:3000";

    /// Scopes requested at sign-in.
    pub const SCOPES: &str = "openid profile offline_access";
}

/// Backend session defaults.
pub mod session_defaults {
    /// Base URL of the application backend.
    pub const BASE_URL: &str = "http://localhost:8080";

    /// Session validation endpoint, relative to the base URL.
    pub const SESSION_PATH: &str = "/auth/session";

    /// Logout endpoint, relative to the base URL.
    pub const LOGOUT_PATH: &str = "/auth/logout";
}

/// Parameters the provider appends to the redirect URI.
pub mod redirect_params {
    /// Authorization code.
    pub const CODE: &str = "code";

    /// Echoed CSRF state.
    pub const STATE: &str = "state";

    /// Provider error code.
    pub const ERROR: &str = "error";

    /// Provider error text.
    pub const ERROR_DESCRIPTION: &str = "error_description";

    /// Every parameter stripped from the location once a redirect is consumed.
    pub const ALL: &[&str] = &[
        CODE,
        STATE,
        ERROR,
        ERROR_DESCRIPTION,
        "session_state",
        "client_info",
        "error_uri",
    ];
}

/// Environment variable names read by [`crate::config`].
pub mod env_vars {
    /// Identity provider client (application) id.
    pub const IDENTITY_CLIENT_ID: &str = "AUTHGATE_IDENTITY_CLIENT_ID";
    /// Identity provider tenant id.
    pub const IDENTITY_TENANT_ID: &str = "AUTHGATE_IDENTITY_TENANT_ID";
    /// Identity provider authority URL.
    pub const IDENTITY_AUTHORITY: &str = "AUTHGATE_IDENTITY_AUTHORITY";
    /// Redirect URI registered with the provider.
    pub const IDENTITY_REDIRECT_URI: &str = "AUTHGATE_IDENTITY_REDIRECT_URI";
    /// Space-separated scopes.
    pub const IDENTITY_SCOPES: &str = "AUTHGATE_IDENTITY_SCOPES";
    /// Backend base URL.
    pub const SESSION_BASE_URL: &str = "AUTHGATE_SESSION_BASE_URL";
    /// Failed reads before reporting.
    pub const SESSION_FAILURE_THRESHOLD: &str = "AUTHGATE_SESSION_FAILURE_THRESHOLD";
    /// Error recovery delay in milliseconds.
    pub const RECOVERY_DELAY_MS: &str = "AUTHGATE_RECOVERY_DELAY_MS";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_redirect_param_is_stripped() {
        for param in [
            redirect_params::CODE,
            redirect_params::STATE,
            redirect_params::ERROR,
            redirect_params::ERROR_DESCRIPTION,
        ] {
            assert!(redirect_params::ALL.contains(&param));
        }
    }

    #[test]
    fn test_recovery_delay_is_bounded() {
        assert_eq!(DEFAULT_RECOVERY_DELAY, Duration::from_secs(5));
    }
}
