//! Authentication configuration.
//!
//! Every value has a default, so an empty environment yields a working
//! configuration in which the identity provider is simply not configured.

use crate::constants::{
    env_vars, identity_defaults, session_defaults, DEFAULT_FAILURE_THRESHOLD,
    DEFAULT_RECOVERY_DELAY,
};
use std::env;
use std::time::Duration;

/// Client and tenant identifiers of a configured identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentifiers {
    /// Application (client) id.
    pub client_id: String,
    /// Tenant id.
    pub tenant_id: String,
}

/// Identity provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Application (client) id. Absent or blank disables the provider.
    pub client_id: Option<String>,

    /// Tenant id. Absent or blank disables the provider.
    pub tenant_id: Option<String>,

    /// Login authority.
    ///
    /// Default: `https://login.microsoftonline.com`
    pub authority: String,

    /// Redirect URI registered with the provider.
    ///
    /// Default: `http://localhost:3000`
    pub redirect_uri: String,

    /// Space-separated scopes.
    ///
    /// Default: `openid profile offline_access`
    pub scopes: String,
}

impl IdentityConfig {
    /// Configuration for a provider with the given identifiers.
    #[must_use]
    pub fn new(client_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            tenant_id: Some(tenant_id.into()),
            ..Self::default()
        }
    }

    /// Set the login authority.
    #[must_use]
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    /// Set the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Set the scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: impl Into<String>) -> Self {
        self.scopes = scopes.into();
        self
    }

    /// Both identifiers, if both are present and non-blank.
    #[must_use]
    pub fn provider_identifiers(&self) -> Option<ProviderIdentifiers> {
        let client_id = self.client_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let tenant_id = self.tenant_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some(ProviderIdentifiers {
            client_id: client_id.to_string(),
            tenant_id: tenant_id.to_string(),
        })
    }

    /// Load from `AUTHGATE_IDENTITY_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            client_id: var(env_vars::IDENTITY_CLIENT_ID),
            tenant_id: var(env_vars::IDENTITY_TENANT_ID),
            authority: var(env_vars::IDENTITY_AUTHORITY)
                .unwrap_or_else(|| identity_defaults::AUTHORITY.to_string()),
            redirect_uri: var(env_vars::IDENTITY_REDIRECT_URI)
                .unwrap_or_else(|| identity_defaults::REDIRECT_URI.to_string()),
            scopes: var(env_vars::IDENTITY_SCOPES)
                .unwrap_or_else(|| identity_defaults::SCOPES.to_string()),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            tenant_id: None,
            authority: identity_defaults::AUTHORITY.to_string(),
            redirect_uri: identity_defaults::REDIRECT_URI.to_string(),
            scopes: identity_defaults::SCOPES.to_string(),
        }
    }
}

/// Backend session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Backend base URL.
    ///
    /// Default: `http://localhost:8080`
    pub base_url: String,

    /// Consecutive failed reads before a `Failed` event is emitted.
    ///
    /// Default: 3
    pub failure_threshold: u32,
}

impl SessionConfig {
    /// Configuration for the backend at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }

    /// Set the failure threshold.
    #[must_use]
    pub const fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Load from `AUTHGATE_SESSION_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            base_url: var(env_vars::SESSION_BASE_URL)
                .unwrap_or_else(|| session_defaults::BASE_URL.to_string()),
            failure_threshold: var(env_vars::SESSION_FAILURE_THRESHOLD)
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_FAILURE_THRESHOLD),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(session_defaults::BASE_URL)
    }
}

/// Orchestrator policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Time spent in `Error` before settling without identity.
    ///
    /// Default: 5 seconds
    pub recovery_delay: Duration,
}

impl OrchestratorConfig {
    /// Set the recovery delay.
    #[must_use]
    pub const fn with_recovery_delay(mut self, delay: Duration) -> Self {
        self.recovery_delay = delay;
        self
    }

    /// Load from `AUTHGATE_RECOVERY_DELAY_MS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            recovery_delay: var(env_vars::RECOVERY_DELAY_MS)
                .and_then(|s| s.parse().ok())
                .map_or(DEFAULT_RECOVERY_DELAY, Duration::from_millis),
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            recovery_delay: DEFAULT_RECOVERY_DELAY,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Identity provider.
    pub identity: IdentityConfig,
    /// Backend session.
    pub session: SessionConfig,
    /// Orchestrator policy.
    pub orchestrator: OrchestratorConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            identity: IdentityConfig::from_lookup(&var),
            session: SessionConfig::from_lookup(&var),
            orchestrator: OrchestratorConfig::from_lookup(&var),
        }
    }
}
