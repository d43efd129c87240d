//! Orchestrator environment.
//!
//! This module defines the environment type for dependency injection in the
//! orchestrator reducer.

use crate::config::{OrchestratorConfig, ProviderIdentifiers};
use crate::constants::DEFAULT_RECOVERY_DELAY;
use crate::providers::{IdentityClient, SessionStore};
use authgate_core::environment::{Clock, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Orchestrator environment.
///
/// Contains every external dependency of the orchestrator reducer.
///
/// # Type Parameters
///
/// - `I`: Identity client
/// - `S`: Session store
#[derive(Clone)]
pub struct OrchestratorEnvironment<I, S>
where
    I: IdentityClient + Clone,
    S: SessionStore + Clone,
{
    /// Identity provider client.
    pub identity: I,

    /// Backend session store.
    pub sessions: S,

    /// Provider identifiers; `None` selects the no-provider fast path.
    pub provider: Option<ProviderIdentifiers>,

    /// Time spent in `Error` before settling.
    pub recovery_delay: Duration,

    /// Clock for session expiry checks.
    pub clock: Arc<dyn Clock>,
}

impl<I, S> OrchestratorEnvironment<I, S>
where
    I: IdentityClient + Clone,
    S: SessionStore + Clone,
{
    /// Create an environment without a configured provider.
    #[must_use]
    pub fn new(identity: I, sessions: S) -> Self {
        Self {
            identity,
            sessions,
            provider: None,
            recovery_delay: DEFAULT_RECOVERY_DELAY,
            clock: Arc::new(SystemClock),
        }
    }

    /// Configure the identity provider.
    #[must_use]
    pub fn with_provider(mut self, provider: Option<ProviderIdentifiers>) -> Self {
        self.provider = provider;
        self
    }

    /// Apply orchestrator policy.
    #[must_use]
    pub const fn with_config(mut self, config: &OrchestratorConfig) -> Self {
        self.recovery_delay = config.recovery_delay;
        self
    }

    /// Set the recovery delay.
    #[must_use]
    pub const fn with_recovery_delay(mut self, delay: Duration) -> Self {
        self.recovery_delay = delay;
        self
    }

    /// Use `clock` for expiry checks.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
