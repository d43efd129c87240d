//! Authentication state types.
//!
//! [`ReconciledAuthState`] is the only state the UI boundary reads. The
//! orchestrator keeps it inside [`OrchestratorState`] together with the
//! bookkeeping that sequences the pipeline.

use crate::constants::PHASE_HISTORY_LIMIT;
use crate::error::ErrorDescriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session produced by the identity provider.
///
/// Produced only by a completed redirect or a silent refresh and replaced
/// wholesale, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySession {
    /// Opaque account identifier (`"{object id}.{tenant id}"` on the
    /// redirect client).
    pub account_identifier: String,

    /// Display username, when the provider sent one.
    pub username: Option<String>,

    /// Always `true` for sessions handed out by a client.
    pub is_present: bool,

    /// When the tokens behind this session were acquired.
    pub acquired_at: DateTime<Utc>,
}

impl IdentitySession {
    /// Create a present session.
    #[must_use]
    pub fn new(account_identifier: impl Into<String>, acquired_at: DateTime<Utc>) -> Self {
        Self {
            account_identifier: account_identifier.into(),
            username: None,
            is_present: true,
            acquired_at,
        }
    }

    /// Attach a username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// Session held by the application backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSession {
    /// Backend subject (user) id.
    pub subject_id: String,

    /// When the backend stops honouring the session.
    pub expires_at: DateTime<Utc>,

    /// Always `true` for sessions handed out by a store.
    pub is_present: bool,
}

impl BackendSession {
    /// Create a present session.
    #[must_use]
    pub fn new(subject_id: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            subject_id: subject_id.into(),
            expires_at,
            is_present: true,
        }
    }

    /// Whether the session has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Phase of the identity-flow state machine.
///
/// ```text
/// Initializing ──► AwaitingRedirect ──► Settled ◄──► Error
///      │                  │                            ▲
///      └──────────────────┼──► Settled                 │
///                         └────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    /// Identity client is being initialized.
    #[default]
    Initializing,
    /// Waiting for redirect completion to resolve.
    AwaitingRedirect,
    /// Every auth-determining step for this load has concluded.
    Settled,
    /// A failure is being shown; settles again after the recovery delay.
    Error,
}

impl AuthPhase {
    /// Stable lowercase name, used for logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::AwaitingRedirect => "awaiting_redirect",
            Self::Settled => "settled",
            Self::Error => "error",
        }
    }

    /// Whether protected content must stay hidden in this phase.
    #[must_use]
    pub const fn blocks_rendering(self) -> bool {
        matches!(self, Self::Initializing | Self::AwaitingRedirect)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// Nothing ever goes back to `Initializing` or `AwaitingRedirect`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Initializing, Self::AwaitingRedirect | Self::Settled)
                | (Self::AwaitingRedirect, Self::Settled | Self::Error)
                | (Self::Settled, Self::Error)
                | (Self::Error, Self::Settled)
        )
    }
}

impl std::fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of completing a pending redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// No redirect response in the current location. The common case.
    NoRedirectPending,
    /// The redirect was consumed and produced a session.
    Completed(IdentitySession),
    /// The redirect was consumed but could not be completed.
    Failed(ErrorDescriptor),
}

/// The single auth state published to the UI boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconciledAuthState {
    /// Identity-flow phase. Only this gates rendering.
    pub phase: AuthPhase,

    /// Session from the identity provider, if any.
    pub identity: Option<IdentitySession>,

    /// Session from the application backend, if any.
    pub backend: Option<BackendSession>,

    /// Failure currently shown to the user, if any.
    pub error: Option<ErrorDescriptor>,
}

impl ReconciledAuthState {
    /// Whether the phase is `Settled`.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.phase == AuthPhase::Settled
    }

    /// Whether an identity-provider session is present.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        self.identity.as_ref().is_some_and(|identity| identity.is_present)
    }

    /// Whether an unexpired backend session is present at `now`.
    #[must_use]
    pub fn has_backend_session(&self, now: DateTime<Utc>) -> bool {
        self.backend
            .as_ref()
            .is_some_and(|session| session.is_present && !session.is_expired(now))
    }

    /// Whether either source currently authenticates the user.
    ///
    /// The two sources are independent: a backend session alone is enough.
    #[must_use]
    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        self.has_identity() || self.has_backend_session(now)
    }
}

/// Everything the orchestrator reducer tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorState {
    /// The state published to the UI.
    pub auth: ReconciledAuthState,

    /// `Start` has been handled for this process.
    pub pipeline_started: bool,

    /// The identity client finished initializing.
    pub identity_ready: bool,

    /// Redirect completion ran to conclusion at least once.
    pub redirect_concluded: bool,

    /// Bumped on every entry into `Error`; recovery timers carry the value
    /// they were scheduled with so stale timers are ignored.
    pub recovery_epoch: u64,

    /// A pushed session change or a sign-out was applied; the initial
    /// backend load is older than either and must not overwrite it.
    pub backend_changed: bool,

    /// Phases entered, oldest first, capped at [`PHASE_HISTORY_LIMIT`].
    pub phase_history: Vec<AuthPhase>,
}

impl Default for OrchestratorState {
    fn default() -> Self {
        Self {
            auth: ReconciledAuthState::default(),
            pipeline_started: false,
            identity_ready: false,
            redirect_concluded: false,
            recovery_epoch: 0,
            backend_changed: false,
            phase_history: vec![AuthPhase::Initializing],
        }
    }
}

impl OrchestratorState {
    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> AuthPhase {
        self.auth.phase
    }

    /// Move to `next`, recording the transition.
    ///
    /// Returns `false` (and changes nothing) for transitions the state
    /// machine does not allow.
    pub fn transition(&mut self, next: AuthPhase) -> bool {
        let from = self.auth.phase;
        if !from.can_transition_to(next) {
            tracing::error!(from = %from, to = %next, "Rejected illegal phase transition");
            return false;
        }

        self.auth.phase = next;
        if self.phase_history.len() >= PHASE_HISTORY_LIMIT {
            self.phase_history.remove(0);
        }
        self.phase_history.push(next);

        tracing::info!(from = %from, to = %next, "Auth phase transition");
        metrics::counter!("auth.phase.transitions", "to" => next.as_str()).increment(1);
        true
    }
}
