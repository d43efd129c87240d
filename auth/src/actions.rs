//! Orchestrator actions.
//!
//! Commands come from the UI boundary; every other action is the result of
//! an effect, fed back by the store.

use crate::error::ErrorDescriptor;
use crate::providers::session::SessionEvent;
use crate::state::{BackendSession, IdentitySession, RedirectOutcome};

/// Everything the orchestrator reducer reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorAction {
    // ═══════════════════════════════════════════════════════════
    // Commands
    // ═══════════════════════════════════════════════════════════

    /// Run the page-load pipeline. Ignored after the first time.
    Start,

    /// Ask the identity client for a fresh session without user interaction.
    RefreshIdentity,

    /// Sign out of the backend session.
    SignOut,

    /// Send the user to the identity provider.
    BeginLogin,

    // ═══════════════════════════════════════════════════════════
    // Identity flow results
    // ═══════════════════════════════════════════════════════════

    /// `initialize` succeeded.
    IdentityInitialized,

    /// `initialize` failed.
    IdentityInitializationFailed {
        /// Why
        error: ErrorDescriptor,
    },

    /// Redirect completion concluded.
    RedirectResolved {
        /// What it found
        outcome: RedirectOutcome,
    },

    /// Silent acquisition returned.
    SilentRefreshCompleted {
        /// The new session, or `None` if there is no cached account
        session: Option<IdentitySession>,
    },

    /// Silent acquisition failed.
    SilentRefreshFailed {
        /// Why
        error: ErrorDescriptor,
    },

    /// The recovery delay scheduled on entering `Error` elapsed.
    RecoveryElapsed {
        /// Epoch the timer was scheduled in
        epoch: u64,
    },

    /// Navigation to the provider started.
    LoginRedirectStarted {
        /// Authorize URL
        url: String,
    },

    /// Navigation to the provider could not start.
    LoginRedirectFailed {
        /// Why
        error: ErrorDescriptor,
    },

    // ═══════════════════════════════════════════════════════════
    // Backend session results
    // ═══════════════════════════════════════════════════════════

    /// Initial session read returned.
    BackendSessionLoaded {
        /// Session, if any
        session: Option<BackendSession>,
    },

    /// The session store announced a transition.
    BackendSessionChanged {
        /// The transition
        event: SessionEvent,
    },

    /// Sign-out finished.
    SignOutCompleted,

    /// Remote sign-out failed (the local session is gone regardless).
    SignOutFailed {
        /// Why
        error: ErrorDescriptor,
    },
}

impl OrchestratorAction {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::RefreshIdentity => "refresh_identity",
            Self::SignOut => "sign_out",
            Self::BeginLogin => "begin_login",
            Self::IdentityInitialized => "identity_initialized",
            Self::IdentityInitializationFailed { .. } => "identity_initialization_failed",
            Self::RedirectResolved { .. } => "redirect_resolved",
            Self::SilentRefreshCompleted { .. } => "silent_refresh_completed",
            Self::SilentRefreshFailed { .. } => "silent_refresh_failed",
            Self::RecoveryElapsed { .. } => "recovery_elapsed",
            Self::LoginRedirectStarted { .. } => "login_redirect_started",
            Self::LoginRedirectFailed { .. } => "login_redirect_failed",
            Self::BackendSessionLoaded { .. } => "backend_session_loaded",
            Self::BackendSessionChanged { .. } => "backend_session_changed",
            Self::SignOutCompleted => "sign_out_completed",
            Self::SignOutFailed { .. } => "sign_out_failed",
        }
    }
}
