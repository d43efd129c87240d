//! Read side of the orchestrator.
//!
//! UI code never touches orchestrator state directly. It holds an
//! [`AuthStateReader`] (every published snapshot) or a [`RenderGate`]
//! (the render/loading/error decision for protected content).

use crate::error::{AuthError, ErrorDescriptor};
use crate::state::{AuthPhase, OrchestratorState, ReconciledAuthState};
use tokio::sync::watch;

/// Reader over published orchestrator snapshots.
///
/// Snapshots are published after each reduction completes, so a reader never
/// observes a half-applied transition. Readers are cheap to clone.
#[derive(Debug, Clone)]
pub struct AuthStateReader {
    snapshots: watch::Receiver<OrchestratorState>,
}

impl AuthStateReader {
    /// Wrap a snapshot receiver.
    #[must_use]
    pub const fn new(snapshots: watch::Receiver<OrchestratorState>) -> Self {
        Self { snapshots }
    }

    /// The reconciled state as of the last reduction.
    #[must_use]
    pub fn current(&self) -> ReconciledAuthState {
        self.snapshots.borrow().auth.clone()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        self.snapshots.borrow().phase()
    }

    /// Wait for the next published snapshot.
    ///
    /// Returns `None` once the orchestrator is gone.
    pub async fn changed(&mut self) -> Option<ReconciledAuthState> {
        self.snapshots.changed().await.ok()?;
        Some(self.snapshots.borrow_and_update().auth.clone())
    }

    /// Wait until the phase is `Settled`.
    ///
    /// Resolves immediately if it already is. Returns `None` if the
    /// orchestrator is dropped first.
    pub async fn wait_for_settled(&mut self) -> Option<ReconciledAuthState> {
        self.snapshots
            .wait_for(|state| state.phase() == AuthPhase::Settled)
            .await
            .ok()
            .map(|state| state.auth.clone())
    }
}

/// What the UI should draw for protected content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderDecision {
    /// Authentication is not settled; render nothing protected.
    Loading,
    /// The identity flow failed; show a transient message. Clears on its own.
    TransientError(ErrorDescriptor),
    /// Settled; protected content may be rendered against this state.
    Ready(ReconciledAuthState),
}

impl RenderDecision {
    /// Decide from a reconciled state.
    #[must_use]
    pub fn from_state(state: &ReconciledAuthState) -> Self {
        match state.phase {
            AuthPhase::Settled => Self::Ready(state.clone()),
            AuthPhase::Error => Self::TransientError(state.error.clone().unwrap_or_else(|| {
                AuthError::InternalError("error phase without error".to_string()).descriptor()
            })),
            AuthPhase::Initializing | AuthPhase::AwaitingRedirect => Self::Loading,
        }
    }

    /// Whether protected content may render.
    #[must_use]
    pub const fn allows_protected_content(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Blocking gate for protected content.
///
/// A plain state read: no timeouts and no cancellation. The recovery timer
/// guarantees the gate eventually leaves `Error`.
#[derive(Debug, Clone)]
pub struct RenderGate {
    reader: AuthStateReader,
}

impl RenderGate {
    /// Gate over `reader`.
    #[must_use]
    pub const fn new(reader: AuthStateReader) -> Self {
        Self { reader }
    }

    /// Decision for the current snapshot.
    #[must_use]
    pub fn decision(&self) -> RenderDecision {
        RenderDecision::from_state(&self.reader.current())
    }

    /// Wait until protected content may render.
    ///
    /// Returns `None` if the orchestrator is dropped first.
    pub async fn ready(&mut self) -> Option<ReconciledAuthState> {
        self.reader.wait_for_settled().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::state::IdentitySession;
    use authgate_testing::epoch;

    fn published(phase_path: &[AuthPhase]) -> OrchestratorState {
        let mut state = OrchestratorState::default();
        for phase in phase_path {
            state.transition(*phase);
        }
        state
    }

    #[test]
    fn test_decision_follows_phase() {
        assert_eq!(
            RenderDecision::from_state(&ReconciledAuthState::default()),
            RenderDecision::Loading
        );

        let mut settled = published(&[AuthPhase::Settled]).auth;
        settled.identity = Some(IdentitySession::new("oid.tid", epoch()));
        let decision = RenderDecision::from_state(&settled);
        assert!(decision.allows_protected_content());
        assert_eq!(decision, RenderDecision::Ready(settled));
    }

    #[test]
    fn test_error_phase_is_transient_error() {
        let mut state = published(&[AuthPhase::AwaitingRedirect, AuthPhase::Error]).auth;
        state.error = Some(ErrorDescriptor::redirect_failed("state mismatch"));

        match RenderDecision::from_state(&state) {
            RenderDecision::TransientError(error) => assert_eq!(error.message, "state mismatch"),
            other => panic!("expected transient error, got {other:?}"),
        }

        state.error = None;
        let decision = RenderDecision::from_state(&state);
        assert!(matches!(decision, RenderDecision::TransientError(_)));
        assert!(!decision.allows_protected_content());
    }

    #[tokio::test]
    async fn test_reader_sees_settled_after_publish() {
        let (tx, rx) = watch::channel(OrchestratorState::default());
        let mut gate = RenderGate::new(AuthStateReader::new(rx));
        assert_eq!(gate.decision(), RenderDecision::Loading);

        let waiter = tokio::spawn(async move { gate.ready().await });
        tx.send_replace(published(&[AuthPhase::AwaitingRedirect]));
        tx.send_replace(published(&[AuthPhase::AwaitingRedirect, AuthPhase::Settled]));

        let state = waiter.await.unwrap().unwrap();
        assert!(state.is_settled());
    }

    #[tokio::test]
    async fn test_reader_ends_when_sender_dropped() {
        let (tx, rx) = watch::channel(OrchestratorState::default());
        let mut reader = AuthStateReader::new(rx);
        drop(tx);

        assert_eq!(reader.changed().await, None);
        assert_eq!(reader.wait_for_settled().await, None);
    }
}
