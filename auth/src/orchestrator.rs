//! The auth orchestrator.
//!
//! [`AuthOrchestrator`] is the one explicitly owned context object holding the
//! reconciled auth state for a page load. It wires the session store
//! subscription into a [`Store`] running the [`OrchestratorReducer`], and
//! hands out read-only views ([`AuthStateReader`], [`RenderGate`]) to the UI.
//!
//! # Lifecycle
//!
//! ```text
//! new ─► start ─► (settled) ─► commands ... ─► teardown
//! ```
//!
//! After [`teardown`](AuthOrchestrator::teardown) the store is abandoned: late
//! provider results are dropped instead of written, and the session store
//! listener is released.

use crate::actions::OrchestratorAction;
use crate::environment::OrchestratorEnvironment;
use crate::error::{AuthError, Result};
use crate::gate::{AuthStateReader, RenderGate};
use crate::providers::session::SessionEvent;
use crate::providers::{IdentityClient, SessionStore};
use crate::reducers::OrchestratorReducer;
use crate::state::{AuthPhase, OrchestratorState, ReconciledAuthState};
use crate::stores::Subscription;
use authgate_core::environment::Clock;
use authgate_runtime::{Store, StoreError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

type OrchestratorStore<I, S> = Store<
    OrchestratorState,
    OrchestratorAction,
    OrchestratorEnvironment<I, S>,
    OrchestratorReducer<I, S>,
>;

#[derive(Default)]
struct Lifecycle {
    started: bool,
    subscription: Option<Subscription>,
    forwarder: Option<JoinHandle<()>>,
}

/// Coordinates the identity client and the backend session store.
///
/// # Example
///
/// ```ignore
/// let orchestrator = AuthOrchestrator::new(environment);
/// orchestrator.start().await?;
///
/// let mut gate = orchestrator.gate();
/// if let Some(state) = gate.ready().await {
///     render_protected(&state);
/// }
/// ```
pub struct AuthOrchestrator<I, S>
where
    I: IdentityClient + Clone + 'static,
    S: SessionStore + Clone + 'static,
{
    store: OrchestratorStore<I, S>,
    sessions: S,
    clock: Arc<dyn Clock>,
    lifecycle: Mutex<Lifecycle>,
}

impl<I, S> AuthOrchestrator<I, S>
where
    I: IdentityClient + Clone + 'static,
    S: SessionStore + Clone + 'static,
{
    /// Create an orchestrator in `Initializing`. Nothing runs until
    /// [`start`](Self::start).
    #[must_use]
    pub fn new(environment: OrchestratorEnvironment<I, S>) -> Self {
        let sessions = environment.sessions.clone();
        let clock = Arc::clone(&environment.clock);
        let store = Store::new(
            OrchestratorState::default(),
            OrchestratorReducer::new(),
            environment,
        );

        Self {
            store,
            sessions,
            clock,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Subscribe to backend session changes, then run the page-load pipeline.
    ///
    /// Returns once the pipeline is started, not settled; use
    /// [`settled`](Self::settled) or a [`RenderGate`] to wait. A second call
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if the orchestrator was torn down.
    pub async fn start(&self) -> Result<()> {
        if !self.store.is_alive() {
            return Err(StoreError::Abandoned.into());
        }

        {
            let mut lifecycle = self.lifecycle();
            if lifecycle.started {
                tracing::debug!("Orchestrator already started");
                return Ok(());
            }
            lifecycle.started = true;

            let (events_tx, mut events_rx) = mpsc::unbounded_channel::<SessionEvent>();
            lifecycle.subscription = Some(self.sessions.subscribe(move |event| {
                let _ = events_tx.send(event.clone());
            }));

            let store = self.store.clone();
            lifecycle.forwarder = Some(tokio::spawn(async move {
                while let Some(event) = events_rx.recv().await {
                    if store
                        .send(OrchestratorAction::BackendSessionChanged { event })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            }));
        }

        tracing::info!("Starting auth orchestrator");
        self.store.send(OrchestratorAction::Start).await?;
        Ok(())
    }

    /// The reconciled state as of the last reduction.
    #[must_use]
    pub fn snapshot(&self) -> ReconciledAuthState {
        self.reader().current()
    }

    /// A reader over every published snapshot.
    #[must_use]
    pub fn reader(&self) -> AuthStateReader {
        AuthStateReader::new(self.store.observe())
    }

    /// A render gate for protected content.
    #[must_use]
    pub fn gate(&self) -> RenderGate {
        RenderGate::new(self.reader())
    }

    /// Wait until the phase is `Settled`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if the orchestrator is torn down
    /// before or while waiting.
    pub async fn settled(&self) -> Result<ReconciledAuthState> {
        if !self.store.is_alive() {
            return Err(StoreError::Abandoned.into());
        }

        let mut reader = self.reader();
        tokio::select! {
            biased;
            settled = reader.wait_for_settled() => settled.ok_or_else(|| StoreError::Abandoned.into()),
            () = self.store.abandoned() => Err(StoreError::Abandoned.into()),
        }
    }

    /// Phases entered so far, oldest first.
    #[must_use]
    pub fn phase_history(&self) -> Vec<AuthPhase> {
        self.store.observe().borrow().phase_history.clone()
    }

    /// Whether either session currently authenticates the user.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated(self.clock.now())
    }

    /// Ask the identity client for a fresh session without interaction.
    ///
    /// Ignored unless settled with an initialized identity client. A failure
    /// enters `Error` and recovers like a failed redirect.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if the orchestrator was torn down.
    pub async fn refresh_identity(&self) -> Result<ReconciledAuthState> {
        self.dispatch(OrchestratorAction::RefreshIdentity).await
    }

    /// Sign out of the backend session. The identity session is untouched.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if the orchestrator was torn down.
    pub async fn sign_out(&self) -> Result<ReconciledAuthState> {
        self.dispatch(OrchestratorAction::SignOut).await
    }

    /// Send the user to the identity provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InternalError` if the orchestrator was torn down.
    pub async fn begin_login(&self) -> Result<ReconciledAuthState> {
        self.dispatch(OrchestratorAction::BeginLogin).await
    }

    /// Abandon the pipeline and release the session store listener.
    ///
    /// In-flight provider calls may still finish, but their results are
    /// discarded. Idempotent.
    pub fn teardown(&self) {
        self.store.abandon();

        let mut lifecycle = self.lifecycle();
        if let Some(subscription) = lifecycle.subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(forwarder) = lifecycle.forwarder.take() {
            forwarder.abort();
        }
        tracing::debug!("Auth orchestrator torn down");
    }

    async fn dispatch(&self, action: OrchestratorAction) -> Result<ReconciledAuthState> {
        let mut handle = self.store.send(action).await.map_err(AuthError::from)?;
        handle.wait().await;
        Ok(self.snapshot())
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
