//! Orchestrator reducer.
//!
//! This module implements the pure logic of the dual-identity orchestrator.
//!
//! # Flow
//!
//! ```text
//! Start ─┬─► load backend session ───────────────► BackendSessionLoaded
//!        │
//!        ├─ no provider ─► Settled (identity absent)
//!        │
//!        └─► initialize ─► IdentityInitialized ─► AwaitingRedirect
//!                                                  │
//!                      complete_redirect_if_present ─► RedirectResolved
//!                                                  │
//!                     NoRedirectPending / Completed ─► Settled
//!                                            Failed ─► Error ─(delay)─► Settled
//! ```
//!
//! The redirect-completion effect is produced only by the arm handling
//! `IdentityInitialized`, so completion can never run before initialization.
//! Backend session updates touch `backend` only and never change the phase.

use crate::actions::OrchestratorAction;
use crate::environment::OrchestratorEnvironment;
use crate::error::{ErrorDescriptor, ErrorKind};
use crate::providers::session::SessionEvent;
use crate::providers::{IdentityClient, SessionStore};
use crate::state::{AuthPhase, BackendSession, OrchestratorState, RedirectOutcome};
use authgate_core::effect::Effect;
use authgate_core::environment::Clock;
use authgate_core::reducer::Reducer;
use authgate_core::{async_effect, delay, future_result, smallvec, SmallVec};

type Effects = SmallVec<[Effect<OrchestratorAction>; 4]>;

/// Orchestrator reducer.
///
/// Sequences identity-client initialization before redirect completion and
/// merges backend session changes into the reconciled state.
#[derive(Debug, Clone)]
pub struct OrchestratorReducer<I, S> {
    /// Phantom data to hold type parameters.
    _phantom: std::marker::PhantomData<(I, S)>,
}

impl<I, S> OrchestratorReducer<I, S> {
    /// Create a new orchestrator reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<I, S> Default for OrchestratorReducer<I, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, S> OrchestratorReducer<I, S>
where
    I: IdentityClient + Clone + 'static,
    S: SessionStore + Clone + 'static,
{
    fn load_backend_session(env: &OrchestratorEnvironment<I, S>) -> Effect<OrchestratorAction> {
        let sessions = env.sessions.clone();
        async_effect! {
            let session = sessions.current_session().await;
            Some(OrchestratorAction::BackendSessionLoaded { session })
        }
    }

    fn initialize_identity(
        env: &OrchestratorEnvironment<I, S>,
        client_id: String,
        tenant_id: String,
    ) -> Effect<OrchestratorAction> {
        let identity = env.identity.clone();
        future_result! {
            future: async move { identity.initialize(&client_id, &tenant_id).await },
            ok: |()| OrchestratorAction::IdentityInitialized,
            err: |error| OrchestratorAction::IdentityInitializationFailed {
                error: error.descriptor(),
            }
        }
    }

    fn complete_redirect(env: &OrchestratorEnvironment<I, S>) -> Effect<OrchestratorAction> {
        let identity = env.identity.clone();
        async_effect! {
            let outcome = identity
                .complete_redirect_if_present()
                .await
                .unwrap_or_else(|error| RedirectOutcome::Failed(error.descriptor()));
            Some(OrchestratorAction::RedirectResolved { outcome })
        }
    }

    fn acquire_silently(env: &OrchestratorEnvironment<I, S>) -> Effect<OrchestratorAction> {
        let identity = env.identity.clone();
        future_result! {
            future: async move { identity.acquire_token_silent().await },
            ok: |session| OrchestratorAction::SilentRefreshCompleted { session },
            err: |error| OrchestratorAction::SilentRefreshFailed {
                error: error.descriptor(),
            }
        }
    }

    fn sign_out(env: &OrchestratorEnvironment<I, S>) -> Effect<OrchestratorAction> {
        let sessions = env.sessions.clone();
        future_result! {
            future: async move { sessions.sign_out().await },
            ok: |()| OrchestratorAction::SignOutCompleted,
            err: |error| OrchestratorAction::SignOutFailed {
                error: error.descriptor(),
            }
        }
    }

    fn begin_login(env: &OrchestratorEnvironment<I, S>) -> Effect<OrchestratorAction> {
        let identity = env.identity.clone();
        future_result! {
            future: async move { identity.begin_login_redirect().await },
            ok: |url| OrchestratorAction::LoginRedirectStarted { url },
            err: |error| OrchestratorAction::LoginRedirectFailed {
                error: error.descriptor(),
            }
        }
    }

    /// Enter `Error` and schedule the recovery that settles again.
    fn enter_error(
        state: &mut OrchestratorState,
        error: ErrorDescriptor,
        env: &OrchestratorEnvironment<I, S>,
    ) -> Effects {
        if error.kind == ErrorKind::NotInitialized {
            tracing::error!(error = %error, "Identity client called out of order");
        } else {
            tracing::warn!(error = %error, "Identity flow failed; recovering after delay");
        }

        if !state.transition(AuthPhase::Error) {
            return SmallVec::new();
        }

        state.recovery_epoch += 1;
        state.auth.error = Some(error);
        state.auth.identity = None;

        smallvec![delay! {
            duration: env.recovery_delay,
            action: OrchestratorAction::RecoveryElapsed { epoch: state.recovery_epoch }
        }]
    }

    fn apply_backend(
        state: &mut OrchestratorState,
        session: Option<BackendSession>,
        env: &OrchestratorEnvironment<I, S>,
    ) {
        let now = env.clock.now();
        state.auth.backend = session.filter(|session| {
            let expired = session.is_expired(now);
            if expired {
                tracing::debug!(subject_id = %session.subject_id, "Ignoring expired backend session");
            }
            !expired
        });
    }

    fn ignore(state: &OrchestratorState, action: &OrchestratorAction) -> Effects {
        tracing::debug!(
            action = action.name(),
            phase = %state.phase(),
            "Ignoring action in current phase"
        );
        SmallVec::new()
    }
}

impl<I, S> Reducer for OrchestratorReducer<I, S>
where
    I: IdentityClient + Clone + 'static,
    S: SessionStore + Clone + 'static,
{
    type State = OrchestratorState;
    type Action = OrchestratorAction;
    type Environment = OrchestratorEnvironment<I, S>;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        match action {
            // ═══════════════════════════════════════════════════════════════════
            // Page-load pipeline
            // ═══════════════════════════════════════════════════════════════════
            OrchestratorAction::Start => {
                if state.pipeline_started {
                    return Self::ignore(state, &OrchestratorAction::Start);
                }
                state.pipeline_started = true;

                let load = Self::load_backend_session(env);
                match &env.provider {
                    None => {
                        tracing::warn!("Identity provider not configured; settling without identity");
                        // Nothing to complete without a provider.
                        state.redirect_concluded = true;
                        state.auth.identity = None;
                        state.transition(AuthPhase::Settled);
                        smallvec![load]
                    },
                    Some(provider) => smallvec![
                        load,
                        Self::initialize_identity(
                            env,
                            provider.client_id.clone(),
                            provider.tenant_id.clone(),
                        ),
                    ],
                }
            },

            OrchestratorAction::IdentityInitialized => {
                if state.phase() != AuthPhase::Initializing {
                    return Self::ignore(state, &OrchestratorAction::IdentityInitialized);
                }
                state.identity_ready = true;
                state.transition(AuthPhase::AwaitingRedirect);
                smallvec![Self::complete_redirect(env)]
            },

            OrchestratorAction::IdentityInitializationFailed { error } => {
                if state.phase() != AuthPhase::Initializing {
                    return Self::ignore(state, &OrchestratorAction::IdentityInitializationFailed { error });
                }
                tracing::warn!(error = %error, "Identity client unavailable; settling without identity");
                state.redirect_concluded = true;
                state.auth.identity = None;
                state.transition(AuthPhase::Settled);
                SmallVec::new()
            },

            OrchestratorAction::RedirectResolved { outcome } => {
                if state.phase() != AuthPhase::AwaitingRedirect {
                    return Self::ignore(state, &OrchestratorAction::RedirectResolved { outcome });
                }
                state.redirect_concluded = true;

                match outcome {
                    RedirectOutcome::NoRedirectPending => {
                        state.transition(AuthPhase::Settled);
                        SmallVec::new()
                    },
                    RedirectOutcome::Completed(session) => {
                        state.auth.identity = Some(session);
                        state.auth.error = None;
                        state.transition(AuthPhase::Settled);
                        SmallVec::new()
                    },
                    RedirectOutcome::Failed(error) => Self::enter_error(state, error, env),
                }
            },

            OrchestratorAction::RecoveryElapsed { epoch } => {
                if state.phase() != AuthPhase::Error || epoch != state.recovery_epoch {
                    return Self::ignore(state, &OrchestratorAction::RecoveryElapsed { epoch });
                }
                tracing::info!(epoch, "Recovery delay elapsed; settling without identity");
                state.auth.error = None;
                state.auth.identity = None;
                state.transition(AuthPhase::Settled);
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════════
            // Silent refresh
            // ═══════════════════════════════════════════════════════════════════
            OrchestratorAction::RefreshIdentity => {
                if state.phase() != AuthPhase::Settled || !state.identity_ready {
                    return Self::ignore(state, &OrchestratorAction::RefreshIdentity);
                }
                smallvec![Self::acquire_silently(env)]
            },

            OrchestratorAction::SilentRefreshCompleted { session } => {
                if state.phase() != AuthPhase::Settled {
                    return Self::ignore(state, &OrchestratorAction::SilentRefreshCompleted { session });
                }
                state.auth.identity = session;
                SmallVec::new()
            },

            OrchestratorAction::SilentRefreshFailed { error } => {
                if state.phase() != AuthPhase::Settled {
                    return Self::ignore(state, &OrchestratorAction::SilentRefreshFailed { error });
                }
                Self::enter_error(state, error, env)
            },

            // ═══════════════════════════════════════════════════════════════════
            // Interactive login
            // ═══════════════════════════════════════════════════════════════════
            OrchestratorAction::BeginLogin => {
                if !state.identity_ready {
                    tracing::warn!("Login requested but identity provider is not available");
                    return SmallVec::new();
                }
                smallvec![Self::begin_login(env)]
            },

            OrchestratorAction::LoginRedirectStarted { url } => {
                tracing::info!(url = %url, "Redirecting to identity provider");
                SmallVec::new()
            },

            OrchestratorAction::LoginRedirectFailed { error } => {
                tracing::warn!(error = %error, "Could not start login redirect");
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════════
            // Backend session (never changes the phase)
            // ═══════════════════════════════════════════════════════════════════
            OrchestratorAction::BackendSessionLoaded { session } => {
                if state.backend_changed {
                    tracing::debug!("Initial backend session load superseded by a later change");
                } else {
                    Self::apply_backend(state, session, env);
                }
                SmallVec::new()
            },

            OrchestratorAction::BackendSessionChanged { event } => {
                tracing::debug!(event = event.name(), "Backend session changed");
                state.backend_changed = true;
                match event {
                    SessionEvent::SignedIn(session) | SessionEvent::TokenRefreshed(session) => {
                        Self::apply_backend(state, Some(session), env);
                    },
                    SessionEvent::SignedOut => state.auth.backend = None,
                    SessionEvent::Failed(error) => {
                        tracing::warn!(error = %error, "Backend session unavailable; treating as absent");
                        state.auth.backend = None;
                    },
                }
                SmallVec::new()
            },

            OrchestratorAction::SignOut => smallvec![Self::sign_out(env)],

            OrchestratorAction::SignOutCompleted => {
                state.backend_changed = true;
                state.auth.backend = None;
                SmallVec::new()
            },

            OrchestratorAction::SignOutFailed { error } => {
                tracing::warn!(error = %error, "Remote sign-out failed");
                state.backend_changed = true;
                state.auth.backend = None;
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ProviderIdentifiers;
    use crate::mocks::{MockIdentityClient, MockSessionStore};
    use crate::state::IdentitySession;
    use authgate_testing::{assertions, epoch, ManualClock, ReducerTest};
    use chrono::Duration as ChronoDuration;
    use std::sync::Arc;
    use std::time::Duration;

    type TestReducer = OrchestratorReducer<MockIdentityClient, MockSessionStore>;
    type TestEnv = OrchestratorEnvironment<MockIdentityClient, MockSessionStore>;

    fn env(provider: bool) -> TestEnv {
        let provider = provider.then(|| ProviderIdentifiers {
            client_id: "client-1".to_string(),
            tenant_id: "tenant-1".to_string(),
        });
        OrchestratorEnvironment::new(MockIdentityClient::new(), MockSessionStore::new())
            .with_provider(provider)
            .with_clock(Arc::new(ManualClock::starting_at(epoch())))
    }

    fn alice() -> IdentitySession {
        IdentitySession::new("oid-1.tid-1", epoch())
    }

    fn backend(hours: i64) -> BackendSession {
        BackendSession::new("subject-1", epoch() + ChronoDuration::hours(hours))
    }

    fn settled_with(identity: Option<IdentitySession>) -> OrchestratorState {
        let mut state = OrchestratorState::default();
        state.pipeline_started = true;
        state.identity_ready = true;
        state.redirect_concluded = true;
        state.transition(AuthPhase::AwaitingRedirect);
        state.transition(AuthPhase::Settled);
        state.auth.identity = identity;
        state
    }

    #[test]
    fn test_start_with_provider_initializes_first() {
        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(OrchestratorState::default())
            .when_action(OrchestratorAction::Start)
            .then_state(|state| {
                assert_eq!(state.phase(), AuthPhase::Initializing);
                assert!(state.pipeline_started);
                assert!(!state.redirect_concluded);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 2);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_start_without_provider_settles_immediately() {
        ReducerTest::new(TestReducer::new())
            .with_env(env(false))
            .given_state(OrchestratorState::default())
            .when_action(OrchestratorAction::Start)
            .then_state(|state| {
                assert_eq!(state.phase_history, vec![AuthPhase::Initializing, AuthPhase::Settled]);
                assert!(state.auth.identity.is_none());
                assert!(state.auth.error.is_none());
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn test_second_start_is_ignored() {
        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(OrchestratorState::default())
            .when_actions([OrchestratorAction::Start, OrchestratorAction::Start])
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_no_redirect_settles_through_awaiting_redirect() {
        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(OrchestratorState::default())
            .when_actions([
                OrchestratorAction::Start,
                OrchestratorAction::IdentityInitialized,
                OrchestratorAction::RedirectResolved {
                    outcome: RedirectOutcome::NoRedirectPending,
                },
            ])
            .then_path(|path| {
                let phases: Vec<_> = path.iter().map(OrchestratorState::phase).collect();
                assert_eq!(
                    phases,
                    vec![AuthPhase::Initializing, AuthPhase::AwaitingRedirect, AuthPhase::Settled]
                );
            })
            .then_state(|state| {
                assert!(state.redirect_concluded);
                assert!(state.auth.identity.is_none());
            })
            .run();
    }

    #[test]
    fn test_completed_redirect_sets_identity() {
        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(OrchestratorState::default())
            .when_actions([
                OrchestratorAction::Start,
                OrchestratorAction::IdentityInitialized,
                OrchestratorAction::RedirectResolved {
                    outcome: RedirectOutcome::Completed(alice()),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.phase(), AuthPhase::Settled);
                assert_eq!(state.auth.identity, Some(alice()));
            })
            .run();
    }

    #[test]
    fn test_failed_redirect_enters_error_and_schedules_recovery() {
        let error = ErrorDescriptor::redirect_failed("state mismatch");
        let expected = error.clone();

        ReducerTest::new(TestReducer::new())
            .with_env(env(true).with_recovery_delay(Duration::from_secs(5)))
            .given_state(OrchestratorState::default())
            .when_actions([
                OrchestratorAction::Start,
                OrchestratorAction::IdentityInitialized,
                OrchestratorAction::RedirectResolved {
                    outcome: RedirectOutcome::Failed(error),
                },
            ])
            .then_state(move |state| {
                assert_eq!(state.phase(), AuthPhase::Error);
                assert_eq!(state.auth.error, Some(expected));
                assert!(state.auth.identity.is_none());
                assert_eq!(state.recovery_epoch, 1);
            })
            .then_effects(|effects| {
                let (duration, action) = assertions::expect_single_delay(effects);
                assert_eq!(duration, Duration::from_secs(5));
                assert_eq!(action, OrchestratorAction::RecoveryElapsed { epoch: 1 });
            })
            .run();
    }

    #[test]
    fn test_recovery_settles_without_identity() {
        let mut state = settled_with(Some(alice()));
        state.transition(AuthPhase::Error);
        state.recovery_epoch = 1;
        state.auth.error = Some(ErrorDescriptor::redirect_failed("boom"));

        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(state)
            .when_action(OrchestratorAction::RecoveryElapsed { epoch: 1 })
            .then_state(|state| {
                assert_eq!(state.phase(), AuthPhase::Settled);
                assert!(state.auth.error.is_none());
                assert!(state.auth.identity.is_none());
            })
            .run();
    }

    #[test]
    fn test_stale_recovery_timer_is_ignored() {
        let mut state = settled_with(None);
        state.transition(AuthPhase::Error);
        state.recovery_epoch = 2;

        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(state)
            .when_action(OrchestratorAction::RecoveryElapsed { epoch: 1 })
            .then_state(|state| assert_eq!(state.phase(), AuthPhase::Error))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_late_redirect_result_cannot_regress_phase() {
        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(settled_with(None))
            .when_actions([
                OrchestratorAction::IdentityInitialized,
                OrchestratorAction::RedirectResolved {
                    outcome: RedirectOutcome::Completed(alice()),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.phase(), AuthPhase::Settled);
                assert!(state.auth.identity.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_not_initialized_is_treated_as_failure() {
        let error = crate::error::AuthError::NotInitialized.descriptor();

        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(OrchestratorState::default())
            .when_actions([
                OrchestratorAction::Start,
                OrchestratorAction::IdentityInitialized,
                OrchestratorAction::RedirectResolved {
                    outcome: RedirectOutcome::Failed(error),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.phase(), AuthPhase::Error);
                assert_eq!(state.auth.error.as_ref().unwrap().kind, ErrorKind::NotInitialized);
            })
            .run();
    }

    #[test]
    fn test_initialization_failure_settles_degraded() {
        let error = crate::error::AuthError::Misconfigured {
            reason: "missing".to_string(),
        }
        .descriptor();

        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(OrchestratorState::default())
            .when_actions([
                OrchestratorAction::Start,
                OrchestratorAction::IdentityInitializationFailed { error },
            ])
            .then_state(|state| {
                assert_eq!(state.phase_history, vec![AuthPhase::Initializing, AuthPhase::Settled]);
                assert!(!state.identity_ready);
                assert!(state.auth.error.is_none());
            })
            .run();
    }

    #[test]
    fn test_backend_events_never_touch_phase_or_identity() {
        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(settled_with(Some(alice())))
            .when_actions([
                OrchestratorAction::BackendSessionChanged {
                    event: SessionEvent::SignedIn(backend(1)),
                },
                OrchestratorAction::BackendSessionChanged {
                    event: SessionEvent::SignedOut,
                },
            ])
            .then_path(|path| {
                assert_eq!(path[0].auth.backend, Some(backend(1)));
                assert_eq!(path[1].auth.backend, None);
                for state in path {
                    assert_eq!(state.phase(), AuthPhase::Settled);
                    assert_eq!(state.auth.identity, Some(alice()));
                }
            })
            .run();
    }

    #[test]
    fn test_backend_load_during_initialization_keeps_phase() {
        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(OrchestratorState::default())
            .when_actions([
                OrchestratorAction::Start,
                OrchestratorAction::BackendSessionLoaded {
                    session: Some(backend(1)),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.phase(), AuthPhase::Initializing);
                assert_eq!(state.auth.backend, Some(backend(1)));
            })
            .run();
    }

    #[test]
    fn test_late_initial_load_does_not_undo_sign_out() {
        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(settled_with(None))
            .when_actions([
                OrchestratorAction::BackendSessionChanged {
                    event: SessionEvent::SignedOut,
                },
                OrchestratorAction::BackendSessionLoaded {
                    session: Some(backend(1)),
                },
            ])
            .then_state(|state| {
                assert!(state.backend_changed);
                assert!(state.auth.backend.is_none());
            })
            .run();
    }

    #[test]
    fn test_late_initial_load_does_not_replace_pushed_session() {
        let pushed = BackendSession::new("bob", epoch() + ChronoDuration::hours(2));

        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(OrchestratorState::default())
            .when_actions([
                OrchestratorAction::Start,
                OrchestratorAction::BackendSessionChanged {
                    event: SessionEvent::SignedIn(pushed.clone()),
                },
                OrchestratorAction::BackendSessionLoaded { session: None },
            ])
            .then_state(|state| assert_eq!(state.auth.backend, Some(pushed)))
            .run();
    }

    #[test]
    fn test_expired_backend_session_is_dropped() {
        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(settled_with(None))
            .when_action(OrchestratorAction::BackendSessionLoaded {
                session: Some(backend(-1)),
            })
            .then_state(|state| assert!(state.auth.backend.is_none()))
            .run();
    }

    #[test]
    fn test_silent_refresh_failure_enters_error() {
        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(settled_with(Some(alice())))
            .when_action(OrchestratorAction::SilentRefreshFailed {
                error: crate::error::AuthError::SilentRefreshFailed {
                    reason: "invalid_grant".to_string(),
                }
                .descriptor(),
            })
            .then_state(|state| {
                assert_eq!(state.phase(), AuthPhase::Error);
                assert!(state.auth.identity.is_none());
            })
            .then_effects(|effects| {
                let (_, action) = assertions::expect_single_delay(effects);
                assert_eq!(action, OrchestratorAction::RecoveryElapsed { epoch: 1 });
            })
            .run();
    }

    #[test]
    fn test_refresh_requires_settled_and_ready() {
        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(OrchestratorState::default())
            .when_action(OrchestratorAction::RefreshIdentity)
            .then_effects(assertions::assert_no_effects)
            .run();

        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(settled_with(None))
            .when_action(OrchestratorAction::RefreshIdentity)
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_silent_refresh_replaces_identity_wholesale() {
        let refreshed = IdentitySession::new("oid-1.tid-1", epoch() + ChronoDuration::hours(1));
        let expected = refreshed.clone();

        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(settled_with(Some(alice())))
            .when_action(OrchestratorAction::SilentRefreshCompleted {
                session: Some(refreshed),
            })
            .then_state(move |state| assert_eq!(state.auth.identity, Some(expected)))
            .run();
    }

    #[test]
    fn test_sign_out_clears_backend() {
        let mut state = settled_with(None);
        state.auth.backend = Some(backend(1));

        ReducerTest::new(TestReducer::new())
            .with_env(env(true))
            .given_state(state)
            .when_actions([OrchestratorAction::SignOut, OrchestratorAction::SignOutCompleted])
            .then_path(|path| {
                assert!(path[0].auth.backend.is_some());
                assert!(path[1].auth.backend.is_none());
            })
            .run();
    }

    #[test]
    fn test_login_requires_initialized_identity() {
        ReducerTest::new(TestReducer::new())
            .with_env(env(false))
            .given_state(OrchestratorState::default())
            .when_actions([OrchestratorAction::Start, OrchestratorAction::BeginLogin])
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
