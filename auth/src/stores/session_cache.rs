//! Cached session store.
//!
//! Wraps a [`SessionBackend`] with a local cache, transparent retries, and
//! change notification. Each read is compared to the cache and the
//! difference is announced to subscribers:
//!
//! | cached  | read     | event            |
//! |---------|----------|------------------|
//! | none    | session  | `SignedIn`       |
//! | session | none     | `SignedOut`      |
//! | A       | B, same subject | `TokenRefreshed` |
//! | A       | B, other subject | `SignedIn`  |

use crate::config::SessionConfig;
use crate::error::{AuthError, Result};
use crate::providers::session::{SessionBackend, SessionEvent, SessionStore};
use crate::state::BackendSession;
use crate::stores::listeners::{ListenerRegistry, Subscription};
use authgate_core::environment::{Clock, SystemClock};
use authgate_runtime::retry::{retry_with_predicate, RetryPolicy};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Cache {
    session: Option<BackendSession>,
    /// Bumped by every local change; reads started before it are stale.
    generation: u64,
    consecutive_failures: u32,
    failure_reported: bool,
}

/// Session store backed by a [`SessionBackend`].
///
/// Clones share the cache and the listeners.
pub struct CachedSessionStore<B> {
    backend: B,
    cache: Arc<Mutex<Cache>>,
    listeners: ListenerRegistry,
    retry: RetryPolicy,
    failure_threshold: u32,
    clock: Arc<dyn Clock>,
}

impl<B: SessionBackend> CachedSessionStore<B> {
    /// Create a store over `backend`.
    #[must_use]
    pub fn new(backend: B, config: &SessionConfig) -> Self {
        Self {
            backend,
            cache: Arc::new(Mutex::new(Cache::default())),
            listeners: ListenerRegistry::new(),
            retry: RetryPolicy::default(),
            failure_threshold: config.failure_threshold.max(1),
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the retry policy for reads.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Use `clock` for expiry checks.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of subscribed listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Read from the backend, bypassing the cache.
    ///
    /// A read that was started before a sign-out or a pushed change is
    /// discarded and the newer cached value is returned instead.
    pub async fn refresh(&self) -> Option<BackendSession> {
        let generation = self.lock().generation;
        let result = retry_with_predicate(
            &self.retry,
            "session_read",
            || self.backend.fetch_session(),
            AuthError::is_transient,
        )
        .await;

        match result {
            Ok(session) => {
                let now = self.clock.now();
                self.record_read(session.filter(|s| !s.is_expired(now)), generation)
            },
            Err(error) => {
                self.record_failure(&error);
                None
            },
        }
    }

    /// Apply a change pushed by the backend (e.g. from another tab) and
    /// notify subscribers.
    pub fn record_remote_change(&self, event: SessionEvent) {
        {
            let mut cache = self.lock();
            cache.generation += 1;
            match &event {
                SessionEvent::SignedIn(session) | SessionEvent::TokenRefreshed(session) => {
                    cache.session = Some(session.clone());
                },
                SessionEvent::SignedOut => cache.session = None,
                SessionEvent::Failed(_) => {},
            }
        }
        self.listeners.notify(&event);
    }

    fn lock(&self) -> MutexGuard<'_, Cache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_read(&self, read: Option<BackendSession>, generation: u64) -> Option<BackendSession> {
        let event = {
            let mut cache = self.lock();
            if cache.generation != generation {
                tracing::debug!("Discarding session read overtaken by a local change");
                return cache.session.clone();
            }
            cache.consecutive_failures = 0;
            cache.failure_reported = false;

            let event = match (&cache.session, &read) {
                (None, Some(new)) => Some(SessionEvent::SignedIn(new.clone())),
                (Some(_), None) => Some(SessionEvent::SignedOut),
                (Some(old), Some(new)) if old != new => Some(if old.subject_id == new.subject_id {
                    SessionEvent::TokenRefreshed(new.clone())
                } else {
                    SessionEvent::SignedIn(new.clone())
                }),
                _ => None,
            };
            cache.session.clone_from(&read);
            event
        };

        if let Some(event) = event {
            self.listeners.notify(&event);
        }
        read
    }

    fn record_failure(&self, error: &AuthError) {
        let report = {
            let mut cache = self.lock();
            cache.consecutive_failures = cache.consecutive_failures.saturating_add(1);
            tracing::warn!(
                error = %error,
                consecutive_failures = cache.consecutive_failures,
                "Session read failed; treating as absent"
            );

            let report = cache.consecutive_failures >= self.failure_threshold && !cache.failure_reported;
            if report {
                cache.failure_reported = true;
            }
            report
        };

        if report {
            tracing::error!(threshold = self.failure_threshold, "Session reads keep failing");
            self.listeners.notify(&SessionEvent::Failed(error.descriptor()));
        }
    }
}

impl<B: Clone> Clone for CachedSessionStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            cache: Arc::clone(&self.cache),
            listeners: self.listeners.clone(),
            retry: self.retry.clone(),
            failure_threshold: self.failure_threshold,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<B> std::fmt::Debug for CachedSessionStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSessionStore")
            .field("listeners", &self.listeners)
            .field("failure_threshold", &self.failure_threshold)
            .finish_non_exhaustive()
    }
}

impl<B: SessionBackend> SessionStore for CachedSessionStore<B> {
    async fn current_session(&self) -> Option<BackendSession> {
        let now = self.clock.now();
        let cached = self.lock().session.clone();
        if let Some(session) = cached.filter(|s| !s.is_expired(now)) {
            tracing::trace!("Serving cached session");
            return Some(session);
        }

        self.refresh().await
    }

    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }

    async fn sign_out(&self) -> Result<()> {
        let had_session = {
            let mut cache = self.lock();
            cache.generation += 1;
            cache.session.take().is_some()
        };
        if had_session {
            tracing::info!("Signing out of backend session");
            self.listeners.notify(&SessionEvent::SignedOut);
        }

        self.backend.revoke().await.map_err(|error| {
            tracing::warn!(error = %error, "Remote sign-out failed; local session cleared");
            match error {
                AuthError::SignOutFailed { .. } => error,
                other => AuthError::SignOutFailed {
                    reason: other.to_string(),
                },
            }
        })
    }
}
