//! Mock session store for testing.

use crate::error::Result;
use crate::providers::session::{SessionEvent, SessionStore};
use crate::state::BackendSession;
use crate::stores::{ListenerRegistry, Subscription};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Mock session store.
///
/// Keeps the session in memory. Tests drive transitions with
/// [`emit`](Self::emit).
#[derive(Debug, Clone, Default)]
pub struct MockSessionStore {
    session: Arc<Mutex<Option<BackendSession>>>,
    listeners: ListenerRegistry,
    reads: Arc<AtomicUsize>,
    sign_outs: Arc<AtomicUsize>,
}

impl MockSessionStore {
    /// Create a store with no session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `session`.
    #[must_use]
    pub fn with_session(session: BackendSession) -> Self {
        let store = Self::new();
        *store.lock() = Some(session);
        store
    }

    /// Apply `event` and deliver it to subscribers.
    pub fn emit(&self, event: SessionEvent) {
        match &event {
            SessionEvent::SignedIn(session) | SessionEvent::TokenRefreshed(session) => {
                *self.lock() = Some(session.clone());
            },
            SessionEvent::SignedOut => *self.lock() = None,
            SessionEvent::Failed(_) => {},
        }
        self.listeners.notify(&event);
    }

    /// Number of subscribed listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of `current_session` calls.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `sign_out` calls.
    #[must_use]
    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<BackendSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MockSessionStore {
    async fn current_session(&self) -> Option<BackendSession> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.lock().clone()
    }

    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }

    async fn sign_out(&self) -> Result<()> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        let had_session = self.lock().take().is_some();
        if had_session {
            self.listeners.notify(&SessionEvent::SignedOut);
        }
        Ok(())
    }
}
