//! Mock session backend for testing.

use crate::error::{AuthError, Result};
use crate::providers::session::SessionBackend;
use crate::state::BackendSession;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct Remote {
    session: Option<BackendSession>,
    scripted: VecDeque<Result<Option<BackendSession>>>,
    revoke_error: Option<AuthError>,
}

/// Mock session backend.
///
/// Holds one remote session. Scripted results (failures, typically) are
/// returned first; after that every fetch returns the remote session.
#[derive(Debug, Clone, Default)]
pub struct MockSessionBackend {
    remote: Arc<Mutex<Remote>>,
    fetches: Arc<AtomicUsize>,
    revokes: Arc<AtomicUsize>,
}

impl MockSessionBackend {
    /// Create a backend with no session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend holding `session`.
    #[must_use]
    pub fn with_session(session: BackendSession) -> Self {
        let backend = Self::new();
        backend.set_session(Some(session));
        backend
    }

    /// Replace the remote session.
    pub fn set_session(&self, session: Option<BackendSession>) {
        self.lock().session = session;
    }

    /// Queue a result for the next fetch.
    pub fn push_fetch(&self, result: Result<Option<BackendSession>>) {
        self.lock().scripted.push_back(result);
    }

    /// Queue `count` transient read failures.
    pub fn fail_next_fetches(&self, count: usize) {
        for _ in 0..count {
            self.push_fetch(Err(AuthError::SessionReadFailed {
                reason: "connection refused".to_string(),
            }));
        }
    }

    /// Make every revoke fail with `error`.
    pub fn fail_revokes(&self, error: AuthError) {
        self.lock().revoke_error = Some(error);
    }

    /// Number of fetches received.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of revokes received.
    #[must_use]
    pub fn revoke_count(&self) -> usize {
        self.revokes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Remote> {
        self.remote.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionBackend for MockSessionBackend {
    async fn fetch_session(&self) -> Result<Option<BackendSession>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut remote = self.lock();
        match remote.scripted.pop_front() {
            Some(result) => result,
            None => Ok(remote.session.clone()),
        }
    }

    async fn revoke(&self) -> Result<()> {
        self.revokes.fetch_add(1, Ordering::SeqCst);
        let mut remote = self.lock();
        if let Some(error) = remote.revoke_error.clone() {
            return Err(error);
        }
        remote.session = None;
        Ok(())
    }
}
