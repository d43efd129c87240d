//! Listener registry shared by session store implementations.
//!
//! Listeners are invoked while the registry lock is held. Removing a
//! listener takes the same lock, so once [`Subscription::unsubscribe`]
//! returns no notification can still be running or start for it.
//! Listeners must not subscribe or unsubscribe from inside the callback.

use crate::providers::session::SessionEvent;
use std::sync::{Arc, Mutex, PoisonError, Weak};

type Listener = Box<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Set of session-change listeners.
///
/// Clones share the same listeners.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn add<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let mut registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Box::new(listener)));

        tracing::trace!(listener = id, "Session listener added");
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every registered listener, in registration order.
    pub fn notify(&self, event: &SessionEvent) {
        let registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(event = event.name(), listeners = registry.listeners.len(), "Notifying session listeners");
        for (_, listener) in &registry.listeners {
            listener(event);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Handle returned by `subscribe`.
///
/// Dropping it unsubscribes, so holding it in the owner's state ties the
/// listener's lifetime to the owner's.
#[must_use = "dropping the subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Remove the listener. No event reaches it after this returns.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }

    fn release(&self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.listeners.retain(|(id, _)| *id != self.id);
            tracing::trace!(listener = self.id, "Session listener removed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
