//! Navigation context.
//!
//! The redirect flow reads the current location, rewrites it once the
//! redirect response is consumed, and keeps a small amount of
//! navigation-scoped state (the pending sign-in request) between leaving for
//! the provider and coming back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Access to the hosting page's location and transient storage.
pub trait Navigation: Send + Sync {
    /// The full current location (URL including query and fragment).
    fn location(&self) -> String;

    /// Rewrite the current location without a new navigation.
    fn replace_location(&self, url: &str);

    /// Navigate away to `url`.
    fn assign(&self, url: &str);

    /// Store a transient marker.
    fn set_marker(&self, key: &str, value: String);

    /// Remove and return a transient marker.
    fn take_marker(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Default)]
struct NavigationState {
    location: String,
    markers: HashMap<String, String>,
    visited: Vec<String>,
}

/// In-process navigation context.
///
/// Clones share the same location and markers, so the one handed to an
/// identity client can be driven from outside, e.g. to simulate the provider
/// sending the user back.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNavigation {
    state: Arc<Mutex<NavigationState>>,
}

impl InMemoryNavigation {
    /// Start at `location`.
    #[must_use]
    pub fn at(location: impl Into<String>) -> Self {
        let navigation = Self::default();
        navigation.navigate(location);
        navigation
    }

    /// Simulate a full page load of `location`. Markers survive.
    pub fn navigate(&self, location: impl Into<String>) {
        self.lock().location = location.into();
    }

    /// Every URL passed to [`Navigation::assign`], oldest first.
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.lock().visited.clone()
    }

    /// Read a marker without consuming it.
    #[must_use]
    pub fn marker(&self, key: &str) -> Option<String> {
        self.lock().markers.get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NavigationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigation for InMemoryNavigation {
    fn location(&self) -> String {
        self.lock().location.clone()
    }

    fn replace_location(&self, url: &str) {
        self.lock().location = url.to_string();
    }

    fn assign(&self, url: &str) {
        let mut state = self.lock();
        state.visited.push(url.to_string());
        state.location = url.to_string();
    }

    fn set_marker(&self, key: &str, value: String) {
        self.lock().markers.insert(key.to_string(), value);
    }

    fn take_marker(&self, key: &str) -> Option<String> {
        self.lock().markers.remove(key)
    }
}
