//! # Authgate Runtime
//!
//! Runtime implementation for the authgate reducer architecture.
//!
//! This crate provides the [`Store`] that coordinates reducer execution and
//! effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns state, runs the reducer, executes effects
//! - **State observation**: Every reduction publishes a snapshot on a watch channel
//! - **Liveness**: An abandoned store rejects actions, so effects that resolve
//!   after teardown never write state
//!
//! ## Example
//!
//! ```ignore
//! use authgate_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! store.send(Action::Start).await?;
//!
//! let mut states = store.observe();
//! states.wait_for(|s| s.is_settled()).await?;
//! ```

use authgate_core::{effect::Effect, reducer::Reducer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

/// Retry logic with exponential backoff
pub mod retry;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// The store has been abandoned (its host was torn down).
        ///
        /// Returned by `send()` after `abandon()`.
        #[error("Store has been abandoned")]
        Abandoned,
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects started by
/// one action. Actions fed back by those effects get their own handles and
/// are not tracked here.
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Number of effects from this action still running.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracking clone is gone, so nothing is left running.
                break;
            }
        }
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: tracking context shared by the effects of one action
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Keeps the counter accurate even if the effect task panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{Arc, DecrementGuard, Effect, EffectHandle, EffectTracking, Reducer, RwLock, StoreError};
    use tokio::sync::watch;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; the reducer runs under the write lock)
    /// 2. A watch channel carrying the latest state snapshot
    /// 3. Reducer and environment
    /// 4. Effect execution with a feedback loop
    /// 5. A liveness flag checked before every state write
    ///
    /// Cloning a store is cheap; clones share everything.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        published: Arc<watch::Sender<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        /// `true` until abandoned; a channel so waiters can observe teardown.
        alive: Arc<watch::Sender<bool>>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + 'static,
        S: Clone + Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (published, _) = watch::channel(initial_state.clone());
            let (alive, _) = watch::channel(true);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                published: Arc::new(published),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                alive: Arc::new(alive),
            }
        }

        /// Whether the store still accepts actions.
        #[must_use]
        pub fn is_alive(&self) -> bool {
            *self.alive.borrow()
        }

        /// Abandon the store.
        ///
        /// Further `send()` calls fail with [`StoreError::Abandoned`] and
        /// in-flight effects drop their results instead of feeding them back.
        /// Running effect tasks are not cancelled; they simply find the store
        /// dead when they finish.
        pub fn abandon(&self) {
            if self.alive.send_replace(false) {
                tracing::info!("Store abandoned");
                metrics::counter!("store.abandoned").increment(1);
            }
        }

        /// Resolve once the store has been abandoned.
        ///
        /// Resolves immediately if it already was.
        pub async fn abandoned(&self) {
            let mut alive = self.alive.subscribe();
            // The sender lives as long as `self`, so this only returns on `false`.
            let _ = alive.wait_for(|alive| !*alive).await;
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Re-checks liveness (teardown may have happened while waiting)
        /// 3. Runs the reducer and publishes the new snapshot
        /// 4. Starts the returned effects in spawned tasks
        ///
        /// `send()` returns once effects are started, not finished; use the
        /// returned [`EffectHandle`] to wait for them.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Abandoned`] if the store has been abandoned.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            if !self.is_alive() {
                tracing::debug!("Rejected action: store abandoned");
                metrics::counter!("store.actions.rejected").increment(1);
                return Err(StoreError::Abandoned);
            }

            metrics::counter!("store.actions.total").increment(1);
            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;

                if !self.is_alive() {
                    metrics::counter!("store.actions.rejected").increment(1);
                    return Err(StoreError::Abandoned);
                }

                let effects = self.reducer.reduce(&mut state, action, &self.environment);
                self.published.send_replace(state.clone());

                tracing::trace!(effects = effects.len(), "Reducer completed");
                effects
            };

            for effect in effects {
                self.execute_effect(effect, tracking.clone());
            }

            Ok(handle)
        }

        /// Observe state snapshots.
        ///
        /// The receiver always holds the state as of the last completed
        /// reduction; intermediate snapshots may be skipped by slow readers.
        #[must_use]
        pub fn observe(&self) -> watch::Receiver<S> {
            self.published.subscribe()
        }

        /// Read current state via a closure
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking) {
            if effect.is_none() {
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                return;
            }

            tracking.increment();
            let guard = DecrementGuard(tracking);
            let store = self.clone();

            tokio::spawn(async move {
                let _guard = guard;
                store.run_effect(effect).await;
            });
        }

        async fn run_effect(&self, effect: Effect<A>) {
            match effect {
                Effect::None => {},
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    if let Some(action) = fut.await {
                        self.feed_back(action).await;
                    }
                },
                Effect::Delay { duration, action } => {
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    tokio::time::sleep(duration).await;
                    self.feed_back(*action).await;
                },
            }
        }

        async fn feed_back(&self, action: A) {
            if !self.is_alive() {
                tracing::debug!("Dropping effect result: store abandoned");
                metrics::counter!("store.effects.dropped").increment(1);
                return;
            }

            if let Err(error) = self.send(action).await {
                tracing::debug!(%error, "Effect result not applied");
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                published: Arc::clone(&self.published),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                alive: Arc::clone(&self.alive),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
