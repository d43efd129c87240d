//! # Authgate Testing
//!
//! Testing utilities for authgate reducers and stores.
//!
//! This crate provides:
//! - A deterministic clock ([`ManualClock`]) pinned at [`epoch`]
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Effect assertions
//!
//! ## Example
//!
//! ```ignore
//! use authgate_testing::{epoch, ManualClock, ReducerTest};
//!
//! ReducerTest::new(OrchestratorReducer::new())
//!     .with_env(test_environment(ManualClock::starting_at(epoch())))
//!     .given_state(OrchestratorState::default())
//!     .when_actions([Action::Start, Action::IdentityInitialized])
//!     .then_state(|state| assert_eq!(state.auth.phase, AuthPhase::AwaitingRedirect))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use authgate_core::environment::Clock;


/// Mock clock for deterministic time.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Clock that only moves when told to.
    ///
    /// Clones share the same time, so a test can keep one handle and give
    /// another to the code under test.
    ///
    /// ```
    /// use authgate_testing::mocks::ManualClock;
    /// use authgate_core::environment::Clock;
    ///
    /// let clock = ManualClock::starting_at(authgate_testing::epoch());
    /// let shared = clock.clone();
    /// clock.advance(chrono::Duration::minutes(5));
    /// assert_eq!(shared.now(), authgate_testing::epoch() + chrono::Duration::minutes(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Create a clock starting at `time`.
        #[must_use]
        pub fn starting_at(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward.
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }

        /// Jump to an absolute time.
        pub fn set(&self, to: DateTime<Utc>) {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner) = to;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }
}

/// The instant every test clock starts at: 2025-01-01 00:00:00 UTC.
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default()
}

// Re-export commonly used items
pub use mocks::ManualClock;
pub use reducer_test::{assertions, ReducerTest};
