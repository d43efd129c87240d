//! # Authgate Core
//!
//! Core traits and types for the authgate reducer architecture.
//!
//! Authentication flows in authgate are modelled as state machines driven by a
//! reducer. The reducer never performs I/O itself; it describes the work to be
//! done as [`effect::Effect`] values which the runtime executes and feeds back
//! as new actions.
//!
//! ## Core Concepts
//!
//! - **State**: Everything a flow knows at a given moment
//! - **Action**: All possible inputs (commands from the UI, results of effects)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected collaborators via traits
//!
//! ## Example
//!
//! ```ignore
//! use authgate_core::*;
//!
//! impl Reducer for LoginReducer {
//!     type State = LoginState;
//!     type Action = LoginAction;
//!     type Environment = LoginEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut LoginState,
//!         action: LoginAction,
//!         env: &LoginEnvironment,
//!     ) -> SmallVec<[Effect<LoginAction>; 4]> {
//!         match action {
//!             LoginAction::Start => {
//!                 state.started = true;
//!                 let provider = env.provider.clone();
//!                 smallvec![async_effect! {
//!                     Some(LoginAction::Finished(provider.login().await))
//!                 }]
//!             }
//!             LoginAction::Finished(_) => SmallVec::new(),
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Declarative helpers for building effects.
pub mod effect_macros;

/// Reducer module - The core trait for state machine logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They hold all transition rules and are deterministic and testable without
/// a runtime.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for transition logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected collaborators this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected collaborators
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action against the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// Most actions produce zero or one effect, so the result is stored
        /// inline for up to four effects.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe work for the runtime. They are values, not execution:
/// returning an effect from a reducer does nothing until a store runs it.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Delayed action (timeouts, recovery timers)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Returns `true` for [`Effect::None`].
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// The delayed action and its duration, if this is an [`Effect::Delay`].
        #[must_use]
        pub fn as_delay(&self) -> Option<(Duration, &Action)> {
            match self {
                Effect::Delay { duration, action } => Some((*duration, action.as_ref())),
                _ => None,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// Collaborators that reach outside the process are abstracted behind traits
/// and injected via the reducer's Environment.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock backed by [`Utc::now`].
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Ping {
        Pong,
    }

    #[test]
    fn test_effect_debug_hides_future() {
        let effect: Effect<Ping> = Effect::Future(Box::pin(async { Some(Ping::Pong) }));
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
    }

    #[test]
    fn test_delay_accessor() {
        let effect = Effect::Delay {
            duration: Duration::from_secs(5),
            action: Box::new(Ping::Pong),
        };

        assert_eq!(effect.as_delay(), Some((Duration::from_secs(5), &Ping::Pong)));
        assert!(!effect.is_none());
        assert!(Effect::<Ping>::None.as_delay().is_none());
    }

}
