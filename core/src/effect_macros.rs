//! Declarative macros for ergonomic effect construction
//!
//! Reducers return a lot of "call a collaborator, turn the outcome into an
//! action" effects. These macros keep those arms short.

/// Create an `Effect::Future` from an async block body
///
/// The body is moved into an `async move` block and must evaluate to
/// `Option<Action>`.
///
/// # Example
///
/// ```rust,ignore
/// use authgate_core::async_effect;
///
/// async_effect! {
///     let session = sessions.current_session().await;
///     Some(Action::BackendSessionLoaded { session })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Future` that awaits a `Result` and maps both arms to actions
///
/// Both mappings must evaluate to an action; the effect always feeds one back.
///
/// # Example
///
/// ```rust,ignore
/// use authgate_core::future_result;
///
/// future_result! {
///     future: async move { identity.initialize(&client_id, &tenant_id).await },
///     ok: |()| Action::IdentityInitialized,
///     err: |error| Action::IdentityInitializationFailed { error: error.descriptor() }
/// }
/// ```
#[macro_export]
macro_rules! future_result {
    (
        future: $future:expr,
        ok: |$ok:pat_param| $ok_body:expr,
        err: |$err:pat_param| $err_body:expr
    ) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            match $future.await {
                ::std::result::Result::Ok($ok) => ::std::option::Option::Some($ok_body),
                ::std::result::Result::Err($err) => ::std::option::Option::Some($err_body),
            }
        }))
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use authgate_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(5),
///     action: Action::RecoveryElapsed { epoch: 1 }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Loaded { value: i32 },
        LoadFailed { reason: String },
        RecoveryElapsed,
    }

    async fn load(succeed: bool) -> Result<i32, String> {
        if succeed { Ok(7) } else { Err("offline".to_string()) }
    }

    async fn run(effect: Effect<TestAction>) -> Option<TestAction> {
        match effect {
            Effect::Future(fut) => fut.await,
            _ => None,
        }
    }

    #[test]
    fn test_async_effect_macro() {
        let effect = async_effect! {
            Some(TestAction::Loaded { value: 42 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }

    #[tokio::test]
    async fn test_future_result_maps_ok_arm() {
        let effect = future_result! {
            future: load(true),
            ok: |value| TestAction::Loaded { value },
            err: |reason| TestAction::LoadFailed { reason }
        };

        assert_eq!(run(effect).await, Some(TestAction::Loaded { value: 7 }));
    }

    #[tokio::test]
    async fn test_future_result_maps_err_arm() {
        let effect = future_result! {
            future: load(false),
            ok: |value| TestAction::Loaded { value },
            err: |reason| TestAction::LoadFailed { reason }
        };

        assert_eq!(
            run(effect).await,
            Some(TestAction::LoadFailed { reason: "offline".to_string() })
        );
    }

    #[test]
    fn test_delay_macro() {
        let effect = delay! {
            duration: Duration::from_secs(5),
            action: TestAction::RecoveryElapsed
        };

        assert_eq!(
            effect.as_delay(),
            Some((Duration::from_secs(5), &TestAction::RecoveryElapsed))
        );
    }
}
