//! Retries with doubling backoff for flaky collaborators.
//!
//! Session validation is one HTTP round trip; a dropped request should not
//! read as a signed-out user, so the session store retries errors it knows
//! to be transient.
//!
//! ```rust
//! use authgate_runtime::retry::{retry_with_predicate, RetryPolicy};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), String> {
//! let policy = RetryPolicy::new(2, Duration::from_millis(50));
//!
//! let value = retry_with_predicate(
//!     &policy,
//!     "load_session",
//!     || async { Ok::<_, String>(42) },
//!     |err: &String| err.contains("timeout"),
//! )
//! .await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

/// How often and how patiently to retry.
///
/// The wait before retry `n` (zero-based) is `base_delay * 2^n`, never more
/// than `max_delay`. The default is 2 retries from 100ms, capped at 2s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry.
    pub base_delay: Duration,
    /// Upper bound for any single wait.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(100)).with_max_delay(Duration::from_secs(2))
    }
}

impl RetryPolicy {
    /// `max_retries` retries starting at `base_delay`, uncapped.
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: Duration::MAX,
        }
    }

    /// A single attempt.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Cap each wait at `max_delay`.
    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// The wait before retry `retry` (zero-based).
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        2u32.checked_pow(retry)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Run `operation`, retrying while `is_retryable` accepts its error and the
/// policy has retries left.
///
/// # Errors
///
/// Returns the first error `is_retryable` rejects, or the last error once
/// retries run out.
pub async fn retry_with_predicate<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut retry = 0;
    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if !is_retryable(&error) || retry >= policy.max_retries {
            tracing::debug!(operation = operation_name, retry, error = %error, "Giving up");
            return Err(error);
        }

        let wait = policy.backoff(retry);
        tracing::debug!(
            operation = operation_name,
            retry,
            wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            error = %error,
            "Retrying"
        );
        tokio::time::sleep(wait).await;
        retry += 1;
    }
}
