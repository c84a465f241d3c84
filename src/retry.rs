//! Retry-with-backoff for calls to flaky remote services.

use std::future::Future;
use std::time::Duration;

/// How often an operation is attempted and how long to wait in between.
///
/// The wait before attempt `n + 1` is `n * base_delay` (linear backoff),
/// so three attempts with a one second base delay wait 1s and then 2s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

    /// A policy always makes at least one attempt.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_BASE_DELAY)
    }
}

/// Errors that know whether trying again could help.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Final outcome of a retried operation that never succeeded.
#[derive(Debug, thiserror::Error)]
#[error("{source} (gave up after {attempts} attempt(s))")]
pub struct RetryError<E>
where
    E: std::error::Error + 'static,
{
    pub attempts: u32,
    #[source]
    pub source: E,
}

impl<E> RetryError<E>
where
    E: std::error::Error + 'static,
{
    pub fn into_inner(self) -> E {
        self.source
    }
}

/// Run `operation` until it succeeds, fails permanently, or the policy is exhausted.
#[tracing::instrument(name = "Retrying operation", skip(policy, operation), fields(attempt = tracing::field::Empty))]
pub async fn retry_with_backoff<F, Fut, T, E>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + Transient + 'static,
{
    let mut attempt = 1;
    loop {
        tracing::Span::current().record("attempt", attempt);
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_attempts() => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    error = %e,
                    "Attempt {}/{} failed, retrying in {}ms",
                    attempt,
                    policy.max_attempts(),
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(RetryError {
                    attempts: attempt,
                    source: e,
                });
            }
        }
    }
}
