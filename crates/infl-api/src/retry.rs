//! Bounded retry with exponential back-off and jitter.
//!
//! The live source wraps a whole per-user extraction in
//! [`retry_with_backoff`]: a throttled request anywhere restarts the user
//! from scratch, at most `max_retries` times, then surfaces
//! [`ApiError::RetriesExhausted`].

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 240_000;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Base delay: the n-th retry waits `base * 2^(n-1)` seconds ± 25 %.
    pub backoff_base_secs: u64,
}

impl RetryPolicy {
    /// A policy that fails on the first transient error. Used in tests.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_secs: 0,
        }
    }

    /// Delay before retry number `attempt` (1-based), without jitter.
    #[must_use]
    pub fn base_delay_ms(&self, attempt: u32) -> u64 {
        let base_ms = self.backoff_base_secs.saturating_mul(1_000);
        base_ms
            .saturating_mul(1u64 << attempt.saturating_sub(1).min(20))
            .min(MAX_DELAY_MS)
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** HTTP 429, HTTP 5xx, network timeouts and connection
/// failures.
///
/// **Not retriable:** unknown or private users, API-level failures,
/// malformed bodies, other HTTP statuses.
pub(crate) fn is_retriable(err: &ApiError) -> bool {
    match err {
        ApiError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ApiError::RateLimited { .. } | ApiError::ServerError { .. } => true,
        ApiError::UnexpectedStatus { .. }
        | ApiError::UserNotFound { .. }
        | ApiError::PrivateAccount { .. }
        | ApiError::Api(_)
        | ApiError::Deserialize { .. }
        | ApiError::InvalidBaseUrl { .. }
        | ApiError::RetriesExhausted { .. } => false,
    }
}

/// Runs `operation` with up to `policy.max_retries` additional attempts on
/// transient errors.
///
/// Non-retriable errors are returned immediately. When the retry budget is
/// spent the last error is wrapped in [`ApiError::RetriesExhausted`].
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) {
                    return Err(err);
                }
                if attempt >= policy.max_retries {
                    return Err(ApiError::RetriesExhausted {
                        attempts: attempt + 1,
                        last: Box::new(err),
                    });
                }
                attempt += 1;
                let capped = policy.base_delay_ms(attempt);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "remote API transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
