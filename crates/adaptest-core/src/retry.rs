//! Bounded retry with a fixed delay.
//!
//! The delay is a timed wait on the session's own task: the session does
//! not make progress while it waits.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// How many times to try, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Wait between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `op` until it succeeds or the attempts are used up.
    ///
    /// `op` receives the 1-based attempt number. On exhaustion the last
    /// error's message is kept verbatim in `SourceError::ExhaustedRetries`.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, SourceError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    last_error = format!("{e:#}");
                    tracing::warn!(attempt, max_attempts = attempts, "attempt failed: {e:#}");
                    if attempt < attempts {
                        tokio::time::sleep(self.delay).await;
                    }
                }
            }
        }

        Err(SourceError::ExhaustedRetries {
            attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::default();
        let start = Instant::now();

        let value = policy
            .run(|attempt| {
                calls.set(calls.get() + 1);
                async move {
                    if attempt < 3 {
                        anyhow::bail!("flaky {attempt}");
                    }
                    Ok(attempt * 10)
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 30);
        assert_eq!(calls.get(), 3);
        // Two waits between three attempts.
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_keeps_last_error() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1500));
        let err = policy
            .run(|attempt| async move { Err::<(), _>(anyhow::anyhow!("failure #{attempt}")) })
            .await
            .unwrap_err();

        match err {
            SourceError::ExhaustedRetries {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_error, "failure #3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn no_wait_after_first_success() {
        let start = Instant::now();
        let value = RetryPolicy::default()
            .run(|_| async { Ok("ok") })
            .await
            .unwrap();
        assert_eq!(value, "ok");
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }
}
