use crate::error::FetchError;
use log::warn;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Bounded retries with exponential backoff for transient [`FetchError`]s.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Default::default()
        }
    }

    /// Retries without sleeping in between.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
    /// capped at `max_delay`, plus up to 25% jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        let backoff = self.base_delay.saturating_mul(factor).min(self.max_delay);
        if backoff.is_zero() {
            return backoff;
        }

        let jitter_ms = rand::thread_rng().gen_range(0..=backoff.as_millis() as u64 / 4);
        backoff + Duration::from_millis(jitter_ms)
    }

    /// Runs `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// Permanent errors come back untouched; exhausting the attempts wraps the
    /// last transient error in [`FetchError::RetriesExhausted`].
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) if attempt >= attempts => {
                    return Err(FetchError::RetriesExhausted {
                        label: label.to_string(),
                        attempts,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    let delay = self.delay_for(attempt);
                    warn!("{label}: attempt {attempt}/{attempts} failed ({err}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn unavailable() -> FetchError {
        FetchError::Status {
            url: "https://example.test".into(),
            status: 503,
        }
    }

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let calls = AtomicU32::new(0);

        let result = RetryPolicy::immediate(3)
            .run("flaky", || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { if n < 3 { Err(unavailable()) } else { Ok(n) } }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = RetryPolicy::immediate(5)
            .run("missing", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(FetchError::Status {
                        url: "https://example.test".into(),
                        status: 404,
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_wraps_the_last_error() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = RetryPolicy::immediate(2)
            .run("down", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(unavailable()) }
            })
            .await;

        match result {
            Err(FetchError::RetriesExhausted {
                label,
                attempts,
                last,
            }) => {
                assert_eq!(label, "down");
                assert_eq!(attempts, 2);
                assert!(matches!(*last, FetchError::Status { status: 503, .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn backoff_grows_and_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1_000),
        };

        let first = policy.delay_for(1);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(125));

        let third = policy.delay_for(3);
        assert!(third >= Duration::from_millis(400) && third <= Duration::from_millis(500));

        let late = policy.delay_for(9);
        assert!(late >= Duration::from_millis(1_000) && late <= Duration::from_millis(1_250));

        assert_eq!(RetryPolicy::immediate(3).delay_for(2), Duration::ZERO);
    }
}
