//! Eventually-style polling
//!
//! Every readiness assertion in the suite is "keep asking until this holds,
//! or give up after a timeout". The check returns `Ok` once the condition
//! holds; any error is remembered and retried until time runs out.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Timeout and polling interval for [`eventually`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            interval: Duration::from_secs(10),
        }
    }
}

impl PollConfig {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

impl From<&crate::config::PollSettings> for PollConfig {
    fn from(settings: &crate::config::PollSettings) -> Self {
        Self::new(settings.timeout(), settings.interval())
    }
}

/// Polling gave up
#[derive(Debug, Clone, thiserror::Error)]
#[error("Timed out after {elapsed:?} waiting for {what} (attempts: {attempts}, last error: {last_error})")]
pub struct PollError {
    pub what: String,
    pub attempts: u32,
    pub elapsed: Duration,
    pub last_error: String,
}

/// Poll `check` until it returns `Ok` or the timeout expires
///
/// The check is always attempted at least once, even with a zero timeout,
/// and once more when the deadline is reached.
pub async fn eventually<F, Fut, T, E>(
    config: PollConfig,
    what: impl Into<String>,
    mut check: F,
) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let what = what.into();
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        let last_error = match check().await {
            Ok(value) => return Ok(value),
            Err(e) => e.to_string(),
        };

        debug!(
            what = %what,
            attempt = attempts,
            error = %last_error,
            "Condition not met yet"
        );

        let elapsed = start.elapsed();
        if elapsed >= config.timeout {
            return Err(PollError {
                what,
                attempts,
                elapsed,
                last_error,
            });
        }

        tokio::time::sleep(config.interval.min(config.timeout - elapsed)).await;
    }
}

/// Poll a boolean condition until it is true or the timeout expires
pub async fn eventually_true<F, Fut>(
    config: PollConfig,
    what: impl Into<String>,
    mut check: F,
) -> Result<(), PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    eventually(config, what, || {
        let fut = check();
        async move {
            if fut.await {
                Ok(())
            } else {
                Err("condition is false")
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast() -> PollConfig {
        PollConfig::new(Duration::from_secs(5), Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_succeeds_immediately() {
        let result: Result<i32, PollError> =
            eventually(fast(), "answer", || async { Ok::<_, String>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();

        let result = eventually(fast(), "third time lucky", || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("not yet")
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_with_last_error() {
        let config = PollConfig::new(Duration::from_secs(30), Duration::from_secs(10));
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();

        let err = eventually(config, "stateful set ready", || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move { Err::<(), _>(format!("ready replicas 0/1 (attempt {})", n)) }
        })
        .await
        .unwrap_err();

        assert_eq!(err.what, "stateful set ready");
        assert_eq!(err.attempts, 4);
        assert_eq!(err.elapsed, Duration::from_secs(30));
        assert_eq!(err.last_error, "ready replicas 0/1 (attempt 3)");
        assert!(err.to_string().contains("stateful set ready"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_check_lands_on_the_deadline() {
        let config = PollConfig::new(Duration::from_secs(25), Duration::from_secs(10));
        let start = Instant::now();

        let result = eventually(config, "late success", || async move {
            if start.elapsed() >= Duration::from_secs(25) {
                Ok(start.elapsed())
            } else {
                Err("too early")
            }
        })
        .await;

        assert_eq!(result.unwrap(), Duration::from_secs(25));
    }

    #[tokio::test]
    async fn test_zero_timeout_still_checks_once() {
        let config = PollConfig::new(Duration::ZERO, Duration::from_millis(1));
        let result = eventually_true(config, "flag", || async { true }).await;
        assert!(result.is_ok());

        let err = eventually_true(config, "flag", || async { false })
            .await
            .unwrap_err();
        assert_eq!(err.attempts, 1);
        assert_eq!(err.last_error, "condition is false");
    }
}
