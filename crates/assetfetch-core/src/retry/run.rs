//! Retry loop: run a closure until success or policy says stop.

use super::classify::Classify;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs `f` until it succeeds or the retry policy says to stop.
/// `f` receives the 1-based attempt number. On retryable failure, sleeps for
/// the backoff duration then tries again; the last error is returned.
pub fn run_with_retry<T, E, F>(policy: &RetryPolicy, label: &str, mut f: F) -> Result<T, E>
where
    E: Classify + std::fmt::Display,
    F: FnMut(u32) -> Result<T, E>,
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(attempt, e.error_kind()) {
                RetryDecision::NoRetry => {
                    tracing::debug!(label, attempt, error = %e, "giving up");
                    return Err(e);
                }
                RetryDecision::RetryAfter(d) => {
                    tracing::warn!(
                        label,
                        attempt,
                        max_attempts = policy.max_attempts,
                        delay_ms = d.as_millis() as u64,
                        error = %e,
                        "retrying after failure"
                    );
                    std::thread::sleep(d);
                    attempt += 1;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::ErrorKind;
    use std::fmt;
    use std::time::Duration;

    #[derive(Debug)]
    struct Fake(ErrorKind);

    impl fmt::Display for Fake {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }

    impl Classify for Fake {
        fn error_kind(&self) -> ErrorKind {
            self.0
        }
    }

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            jitter: true,
        }
    }

    #[test]
    fn retryable_errors_are_bounded() {
        let mut calls = 0;
        let r: Result<(), Fake> = run_with_retry(&fast(3), "t", |_| {
            calls += 1;
            Err(Fake(ErrorKind::Http5xx(500)))
        });
        assert!(r.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn permanent_errors_surface_after_one_attempt() {
        let mut calls = 0;
        let r: Result<(), Fake> = run_with_retry(&fast(3), "t", |_| {
            calls += 1;
            Err(Fake(ErrorKind::Other))
        });
        assert!(r.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn success_after_transient_failure() {
        let r: Result<u32, Fake> = run_with_retry(&fast(3), "t", |attempt| {
            if attempt < 2 {
                Err(Fake(ErrorKind::Timeout))
            } else {
                Ok(attempt)
            }
        });
        assert_eq!(r.unwrap(), 2);
    }
}
