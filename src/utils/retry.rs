//! Bounded retry combinator.
//!
//! Used for handshake polling and page reads. The operation runs once and is
//! then retried up to `max_retries` more times, sleeping `backoff` after every
//! failed attempt. Errors the caller marks as fatal stop the loop early.

use std::thread;
use std::time::Duration;
use tracing::warn;

/// Retry budget for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Sleep after each failed attempt.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// A single attempt with no retry.
    pub fn once() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Outcome of [`attempt`].
#[derive(Debug)]
pub enum Attempt<T, E> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { last_error: E, attempts: u32 },
    Aborted { error: E, attempts: u32 },
}

impl<T, E> Attempt<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            Attempt::Succeeded { attempts, .. }
            | Attempt::Exhausted { attempts, .. }
            | Attempt::Aborted { attempts, .. } => *attempts,
        }
    }

    /// Collapse into a `Result`, keeping the last error.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Attempt::Succeeded { value, .. } => Ok(value),
            Attempt::Exhausted { last_error, .. } => Err(last_error),
            Attempt::Aborted { error, .. } => Err(error),
        }
    }
}

/// Run `op` until it succeeds, the budget runs out, or `retryable` rejects an error.
///
/// `op` receives the 1-based attempt number.
pub fn attempt<T, E, F, R>(policy: RetryPolicy, mut op: F, retryable: R) -> Attempt<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
    R: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max = policy.max_attempts();
    let mut n = 1;
    loop {
        match op(n) {
            Ok(value) => {
                return Attempt::Succeeded { value, attempts: n };
            }
            Err(e) if !retryable(&e) => {
                return Attempt::Aborted {
                    error: e,
                    attempts: n,
                };
            }
            Err(e) => {
                if !policy.backoff.is_zero() {
                    thread::sleep(policy.backoff);
                }
                if n >= max {
                    return Attempt::Exhausted {
                        last_error: e,
                        attempts: n,
                    };
                }
                warn!(attempt = n, max_attempts = max, error = %e, "Attempt failed, retrying");
                n += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeds_after_failures() {
        let result = attempt(
            RetryPolicy::new(3, Duration::ZERO),
            |n| if n < 3 { Err("short") } else { Ok(n) },
            |_| true,
        );
        match result {
            Attempt::Succeeded { value, attempts } => {
                assert_eq!(value, 3);
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn exhausts_budget() {
        let mut calls = 0;
        let result: Attempt<(), &str> = attempt(
            RetryPolicy::new(3, Duration::ZERO),
            |_| {
                calls += 1;
                Err("short")
            },
            |_| true,
        );
        assert_eq!(calls, 4);
        assert!(matches!(result, Attempt::Exhausted { attempts: 4, .. }));
    }

    #[test]
    fn fatal_error_stops_early() {
        let result: Attempt<(), &str> =
            attempt(RetryPolicy::new(5, Duration::ZERO), |_| Err("fatal"), |e| *e != "fatal");
        assert_eq!(result.attempts(), 1);
        assert_eq!(result.into_result(), Err("fatal"));
    }

    #[test]
    fn once_runs_a_single_attempt() {
        let result: Attempt<(), &str> = attempt(RetryPolicy::once(), |_| Err("x"), |_| true);
        assert_eq!(result.attempts(), 1);
    }
}
