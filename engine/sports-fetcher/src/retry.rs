//! Structured retry policy with pluggable backoff

use crate::config::RetryConfig;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Delay schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Retry immediately
    None,
    /// `base * 2^(attempt-1)`, capped at `max`
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::None => Duration::ZERO,
            Backoff::Exponential { base, max } => {
                let exponent = attempt.saturating_sub(1).min(31);
                base.checked_mul(1u32 << exponent).unwrap_or(max).min(max)
            }
        }
    }
}

impl From<&RetryConfig> for Backoff {
    fn from(config: &RetryConfig) -> Self {
        Backoff::Exponential { base: config.initial_delay(), max: config.max_delay() }
    }
}

/// How many times to try an operation and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

/// Final failure of a retried operation
#[derive(Debug, Clone, PartialEq)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last: E,
}

impl RetryPolicy {
    /// Create a new policy; at least one attempt is always made
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self { max_attempts: max_attempts.max(1), backoff }
    }

    /// One-second exponential backoff, capped at a minute
    pub fn exponential(max_attempts: u32) -> Self {
        Self::new(
            max_attempts,
            Backoff::Exponential { base: Duration::from_secs(1), max: Duration::from_secs(60) },
        )
    }

    /// Run `op` until it succeeds or attempts run out, sleeping per the backoff.
    ///
    /// `op` receives the 1-based attempt number.
    pub async fn run<F, Fut, T, E>(&self, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => {
                    return Err(RetryExhausted { attempts: attempt, last: e });
                }
                Err(e) => {
                    let delay = self.backoff.delay(attempt);
                    warn!(
                        "Attempt {}/{} failed: {}, retrying in {:?}",
                        attempt, self.max_attempts, e, delay
                    );
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}
