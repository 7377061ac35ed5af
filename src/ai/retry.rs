//! Retry policy around a single scoring call

use crate::ai::{FailureClass, ScoreError};
use crate::config::ConfigError;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Largest exponent used for rate-limit backoff (2^6 = 64s)
const MAX_BACKOFF_EXPONENT: u32 = 6;

/// Blocks the current thread between attempts
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Terminal failure of one chunk after the policy gave up
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{class} after {attempts} attempt(s): {detail}")]
pub struct ChunkFailure {
    pub class: FailureClass,
    pub attempts: u32,
    pub detail: String,
}

impl ChunkFailure {
    fn from_error(err: &ScoreError, attempts: u32) -> Self {
        Self {
            class: err.class(),
            attempts,
            detail: err.detail().to_string(),
        }
    }
}

/// Failure-class-aware retry with a bounded number of total attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    rate_limit_base: Duration,
    transient_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts every call, the first one included
    pub fn new(max_attempts: u32) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::invalid(
                "max_retries",
                "at least one attempt is required",
            ));
        }
        Ok(Self {
            max_attempts,
            rate_limit_base: Duration::from_secs(1),
            transient_delay: Duration::from_secs(1),
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the attempt that follows zero-based attempt `attempt`.
    /// `None` means the failure is not retried.
    pub fn backoff(&self, class: FailureClass, attempt: u32) -> Option<Duration> {
        match class {
            FailureClass::RateLimited => {
                Some(self.rate_limit_base * 2u32.pow(attempt.min(MAX_BACKOFF_EXPONENT)))
            }
            FailureClass::Transient => Some(self.transient_delay),
            FailureClass::Fatal => None,
        }
    }

    /// Run `op` until it succeeds, fails fatally, or attempts run out
    pub fn attempt<T, F>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, ChunkFailure>
    where
        F: FnMut() -> Result<T, ScoreError>,
    {
        let mut attempt = 0;
        loop {
            let err = match op() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let made = attempt + 1;

            let delay = match self.backoff(err.class(), attempt) {
                Some(delay) if made < self.max_attempts => delay,
                Some(_) => {
                    warn!("Giving up after {} attempts: {}", made, err);
                    return Err(ChunkFailure::from_error(&err, made));
                }
                None => return Err(ChunkFailure::from_error(&err, made)),
            };

            debug!(
                "Attempt {}/{} failed ({}), retrying in {:?}",
                made,
                self.max_attempts,
                err.class(),
                delay
            );
            sleeper.sleep(delay);
            attempt += 1;
        }
    }
}
