//! Retry policy for remote fetches.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::efa::FetchError;

use super::source::RawRecord;

/// The outcome of one fetch attempt.
pub type FetchResult = Result<Vec<RawRecord>, FetchError>;

/// Default maximum attempts per unit.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between attempts.
const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// A single retriable operation.
///
/// Each call to [`Attempt::attempt`] performs the operation once. The
/// implementor owns whatever state (session, parameters) the call needs.
pub trait Attempt {
    fn attempt(&mut self) -> impl Future<Output = FetchResult> + Send;
}

/// Bounded fixed-delay retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first. At least 1.
    pub max_attempts: u32,
    /// Pause between consecutive attempts.
    pub delay: Duration,
    /// Decides whether an outcome should be attempted again.
    pub retryable: fn(&FetchResult) -> bool,
}

/// Result of running an operation under a [`RetryPolicy`].
#[derive(Debug)]
pub struct Retried {
    /// Number of attempts made.
    pub attempts: u32,
    /// Outcome of the final attempt.
    pub result: FetchResult,
    /// True when the final outcome was still retryable, i.e. the budget ran
    /// out.
    pub exhausted: bool,
}

/// The default predicate: retry when the service returned nothing or the
/// call failed in any way.
pub fn empty_or_failed(result: &FetchResult) -> bool {
    match result {
        Ok(records) => records.is_empty(),
        Err(_) => true,
    }
}

impl RetryPolicy {
    /// Create a policy with the default predicate.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            retryable: empty_or_failed,
        }
    }

    /// Replace the retryable-outcome predicate.
    pub fn with_predicate(mut self, retryable: fn(&FetchResult) -> bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Run `op` until it produces a non-retryable outcome or the attempt
    /// budget is spent.
    pub async fn run<A: Attempt>(&self, op: &mut A) -> Retried {
        let mut attempts = 0;

        loop {
            attempts += 1;
            let result = op.attempt().await;

            if !(self.retryable)(&result) {
                return Retried {
                    attempts,
                    result,
                    exhausted: false,
                };
            }

            match &result {
                Ok(_) => debug!(attempt = attempts, "Empty result"),
                Err(e) if e.is_network() => warn!(attempt = attempts, error = %e, "Network error"),
                Err(e) => error!(attempt = attempts, error = %e, "Fetch failed"),
            }

            if attempts >= self.max_attempts {
                return Retried {
                    attempts,
                    result,
                    exhausted: true,
                };
            }

            tokio::time::sleep(self.delay).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY)
    }
}
