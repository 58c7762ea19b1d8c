//! Bounded polling
//!
//! [`poll_until`] repeatedly runs a check until it reports a value, the
//! overall timeout elapses, or the caller cancels. The check decides what
//! counts as "not yet" (`Ok(None)`) versus a hard failure (`Err`).

use crate::timeout::Deadline;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Interval and overall timeout for a poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Sleep between attempts
    pub interval: Duration,
    /// Total time before giving up
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(300),
        }
    }
}

impl PollConfig {
    /// Config from whole seconds
    pub fn from_secs(interval: u64, timeout: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval),
            timeout: Duration::from_secs(timeout),
        }
    }

    /// Upper bound on the number of attempts a loop will make
    pub fn max_attempts(&self) -> u64 {
        if self.interval.is_zero() {
            return u64::MAX;
        }
        let ratio = self.timeout.as_millis() / self.interval.as_millis().max(1);
        u64::try_from(ratio).unwrap_or(u64::MAX).saturating_add(1)
    }
}

/// Why a poll loop stopped without a value
#[derive(Debug, thiserror::Error)]
pub enum PollError<E> {
    /// Timeout elapsed without the condition holding
    #[error("gave up after {attempts} attempt(s) over {elapsed:?}")]
    TimedOut {
        /// Attempts made
        attempts: u32,
        /// Time spent
        elapsed: Duration,
    },
    /// Caller cancelled the loop
    #[error("polling cancelled")]
    Cancelled,
    /// Check reported a hard failure
    #[error("{0}")]
    Aborted(E),
}

impl<E> PollError<E> {
    /// True for the timeout variant
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

/// Polls `check` until it yields a value.
///
/// The check runs immediately, then every `config.interval`. One last check
/// runs at the deadline so a condition that turns true during the final
/// interval is still observed.
pub async fn poll_until<F, Fut, T, E>(
    config: &PollConfig,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let deadline = Deadline::new(config.timeout);
    let mut attempts = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled);
        }

        attempts = attempts.saturating_add(1);
        match check().await {
            Ok(Some(value)) => {
                tracing::debug!(attempts, elapsed = ?deadline.elapsed(), "poll condition met");
                return Ok(value);
            }
            Ok(None) => {}
            Err(e) => return Err(PollError::Aborted(e)),
        }

        if deadline.is_expired() {
            tracing::debug!(attempts, timeout = ?config.timeout, "poll timed out");
            return Err(PollError::TimedOut {
                attempts,
                elapsed: deadline.elapsed(),
            });
        }

        let nap = config.interval.min(deadline.remaining());
        tracing::trace!(attempt = attempts, nap = ?nap, "condition not met, sleeping");
        tokio::select! {
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            _ = tokio::time::sleep(nap) => {}
        }
    }
}
