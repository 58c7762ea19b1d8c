//! Exponential backoff with jitter
//!
//! Used for transient failures against public LCD endpoints, which
//! routinely answer 429 or 5xx under load.

use rand::Rng;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Backoff strategy configuration
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay cap
    pub max_delay: Duration,
    /// Multiplier for each retry (typically 2.0)
    pub multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    pub jitter: f64,
    /// Maximum number of attempts (including initial)
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: 0.2,
            max_attempts: 3,
        }
    }
}

impl BackoffConfig {
    /// Create a new backoff config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set multiplier
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set jitter factor (0.0 to 1.0)
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Set maximum attempts
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self::default().with_max_attempts(1)
    }
}

/// Exponential backoff iterator
pub struct ExponentialBackoff {
    config: BackoffConfig,
    attempt: u32,
    current_delay: Duration,
}

impl ExponentialBackoff {
    /// Create a new backoff instance
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            current_delay: config.initial_delay,
            config,
            attempt: 0,
        }
    }

    /// Get the current attempt number (0-indexed)
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Check if more retries are allowed
    pub fn can_retry(&self) -> bool {
        self.attempt < self.config.max_attempts
    }

    /// Get remaining attempts
    pub fn remaining_attempts(&self) -> u32 {
        self.config.max_attempts.saturating_sub(self.attempt)
    }

    fn delay_with_jitter(&self, base_delay: Duration) -> Duration {
        if self.config.jitter <= 0.0 {
            return base_delay;
        }

        let jitter_range = base_delay.as_secs_f64() * self.config.jitter;
        let jitter = rand::thread_rng().gen_range(-jitter_range..jitter_range);
        Duration::from_secs_f64((base_delay.as_secs_f64() + jitter).max(0.0))
    }
}

impl Iterator for ExponentialBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.can_retry() {
            return None;
        }

        let delay = self
            .delay_with_jitter(self.current_delay)
            .min(self.config.max_delay);

        self.attempt += 1;
        self.current_delay = Duration::from_secs_f64(
            (self.current_delay.as_secs_f64() * self.config.multiplier)
                .min(self.config.max_delay.as_secs_f64()),
        );

        Some(delay)
    }
}

/// Error when retries stopped
#[derive(Debug)]
pub struct BackoffError<E> {
    /// Number of attempts made
    pub attempts: u32,
    /// Error that ended the loop
    pub last_error: E,
}

impl<E: fmt::Display> fmt::Display for BackoffError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gave up after {} attempt(s): {}",
            self.attempts, self.last_error
        )
    }
}

impl<E: std::error::Error + 'static> std::error::Error for BackoffError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last_error)
    }
}

/// Runs `f`, retrying with backoff while `is_retryable` accepts the error.
///
/// A non-retryable error ends the loop immediately.
pub async fn retry_if<F, Fut, T, E, P>(
    config: BackoffConfig,
    is_retryable: P,
    mut f: F,
) -> Result<T, BackoffError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: fmt::Debug,
{
    let mut backoff = ExponentialBackoff::new(config);

    loop {
        let err = match f().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let delay = backoff.next();
        let attempts = backoff.attempt();
        if !is_retryable(&err) || !backoff.can_retry() {
            return Err(BackoffError {
                attempts,
                last_error: err,
            });
        }

        tracing::debug!(
            attempt = attempts,
            remaining = backoff.remaining_attempts(),
            error = ?err,
            "transient failure, retrying"
        );
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}
