//! # WalletD Resilience
//!
//! Retry, deadline and polling helpers shared by the WalletD swap venues.
//!
//! - **Exponential Backoff**: Retry transient endpoint failures with increasing delays
//! - **Deadlines**: Timeouts measured on the tokio clock
//! - **Polling**: Wait for an on-chain condition with an interval, a timeout and cancellation
//!
//! ## Polling
//!
//! ```rust,no_run
//! use walletd_resilience::{poll_until, PollConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let cancel = CancellationToken::new();
//! let height = poll_until(&PollConfig::default(), &cancel, || async {
//!     // Ok(None) means "not yet"
//!     Ok::<_, std::io::Error>(Some(42u64))
//! })
//! .await;
//! # }
//! ```
//!
//! ## Exponential Backoff
//!
//! ```rust
//! use walletd_resilience::{BackoffConfig, ExponentialBackoff};
//! use std::time::Duration;
//!
//! let config = BackoffConfig::new()
//!     .with_initial_delay(Duration::from_millis(100))
//!     .with_max_attempts(3)
//!     .with_jitter(0.0);
//!
//! let delays: Vec<_> = ExponentialBackoff::new(config).collect();
//! assert_eq!(delays[1], Duration::from_millis(200));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backoff;
pub mod poll;
pub mod timeout;

pub use backoff::{retry_if, BackoffConfig, BackoffError, ExponentialBackoff};
pub use poll::{poll_until, PollConfig, PollError};
pub use timeout::Deadline;
