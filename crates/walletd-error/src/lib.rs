//! # WalletD Error
//!
//! Unified error types for the WalletD swap venues. Every failure surfaced by
//! a swapper carries an [`SwapErrorKind`] and the [`Phase`] of the trade
//! pipeline in which it happened, so callers can tell a rejected quote from a
//! bridge that never settled.
//!
//! ## Example
//!
//! ```
//! use walletd_error::{Phase, Result, SwapError, SwapErrorKind};
//!
//! fn validate_amount(amount: &str) -> Result<()> {
//!     if amount.is_empty() {
//!         return Err(SwapError::invalid_amount(Phase::BuildTrade, "sellAmount is required"));
//!     }
//!     Ok(())
//! }
//!
//! let err = validate_amount("").unwrap_err();
//! assert_eq!(err.kind(), SwapErrorKind::InvalidAmount);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::fmt;
use thiserror::Error;

/// Kind of swap failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapErrorKind {
    /// Missing or zero amount where one is required
    InvalidAmount,
    /// Required chain adapter not configured
    AdapterUnavailable,
    /// Quote service failure
    RateUnavailable,
    /// Address or account lookup failure
    AccountResolutionFailed,
    /// Cross-chain transfer could not be signed or broadcast
    TransferSubmissionFailed,
    /// Settlement was not observed before the poll bound
    SettlementTimeout,
    /// Settlement was observed with a failure status
    SettlementFailed,
    /// Asset pair not routable by this venue
    UnsupportedPair,
    /// Swap transaction could not be signed or broadcast
    SignAndBroadcastFailed,
    /// Operation not offered by this venue
    NotSupported,
    /// Invalid configuration
    Config,
    /// Caller abandoned the trade before an irreversible step
    Cancelled,
}

impl fmt::Display for SwapErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::AdapterUnavailable => "ADAPTER_UNAVAILABLE",
            Self::RateUnavailable => "RATE_UNAVAILABLE",
            Self::AccountResolutionFailed => "ACCOUNT_RESOLUTION_FAILED",
            Self::TransferSubmissionFailed => "TRANSFER_SUBMISSION_FAILED",
            Self::SettlementTimeout => "SETTLEMENT_TIMEOUT",
            Self::SettlementFailed => "SETTLEMENT_FAILED",
            Self::UnsupportedPair => "UNSUPPORTED_PAIR",
            Self::SignAndBroadcastFailed => "SIGN_AND_BROADCAST_FAILED",
            Self::NotSupported => "NOT_SUPPORTED",
            Self::Config => "CONFIG",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(name)
    }
}

/// Step of a swapper operation in which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Quote request
    GetTradeQuote,
    /// Trade construction
    BuildTrade,
    /// Rate lookup outside a quote (usd rate, min/max)
    GetRate,
    /// Adapter resolution at the start of execution
    Init,
    /// Direction and denomination resolution
    DeterminingDirection,
    /// Transfer from the sell chain into the venue chain
    InboundBridge,
    /// Waiting for the inbound transfer
    AwaitingBridgeSettlement,
    /// Swap message construction and account lookup
    BuildingSwapTx,
    /// Swap signing
    Signing,
    /// Swap broadcast
    Broadcasting,
    /// Waiting for the swap before the outbound leg
    AwaitingSwapSettlement,
    /// Transfer from the venue chain back out
    OutboundBridge,
    /// Venue surface operations with no trade attached
    Venue,
    /// Configuration loading
    Config,
}

impl Phase {
    /// Stable name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetTradeQuote => "getTradeQuote",
            Self::BuildTrade => "buildTrade",
            Self::GetRate => "getRate",
            Self::Init => "init",
            Self::DeterminingDirection => "determiningDirection",
            Self::InboundBridge => "inboundBridge",
            Self::AwaitingBridgeSettlement => "awaitingBridgeSettlement",
            Self::BuildingSwapTx => "buildingSwapTx",
            Self::Signing => "signing",
            Self::Broadcasting => "broadcasting",
            Self::AwaitingSwapSettlement => "awaitingSwapSettlement",
            Self::OutboundBridge => "outboundBridge",
            Self::Venue => "venue",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every swapper operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{phase}] {kind}: {message}")]
pub struct SwapError {
    kind: SwapErrorKind,
    phase: Phase,
    message: String,
}

impl SwapError {
    /// Creates a new error
    pub fn new(kind: SwapErrorKind, phase: Phase, message: impl Into<String>) -> Self {
        Self {
            kind,
            phase,
            message: message.into(),
        }
    }

    /// Missing or zero amount
    pub fn invalid_amount(phase: Phase, message: impl Into<String>) -> Self {
        Self::new(SwapErrorKind::InvalidAmount, phase, message)
    }

    /// Adapter for `chain_id` is not registered
    pub fn adapter_unavailable(phase: Phase, chain_id: impl fmt::Display) -> Self {
        Self::new(
            SwapErrorKind::AdapterUnavailable,
            phase,
            format!("no chain adapter registered for {chain_id}"),
        )
    }

    /// Quote service failure
    pub fn rate_unavailable(phase: Phase, message: impl Into<String>) -> Self {
        Self::new(SwapErrorKind::RateUnavailable, phase, message)
    }

    /// Address/account lookup failure
    pub fn account_resolution(phase: Phase, message: impl Into<String>) -> Self {
        Self::new(SwapErrorKind::AccountResolutionFailed, phase, message)
    }

    /// Transfer submission failure
    pub fn transfer_submission(phase: Phase, message: impl Into<String>) -> Self {
        Self::new(SwapErrorKind::TransferSubmissionFailed, phase, message)
    }

    /// Settlement poll bound exhausted
    pub fn settlement_timeout(phase: Phase, message: impl Into<String>) -> Self {
        Self::new(SwapErrorKind::SettlementTimeout, phase, message)
    }

    /// Settlement observed with a failure status
    pub fn settlement_failed(phase: Phase, message: impl Into<String>) -> Self {
        Self::new(SwapErrorKind::SettlementFailed, phase, message)
    }

    /// Pair is not routable
    pub fn unsupported_pair(phase: Phase, sell_symbol: &str, buy_symbol: &str) -> Self {
        Self::new(
            SwapErrorKind::UnsupportedPair,
            phase,
            format!("pair not supported: {sell_symbol}_{buy_symbol}"),
        )
    }

    /// Swap signing or broadcast failure
    pub fn sign_and_broadcast(phase: Phase, message: impl Into<String>) -> Self {
        Self::new(SwapErrorKind::SignAndBroadcastFailed, phase, message)
    }

    /// Operation not offered by the venue
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(SwapErrorKind::NotSupported, Phase::Venue, message)
    }

    /// Invalid configuration
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(SwapErrorKind::Config, Phase::Config, message)
    }

    /// Trade abandoned before a broadcast
    pub fn cancelled(phase: Phase) -> Self {
        Self::new(
            SwapErrorKind::Cancelled,
            phase,
            "trade cancelled before broadcast",
        )
    }

    /// Kind of failure
    pub fn kind(&self) -> SwapErrorKind {
        self.kind
    }

    /// Phase in which the failure happened
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Human readable detail
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the same error re-attributed to another phase
    pub fn in_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Returns the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self.kind {
            SwapErrorKind::InvalidAmount => ErrorCode::InvalidAmount,
            SwapErrorKind::AdapterUnavailable => ErrorCode::AdapterUnavailable,
            SwapErrorKind::RateUnavailable => ErrorCode::RateUnavailable,
            SwapErrorKind::AccountResolutionFailed => ErrorCode::AccountResolutionFailed,
            SwapErrorKind::TransferSubmissionFailed => ErrorCode::TransferSubmissionFailed,
            SwapErrorKind::SettlementTimeout => ErrorCode::SettlementTimeout,
            SwapErrorKind::SettlementFailed => ErrorCode::SettlementFailed,
            SwapErrorKind::UnsupportedPair => ErrorCode::UnsupportedPair,
            SwapErrorKind::SignAndBroadcastFailed => ErrorCode::SignAndBroadcastFailed,
            SwapErrorKind::NotSupported => ErrorCode::NotSupported,
            SwapErrorKind::Config => ErrorCode::Config,
            SwapErrorKind::Cancelled => ErrorCode::Cancelled,
        }
    }

    /// Returns true if re-submitting the whole operation may succeed.
    ///
    /// Nothing inside a trade retries on this flag; it is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            SwapErrorKind::RateUnavailable | SwapErrorKind::AccountResolutionFailed
        )
    }
}

/// Convenient Result type using SwapError
pub type Result<T> = std::result::Result<T, SwapError>;

/// Extension trait for attaching a kind and phase to foreign errors
pub trait ErrorContext<T> {
    /// Maps the error into a [`SwapError`] of the given kind and phase
    fn swap_context(self, kind: SwapErrorKind, phase: Phase) -> Result<T>;

    /// Same as [`ErrorContext::swap_context`] with a lazily built prefix
    fn with_swap_context<F: FnOnce() -> String>(
        self,
        kind: SwapErrorKind,
        phase: Phase,
        f: F,
    ) -> Result<T>;
}

impl<T, E: fmt::Display> ErrorContext<T> for std::result::Result<T, E> {
    fn swap_context(self, kind: SwapErrorKind, phase: Phase) -> Result<T> {
        self.map_err(|e| SwapError::new(kind, phase, e.to_string()))
    }

    fn with_swap_context<F: FnOnce() -> String>(
        self,
        kind: SwapErrorKind,
        phase: Phase,
        f: F,
    ) -> Result<T> {
        self.map_err(|e| SwapError::new(kind, phase, format!("{}: {}", f(), e)))
    }
}

impl<T> ErrorContext<T> for Option<T> {
    fn swap_context(self, kind: SwapErrorKind, phase: Phase) -> Result<T> {
        self.ok_or_else(|| SwapError::new(kind, phase, "missing value"))
    }

    fn with_swap_context<F: FnOnce() -> String>(
        self,
        kind: SwapErrorKind,
        phase: Phase,
        f: F,
    ) -> Result<T> {
        self.ok_or_else(|| SwapError::new(kind, phase, f()))
    }
}

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    /// Invalid amount
    InvalidAmount = 1001,
    /// Unsupported pair
    UnsupportedPair = 1002,
    /// Adapter unavailable
    AdapterUnavailable = 2001,
    /// Account resolution failed
    AccountResolutionFailed = 2002,
    /// Rate unavailable
    RateUnavailable = 3001,
    /// Transfer submission failed
    TransferSubmissionFailed = 4001,
    /// Settlement timeout
    SettlementTimeout = 4002,
    /// Settlement failed
    SettlementFailed = 4003,
    /// Sign and broadcast failed
    SignAndBroadcastFailed = 5001,
    /// Cancelled
    Cancelled = 6001,
    /// Config
    Config = 8001,
    /// Not supported
    NotSupported = 9001,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SwapError::unsupported_pair(Phase::DeterminingDirection, "BTC", "OSMO");
        let msg = err.to_string();
        assert!(msg.contains("determiningDirection"));
        assert!(msg.contains("UNSUPPORTED_PAIR"));
        assert!(msg.contains("BTC_OSMO"));
    }

    #[test]
    fn test_error_code() {
        let err = SwapError::settlement_timeout(Phase::AwaitingBridgeSettlement, "tx abc");
        assert_eq!(err.code(), ErrorCode::SettlementTimeout);
        assert_eq!(err.code() as u32, 4002);
    }

    #[test]
    fn test_in_phase() {
        let err = SwapError::rate_unavailable(Phase::GetRate, "pool missing")
            .in_phase(Phase::GetTradeQuote);
        assert_eq!(err.phase(), Phase::GetTradeQuote);
        assert_eq!(err.kind(), SwapErrorKind::RateUnavailable);
        assert_eq!(err.message(), "pool missing");
    }

    #[test]
    fn test_retryable() {
        assert!(SwapError::rate_unavailable(Phase::GetRate, "503").is_retryable());
        assert!(!SwapError::sign_and_broadcast(Phase::Broadcasting, "rejected").is_retryable());
        assert!(!SwapError::settlement_timeout(Phase::AwaitingBridgeSettlement, "x").is_retryable());
    }

    #[test]
    fn test_error_context() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "file missing"));

        let err = result
            .with_swap_context(SwapErrorKind::Config, Phase::Config, || {
                "Failed to load config".to_string()
            })
            .unwrap_err();
        assert_eq!(err.kind(), SwapErrorKind::Config);
        assert!(err.message().contains("Failed to load config"));
        assert!(err.message().contains("file missing"));
    }

    #[test]
    fn test_option_context() {
        let missing: Option<u32> = None;
        let err = missing
            .with_swap_context(SwapErrorKind::AccountResolutionFailed, Phase::InboundBridge, || {
                "Failed to get atomAddress".to_string()
            })
            .unwrap_err();
        assert_eq!(err.phase(), Phase::InboundBridge);
        assert_eq!(err.message(), "Failed to get atomAddress");
    }
}
