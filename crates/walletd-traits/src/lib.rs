//! # WalletD Traits
//!
//! Chain adapter traits consumed by the WalletD swappers. A swapper never
//! talks to key material or a node directly; it goes through a
//! [`ChainAdapter`] resolved from a [`ChainAdapterManager`], and passes an
//! opaque [`HdWallet`] handle through to signing.
//!
//! ## Core Traits
//!
//! - [`ChainAdapter`] - Address derivation, account state, fees, signing and broadcast
//! - [`HdWallet`] - Opaque signing handle owned by the key-management layer
//!
//! ## Example
//!
//! ```ignore
//! use walletd_traits::prelude::*;
//!
//! async fn sequence_of(adapter: &dyn ChainAdapter, address: &str) -> WalletResult<u64> {
//!     Ok(adapter.get_account(address).await?.sequence.unwrap_or(0))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bip44;
pub mod cosmos;
pub mod manager;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use walletd_caip::ChainId;

pub use bip44::Bip44Params;
pub use cosmos::{Coin, CosmosMsg, SignTxInput, SignedTx, StdFee, StdTx};
pub use manager::ChainAdapterManager;

/// Represents a transaction hash/ID
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl TxHash {
    /// Creates a new TxHash from a string
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the hash as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the node accepted the tx without returning a hash
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TxHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TxHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// On-chain account state needed to sign a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account address
    pub address: String,
    /// Balance of the chain's fee asset, in base units
    pub balance: u128,
    /// Account number, absent for accounts the chain has never seen
    pub account_number: Option<u64>,
    /// Next sequence, absent for accounts the chain has never seen
    pub sequence: Option<u64>,
    /// Balances of other denominations held by the account
    #[serde(default)]
    pub assets: Vec<Coin>,
}

impl Account {
    /// Account number, defaulting to zero for fresh accounts
    pub fn account_number_or_default(&self) -> u64 {
        self.account_number.unwrap_or(0)
    }

    /// Sequence, defaulting to zero for fresh accounts
    pub fn sequence_or_default(&self) -> u64 {
        self.sequence.unwrap_or(0)
    }
}

/// Fee estimate for one speed tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeData {
    /// Total fee in base units of the fee asset
    pub tx_fee: u128,
    /// Gas limit to attach
    pub gas_limit: u64,
}

/// Fee estimates by speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDataEstimate {
    /// Fast confirmation
    pub fast: FeeData,
    /// Average confirmation
    pub average: FeeData,
    /// Slow confirmation
    pub slow: FeeData,
}

/// Common wallet errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Account could not be loaded
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Network/RPC error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Key/signing error
    #[error("Key error: {0}")]
    KeyError(String),

    /// Node rejected the transaction
    #[error("Broadcast rejected: {0}")]
    BroadcastRejected(String),

    /// Feature not supported
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;

/// Opaque signing handle.
///
/// The key-management layer owns the implementation; adapters downcast or
/// forward it to their signer. Swappers only pass it through.
pub trait HdWallet: Send + Sync + fmt::Debug {
    /// Stable identifier of the wallet, used in logs only
    fn wallet_id(&self) -> &str;
}

/// Capability surface of a chain adapter.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// CAIP-2 chain this adapter serves
    fn chain_id(&self) -> ChainId;

    /// Builds derivation parameters for an account index
    fn build_derivation_params(&self, account_number: u32) -> Bip44Params;

    /// Derives the address for the given path from the wallet
    async fn get_address(&self, wallet: &dyn HdWallet, params: &Bip44Params)
        -> WalletResult<String>;

    /// Reads current account state from the chain
    async fn get_account(&self, address: &str) -> WalletResult<Account>;

    /// Current fee estimates
    async fn get_fee_data(&self) -> WalletResult<FeeDataEstimate>;

    /// Signs a transaction with the wallet
    async fn sign_transaction(
        &self,
        input: SignTxInput,
        wallet: &dyn HdWallet,
    ) -> WalletResult<SignedTx>;

    /// Broadcasts a signed transaction, returning its hash
    async fn broadcast_transaction(&self, tx: SignedTx) -> WalletResult<TxHash>;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Account, Bip44Params, ChainAdapter, ChainAdapterManager, Coin, CosmosMsg, FeeData,
        FeeDataEstimate, HdWallet, SignTxInput, SignedTx, StdFee, StdTx, TxHash, WalletError,
        WalletResult,
    };
}
