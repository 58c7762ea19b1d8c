//! # WalletD Testing Infrastructure
//!
//! Test doubles and fixtures shared by the swapper test suites:
//! - Recording chain adapter and wallet mocks
//! - Asset fixtures for the Cosmos corridor
//! - Edge case amounts
//! - Property-based testing strategies
//!
//! ## Usage
//!
//! ```rust,ignore
//! use walletd_testing::*;
//!
//! let osmosis = Arc::new(MockChainAdapter::osmosis().with_broadcast_ids(["SWAP1"]));
//! let manager = ChainAdapterManager::new().with_adapter(osmosis.clone());
//! // ... run a trade ...
//! assert_eq!(osmosis.broadcast_count(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use walletd_caip::constants::{
    cosmos_asset_id, cosmos_chain_id, osmosis_asset_id, osmosis_chain_id, BTC_ASSET_ID,
};
use walletd_caip::{Asset, AssetId, ChainId};
use walletd_traits::{
    Account, Bip44Params, ChainAdapter, FeeData, FeeDataEstimate, HdWallet, SignTxInput,
    SignedTx, TxHash, WalletError, WalletResult,
};

// ============================================================================
// Asset Fixtures
// ============================================================================

/// ATOM on the Cosmos Hub
pub fn atom() -> Asset {
    Asset::new(cosmos_asset_id(), "ATOM", "Cosmos", 6)
}

/// OSMO on Osmosis
pub fn osmo() -> Asset {
    Asset::new(osmosis_asset_id(), "OSMO", "Osmosis", 6)
}

/// USDC as held on Osmosis
pub fn usdc() -> Asset {
    let id = AssetId::new(
        osmosis_chain_id(),
        "ibc",
        "D189335C6E4A68B513C10AB227BF1C1D38C746766278BA3EEB4FB14124F1D858",
    )
    .expect("valid ibc asset id");
    Asset::new(id, "USDC", "USD Coin", 6)
}

/// An asset no Cosmos venue trades
pub fn btc() -> Asset {
    let id: AssetId = BTC_ASSET_ID.parse().expect("well-known asset id");
    Asset::new(id, "BTC", "Bitcoin", 8)
}

// ============================================================================
// Edge Case Amounts
// ============================================================================

/// Sell amounts at the edges of what a swapper accepts
pub struct EdgeCaseAmounts;

impl EdgeCaseAmounts {
    /// Quoting with zero asks for the marginal rate
    pub const ZERO: &'static str = "0";
    /// Always rejected
    pub const EMPTY: &'static str = "";
    /// Rounds up when building a trade
    pub const HALF: &'static str = "1000000.5";
    /// One base unit
    pub const DUST: &'static str = "1";

    /// Amounts that must be rejected before any network access
    pub fn invalid() -> Vec<&'static str> {
        vec![Self::EMPTY]
    }

    /// Amounts that quote successfully
    pub fn quotable() -> Vec<&'static str> {
        vec![Self::ZERO, Self::DUST, Self::HALF, "1500000"]
    }
}

// ============================================================================
// Wallet Mock
// ============================================================================

/// Opaque wallet handle; mocks never look inside
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockWallet {
    id: String,
}

impl MockWallet {
    /// Wallet with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new("mock-wallet")
    }
}

impl HdWallet for MockWallet {
    fn wallet_id(&self) -> &str {
        &self.id
    }
}

// ============================================================================
// Chain Adapter Mock
// ============================================================================

/// A call observed by [`MockChainAdapter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterCall {
    /// `get_address`
    GetAddress(Bip44Params),
    /// `get_account`
    GetAccount(String),
    /// `get_fee_data`
    GetFeeData,
    /// `sign_transaction`
    Sign(SignTxInput),
    /// `broadcast_transaction`
    Broadcast(SignedTx),
}

/// In-memory chain adapter that records every call.
///
/// Broadcast ids are served from a queue; once it runs dry, ids are
/// generated as `<reference>-TX<n>`.
#[derive(Debug)]
pub struct MockChainAdapter {
    chain_id: ChainId,
    address: String,
    account_number: u64,
    sequence: AtomicU64,
    fee: FeeDataEstimate,
    broadcast_ids: Mutex<VecDeque<TxHash>>,
    broadcast_counter: AtomicU64,
    fail_address: AtomicBool,
    fail_broadcast: AtomicBool,
    calls: Mutex<Vec<AdapterCall>>,
}

impl MockChainAdapter {
    /// Adapter for `chain_id` whose wallet address is always `address`
    pub fn new(chain_id: ChainId, address: impl Into<String>) -> Self {
        let tier = |tx_fee, gas_limit| FeeData { tx_fee, gas_limit };
        Self {
            chain_id,
            address: address.into(),
            account_number: 0,
            sequence: AtomicU64::new(0),
            fee: FeeDataEstimate {
                fast: tier(7_500, 300_000),
                average: tier(5_000, 250_000),
                slow: tier(2_500, 200_000),
            },
            broadcast_ids: Mutex::new(VecDeque::new()),
            broadcast_counter: AtomicU64::new(0),
            fail_address: AtomicBool::new(false),
            fail_broadcast: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Cosmos Hub adapter at `cosmos1mocksender`
    pub fn cosmos() -> Self {
        Self::new(cosmos_chain_id(), "cosmos1mocksender")
    }

    /// Osmosis adapter at `osmo1mocksender`
    pub fn osmosis() -> Self {
        Self::new(osmosis_chain_id(), "osmo1mocksender")
    }

    /// Sets the on-chain account number and starting sequence
    pub fn with_account(mut self, account_number: u64, sequence: u64) -> Self {
        self.account_number = account_number;
        self.sequence = AtomicU64::new(sequence);
        self
    }

    /// Sets the `average` fee tier
    pub fn with_average_fee(mut self, tx_fee: u128, gas_limit: u64) -> Self {
        self.fee.average = FeeData { tx_fee, gas_limit };
        self
    }

    /// Queues broadcast ids; an empty string simulates a node returning no id
    pub fn with_broadcast_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut queue) = self.broadcast_ids.lock() {
            queue.extend(ids.into_iter().map(|id| TxHash::new(id)));
        }
        self
    }

    /// Makes `get_address` fail
    pub fn failing_address(self) -> Self {
        self.fail_address.store(true, Ordering::SeqCst);
        self
    }

    /// Makes `broadcast_transaction` fail
    pub fn failing_broadcast(self) -> Self {
        self.fail_broadcast.store(true, Ordering::SeqCst);
        self
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<AdapterCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Sign inputs seen so far
    pub fn sign_inputs(&self) -> Vec<SignTxInput> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                AdapterCall::Sign(input) => Some(input),
                _ => None,
            })
            .collect()
    }

    /// Number of broadcasts attempted
    pub fn broadcast_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, AdapterCall::Broadcast(_)))
            .count()
    }

    fn record(&self, call: AdapterCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn next_broadcast_id(&self) -> TxHash {
        let queued = self
            .broadcast_ids
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());
        queued.unwrap_or_else(|| {
            let n = self.broadcast_counter.fetch_add(1, Ordering::SeqCst) + 1;
            TxHash::new(format!("{}-TX{}", self.chain_id.reference(), n))
        })
    }
}

#[async_trait]
impl ChainAdapter for MockChainAdapter {
    fn chain_id(&self) -> ChainId {
        self.chain_id.clone()
    }

    fn build_derivation_params(&self, account_number: u32) -> Bip44Params {
        Bip44Params::new(118, account_number)
    }

    async fn get_address(
        &self,
        _wallet: &dyn HdWallet,
        params: &Bip44Params,
    ) -> WalletResult<String> {
        self.record(AdapterCall::GetAddress(*params));
        if self.fail_address.load(Ordering::SeqCst) {
            return Err(WalletError::KeyError("derivation failed".into()));
        }
        Ok(self.address.clone())
    }

    async fn get_account(&self, address: &str) -> WalletResult<Account> {
        self.record(AdapterCall::GetAccount(address.to_string()));
        Ok(Account {
            address: address.to_string(),
            balance: 0,
            account_number: Some(self.account_number),
            sequence: Some(self.sequence.load(Ordering::SeqCst)),
            assets: Vec::new(),
        })
    }

    async fn get_fee_data(&self) -> WalletResult<FeeDataEstimate> {
        self.record(AdapterCall::GetFeeData);
        Ok(self.fee)
    }

    async fn sign_transaction(
        &self,
        input: SignTxInput,
        wallet: &dyn HdWallet,
    ) -> WalletResult<SignedTx> {
        self.record(AdapterCall::Sign(input.clone()));
        let body = serde_json::to_string(&input.tx)
            .map_err(|e| WalletError::Other(e.to_string()))?;
        Ok(SignedTx(format!("{}:{}", wallet.wallet_id(), body)))
    }

    async fn broadcast_transaction(&self, tx: SignedTx) -> WalletResult<TxHash> {
        self.record(AdapterCall::Broadcast(tx));
        if self.fail_broadcast.load(Ordering::SeqCst) {
            return Err(WalletError::BroadcastRejected("mempool full".into()));
        }
        self.sequence.fetch_add(1, Ordering::SeqCst);
        Ok(self.next_broadcast_id())
    }
}

// ============================================================================
// Property-Based Testing Strategies
// ============================================================================

/// CAIP-19 ids on chains no Cosmos venue serves
pub fn foreign_asset_id() -> impl Strategy<Value = AssetId> {
    ("[a-z]{3,8}", "[a-z0-9]{1,16}", "[a-z0-9]{1,12}").prop_filter_map(
        "must parse and stay off the Cosmos corridor",
        |(namespace, reference, token)| {
            let chain = ChainId::new(namespace, reference).ok()?;
            if chain == cosmos_chain_id() || chain == osmosis_chain_id() {
                return None;
            }
            AssetId::new(chain, "erc20", token).ok()
        },
    )
}

/// Base-unit amounts as strings, always positive
pub fn base_unit_amount() -> impl Strategy<Value = String> {
    (1u128..=1_000_000_000_000u128).prop_map(|n| n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_chains() {
        assert_eq!(atom().chain_id, cosmos_chain_id());
        assert_eq!(osmo().chain_id, osmosis_chain_id());
        assert_eq!(usdc().chain_id, osmosis_chain_id());
        assert_ne!(btc().chain_id, cosmos_chain_id());
    }

    #[test]
    fn test_edge_case_amounts() {
        assert!(EdgeCaseAmounts::invalid().contains(&""));
        assert!(EdgeCaseAmounts::quotable().contains(&"0"));
    }

    #[tokio::test]
    async fn test_broadcast_ids_queue_then_generate() {
        let adapter = MockChainAdapter::osmosis().with_broadcast_ids(["FIRST", ""]);
        let first = adapter.broadcast_transaction(SignedTx("a".into())).await.unwrap();
        let second = adapter.broadcast_transaction(SignedTx("b".into())).await.unwrap();
        let third = adapter.broadcast_transaction(SignedTx("c".into())).await.unwrap();

        assert_eq!(first.as_str(), "FIRST");
        assert!(second.is_empty());
        assert_eq!(third.as_str(), "osmosis-1-TX1");
        assert_eq!(adapter.broadcast_count(), 3);
    }

    #[tokio::test]
    async fn test_sequence_advances_on_broadcast() {
        let adapter = MockChainAdapter::cosmos().with_account(12, 4);
        adapter.broadcast_transaction(SignedTx("a".into())).await.unwrap();

        let account = adapter.get_account("cosmos1x").await.unwrap();
        assert_eq!(account.account_number, Some(12));
        assert_eq!(account.sequence, Some(5));
    }

    #[tokio::test]
    async fn test_failing_broadcast() {
        let adapter = MockChainAdapter::cosmos().failing_broadcast();
        let err = adapter.broadcast_transaction(SignedTx("a".into())).await;
        assert!(matches!(err, Err(WalletError::BroadcastRejected(_))));
    }

    proptest! {
        #[test]
        fn test_foreign_assets_are_off_corridor(id in foreign_asset_id()) {
            prop_assert_ne!(id.chain_id(), &cosmos_chain_id());
            prop_assert_ne!(id.chain_id(), &osmosis_chain_id());
        }

        #[test]
        fn test_base_unit_amount_positive(amount in base_unit_amount()) {
            prop_assert!(amount.parse::<u128>().unwrap() > 0);
        }
    }
}
