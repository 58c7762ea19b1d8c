//! Shared doubles for the swapper integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use walletd_caip::Asset;
use walletd_error::{Phase, Result, SwapError};
use walletd_swapper::osmosis::{BlockHeightSource, IbcChain, RateInfo, RateOracle, SettlementPoller};
use walletd_swapper::{OsmosisSwapper, OsmosisSwapperConfig, SwapSource, Trade, TradeFeeData};
use walletd_testing::MockChainAdapter;
use walletd_traits::ChainAdapterManager;

pub const RECEIVE_OSMO: &str = "osmo1receiver";
pub const RECEIVE_COSMOS: &str = "cosmos1receiver";
pub const LATEST_HEIGHT: u64 = 1_000;

// ============================================================================
// Rate Oracle
// ============================================================================

/// Fixed rates per ticker pair, recording every request
#[derive(Debug, Default)]
pub struct StubOracle {
    rates: HashMap<(String, String), RateInfo>,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl StubOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, sell: &str, buy: &str, rate: f64) -> Self {
        self.rates.insert(
            (sell.to_string(), buy.to_string()),
            RateInfo {
                rate,
                buy_amount: (rate * 1_000_000.0) as u128,
                price_impact: 0.001,
                trade_fee: 0.002,
            },
        );
        self
    }

    /// ATOM/OSMO at 10, OSMO/ATOM at 0.1, OSMO/USDC at 0.5
    pub fn corridor() -> Self {
        Self::new()
            .with_rate("ATOM", "OSMO", 10.0)
            .with_rate("OSMO", "ATOM", 0.1)
            .with_rate("OSMO", "USDC", 0.5)
    }

    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateOracle for StubOracle {
    async fn get_rate(&self, sell: &str, buy: &str, amount: &str) -> Result<RateInfo> {
        self.calls
            .lock()
            .unwrap()
            .push((sell.to_string(), buy.to_string(), amount.to_string()));
        self.rates
            .get(&(sell.to_string(), buy.to_string()))
            .copied()
            .ok_or_else(|| SwapError::unsupported_pair(Phase::GetRate, sell, buy))
    }
}

// ============================================================================
// Settlement
// ============================================================================

/// What the poller observed, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    Completion {
        chain: IbcChain,
        tx_id: String,
        /// Swaps already signed on Osmosis when the wait started
        osmosis_signed: usize,
    },
    Balance {
        chain: IbcChain,
        address: String,
        denom: String,
    },
}

/// How a scripted completion poll ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Settles,
    TimesOut,
    Fails,
    /// Settles, then cancels the trade's token
    SettlesThenCancel,
}

pub struct ScriptedPoller {
    completion: Completion,
    balance: u128,
    osmosis: Arc<MockChainAdapter>,
    events: Mutex<Vec<PollEvent>>,
}

impl ScriptedPoller {
    pub fn new(osmosis: Arc<MockChainAdapter>, completion: Completion, balance: u128) -> Self {
        Self {
            completion,
            balance,
            osmosis,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<PollEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn completions_on(&self, chain: IbcChain) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, PollEvent::Completion { chain: c, .. } if *c == chain))
            .count()
    }
}

#[async_trait]
impl SettlementPoller for ScriptedPoller {
    async fn poll_for_completion(
        &self,
        chain: IbcChain,
        tx_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.events.lock().unwrap().push(PollEvent::Completion {
            chain,
            tx_id: tx_id.to_string(),
            osmosis_signed: self.osmosis.sign_inputs().len(),
        });
        if cancel.is_cancelled() {
            return Err(SwapError::cancelled(Phase::AwaitingBridgeSettlement));
        }
        match self.completion {
            Completion::Settles => Ok(()),
            Completion::SettlesThenCancel => {
                cancel.cancel();
                Ok(())
            }
            Completion::TimesOut => Err(SwapError::settlement_timeout(
                Phase::AwaitingBridgeSettlement,
                format!("{} tx {} not confirmed", chain, tx_id),
            )),
            Completion::Fails => Err(SwapError::settlement_failed(
                Phase::AwaitingBridgeSettlement,
                format!("{} tx {} failed with code 5", chain, tx_id),
            )),
        }
    }

    async fn poll_for_destination_balance(
        &self,
        chain: IbcChain,
        address: &str,
        denom: &str,
        cancel: &CancellationToken,
    ) -> Result<u128> {
        self.events.lock().unwrap().push(PollEvent::Balance {
            chain,
            address: address.to_string(),
            denom: denom.to_string(),
        });
        if cancel.is_cancelled() {
            return Err(SwapError::cancelled(Phase::AwaitingBridgeSettlement));
        }
        Ok(self.balance)
    }
}

/// Constant latest height, recording which chains were asked
#[derive(Debug, Default)]
pub struct FixedHeights {
    asked: Mutex<Vec<IbcChain>>,
}

impl FixedHeights {
    pub fn asked(&self) -> Vec<IbcChain> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlockHeightSource for FixedHeights {
    async fn latest_height(&self, chain: IbcChain) -> Result<u64> {
        self.asked.lock().unwrap().push(chain);
        Ok(LATEST_HEIGHT)
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Honors `RUST_LOG` when debugging a failing test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct Harness {
    pub swapper: OsmosisSwapper,
    pub cosmos: Arc<MockChainAdapter>,
    pub osmosis: Arc<MockChainAdapter>,
    pub oracle: Arc<StubOracle>,
    pub poller: Arc<ScriptedPoller>,
    pub heights: Arc<FixedHeights>,
}

pub struct HarnessBuilder {
    cosmos: MockChainAdapter,
    osmosis: MockChainAdapter,
    oracle: StubOracle,
    completion: Completion,
    balance: u128,
    register_cosmos: bool,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            cosmos: MockChainAdapter::cosmos().with_account(21, 3),
            osmosis: MockChainAdapter::osmosis().with_account(42, 7),
            oracle: StubOracle::corridor(),
            completion: Completion::Settles,
            balance: 990_000,
            register_cosmos: true,
        }
    }

    pub fn cosmos(mut self, f: impl FnOnce(MockChainAdapter) -> MockChainAdapter) -> Self {
        self.cosmos = f(self.cosmos);
        self
    }

    pub fn osmosis(mut self, f: impl FnOnce(MockChainAdapter) -> MockChainAdapter) -> Self {
        self.osmosis = f(self.osmosis);
        self
    }

    pub fn oracle(mut self, oracle: StubOracle) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn completion(mut self, completion: Completion) -> Self {
        self.completion = completion;
        self
    }

    pub fn balance(mut self, balance: u128) -> Self {
        self.balance = balance;
        self
    }

    pub fn without_cosmos_adapter(mut self) -> Self {
        self.register_cosmos = false;
        self
    }

    pub fn build(self) -> Harness {
        init_tracing();
        let cosmos = Arc::new(self.cosmos);
        let osmosis = Arc::new(self.osmosis);

        let mut manager = ChainAdapterManager::new();
        manager.register(osmosis.clone());
        if self.register_cosmos {
            manager.register(cosmos.clone());
        }

        let oracle = Arc::new(self.oracle);
        let poller = Arc::new(ScriptedPoller::new(
            osmosis.clone(),
            self.completion,
            self.balance,
        ));
        let heights = Arc::new(FixedHeights::default());

        let swapper = OsmosisSwapper::from_parts(
            &OsmosisSwapperConfig::default(),
            Arc::new(manager),
            oracle.clone(),
            poller.clone(),
            heights.clone(),
        );

        Harness {
            swapper,
            cosmos,
            osmosis,
            oracle,
            poller,
            heights,
        }
    }
}

pub fn harness() -> Harness {
    HarnessBuilder::new().build()
}

/// A priced trade as `build_trade` would return it, with a receive address
pub fn trade(sell: Asset, buy: Asset, sell_amount: &str, receive_address: &str) -> Trade {
    Trade {
        sell_asset: sell,
        buy_asset: buy,
        sell_amount: sell_amount.to_string(),
        buy_amount: "1".to_string(),
        rate: 1.0,
        fee_data: TradeFeeData {
            fee: 5_000,
            trade_fee: 0.002,
        },
        receive_address: receive_address.to_string(),
        sell_asset_account_number: 0,
        sources: vec![SwapSource::new("Osmosis", "100")],
    }
}
