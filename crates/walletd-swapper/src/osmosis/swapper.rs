use super::builder::TradeBuilder;
use super::constants::SWAPPER_NAME;
use super::executor::{Channels, TradeExecutor};
use super::rate::{LcdRateOracle, RateOracle};
use super::settlement::{BlockHeightSource, LcdSettlementPoller, SettlementPoller};
use super::transfer::IbcTransferExecutor;
use crate::api::{
    BuildTradeInput, ExecuteTradeInput, GetTradeQuoteInput, MinMaxOutput, Swapper, SwapperType,
    Trade, TradeQuote, TradeResult, TradeTxs,
};
use crate::config::OsmosisSwapperConfig;
use async_trait::async_trait;
use std::sync::Arc;
use walletd_caip::constants::{cosmos_asset_id, osmosis_asset_id};
use walletd_caip::{Asset, AssetId};
use walletd_error::{Result, SwapError};
use walletd_provider::HttpClient;
use walletd_traits::ChainAdapterManager;

/// Swaps ATOM and OSMO on the Osmosis AMM, bridging ATOM over IBC
#[derive(Debug, Clone)]
pub struct OsmosisSwapper {
    builder: TradeBuilder,
    executor: TradeExecutor,
    supported: Vec<AssetId>,
}

impl OsmosisSwapper {
    /// Swapper talking to the LCD endpoints in `config`
    pub fn new(config: OsmosisSwapperConfig, adapters: Arc<ChainAdapterManager>) -> Result<Self> {
        config.validate()?;

        let osmosis = HttpClient::new(config.osmosis_provider())
            .map_err(|e| SwapError::config(format!("osmosis client: {}", e)))?;
        let cosmos = HttpClient::new(config.cosmos_provider())
            .map_err(|e| SwapError::config(format!("cosmos client: {}", e)))?;

        let oracle = Arc::new(LcdRateOracle::new(
            osmosis.clone(),
            config.pool_id,
            config.usd_pool_id,
        ));
        let poller = Arc::new(LcdSettlementPoller::new(
            cosmos,
            osmosis,
            config.poll_config(),
        ));

        tracing::info!(
            osmo_url = %config.osmo_url,
            cosmos_url = %config.cosmos_url,
            pool_id = config.pool_id,
            "osmosis swapper ready"
        );
        Ok(Self::from_parts(
            &config,
            adapters,
            oracle,
            poller.clone(),
            poller,
        ))
    }

    /// Swapper over caller-supplied rate, settlement and height sources
    pub fn from_parts(
        config: &OsmosisSwapperConfig,
        adapters: Arc<ChainAdapterManager>,
        oracle: Arc<dyn RateOracle>,
        poller: Arc<dyn SettlementPoller>,
        heights: Arc<dyn BlockHeightSource>,
    ) -> Self {
        let channels = Channels {
            cosmos_to_osmo: config.cosmos_to_osmo_channel.clone(),
            osmo_to_cosmos: config.osmo_to_cosmos_channel.clone(),
        };
        Self {
            builder: TradeBuilder::new(oracle, adapters.clone()),
            executor: TradeExecutor::new(
                adapters,
                poller,
                IbcTransferExecutor::new(heights),
                channels,
                config.pool_id,
            ),
            supported: vec![cosmos_asset_id(), osmosis_asset_id()],
        }
    }

    /// Asset ids this venue trades
    pub fn supported_assets(&self) -> &[AssetId] {
        &self.supported
    }
}

#[async_trait]
impl Swapper for OsmosisSwapper {
    fn name(&self) -> &str {
        SWAPPER_NAME
    }

    fn swapper_type(&self) -> SwapperType {
        SwapperType::Osmosis
    }

    async fn build_trade(&self, input: &BuildTradeInput) -> Result<Trade> {
        self.builder.build_trade(input).await
    }

    async fn get_trade_quote(&self, input: &GetTradeQuoteInput) -> Result<TradeQuote> {
        self.builder.get_trade_quote(input).await
    }

    async fn execute_trade(&self, input: ExecuteTradeInput) -> Result<TradeResult> {
        let ExecuteTradeInput {
            trade,
            wallet,
            cancel,
        } = input;
        self.executor.execute(&trade, wallet.as_ref(), &cancel).await
    }

    async fn get_usd_rate(&self, asset: &Asset) -> Result<f64> {
        self.builder.get_usd_rate(asset).await
    }

    async fn get_min_max(&self, sell_asset: &Asset) -> Result<MinMaxOutput> {
        self.builder.get_min_max(sell_asset).await
    }

    fn filter_buy_assets_by_sell_asset_id(&self, sell_asset_id: &AssetId) -> Vec<AssetId> {
        if self.supported.contains(sell_asset_id) {
            self.supported.clone()
        } else {
            Vec::new()
        }
    }

    fn filter_asset_ids_by_sellable(&self) -> Vec<AssetId> {
        self.supported.clone()
    }

    async fn get_trade_txs(&self, result: &TradeResult) -> Result<TradeTxs> {
        Ok(TradeTxs {
            sell_txid: result.trade_id.clone(),
            buy_txid: result.trade_id.clone(),
        })
    }
}
