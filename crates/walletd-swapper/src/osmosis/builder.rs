//! Trades and quotes

use super::constants::{MAX_SWAPPER_SELL, SWAPPER_NAME};
use super::rate::RateOracle;
use crate::amount::{format_decimal, round_base_units};
use crate::api::{
    BuildTradeInput, GetTradeQuoteInput, MinMaxOutput, SwapSource, Trade, TradeFeeData,
    TradeQuote,
};
use std::sync::Arc;
use walletd_caip::constants::osmosis_chain_id;
use walletd_caip::Asset;
use walletd_error::{Phase, Result, SwapError};
use walletd_traits::{ChainAdapterManager, FeeData};

const USD_SYMBOL: &str = "USDC";
const VENUE_SYMBOL: &str = "OSMO";
const UNIT: &str = "1";

/// Every Osmosis trade is routed entirely through the venue
pub fn default_sources() -> Vec<SwapSource> {
    vec![SwapSource::new(SWAPPER_NAME, "100")]
}

/// Prices trades and quotes from the oracle and the venue adapter's fee
/// estimate.
#[derive(Clone)]
pub struct TradeBuilder {
    oracle: Arc<dyn RateOracle>,
    adapters: Arc<ChainAdapterManager>,
}

impl std::fmt::Debug for TradeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeBuilder")
            .field("adapters", &self.adapters)
            .finish_non_exhaustive()
    }
}

impl TradeBuilder {
    /// Builder over `oracle` and the registered adapters
    pub fn new(oracle: Arc<dyn RateOracle>, adapters: Arc<ChainAdapterManager>) -> Self {
        Self { oracle, adapters }
    }

    /// The rate source
    pub fn oracle(&self) -> &Arc<dyn RateOracle> {
        &self.oracle
    }

    async fn venue_fee(&self, phase: Phase) -> Result<FeeData> {
        let chain_id = osmosis_chain_id();
        let adapter = self
            .adapters
            .get(&chain_id)
            .ok_or_else(|| SwapError::adapter_unavailable(phase, &chain_id))?;

        let estimate = adapter.get_fee_data().await.map_err(|e| {
            SwapError::rate_unavailable(phase, format!("{} fee estimate: {}", chain_id, e))
        })?;
        Ok(estimate.average)
    }

    /// Prices a trade. `"0"` is priced at the marginal rate.
    pub async fn build_trade(&self, input: &BuildTradeInput) -> Result<Trade> {
        let phase = Phase::BuildTrade;
        if input.sell_amount.is_empty() {
            return Err(SwapError::invalid_amount(phase, "sell amount is required"));
        }
        let sell_amount = round_base_units(&input.sell_amount).ok_or_else(|| {
            SwapError::invalid_amount(phase, format!("not a number: '{}'", input.sell_amount))
        })?;

        let fee = self.venue_fee(phase).await?;
        let info = self
            .oracle
            .get_rate(
                &input.sell_asset.symbol,
                &input.buy_asset.symbol,
                &input.sell_amount,
            )
            .await
            .map_err(|e| e.in_phase(phase))?;

        Ok(Trade {
            sell_asset: input.sell_asset.clone(),
            buy_asset: input.buy_asset.clone(),
            sell_amount: sell_amount.to_string(),
            buy_amount: info.buy_amount.to_string(),
            rate: info.rate,
            fee_data: TradeFeeData {
                fee: fee.tx_fee,
                trade_fee: info.trade_fee,
            },
            receive_address: input.receive_address.clone(),
            sell_asset_account_number: input.sell_asset_account_number,
            sources: default_sources(),
        })
    }

    /// Quotes a trade, echoing the caller's sell amount as given
    pub async fn get_trade_quote(&self, input: &GetTradeQuoteInput) -> Result<TradeQuote> {
        let phase = Phase::GetTradeQuote;
        if input.sell_amount.is_empty() {
            return Err(SwapError::invalid_amount(phase, "sell amount is required"));
        }

        let fee = self.venue_fee(phase).await?;
        let info = self
            .oracle
            .get_rate(
                &input.sell_asset.symbol,
                &input.buy_asset.symbol,
                &input.sell_amount,
            )
            .await
            .map_err(|e| e.in_phase(phase))?;
        let MinMaxOutput { minimum, maximum } = self.get_min_max(&input.sell_asset).await?;

        Ok(TradeQuote {
            sell_asset: input.sell_asset.clone(),
            buy_asset: input.buy_asset.clone(),
            sell_amount: input.sell_amount.clone(),
            buy_amount: info.buy_amount.to_string(),
            rate: info.rate,
            price_impact: info.price_impact,
            fee_data: TradeFeeData {
                fee: fee.tx_fee,
                trade_fee: info.trade_fee,
            },
            minimum,
            maximum,
            sell_asset_account_number: input.sell_asset_account_number,
            sources: default_sources(),
            allowance_contract: String::new(),
        })
    }

    /// USD value of one base unit of `asset`, priced through OSMO/USDC
    pub async fn get_usd_rate(&self, asset: &Asset) -> Result<f64> {
        let osmo_usd = self
            .oracle
            .get_rate(VENUE_SYMBOL, USD_SYMBOL, UNIT)
            .await
            .map_err(|e| e.in_phase(Phase::GetRate))?
            .rate;

        if asset.symbol == VENUE_SYMBOL {
            return Ok(osmo_usd);
        }

        let asset_osmo = self
            .oracle
            .get_rate(&asset.symbol, VENUE_SYMBOL, UNIT)
            .await
            .map_err(|e| e.in_phase(Phase::GetRate))?
            .rate;
        Ok(asset_osmo * osmo_usd)
    }

    /// Minimum is one dollar's worth of `sell_asset`
    pub async fn get_min_max(&self, sell_asset: &Asset) -> Result<MinMaxOutput> {
        let usd_rate = self.get_usd_rate(sell_asset).await?;
        if !(usd_rate.is_finite() && usd_rate > 0.0) {
            return Err(SwapError::rate_unavailable(
                Phase::GetRate,
                format!("no usd rate for {}", sell_asset.symbol),
            ));
        }

        Ok(MinMaxOutput {
            minimum: format_decimal(1.0 / usd_rate),
            maximum: MAX_SWAPPER_SELL.to_string(),
        })
    }
}
