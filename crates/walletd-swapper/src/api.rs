//! Venue-neutral swapper surface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use walletd_caip::{Asset, AssetId};
use walletd_error::{Result, SwapError};
use walletd_traits::{HdWallet, TxHash};

/// Returned as the trade id when a broadcast produced no transaction id
pub const ERROR_SENTINEL: &str = "error";

/// Known swap venues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SwapperType {
    /// Osmosis AMM reached over IBC
    Osmosis,
}

impl fmt::Display for SwapperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Osmosis => write!(f, "Osmosis"),
        }
    }
}

/// Liquidity source contributing to a trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSource {
    /// Source name
    pub name: String,
    /// Share of the trade routed through it, in percent
    pub proportion: String,
}

impl SwapSource {
    /// Creates a source
    pub fn new(name: impl Into<String>, proportion: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            proportion: proportion.into(),
        }
    }
}

/// Fees attached to a trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeFeeData {
    /// Network fee in base units of the venue's fee asset
    pub fee: u128,
    /// Venue swap fee as a fraction (`0.002` is 0.2%)
    pub trade_fee: f64,
}

/// Quote returned before the user commits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeQuote {
    /// Asset sold
    pub sell_asset: Asset,
    /// Asset bought
    pub buy_asset: Asset,
    /// Sell amount exactly as the caller passed it
    pub sell_amount: String,
    /// Expected buy amount, base units
    pub buy_amount: String,
    /// Buy units per sell unit
    pub rate: f64,
    /// Price movement caused by the trade, as a fraction
    pub price_impact: f64,
    /// Fees
    pub fee_data: TradeFeeData,
    /// Smallest sensible sell amount
    pub minimum: String,
    /// Largest accepted sell amount
    pub maximum: String,
    /// Wallet account index of the sell asset
    pub sell_asset_account_number: u32,
    /// Liquidity sources
    pub sources: Vec<SwapSource>,
    /// Contract needing an allowance; empty when none
    pub allowance_contract: String,
}

/// Unsigned trade, ready to execute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    /// Asset sold
    pub sell_asset: Asset,
    /// Asset bought
    pub buy_asset: Asset,
    /// Sell amount, integer base units
    pub sell_amount: String,
    /// Expected buy amount, base units
    pub buy_amount: String,
    /// Buy units per sell unit
    pub rate: f64,
    /// Fees
    pub fee_data: TradeFeeData,
    /// Destination address for the bought asset
    pub receive_address: String,
    /// Wallet account index of the sell asset
    pub sell_asset_account_number: u32,
    /// Liquidity sources
    pub sources: Vec<SwapSource>,
}

/// Outcome of an executed trade
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResult {
    /// Transaction id of the venue swap, or [`ERROR_SENTINEL`]
    pub trade_id: String,
}

impl TradeResult {
    /// Wraps a broadcast id; an empty id becomes [`ERROR_SENTINEL`]
    pub fn from_broadcast(tx: &TxHash) -> Self {
        if tx.is_empty() {
            Self::error_sentinel()
        } else {
            Self {
                trade_id: tx.to_string(),
            }
        }
    }

    /// The sentinel result
    pub fn error_sentinel() -> Self {
        Self {
            trade_id: ERROR_SENTINEL.to_string(),
        }
    }

    /// True if the broadcast returned no id; treat as a failed trade
    pub fn is_error_sentinel(&self) -> bool {
        self.trade_id == ERROR_SENTINEL
    }
}

/// Transaction ids of both sides of a trade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeTxs {
    /// Sell-side transaction
    pub sell_txid: String,
    /// Buy-side transaction
    pub buy_txid: String,
}

/// Sell amount bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinMaxOutput {
    /// Minimum sell amount
    pub minimum: String,
    /// Maximum sell amount
    pub maximum: String,
}

/// Answer to "does this trade need a token allowance first"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalNeededOutput {
    /// True if an approval transaction must precede the trade
    pub approval_needed: bool,
}

/// Input to [`Swapper::get_trade_quote`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTradeQuoteInput {
    /// Asset sold
    pub sell_asset: Asset,
    /// Asset bought
    pub buy_asset: Asset,
    /// Sell amount in base units; `"0"` asks for the marginal rate
    pub sell_amount: String,
    /// Wallet account index of the sell asset
    #[serde(default)]
    pub sell_asset_account_number: u32,
}

impl GetTradeQuoteInput {
    /// Quote input for account 0
    pub fn new(sell_asset: Asset, buy_asset: Asset, sell_amount: impl Into<String>) -> Self {
        Self {
            sell_asset,
            buy_asset,
            sell_amount: sell_amount.into(),
            sell_asset_account_number: 0,
        }
    }
}

/// Input to [`Swapper::build_trade`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTradeInput {
    /// Asset sold
    pub sell_asset: Asset,
    /// Asset bought
    pub buy_asset: Asset,
    /// Sell amount in base units
    pub sell_amount: String,
    /// Wallet account index of the sell asset
    #[serde(default)]
    pub sell_asset_account_number: u32,
    /// Destination address for the bought asset
    #[serde(default)]
    pub receive_address: String,
}

impl BuildTradeInput {
    /// Build input for account 0 without a receive address
    pub fn new(sell_asset: Asset, buy_asset: Asset, sell_amount: impl Into<String>) -> Self {
        Self {
            sell_asset,
            buy_asset,
            sell_amount: sell_amount.into(),
            sell_asset_account_number: 0,
            receive_address: String::new(),
        }
    }
}

/// Input to [`Swapper::execute_trade`]
#[derive(Debug, Clone)]
pub struct ExecuteTradeInput {
    /// Trade to execute
    pub trade: Trade,
    /// Signing handle
    pub wallet: Arc<dyn HdWallet>,
    /// Checked before each broadcast
    pub cancel: CancellationToken,
}

impl ExecuteTradeInput {
    /// Input with a fresh, never-cancelled token
    pub fn new(trade: Trade, wallet: Arc<dyn HdWallet>) -> Self {
        Self {
            trade,
            wallet,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// A swap venue.
///
/// Operations a venue has no concept of keep their default
/// implementation, which reports [`walletd_error::SwapErrorKind::NotSupported`].
#[async_trait]
pub trait Swapper: Send + Sync {
    /// Human-readable venue name
    fn name(&self) -> &str;

    /// Venue type
    fn swapper_type(&self) -> SwapperType;

    /// Builds an unsigned trade
    async fn build_trade(&self, input: &BuildTradeInput) -> Result<Trade>;

    /// Quotes a trade
    async fn get_trade_quote(&self, input: &GetTradeQuoteInput) -> Result<TradeQuote>;

    /// Executes a trade end to end
    async fn execute_trade(&self, input: ExecuteTradeInput) -> Result<TradeResult>;

    /// USD price of one base unit of `asset`
    async fn get_usd_rate(&self, asset: &Asset) -> Result<f64>;

    /// Sell amount bounds for `sell_asset`
    async fn get_min_max(&self, sell_asset: &Asset) -> Result<MinMaxOutput>;

    /// Whether the trade needs an allowance first
    async fn approval_needed(&self, _trade: &TradeQuote) -> Result<ApprovalNeededOutput> {
        Ok(ApprovalNeededOutput {
            approval_needed: false,
        })
    }

    /// Grants an unlimited allowance, returning the approval tx id
    async fn approve_infinite(&self, _trade: &TradeQuote) -> Result<String> {
        Err(SwapError::not_supported(format!(
            "{}: approve_infinite is not supported",
            self.name()
        )))
    }

    /// Assets that can be bought with `sell_asset_id`
    fn filter_buy_assets_by_sell_asset_id(&self, sell_asset_id: &AssetId) -> Vec<AssetId>;

    /// Assets that can be sold
    fn filter_asset_ids_by_sellable(&self) -> Vec<AssetId>;

    /// Transaction ids for an executed trade
    async fn get_trade_txs(&self, result: &TradeResult) -> Result<TradeTxs>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_result_from_broadcast() {
        let result = TradeResult::from_broadcast(&TxHash::new("ABC123"));
        assert_eq!(result.trade_id, "ABC123");
        assert!(!result.is_error_sentinel());
    }

    #[test]
    fn test_empty_broadcast_is_sentinel() {
        let result = TradeResult::from_broadcast(&TxHash::default());
        assert_eq!(result.trade_id, "error");
        assert!(result.is_error_sentinel());
    }

    #[test]
    fn test_swapper_type_display() {
        assert_eq!(SwapperType::Osmosis.to_string(), "Osmosis");
    }

    #[test]
    fn test_fee_data_serialization() {
        let fee = TradeFeeData {
            fee: 2500,
            trade_fee: 0.002,
        };
        let json = serde_json::to_value(&fee).unwrap();
        assert_eq!(json["tradeFee"], 0.002);
        assert_eq!(json["fee"], 2500);
    }
}
