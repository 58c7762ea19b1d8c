//! Pool-based rate discovery
//!
//! Rates come straight from the pool reserves: for reserves `x` (sell) and
//! `y` (buy) and constant `k = x * y`, selling `s` yields
//! `y - k / (x + s)`.

use super::constants::QUOTE_UNIT_AMOUNT;
use super::denom::denom_for_symbol;
use crate::amount::{is_zero_or_empty, parse_decimal};
use async_trait::async_trait;
use serde::Deserialize;
use walletd_error::{Phase, Result, SwapError};
use walletd_provider::HttpClient;
use walletd_traits::Coin;

/// Result of a rate lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateInfo {
    /// Buy units per sell unit
    pub rate: f64,
    /// Buy amount for the requested sell amount, base units, rounded down
    pub buy_amount: u128,
    /// Relative price movement caused by the trade
    pub price_impact: f64,
    /// Pool swap fee as a fraction
    pub trade_fee: f64,
}

/// Source of swap rates
#[async_trait]
pub trait RateOracle: Send + Sync {
    /// Rate for selling `sell_amount` base units of `sell_symbol`.
    ///
    /// A zero or empty amount is quoted with [`QUOTE_UNIT_AMOUNT`] instead.
    async fn get_rate(&self, sell_symbol: &str, buy_symbol: &str, sell_amount: &str)
        -> Result<RateInfo>;
}

/// Constant-product quote; `None` when a reserve or the amount is not positive
pub fn constant_product_quote(
    sell_reserve: f64,
    buy_reserve: f64,
    sell_amount: f64,
    swap_fee: f64,
) -> Option<RateInfo> {
    if !(sell_reserve > 0.0 && buy_reserve > 0.0 && sell_amount > 0.0) {
        return None;
    }

    let k = sell_reserve * buy_reserve;
    let sell_after = sell_reserve + sell_amount;
    let buy_after = k / sell_after;
    let buy_amount = buy_reserve - buy_after;

    let initial_price = sell_reserve / buy_reserve;
    let final_price = sell_after / buy_after;

    Some(RateInfo {
        rate: buy_amount / sell_amount,
        buy_amount: buy_amount.max(0.0).floor() as u128,
        price_impact: (1.0 - initial_price / final_price).abs(),
        trade_fee: swap_fee,
    })
}

/// Amount used for rate discovery
pub fn discovery_amount(sell_amount: &str) -> &str {
    if is_zero_or_empty(sell_amount) {
        QUOTE_UNIT_AMOUNT
    } else {
        sell_amount
    }
}

#[derive(Debug, Deserialize)]
struct PoolResponse {
    pool: Pool,
}

#[derive(Debug, Deserialize)]
struct Pool {
    #[serde(alias = "poolParams")]
    pool_params: PoolParams,
    #[serde(alias = "poolAssets")]
    pool_assets: Vec<PoolAsset>,
}

#[derive(Debug, Deserialize)]
struct PoolParams {
    #[serde(alias = "swapFee")]
    swap_fee: String,
}

#[derive(Debug, Deserialize)]
struct PoolAsset {
    token: Coin,
}

impl Pool {
    fn reserve(&self, denom: &str) -> Option<f64> {
        self.pool_assets
            .iter()
            .find(|asset| asset.token.denom == denom)
            .and_then(|asset| parse_decimal(&asset.token.amount))
    }
}

/// [`RateOracle`] reading balancer pools from an Osmosis LCD
#[derive(Debug, Clone)]
pub struct LcdRateOracle {
    client: HttpClient,
    pool_id: u64,
    usd_pool_id: u64,
}

impl LcdRateOracle {
    /// Oracle over `client`, pricing ATOM/OSMO in `pool_id` and USDC pairs
    /// in `usd_pool_id`
    pub fn new(client: HttpClient, pool_id: u64, usd_pool_id: u64) -> Self {
        Self {
            client,
            pool_id,
            usd_pool_id,
        }
    }

    fn pool_for(&self, sell_symbol: &str, buy_symbol: &str) -> u64 {
        if sell_symbol == "USDC" || buy_symbol == "USDC" {
            self.usd_pool_id
        } else {
            self.pool_id
        }
    }

    async fn fetch_pool(&self, pool_id: u64) -> Result<Pool> {
        let path = format!("osmosis/gamm/v1beta1/pools/{}", pool_id);
        let response: PoolResponse = self.client.get_json(&path).await.map_err(|e| {
            SwapError::rate_unavailable(Phase::GetRate, format!("pool {}: {}", pool_id, e))
        })?;
        Ok(response.pool)
    }
}

#[async_trait]
impl RateOracle for LcdRateOracle {
    async fn get_rate(
        &self,
        sell_symbol: &str,
        buy_symbol: &str,
        sell_amount: &str,
    ) -> Result<RateInfo> {
        let (Some(sell_denom), Some(buy_denom)) =
            (denom_for_symbol(sell_symbol), denom_for_symbol(buy_symbol))
        else {
            return Err(SwapError::unsupported_pair(
                Phase::GetRate,
                sell_symbol,
                buy_symbol,
            ));
        };

        let amount = discovery_amount(sell_amount);
        let sell = parse_decimal(amount).ok_or_else(|| {
            SwapError::invalid_amount(Phase::GetRate, format!("not a number: '{}'", amount))
        })?;

        let pool_id = self.pool_for(sell_symbol, buy_symbol);
        let pool = self.fetch_pool(pool_id).await?;

        let sell_reserve = pool.reserve(sell_denom).ok_or_else(|| {
            SwapError::rate_unavailable(
                Phase::GetRate,
                format!("pool {} has no {} reserve", pool_id, sell_symbol),
            )
        })?;
        let buy_reserve = pool.reserve(buy_denom).ok_or_else(|| {
            SwapError::rate_unavailable(
                Phase::GetRate,
                format!("pool {} has no {} reserve", pool_id, buy_symbol),
            )
        })?;
        let swap_fee = parse_decimal(&pool.pool_params.swap_fee).ok_or_else(|| {
            SwapError::rate_unavailable(
                Phase::GetRate,
                format!("pool {} swap fee '{}'", pool_id, pool.pool_params.swap_fee),
            )
        })?;

        let info = constant_product_quote(sell_reserve, buy_reserve, sell, swap_fee)
            .ok_or_else(|| {
                SwapError::rate_unavailable(Phase::GetRate, format!("pool {} is empty", pool_id))
            })?;

        tracing::debug!(
            pool_id,
            sell = sell_symbol,
            buy = buy_symbol,
            amount,
            rate = info.rate,
            price_impact = info.price_impact,
            "rate quoted"
        );
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_product_quote() {
        // 1000 sell / 2000 buy, sell 10
        let info = constant_product_quote(1000.0, 2000.0, 10.0, 0.002).unwrap();
        let expected_buy = 2000.0 - (1000.0 * 2000.0) / 1010.0;
        assert!((info.rate - expected_buy / 10.0).abs() < 1e-12);
        assert_eq!(info.buy_amount, expected_buy.floor() as u128);
        assert_eq!(info.trade_fee, 0.002);
        assert!(info.price_impact > 0.0 && info.price_impact < 0.03);
    }

    #[test]
    fn test_rate_tends_to_spot_for_small_sells() {
        let info = constant_product_quote(1_000_000.0, 3_000_000.0, 1.0, 0.0).unwrap();
        assert!((info.rate - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_pool_has_no_quote() {
        assert!(constant_product_quote(0.0, 10.0, 1.0, 0.0).is_none());
        assert!(constant_product_quote(10.0, 0.0, 1.0, 0.0).is_none());
        assert!(constant_product_quote(10.0, 10.0, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_discovery_amount() {
        assert_eq!(discovery_amount("0"), "1");
        assert_eq!(discovery_amount(""), "1");
        assert_eq!(discovery_amount("250"), "250");
    }

    #[test]
    fn test_pool_accepts_both_casings() {
        let snake: PoolResponse = serde_json::from_str(
            r#"{"pool":{"pool_params":{"swap_fee":"0.002"},"pool_assets":[{"token":{"denom":"uosmo","amount":"5"},"weight":"1"}]}}"#,
        )
        .unwrap();
        let camel: PoolResponse = serde_json::from_str(
            r#"{"pool":{"poolParams":{"swapFee":"0.002"},"poolAssets":[{"token":{"denom":"uosmo","amount":"5"}}]}}"#,
        )
        .unwrap();
        assert_eq!(snake.pool.reserve("uosmo"), Some(5.0));
        assert_eq!(camel.pool.reserve("uosmo"), Some(5.0));
        assert_eq!(camel.pool.reserve("uatom"), None);
    }
}
