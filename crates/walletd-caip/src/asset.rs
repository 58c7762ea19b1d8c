//! Asset description used by swappers

use crate::{AssetId, ChainId};
use serde::{Deserialize, Serialize};

/// A tradable asset as seen by a swapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// CAIP-19 identifier
    pub asset_id: AssetId,
    /// CAIP-2 chain the asset lives on
    pub chain_id: ChainId,
    /// Ticker symbol (e.g., "ATOM")
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Decimal places of the base denomination
    pub precision: u8,
}

impl Asset {
    /// Creates an asset, deriving the chain id from the asset id
    pub fn new(asset_id: AssetId, symbol: &str, name: &str, precision: u8) -> Self {
        Self {
            chain_id: asset_id.chain_id().clone(),
            asset_id,
            symbol: symbol.to_string(),
            name: name.to_string(),
            precision,
        }
    }
}
