//! Well-known chain and asset identifiers

use crate::{AssetId, ChainId};

/// Bitcoin mainnet
pub const BTC_CHAIN_ID: &str = "bip122:000000000019d6689c085ae165831e93";
/// Ethereum mainnet
pub const ETH_CHAIN_ID: &str = "eip155:1";
/// Avalanche C-Chain
pub const AVALANCHE_CHAIN_ID: &str = "eip155:43114";
/// Cosmos Hub
pub const COSMOS_CHAIN_ID: &str = "cosmos:cosmoshub-4";
/// Osmosis
pub const OSMOSIS_CHAIN_ID: &str = "cosmos:osmosis-1";

/// BTC
pub const BTC_ASSET_ID: &str = "bip122:000000000019d6689c085ae165831e93/slip44:0";
/// ETH
pub const ETH_ASSET_ID: &str = "eip155:1/slip44:60";
/// AVAX
pub const AVALANCHE_ASSET_ID: &str = "eip155:43114/slip44:60";
/// ATOM
pub const COSMOS_ASSET_ID: &str = "cosmos:cosmoshub-4/slip44:118";
/// OSMO
pub const OSMOSIS_ASSET_ID: &str = "cosmos:osmosis-1/slip44:118";

/// Cosmos Hub chain id
pub fn cosmos_chain_id() -> ChainId {
    ChainId::from_static("cosmos", "cosmoshub-4")
}

/// Osmosis chain id
pub fn osmosis_chain_id() -> ChainId {
    ChainId::from_static("cosmos", "osmosis-1")
}

/// ATOM asset id
pub fn cosmos_asset_id() -> AssetId {
    AssetId::from_static(cosmos_chain_id(), "slip44", "118")
}

/// OSMO asset id
pub fn osmosis_asset_id() -> AssetId {
    AssetId::from_static(osmosis_chain_id(), "slip44", "118")
}
