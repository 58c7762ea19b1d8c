//! OnRamper token ids
//!
//! The table is built once, on first use, by [`OnRamperTable::build`] and is
//! read-only afterwards. Lookups are plain map reads and never allocate new
//! entries.

use crate::constants::{AVALANCHE_ASSET_ID, BTC_ASSET_ID, COSMOS_ASSET_ID, ETH_ASSET_ID};
use crate::AssetId;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Token id as used by the OnRamper widget (e.g. `"DAI_ERC20"`)
pub type OnRamperTokenId = String;

const ONRAMPER_TOKENS: &[(&str, &[&str])] = &[
    (BTC_ASSET_ID, &["BTC"]),
    (COSMOS_ASSET_ID, &["ATOM"]),
    (ETH_ASSET_ID, &["ETH"]),
    (AVALANCHE_ASSET_ID, &["AVAX"]),
    ("eip155:1/erc20:0x7fc66500c84a76ad7e9c93437bfc5ac33e2ddae9", &["AAVE_ECR20"]),
    ("eip155:1/erc20:0xbb0e17ef65f82ab018d8edd776e8dd940327b28b", &["AXS"]),
    ("eip155:1/erc20:0x4d224452801aced8b2f0aebe155379bb5d594381", &["APE"]),
    ("eip155:1/erc20:0x0d8775f648430679a709e98d2b0cb6250d2887ef", &["BAT_ERC20"]),
    ("eip155:1/erc20:0x4fabb145d64652a948d72533023f6e7a623c7c53", &["BUSD"]),
    ("eip155:1/erc20:0x3506424f91fd33084466f402d5d97f05f8e3b4af", &["CHZ"]),
    ("eip155:1/erc20:0xc00e94cb662c3520282e6f5717214004a7f26888", &["COMP"]),
    ("eip155:1/erc20:0x6b175474e89094c44da98b954eedeac495271d0f", &["DAI", "DAI_ERC20"]),
    ("eip155:1/erc20:0xf629cbd94d3791c9250152bd8dfbdf380e2a3b9c", &["ENJ"]),
    ("eip155:1/erc20:0x4e15361fd6b4bb609fa63c81a2be19d873717870", &["FTM"]),
    ("eip155:1/erc20:0xf57e7e7c23978c3caec3c3548e3d615c346e79ff", &["IMX"]),
    ("eip155:1/erc20:0x514910771af9ca656af840dff83e8264ecf986ca", &["LINK"]),
    ("eip155:1/erc20:0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2", &["MKR", "MKR_ERC20"]),
    ("eip155:1/erc20:0x0f5d2fb29fb7d3cfee444a200298f468908cc942", &["MANA", "MANA_ERC20"]),
    ("eip155:1/erc20:0xd26114cd6ee289accf82350c8d8487fedb8a0c07", &["OMG"]),
    ("eip155:1/erc20:0x57ab1ec28d129707052df4df418d58a2d46d5f51", &["SUSDC"]),
    ("eip155:1/erc20:0x6b3595068778dd592e39a122f4f5a5cf09c90fe2", &["SUSHI", "SUSHI_ERC20"]),
    ("eip155:1/erc20:0xc011a73ee8576fb46f5e1c5751ca3b9fe0af2a6f", &["SNX"]),
    ("eip155:1/erc20:0x1f9840a85d5af5bf1d1762f925bdaddc4201f984", &["UNI", "UNI-ERC20"]),
    ("eip155:1/erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", &["USDC"]),
    ("eip155:1/erc20:0xdac17f958d2ee523a2206206994597c13d831ec7", &["USDT"]),
    ("eip155:1/erc20:0x2260fac5e5542a773aa44fbcfedf7c193bc2c599", &["WBTC"]),
];

/// Asset supported by OnRamper together with its token ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnRamperSupportedAsset {
    /// Asset identifier
    pub asset_id: AssetId,
    /// OnRamper token ids for the asset
    pub tokens: Vec<OnRamperTokenId>,
}

/// Bidirectional asset id ↔ OnRamper token id table
#[derive(Debug, Clone, Default)]
pub struct OnRamperTable {
    by_asset: BTreeMap<AssetId, Vec<OnRamperTokenId>>,
    by_token: HashMap<OnRamperTokenId, AssetId>,
}

impl OnRamperTable {
    /// Builds the table from the fixed entry list.
    ///
    /// Rows whose asset id fails to parse are skipped; a token id listed
    /// under two assets resolves to the later one.
    pub fn build() -> Self {
        Self::from_entries(ONRAMPER_TOKENS.iter().map(|(id, tokens)| (*id, *tokens)))
    }

    /// Builds a table from arbitrary entries
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a [&'a str])>) -> Self {
        let mut table = Self::default();
        for (raw_id, tokens) in entries {
            let Ok(asset_id) = raw_id.parse::<AssetId>() else {
                continue;
            };
            // explode the id list into a 1:1 token => asset mapping
            for token in tokens {
                table.by_token.insert(token.to_string(), asset_id.clone());
            }
            table
                .by_asset
                .insert(asset_id, tokens.iter().map(|t| t.to_string()).collect());
        }
        table
    }

    /// Token ids for an asset
    pub fn token_list(&self, asset_id: &AssetId) -> Option<&[OnRamperTokenId]> {
        self.by_asset.get(asset_id).map(Vec::as_slice)
    }

    /// Asset id for a token id
    pub fn asset_id(&self, token_id: &str) -> Option<&AssetId> {
        self.by_token.get(token_id)
    }

    /// All supported assets, ordered by asset id
    pub fn supported_assets(&self) -> Vec<OnRamperSupportedAsset> {
        self.by_asset
            .iter()
            .map(|(asset_id, tokens)| OnRamperSupportedAsset {
                asset_id: asset_id.clone(),
                tokens: tokens.clone(),
            })
            .collect()
    }

    /// Number of assets in the table
    pub fn len(&self) -> usize {
        self.by_asset.len()
    }

    /// True if the table has no assets
    pub fn is_empty(&self) -> bool {
        self.by_asset.is_empty()
    }
}

static ONRAMPER_TABLE: Lazy<OnRamperTable> = Lazy::new(OnRamperTable::build);

/// Process-wide OnRamper table
pub fn onramper_table() -> &'static OnRamperTable {
    &ONRAMPER_TABLE
}

/// Forward lookup: asset id → OnRamper token ids
pub fn asset_id_to_onramper_token_list(asset_id: &AssetId) -> Option<&'static [OnRamperTokenId]> {
    onramper_table().token_list(asset_id)
}

/// Reverse lookup: OnRamper token id → asset id
pub fn onramper_token_id_to_asset_id(token_id: &str) -> Option<&'static AssetId> {
    onramper_table().asset_id(token_id)
}

/// All assets OnRamper can buy
pub fn onramper_supported_assets() -> Vec<OnRamperSupportedAsset> {
    onramper_table().supported_assets()
}
