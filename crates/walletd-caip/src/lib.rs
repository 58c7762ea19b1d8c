//! # WalletD CAIP
//!
//! Chain and asset identifiers following CAIP-2 and CAIP-19, the well-known
//! identifiers WalletD swappers route on, and static lookup tables mapping
//! asset identifiers to third-party provider token ids.
//!
//! ## Example
//!
//! ```
//! use walletd_caip::{AssetId, constants::OSMOSIS_ASSET_ID};
//!
//! let osmo: AssetId = OSMOSIS_ASSET_ID.parse().unwrap();
//! assert_eq!(osmo.chain_id().reference(), "osmosis-1");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapters;
pub mod asset;
pub mod asset_id;
pub mod constants;

pub use asset::Asset;
pub use asset_id::{AssetId, CaipError, ChainId};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::onramper::{
        asset_id_to_onramper_token_list, onramper_supported_assets, onramper_token_id_to_asset_id,
    };
    pub use crate::constants::*;
    pub use crate::{Asset, AssetId, CaipError, ChainId};
}
