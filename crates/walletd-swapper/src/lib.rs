//! # WalletD Swapper
//!
//! Quote and execute swaps through third-party liquidity venues.
//!
//! The [`Swapper`] trait is the venue-neutral surface a wallet talks to.
//! [`osmosis::OsmosisSwapper`] implements it for the ATOM/OSMO corridor:
//! selling ATOM bridges it to Osmosis over IBC, waits for it to land, and
//! swaps it on the AMM; selling OSMO swaps first and bridges the proceeds
//! back to the Cosmos Hub.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use walletd_swapper::prelude::*;
//!
//! let config = OsmosisSwapperConfig::from_env()?;
//! let swapper = OsmosisSwapper::new(config, Arc::new(adapters))?;
//!
//! let quote = swapper
//!     .get_trade_quote(&GetTradeQuoteInput::new(atom, osmo, "1000000"))
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod api;
pub mod config;
pub mod osmosis;

pub use api::{
    ApprovalNeededOutput, BuildTradeInput, ExecuteTradeInput, GetTradeQuoteInput, MinMaxOutput,
    SwapSource, Swapper, SwapperType, Trade, TradeFeeData, TradeQuote, TradeResult, TradeTxs,
};
pub use config::OsmosisSwapperConfig;
pub use osmosis::OsmosisSwapper;
pub use walletd_error::{Phase, Result, SwapError, SwapErrorKind};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::api::*;
    pub use crate::config::OsmosisSwapperConfig;
    pub use crate::osmosis::OsmosisSwapper;
    pub use walletd_caip::{Asset, AssetId, ChainId};
    pub use walletd_error::{Phase, Result, SwapError, SwapErrorKind};
}
