//! Osmosis venue
//!
//! ATOM lives on the Cosmos Hub, the pool lives on Osmosis. Trades cross
//! the two over IBC:
//!
//! - ATOM → OSMO: transfer `uatom` over `channel-141`, wait for the ATOM
//!   voucher to land on Osmosis, swap it.
//! - OSMO → ATOM: swap, wait for the ATOM voucher, transfer it back over
//!   `channel-0`.

pub mod builder;
pub mod constants;
pub mod denom;
pub mod executor;
pub mod rate;
pub mod settlement;
mod swapper;
pub mod transfer;

pub use builder::TradeBuilder;
pub use denom::{denom_for_symbol, symbol_denom_mapping, SymbolDenomMapping};
pub use executor::{Direction, TradeExecutor, TradeState};
pub use rate::{LcdRateOracle, RateInfo, RateOracle};
pub use settlement::{BlockHeightSource, IbcChain, LcdSettlementPoller, SettlementPoller};
pub use swapper::OsmosisSwapper;
pub use transfer::{IbcTransferExecutor, TransferRequest};
