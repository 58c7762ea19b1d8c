//! Osmosis venue constants

/// Venue name reported by the swapper and used as the liquidity source
pub const SWAPPER_NAME: &str = "Osmosis";

/// IBC channel on the Cosmos Hub leading to Osmosis
pub const COSMO_OSMO_CHANNEL: &str = "channel-141";
/// IBC channel on Osmosis leading to the Cosmos Hub
pub const OSMO_COSMO_CHANNEL: &str = "channel-0";
/// IBC port for fungible token transfers
pub const IBC_TRANSFER_PORT: &str = "transfer";
/// Blocks past the destination's latest height before a transfer times out
pub const TIMEOUT_HEIGHT_DELTA: u64 = 100;

/// ATOM/OSMO pool
pub const DEFAULT_POOL_ID: u64 = 1;
/// OSMO/USDC pool
pub const DEFAULT_USD_POOL_ID: u64 = 678;

/// Upper bound on a single sell, base units
pub const MAX_SWAPPER_SELL: &str = "100000000000000000000000000";
/// Stand-in amount for rate discovery when the caller passes zero
pub const QUOTE_UNIT_AMOUNT: &str = "1";
/// Minimum accepted swap output; slippage is not enforced beyond this
pub const MIN_TOKEN_OUT: &str = "1";

/// Native OSMO
pub const OSMO_DENOM: &str = "uosmo";
/// Native ATOM on the Cosmos Hub
pub const ATOM_DENOM: &str = "uatom";
/// ATOM on Osmosis, as received over `channel-0`
pub const IBC_ATOM_DENOM: &str =
    "ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2";
/// USDC on Osmosis
pub const IBC_USDC_DENOM: &str =
    "ibc/D189335C6E4A68B513C10AB227BF1C1D38C746766278BA3EEB4FB14124F1D858";

/// Amino type of an IBC transfer
pub const MSG_TRANSFER_TYPE: &str = "cosmos-sdk/MsgTransfer";
/// Amino type of a single-route exact-in swap
pub const MSG_SWAP_EXACT_IN_TYPE: &str = "osmosis/gamm/swap-exact-amount-in";
