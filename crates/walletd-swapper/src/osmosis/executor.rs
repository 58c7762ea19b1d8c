//! Trade execution across the Cosmos Hub and Osmosis.
//!
//! A trade is an explicit sequence of [`TradeState`]s advanced by
//! [`TradeExecutor::step`]. Selling ATOM bridges it to Osmosis, waits for it
//! to land and swaps it. Selling OSMO swaps first, waits for the proceeds
//! and bridges them back, without waiting for that last transfer.
//!
//! Nothing is rolled back on failure: the error names the state it failed
//! in and any transfer already broadcast stays on chain.

use super::constants::{ATOM_DENOM, MIN_TOKEN_OUT, MSG_SWAP_EXACT_IN_TYPE, OSMO_DENOM};
use super::denom::denom_for_symbol;
use super::settlement::{IbcChain, SettlementPoller};
use super::transfer::{IbcTransferExecutor, TransferRequest};
use crate::amount::round_base_units;
use crate::api::{Trade, TradeResult};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use walletd_caip::constants::{cosmos_chain_id, osmosis_chain_id};
use walletd_caip::Asset;
use walletd_error::{Phase, Result, SwapError};
use walletd_traits::{
    Account, ChainAdapter, ChainAdapterManager, CosmosMsg, HdWallet, SignTxInput, SignedTx,
    StdFee, StdTx, TxHash,
};

/// Which way the trade crosses the venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Sell asset lives on the Cosmos Hub; bridge in, then swap
    Inbound,
    /// Sell asset lives on Osmosis; swap, then bridge out
    Outbound,
}

impl Direction {
    /// `None` when both assets sit on the same chain or either chain is
    /// outside the corridor
    pub fn between(sell: &Asset, buy: &Asset) -> Option<Self> {
        let cosmos = cosmos_chain_id();
        let osmosis = osmosis_chain_id();

        if sell.chain_id == cosmos && buy.chain_id == osmosis {
            Some(Self::Inbound)
        } else if sell.chain_id == osmosis && buy.chain_id == cosmos {
            Some(Self::Outbound)
        } else {
            None
        }
    }
}

/// IBC channels of the corridor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channels {
    /// On the Cosmos Hub, towards Osmosis
    pub cosmos_to_osmo: String,
    /// On Osmosis, towards the Cosmos Hub
    pub osmo_to_cosmos: String,
}

/// Adapters for both chains, resolved once per trade
#[derive(Clone)]
pub struct Adapters {
    cosmos: Arc<dyn ChainAdapter>,
    osmosis: Arc<dyn ChainAdapter>,
}

impl fmt::Debug for Adapters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapters")
            .field("cosmos", &self.cosmos.chain_id())
            .field("osmosis", &self.osmosis.chain_id())
            .finish()
    }
}

/// Everything fixed once the direction is known
#[derive(Clone)]
pub struct Plan {
    direction: Direction,
    sell_denom: &'static str,
    buy_denom: &'static str,
    sell_amount: u128,
    sell_address: String,
    gas_limit: u64,
    adapters: Adapters,
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plan")
            .field("direction", &self.direction)
            .field("sell_denom", &self.sell_denom)
            .field("buy_denom", &self.buy_denom)
            .field("sell_amount", &self.sell_amount)
            .field("sell_address", &self.sell_address)
            .field("gas_limit", &self.gas_limit)
            .finish_non_exhaustive()
    }
}

impl Plan {
    /// Trade direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Osmosis address that signs the swap
    fn swap_signer<'a>(&'a self, trade: &'a Trade) -> &'a str {
        match self.direction {
            Direction::Inbound => &trade.receive_address,
            Direction::Outbound => &self.sell_address,
        }
    }
}

/// Position in the execution pipeline
#[derive(Debug)]
pub enum TradeState {
    /// Nothing resolved yet
    Init,
    /// Adapters resolved
    DeterminingDirection {
        /// Both chain adapters
        adapters: Adapters,
        /// Sell amount in base units
        sell_amount: u128,
    },
    /// About to bridge the sell asset onto Osmosis
    InboundBridge {
        /// Trade plan
        plan: Plan,
    },
    /// Inbound transfer broadcast
    AwaitingBridgeSettlement {
        /// Trade plan
        plan: Plan,
        /// Inbound transfer id
        transfer_id: TxHash,
    },
    /// Funds on Osmosis, swap to be built
    BuildingSwapTx {
        /// Trade plan
        plan: Plan,
        /// Amount swapped, base units of the sell denomination on Osmosis
        amount: u128,
    },
    /// Swap built
    Signing {
        /// Trade plan
        plan: Plan,
        /// Unsigned swap
        input: SignTxInput,
    },
    /// Swap signed
    Broadcasting {
        /// Trade plan
        plan: Plan,
        /// Signed swap
        signed: SignedTx,
    },
    /// Swap broadcast, outbound trades only
    AwaitingSwapSettlement {
        /// Trade plan
        plan: Plan,
        /// Swap id
        swap_id: TxHash,
    },
    /// Swap proceeds on Osmosis, to be bridged out
    OutboundBridge {
        /// Trade plan
        plan: Plan,
        /// Swap id
        swap_id: TxHash,
        /// Proceeds, base units of the buy denomination on Osmosis
        amount: u128,
    },
    /// Finished
    Done(TradeResult),
}

impl TradeState {
    /// Phase reported by errors raised while leaving this state
    pub fn phase(&self) -> Option<Phase> {
        Some(match self {
            Self::Init => Phase::Init,
            Self::DeterminingDirection { .. } => Phase::DeterminingDirection,
            Self::InboundBridge { .. } => Phase::InboundBridge,
            Self::AwaitingBridgeSettlement { .. } => Phase::AwaitingBridgeSettlement,
            Self::BuildingSwapTx { .. } => Phase::BuildingSwapTx,
            Self::Signing { .. } => Phase::Signing,
            Self::Broadcasting { .. } => Phase::Broadcasting,
            Self::AwaitingSwapSettlement { .. } => Phase::AwaitingSwapSettlement,
            Self::OutboundBridge { .. } => Phase::OutboundBridge,
            Self::Done(_) => return None,
        })
    }

    /// Name for logs
    pub fn name(&self) -> &'static str {
        self.phase().map_or("done", |phase| phase.as_str())
    }
}

/// Per-trade inputs shared by every step
#[derive(Debug, Clone, Copy)]
pub struct Execution<'a> {
    /// Trade being executed
    pub trade: &'a Trade,
    /// Signing handle
    pub wallet: &'a dyn HdWallet,
    /// Checked before each broadcast
    pub cancel: &'a CancellationToken,
}

fn ensure_not_cancelled(cancel: &CancellationToken, phase: Phase) -> Result<()> {
    if cancel.is_cancelled() {
        tracing::info!(phase = %phase, "trade cancelled before broadcast");
        return Err(SwapError::cancelled(phase));
    }
    Ok(())
}

/// Amino `MsgSwapExactAmountIn` over a single pool
pub fn msg_swap_exact_in(
    sender: &str,
    pool_id: u64,
    token_in_denom: &str,
    token_in_amount: u128,
    token_out_denom: &str,
) -> CosmosMsg {
    CosmosMsg {
        msg_type: MSG_SWAP_EXACT_IN_TYPE.to_string(),
        value: json!({
            "sender": sender,
            "routes": [{
                "poolId": pool_id.to_string(),
                "tokenOutDenom": token_out_denom,
            }],
            "tokenIn": {
                "denom": token_in_denom,
                "amount": token_in_amount.to_string(),
            },
            "tokenOutMinAmount": MIN_TOKEN_OUT,
        }),
    }
}

/// Runs trades through the state machine
#[derive(Clone)]
pub struct TradeExecutor {
    adapters: Arc<ChainAdapterManager>,
    poller: Arc<dyn SettlementPoller>,
    transfers: IbcTransferExecutor,
    channels: Channels,
    pool_id: u64,
}

impl fmt::Debug for TradeExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradeExecutor")
            .field("channels", &self.channels)
            .field("pool_id", &self.pool_id)
            .finish_non_exhaustive()
    }
}

impl TradeExecutor {
    /// Executor swapping in `pool_id` and bridging over `channels`
    pub fn new(
        adapters: Arc<ChainAdapterManager>,
        poller: Arc<dyn SettlementPoller>,
        transfers: IbcTransferExecutor,
        channels: Channels,
        pool_id: u64,
    ) -> Self {
        Self {
            adapters,
            poller,
            transfers,
            channels,
            pool_id,
        }
    }

    /// Drives `trade` from [`TradeState::Init`] to [`TradeState::Done`]
    pub async fn execute(
        &self,
        trade: &Trade,
        wallet: &dyn HdWallet,
        cancel: &CancellationToken,
    ) -> Result<TradeResult> {
        let ctx = Execution {
            trade,
            wallet,
            cancel,
        };
        let mut state = TradeState::Init;

        loop {
            let Some(phase) = state.phase() else {
                break;
            };
            let from = state.name();
            state = self.step(state, ctx).await.map_err(|e| {
                tracing::warn!(
                    sell = %trade.sell_asset.symbol,
                    buy = %trade.buy_asset.symbol,
                    phase = %phase,
                    error = %e,
                    "trade failed"
                );
                e.in_phase(phase)
            })?;
            tracing::info!(
                sell = %trade.sell_asset.symbol,
                buy = %trade.buy_asset.symbol,
                from,
                to = state.name(),
                "trade state"
            );
        }

        match state {
            TradeState::Done(result) => Ok(result),
            other => Err(SwapError::sign_and_broadcast(
                Phase::Init,
                format!("execution stopped in {}", other.name()),
            )),
        }
    }

    /// Advances one state.
    ///
    /// Errors carry a provisional phase; [`TradeExecutor::execute`] stamps
    /// the phase of the state that failed.
    pub async fn step(&self, state: TradeState, ctx: Execution<'_>) -> Result<TradeState> {
        match state {
            TradeState::Init => self.init(ctx),
            TradeState::DeterminingDirection {
                adapters,
                sell_amount,
            } => self.determine_direction(ctx, adapters, sell_amount).await,
            TradeState::InboundBridge { plan } => self.inbound_bridge(ctx, plan).await,
            TradeState::AwaitingBridgeSettlement { plan, transfer_id } => {
                self.await_bridge(ctx, plan, transfer_id).await
            }
            TradeState::BuildingSwapTx { plan, amount } => {
                self.build_swap(ctx, plan, amount).await
            }
            TradeState::Signing { plan, input } => {
                let signed = plan
                    .adapters
                    .osmosis
                    .sign_transaction(input, ctx.wallet)
                    .await
                    .map_err(|e| SwapError::sign_and_broadcast(Phase::Signing, e.to_string()))?;
                Ok(TradeState::Broadcasting { plan, signed })
            }
            TradeState::Broadcasting { plan, signed } => self.broadcast_swap(ctx, plan, signed).await,
            TradeState::AwaitingSwapSettlement { plan, swap_id } => {
                self.await_swap(ctx, plan, swap_id).await
            }
            TradeState::OutboundBridge {
                plan,
                swap_id,
                amount,
            } => self.outbound_bridge(ctx, plan, swap_id, amount).await,
            done @ TradeState::Done(_) => Ok(done),
        }
    }

    fn init(&self, ctx: Execution<'_>) -> Result<TradeState> {
        let phase = Phase::Init;
        let cosmos_id = cosmos_chain_id();
        let osmosis_id = osmosis_chain_id();

        let cosmos = self
            .adapters
            .get(&cosmos_id)
            .ok_or_else(|| SwapError::adapter_unavailable(phase, &cosmos_id))?;
        let osmosis = self
            .adapters
            .get(&osmosis_id)
            .ok_or_else(|| SwapError::adapter_unavailable(phase, &osmosis_id))?;

        if ctx.trade.receive_address.is_empty() {
            return Err(SwapError::account_resolution(
                phase,
                "receive address is required",
            ));
        }

        let sell_amount = round_base_units(&ctx.trade.sell_amount)
            .filter(|amount| *amount > 0)
            .ok_or_else(|| {
                SwapError::invalid_amount(
                    phase,
                    format!("cannot execute sell amount '{}'", ctx.trade.sell_amount),
                )
            })?;

        Ok(TradeState::DeterminingDirection {
            adapters: Adapters { cosmos, osmosis },
            sell_amount,
        })
    }

    async fn determine_direction(
        &self,
        ctx: Execution<'_>,
        adapters: Adapters,
        sell_amount: u128,
    ) -> Result<TradeState> {
        let phase = Phase::DeterminingDirection;
        let trade = ctx.trade;
        let unsupported = || {
            SwapError::unsupported_pair(phase, &trade.sell_asset.symbol, &trade.buy_asset.symbol)
        };

        let sell_denom = denom_for_symbol(&trade.sell_asset.symbol).ok_or_else(unsupported)?;
        let buy_denom = denom_for_symbol(&trade.buy_asset.symbol).ok_or_else(unsupported)?;
        let direction =
            Direction::between(&trade.sell_asset, &trade.buy_asset).ok_or_else(unsupported)?;

        let gas_limit = adapters
            .osmosis
            .get_fee_data()
            .await
            .map_err(|e| SwapError::rate_unavailable(phase, format!("fee estimate: {}", e)))?
            .average
            .gas_limit;

        let sell_adapter = match direction {
            Direction::Inbound => &adapters.cosmos,
            Direction::Outbound => &adapters.osmosis,
        };
        let params = sell_adapter.build_derivation_params(trade.sell_asset_account_number);
        let sell_address = sell_adapter
            .get_address(ctx.wallet, &params)
            .await
            .map_err(|e| SwapError::account_resolution(phase, e.to_string()))?;
        if sell_address.is_empty() {
            return Err(SwapError::account_resolution(
                phase,
                format!("no {} address for account {}", trade.sell_asset.symbol, params),
            ));
        }

        tracing::debug!(?direction, sell_denom, buy_denom, %sell_address, "trade planned");

        let plan = Plan {
            direction,
            sell_denom,
            buy_denom,
            sell_amount,
            sell_address,
            gas_limit,
            adapters,
        };
        Ok(match direction {
            Direction::Inbound => TradeState::InboundBridge { plan },
            Direction::Outbound => TradeState::BuildingSwapTx { plan, amount: sell_amount },
        })
    }

    async fn inbound_bridge(&self, ctx: Execution<'_>, plan: Plan) -> Result<TradeState> {
        let phase = Phase::InboundBridge;
        let cosmos = plan.adapters.cosmos.as_ref();

        let req = TransferRequest {
            sender: plan.sell_address.clone(),
            receiver: ctx.trade.receive_address.clone(),
            amount: plan.sell_amount,
            denom: ATOM_DENOM.to_string(),
            channel: self.channels.cosmos_to_osmo.clone(),
            fee: 0,
            fee_denom: ATOM_DENOM.to_string(),
            gas_limit: plan.gas_limit,
            source: IbcChain::CosmosHub,
            destination: IbcChain::Osmosis,
            derivation: cosmos.build_derivation_params(ctx.trade.sell_asset_account_number),
        };

        ensure_not_cancelled(ctx.cancel, phase)?;
        let transfer_id = self.transfers.transfer(&req, cosmos, ctx.wallet).await?;
        if transfer_id.is_empty() {
            return Err(SwapError::transfer_submission(
                phase,
                "inbound transfer broadcast returned no id",
            ));
        }

        Ok(TradeState::AwaitingBridgeSettlement { plan, transfer_id })
    }

    async fn await_bridge(
        &self,
        ctx: Execution<'_>,
        plan: Plan,
        transfer_id: TxHash,
    ) -> Result<TradeState> {
        self.poller
            .poll_for_completion(IbcChain::CosmosHub, transfer_id.as_str(), ctx.cancel)
            .await?;
        let amount = self
            .poller
            .poll_for_destination_balance(
                IbcChain::Osmosis,
                &ctx.trade.receive_address,
                plan.sell_denom,
                ctx.cancel,
            )
            .await?;

        Ok(TradeState::BuildingSwapTx { plan, amount })
    }

    async fn build_swap(&self, ctx: Execution<'_>, plan: Plan, amount: u128) -> Result<TradeState> {
        let phase = Phase::BuildingSwapTx;
        let osmosis = plan.adapters.osmosis.as_ref();
        let signer = plan.swap_signer(ctx.trade);
        let account = read_account(osmosis, signer, phase).await?;
        // Key path follows the signer's on-chain account number.
        let key_index = u32::try_from(account.account_number_or_default()).map_err(|_| {
            SwapError::account_resolution(
                phase,
                format!("account number of {} exceeds a key index", signer),
            )
        })?;

        let msg = msg_swap_exact_in(signer, self.pool_id, plan.sell_denom, amount, plan.buy_denom);
        let fee = StdFee::single(OSMO_DENOM, ctx.trade.fee_data.fee, plan.gas_limit);
        let input = SignTxInput {
            tx: StdTx::single(msg, fee),
            address_n_list: osmosis.build_derivation_params(key_index).address_n_list(),
            chain_id: osmosis_chain_id().reference().to_string(),
            account_number: account.account_number_or_default().to_string(),
            sequence: account.sequence_or_default().to_string(),
        };

        Ok(TradeState::Signing { plan, input })
    }

    async fn broadcast_swap(
        &self,
        ctx: Execution<'_>,
        plan: Plan,
        signed: SignedTx,
    ) -> Result<TradeState> {
        let phase = Phase::Broadcasting;
        ensure_not_cancelled(ctx.cancel, phase)?;

        let swap_id = plan
            .adapters
            .osmosis
            .broadcast_transaction(signed)
            .await
            .map_err(|e| SwapError::sign_and_broadcast(phase, e.to_string()))?;

        if swap_id.is_empty() {
            tracing::warn!("swap broadcast returned no id");
            return Ok(TradeState::Done(TradeResult::error_sentinel()));
        }
        tracing::info!(swap_id = %swap_id, "swap broadcast");

        Ok(match plan.direction {
            Direction::Inbound => TradeState::Done(TradeResult::from_broadcast(&swap_id)),
            Direction::Outbound => TradeState::AwaitingSwapSettlement { plan, swap_id },
        })
    }

    async fn await_swap(
        &self,
        ctx: Execution<'_>,
        plan: Plan,
        swap_id: TxHash,
    ) -> Result<TradeState> {
        self.poller
            .poll_for_completion(IbcChain::Osmosis, swap_id.as_str(), ctx.cancel)
            .await?;
        let amount = self
            .poller
            .poll_for_destination_balance(
                IbcChain::Osmosis,
                &plan.sell_address,
                plan.buy_denom,
                ctx.cancel,
            )
            .await?;

        Ok(TradeState::OutboundBridge {
            plan,
            swap_id,
            amount,
        })
    }

    async fn outbound_bridge(
        &self,
        ctx: Execution<'_>,
        plan: Plan,
        swap_id: TxHash,
        amount: u128,
    ) -> Result<TradeState> {
        let phase = Phase::OutboundBridge;
        let osmosis = plan.adapters.osmosis.as_ref();

        let req = TransferRequest {
            sender: plan.sell_address.clone(),
            receiver: ctx.trade.receive_address.clone(),
            amount,
            denom: plan.buy_denom.to_string(),
            channel: self.channels.osmo_to_cosmos.clone(),
            fee: ctx.trade.fee_data.fee,
            fee_denom: OSMO_DENOM.to_string(),
            gas_limit: plan.gas_limit,
            source: IbcChain::Osmosis,
            destination: IbcChain::CosmosHub,
            derivation: osmosis.build_derivation_params(ctx.trade.sell_asset_account_number),
        };

        ensure_not_cancelled(ctx.cancel, phase)?;
        // Settlement of the transfer back to the Hub is not awaited.
        let transfer_id = self.transfers.transfer(&req, osmosis, ctx.wallet).await?;
        tracing::info!(
            swap_id = %swap_id,
            transfer_id = %transfer_id,
            "outbound transfer submitted, not awaiting settlement"
        );

        Ok(TradeState::Done(TradeResult::from_broadcast(&swap_id)))
    }
}

async fn read_account(adapter: &dyn ChainAdapter, address: &str, phase: Phase) -> Result<Account> {
    adapter
        .get_account(address)
        .await
        .map_err(|e| SwapError::account_resolution(phase, format!("{}: {}", address, e)))
}
