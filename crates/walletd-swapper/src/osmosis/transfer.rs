//! IBC fungible token transfers between the Cosmos Hub and Osmosis

use super::constants::{IBC_TRANSFER_PORT, MSG_TRANSFER_TYPE, TIMEOUT_HEIGHT_DELTA};
use super::settlement::{BlockHeightSource, IbcChain};
use serde_json::json;
use std::sync::Arc;
use walletd_error::{Phase, Result, SwapError};
use walletd_traits::{
    Bip44Params, ChainAdapter, CosmosMsg, HdWallet, SignTxInput, StdFee, StdTx, TxHash,
};

/// One hop of an IBC transfer. Built fresh for every hop; account state is
/// read by [`IbcTransferExecutor::transfer`] at signing time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Sending address on `source`
    pub sender: String,
    /// Receiving address on `destination`
    pub receiver: String,
    /// Amount in base units of `denom`
    pub amount: u128,
    /// Denomination as it exists on `source`
    pub denom: String,
    /// Source channel
    pub channel: String,
    /// Fee in base units of `fee_denom`
    pub fee: u128,
    /// Fee denomination
    pub fee_denom: String,
    /// Gas limit
    pub gas_limit: u64,
    /// Chain the tokens leave
    pub source: IbcChain,
    /// Chain the tokens arrive on
    pub destination: IbcChain,
    /// Signing key path
    pub derivation: Bip44Params,
}

/// IBC height after which a packet is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutHeight {
    /// Destination revision
    pub revision_number: u64,
    /// Destination block height
    pub revision_height: u64,
}

impl TimeoutHeight {
    /// [`TIMEOUT_HEIGHT_DELTA`] blocks past `latest_height` on `destination`
    pub fn after(destination: IbcChain, latest_height: u64) -> Self {
        Self {
            revision_number: destination.revision_number(),
            revision_height: latest_height.saturating_add(TIMEOUT_HEIGHT_DELTA),
        }
    }
}

/// Amino `MsgTransfer` for `req`
pub fn msg_transfer(req: &TransferRequest, timeout: TimeoutHeight) -> CosmosMsg {
    CosmosMsg {
        msg_type: MSG_TRANSFER_TYPE.to_string(),
        value: json!({
            "source_port": IBC_TRANSFER_PORT,
            "source_channel": req.channel,
            "token": {
                "denom": req.denom,
                "amount": req.amount.to_string(),
            },
            "sender": req.sender,
            "receiver": req.receiver,
            "timeout_height": {
                "revision_number": timeout.revision_number.to_string(),
                "revision_height": timeout.revision_height.to_string(),
            },
        }),
    }
}

/// Signs and broadcasts IBC transfers. Never waits for settlement.
#[derive(Clone)]
pub struct IbcTransferExecutor {
    heights: Arc<dyn BlockHeightSource>,
}

impl std::fmt::Debug for IbcTransferExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IbcTransferExecutor").finish_non_exhaustive()
    }
}

impl IbcTransferExecutor {
    /// Executor reading timeout heights from `heights`
    pub fn new(heights: Arc<dyn BlockHeightSource>) -> Self {
        Self { heights }
    }

    /// Submits `req` through `adapter`, which must serve `req.source`.
    ///
    /// The sender's account number and sequence are read after the timeout
    /// height, immediately before signing. Returns the broadcast id as
    /// reported by the node; it may be empty.
    pub async fn transfer(
        &self,
        req: &TransferRequest,
        adapter: &dyn ChainAdapter,
        wallet: &dyn HdWallet,
    ) -> Result<TxHash> {
        let latest = self
            .heights
            .latest_height(req.destination)
            .await
            .map_err(|e| e.in_phase(Phase::InboundBridge))?;
        let timeout = TimeoutHeight::after(req.destination, latest);

        let account = adapter.get_account(&req.sender).await.map_err(|e| {
            SwapError::account_resolution(Phase::InboundBridge, format!("{}: {}", req.sender, e))
        })?;

        let tx = StdTx::single(
            msg_transfer(req, timeout),
            StdFee::single(req.fee_denom.clone(), req.fee, req.gas_limit),
        );
        let input = SignTxInput {
            tx,
            address_n_list: req.derivation.address_n_list(),
            chain_id: req.source.chain_id().reference().to_string(),
            account_number: account.account_number_or_default().to_string(),
            sequence: account.sequence_or_default().to_string(),
        };

        let signed = adapter.sign_transaction(input, wallet).await.map_err(|e| {
            SwapError::transfer_submission(
                Phase::InboundBridge,
                format!("signing {} transfer: {}", req.source, e),
            )
        })?;
        let hash = adapter.broadcast_transaction(signed).await.map_err(|e| {
            SwapError::transfer_submission(
                Phase::InboundBridge,
                format!("broadcasting {} transfer: {}", req.source, e),
            )
        })?;

        tracing::info!(
            source = %req.source,
            destination = %req.destination,
            channel = %req.channel,
            denom = %req.denom,
            amount = %req.amount,
            tx_id = %hash,
            "ibc transfer broadcast"
        );
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use walletd_testing::{AdapterCall, MockChainAdapter, MockWallet};

    /// Notes how many adapter calls had happened when the height was read
    struct ObservingHeights {
        adapter: Arc<MockChainAdapter>,
        calls_seen: Mutex<Option<usize>>,
    }

    #[async_trait]
    impl BlockHeightSource for ObservingHeights {
        async fn latest_height(&self, _chain: IbcChain) -> Result<u64> {
            *self.calls_seen.lock().unwrap() = Some(self.adapter.calls().len());
            Ok(500)
        }
    }

    fn request() -> TransferRequest {
        TransferRequest {
            sender: "cosmos1sender".into(),
            receiver: "osmo1receiver".into(),
            amount: 1_500_000,
            denom: "uatom".into(),
            channel: "channel-141".into(),
            fee: 0,
            fee_denom: "uatom".into(),
            gas_limit: 250_000,
            source: IbcChain::CosmosHub,
            destination: IbcChain::Osmosis,
            derivation: Bip44Params::new(118, 0),
        }
    }

    #[test]
    fn test_timeout_height() {
        let timeout = TimeoutHeight::after(IbcChain::Osmosis, 1_000);
        assert_eq!(timeout.revision_number, 1);
        assert_eq!(timeout.revision_height, 1_100);

        let timeout = TimeoutHeight::after(IbcChain::CosmosHub, u64::MAX);
        assert_eq!(timeout.revision_number, 4);
        assert_eq!(timeout.revision_height, u64::MAX);
    }

    #[test]
    fn test_msg_transfer_shape() {
        let msg = msg_transfer(&request(), TimeoutHeight::after(IbcChain::Osmosis, 50));
        assert_eq!(msg.msg_type, "cosmos-sdk/MsgTransfer");
        assert_eq!(msg.value["source_port"], "transfer");
        assert_eq!(msg.value["source_channel"], "channel-141");
        assert_eq!(msg.value["token"]["denom"], "uatom");
        assert_eq!(msg.value["token"]["amount"], "1500000");
        assert_eq!(msg.value["receiver"], "osmo1receiver");
        assert_eq!(msg.value["timeout_height"]["revision_number"], "1");
        assert_eq!(msg.value["timeout_height"]["revision_height"], "150");
    }

    #[tokio::test]
    async fn test_account_is_read_right_before_signing() {
        let adapter = Arc::new(MockChainAdapter::cosmos().with_account(21, 3));
        let heights = Arc::new(ObservingHeights {
            adapter: adapter.clone(),
            calls_seen: Mutex::new(None),
        });
        let executor = IbcTransferExecutor::new(heights.clone());

        executor
            .transfer(&request(), adapter.as_ref(), &MockWallet::default())
            .await
            .unwrap();

        assert_eq!(*heights.calls_seen.lock().unwrap(), Some(0), "height read first");
        let calls = adapter.calls();
        assert!(
            matches!(&calls[0], AdapterCall::GetAccount(address) if address == "cosmos1sender"),
            "sender account read after the height, got {:?}",
            calls[0]
        );
        match &calls[1] {
            AdapterCall::Sign(input) => {
                assert_eq!(input.account_number, "21");
                assert_eq!(input.sequence, "3");
                assert_eq!(input.tx.msg[0].value["timeout_height"]["revision_height"], "600");
            }
            other => panic!("expected signing right after the account read, got {:?}", other),
        }
        assert!(matches!(calls[2], AdapterCall::Broadcast(_)));
    }
}
