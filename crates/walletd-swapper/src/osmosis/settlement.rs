//! Settlement polling against Cosmos SDK LCD endpoints

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use tokio_util::sync::CancellationToken;
use walletd_caip::constants::{cosmos_chain_id, osmosis_chain_id};
use walletd_caip::ChainId;
use walletd_error::{Phase, Result, SwapError};
use walletd_provider::HttpClient;
use walletd_resilience::{poll_until, PollConfig, PollError};
use walletd_traits::Coin;

/// The two chains of the corridor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IbcChain {
    /// Cosmos Hub
    CosmosHub,
    /// Osmosis
    Osmosis,
}

impl IbcChain {
    /// CAIP-2 id
    pub fn chain_id(&self) -> ChainId {
        match self {
            Self::CosmosHub => cosmos_chain_id(),
            Self::Osmosis => osmosis_chain_id(),
        }
    }

    /// IBC revision number, the numeric suffix of the chain reference
    pub fn revision_number(&self) -> u64 {
        revision_number(self.chain_id().reference())
    }
}

impl fmt::Display for IbcChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CosmosHub => write!(f, "cosmoshub"),
            Self::Osmosis => write!(f, "osmosis"),
        }
    }
}

/// `osmosis-1` → 1; references without a numeric suffix are revision 0
pub fn revision_number(reference: &str) -> u64 {
    reference
        .rsplit_once('-')
        .and_then(|(_, n)| n.parse().ok())
        .unwrap_or(0)
}

/// Waits for on-chain effects of submitted transactions
#[async_trait]
pub trait SettlementPoller: Send + Sync {
    /// Resolves once `tx_id` is included with code 0.
    ///
    /// A non-zero code is `SettlementFailed`; running out of time is
    /// `SettlementTimeout`.
    async fn poll_for_completion(
        &self,
        chain: IbcChain,
        tx_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Resolves with the balance of `denom` at `address` once it is non-zero
    async fn poll_for_destination_balance(
        &self,
        chain: IbcChain,
        address: &str,
        denom: &str,
        cancel: &CancellationToken,
    ) -> Result<u128>;
}

/// Latest block height of a chain, for IBC timeouts
#[async_trait]
pub trait BlockHeightSource: Send + Sync {
    /// Current height of `chain`
    async fn latest_height(&self, chain: IbcChain) -> Result<u64>;
}

#[derive(Debug, Deserialize)]
struct TxLookup {
    tx_response: TxResponse,
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    height: String,
    #[serde(default)]
    code: u32,
    #[serde(default)]
    raw_log: String,
}

impl TxResponse {
    fn is_included(&self) -> bool {
        !self.height.is_empty() && self.height != "0"
    }
}

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    #[serde(default)]
    balances: Vec<Coin>,
}

#[derive(Debug, Deserialize)]
struct LatestBlock {
    block: Block,
}

#[derive(Debug, Deserialize)]
struct Block {
    header: Header,
}

#[derive(Debug, Deserialize)]
struct Header {
    height: String,
}

/// [`SettlementPoller`] and [`BlockHeightSource`] over the two LCDs
#[derive(Debug, Clone)]
pub struct LcdSettlementPoller {
    cosmos: HttpClient,
    osmosis: HttpClient,
    poll: PollConfig,
}

impl LcdSettlementPoller {
    /// Poller over the Cosmos Hub and Osmosis clients
    pub fn new(cosmos: HttpClient, osmosis: HttpClient, poll: PollConfig) -> Self {
        Self {
            cosmos,
            osmosis,
            poll,
        }
    }

    fn client(&self, chain: IbcChain) -> &HttpClient {
        match chain {
            IbcChain::CosmosHub => &self.cosmos,
            IbcChain::Osmosis => &self.osmosis,
        }
    }
}

fn settlement_error(err: PollError<SwapError>, what: String) -> SwapError {
    match err {
        PollError::Aborted(e) => e,
        PollError::Cancelled => SwapError::cancelled(Phase::AwaitingBridgeSettlement),
        PollError::TimedOut { attempts, elapsed } => SwapError::settlement_timeout(
            Phase::AwaitingBridgeSettlement,
            format!("{} after {} checks over {:?}", what, attempts, elapsed),
        ),
    }
}

#[async_trait]
impl SettlementPoller for LcdSettlementPoller {
    async fn poll_for_completion(
        &self,
        chain: IbcChain,
        tx_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let client = self.client(chain);
        let path = format!("cosmos/tx/v1beta1/txs/{}", tx_id);
        let path = path.as_str();

        poll_until(&self.poll, cancel, move || async move {
            match client.get_json_opt::<TxLookup>(path).await {
                Ok(Some(TxLookup { tx_response })) if tx_response.is_included() => {
                    if tx_response.code == 0 {
                        Ok(Some(()))
                    } else {
                        Err(SwapError::settlement_failed(
                            Phase::AwaitingBridgeSettlement,
                            format!(
                                "{} tx {} failed with code {}: {}",
                                chain, tx_id, tx_response.code, tx_response.raw_log
                            ),
                        ))
                    }
                }
                Ok(_) => {
                    tracing::trace!(%chain, tx_id, "tx not yet included");
                    Ok(None)
                }
                Err(e) => {
                    tracing::debug!(%chain, tx_id, error = %e, "tx lookup failed, will retry");
                    Ok(None)
                }
            }
        })
        .await
        .map_err(|e| settlement_error(e, format!("{} tx {} not confirmed", chain, tx_id)))?;

        tracing::debug!(%chain, tx_id, "tx confirmed");
        Ok(())
    }

    async fn poll_for_destination_balance(
        &self,
        chain: IbcChain,
        address: &str,
        denom: &str,
        cancel: &CancellationToken,
    ) -> Result<u128> {
        let client = self.client(chain);
        let path = format!("cosmos/bank/v1beta1/balances/{}", address);
        let path = path.as_str();

        let amount = poll_until(&self.poll, cancel, move || async move {
            match client.get_json::<BalancesResponse>(path).await {
                Ok(response) => Ok(response
                    .balances
                    .iter()
                    .find(|coin| coin.denom == denom)
                    .and_then(Coin::amount_u128)
                    .filter(|amount| *amount > 0)),
                Err(e) => {
                    tracing::debug!(%chain, address, error = %e, "balance lookup failed, will retry");
                    Ok(None)
                }
            }
        })
        .await
        .map_err(|e| {
            settlement_error(
                e,
                format!("no {} balance at {} on {}", denom, address, chain),
            )
        })?;

        tracing::debug!(%chain, address, denom, amount = %amount, "balance observed");
        Ok(amount)
    }
}

#[async_trait]
impl BlockHeightSource for LcdSettlementPoller {
    async fn latest_height(&self, chain: IbcChain) -> Result<u64> {
        let latest: LatestBlock = self
            .client(chain)
            .get_json("cosmos/base/tendermint/v1beta1/blocks/latest")
            .await
            .map_err(|e| {
                SwapError::transfer_submission(
                    Phase::InboundBridge,
                    format!("latest {} block: {}", chain, e),
                )
            })?;

        latest.block.header.height.parse().map_err(|_| {
            SwapError::transfer_submission(
                Phase::InboundBridge,
                format!(
                    "latest {} block height '{}' is not a number",
                    chain, latest.block.header.height
                ),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use walletd_error::SwapErrorKind;
    use walletd_provider::{HttpClientConfig, ProviderConfig};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_poll() -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(10),
            timeout: Duration::from_millis(200),
        }
    }

    fn client(server: &MockServer) -> HttpClient {
        HttpClient::with_config(
            ProviderConfig::new(server.uri()).with_retry_delay(1),
            HttpClientConfig::default(),
            None,
        )
        .unwrap()
    }

    fn poller(server: &MockServer) -> LcdSettlementPoller {
        LcdSettlementPoller::new(client(server), client(server), fast_poll())
    }

    #[test]
    fn test_revision_numbers() {
        assert_eq!(IbcChain::Osmosis.revision_number(), 1);
        assert_eq!(IbcChain::CosmosHub.revision_number(), 4);
        assert_eq!(revision_number("localnet"), 0);
    }

    #[tokio::test]
    async fn test_completion_after_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cosmos/tx/v1beta1/txs/ABC"))
            .respond_with(ResponseTemplate::new(404))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cosmos/tx/v1beta1/txs/ABC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tx_response": { "height": "120", "txhash": "ABC", "code": 0 }
            })))
            .mount(&server)
            .await;

        poller(&server)
            .poll_for_completion(IbcChain::CosmosHub, "ABC", &CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_completion_nonzero_code_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cosmos/tx/v1beta1/txs/BAD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tx_response": { "height": "5", "code": 11, "raw_log": "out of gas" }
            })))
            .mount(&server)
            .await;

        let err = poller(&server)
            .poll_for_completion(IbcChain::Osmosis, "BAD", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), SwapErrorKind::SettlementFailed);
        assert!(err.message().contains("out of gas"));
    }

    #[tokio::test]
    async fn test_completion_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = poller(&server)
            .poll_for_completion(IbcChain::CosmosHub, "NEVER", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), SwapErrorKind::SettlementTimeout);
    }

    #[tokio::test]
    async fn test_balance_waits_for_denom() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cosmos/bank/v1beta1/balances/osmo1dest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "balances": [{ "denom": "uosmo", "amount": "10" }]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cosmos/bank/v1beta1/balances/osmo1dest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "balances": [
                    { "denom": "uosmo", "amount": "10" },
                    { "denom": "ibc/ATOM", "amount": "990000" }
                ]
            })))
            .mount(&server)
            .await;

        let amount = poller(&server)
            .poll_for_destination_balance(
                IbcChain::Osmosis,
                "osmo1dest",
                "ibc/ATOM",
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(amount, 990_000);
    }

    #[tokio::test]
    async fn test_balance_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "balances": [] })))
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = poller(&server)
            .poll_for_destination_balance(IbcChain::Osmosis, "osmo1dest", "uosmo", &cancel)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), SwapErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_latest_height() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cosmos/base/tendermint/v1beta1/blocks/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "block": { "header": { "chain_id": "osmosis-1", "height": "8123456" } }
            })))
            .mount(&server)
            .await;

        let height = poller(&server).latest_height(IbcChain::Osmosis).await.unwrap();
        assert_eq!(height, 8_123_456);
    }
}
