//! LCD rate oracle against a mock Osmosis node

use serde_json::json;
use walletd_provider::{HttpClient, HttpClientConfig, ProviderConfig};
use walletd_swapper::osmosis::constants::{IBC_ATOM_DENOM, IBC_USDC_DENOM};
use walletd_swapper::osmosis::{LcdRateOracle, RateOracle};
use walletd_swapper::SwapErrorKind;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn oracle(server: &MockServer) -> LcdRateOracle {
    let client = HttpClient::with_config(
        ProviderConfig::new(server.uri()).with_retry_delay(1),
        HttpClientConfig::default(),
        None,
    )
    .unwrap();
    LcdRateOracle::new(client, 1, 678)
}

fn pool(assets: &[(&str, &str)]) -> serde_json::Value {
    let assets: Vec<_> = assets
        .iter()
        .map(|(denom, amount)| json!({ "token": { "denom": denom, "amount": amount }, "weight": "536870912000000" }))
        .collect();
    json!({
        "pool": {
            "@type": "/osmosis.gamm.v1beta1.Pool",
            "id": "1",
            "pool_params": { "swap_fee": "0.002000000000000000", "exit_fee": "0" },
            "pool_assets": assets,
        }
    })
}

async fn atom_osmo_pool(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/osmosis/gamm/v1beta1/pools/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pool(&[
            (IBC_ATOM_DENOM, "1000000000000"),
            ("uosmo", "10000000000000"),
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_rate_from_pool_reserves() {
    let server = MockServer::start().await;
    atom_osmo_pool(&server).await;

    let info = oracle(&server).get_rate("ATOM", "OSMO", "1000000").await.unwrap();

    let k = 1e12 * 1e13;
    let expected_buy = 1e13 - k / (1e12 + 1e6);
    assert!((info.rate - expected_buy / 1e6).abs() < 1e-9);
    assert_eq!(info.buy_amount, expected_buy.floor() as u128);
    assert_eq!(info.trade_fee, 0.002);
    assert!(info.price_impact > 0.0);
}

#[tokio::test]
async fn test_rate_is_idempotent() {
    let server = MockServer::start().await;
    atom_osmo_pool(&server).await;
    let oracle = oracle(&server);

    let first = oracle.get_rate("OSMO", "ATOM", "5000000").await.unwrap();
    let second = oracle.get_rate("OSMO", "ATOM", "5000000").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_zero_amount_is_quoted_with_one_unit() {
    let server = MockServer::start().await;
    atom_osmo_pool(&server).await;
    let oracle = oracle(&server);

    let zero = oracle.get_rate("ATOM", "OSMO", "0").await.unwrap();
    let one = oracle.get_rate("ATOM", "OSMO", "1").await.unwrap();
    assert_eq!(zero, one);
    assert!((zero.rate - 10.0).abs() < 1e-2, "marginal rate is the spot price");
}

#[tokio::test]
async fn test_usdc_pairs_use_usd_pool() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/osmosis/gamm/v1beta1/pools/678"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pool(&[
            ("uosmo", "4000000000000"),
            (IBC_USDC_DENOM, "2000000000000"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let info = oracle(&server).get_rate("OSMO", "USDC", "1").await.unwrap();
    assert!((info.rate - 0.5).abs() < 1e-2);
}

#[tokio::test]
async fn test_unknown_symbol_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = oracle(&server).get_rate("BTC", "OSMO", "1").await.unwrap_err();
    assert_eq!(err.kind(), SwapErrorKind::UnsupportedPair);
}

#[tokio::test]
async fn test_pool_without_denom() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/osmosis/gamm/v1beta1/pools/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pool(&[("uosmo", "100")])))
        .mount(&server)
        .await;

    let err = oracle(&server).get_rate("ATOM", "OSMO", "1").await.unwrap_err();
    assert_eq!(err.kind(), SwapErrorKind::RateUnavailable);
}

#[tokio::test]
async fn test_node_error_is_rate_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("pool not found"))
        .mount(&server)
        .await;

    let err = oracle(&server).get_rate("ATOM", "OSMO", "1").await.unwrap_err();
    assert_eq!(err.kind(), SwapErrorKind::RateUnavailable);
    assert!(err.message().contains("pool 1"));
}
