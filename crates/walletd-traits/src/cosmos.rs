//! Cosmos SDK amino transaction types
//!
//! These mirror the legacy amino JSON shape that hardware and software
//! signers accept: a `StdTx` with typed messages, a fee, and a memo.

use serde::{Deserialize, Serialize};

/// Amount of a single denomination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination, e.g. `uosmo` or an `ibc/...` hash
    pub denom: String,
    /// Integer amount in base units, as a decimal string
    pub amount: String,
}

impl Coin {
    /// Creates a coin from a base-unit amount
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.to_string(),
        }
    }

    /// Parses the amount, `None` if the node sent something non-numeric
    pub fn amount_u128(&self) -> Option<u128> {
        self.amount.parse().ok()
    }
}

/// Transaction fee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdFee {
    /// Fee coins
    pub amount: Vec<Coin>,
    /// Gas limit, as a decimal string
    pub gas: String,
}

impl StdFee {
    /// Fee paid in a single denomination
    pub fn single(denom: impl Into<String>, amount: u128, gas: u64) -> Self {
        Self {
            amount: vec![Coin::new(denom, amount)],
            gas: gas.to_string(),
        }
    }
}

/// Amino message with its type tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosmosMsg {
    /// Amino type, e.g. `cosmos-sdk/MsgTransfer`
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Message body
    pub value: serde_json::Value,
}

/// Unsigned amino transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdTx {
    /// Messages, executed in order
    pub msg: Vec<CosmosMsg>,
    /// Fee
    pub fee: StdFee,
    /// Signatures, empty until signed
    #[serde(default)]
    pub signatures: Vec<serde_json::Value>,
    /// Memo
    #[serde(default)]
    pub memo: String,
}

impl StdTx {
    /// Single-message transaction with an empty memo
    pub fn single(msg: CosmosMsg, fee: StdFee) -> Self {
        Self {
            msg: vec![msg],
            fee,
            signatures: Vec::new(),
            memo: String::new(),
        }
    }
}

/// Everything a signer needs besides the key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTxInput {
    /// Transaction to sign
    pub tx: StdTx,
    /// Derivation path of the signing key
    pub address_n_list: Vec<u32>,
    /// Chain reference, e.g. `osmosis-1`
    pub chain_id: String,
    /// Account number of the signer
    pub account_number: String,
    /// Sequence of the signer
    pub sequence: String,
}

/// Signed, broadcast-ready transaction bytes, encoded by the adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx(pub String);

impl SignedTx {
    /// Encoded transaction
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coin_amount() {
        let coin = Coin::new("uosmo", 1_500_000);
        assert_eq!(coin.amount, "1500000");
        assert_eq!(coin.amount_u128(), Some(1_500_000));

        let bad = Coin {
            denom: "uosmo".into(),
            amount: "1.5".into(),
        };
        assert_eq!(bad.amount_u128(), None);
    }

    #[test]
    fn test_msg_type_renamed() {
        let msg = CosmosMsg {
            msg_type: "cosmos-sdk/MsgSend".into(),
            value: json!({ "amount": [] }),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "cosmos-sdk/MsgSend");
    }

    #[test]
    fn test_std_tx_shape() {
        let tx = StdTx::single(
            CosmosMsg {
                msg_type: "cosmos-sdk/MsgSend".into(),
                value: json!({}),
            },
            StdFee::single("uatom", 2500, 250_000),
        );
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["fee"]["gas"], "250000");
        assert_eq!(value["fee"]["amount"][0]["amount"], "2500");
        assert_eq!(value["memo"], "");
        assert_eq!(value["signatures"], json!([]));
    }

    #[test]
    fn test_sign_input_camel_case() {
        let input = SignTxInput {
            tx: StdTx::single(
                CosmosMsg {
                    msg_type: "t".into(),
                    value: json!({}),
                },
                StdFee::single("uosmo", 0, 1),
            ),
            address_n_list: vec![1, 2],
            chain_id: "osmosis-1".into(),
            account_number: "5".into(),
            sequence: "0".into(),
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["addressNList"], json!([1, 2]));
        assert_eq!(value["chainId"], "osmosis-1");
    }
}
