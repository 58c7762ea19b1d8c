//! BIP-44 derivation parameters

use serde::{Deserialize, Serialize};
use std::fmt;

const HARDENED: u32 = 0x8000_0000;

/// BIP-44 path `m / purpose' / coin_type' / account' / change / index`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bip44Params {
    /// Purpose, always 44
    pub purpose: u32,
    /// SLIP-44 coin type (118 for Cosmos SDK chains)
    pub coin_type: u32,
    /// Account index
    pub account_number: u32,
    /// Change branch
    pub is_change: bool,
    /// Address index
    pub address_index: u32,
}

impl Bip44Params {
    /// Parameters for the first receive address of an account
    pub fn new(coin_type: u32, account_number: u32) -> Self {
        Self {
            purpose: 44,
            coin_type,
            account_number,
            is_change: false,
            address_index: 0,
        }
    }

    /// Path as address_n list, hardened where BIP-44 requires it
    pub fn address_n_list(&self) -> Vec<u32> {
        vec![
            self.purpose | HARDENED,
            self.coin_type | HARDENED,
            self.account_number | HARDENED,
            u32::from(self.is_change),
            self.address_index,
        ]
    }
}

impl fmt::Display for Bip44Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m/{}'/{}'/{}'/{}/{}",
            self.purpose,
            self.coin_type,
            self.account_number,
            u32::from(self.is_change),
            self.address_index
        )
    }
}
