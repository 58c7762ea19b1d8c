//! CAIP-2 chain ids and CAIP-19 asset ids

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaipError {
    /// Chain id is not `namespace:reference`
    #[error("Invalid chain id '{0}'")]
    InvalidChainId(String),

    /// Asset id is not `chainId/assetNamespace:assetReference`
    #[error("Invalid asset id '{value}': {reason}")]
    InvalidAssetId {
        /// The rejected input
        value: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type for identifier parsing
pub type Result<T> = std::result::Result<T, CaipError>;

fn valid_segment(s: &str, max: usize) -> bool {
    !s.is_empty()
        && s.len() <= max
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// CAIP-2 chain id, e.g. `cosmos:osmosis-1` or `eip155:1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId {
    namespace: String,
    reference: String,
}

impl ChainId {
    /// Builds a chain id from its parts
    pub fn new(namespace: impl Into<String>, reference: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let reference = reference.into();
        if !valid_segment(&namespace, 8) || !valid_segment(&reference, 32) {
            return Err(CaipError::InvalidChainId(format!("{namespace}:{reference}")));
        }
        Ok(Self {
            namespace,
            reference,
        })
    }

    pub(crate) fn from_static(namespace: &str, reference: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            reference: reference.to_string(),
        }
    }

    /// Chain namespace (`cosmos`, `eip155`, `bip122`)
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Chain reference (`osmosis-1`, `1`)
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

impl FromStr for ChainId {
    type Err = CaipError;

    fn from_str(s: &str) -> Result<Self> {
        let (namespace, reference) = s
            .split_once(':')
            .ok_or_else(|| CaipError::InvalidChainId(s.to_string()))?;
        Self::new(namespace, reference).map_err(|_| CaipError::InvalidChainId(s.to_string()))
    }
}

impl TryFrom<String> for ChainId {
    type Error = CaipError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ChainId> for String {
    fn from(id: ChainId) -> Self {
        id.to_string()
    }
}

/// CAIP-19 asset id, e.g. `cosmos:cosmoshub-4/slip44:118`.
///
/// Asset namespaces and references are normalised to lower case so that
/// checksummed and plain ERC-20 addresses compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId {
    chain_id: ChainId,
    asset_namespace: String,
    asset_reference: String,
}

impl AssetId {
    /// Builds an asset id from its parts
    pub fn new(
        chain_id: ChainId,
        asset_namespace: impl Into<String>,
        asset_reference: impl Into<String>,
    ) -> Result<Self> {
        let asset_namespace = asset_namespace.into().to_ascii_lowercase();
        let asset_reference = asset_reference.into().to_ascii_lowercase();
        if !valid_segment(&asset_namespace, 8) {
            return Err(CaipError::InvalidAssetId {
                value: format!("{chain_id}/{asset_namespace}:{asset_reference}"),
                reason: "bad asset namespace".to_string(),
            });
        }
        if !valid_segment(&asset_reference, 128) {
            return Err(CaipError::InvalidAssetId {
                value: format!("{chain_id}/{asset_namespace}:{asset_reference}"),
                reason: "bad asset reference".to_string(),
            });
        }
        Ok(Self {
            chain_id,
            asset_namespace,
            asset_reference,
        })
    }

    pub(crate) fn from_static(chain_id: ChainId, asset_namespace: &str, asset_reference: &str) -> Self {
        Self {
            chain_id,
            asset_namespace: asset_namespace.to_string(),
            asset_reference: asset_reference.to_string(),
        }
    }

    /// Chain the asset lives on
    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    /// Asset namespace (`slip44`, `erc20`)
    pub fn asset_namespace(&self) -> &str {
        &self.asset_namespace
    }

    /// Asset reference (coin type or contract address)
    pub fn asset_reference(&self) -> &str {
        &self.asset_reference
    }

    /// True when the asset is the chain's fee asset
    pub fn is_native(&self) -> bool {
        self.asset_namespace == "slip44"
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}:{}",
            self.chain_id, self.asset_namespace, self.asset_reference
        )
    }
}

impl FromStr for AssetId {
    type Err = CaipError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| CaipError::InvalidAssetId {
            value: s.to_string(),
            reason: reason.to_string(),
        };
        let (chain, asset) = s.split_once('/').ok_or_else(|| invalid("missing '/'"))?;
        let chain_id: ChainId = chain.parse().map_err(|_| invalid("bad chain id"))?;
        let (namespace, reference) = asset
            .split_once(':')
            .ok_or_else(|| invalid("missing asset namespace"))?;
        Self::new(chain_id, namespace, reference)
    }
}

impl TryFrom<String> for AssetId {
    type Error = CaipError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.to_string()
    }
}
