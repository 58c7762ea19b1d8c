//! Chain id → adapter registry

use crate::ChainAdapter;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use walletd_caip::ChainId;

/// Registry of chain adapters keyed by CAIP-2 chain id.
///
/// Built up front and then shared read-only; lookups hand out cloned
/// `Arc`s so callers can hold an adapter across await points.
#[derive(Default, Clone)]
pub struct ChainAdapterManager {
    adapters: HashMap<ChainId, Arc<dyn ChainAdapter>>,
}

impl ChainAdapterManager {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter under its own chain id, replacing any previous one
    pub fn register(&mut self, adapter: Arc<dyn ChainAdapter>) -> &mut Self {
        let chain_id = adapter.chain_id();
        tracing::debug!(chain_id = %chain_id, "registering chain adapter");
        self.adapters.insert(chain_id, adapter);
        self
    }

    /// Builder-style registration
    pub fn with_adapter(mut self, adapter: Arc<dyn ChainAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// Adapter for a chain, if registered
    pub fn get(&self, chain_id: &ChainId) -> Option<Arc<dyn ChainAdapter>> {
        self.adapters.get(chain_id).cloned()
    }

    /// True if an adapter is registered for the chain
    pub fn contains(&self, chain_id: &ChainId) -> bool {
        self.adapters.contains_key(chain_id)
    }

    /// Registered chain ids
    pub fn chain_ids(&self) -> impl Iterator<Item = &ChainId> {
        self.adapters.keys()
    }

    /// Number of registered adapters
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl fmt::Debug for ChainAdapterManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainAdapterManager")
            .field("chains", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Account, Bip44Params, FeeData, FeeDataEstimate, HdWallet, SignTxInput, SignedTx, TxHash,
        WalletResult,
    };
    use async_trait::async_trait;

    struct StubAdapter(ChainId);

    #[async_trait]
    impl ChainAdapter for StubAdapter {
        fn chain_id(&self) -> ChainId {
            self.0.clone()
        }

        fn build_derivation_params(&self, account_number: u32) -> Bip44Params {
            Bip44Params::new(118, account_number)
        }

        async fn get_address(&self, _: &dyn HdWallet, _: &Bip44Params) -> WalletResult<String> {
            Ok("addr".into())
        }

        async fn get_account(&self, address: &str) -> WalletResult<Account> {
            Ok(Account {
                address: address.into(),
                ..Default::default()
            })
        }

        async fn get_fee_data(&self) -> WalletResult<FeeDataEstimate> {
            let tier = FeeData {
                tx_fee: 0,
                gas_limit: 0,
            };
            Ok(FeeDataEstimate {
                fast: tier,
                average: tier,
                slow: tier,
            })
        }

        async fn sign_transaction(
            &self,
            _: SignTxInput,
            _: &dyn HdWallet,
        ) -> WalletResult<SignedTx> {
            Ok(SignedTx("signed".into()))
        }

        async fn broadcast_transaction(&self, _: SignedTx) -> WalletResult<TxHash> {
            Ok(TxHash::new("hash"))
        }
    }

    fn chain(reference: &str) -> ChainId {
        format!("cosmos:{reference}").parse().unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let manager = ChainAdapterManager::new()
            .with_adapter(Arc::new(StubAdapter(chain("cosmoshub-4"))))
            .with_adapter(Arc::new(StubAdapter(chain("osmosis-1"))));

        assert_eq!(manager.len(), 2);
        assert!(manager.contains(&chain("osmosis-1")));
        let adapter = manager.get(&chain("cosmoshub-4")).unwrap();
        assert_eq!(adapter.chain_id(), chain("cosmoshub-4"));
    }

    #[test]
    fn test_missing_adapter() {
        let manager = ChainAdapterManager::new();
        assert!(manager.is_empty());
        assert!(manager.get(&chain("osmosis-1")).is_none());
    }

    #[tokio::test]
    async fn test_adapter_usable_through_registry() {
        let manager =
            ChainAdapterManager::new().with_adapter(Arc::new(StubAdapter(chain("osmosis-1"))));
        let adapter = manager.get(&chain("osmosis-1")).unwrap();
        let account = adapter.get_account("osmo1xyz").await.unwrap();
        assert_eq!(account.address, "osmo1xyz");
    }
}
