//! Network snapshot lookup by id.

use gat_core::{GatError, GatResult, Network};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Source of network snapshots by id.
pub trait NetworkProvider: Send + Sync {
    /// Fails with [`GatError::NetworkNotFound`] when the id is unknown.
    fn network(&self, id: &str) -> GatResult<Arc<Network>>;
}

impl<T: NetworkProvider + ?Sized> NetworkProvider for Arc<T> {
    fn network(&self, id: &str) -> GatResult<Arc<Network>> {
        (**self).network(id)
    }
}

/// Provider over snapshots already held in memory.
#[derive(Default)]
pub struct InMemoryNetworkProvider {
    networks: RwLock<HashMap<String, Arc<Network>>>,
}

impl InMemoryNetworkProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a snapshot under its own id, replacing any previous one.
    pub fn insert(&self, network: Network) -> Arc<Network> {
        let network = Arc::new(network);
        self.networks
            .write()
            .insert(network.id.clone(), Arc::clone(&network));
        network
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Network>> {
        self.networks.write().remove(id)
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.networks.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl NetworkProvider for InMemoryNetworkProvider {
    fn network(&self, id: &str) -> GatResult<Arc<Network>> {
        self.networks
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| GatError::NetworkNotFound(id.to_string()))
    }
}
