//! Evaluation entry points that take a network id instead of a snapshot.

use crate::engine::{ContingencyEvaluator, ContingencyListExport, DetailedEvaluation};
use crate::provider::NetworkProvider;
use crate::store::DefinitionStore;
use gat_core::{GatResult, Network};
use std::sync::Arc;
use uuid::Uuid;

/// Evaluation keyed by network id: fetches the snapshot, then delegates to
/// [`ContingencyEvaluator`].
///
/// An unknown network id fails the whole call with no partial result.
pub struct ContingencyListService<S, P> {
    evaluator: ContingencyEvaluator<S>,
    provider: P,
}

impl<S: DefinitionStore, P: NetworkProvider> ContingencyListService<S, P> {
    pub fn new(store: S, provider: P) -> Self {
        Self {
            evaluator: ContingencyEvaluator::new(store),
            provider,
        }
    }

    pub fn evaluator(&self) -> &ContingencyEvaluator<S> {
        &self.evaluator
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn export_contingency_lists(
        &self,
        list_ids: &[Uuid],
        network_id: Option<&str>,
        variant: Option<&str>,
    ) -> GatResult<ContingencyListExport> {
        let network = self.fetch(network_id)?;
        self.evaluator
            .evaluate_many(list_ids, network.as_deref(), variant)
    }

    pub fn contingency_count(
        &self,
        list_ids: &[Uuid],
        network_id: Option<&str>,
        variant: Option<&str>,
    ) -> GatResult<usize> {
        let network = self.fetch(network_id)?;
        self.evaluator
            .count_many(list_ids, network.as_deref(), variant)
    }

    pub fn evaluation_results(
        &self,
        list_ids: &[Uuid],
        network_id: Option<&str>,
        variant: Option<&str>,
    ) -> GatResult<DetailedEvaluation> {
        let network = self.fetch(network_id)?;
        self.evaluator
            .evaluate_detailed(list_ids, network.as_deref(), variant)
    }

    fn fetch(&self, network_id: Option<&str>) -> GatResult<Option<Arc<Network>>> {
        network_id.map(|id| self.provider.network(id)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{IdentifierContingencyList, IdentifierGroup};
    use crate::provider::InMemoryNetworkProvider;
    use crate::store::InMemoryDefinitionStore;
    use crate::test_utils::create_test_network;
    use gat_core::GatError;

    #[test]
    fn test_missing_network_is_fatal() {
        let store = InMemoryDefinitionStore::new();
        let id = store
            .create_identifier_list(
                None,
                IdentifierContingencyList::new(vec![IdentifierGroup::new("c1", ["GEN_FR"])])
                    .unwrap(),
            )
            .unwrap()
            .id;
        let provider = InMemoryNetworkProvider::new();
        provider.insert(create_test_network().unwrap());
        let service = ContingencyListService::new(store, provider);

        assert!(matches!(
            service.export_contingency_lists(&[id], Some("nowhere"), None),
            Err(GatError::NetworkNotFound(_))
        ));
        assert_eq!(
            service
                .contingency_count(&[id], Some("test-grid"), None)
                .unwrap(),
            1
        );
        // inspection without a network keeps the raw group
        let raw = service.evaluation_results(&[id], None, None).unwrap();
        assert_eq!(raw.results.len(), 1);
        assert!(raw.results[0].not_found_elements.is_none());
    }
}
