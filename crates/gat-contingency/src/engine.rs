//! Batch evaluation of contingency lists against one network snapshot.
//!
//! The evaluator is stateless: every call takes the requested list ids, an
//! optional network and an optional variant, and returns a fresh result.
//! Unknown list ids never abort a batch; they are reported in
//! `not_found_list_ids`. An unknown variant does abort it.
//!
//! Lists are resolved in parallel with rayon. Results are gathered in request
//! order, so the output is the same for every run on the same inputs.

use crate::contingency::{Contingency, ContingencyEvaluationResult};
use crate::store::DefinitionStore;
use gat_core::{GatResult, Network, NetworkView};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Aggregate contingencies of a batch, diagnostics dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContingencyListExport {
    pub contingencies: Vec<Contingency>,
    pub not_found_list_ids: Vec<Uuid>,
}

/// Per-group (or per-element) results of a batch, diagnostics included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedEvaluation {
    pub results: Vec<ContingencyEvaluationResult>,
    pub not_found_list_ids: Vec<Uuid>,
}

enum ListOutcome {
    Resolved(Vec<ContingencyEvaluationResult>),
    NotFound(Uuid),
}

pub struct ContingencyEvaluator<S> {
    store: S,
}

impl<S: DefinitionStore> ContingencyEvaluator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Contingencies of every resolvable list, in list-then-group order.
    pub fn evaluate_many(
        &self,
        list_ids: &[Uuid],
        network: Option<&Network>,
        variant: Option<&str>,
    ) -> GatResult<ContingencyListExport> {
        let (results, not_found_list_ids) = self.evaluate(list_ids, network, variant)?;
        let contingencies: Vec<Contingency> = results
            .into_iter()
            .filter_map(|result| result.contingency)
            .collect();
        info!(
            lists = list_ids.len(),
            contingencies = contingencies.len(),
            not_found = not_found_list_ids.len(),
            "exported contingency lists"
        );
        Ok(ContingencyListExport {
            contingencies,
            not_found_list_ids,
        })
    }

    /// Number of contingencies the lists resolve to. Unknown lists count zero.
    pub fn count_many(
        &self,
        list_ids: &[Uuid],
        network: Option<&Network>,
        variant: Option<&str>,
    ) -> GatResult<usize> {
        let (results, _) = self.evaluate(list_ids, network, variant)?;
        Ok(results
            .iter()
            .filter(|result| result.contingency.is_some())
            .count())
    }

    /// One result per group or matched element across all lists, with diagnostics.
    pub fn evaluate_detailed(
        &self,
        list_ids: &[Uuid],
        network: Option<&Network>,
        variant: Option<&str>,
    ) -> GatResult<DetailedEvaluation> {
        let (results, not_found_list_ids) = self.evaluate(list_ids, network, variant)?;
        Ok(DetailedEvaluation {
            results,
            not_found_list_ids,
        })
    }

    fn evaluate(
        &self,
        list_ids: &[Uuid],
        network: Option<&Network>,
        variant: Option<&str>,
    ) -> GatResult<(Vec<ContingencyEvaluationResult>, Vec<Uuid>)> {
        let view = match network {
            Some(network) => Some(network.view(variant)?),
            None => {
                if let Some(variant) = variant {
                    debug!(variant, "no network supplied, ignoring variant");
                }
                None
            }
        };
        if let Some(view) = &view {
            debug!(
                network = %view.network().id,
                variant = view.variant_id(),
                lists = list_ids.len(),
                "evaluating contingency lists"
            );
        }

        let outcomes: Vec<ListOutcome> = list_ids
            .par_iter()
            .map(|id| self.resolve_list(id, view.as_ref()))
            .collect();

        let mut results = Vec::new();
        let mut not_found = Vec::new();
        let mut seen = HashSet::new();
        for outcome in outcomes {
            match outcome {
                ListOutcome::Resolved(list_results) => results.extend(list_results),
                ListOutcome::NotFound(id) => {
                    if seen.insert(id) {
                        not_found.push(id);
                    }
                }
            }
        }
        Ok((results, not_found))
    }

    fn resolve_list(&self, id: &Uuid, view: Option<&NetworkView<'_>>) -> ListOutcome {
        match self.store.definition(id) {
            Some(definition) => {
                let results = definition.resolve(view);
                debug!(
                    list_id = %id,
                    list_type = %definition.list_type(),
                    results = results.len(),
                    "resolved contingency list"
                );
                ListOutcome::Resolved(results)
            }
            None => {
                warn!(list_id = %id, "contingency list not found");
                ListOutcome::NotFound(*id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::CountryFilter;
    use crate::definition::{
        EquipmentType, FormContingencyList, IdentifierContingencyList, IdentifierGroup,
    };
    use crate::store::InMemoryDefinitionStore;
    use crate::test_utils::create_test_network;
    use gat_core::GatError;

    fn store_with_lists() -> (InMemoryDefinitionStore, Uuid, Uuid) {
        let store = InMemoryDefinitionStore::new();
        let generators = store
            .create_form_list(
                None,
                FormContingencyList::injection(
                    EquipmentType::Generator,
                    None,
                    CountryFilter::any(),
                )
                .unwrap(),
            )
            .unwrap()
            .id;
        let groups = store
            .create_identifier_list(
                None,
                IdentifierContingencyList::new(vec![
                    IdentifierGroup::new("c1", ["LINE_FR_BE_400"]),
                    IdentifierGroup::new("c2", ["GHOST"]),
                ])
                .unwrap(),
            )
            .unwrap()
            .id;
        (store, generators, groups)
    }

    #[test]
    fn test_request_order_is_kept() {
        let (store, generators, groups) = store_with_lists();
        let network = create_test_network().unwrap();
        let evaluator = ContingencyEvaluator::new(&store);

        let export = evaluator
            .evaluate_many(&[groups, generators], Some(&network), None)
            .unwrap();
        let ids: Vec<_> = export.contingencies.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "GEN_BE", "GEN_FR", "GEN_IT"]);
        assert!(export.not_found_list_ids.is_empty());
    }

    #[test]
    fn test_unknown_ids_are_deduplicated() {
        let (store, generators, _) = store_with_lists();
        let evaluator = ContingencyEvaluator::new(&store);
        let unknown = Uuid::new_v4();

        let detailed = evaluator
            .evaluate_detailed(&[unknown, generators, unknown], None, None)
            .unwrap();
        assert_eq!(detailed.not_found_list_ids, vec![unknown]);
        assert!(detailed.results.is_empty());
    }

    #[test]
    fn test_unknown_variant_is_fatal() {
        let (store, generators, _) = store_with_lists();
        let network = create_test_network().unwrap();
        let evaluator = ContingencyEvaluator::new(&store);
        assert!(matches!(
            evaluator.count_many(&[generators], Some(&network), Some("missing")),
            Err(GatError::VariantNotFound(_))
        ));
        // without a network the variant is irrelevant
        assert_eq!(
            evaluator
                .count_many(&[generators], None, Some("missing"))
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_detailed_keeps_not_found_groups() {
        let (store, _, groups) = store_with_lists();
        let network = create_test_network().unwrap();
        let evaluator = ContingencyEvaluator::new(&store);

        let detailed = evaluator
            .evaluate_detailed(&[groups], Some(&network), None)
            .unwrap();
        assert_eq!(detailed.results.len(), 2);
        assert!(detailed.results[1].contingency.is_none());
        assert_eq!(
            evaluator.count_many(&[groups], Some(&network), None).unwrap(),
            1
        );
    }
}
