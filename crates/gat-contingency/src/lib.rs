//! # gat-contingency: contingency list evaluation
//!
//! A contingency list describes which equipment of a network should be
//! considered jointly unavailable for a reliability study. Lists come in two
//! kinds:
//!
//! - **Form** lists ([`FormContingencyList`]): one equipment type plus
//!   country and nominal voltage filters. Every matching element becomes a
//!   single-element contingency.
//! - **Identifier** lists ([`IdentifierContingencyList`]): named groups of
//!   element ids. Each group becomes one contingency made of the ids found in
//!   the network.
//!
//! [`ContingencyEvaluator`] resolves batches of stored lists against a
//! [`gat_core::Network`] and reports unknown lists, missing elements and
//! already disconnected elements alongside the contingencies.
//!
//! ```rust
//! use gat_contingency::*;
//! use gat_contingency::test_utils::create_test_network;
//!
//! let store = InMemoryDefinitionStore::new();
//! let list = IdentifierContingencyList::new(vec![
//!     IdentifierGroup::new("N-2", ["LINE_FR_BE_400", "LINE_FR_IT_400"]),
//! ])
//! .unwrap();
//! let id = store.create_identifier_list(None, list).unwrap().id;
//!
//! let network = create_test_network().unwrap();
//! let evaluator = ContingencyEvaluator::new(&store);
//! let export = evaluator.evaluate_many(&[id], Some(&network), None).unwrap();
//! assert_eq!(export.contingencies.len(), 1);
//! assert_eq!(export.contingencies[0].len(), 2);
//! ```

pub mod contingency;
pub mod criteria;
pub mod definition;
pub mod engine;
pub mod list_file;
pub mod numerical;
pub mod provider;
pub mod service;
pub mod store;
pub mod test_utils;

pub use contingency::{Contingency, ContingencyElement, ContingencyEvaluationResult};
pub use criteria::{
    injection_criteria_match, injection_matches, two_sided_matches, two_terminal_criteria_match,
    voltage_matches, CountryFilter, TerminalProfile,
};
pub use definition::{
    ContingencyListDefinition, ContingencyListType, EquipmentType, FormContingencyList,
    IdentifierContingencyList, IdentifierGroup,
};
pub use engine::{ContingencyEvaluator, ContingencyListExport, DetailedEvaluation};
pub use list_file::{
    load_lists_from_path, load_store_from_path, ContingencyListEntry, ContingencyListFile,
};
pub use numerical::{NumericalFilter, NumericalFilterOperator, VoltageInterval};
pub use provider::{InMemoryNetworkProvider, NetworkProvider};
pub use service::ContingencyListService;
pub use store::{
    ChangeNotifier, ContingencyListMetadata, DefinitionStore, InMemoryDefinitionStore,
    PersistentContingencyList, TracingNotifier,
};
