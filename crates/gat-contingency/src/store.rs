//! Definition storage and change notification.
//!
//! The evaluation engine only reads definitions through [`DefinitionStore`].
//! [`InMemoryDefinitionStore`] additionally owns the management operations
//! (create, duplicate, modify, delete, metadata) and notifies a
//! [`ChangeNotifier`] after a list is modified.

use crate::definition::{
    ContingencyListDefinition, ContingencyListType, FormContingencyList,
    IdentifierContingencyList,
};
use chrono::{DateTime, Utc};
use gat_core::{GatError, GatResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Read access to stored list definitions.
pub trait DefinitionStore: Send + Sync {
    fn form_list(&self, id: &Uuid) -> Option<FormContingencyList>;

    fn identifier_list(&self, id: &Uuid) -> Option<IdentifierContingencyList>;

    /// Form lists are searched first, then identifier lists.
    fn definition(&self, id: &Uuid) -> Option<ContingencyListDefinition> {
        self.form_list(id)
            .map(ContingencyListDefinition::Form)
            .or_else(|| {
                self.identifier_list(id)
                    .map(ContingencyListDefinition::Identifiers)
            })
    }
}

impl<T: DefinitionStore + ?Sized> DefinitionStore for &T {
    fn form_list(&self, id: &Uuid) -> Option<FormContingencyList> {
        (**self).form_list(id)
    }

    fn identifier_list(&self, id: &Uuid) -> Option<IdentifierContingencyList> {
        (**self).identifier_list(id)
    }
}

impl<T: DefinitionStore + ?Sized> DefinitionStore for Arc<T> {
    fn form_list(&self, id: &Uuid) -> Option<FormContingencyList> {
        (**self).form_list(id)
    }

    fn identifier_list(&self, id: &Uuid) -> Option<IdentifierContingencyList> {
        (**self).identifier_list(id)
    }
}

/// Receives fire-and-forget notifications after a definition changes.
pub trait ChangeNotifier: Send + Sync {
    fn element_updated(&self, list_id: Uuid, user_id: &str);
}

/// Notifier that only records the change in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl ChangeNotifier for TracingNotifier {
    fn element_updated(&self, list_id: Uuid, user_id: &str) {
        info!(%list_id, user_id, "contingency list updated");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContingencyListMetadata {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub list_type: ContingencyListType,
    pub modification_date: DateTime<Utc>,
}

/// A definition together with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistentContingencyList {
    pub metadata: ContingencyListMetadata,
    pub definition: ContingencyListDefinition,
}

#[derive(Debug, Clone)]
struct Stored<T> {
    definition: T,
    modification_date: DateTime<Utc>,
}

impl<T> Stored<T> {
    fn new(definition: T) -> Self {
        Self {
            definition,
            modification_date: Utc::now(),
        }
    }
}

/// Thread-safe in-memory store keeping form and identifier lists apart.
pub struct InMemoryDefinitionStore {
    form_lists: RwLock<HashMap<Uuid, Stored<FormContingencyList>>>,
    identifier_lists: RwLock<HashMap<Uuid, Stored<IdentifierContingencyList>>>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl Default for InMemoryDefinitionStore {
    fn default() -> Self {
        Self::with_notifier(Arc::new(TracingNotifier))
    }
}

impl InMemoryDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifier(notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self {
            form_lists: RwLock::new(HashMap::new()),
            identifier_lists: RwLock::new(HashMap::new()),
            notifier,
        }
    }

    pub fn len(&self) -> usize {
        self.form_lists.read().len() + self.identifier_lists.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.form_lists.read().contains_key(id) || self.identifier_lists.read().contains_key(id)
    }

    /// Store a definition of either kind. A fresh id is generated when none is given.
    pub fn create(
        &self,
        id: Option<Uuid>,
        definition: ContingencyListDefinition,
    ) -> GatResult<ContingencyListMetadata> {
        match definition {
            ContingencyListDefinition::Form(form) => self.create_form_list(id, form),
            ContingencyListDefinition::Identifiers(list) => self.create_identifier_list(id, list),
        }
    }

    pub fn create_form_list(
        &self,
        id: Option<Uuid>,
        list: FormContingencyList,
    ) -> GatResult<ContingencyListMetadata> {
        list.validate()?;
        let stored = Stored::new(list);
        // lock order everywhere: form lists, then identifier lists
        let mut forms = self.form_lists.write();
        let identifiers = self.identifier_lists.read();
        let id = claim_id(id, |id| forms.contains_key(id) || identifiers.contains_key(id))?;
        let metadata = metadata(id, ContingencyListType::Form, &stored);
        forms.insert(id, stored);
        debug!(%id, "created form contingency list");
        Ok(metadata)
    }

    pub fn create_identifier_list(
        &self,
        id: Option<Uuid>,
        list: IdentifierContingencyList,
    ) -> GatResult<ContingencyListMetadata> {
        let stored = Stored::new(list);
        let forms = self.form_lists.read();
        let mut identifiers = self.identifier_lists.write();
        let id = claim_id(id, |id| forms.contains_key(id) || identifiers.contains_key(id))?;
        let metadata = metadata(id, ContingencyListType::Identifiers, &stored);
        identifiers.insert(id, stored);
        debug!(%id, "created identifier contingency list");
        Ok(metadata)
    }

    /// Copy a list of either kind under a new id.
    pub fn duplicate(&self, source: &Uuid) -> GatResult<Uuid> {
        if self.form_lists.read().contains_key(source) {
            self.duplicate_form_list(source)
        } else {
            self.duplicate_identifier_list(source)
        }
    }

    pub fn duplicate_form_list(&self, source: &Uuid) -> GatResult<Uuid> {
        let list = self
            .form_list(source)
            .ok_or_else(|| GatError::ListNotFound(source.to_string()))?;
        let metadata = self.create_form_list(None, list)?;
        debug!(%source, copy = %metadata.id, "duplicated form contingency list");
        Ok(metadata.id)
    }

    pub fn duplicate_identifier_list(&self, source: &Uuid) -> GatResult<Uuid> {
        let list = self
            .identifier_list(source)
            .ok_or_else(|| GatError::ListNotFound(source.to_string()))?;
        let metadata = self.create_identifier_list(None, list)?;
        debug!(%source, copy = %metadata.id, "duplicated identifier contingency list");
        Ok(metadata.id)
    }

    /// Replace a form list, bump its modification date and notify.
    pub fn modify_form_list(
        &self,
        id: &Uuid,
        list: FormContingencyList,
        user_id: &str,
    ) -> GatResult<()> {
        list.validate()?;
        {
            let mut lists = self.form_lists.write();
            let entry = lists
                .get_mut(id)
                .ok_or_else(|| GatError::ListNotFound(id.to_string()))?;
            *entry = Stored::new(list);
        }
        self.notifier.element_updated(*id, user_id);
        Ok(())
    }

    /// Replace an identifier list, bump its modification date and notify.
    pub fn modify_identifier_list(
        &self,
        id: &Uuid,
        list: IdentifierContingencyList,
        user_id: &str,
    ) -> GatResult<()> {
        {
            let mut lists = self.identifier_lists.write();
            let entry = lists
                .get_mut(id)
                .ok_or_else(|| GatError::ListNotFound(id.to_string()))?;
            *entry = Stored::new(list);
        }
        self.notifier.element_updated(*id, user_id);
        Ok(())
    }

    /// Delete a list, whichever kind it is.
    pub fn delete_list(&self, id: &Uuid) -> GatResult<()> {
        let removed = self.form_lists.write().remove(id).is_some()
            || self.identifier_lists.write().remove(id).is_some();
        if !removed {
            return Err(GatError::ListNotFound(id.to_string()));
        }
        debug!(%id, "deleted contingency list");
        Ok(())
    }

    /// Metadata of every stored list, ordered by id.
    pub fn metadata(&self) -> Vec<ContingencyListMetadata> {
        let mut all: Vec<_> = self
            .form_lists
            .read()
            .iter()
            .map(|(id, stored)| metadata(*id, ContingencyListType::Form, stored))
            .chain(
                self.identifier_lists
                    .read()
                    .iter()
                    .map(|(id, stored)| metadata(*id, ContingencyListType::Identifiers, stored)),
            )
            .collect();
        all.sort_by_key(|m| m.id);
        all
    }

    /// Metadata of the requested lists that exist, in request order.
    pub fn metadata_for(&self, ids: &[Uuid]) -> Vec<ContingencyListMetadata> {
        ids.iter().filter_map(|id| self.list_metadata(id)).collect()
    }

    pub fn list_metadata(&self, id: &Uuid) -> Option<ContingencyListMetadata> {
        if let Some(stored) = self.form_lists.read().get(id) {
            return Some(metadata(*id, ContingencyListType::Form, stored));
        }
        self.identifier_lists
            .read()
            .get(id)
            .map(|stored| metadata(*id, ContingencyListType::Identifiers, stored))
    }

    /// Stored definition and metadata of one list.
    pub fn list(&self, id: &Uuid) -> Option<PersistentContingencyList> {
        Some(PersistentContingencyList {
            metadata: self.list_metadata(id)?,
            definition: self.definition(id)?,
        })
    }

    /// Every form list, ordered by id.
    pub fn form_lists(&self) -> Vec<PersistentContingencyList> {
        let mut lists: Vec<_> = self
            .form_lists
            .read()
            .iter()
            .map(|(id, stored)| PersistentContingencyList {
                metadata: metadata(*id, ContingencyListType::Form, stored),
                definition: ContingencyListDefinition::Form(stored.definition.clone()),
            })
            .collect();
        lists.sort_by_key(|list| list.metadata.id);
        lists
    }
}

impl DefinitionStore for InMemoryDefinitionStore {
    fn form_list(&self, id: &Uuid) -> Option<FormContingencyList> {
        self.form_lists
            .read()
            .get(id)
            .map(|stored| stored.definition.clone())
    }

    fn identifier_list(&self, id: &Uuid) -> Option<IdentifierContingencyList> {
        self.identifier_lists
            .read()
            .get(id)
            .map(|stored| stored.definition.clone())
    }
}

/// Callers hold the locks of both maps while `taken` runs and until the insert.
fn claim_id(id: Option<Uuid>, taken: impl Fn(&Uuid) -> bool) -> GatResult<Uuid> {
    let id = id.unwrap_or_else(Uuid::new_v4);
    if taken(&id) {
        return Err(GatError::Validation(format!(
            "contingency list {id} already exists"
        )));
    }
    Ok(id)
}

fn metadata<T>(
    id: Uuid,
    list_type: ContingencyListType,
    stored: &Stored<T>,
) -> ContingencyListMetadata {
    ContingencyListMetadata {
        id,
        list_type,
        modification_date: stored.modification_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::CountryFilter;
    use crate::definition::{EquipmentType, IdentifierGroup};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<(Uuid, String)>>,
    }

    impl ChangeNotifier for RecordingNotifier {
        fn element_updated(&self, list_id: Uuid, user_id: &str) {
            self.events.lock().push((list_id, user_id.to_string()));
        }
    }

    fn generators() -> FormContingencyList {
        FormContingencyList::injection(EquipmentType::Generator, None, CountryFilter::any())
            .unwrap()
    }

    fn identifiers(ids: &[&str]) -> IdentifierContingencyList {
        IdentifierContingencyList::new(vec![IdentifierGroup::new("c1", ids.iter().copied())])
            .unwrap()
    }

    #[test]
    fn test_create_and_lookup() {
        let store = InMemoryDefinitionStore::new();
        let form = store.create_form_list(None, generators()).unwrap();
        let id_list = store
            .create_identifier_list(None, identifiers(&["L1"]))
            .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(form.list_type, ContingencyListType::Form);
        assert!(store.form_list(&form.id).is_some());
        assert!(store.identifier_list(&form.id).is_none());
        assert_eq!(
            store.definition(&id_list.id).unwrap().list_type(),
            ContingencyListType::Identifiers
        );
        assert!(store.definition(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_create_with_existing_id_fails() {
        let store = InMemoryDefinitionStore::new();
        let id = Uuid::new_v4();
        store.create_form_list(Some(id), generators()).unwrap();
        assert!(store
            .create_identifier_list(Some(id), identifiers(&["L1"]))
            .is_err());
    }

    #[test]
    fn test_concurrent_creates_with_same_id() {
        let store = InMemoryDefinitionStore::new();
        let id = Uuid::new_v4();
        let barrier = std::sync::Barrier::new(8);

        let created = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let (store, barrier) = (&store, &barrier);
                    scope.spawn(move || {
                        barrier.wait();
                        if i % 2 == 0 {
                            store.create_form_list(Some(id), generators()).is_ok()
                        } else {
                            store
                                .create_identifier_list(Some(id), identifiers(&["L1"]))
                                .is_ok()
                        }
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });

        assert_eq!(created, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.metadata().len(), 1);
    }

    #[test]
    fn test_duplicate_keeps_definition() {
        let store = InMemoryDefinitionStore::new();
        let source = store
            .create_identifier_list(None, identifiers(&["L1", "L2"]))
            .unwrap()
            .id;
        let copy = store.duplicate(&source).unwrap();
        assert_ne!(source, copy);
        assert_eq!(store.identifier_list(&source), store.identifier_list(&copy));
        assert!(matches!(
            store.duplicate(&Uuid::new_v4()),
            Err(GatError::ListNotFound(_))
        ));
    }

    #[test]
    fn test_modify_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let store = InMemoryDefinitionStore::with_notifier(notifier.clone());
        let id = store
            .create_identifier_list(None, identifiers(&["L1"]))
            .unwrap()
            .id;

        store
            .modify_identifier_list(&id, identifiers(&["L2"]), "alice")
            .unwrap();
        assert_eq!(
            store.identifier_list(&id).unwrap().groups()[0].element_ids,
            vec!["L2"]
        );
        assert_eq!(notifier.events.lock().as_slice(), &[(id, "alice".to_string())]);

        // modifying a list of the other kind is not found
        assert!(matches!(
            store.modify_form_list(&id, generators(), "alice"),
            Err(GatError::ListNotFound(_))
        ));
        assert_eq!(notifier.events.lock().len(), 1);
    }

    #[test]
    fn test_delete_and_metadata() {
        let store = InMemoryDefinitionStore::new();
        let a = store.create_form_list(None, generators()).unwrap().id;
        let b = store
            .create_identifier_list(None, identifiers(&["L1"]))
            .unwrap()
            .id;

        let mut expected = vec![a, b];
        expected.sort();
        let listed: Vec<_> = store.metadata().into_iter().map(|m| m.id).collect();
        assert_eq!(listed, expected);

        let unknown = Uuid::new_v4();
        let requested: Vec<_> = store
            .metadata_for(&[b, unknown, a])
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(requested, vec![b, a]);

        store.delete_list(&a).unwrap();
        assert!(matches!(store.delete_list(&a), Err(GatError::ListNotFound(_))));
        assert!(store.form_lists().is_empty());
        assert!(store.list(&b).is_some());
    }

    #[test]
    fn test_metadata_json_shape() {
        let store = InMemoryDefinitionStore::new();
        let metadata = store.create_form_list(None, generators()).unwrap();
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["type"], "FORM");
        assert!(json.get("modificationDate").is_some());
    }
}
