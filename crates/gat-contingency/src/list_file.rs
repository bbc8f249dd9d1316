use crate::definition::ContingencyListDefinition;
use crate::store::{ContingencyListMetadata, InMemoryDefinitionStore};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// File holding a batch of list definitions.
///
/// ```yaml
/// lists:
///   - id: 8f0a1c52-7f43-4c61-9a43-1f0f2f6f1a01
///     type: FORM
///     equipmentType: LINE
///     nominalVoltage1: { type: LESS_OR_EQUAL, value1: 225 }
///   - type: IDENTIFIERS
///     identifiers:
///       - name: N-2 north
///         elementIds: [LINE_A, LINE_B]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContingencyListFile {
    #[serde(default)]
    pub lists: Vec<ContingencyListEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyListEntry {
    /// Generated when the store loads the entry if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(flatten)]
    pub definition: ContingencyListDefinition,
}

impl ContingencyListFile {
    /// Create every entry in `store`, stopping at the first rejected definition.
    pub fn populate(
        &self,
        store: &InMemoryDefinitionStore,
    ) -> gat_core::GatResult<Vec<ContingencyListMetadata>> {
        self.lists
            .iter()
            .map(|entry| store.create(entry.id, entry.definition.clone()))
            .collect()
    }
}

pub fn load_lists_from_path(path: &Path) -> Result<ContingencyListFile> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading contingency lists '{}'", path.display()))?;
    let file: ContingencyListFile = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data)
                .with_context(|| format!("parsing contingency lists '{}'", path.display()))?
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data)
                .with_context(|| format!("parsing contingency lists '{}'", path.display()))?
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .with_context(|| format!("parsing contingency lists '{}'", path.display()))?,
    };
    info!(
        path = %path.display(),
        lists = file.lists.len(),
        "loaded contingency list definitions"
    );
    Ok(file)
}

/// Load a list file into a fresh store.
pub fn load_store_from_path(
    path: &Path,
) -> Result<(InMemoryDefinitionStore, Vec<ContingencyListMetadata>)> {
    let file = load_lists_from_path(path)?;
    let store = InMemoryDefinitionStore::new();
    let metadata = file
        .populate(&store)
        .with_context(|| format!("registering contingency lists from '{}'", path.display()))?;
    Ok((store, metadata))
}
