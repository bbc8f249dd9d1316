//! Directory-backed network provider.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use gat_contingency::NetworkProvider;
use gat_core::{GatError, GatResult, Network};
use parking_lot::RwLock;
use tracing::warn;

use crate::importers::{import_network, Format};

/// Serves `<root>/<id>.json`, `<root>/<id>.yaml` or `<root>/<id>.yml`.
///
/// Snapshots are imported on first request and shared afterwards.
pub struct DirectoryNetworkProvider {
    root: PathBuf,
    cache: RwLock<HashMap<String, Arc<Network>>>,
}

impl DirectoryNetworkProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Document path for `id`, if one exists. Ids that could escape the root are refused.
    pub fn locate(&self, id: &str) -> Option<PathBuf> {
        let mut components = Path::new(id).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_normal {
            return None;
        }
        Format::ALL
            .iter()
            .flat_map(|format| format.extensions())
            .map(|ext| self.root.join(format!("{id}.{ext}")))
            .find(|path| path.is_file())
    }

    /// Ids of every snapshot document in the root directory, sorted.
    pub fn ids(&self) -> GatResult<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() && Format::detect(&path).is_some() {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

impl NetworkProvider for DirectoryNetworkProvider {
    fn network(&self, id: &str) -> GatResult<Arc<Network>> {
        if let Some(network) = self.cache.read().get(id) {
            return Ok(Arc::clone(network));
        }

        let path = self
            .locate(id)
            .ok_or_else(|| GatError::NetworkNotFound(id.to_string()))?;
        let result =
            import_network(&path).map_err(|err| GatError::Parse(format!("{err:#}")))?;
        if result.network.id != id {
            return Err(GatError::Parse(format!(
                "'{}' declares network '{}', expected '{id}'",
                path.display(),
                result.network.id
            )));
        }
        if result.diagnostics.has_errors() {
            warn!(network = id, "{}", result.diagnostics.summary());
        }

        let network = Arc::new(result.network);
        self.cache
            .write()
            .insert(id.to_string(), Arc::clone(&network));
        Ok(network)
    }
}
