//! Network snapshot importers.

pub mod document;
pub mod format;

use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use gat_core::{Diagnostics, Network};
use tracing::{debug, warn};

pub use document::NetworkDocument;
pub use format::Format;

/// Imported network together with what went wrong on the way.
#[derive(Debug)]
pub struct ImportResult {
    pub network: Network,
    pub diagnostics: Diagnostics,
}

/// Import a snapshot document, choosing the decoder from the file extension.
///
/// Files without a known extension are tried as YAML, then JSON.
pub fn import_network(path: &Path) -> Result<ImportResult> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading network document '{}'", path.display()))?;
    let document = match Format::detect(path) {
        Some(format) => format.decode(&data)?,
        None => Format::Yaml
            .decode(&data)
            .or_else(|_| Format::Json.decode(&data))
            .map_err(|_| anyhow!("'{}' is neither YAML nor JSON", path.display()))?,
    };

    let mut diagnostics = Diagnostics::new();
    let network = document
        .into_network(&mut diagnostics)
        .with_context(|| format!("building network from '{}'", path.display()))?;

    for issue in diagnostics.issues() {
        warn!(path = %path.display(), "{issue}");
    }
    debug!(
        network = %network.id,
        elements = network.element_count(),
        "imported network document"
    );
    Ok(ImportResult {
        network,
        diagnostics,
    })
}
