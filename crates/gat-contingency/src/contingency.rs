//! Contingencies produced by evaluating a list: the elements taken out
//! together, plus the per-contingency evaluation report.

use gat_core::ElementType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Reference to one equipment inside a contingency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyElement {
    pub id: String,
    /// Absent when the list was inspected without a network.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,
}

impl ContingencyElement {
    pub fn new(id: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            id: id.into(),
            element_type: Some(element_type),
        }
    }

    pub fn unresolved(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            element_type: None,
        }
    }
}

/// Named set of equipment assumed to fail together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contingency {
    pub id: String,
    pub elements: Vec<ContingencyElement>,
}

impl Contingency {
    pub fn new(id: impl Into<String>, elements: Vec<ContingencyElement>) -> Self {
        Self {
            id: id.into(),
            elements,
        }
    }

    pub fn element_ids(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|element| element.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for Contingency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.id)?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&element.id)?;
        }
        f.write_str("]")
    }
}

/// Outcome of resolving one group (identifier lists) or one matched element (form lists).
///
/// Diagnostic sets are `None` rather than empty when there is nothing to report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContingencyEvaluationResult {
    pub id: String,
    pub contingency: Option<Contingency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_found_elements: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disconnected_elements: Option<BTreeSet<String>>,
}

impl ContingencyEvaluationResult {
    pub fn new(id: impl Into<String>, contingency: Option<Contingency>) -> Self {
        Self {
            id: id.into(),
            contingency,
            ..Default::default()
        }
    }

    pub fn with_not_found(mut self, ids: BTreeSet<String>) -> Self {
        self.not_found_elements = non_empty(ids);
        self
    }

    pub fn with_disconnected(mut self, ids: BTreeSet<String>) -> Self {
        self.disconnected_elements = non_empty(ids);
        self
    }

    pub fn has_diagnostics(&self) -> bool {
        self.not_found_elements.is_some() || self.disconnected_elements.is_some()
    }
}

fn non_empty(ids: BTreeSet<String>) -> Option<BTreeSet<String>> {
    (!ids.is_empty()).then_some(ids)
}
