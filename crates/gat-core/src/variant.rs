//! Network variants: named alternate connection states of one snapshot.
//!
//! A variant only records which terminals are disconnected; the topology and
//! the equipment data are shared by every variant of a [`Network`](crate::Network).
//! Every snapshot starts with [`INITIAL_VARIANT_ID`].

use crate::error::{GatError, GatResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Identifier of the variant every network is created with.
pub const INITIAL_VARIANT_ID: &str = "InitialState";

/// Side of an equipment terminal. Single-terminal equipment only has `One`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminalSide {
    One,
    Two,
}

/// Address of one terminal: owning element id and side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalKey {
    pub element_id: String,
    pub side: TerminalSide,
}

impl TerminalKey {
    pub fn new(element_id: impl Into<String>, side: TerminalSide) -> Self {
        Self {
            element_id: element_id.into(),
            side,
        }
    }
}

/// Connection state of every terminal for one variant.
#[derive(Debug, Clone, Default)]
pub struct VariantState {
    disconnected: BTreeSet<TerminalKey>,
}

impl VariantState {
    #[inline]
    pub fn is_connected(&self, key: &TerminalKey) -> bool {
        !self.disconnected.contains(key)
    }

    pub fn set_connected(&mut self, key: TerminalKey, connected: bool) {
        if connected {
            self.disconnected.remove(&key);
        } else {
            self.disconnected.insert(key);
        }
    }

    /// Number of disconnected terminals in this variant.
    pub fn disconnected_count(&self) -> usize {
        self.disconnected.len()
    }
}

/// Owns the variants of a network and the id of the working one.
#[derive(Debug, Clone)]
pub struct VariantManager {
    variants: BTreeMap<String, VariantState>,
    working: String,
}

impl Default for VariantManager {
    fn default() -> Self {
        let mut variants = BTreeMap::new();
        variants.insert(INITIAL_VARIANT_ID.to_string(), VariantState::default());
        Self {
            variants,
            working: INITIAL_VARIANT_ID.to_string(),
        }
    }
}

impl VariantManager {
    pub fn variant_ids(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.variants.contains_key(id)
    }

    pub fn working_variant_id(&self) -> &str {
        &self.working
    }

    /// Make `id` the working variant.
    pub fn set_working_variant(&mut self, id: &str) -> GatResult<()> {
        if !self.variants.contains_key(id) {
            return Err(GatError::VariantNotFound(id.to_string()));
        }
        self.working = id.to_string();
        Ok(())
    }

    /// Copy the state of `source` into a new variant `target`.
    pub fn clone_variant(&mut self, source: &str, target: &str) -> GatResult<()> {
        if self.variants.contains_key(target) {
            return Err(GatError::Network(format!("variant '{target}' already exists")));
        }
        let state = self
            .variants
            .get(source)
            .cloned()
            .ok_or_else(|| GatError::VariantNotFound(source.to_string()))?;
        self.variants.insert(target.to_string(), state);
        Ok(())
    }

    /// Remove a variant. The initial variant and the working variant cannot be removed.
    pub fn remove_variant(&mut self, id: &str) -> GatResult<()> {
        if id == INITIAL_VARIANT_ID || id == self.working {
            return Err(GatError::Network(format!(
                "variant '{id}' is in use and cannot be removed"
            )));
        }
        self.variants
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| GatError::VariantNotFound(id.to_string()))
    }

    pub fn state(&self, id: &str) -> GatResult<&VariantState> {
        self.variants
            .get(id)
            .ok_or_else(|| GatError::VariantNotFound(id.to_string()))
    }

    /// Stored id and state of a variant.
    pub fn entry(&self, id: &str) -> GatResult<(&str, &VariantState)> {
        self.variants
            .get_key_value(id)
            .map(|(key, state)| (key.as_str(), state))
            .ok_or_else(|| GatError::VariantNotFound(id.to_string()))
    }

    pub fn state_mut(&mut self, id: &str) -> GatResult<&mut VariantState> {
        self.variants
            .get_mut(id)
            .ok_or_else(|| GatError::VariantNotFound(id.to_string()))
    }
}
