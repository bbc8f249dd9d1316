//! # gat-core: Network Snapshot Model
//!
//! Provides the network data structures that contingency lists are evaluated
//! against.
//!
//! ## Design Philosophy
//!
//! A snapshot is modeled as an **undirected multigraph** where:
//! - **Nodes**: Voltage levels and single-terminal equipment (injections)
//! - **Edges**: Two-terminal equipment (lines, two-windings transformers, HVDC lines)
//!
//! Every voltage level belongs to a [`Substation`], which carries the
//! [`Country`]. Each equipment terminal points at a voltage level, so the
//! country and nominal voltage seen by a terminal are always derived, never
//! duplicated.
//!
//! Connection states live in [`variant`]s. Queries never read an ambient
//! "current variant": they go through a [`NetworkView`] that binds one variant
//! explicitly.
//!
//! ## Quick Start
//!
//! ```rust
//! use gat_core::*;
//!
//! let mut network = Network::new("demo");
//! network.add_substation(Substation::new("S1", Some(Country::FR))).unwrap();
//! network
//!     .add_voltage_level(VoltageLevel::new("VL1", "S1", Kilovolts(400.0)))
//!     .unwrap();
//! network
//!     .add_injection(Injection::new("GEN", ElementType::Generator, "VL1"))
//!     .unwrap();
//!
//! let view = network.view(None).unwrap();
//! let gen = view.element("GEN").unwrap();
//! assert_eq!(gen.element_type(), ElementType::Generator);
//! assert!(!view.is_disconnected(&gen));
//! ```
//!
//! ## Concurrency
//!
//! The working variant is state of the whole [`Network`]. Callers that share
//! one mutable network between threads must serialize
//! [`Network::set_working_variant`] themselves (hold a lock, or hand each
//! thread a [`NetworkView`] bound to an explicit variant, which only borrows
//! the network immutably).

use petgraph::graph::EdgeIndex;
use petgraph::{prelude::*, Undirected};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

pub mod country;
pub mod diagnostics;
pub mod error;
pub mod units;
pub mod variant;
mod view;

pub use country::Country;
pub use diagnostics::{Category, DiagnosticIssue, Diagnostics, Severity};
pub use error::{GatError, GatResult};
pub use petgraph::graph::NodeIndex;
pub use units::Kilovolts;
pub use variant::{TerminalKey, TerminalSide, VariantManager, VariantState, INITIAL_VARIANT_ID};
pub use view::{ElementRef, NetworkView};

/// Category of a network element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementType {
    Generator,
    Load,
    StaticVarCompensator,
    ShuntCompensator,
    BusbarSection,
    DanglingLine,
    HvdcLine,
    Line,
    TwoWindingsTransformer,
}

impl ElementType {
    pub const ALL: &'static [ElementType] = &[
        ElementType::Generator,
        ElementType::Load,
        ElementType::StaticVarCompensator,
        ElementType::ShuntCompensator,
        ElementType::BusbarSection,
        ElementType::DanglingLine,
        ElementType::HvdcLine,
        ElementType::Line,
        ElementType::TwoWindingsTransformer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Generator => "GENERATOR",
            ElementType::Load => "LOAD",
            ElementType::StaticVarCompensator => "STATIC_VAR_COMPENSATOR",
            ElementType::ShuntCompensator => "SHUNT_COMPENSATOR",
            ElementType::BusbarSection => "BUSBAR_SECTION",
            ElementType::DanglingLine => "DANGLING_LINE",
            ElementType::HvdcLine => "HVDC_LINE",
            ElementType::Line => "LINE",
            ElementType::TwoWindingsTransformer => "TWO_WINDINGS_TRANSFORMER",
        }
    }

    /// Two-terminal equipment is stored as a graph edge.
    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            ElementType::HvdcLine | ElementType::Line | ElementType::TwoWindingsTransformer
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = GatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GatError::Validation(format!("unknown element type '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substation {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<Country>,
}

impl Substation {
    pub fn new(id: impl Into<String>, country: Option<Country>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            country,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageLevel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub substation_id: String,
    pub nominal_voltage: Kilovolts,
}

impl VoltageLevel {
    pub fn new(
        id: impl Into<String>,
        substation_id: impl Into<String>,
        nominal_voltage: Kilovolts,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            substation_id: substation_id.into(),
            nominal_voltage,
        }
    }
}

/// Connection point of an equipment. For HVDC lines the terminals are those
/// of the two converter stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    pub voltage_level_id: String,
}

impl Terminal {
    pub fn new(voltage_level_id: impl Into<String>) -> Self {
        Self {
            voltage_level_id: voltage_level_id.into(),
        }
    }
}

/// Single-terminal equipment (generator, load, shunt, SVC, busbar section, dangling line).
#[derive(Debug, Clone, PartialEq)]
pub struct Injection {
    pub id: String,
    pub name: String,
    pub element_type: ElementType,
    pub terminal: Terminal,
}

impl Injection {
    pub fn new(
        id: impl Into<String>,
        element_type: ElementType,
        voltage_level_id: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            element_type,
            terminal: Terminal::new(voltage_level_id),
        }
    }
}

/// Two-terminal equipment (line, two-windings transformer, HVDC line).
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub element_type: ElementType,
    pub terminal1: Terminal,
    pub terminal2: Terminal,
}

impl Branch {
    pub fn new(
        id: impl Into<String>,
        element_type: ElementType,
        voltage_level1: impl Into<String>,
        voltage_level2: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            element_type,
            terminal1: Terminal::new(voltage_level1),
            terminal2: Terminal::new(voltage_level2),
        }
    }
}

// Enum to represent different types of nodes in the graph
#[derive(Debug, Clone)]
pub enum Node {
    VoltageLevel(VoltageLevel),
    Injection(Injection),
}

// Enum to represent different types of edges in the graph
#[derive(Debug, Clone)]
pub enum Edge {
    Branch(Branch),
}

#[derive(Debug, Clone, Copy)]
enum ElementLocator {
    Injection(NodeIndex),
    Branch(EdgeIndex),
}

/// One network snapshot: topology, equipment and variants.
#[derive(Debug)]
pub struct Network {
    pub id: String,
    graph: Graph<Node, Edge, Undirected>,
    substations: BTreeMap<String, Substation>,
    voltage_levels: HashMap<String, NodeIndex>,
    // BTreeMap keeps enumeration order stable across runs
    elements: BTreeMap<String, ElementLocator>,
    variants: VariantManager,
}

impl Network {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            graph: Graph::new_undirected(),
            substations: BTreeMap::new(),
            voltage_levels: HashMap::new(),
            elements: BTreeMap::new(),
            variants: VariantManager::default(),
        }
    }

    pub fn graph(&self) -> &Graph<Node, Edge, Undirected> {
        &self.graph
    }

    pub fn add_substation(&mut self, substation: Substation) -> GatResult<()> {
        if self.substations.contains_key(&substation.id) {
            return Err(GatError::Network(format!(
                "duplicate substation id '{}'",
                substation.id
            )));
        }
        self.substations.insert(substation.id.clone(), substation);
        Ok(())
    }

    pub fn add_voltage_level(&mut self, voltage_level: VoltageLevel) -> GatResult<NodeIndex> {
        if self.voltage_levels.contains_key(&voltage_level.id) {
            return Err(GatError::Network(format!(
                "duplicate voltage level id '{}'",
                voltage_level.id
            )));
        }
        if !self.substations.contains_key(&voltage_level.substation_id) {
            return Err(GatError::Network(format!(
                "voltage level '{}' references unknown substation '{}'",
                voltage_level.id, voltage_level.substation_id
            )));
        }
        if !voltage_level.nominal_voltage.is_finite() {
            return Err(GatError::Network(format!(
                "voltage level '{}' has a non-finite nominal voltage",
                voltage_level.id
            )));
        }
        let id = voltage_level.id.clone();
        let index = self.graph.add_node(Node::VoltageLevel(voltage_level));
        self.voltage_levels.insert(id, index);
        Ok(index)
    }

    pub fn add_injection(&mut self, injection: Injection) -> GatResult<NodeIndex> {
        if injection.element_type.is_branch() {
            return Err(GatError::Network(format!(
                "'{}' is a {} and must be added as a branch",
                injection.id, injection.element_type
            )));
        }
        self.check_new_element(&injection.id)?;
        self.check_terminal(&injection.id, &injection.terminal)?;
        let id = injection.id.clone();
        let index = self.graph.add_node(Node::Injection(injection));
        self.elements.insert(id, ElementLocator::Injection(index));
        Ok(index)
    }

    pub fn add_branch(&mut self, branch: Branch) -> GatResult<EdgeIndex> {
        if !branch.element_type.is_branch() {
            return Err(GatError::Network(format!(
                "'{}' is a {} and must be added as an injection",
                branch.id, branch.element_type
            )));
        }
        self.check_new_element(&branch.id)?;
        let from = self.check_terminal(&branch.id, &branch.terminal1)?;
        let to = self.check_terminal(&branch.id, &branch.terminal2)?;
        let id = branch.id.clone();
        let index = self.graph.add_edge(from, to, Edge::Branch(branch));
        self.elements.insert(id, ElementLocator::Branch(index));
        Ok(index)
    }

    fn check_new_element(&self, id: &str) -> GatResult<()> {
        if id.trim().is_empty() {
            return Err(GatError::Network("element id cannot be empty".to_string()));
        }
        if self.elements.contains_key(id) {
            return Err(GatError::Network(format!("duplicate element id '{id}'")));
        }
        Ok(())
    }

    fn check_terminal(&self, element_id: &str, terminal: &Terminal) -> GatResult<NodeIndex> {
        self.voltage_levels
            .get(&terminal.voltage_level_id)
            .copied()
            .ok_or_else(|| {
                GatError::Network(format!(
                    "'{}' references unknown voltage level '{}'",
                    element_id, terminal.voltage_level_id
                ))
            })
    }

    pub fn substation(&self, id: &str) -> Option<&Substation> {
        self.substations.get(id)
    }

    pub fn substations(&self) -> impl Iterator<Item = &Substation> {
        self.substations.values()
    }

    pub fn voltage_level(&self, id: &str) -> Option<&VoltageLevel> {
        let index = self.voltage_levels.get(id)?;
        match &self.graph[*index] {
            Node::VoltageLevel(vl) => Some(vl),
            Node::Injection(_) => None,
        }
    }

    pub fn voltage_levels(&self) -> impl Iterator<Item = &VoltageLevel> {
        self.graph.node_weights().filter_map(|node| match node {
            Node::VoltageLevel(vl) => Some(vl),
            Node::Injection(_) => None,
        })
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    // =========================================================================
    // Variants
    // =========================================================================

    pub fn variants(&self) -> &VariantManager {
        &self.variants
    }

    pub fn working_variant_id(&self) -> &str {
        self.variants.working_variant_id()
    }

    /// Switch the working variant. The caller owns restoring the previous one.
    pub fn set_working_variant(&mut self, id: &str) -> GatResult<()> {
        self.variants.set_working_variant(id)
    }

    pub fn clone_variant(&mut self, source: &str, target: &str) -> GatResult<()> {
        self.variants.clone_variant(source, target)
    }

    pub fn remove_variant(&mut self, id: &str) -> GatResult<()> {
        self.variants.remove_variant(id)
    }

    /// Connect or disconnect a terminal in the working variant.
    pub fn set_terminal_connected(
        &mut self,
        element_id: &str,
        side: TerminalSide,
        connected: bool,
    ) -> GatResult<()> {
        let working = self.variants.working_variant_id().to_string();
        self.set_terminal_connected_in(&working, element_id, side, connected)
    }

    /// Connect or disconnect a terminal in an explicit variant.
    pub fn set_terminal_connected_in(
        &mut self,
        variant_id: &str,
        element_id: &str,
        side: TerminalSide,
        connected: bool,
    ) -> GatResult<()> {
        let locator = self
            .elements
            .get(element_id)
            .ok_or_else(|| GatError::Network(format!("unknown element '{element_id}'")))?;
        if matches!(locator, ElementLocator::Injection(_)) && side == TerminalSide::Two {
            return Err(GatError::Network(format!(
                "'{element_id}' has a single terminal"
            )));
        }
        self.variants
            .state_mut(variant_id)?
            .set_connected(TerminalKey::new(element_id, side), connected);
        Ok(())
    }

    /// Bind a read-only view to `variant`, or to the working variant when `None`.
    pub fn view(&self, variant: Option<&str>) -> GatResult<NetworkView<'_>> {
        let requested = variant.unwrap_or_else(|| self.variants.working_variant_id());
        let (variant_id, state) = self.variants.entry(requested)?;
        Ok(NetworkView::new(self, variant_id, state))
    }

    pub(crate) fn element_ref(&self, id: &str) -> Option<ElementRef<'_>> {
        match self.elements.get(id)? {
            ElementLocator::Injection(index) => match &self.graph[*index] {
                Node::Injection(injection) => Some(ElementRef::Injection(injection)),
                Node::VoltageLevel(_) => None,
            },
            ElementLocator::Branch(index) => match &self.graph[*index] {
                Edge::Branch(branch) => Some(ElementRef::Branch(branch)),
            },
        }
    }

    pub(crate) fn element_ids(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// Compute basic statistics about the network
    pub fn stats(&self) -> NetworkStats {
        let mut stats = NetworkStats {
            num_substations: self.substations.len(),
            ..NetworkStats::default()
        };

        for node in self.graph.node_weights() {
            match node {
                Node::VoltageLevel(_) => stats.num_voltage_levels += 1,
                Node::Injection(injection) => {
                    *stats.elements.entry(injection.element_type).or_default() += 1
                }
            }
        }
        for edge in self.graph.edge_weights() {
            match edge {
                Edge::Branch(branch) => {
                    *stats.elements.entry(branch.element_type).or_default() += 1
                }
            }
        }
        stats.num_variants = self.variants.variant_ids().count();
        stats
    }

    /// Validate network data for issues that make filters silently miss.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        if self.substations.is_empty() {
            diag.error(Category::Structure, "network has no substations");
            return;
        }

        if self.elements.is_empty() {
            diag.warning(Category::Structure, "network has no equipment");
        }

        for substation in self.substations.values() {
            if substation.country.is_none() {
                diag.warning(
                    Category::Structure,
                    "substation has no country, country filters will never match it",
                )
                .on(format!("Substation {}", substation.id));
            }
        }

        for vl in self.voltage_levels() {
            if vl.nominal_voltage.value() <= 0.0 {
                diag.error(
                    Category::Physical,
                    format!("non-positive nominal voltage {}", vl.nominal_voltage),
                )
                .on(format!("VoltageLevel {}", vl.id));
            }
        }
    }
}

/// Element counts for reporting.
#[derive(Debug, Default, Clone, Serialize)]
pub struct NetworkStats {
    pub num_substations: usize,
    pub num_voltage_levels: usize,
    pub num_variants: usize,
    pub elements: BTreeMap<ElementType, usize>,
}

impl NetworkStats {
    pub fn count(&self, element_type: ElementType) -> usize {
        self.elements.get(&element_type).copied().unwrap_or(0)
    }
}

impl fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Network Statistics:")?;
        writeln!(f, "  Substations: {}", self.num_substations)?;
        writeln!(f, "  Voltage levels: {}", self.num_voltage_levels)?;
        for (element_type, count) in &self.elements {
            writeln!(f, "  {}: {}", element_type, count)?;
        }
        write!(f, "  Variants: {}", self.num_variants)
    }
}

impl Node {
    /// Returns the node's identifier for display purposes.
    pub fn label(&self) -> &str {
        match self {
            Node::VoltageLevel(vl) => &vl.id,
            Node::Injection(injection) => &injection.id,
        }
    }
}

impl Edge {
    /// Returns the edge's identifier for display purposes.
    pub fn label(&self) -> &str {
        match self {
            Edge::Branch(branch) => &branch.id,
        }
    }
}
