//! Read-only, variant-bound queries over a [`Network`].

use crate::{
    Branch, Country, ElementType, Injection, Kilovolts, Network, Terminal, TerminalKey,
    TerminalSide, VariantState,
};

/// Borrowed handle to one equipment of the network.
#[derive(Debug, Clone, Copy)]
pub enum ElementRef<'a> {
    Injection(&'a Injection),
    Branch(&'a Branch),
}

impl<'a> ElementRef<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            ElementRef::Injection(injection) => &injection.id,
            ElementRef::Branch(branch) => &branch.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            ElementRef::Injection(injection) => &injection.name,
            ElementRef::Branch(branch) => &branch.name,
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ElementRef::Injection(injection) => injection.element_type,
            ElementRef::Branch(branch) => branch.element_type,
        }
    }

    /// Terminals in side order.
    pub fn terminals(&self) -> Vec<(TerminalSide, &'a Terminal)> {
        match self {
            ElementRef::Injection(injection) => vec![(TerminalSide::One, &injection.terminal)],
            ElementRef::Branch(branch) => vec![
                (TerminalSide::One, &branch.terminal1),
                (TerminalSide::Two, &branch.terminal2),
            ],
        }
    }
}

/// A [`Network`] seen through one explicit variant.
///
/// All lookups made while evaluating contingency lists (element enumeration,
/// country and nominal voltage derivation, connection checks) go through a
/// view, so the variant in use is always visible at the call site.
#[derive(Debug, Clone, Copy)]
pub struct NetworkView<'a> {
    network: &'a Network,
    variant_id: &'a str,
    state: &'a VariantState,
}

impl<'a> NetworkView<'a> {
    pub(crate) fn new(network: &'a Network, variant_id: &'a str, state: &'a VariantState) -> Self {
        Self {
            network,
            variant_id,
            state,
        }
    }

    pub fn network(&self) -> &'a Network {
        self.network
    }

    pub fn variant_id(&self) -> &'a str {
        self.variant_id
    }

    pub fn contains(&self, element_id: &str) -> bool {
        self.network.element_ref(element_id).is_some()
    }

    pub fn element(&self, element_id: &str) -> Option<ElementRef<'a>> {
        self.network.element_ref(element_id)
    }

    /// All equipment, ordered by id.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let network = self.network;
        network
            .element_ids()
            .filter_map(move |id| network.element_ref(id))
    }

    /// Equipment of one type, ordered by id.
    pub fn elements_of_type(
        &self,
        element_type: ElementType,
    ) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.elements()
            .filter(move |element| element.element_type() == element_type)
    }

    /// Country of the substation the terminal's voltage level belongs to.
    pub fn country(&self, terminal: &Terminal) -> Option<Country> {
        let vl = self.network.voltage_level(&terminal.voltage_level_id)?;
        self.network.substation(&vl.substation_id)?.country
    }

    pub fn nominal_voltage(&self, terminal: &Terminal) -> Option<Kilovolts> {
        self.network
            .voltage_level(&terminal.voltage_level_id)
            .map(|vl| vl.nominal_voltage)
    }

    pub fn is_connected(&self, element_id: &str, side: TerminalSide) -> bool {
        self.state
            .is_connected(&TerminalKey::new(element_id, side))
    }

    /// An element is disconnected when none of its terminals is connected.
    pub fn is_disconnected(&self, element: &ElementRef<'_>) -> bool {
        !element
            .terminals()
            .iter()
            .any(|(side, _)| self.is_connected(element.id(), *side))
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn create_network() -> Network {
        let mut network = Network::new("view");
        network
            .add_substation(Substation::new("S1", Some(Country::FR)))
            .unwrap();
        network.add_substation(Substation::new("S2", None)).unwrap();
        network
            .add_voltage_level(VoltageLevel::new("VL1", "S1", Kilovolts(400.0)))
            .unwrap();
        network
            .add_voltage_level(VoltageLevel::new("VL2", "S2", Kilovolts(225.0)))
            .unwrap();
        network
            .add_injection(Injection::new("LOAD", ElementType::Load, "VL2"))
            .unwrap();
        network
            .add_injection(Injection::new("GEN", ElementType::Generator, "VL1"))
            .unwrap();
        network
            .add_branch(Branch::new("L", ElementType::Line, "VL1", "VL2"))
            .unwrap();
        network
    }

    #[test]
    fn test_elements_are_ordered_by_id() {
        let network = create_network();
        let view = network.view(None).unwrap();
        let ids: Vec<_> = view.elements().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["GEN", "L", "LOAD"]);
        let gens: Vec<_> = view
            .elements_of_type(ElementType::Generator)
            .map(|e| e.id())
            .collect();
        assert_eq!(gens, vec!["GEN"]);
    }

    #[test]
    fn test_terminal_country_and_voltage() {
        let network = create_network();
        let view = network.view(None).unwrap();
        let line = view.element("L").unwrap();
        let terminals = line.terminals();
        assert_eq!(terminals.len(), 2);
        assert_eq!(view.country(terminals[0].1), Some(Country::FR));
        assert_eq!(view.country(terminals[1].1), None);
        assert_eq!(view.nominal_voltage(terminals[1].1), Some(Kilovolts(225.0)));
    }

    #[test]
    fn test_one_connected_side_keeps_branch_connected() {
        let mut network = create_network();
        network
            .set_terminal_connected("L", TerminalSide::One, false)
            .unwrap();
        let view = network.view(None).unwrap();
        let line = view.element("L").unwrap();
        assert!(!view.is_connected("L", TerminalSide::One));
        assert!(view.is_connected("L", TerminalSide::Two));
        assert!(!view.is_disconnected(&line));
    }

    #[test]
    fn test_unknown_element() {
        let network = create_network();
        let view = network.view(None).unwrap();
        assert!(view.element("MISSING").is_none());
        assert!(!view.contains("MISSING"));
        assert!(view.contains("LOAD"));
    }
}
