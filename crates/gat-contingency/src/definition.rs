//! Contingency list definitions.
//!
//! A list is either form-based (an equipment type plus country and nominal
//! voltage filters, resolved by scanning the network) or identifier-based
//! (explicit named groups of element ids). Both are validated when they are
//! built or deserialized and resolve through [`ContingencyListDefinition::resolve`].

use crate::contingency::{Contingency, ContingencyElement, ContingencyEvaluationResult};
use crate::criteria::{
    injection_criteria_match, two_terminal_criteria_match, CountryFilter, TerminalProfile,
};
use crate::numerical::NumericalFilter;
use gat_core::{ElementRef, ElementType, GatError, GatResult, NetworkView};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

/// Equipment types a form list can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentType {
    Generator,
    StaticVarCompensator,
    ShuntCompensator,
    BusbarSection,
    DanglingLine,
    HvdcLine,
    Line,
    TwoWindingsTransformer,
}

impl EquipmentType {
    pub const ALL: &'static [EquipmentType] = &[
        EquipmentType::Generator,
        EquipmentType::StaticVarCompensator,
        EquipmentType::ShuntCompensator,
        EquipmentType::BusbarSection,
        EquipmentType::DanglingLine,
        EquipmentType::HvdcLine,
        EquipmentType::Line,
        EquipmentType::TwoWindingsTransformer,
    ];

    pub fn element_type(&self) -> ElementType {
        match self {
            EquipmentType::Generator => ElementType::Generator,
            EquipmentType::StaticVarCompensator => ElementType::StaticVarCompensator,
            EquipmentType::ShuntCompensator => ElementType::ShuntCompensator,
            EquipmentType::BusbarSection => ElementType::BusbarSection,
            EquipmentType::DanglingLine => ElementType::DanglingLine,
            EquipmentType::HvdcLine => ElementType::HvdcLine,
            EquipmentType::Line => ElementType::Line,
            EquipmentType::TwoWindingsTransformer => ElementType::TwoWindingsTransformer,
        }
    }

    /// Two-terminal types filter with the side-1/side-2 slots.
    pub fn is_two_terminal(&self) -> bool {
        self.element_type().is_branch()
    }

    pub fn as_str(&self) -> &'static str {
        self.element_type().as_str()
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquipmentType {
    type Err = GatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EquipmentType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                GatError::InvalidDefinition(format!("unsupported equipment type '{s}'"))
            })
    }
}

/// Criteria-based list: every element of one type passing the filters becomes
/// a single-element contingency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FormContingencyListDto", into = "FormContingencyListDto")]
pub struct FormContingencyList {
    equipment_type: EquipmentType,
    nominal_voltage: Option<NumericalFilter>,
    nominal_voltage1: Option<NumericalFilter>,
    nominal_voltage2: Option<NumericalFilter>,
    countries: CountryFilter,
    countries1: CountryFilter,
    countries2: CountryFilter,
}

impl FormContingencyList {
    /// Form list over single-terminal equipment.
    pub fn injection(
        equipment_type: EquipmentType,
        nominal_voltage: Option<NumericalFilter>,
        countries: CountryFilter,
    ) -> GatResult<Self> {
        let list = Self {
            equipment_type,
            nominal_voltage,
            nominal_voltage1: None,
            nominal_voltage2: None,
            countries,
            countries1: CountryFilter::any(),
            countries2: CountryFilter::any(),
        };
        list.validate()?;
        Ok(list)
    }

    /// Form list over two-terminal equipment.
    pub fn two_terminal(
        equipment_type: EquipmentType,
        nominal_voltage1: Option<NumericalFilter>,
        nominal_voltage2: Option<NumericalFilter>,
        countries1: CountryFilter,
        countries2: CountryFilter,
    ) -> GatResult<Self> {
        let list = Self {
            equipment_type,
            nominal_voltage: None,
            nominal_voltage1,
            nominal_voltage2,
            countries: CountryFilter::any(),
            countries1,
            countries2,
        };
        list.validate()?;
        Ok(list)
    }

    /// Filters must sit in the slots the equipment type uses.
    pub fn validate(&self) -> GatResult<()> {
        let misplaced = if self.equipment_type.is_two_terminal() {
            [
                ("nominalVoltage", self.nominal_voltage.is_some()),
                ("countries", !self.countries.is_empty()),
            ]
        } else {
            [
                (
                    "nominalVoltage1/nominalVoltage2",
                    self.nominal_voltage1.is_some() || self.nominal_voltage2.is_some(),
                ),
                (
                    "countries1/countries2",
                    !self.countries1.is_empty() || !self.countries2.is_empty(),
                ),
            ]
        };
        match misplaced.iter().find(|(_, set)| *set) {
            Some((slot, _)) => Err(GatError::InvalidDefinition(format!(
                "{slot} cannot be used with equipment type {}",
                self.equipment_type
            ))),
            None => Ok(()),
        }
    }

    pub fn equipment_type(&self) -> EquipmentType {
        self.equipment_type
    }

    pub fn nominal_voltage(&self) -> Option<&NumericalFilter> {
        self.nominal_voltage.as_ref()
    }

    pub fn nominal_voltage1(&self) -> Option<&NumericalFilter> {
        self.nominal_voltage1.as_ref()
    }

    pub fn nominal_voltage2(&self) -> Option<&NumericalFilter> {
        self.nominal_voltage2.as_ref()
    }

    pub fn countries(&self) -> &CountryFilter {
        &self.countries
    }

    pub fn countries1(&self) -> &CountryFilter {
        &self.countries1
    }

    pub fn countries2(&self) -> &CountryFilter {
        &self.countries2
    }

    /// Whether one network element passes every declared filter.
    pub fn matches(&self, view: &NetworkView<'_>, element: &ElementRef<'_>) -> bool {
        if element.element_type() != self.equipment_type.element_type() {
            return false;
        }
        let profiles: Vec<TerminalProfile> = element
            .terminals()
            .into_iter()
            .map(|(_, terminal)| TerminalProfile::of(view, terminal))
            .collect();

        match profiles.as_slice() {
            [single] => injection_criteria_match(single, &self.countries, self.nominal_voltage()),
            [side1, side2] => two_terminal_criteria_match(
                side1,
                side2,
                &self.countries1,
                &self.countries2,
                self.nominal_voltage1(),
                self.nominal_voltage2(),
            ),
            _ => false,
        }
    }

    /// Ids of the matching elements, ordered by id.
    pub fn matching_element_ids(&self, view: &NetworkView<'_>) -> Vec<String> {
        view.elements_of_type(self.equipment_type.element_type())
            .filter(|element| self.matches(view, element))
            .map(|element| element.id().to_string())
            .collect()
    }

    /// One single-element contingency per matching element. Nothing without a network.
    pub fn resolve(&self, view: Option<&NetworkView<'_>>) -> Vec<ContingencyEvaluationResult> {
        let Some(view) = view else {
            return Vec::new();
        };
        view.elements_of_type(self.equipment_type.element_type())
            .filter(|element| self.matches(view, element))
            .map(|element| {
                let id = element.id();
                let contingency = Contingency::new(
                    id,
                    vec![ContingencyElement::new(id, element.element_type())],
                );
                let disconnected = if view.is_disconnected(&element) {
                    BTreeSet::from([id.to_string()])
                } else {
                    BTreeSet::new()
                };
                ContingencyEvaluationResult::new(id, Some(contingency))
                    .with_disconnected(disconnected)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormContingencyListDto {
    #[serde(alias = "equipment_type")]
    equipment_type: String,
    #[serde(default, alias = "nominal_voltage")]
    nominal_voltage: Option<NumericalFilter>,
    #[serde(default, alias = "nominal_voltage1")]
    nominal_voltage1: Option<NumericalFilter>,
    #[serde(default, alias = "nominal_voltage2")]
    nominal_voltage2: Option<NumericalFilter>,
    #[serde(default)]
    countries: Vec<String>,
    #[serde(default)]
    countries1: Vec<String>,
    #[serde(default)]
    countries2: Vec<String>,
}

impl TryFrom<FormContingencyListDto> for FormContingencyList {
    type Error = GatError;

    fn try_from(dto: FormContingencyListDto) -> Result<Self, Self::Error> {
        let list = Self {
            equipment_type: dto.equipment_type.parse()?,
            nominal_voltage: dto.nominal_voltage,
            nominal_voltage1: dto.nominal_voltage1,
            nominal_voltage2: dto.nominal_voltage2,
            countries: CountryFilter::parse(&dto.countries)?,
            countries1: CountryFilter::parse(&dto.countries1)?,
            countries2: CountryFilter::parse(&dto.countries2)?,
        };
        list.validate()?;
        Ok(list)
    }
}

impl From<FormContingencyList> for FormContingencyListDto {
    fn from(list: FormContingencyList) -> Self {
        let codes = |filter: &CountryFilter| -> Vec<String> {
            filter.iter().map(|country| country.code().to_string()).collect()
        };
        Self {
            equipment_type: list.equipment_type.as_str().to_string(),
            nominal_voltage: list.nominal_voltage,
            nominal_voltage1: list.nominal_voltage1,
            nominal_voltage2: list.nominal_voltage2,
            countries: codes(&list.countries),
            countries1: codes(&list.countries1),
            countries2: codes(&list.countries2),
        }
    }
}

/// Named group of element ids forming one contingency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierGroup {
    pub name: String,
    #[serde(alias = "element_ids")]
    pub element_ids: Vec<String>,
}

impl IdentifierGroup {
    pub fn new<I, S>(name: impl Into<String>, element_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            element_ids: element_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// Explicit list: one contingency per named group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IdentifierContingencyListDto", into = "IdentifierContingencyListDto")]
pub struct IdentifierContingencyList {
    groups: Vec<IdentifierGroup>,
}

impl IdentifierContingencyList {
    /// Validates the groups. Duplicate ids inside a group collapse onto their
    /// first occurrence.
    pub fn new(groups: Vec<IdentifierGroup>) -> GatResult<Self> {
        if groups.is_empty() {
            return Err(GatError::InvalidDefinition(
                "identifier list has no groups".to_string(),
            ));
        }

        let mut names = HashSet::new();
        let mut normalized = Vec::with_capacity(groups.len());
        for group in groups {
            if group.name.trim().is_empty() {
                return Err(GatError::InvalidDefinition(
                    "identifier group has an empty name".to_string(),
                ));
            }
            if !names.insert(group.name.clone()) {
                return Err(GatError::InvalidDefinition(format!(
                    "duplicate identifier group '{}'",
                    group.name
                )));
            }

            let mut seen = HashSet::new();
            let mut element_ids = Vec::with_capacity(group.element_ids.len());
            for id in group.element_ids {
                if id.trim().is_empty() {
                    return Err(GatError::InvalidDefinition(format!(
                        "identifier group '{}' contains an empty element id",
                        group.name
                    )));
                }
                if seen.insert(id.clone()) {
                    element_ids.push(id);
                }
            }
            if element_ids.is_empty() {
                return Err(GatError::InvalidDefinition(format!(
                    "identifier group '{}' has no element ids",
                    group.name
                )));
            }
            normalized.push(IdentifierGroup {
                name: group.name,
                element_ids,
            });
        }

        Ok(Self { groups: normalized })
    }

    pub fn groups(&self) -> &[IdentifierGroup] {
        &self.groups
    }

    /// One result per group, in declared order.
    ///
    /// Without a network the raw structure is returned: every id is kept, no
    /// element type is known and no diagnostics are computed.
    pub fn resolve(&self, view: Option<&NetworkView<'_>>) -> Vec<ContingencyEvaluationResult> {
        self.groups
            .iter()
            .map(|group| match view {
                Some(view) => resolve_group(group, view),
                None => {
                    let elements = group
                        .element_ids
                        .iter()
                        .map(ContingencyElement::unresolved)
                        .collect();
                    ContingencyEvaluationResult::new(
                        &group.name,
                        Some(Contingency::new(&group.name, elements)),
                    )
                }
            })
            .collect()
    }
}

fn resolve_group(group: &IdentifierGroup, view: &NetworkView<'_>) -> ContingencyEvaluationResult {
    let mut elements = Vec::new();
    let mut not_found = BTreeSet::new();
    let mut disconnected = BTreeSet::new();

    for id in &group.element_ids {
        match view.element(id) {
            Some(element) => {
                if view.is_disconnected(&element) {
                    disconnected.insert(id.clone());
                }
                elements.push(ContingencyElement::new(id, element.element_type()));
            }
            None => {
                not_found.insert(id.clone());
            }
        }
    }

    let contingency = (!elements.is_empty()).then(|| Contingency::new(&group.name, elements));
    ContingencyEvaluationResult::new(&group.name, contingency)
        .with_not_found(not_found)
        .with_disconnected(disconnected)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdentifierContingencyListDto {
    identifiers: Vec<IdentifierGroup>,
}

impl TryFrom<IdentifierContingencyListDto> for IdentifierContingencyList {
    type Error = GatError;

    fn try_from(dto: IdentifierContingencyListDto) -> Result<Self, Self::Error> {
        IdentifierContingencyList::new(dto.identifiers)
    }
}

impl From<IdentifierContingencyList> for IdentifierContingencyListDto {
    fn from(list: IdentifierContingencyList) -> Self {
        Self {
            identifiers: list.groups,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContingencyListType {
    Form,
    Identifiers,
}

impl fmt::Display for ContingencyListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContingencyListType::Form => f.write_str("FORM"),
            ContingencyListType::Identifiers => f.write_str("IDENTIFIERS"),
        }
    }
}

/// A stored list definition of either kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContingencyListDefinition {
    Form(FormContingencyList),
    Identifiers(IdentifierContingencyList),
}

impl ContingencyListDefinition {
    pub fn list_type(&self) -> ContingencyListType {
        match self {
            ContingencyListDefinition::Form(_) => ContingencyListType::Form,
            ContingencyListDefinition::Identifiers(_) => ContingencyListType::Identifiers,
        }
    }

    pub fn validate(&self) -> GatResult<()> {
        match self {
            ContingencyListDefinition::Form(form) => form.validate(),
            // construction already enforces the identifier invariants
            ContingencyListDefinition::Identifiers(_) => Ok(()),
        }
    }

    pub fn resolve(&self, view: Option<&NetworkView<'_>>) -> Vec<ContingencyEvaluationResult> {
        match self {
            ContingencyListDefinition::Form(form) => form.resolve(view),
            ContingencyListDefinition::Identifiers(identifiers) => identifiers.resolve(view),
        }
    }

    /// Resolved contingencies only, diagnostics dropped.
    pub fn contingencies(&self, view: Option<&NetworkView<'_>>) -> Vec<Contingency> {
        self.resolve(view)
            .into_iter()
            .filter_map(|result| result.contingency)
            .collect()
    }
}

impl From<FormContingencyList> for ContingencyListDefinition {
    fn from(list: FormContingencyList) -> Self {
        ContingencyListDefinition::Form(list)
    }
}

impl From<IdentifierContingencyList> for ContingencyListDefinition {
    fn from(list: IdentifierContingencyList) -> Self {
        ContingencyListDefinition::Identifiers(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::NumericalFilterOperator;
    use crate::test_utils::create_test_network;
    use gat_core::{Country, TerminalSide};

    fn le(kv: f64) -> Option<NumericalFilter> {
        Some(NumericalFilter::new(NumericalFilterOperator::LessOrEqual, Some(kv), None).unwrap())
    }

    fn ids(results: &[ContingencyEvaluationResult]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_unsupported_equipment_type() {
        assert!(matches!(
            "LOAD".parse::<EquipmentType>(),
            Err(GatError::InvalidDefinition(_))
        ));
        assert_eq!(
            "two_windings_transformer".parse::<EquipmentType>().unwrap(),
            EquipmentType::TwoWindingsTransformer
        );
        let err = serde_json::from_str::<FormContingencyList>(r#"{"equipmentType":"BATTERY"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unsupported equipment type"));
    }

    #[test]
    fn test_misplaced_slots_rejected() {
        assert!(FormContingencyList::injection(EquipmentType::Line, le(225.0), CountryFilter::any())
            .is_err());
        assert!(FormContingencyList::two_terminal(
            EquipmentType::Generator,
            le(225.0),
            None,
            CountryFilter::any(),
            CountryFilter::any()
        )
        .is_err());
        // empty slots are fine for any type
        assert!(FormContingencyList::injection(
            EquipmentType::Line,
            None,
            CountryFilter::any()
        )
        .is_ok());
    }

    #[test]
    fn test_form_json_shape() {
        let json = r#"{
            "equipmentType": "LINE",
            "nominalVoltage1": {"type": "LESS_OR_EQUAL", "value1": 225.0, "value2": null},
            "countries1": ["FR"],
            "countries2": []
        }"#;
        let list: FormContingencyList = serde_json::from_str(json).unwrap();
        assert_eq!(list.equipment_type(), EquipmentType::Line);
        assert_eq!(list.nominal_voltage1().unwrap().value1(), Some(225.0));
        assert!(list.countries1().admits(Some(Country::FR)));

        let back = serde_json::to_value(&list).unwrap();
        assert_eq!(back["equipmentType"], "LINE");
        assert_eq!(back["countries1"][0], "FR");
    }

    #[test]
    fn test_form_line_voltage_scenario() {
        let network = create_test_network().unwrap();
        let view = network.view(None).unwrap();
        let list = FormContingencyList::two_terminal(
            EquipmentType::Line,
            le(225.0),
            None,
            CountryFilter::any(),
            CountryFilter::any(),
        )
        .unwrap();
        let results = list.resolve(Some(&view));
        assert_eq!(ids(&results), vec!["LINE_FR_BE_220"]);
        let contingency = results[0].contingency.as_ref().unwrap();
        assert_eq!(contingency.elements[0].element_type, Some(ElementType::Line));
        assert!(results[0].not_found_elements.is_none());
    }

    #[test]
    fn test_form_generator_by_country() {
        let network = create_test_network().unwrap();
        let view = network.view(None).unwrap();
        let list = FormContingencyList::injection(
            EquipmentType::Generator,
            None,
            CountryFilter::parse(["BE"]).unwrap(),
        )
        .unwrap();
        assert_eq!(list.matching_element_ids(&view), vec!["GEN_BE"]);
    }

    #[test]
    fn test_form_without_network_is_empty() {
        let list =
            FormContingencyList::injection(EquipmentType::Generator, None, CountryFilter::any())
                .unwrap();
        assert!(list.resolve(None).is_empty());
    }

    #[test]
    fn test_form_reports_disconnected() {
        let mut network = create_test_network().unwrap();
        network
            .set_terminal_connected("GEN_FR", TerminalSide::One, false)
            .unwrap();
        let view = network.view(None).unwrap();
        let list = FormContingencyList::injection(
            EquipmentType::Generator,
            None,
            CountryFilter::parse(["FR"]).unwrap(),
        )
        .unwrap();
        let results = list.resolve(Some(&view));
        assert_eq!(ids(&results), vec!["GEN_FR"]);
        assert!(results[0]
            .disconnected_elements
            .as_ref()
            .unwrap()
            .contains("GEN_FR"));
    }

    #[test]
    fn test_identifier_validation() {
        assert!(IdentifierContingencyList::new(vec![]).is_err());
        assert!(IdentifierContingencyList::new(vec![IdentifierGroup::new("", ["L1"])]).is_err());
        assert!(IdentifierContingencyList::new(vec![IdentifierGroup::new(
            "c1",
            Vec::<String>::new()
        )])
        .is_err());
        assert!(IdentifierContingencyList::new(vec![
            IdentifierGroup::new("c1", ["L1"]),
            IdentifierGroup::new("c1", ["L2"]),
        ])
        .is_err());
        assert!(
            serde_json::from_str::<IdentifierContingencyList>(r#"{"identifiers":[]}"#).is_err()
        );
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let list =
            IdentifierContingencyList::new(vec![IdentifierGroup::new("c1", ["B", "A", "B"])])
                .unwrap();
        assert_eq!(list.groups()[0].element_ids, vec!["B", "A"]);
    }

    #[test]
    fn test_identifier_all_absent() {
        let network = create_test_network().unwrap();
        let view = network.view(None).unwrap();
        let list =
            IdentifierContingencyList::new(vec![IdentifierGroup::new("ghosts", ["X", "Y"])])
                .unwrap();
        let results = list.resolve(Some(&view));
        assert_eq!(results.len(), 1);
        assert!(results[0].contingency.is_none());
        assert_eq!(
            results[0].not_found_elements,
            Some(BTreeSet::from(["X".to_string(), "Y".to_string()]))
        );
    }

    #[test]
    fn test_identifier_mixed_keeps_declared_order() {
        let network = create_test_network().unwrap();
        let view = network.view(None).unwrap();
        let list = IdentifierContingencyList::new(vec![IdentifierGroup::new(
            "mixed",
            ["LOAD_FR", "GHOST", "GEN_FR"],
        )])
        .unwrap();
        let results = list.resolve(Some(&view));
        let contingency = results[0].contingency.as_ref().unwrap();
        assert_eq!(
            contingency.element_ids().collect::<Vec<_>>(),
            vec!["LOAD_FR", "GEN_FR"]
        );
        assert_eq!(
            results[0].not_found_elements,
            Some(BTreeSet::from(["GHOST".to_string()]))
        );
    }

    #[test]
    fn test_identifier_without_network_is_raw() {
        let list =
            IdentifierContingencyList::new(vec![IdentifierGroup::new("c1", ["GHOST", "L"])])
                .unwrap();
        let results = list.resolve(None);
        let contingency = results[0].contingency.as_ref().unwrap();
        assert_eq!(contingency.len(), 2);
        assert!(contingency.elements.iter().all(|e| e.element_type.is_none()));
        assert!(!results[0].has_diagnostics());
    }

    #[test]
    fn test_tagged_definition_json() {
        let json = r#"{"type":"IDENTIFIERS","identifiers":[{"name":"c1","elementIds":["L1"]}]}"#;
        let definition: ContingencyListDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(definition.list_type(), ContingencyListType::Identifiers);

        let json = r#"{"type":"FORM","equipmentType":"GENERATOR","countries":["FR"]}"#;
        let definition: ContingencyListDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(definition.list_type(), ContingencyListType::Form);
        assert!(definition.validate().is_ok());
    }
}
